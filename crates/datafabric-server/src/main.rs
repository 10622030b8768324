/*
 *  Copyright 2025-2026 Colliery Software
 *
 *  Licensed under the Apache License, Version 2.0 (the "License");
 *  you may not use this file except in compliance with the License.
 *  You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 *  Unless required by applicable law or agreed to in writing, software
 *  distributed under the License is distributed on an "AS IS" BASIS,
 *  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *  See the License for the specific language governing permissions and
 *  limitations under the License.
 */

//! Datafabric server - HTTP API for the dataset catalog.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;

use datafabric_server::config::LogFormat;
use datafabric_server::logging::init_logging;
use datafabric_server::{build_coordinator, build_router, AppState, ServerConfig};

/// Datafabric - dataset catalog and lifecycle service
#[derive(Parser)]
#[command(name = "datafabric-server")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML); built-in defaults apply when omitted
    #[arg(short, long, env = "DATAFABRIC_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on, overriding server.bind
    #[arg(long, env = "DATAFABRIC_BIND")]
    bind: Option<SocketAddr>,

    /// Log level, overriding logging.level
    #[arg(long, env = "DATAFABRIC_LOG_LEVEL")]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Allow DELETE /data/unrecoverable/datasets
    #[arg(long, env = "DATAFABRIC_UNRECOVERABLE_RESET")]
    unrecoverable_reset: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    fn resolve_config(&self) -> Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::load(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
            None => ServerConfig::default(),
        };

        if let Some(bind) = self.bind {
            config.server.bind = bind;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if self.json_logs {
            config.logging.format = LogFormat::Json;
        }
        if self.unrecoverable_reset {
            config.catalog.unrecoverable_reset = true;
        }
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    if cli.print_config {
        let output = toml::to_string_pretty(&config)
            .context("Failed to serialize configuration as TOML")?;
        println!("{}", output);
        return Ok(());
    }

    init_logging(&config.logging.level, config.logging.format)
        .context("Failed to initialize logging")?;

    let metrics_handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;
    datafabric::metrics::register_metrics();

    let upkeep_handle = metrics_handle.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(5));
        loop {
            interval.tick().await;
            upkeep_handle.run_upkeep();
        }
    });

    let coordinator = build_coordinator(&config)
        .await
        .context("Failed to initialize dataset service")?;
    if config.catalog.unrecoverable_reset {
        tracing::warn!("Unrecoverable reset is enabled");
    }

    let state = AppState::new(Arc::new(coordinator)).with_metrics(metrics_handle);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    tracing::info!("Datafabric server listening on {}", config.server.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Datafabric server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
