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

//! Datafabric op worker.
//!
//! Runs exactly one dataset operation: reads an `OpRequest` as JSON from
//! stdin, executes it against the data directory and writes the
//! `OpResponse` as JSON to stdout. Operation failures are reported in the
//! response; the exit status is non-zero only when the request itself
//! could not be read or the response could not be written.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use datafabric::executor::{execute_request, LocalOpExecutor, OpRequest};
use datafabric_server::config::LogFormat;
use datafabric_server::logging::init_logging;

#[derive(Parser)]
#[command(name = "datafabric-op-worker")]
#[command(author, version, about = "Executes one dataset operation read from stdin", long_about = None)]
struct Cli {
    /// Directory holding dataset storage
    #[arg(long, env = "DATAFABRIC_DATA_DIR")]
    data_dir: PathBuf,

    /// Log level for stderr output
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, LogFormat::Pretty).context("Failed to initialize logging")?;

    let mut input = Vec::new();
    tokio::io::stdin()
        .read_to_end(&mut input)
        .await
        .context("Failed to read request from stdin")?;
    let request: OpRequest =
        serde_json::from_slice(&input).context("Failed to decode op request")?;

    tracing::debug!(
        "Executing {} of dataset '{}'",
        request.operation(),
        request.instance()
    );
    let executor = LocalOpExecutor::with_builtin_definitions(cli.data_dir);
    let response = execute_request(&executor, request).await;

    let output = serde_json::to_vec(&response).context("Failed to encode op response")?;
    let mut stdout = tokio::io::stdout();
    stdout.write_all(&output).await.context("Failed to write op response")?;
    stdout.flush().await.context("Failed to write op response")?;
    Ok(())
}
