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

//! Server configuration, loaded from TOML.
//!
//! Every section and field has a default, so an empty file (or no file at
//! all) yields a working in-memory server:
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:8080"
//!
//! [logging]
//! level = "info"
//! format = "json"
//!
//! [catalog]
//! namespace = "default"
//! catalog_dir = "/var/lib/datafabric/catalog"
//! unrecoverable_reset = false
//!
//! [executor]
//! mode = "subprocess"
//! op_timeout_secs = 300
//! data_dir = "/var/lib/datafabric/data"
//! worker_command = "/usr/local/bin/datafabric-op-worker"
//!
//! [explore]
//! enabled = true
//! ```

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use datafabric::models::NamespaceId;
use datafabric::DatasetServiceConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse TOML configuration: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("Invalid log level: {level} (must be one of: error, warn, info, debug, trace)")]
    InvalidLogLevel { level: String },

    #[error("Invalid op timeout: {timeout} (must be positive)")]
    InvalidTimeout { timeout: u64 },

    #[error("Executor mode 'subprocess' requires executor.worker_command")]
    MissingWorkerCommand,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: HttpConfig,
    pub logging: LoggingConfig,
    pub catalog: CatalogConfig,
    pub executor: ExecutorConfig,
    pub explore: ExploreConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: SocketAddr,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub namespace: String,
    /// Directory holding the instance catalog and owner records. The
    /// catalog lives in memory when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_dir: Option<PathBuf>,
    /// Enables `DELETE /data/unrecoverable/datasets`.
    pub unrecoverable_reset: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            namespace: NamespaceId::DEFAULT.to_string(),
            catalog_dir: None,
            unrecoverable_reset: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutorMode {
    /// Type code runs on isolated tasks inside the server process.
    #[default]
    InProcess,
    /// Type code runs in a fresh worker process per operation.
    Subprocess,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    pub mode: ExecutorMode,
    pub op_timeout_secs: u64,
    pub data_dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_command: Option<PathBuf>,
    /// Extra arguments passed before `--data-dir` on every worker call.
    pub worker_args: Vec<String>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            mode: ExecutorMode::InProcess,
            op_timeout_secs: 300,
            data_dir: PathBuf::from("./datafabric-data"),
            worker_command: None,
            worker_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExploreConfig {
    pub enabled: bool,
}

impl Default for ExploreConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl ServerConfig {
    /// Loads and validates a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config = toml::from_str::<ServerConfig>(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let level = self.logging.level.to_lowercase();
        if !["error", "warn", "info", "debug", "trace"].contains(&level.as_str()) {
            return Err(ConfigError::InvalidLogLevel {
                level: self.logging.level.clone(),
            });
        }
        if self.executor.op_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout {
                timeout: self.executor.op_timeout_secs,
            });
        }
        if self.executor.mode == ExecutorMode::Subprocess && self.executor.worker_command.is_none()
        {
            return Err(ConfigError::MissingWorkerCommand);
        }
        Ok(())
    }

    pub fn op_timeout(&self) -> Duration {
        Duration::from_secs(self.executor.op_timeout_secs)
    }

    /// The coordinator configuration this server runs with.
    pub fn service_config(&self) -> DatasetServiceConfig {
        DatasetServiceConfig::builder()
            .namespace(NamespaceId::new(self.catalog.namespace.clone()))
            .unrecoverable_reset(self.catalog.unrecoverable_reset)
            .op_timeout(self.op_timeout())
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ServerConfig::from_toml_str("").unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.server.bind.port(), 8080);
        assert_eq!(config.executor.mode, ExecutorMode::InProcess);
        assert!(config.explore.enabled);
        assert!(!config.catalog.unrecoverable_reset);
        assert_eq!(config.op_timeout(), Duration::from_secs(300));
    }

    #[test]
    fn test_full_config() {
        let config = ServerConfig::from_toml_str(
            r#"
            [server]
            bind = "0.0.0.0:9000"

            [logging]
            level = "debug"
            format = "json"

            [catalog]
            namespace = "analytics"
            catalog_dir = "/tmp/catalog"
            unrecoverable_reset = true

            [executor]
            mode = "subprocess"
            op_timeout_secs = 30
            data_dir = "/tmp/data"
            worker_command = "/usr/bin/datafabric-op-worker"
            worker_args = ["--quiet"]

            [explore]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.server.bind.port(), 9000);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.catalog.catalog_dir, Some(PathBuf::from("/tmp/catalog")));
        assert_eq!(config.executor.mode, ExecutorMode::Subprocess);
        assert_eq!(config.executor.worker_args, vec!["--quiet"]);
        assert!(!config.explore.enabled);

        let service = config.service_config();
        assert_eq!(service.namespace().name(), "analytics");
        assert!(service.unrecoverable_reset());
        assert_eq!(service.op_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_validation_errors() {
        let err = ServerConfig::from_toml_str("[logging]\nlevel = \"loud\"").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogLevel { .. }));

        let err = ServerConfig::from_toml_str("[executor]\nop_timeout_secs = 0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeout { timeout: 0 }));

        let err = ServerConfig::from_toml_str("[executor]\nmode = \"subprocess\"").unwrap_err();
        assert!(matches!(err, ConfigError::MissingWorkerCommand));

        let err = ServerConfig::from_toml_str("[executor]\nmode = \"remote\"").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParseError(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[catalog]\nunrecoverable_reset = true").unwrap();

        let config = ServerConfig::load(file.path()).unwrap();
        assert!(config.catalog.unrecoverable_reset);

        let err = ServerConfig::load(Path::new("/nonexistent/datafabric.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let config = ServerConfig::default();
        let rendered = toml::to_string_pretty(&config).unwrap();
        assert_eq!(ServerConfig::from_toml_str(&rendered).unwrap(), config);
    }
}
