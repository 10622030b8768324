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

//! Wires a [`LifecycleCoordinator`] from a [`ServerConfig`].

use std::ffi::OsString;
use std::sync::Arc;

use thiserror::Error;

use datafabric::executor::{IsolatedOpExecutor, LocalOpExecutor, OpExecutor, SubprocessOpExecutor};
use datafabric::explore::{DisabledExploreGateway, ExploreGateway, InMemoryExploreGateway};
use datafabric::registry::{
    FilesystemInstanceRegistry, InMemoryInstanceRegistry, InMemoryTypeRegistry, InstanceRegistry,
    RegistryError,
};
use datafabric::security::{FilesystemOwnerStore, InMemoryOwnerStore, OwnerStore, OwnerStoreError};
use datafabric::LifecycleCoordinator;

use crate::config::{ConfigError, ExecutorMode, ServerConfig};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to open instance catalog: {0}")]
    Registry(#[from] RegistryError),

    #[error("Failed to open owner store: {0}")]
    OwnerStore(#[from] OwnerStoreError),

    #[error("Failed to prepare data directory: {0}")]
    DataDir(#[from] std::io::Error),
}

/// Builds the coordinator and its collaborators.
///
/// Catalog state is kept under `catalog.catalog_dir` when set, with
/// instances in `instances/` and owner records in `owners/`. The op
/// executor is always wrapped in an [`IsolatedOpExecutor`] carrying the
/// configured timeout.
pub async fn build_coordinator(config: &ServerConfig) -> Result<LifecycleCoordinator, BootstrapError> {
    config.validate()?;

    let types = Arc::new(InMemoryTypeRegistry::with_builtin_types());

    let (instances, owners): (Arc<dyn InstanceRegistry>, Arc<dyn OwnerStore>) =
        match &config.catalog.catalog_dir {
            Some(dir) => {
                tracing::info!("Using catalog directory {}", dir.display());
                (
                    Arc::new(FilesystemInstanceRegistry::open(dir.join("instances")).await?),
                    Arc::new(FilesystemOwnerStore::open(dir.join("owners")).await?),
                )
            }
            None => {
                tracing::warn!("No catalog directory configured, catalog state will not persist");
                (
                    Arc::new(InMemoryInstanceRegistry::new()),
                    Arc::new(InMemoryOwnerStore::new()),
                )
            }
        };

    let data_dir = config.executor.data_dir.clone();
    tokio::fs::create_dir_all(&data_dir).await?;

    let executor: Arc<dyn OpExecutor> = match config.executor.mode {
        ExecutorMode::InProcess => {
            let local = Arc::new(LocalOpExecutor::with_builtin_definitions(data_dir));
            Arc::new(IsolatedOpExecutor::new(local, config.op_timeout()))
        }
        ExecutorMode::Subprocess => {
            let program = config
                .executor
                .worker_command
                .clone()
                .ok_or(ConfigError::MissingWorkerCommand)?;
            let worker = SubprocessOpExecutor::new(program)
                .with_args(config.executor.worker_args.iter().cloned())
                .with_args([OsString::from("--data-dir"), data_dir.into_os_string()]);
            Arc::new(IsolatedOpExecutor::new(Arc::new(worker), config.op_timeout()))
        }
    };

    let explore: Arc<dyn ExploreGateway> = if config.explore.enabled {
        Arc::new(InMemoryExploreGateway::new())
    } else {
        Arc::new(DisabledExploreGateway)
    };

    tracing::info!(
        "Dataset service configured: namespace={}, executor={:?}, explore={}",
        config.catalog.namespace,
        config.executor.mode,
        config.explore.enabled
    );

    Ok(LifecycleCoordinator::new(
        config.service_config(),
        types,
        instances,
        owners,
        executor,
        explore,
    ))
}
