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

use std::sync::Arc;

use datafabric::registry::{InMemoryInstanceRegistry, InMemoryTypeRegistry};
use datafabric::security::InMemoryOwnerStore;
use datafabric::{DatasetServiceConfig, LifecycleCoordinator};

use crate::explore::ScriptedExploreGateway;
use crate::op_executor::ScriptedOpExecutor;

/// A coordinator wired to in-memory stores and scripted collaborators.
///
/// The collaborators stay reachable so tests can inject failures and
/// inspect state behind the coordinator's back.
pub struct TestCatalog {
    pub coordinator: Arc<LifecycleCoordinator>,
    pub types: Arc<InMemoryTypeRegistry>,
    pub instances: Arc<InMemoryInstanceRegistry>,
    pub owners: Arc<InMemoryOwnerStore>,
    pub executor: Arc<ScriptedOpExecutor>,
    pub explore: Arc<ScriptedExploreGateway>,
}

impl TestCatalog {
    /// Default configuration with the built-in types registered.
    pub fn new() -> Self {
        Self::with_config(DatasetServiceConfig::default())
    }

    /// Like [`TestCatalog::new`] with the unrecoverable reset enabled.
    pub fn with_unrecoverable_reset() -> Self {
        Self::with_config(
            DatasetServiceConfig::builder()
                .unrecoverable_reset(true)
                .build(),
        )
    }

    pub fn with_config(config: DatasetServiceConfig) -> Self {
        let types = Arc::new(InMemoryTypeRegistry::with_builtin_types());
        let instances = Arc::new(InMemoryInstanceRegistry::new());
        let owners = Arc::new(InMemoryOwnerStore::new());
        let executor = Arc::new(ScriptedOpExecutor::new());
        let explore = Arc::new(ScriptedExploreGateway::new());

        let coordinator = Arc::new(LifecycleCoordinator::new(
            config,
            types.clone(),
            instances.clone(),
            owners.clone(),
            executor.clone(),
            explore.clone(),
        ));

        Self {
            coordinator,
            types,
            instances,
            owners,
            executor,
            explore,
        }
    }
}

impl Default for TestCatalog {
    fn default() -> Self {
        Self::new()
    }
}
