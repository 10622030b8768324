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

//! Creates that fail after touching storage, and the op timeout.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use datafabric::executor::{IsolatedOpExecutor, LocalOpExecutor, OpExecutor};
use datafabric::explore::InMemoryExploreGateway;
use datafabric::models::{DatasetInstanceConfiguration, DatasetSpecification, Properties};
use datafabric::registry::{
    builtin_types, InMemoryInstanceRegistry, InMemoryTypeRegistry, InstanceRegistry,
    RegistryError,
};
use datafabric::security::InMemoryOwnerStore;
use datafabric::{CatalogError, DatasetServiceConfig, ErrorKind, LifecycleCoordinator};
use datafabric_testing::{ScriptedExploreGateway, ScriptedOp, ScriptedOpExecutor, TestCatalog};
use tracing_test::traced_test;

fn table() -> DatasetInstanceConfiguration {
    DatasetInstanceConfiguration::new("table")
}

fn coordinator_with(
    instances: Arc<dyn InstanceRegistry>,
    executor: Arc<dyn OpExecutor>,
) -> LifecycleCoordinator {
    LifecycleCoordinator::new(
        DatasetServiceConfig::default(),
        Arc::new(InMemoryTypeRegistry::with_builtin_types()),
        instances,
        Arc::new(InMemoryOwnerStore::new()),
        executor,
        Arc::new(ScriptedExploreGateway::new()),
    )
}

#[traced_test]
#[tokio::test]
async fn test_create_after_timed_out_create_reclaims_storage() {
    let scripted = Arc::new(ScriptedOpExecutor::new());
    let executor = Arc::new(IsolatedOpExecutor::new(
        scripted.clone(),
        Duration::from_millis(10),
    ));
    let coordinator = coordinator_with(Arc::new(InMemoryInstanceRegistry::new()), executor);
    scripted.delay_once(ScriptedOp::Create, "fooData", Duration::from_millis(100));

    let err = coordinator.create("fooData", table()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IsolationExecution);
    assert!(err.to_string().contains("timed out"), "{err}");

    // The abandoned create finishes in the background.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(scripted.physically_exists("fooData"));
    assert!(coordinator.get("fooData").await.unwrap().is_none());
    assert!(matches!(
        coordinator.drop_instance("fooData").await,
        Err(CatalogError::InstanceNotFound { .. })
    ));

    let spec = coordinator.create("fooData", table()).await.unwrap();
    assert_eq!(spec.name(), "fooData");
    assert!(coordinator.get("fooData").await.unwrap().is_some());
    assert_eq!(scripted.calls_for(ScriptedOp::Drop), vec!["fooData"]);
    assert!(logs_contain("dataset.orphan_reclaimed"));
}

#[tokio::test]
async fn test_create_reclaims_leftover_local_storage() {
    let data_dir = TempDir::new().unwrap();
    let local = Arc::new(LocalOpExecutor::with_builtin_definitions(data_dir.path()));
    let table_meta = builtin_types()
        .into_iter()
        .find(|m| m.name == "table")
        .unwrap();
    local
        .create("purchases", &table_meta, &Properties::new())
        .await
        .unwrap();

    let coordinator = LifecycleCoordinator::new(
        DatasetServiceConfig::default(),
        Arc::new(InMemoryTypeRegistry::with_builtin_types()),
        Arc::new(InMemoryInstanceRegistry::new()),
        Arc::new(InMemoryOwnerStore::new()),
        local,
        Arc::new(InMemoryExploreGateway::new()),
    );
    let spec = coordinator
        .create("purchases", table().with_property("ttl", "60"))
        .await
        .unwrap();
    assert_eq!(spec.property("ttl"), Some("60"));

    // A second create is a conflict, never a reclaim.
    let err = coordinator.create("purchases", table()).await.unwrap_err();
    assert!(matches!(err, CatalogError::InstanceExists { .. }));
    assert!(data_dir.path().join("purchases/spec.json").exists());
}

/// Registry whose writes fail while reads keep working.
#[derive(Default)]
struct ReadOnlyRegistry {
    inner: InMemoryInstanceRegistry,
}

#[async_trait]
impl InstanceRegistry for ReadOnlyRegistry {
    async fn get(&self, name: &str) -> Result<Option<DatasetSpecification>, RegistryError> {
        self.inner.get(name).await
    }

    async fn get_all(&self) -> Result<Vec<DatasetSpecification>, RegistryError> {
        self.inner.get_all().await
    }

    async fn add(&self, _spec: DatasetSpecification) -> Result<(), RegistryError> {
        Err(RegistryError::Storage("catalog volume is read-only".into()))
    }

    async fn delete(&self, name: &str) -> Result<bool, RegistryError> {
        self.inner.delete(name).await
    }
}

#[tokio::test]
async fn test_failed_catalog_commit_drops_new_storage() {
    let executor = Arc::new(ScriptedOpExecutor::new());
    let coordinator = coordinator_with(Arc::new(ReadOnlyRegistry::default()), executor.clone());

    let err = coordinator.create("fooData", table()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(!executor.physically_exists("fooData"));
    assert_eq!(executor.calls_for(ScriptedOp::Drop), vec!["fooData"]);
}

#[tokio::test]
async fn test_op_timeout_bounds_unwrapped_executor() {
    let catalog = TestCatalog::with_config(
        DatasetServiceConfig::builder()
            .op_timeout(Duration::from_millis(10))
            .build(),
    );
    catalog
        .executor
        .delay_once(ScriptedOp::Create, "fooData", Duration::from_secs(5));

    let err = catalog.coordinator.create("fooData", table()).await.unwrap_err();
    match &err {
        CatalogError::Execution { source, .. } => {
            assert!(source.to_string().contains("timed out"), "{source}");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!catalog.executor.physically_exists("fooData"));

    catalog.coordinator.create("fooData", table()).await.unwrap();
}
