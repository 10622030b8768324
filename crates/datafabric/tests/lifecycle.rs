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

//! Create, get and drop protocols of the lifecycle coordinator.

use datafabric::models::{DatasetInstanceConfiguration, NamespaceId};
use datafabric::security::OwnerStore;
use datafabric::{CatalogError, ErrorKind, ListOptions};
use datafabric_testing::{ScriptedOp, TestCatalog};
use tracing_test::traced_test;

fn table() -> DatasetInstanceConfiguration {
    DatasetInstanceConfiguration::new("table")
}

#[tokio::test]
async fn test_unseen_names_are_absent() {
    let catalog = TestCatalog::new();

    for name in ["neverCreated", "fooData", "sessions.kv", "not/valid"] {
        assert!(catalog.coordinator.get(name).await.unwrap().is_none());
    }

    catalog.coordinator.create("fooData", table()).await.unwrap();
    assert!(catalog.coordinator.get("fooData").await.unwrap().is_some());
    assert!(catalog.coordinator.get("neverCreated").await.unwrap().is_none());
}

#[tokio::test]
async fn test_foo_data_scenario() {
    let catalog = TestCatalog::new();

    let spec = catalog.coordinator.create("fooData", table()).await.unwrap();
    assert_eq!(spec.name(), "fooData");
    assert_eq!(spec.type_name(), "table");
    assert!(spec.properties().is_empty());
    assert_eq!(catalog.instances.len(), 1);

    let listed = catalog.coordinator.list(ListOptions::new()).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name(), "fooData");

    catalog.coordinator.drop_instance("fooData").await.unwrap();
    assert!(catalog.instances.is_empty());
    assert!(!catalog.executor.physically_exists("fooData"));

    let err = catalog.coordinator.drop_instance("fooData").await.unwrap_err();
    assert!(matches!(err, CatalogError::InstanceNotFound { .. }));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_get_reports_type_meta_and_owner() {
    let catalog = TestCatalog::new();
    catalog
        .coordinator
        .create(
            "purchases",
            table()
                .with_property("ttl", "3600")
                .with_owner("alice/somehost@SOMEKDC.NET"),
        )
        .await
        .unwrap();

    let meta = catalog.coordinator.get("purchases").await.unwrap().unwrap();
    assert_eq!(meta.spec.property("ttl"), Some("3600"));
    assert_eq!(meta.type_meta.unwrap().name, "table");
    assert_eq!(
        meta.owner_principal.as_deref(),
        Some("alice/somehost@SOMEKDC.NET")
    );
}

#[tokio::test]
async fn test_create_existing_name_conflicts() {
    let catalog = TestCatalog::new();
    catalog.coordinator.create("fooData", table()).await.unwrap();

    let err = catalog
        .coordinator
        .create("fooData", DatasetInstanceConfiguration::new("keyValueTable"))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::InstanceExists { .. }));
    assert_eq!(err.kind(), ErrorKind::Conflict);

    // The executor was never asked to create the second instance.
    assert_eq!(catalog.executor.calls_for(ScriptedOp::Create), vec!["fooData"]);
    let meta = catalog.coordinator.get("fooData").await.unwrap().unwrap();
    assert_eq!(meta.spec.type_name(), "table");
}

#[tokio::test]
async fn test_create_unknown_type_is_not_found() {
    let catalog = TestCatalog::new();

    let err = catalog
        .coordinator
        .create("fooData", DatasetInstanceConfiguration::new("cube"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::TypeNotFound { ref type_name, .. } if type_name == "cube"
    ));
    assert!(catalog.executor.calls().is_empty());
    assert!(catalog.instances.is_empty());
}

#[tokio::test]
async fn test_create_rejects_invalid_names() {
    let catalog = TestCatalog::new();

    for name in ["", ".hidden", "a/b", "with space"] {
        let err = catalog.coordinator.create(name, table()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation, "{name}");
    }
    assert!(catalog.executor.calls().is_empty());
}

#[traced_test]
#[tokio::test]
async fn test_executor_failure_leaves_no_trace() {
    let catalog = TestCatalog::new();
    catalog
        .executor
        .fail(ScriptedOp::Create, "fooData", "no space left on device");

    let err = catalog
        .coordinator
        .create("fooData", table().with_owner("bob@SOMEKDC.NET"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IsolationExecution);
    assert!(err.to_string().contains("no space left on device"));
    assert!(err.to_string().contains("fooData"));

    assert!(catalog.coordinator.get("fooData").await.unwrap().is_none());
    let entity = NamespaceId::default().dataset("fooData");
    assert!(!catalog.owners.exists(&entity).await.unwrap());
    assert!(logs_contain("dataset.create_failed"));

    // Once the executor recovers the same name can be created.
    catalog.executor.clear_failures();
    catalog
        .coordinator
        .create("fooData", table().with_owner("bob@SOMEKDC.NET"))
        .await
        .unwrap();
}

#[traced_test]
#[tokio::test]
async fn test_explore_failure_during_create_keeps_instance() {
    let catalog = TestCatalog::new();
    catalog.explore.set_fail_enable(true);

    catalog.coordinator.create("fooData", table()).await.unwrap();

    let meta = catalog.coordinator.get("fooData").await.unwrap();
    assert_eq!(meta.unwrap().spec.name(), "fooData");
    assert!(!catalog.explore.is_explorable("fooData"));
    assert!(logs_contain("explore.failure"));
}

#[tokio::test]
async fn test_explore_enabled_on_create_and_disabled_on_drop() {
    let catalog = TestCatalog::new();

    catalog.coordinator.create("fooData", table()).await.unwrap();
    assert!(catalog.explore.is_explorable("fooData"));

    catalog.coordinator.drop_instance("fooData").await.unwrap();
    assert!(!catalog.explore.is_explorable("fooData"));
}

#[tokio::test]
async fn test_explore_failure_during_drop_does_not_block() {
    let catalog = TestCatalog::new();
    catalog.coordinator.create("fooData", table()).await.unwrap();
    catalog.explore.set_fail_disable(true);

    catalog.coordinator.drop_instance("fooData").await.unwrap();
    assert!(catalog.coordinator.get("fooData").await.unwrap().is_none());
    assert!(!catalog.executor.physically_exists("fooData"));
}

#[tokio::test]
async fn test_drop_then_create_with_different_type() {
    let catalog = TestCatalog::new();
    catalog
        .coordinator
        .create("fooData", table().with_property("ttl", "60"))
        .await
        .unwrap();

    catalog.coordinator.drop_instance("fooData").await.unwrap();
    assert!(catalog.coordinator.get("fooData").await.unwrap().is_none());

    catalog
        .coordinator
        .create("fooData", DatasetInstanceConfiguration::new("keyValueTable"))
        .await
        .unwrap();
    let meta = catalog.coordinator.get("fooData").await.unwrap().unwrap();
    assert_eq!(meta.spec.type_name(), "keyValueTable");
    assert_eq!(meta.spec.property("ttl"), None);
    assert_eq!(meta.type_meta.unwrap().name, "keyValueTable");
}

#[traced_test]
#[tokio::test]
async fn test_failed_physical_drop_still_removes_catalog_entry() {
    let catalog = TestCatalog::new();
    catalog
        .coordinator
        .create("fooData", table().with_owner("bob@SOMEKDC.NET"))
        .await
        .unwrap();
    catalog
        .executor
        .fail(ScriptedOp::Drop, "fooData", "storage unreachable");

    let err = catalog.coordinator.drop_instance("fooData").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IsolationExecution);
    assert!(err.to_string().contains("storage unreachable"));

    assert!(catalog.coordinator.get("fooData").await.unwrap().is_none());
    assert!(catalog.executor.physically_exists("fooData"));
    let entity = NamespaceId::default().dataset("fooData");
    assert!(!catalog.owners.exists(&entity).await.unwrap());
    assert!(logs_contain("dataset.drop_failed"));
}

#[tokio::test]
async fn test_drop_with_unregistered_type_still_drops() {
    let catalog = TestCatalog::new();
    catalog
        .coordinator
        .create("fooData", table().with_owner("bob@SOMEKDC.NET"))
        .await
        .unwrap();
    catalog.types.unregister("table");

    catalog.coordinator.drop_instance("fooData").await.unwrap();
    assert!(catalog.coordinator.get("fooData").await.unwrap().is_none());
    assert!(!catalog.executor.physically_exists("fooData"));
    assert!(!catalog.explore.is_explorable("fooData"));
    let entity = NamespaceId::default().dataset("fooData");
    assert!(!catalog.owners.exists(&entity).await.unwrap());
}
