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

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use super::error::RegistryError;
use crate::models::{DatasetModuleMeta, DatasetTypeMeta};

/// Name of the built-in table type.
pub const TABLE_TYPE: &str = "table";
/// Name of the built-in key/value table type.
pub const KEY_VALUE_TABLE_TYPE: &str = "keyValueTable";

/// Lookup of dataset type metadata by type name.
#[async_trait]
pub trait TypeRegistry: Send + Sync {
    /// Returns the type's metadata, or `None` if the type is not registered.
    async fn get_type_info(&self, type_name: &str)
        -> Result<Option<DatasetTypeMeta>, RegistryError>;
}

/// Metadata for the types every deployment ships with.
pub fn builtin_types() -> Vec<DatasetTypeMeta> {
    let table = DatasetModuleMeta::new("core.table", "datafabric::executor::TableDefinition");
    let key_value = DatasetModuleMeta::new(
        "core.keyValueTable",
        "datafabric::executor::KeyValueTableDefinition",
    )
    .uses("core.table");

    vec![
        DatasetTypeMeta::new(TABLE_TYPE, vec![table.clone()]),
        DatasetTypeMeta::new(KEY_VALUE_TABLE_TYPE, vec![table, key_value]),
    ]
}

/// Process-local [`TypeRegistry`].
#[derive(Debug, Default)]
pub struct InMemoryTypeRegistry {
    types: RwLock<HashMap<String, DatasetTypeMeta>>,
}

impl InMemoryTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with [`builtin_types`].
    pub fn with_builtin_types() -> Self {
        let registry = Self::new();
        for meta in builtin_types() {
            registry.register(meta);
        }
        registry
    }

    /// Registers or replaces a type.
    pub fn register(&self, meta: DatasetTypeMeta) {
        tracing::debug!("Registered dataset type: {}", meta.name);
        self.types.write().insert(meta.name.clone(), meta);
    }

    /// Removes a type, returning its metadata if it was registered.
    ///
    /// Instances of the type stay in the catalog; they are reported without
    /// type metadata until the type is registered again.
    pub fn unregister(&self, type_name: &str) -> Option<DatasetTypeMeta> {
        self.types.write().remove(type_name)
    }

    /// Registered type names, sorted.
    pub fn list_types(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.read().keys().cloned().collect();
        names.sort();
        names
    }
}

#[async_trait]
impl TypeRegistry for InMemoryTypeRegistry {
    async fn get_type_info(
        &self,
        type_name: &str,
    ) -> Result<Option<DatasetTypeMeta>, RegistryError> {
        Ok(self.types.read().get(type_name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_builtin_types_are_registered() {
        let registry = InMemoryTypeRegistry::with_builtin_types();
        assert_eq!(registry.list_types(), vec![KEY_VALUE_TABLE_TYPE, TABLE_TYPE]);

        let kv = registry
            .get_type_info(KEY_VALUE_TABLE_TYPE)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(kv.modules.len(), 2);
        assert_eq!(kv.implementing_module().unwrap().uses_modules, vec!["core.table"]);
    }

    #[tokio::test]
    async fn test_unknown_type_is_none() {
        let registry = InMemoryTypeRegistry::new();
        assert!(registry.get_type_info("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unregister() {
        let registry = InMemoryTypeRegistry::with_builtin_types();
        assert!(registry.unregister(TABLE_TYPE).is_some());
        assert!(registry.unregister(TABLE_TYPE).is_none());
        assert!(registry.get_type_info(TABLE_TYPE).await.unwrap().is_none());
    }
}
