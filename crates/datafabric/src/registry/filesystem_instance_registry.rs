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

//! File-backed instance registry.
//!
//! One JSON document per instance at `<root>/<name>.json`. Entries are
//! published with a hard link, so `add` stays atomic when several
//! coordinator processes share the directory.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::error::RegistryError;
use super::instance_registry::InstanceRegistry;
use crate::models::DatasetSpecification;
use crate::storage;

const ENTRY_EXTENSION: &str = "json";

/// [`InstanceRegistry`] persisted under a directory.
#[derive(Debug, Clone)]
pub struct FilesystemInstanceRegistry {
    root: PathBuf,
}

impl FilesystemInstanceRegistry {
    /// Opens (creating if needed) a registry rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, RegistryError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await.map_err(|e| {
            RegistryError::Storage(format!(
                "Failed to create registry directory {}: {}",
                root.display(),
                e
            ))
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, name: &str) -> Result<PathBuf, RegistryError> {
        if !storage::is_safe_component(name) {
            return Err(RegistryError::Storage(format!(
                "Instance name '{}' cannot be stored on the filesystem",
                name
            )));
        }
        Ok(self.root.join(format!("{}.{}", name, ENTRY_EXTENSION)))
    }
}

#[async_trait]
impl InstanceRegistry for FilesystemInstanceRegistry {
    async fn get(&self, name: &str) -> Result<Option<DatasetSpecification>, RegistryError> {
        let path = self.entry_path(name)?;
        let bytes = storage::read_if_present(&path)
            .await
            .map_err(|e| RegistryError::Storage(format!("Failed to read {}: {}", name, e)))?;
        match bytes {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn get_all(&self) -> Result<Vec<DatasetSpecification>, RegistryError> {
        let mut entries = tokio::fs::read_dir(&self.root).await.map_err(|e| {
            RegistryError::Storage(format!(
                "Failed to list registry directory {}: {}",
                self.root.display(),
                e
            ))
        })?;

        let mut specs = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RegistryError::Storage(format!("Failed to list registry: {}", e)))?
        {
            let path = entry.path();
            let is_entry = path.extension().is_some_and(|ext| ext == ENTRY_EXTENSION)
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| !n.starts_with('.'));
            if !is_entry {
                continue;
            }
            // An entry removed between listing and reading was dropped concurrently.
            if let Some(bytes) = storage::read_if_present(&path).await.map_err(|e| {
                RegistryError::Storage(format!("Failed to read {}: {}", path.display(), e))
            })? {
                specs.push(serde_json::from_slice::<DatasetSpecification>(&bytes)?);
            }
        }

        specs.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(specs)
    }

    async fn add(&self, spec: DatasetSpecification) -> Result<(), RegistryError> {
        let path = self.entry_path(spec.name())?;
        let bytes = serde_json::to_vec_pretty(&spec)?;
        let created = storage::create_file_if_absent(&path, &bytes)
            .await
            .map_err(|e| {
                RegistryError::Storage(format!("Failed to write {}: {}", spec.name(), e))
            })?;
        if !created {
            return Err(RegistryError::InstanceExists {
                name: spec.name().to_string(),
            });
        }
        tracing::debug!("Registered dataset instance: {}", spec.name());
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<bool, RegistryError> {
        let path = self.entry_path(name)?;
        storage::remove_file_if_present(&path)
            .await
            .map_err(|e| RegistryError::Storage(format!("Failed to delete {}: {}", name, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_entries_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let spec = DatasetSpecification::builder("fooData", "table")
            .property("ttl", "60")
            .build();

        let registry = FilesystemInstanceRegistry::open(dir.path()).await.unwrap();
        registry.add(spec.clone()).await.unwrap();

        let reopened = FilesystemInstanceRegistry::open(dir.path()).await.unwrap();
        assert_eq!(reopened.get("fooData").await.unwrap(), Some(spec.clone()));
        assert_eq!(reopened.get_all().await.unwrap(), vec![spec]);
    }

    #[tokio::test]
    async fn test_add_rejects_existing_name() {
        let dir = TempDir::new().unwrap();
        let registry = FilesystemInstanceRegistry::open(dir.path()).await.unwrap();
        registry
            .add(DatasetSpecification::builder("fooData", "table").build())
            .await
            .unwrap();

        let err = registry
            .add(DatasetSpecification::builder("fooData", "keyValueTable").build())
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::InstanceExists { .. }));
    }

    #[tokio::test]
    async fn test_delete_reports_absence() {
        let dir = TempDir::new().unwrap();
        let registry = FilesystemInstanceRegistry::open(dir.path()).await.unwrap();
        registry
            .add(DatasetSpecification::builder("fooData", "table").build())
            .await
            .unwrap();

        assert!(registry.delete("fooData").await.unwrap());
        assert!(!registry.delete("fooData").await.unwrap());
        assert!(registry.get_all().await.unwrap().is_empty());
    }
}
