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

//! File-backed owner store.
//!
//! Each record is a file at `<root>/<entity type>/<namespace>/<name>`
//! holding the principal. Records are published with a hard link, which
//! fails if the target exists, so `add` is atomic across processes sharing
//! the directory.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::audit;
use super::owner_store::{validate_owner_entry, OwnerStore, OwnerStoreError};
use super::principal::KerberosPrincipal;
use crate::models::EntityId;
use crate::storage;

/// [`OwnerStore`] persisted under a directory.
#[derive(Debug, Clone)]
pub struct FilesystemOwnerStore {
    root: PathBuf,
}

impl FilesystemOwnerStore {
    /// Opens (creating if needed) a store rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, OwnerStoreError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await.map_err(|e| {
            OwnerStoreError::Storage(format!(
                "Failed to create owner store directory {}: {}",
                root.display(),
                e
            ))
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, entity: &EntityId) -> Result<PathBuf, OwnerStoreError> {
        let namespace = entity.namespace().name();
        if !storage::is_safe_component(namespace) || !storage::is_safe_component(entity.name()) {
            return Err(OwnerStoreError::Storage(format!(
                "Entity {} cannot be stored on the filesystem",
                entity
            )));
        }
        Ok(self
            .root
            .join(entity.entity_type().as_str())
            .join(namespace)
            .join(entity.name()))
    }
}

fn io_error(entity: &EntityId, action: &str, e: std::io::Error) -> OwnerStoreError {
    OwnerStoreError::Storage(format!("Failed to {} owner of {}: {}", action, entity, e))
}

#[async_trait]
impl OwnerStore for FilesystemOwnerStore {
    async fn add(
        &self,
        entity: &EntityId,
        principal: &KerberosPrincipal,
    ) -> Result<(), OwnerStoreError> {
        if let Err(e) = validate_owner_entry(entity, principal) {
            audit::log_owner_add_rejected(entity, &e.to_string());
            return Err(e);
        }

        let path = self.record_path(entity)?;
        let created = storage::create_file_if_absent(&path, principal.as_str().as_bytes())
            .await
            .map_err(|e| io_error(entity, "store", e))?;
        if !created {
            audit::log_owner_add_rejected(entity, "owner already recorded");
            return Err(OwnerStoreError::AlreadyExists(entity.clone()));
        }

        audit::log_owner_added(entity, principal.as_str());
        Ok(())
    }

    async fn get_owner(
        &self,
        entity: &EntityId,
    ) -> Result<Option<KerberosPrincipal>, OwnerStoreError> {
        let path = self.record_path(entity)?;
        let bytes = storage::read_if_present(&path)
            .await
            .map_err(|e| io_error(entity, "read", e))?;
        bytes
            .map(|bytes| {
                String::from_utf8(bytes)
                    .map(KerberosPrincipal::new)
                    .map_err(|e| {
                        OwnerStoreError::Storage(format!(
                            "Owner record of {} is not valid UTF-8: {}",
                            entity, e
                        ))
                    })
            })
            .transpose()
    }

    async fn exists(&self, entity: &EntityId) -> Result<bool, OwnerStoreError> {
        let path = self.record_path(entity)?;
        tokio::fs::try_exists(&path)
            .await
            .map_err(|e| io_error(entity, "check", e))
    }

    async fn delete(&self, entity: &EntityId) -> Result<(), OwnerStoreError> {
        let path = self.record_path(entity)?;
        let removed = storage::remove_file_if_present(&path)
            .await
            .map_err(|e| io_error(entity, "delete", e))?;
        if removed {
            audit::log_owner_deleted(entity);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NamespaceId;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let dataset = NamespaceId::default().dataset("fooData");
        let alice = KerberosPrincipal::new("alice/somehost@SOMEKDC.NET");

        let store = FilesystemOwnerStore::open(dir.path()).await.unwrap();
        store.add(&dataset, &alice).await.unwrap();

        let reopened = FilesystemOwnerStore::open(dir.path()).await.unwrap();
        assert_eq!(reopened.get_owner(&dataset).await.unwrap(), Some(alice));

        let err = reopened
            .add(&dataset, &KerberosPrincipal::new("bob@SOMEKDC.NET"))
            .await
            .unwrap_err();
        assert!(matches!(err, OwnerStoreError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = FilesystemOwnerStore::open(dir.path()).await.unwrap();
        let dataset = NamespaceId::default().dataset("fooData");

        store.delete(&dataset).await.unwrap();
        assert!(!store.exists(&dataset).await.unwrap());

        store
            .add(&dataset, &KerberosPrincipal::new("somePrincipal"))
            .await
            .unwrap();
        store.delete(&dataset).await.unwrap();
        store.delete(&dataset).await.unwrap();
        assert!(!store.exists(&dataset).await.unwrap());
    }

    #[tokio::test]
    async fn test_unsafe_names_rejected() {
        let dir = TempDir::new().unwrap();
        let store = FilesystemOwnerStore::open(dir.path()).await.unwrap();
        let escaping = NamespaceId::default().dataset("../escape");

        let err = store
            .add(&escaping, &KerberosPrincipal::new("somePrincipal"))
            .await
            .unwrap_err();
        assert!(matches!(err, OwnerStoreError::Storage(_)));
    }
}
