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
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use super::audit;
use super::owner_store::{validate_owner_entry, OwnerStore, OwnerStoreError};
use super::principal::KerberosPrincipal;
use crate::models::EntityId;

/// Process-local [`OwnerStore`].
#[derive(Debug, Default)]
pub struct InMemoryOwnerStore {
    owners: RwLock<HashMap<EntityId, KerberosPrincipal>>,
}

impl InMemoryOwnerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.owners.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.read().is_empty()
    }
}

#[async_trait]
impl OwnerStore for InMemoryOwnerStore {
    async fn add(
        &self,
        entity: &EntityId,
        principal: &KerberosPrincipal,
    ) -> Result<(), OwnerStoreError> {
        if let Err(e) = validate_owner_entry(entity, principal) {
            audit::log_owner_add_rejected(entity, &e.to_string());
            return Err(e);
        }

        let inserted = match self.owners.write().entry(entity.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(principal.clone());
                true
            }
        };

        if !inserted {
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
        Ok(self.owners.read().get(entity).cloned())
    }

    async fn exists(&self, entity: &EntityId) -> Result<bool, OwnerStoreError> {
        Ok(self.owners.read().contains_key(entity))
    }

    async fn delete(&self, entity: &EntityId) -> Result<(), OwnerStoreError> {
        if self.owners.write().remove(entity).is_some() {
            audit::log_owner_deleted(entity);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NamespaceId;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_owner_lifecycle() {
        let store = InMemoryOwnerStore::new();
        let dataset = NamespaceId::default().dataset("fooData");

        assert_eq!(store.get_owner(&dataset).await.unwrap(), None);

        // delete is idempotent
        store.delete(&dataset).await.unwrap();

        let alice = KerberosPrincipal::new("alice/somehost@SOMEKDC.NET");
        store.add(&dataset, &alice).await.unwrap();
        assert!(store.exists(&dataset).await.unwrap());
        assert_eq!(store.get_owner(&dataset).await.unwrap(), Some(alice.clone()));

        let err = store
            .add(&dataset, &KerberosPrincipal::new("bob@SOMEKDC.NET"))
            .await
            .unwrap_err();
        assert!(matches!(err, OwnerStoreError::AlreadyExists(_)));

        let err = store.add(&dataset, &alice).await.unwrap_err();
        assert!(matches!(err, OwnerStoreError::AlreadyExists(_)));

        let err = store
            .add(&dataset, &KerberosPrincipal::new("b@ob@SOMEKDC.NET"))
            .await
            .unwrap_err();
        assert!(err.is_invalid_argument());

        assert_eq!(store.get_owner(&dataset).await.unwrap(), Some(alice));

        store.delete(&dataset).await.unwrap();
        assert!(!store.exists(&dataset).await.unwrap());
        assert_eq!(store.get_owner(&dataset).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_concurrent_adds_have_single_winner() {
        let store = Arc::new(InMemoryOwnerStore::new());
        let dataset = NamespaceId::default().dataset("contended");

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            let dataset = dataset.clone();
            handles.push(tokio::spawn(async move {
                store
                    .add(&dataset, &KerberosPrincipal::new(format!("user{}@REALM", i)))
                    .await
            }));
        }

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => successes += 1,
                Err(e) => assert!(matches!(e, OwnerStoreError::AlreadyExists(_))),
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(store.len(), 1);
    }
}
