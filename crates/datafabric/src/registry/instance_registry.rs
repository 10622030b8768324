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
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use super::error::RegistryError;
use crate::models::DatasetSpecification;

/// Catalog of dataset instances.
///
/// Implementations must be thread-safe (`Send + Sync`) and must make `add`
/// fail atomically when the name is taken; callers' existence checks are
/// only an early exit.
#[async_trait]
pub trait InstanceRegistry: Send + Sync {
    async fn get(&self, name: &str) -> Result<Option<DatasetSpecification>, RegistryError>;

    /// All instances, ordered by name.
    async fn get_all(&self) -> Result<Vec<DatasetSpecification>, RegistryError>;

    /// Adds `spec`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::InstanceExists`] if an instance with the same name is
    /// already registered.
    async fn add(&self, spec: DatasetSpecification) -> Result<(), RegistryError>;

    /// Removes the instance, returning `false` if it was not registered.
    async fn delete(&self, name: &str) -> Result<bool, RegistryError>;
}

/// Process-local [`InstanceRegistry`].
#[derive(Debug, Default)]
pub struct InMemoryInstanceRegistry {
    instances: RwLock<BTreeMap<String, DatasetSpecification>>,
}

impl InMemoryInstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.instances.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.read().is_empty()
    }
}

#[async_trait]
impl InstanceRegistry for InMemoryInstanceRegistry {
    async fn get(&self, name: &str) -> Result<Option<DatasetSpecification>, RegistryError> {
        Ok(self.instances.read().get(name).cloned())
    }

    async fn get_all(&self) -> Result<Vec<DatasetSpecification>, RegistryError> {
        Ok(self.instances.read().values().cloned().collect())
    }

    async fn add(&self, spec: DatasetSpecification) -> Result<(), RegistryError> {
        match self.instances.write().entry(spec.name().to_string()) {
            Entry::Occupied(existing) => Err(RegistryError::InstanceExists {
                name: existing.key().clone(),
            }),
            Entry::Vacant(slot) => {
                tracing::debug!("Registered dataset instance: {}", spec.name());
                slot.insert(spec);
                Ok(())
            }
        }
    }

    async fn delete(&self, name: &str) -> Result<bool, RegistryError> {
        Ok(self.instances.write().remove(name).is_some())
    }
}
