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

use super::{is_valid_instance_name, LifecycleCoordinator};
use crate::error::CatalogError;
use crate::executor::OpExecutorError;
use crate::metrics;
use crate::models::{
    DatasetInstanceConfiguration, DatasetSpecification, DatasetTypeMeta, EntityId, Properties,
};
use crate::registry::RegistryError;
use crate::security::{audit, validate_owner_entry, KerberosPrincipal, OwnerStoreError};

impl LifecycleCoordinator {
    /// Creates dataset instance `name`.
    ///
    /// Type code runs only inside the op executor. Nothing is written to the
    /// catalog unless the physical create succeeded, and an owner record
    /// written for this request is removed again if the create does not
    /// complete. Physical resources left behind by an earlier failed create
    /// of the same name are dropped and created afresh.
    ///
    /// # Errors
    ///
    /// * [`CatalogError::InvalidName`] / [`CatalogError::InvalidOwner`] - rejected
    ///   before anything is touched
    /// * [`CatalogError::InstanceExists`] / [`CatalogError::OwnerExists`] - the
    ///   name or its owner record is taken, or another create of the name is
    ///   in progress
    /// * [`CatalogError::TypeNotFound`] - the type is not registered
    /// * [`CatalogError::Execution`] - the op executor failed
    pub async fn create(
        &self,
        name: &str,
        request: DatasetInstanceConfiguration,
    ) -> Result<DatasetSpecification, CatalogError> {
        tracing::info!(
            "Creating dataset {}, type name: {}, properties: {:?}",
            name,
            request.type_name,
            request.properties
        );

        if !is_valid_instance_name(name) {
            return Err(CatalogError::InvalidName {
                name: name.to_string(),
                reason: "must start with a letter, digit or '_' and contain only letters, \
                         digits, '_', '.' and '-'"
                    .to_string(),
            });
        }

        let entity = self.dataset_id(name);
        let owner = match request.owner_principal.as_deref() {
            Some(principal) => {
                let principal = KerberosPrincipal::new(principal);
                validate_owner_entry(&entity, &principal).map_err(|source| {
                    CatalogError::InvalidOwner {
                        name: name.to_string(),
                        source,
                    }
                })?;
                Some(principal)
            }
            None => None,
        };

        let Some(_reservation) = self.reserve_create(name) else {
            tracing::warn!(
                "Cannot create dataset {}: another create of the same name is in progress",
                name
            );
            return Err(CatalogError::InstanceExists {
                name: name.to_string(),
            });
        };

        if self.instances.get(name).await?.is_some() {
            tracing::warn!(
                "Cannot create dataset {}: instance with same name already exists",
                name
            );
            return Err(CatalogError::InstanceExists {
                name: name.to_string(),
            });
        }

        let type_meta = self
            .types
            .get_type_info(&request.type_name)
            .await?
            .ok_or_else(|| {
                tracing::warn!(
                    "Cannot create dataset {}: unknown type {}",
                    name,
                    request.type_name
                );
                CatalogError::TypeNotFound {
                    name: name.to_string(),
                    type_name: request.type_name.clone(),
                }
            })?;

        if let Some(principal) = &owner {
            match self.owners.add(&entity, principal).await {
                Ok(()) => {}
                Err(OwnerStoreError::AlreadyExists(_)) => {
                    return Err(CatalogError::OwnerExists {
                        name: name.to_string(),
                    });
                }
                Err(source) if source.is_invalid_argument() => {
                    return Err(CatalogError::InvalidOwner {
                        name: name.to_string(),
                        source,
                    });
                }
                Err(e) => return Err(e.into()),
            }
        }

        let created = self
            .create_physical(name, &type_meta, &request.properties)
            .await;
        let spec = match created {
            Ok(spec) if spec.name() == name => spec,
            Ok(spec) => {
                let source = OpExecutorError::Protocol(format!(
                    "create of '{}' returned a specification for '{}'",
                    name,
                    spec.name()
                ));
                return Err(self
                    .fail_create(name, &request.type_name, &entity, owner.is_some(), source)
                    .await);
            }
            Err(source) => {
                return Err(self
                    .fail_create(name, &request.type_name, &entity, owner.is_some(), source)
                    .await);
            }
        };

        if let Err(e) = self.instances.add(spec.clone()).await {
            self.rollback_owner(&entity, owner.is_some()).await;
            return Err(match e {
                RegistryError::InstanceExists { name } => {
                    tracing::warn!("Cannot create dataset {}: lost a concurrent create", name);
                    CatalogError::InstanceExists { name }
                }
                other => {
                    self.rollback_physical(&spec, &type_meta).await;
                    other.into()
                }
            });
        }

        // The instance is usable without exploration.
        if let Err(e) = self.explore.enable_explore(name).await {
            audit::log_explore_failure(name, "enable", &e.to_string());
            metrics::record_explore_failure("enable");
        }

        audit::log_dataset_created(
            name,
            &request.type_name,
            owner.as_ref().map(|p| p.as_str()),
        );
        metrics::record_created(&request.type_name);
        Ok(spec)
    }

    /// Runs the physical create. Resources already present under a name the
    /// catalog does not hold are left over from a create that failed after
    /// its physical step; they are dropped and the create is tried once more.
    async fn create_physical(
        &self,
        name: &str,
        type_meta: &DatasetTypeMeta,
        properties: &Properties,
    ) -> Result<DatasetSpecification, OpExecutorError> {
        let first = self
            .timed_op("create", name, self.executor.create(name, type_meta, properties))
            .await;
        if let Err(OpExecutorError::AlreadyExists { .. }) = &first {
            if self.reclaim_orphan(name, type_meta).await {
                return self
                    .timed_op("create", name, self.executor.create(name, type_meta, properties))
                    .await;
            }
        }
        first
    }

    async fn reclaim_orphan(&self, name: &str, type_meta: &DatasetTypeMeta) -> bool {
        match self.instances.get(name).await {
            Ok(None) => {}
            Ok(Some(_)) => return false,
            Err(e) => {
                tracing::error!("Cannot check catalog entry of dataset {}: {}", name, e);
                return false;
            }
        }

        tracing::warn!(
            "Dropping storage of dataset {} left behind by an earlier failed create",
            name
        );
        let orphan = DatasetSpecification::builder(name, type_meta.name.as_str()).build();
        match self
            .timed_op("drop", name, self.executor.drop_dataset(&orphan, type_meta))
            .await
        {
            Ok(()) => {
                audit::log_orphan_reclaimed(name, &type_meta.name);
                true
            }
            Err(e) => {
                tracing::error!("Failed to drop leftover storage of dataset {}: {}", name, e);
                false
            }
        }
    }

    async fn rollback_physical(&self, spec: &DatasetSpecification, type_meta: &DatasetTypeMeta) {
        if let Err(e) = self
            .timed_op("drop", spec.name(), self.executor.drop_dataset(spec, type_meta))
            .await
        {
            tracing::error!(
                "Failed to roll back storage of dataset {} after failed create: {}",
                spec.name(),
                e
            );
        }
    }

    async fn fail_create(
        &self,
        name: &str,
        type_name: &str,
        entity: &EntityId,
        owner_added: bool,
        source: OpExecutorError,
    ) -> CatalogError {
        audit::log_dataset_create_failed(name, type_name, &source.to_string());
        self.rollback_owner(entity, owner_added).await;

        // Another coordinator sharing the catalog may have claimed the
        // storage and the catalog entry first.
        if matches!(source, OpExecutorError::AlreadyExists { .. })
            || matches!(self.instances.get(name).await, Ok(Some(_)))
        {
            return CatalogError::InstanceExists {
                name: name.to_string(),
            };
        }

        CatalogError::Execution {
            operation: "create".to_string(),
            name: name.to_string(),
            source,
        }
    }

    async fn rollback_owner(&self, entity: &EntityId, owner_added: bool) {
        if !owner_added {
            return;
        }
        if let Err(e) = self.owners.delete(entity).await {
            tracing::error!(
                "Failed to roll back owner record of {} after failed create: {}",
                entity,
                e
            );
        }
    }
}
