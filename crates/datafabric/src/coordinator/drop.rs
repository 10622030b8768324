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

use serde::{Deserialize, Serialize};

use super::{is_valid_instance_name, LifecycleCoordinator};
use crate::error::CatalogError;
use crate::metrics;
use crate::models::{DatasetSpecification, DatasetTypeMeta};
use crate::security::audit;

/// Outcome of a successful unrecoverable reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkDropReport {
    /// Instances this call dropped.
    pub dropped: Vec<String>,
    /// Instances another caller dropped while the reset was running.
    pub skipped: Vec<String>,
}

impl LifecycleCoordinator {
    /// Drops dataset instance `name`.
    ///
    /// # Errors
    ///
    /// * [`CatalogError::InstanceNotFound`] - no such instance
    /// * [`CatalogError::ConcurrentlyDropped`] - another caller removed the
    ///   catalog entry between lookup and removal
    /// * [`CatalogError::Execution`] - the physical drop failed after the
    ///   catalog entry was removed
    pub async fn drop_instance(&self, name: &str) -> Result<(), CatalogError> {
        tracing::info!("Deleting dataset {}", name);

        let spec = if is_valid_instance_name(name) {
            self.instances.get(name).await?
        } else {
            None
        };
        let spec = spec.ok_or_else(|| CatalogError::InstanceNotFound {
            name: name.to_string(),
        })?;

        self.drop_spec(spec).await
    }

    /// Drops every registered instance.
    ///
    /// Refused unless the unrecoverable reset is enabled. A failure to drop
    /// one instance does not stop the others.
    ///
    /// # Errors
    ///
    /// * [`CatalogError::Forbidden`] - the reset is disabled; nothing was changed
    /// * [`CatalogError::PartialFailure`] - at least one instance failed to drop
    pub async fn drop_all_unrecoverable(&self) -> Result<BulkDropReport, CatalogError> {
        if !self.config.unrecoverable_reset() {
            audit::log_unrecoverable_reset_denied();
            return Err(CatalogError::Forbidden {
                operation: "unrecoverable reset".to_string(),
            });
        }

        let mut report = BulkDropReport::default();
        let mut failed = Vec::new();
        for spec in self.instances.get_all().await? {
            let name = spec.name().to_string();
            match self.drop_spec(spec).await {
                Ok(()) => report.dropped.push(name),
                Err(CatalogError::ConcurrentlyDropped { .. }) => {
                    tracing::debug!("Dataset {} was dropped concurrently during reset", name);
                    report.skipped.push(name);
                }
                Err(e) => {
                    tracing::warn!("Cannot delete dataset {}: {}", name, e);
                    failed.push(name);
                }
            }
        }

        audit::log_unrecoverable_reset(report.dropped.len(), failed.len());
        if failed.is_empty() {
            Ok(report)
        } else {
            Err(CatalogError::PartialFailure {
                dropped: report.dropped.len(),
                failed,
            })
        }
    }

    async fn drop_spec(&self, spec: DatasetSpecification) -> Result<(), CatalogError> {
        let name = spec.name().to_string();
        // An instance outlives its type's registration and must stay droppable.
        let type_meta = match self.types.get_type_info(spec.type_name()).await? {
            Some(type_meta) => type_meta,
            None => {
                tracing::warn!(
                    "Type {} of dataset {} is no longer registered, dropping without its modules",
                    spec.type_name(),
                    name
                );
                DatasetTypeMeta::new(spec.type_name(), Vec::new())
            }
        };

        if let Err(e) = self.explore.disable_explore(&name).await {
            audit::log_explore_failure(&name, "disable", &e.to_string());
            metrics::record_explore_failure("disable");
        }

        if !self.instances.delete(&name).await? {
            return Err(CatalogError::ConcurrentlyDropped { name });
        }
        metrics::record_dropped(spec.type_name());

        if let Err(e) = self.owners.delete(&self.dataset_id(&name)).await {
            tracing::error!("Failed to delete owner record of dataset {}: {}", name, e);
        }

        match self
            .timed_op("drop", &name, self.executor.drop_dataset(&spec, &type_meta))
            .await
        {
            Ok(()) => {
                audit::log_dataset_dropped(&name, spec.type_name());
                Ok(())
            }
            Err(source) => {
                audit::log_dataset_drop_failed(&name, spec.type_name(), &source.to_string());
                Err(CatalogError::Execution {
                    operation: "drop".to_string(),
                    name,
                    source,
                })
            }
        }
    }
}
