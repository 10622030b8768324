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

//! # Lifecycle Coordinator
//!
//! The [`LifecycleCoordinator`] keeps four independent stores in step: the
//! instance catalog, the owner store, the physical resources behind the
//! [`OpExecutor`] and the query engine behind the [`ExploreGateway`]. None
//! of these share a transaction, so each protocol orders its steps to keep
//! the visible inconsistencies to a known, logged set:
//!
//! - create: owner record, physical create, catalog commit, explore enable.
//!   A failed physical create or commit rolls the owner record back. A
//!   failed explore enable is logged and ignored. Storage found under a
//!   name the catalog does not know is left over from an earlier failed
//!   create and is dropped before creating again.
//! - drop: explore disable, catalog removal, owner removal, physical drop.
//!   A failed physical drop leaves orphaned storage behind an already
//!   removed catalog entry.
//!
//! Concurrent creates of one name are serialised by a create reservation
//! taken before anything else is touched; the losers fail with a conflict
//! without reaching the op executor. The catalog's atomic add-if-absent
//! still decides between coordinators that share a catalog. No lock is held
//! across collaborator calls.
//!
//! Every op executor call is bounded by the configured op timeout.

mod admin;
mod create;
mod drop;
mod list;

pub use admin::AdminOperation;
pub use drop::BulkDropReport;
pub use list::ListOptions;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use crate::config::DatasetServiceConfig;
use crate::error::CatalogError;
use crate::executor::{OpExecutor, OpExecutorError};
use crate::explore::ExploreGateway;
use crate::metrics;
use crate::models::{DatasetMeta, EntityId};
use crate::registry::{InstanceRegistry, TypeRegistry};
use crate::security::OwnerStore;

static INSTANCE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.\-]*$").expect("valid regex"));

/// Coordinates dataset instance lifecycles across the catalog stores.
pub struct LifecycleCoordinator {
    config: DatasetServiceConfig,
    types: Arc<dyn TypeRegistry>,
    instances: Arc<dyn InstanceRegistry>,
    owners: Arc<dyn OwnerStore>,
    executor: Arc<dyn OpExecutor>,
    explore: Arc<dyn ExploreGateway>,
    creating: Mutex<HashSet<String>>,
}

/// Exclusive right to create one instance name, released on drop.
pub(crate) struct CreateReservation<'a> {
    creating: &'a Mutex<HashSet<String>>,
    name: String,
}

impl Drop for CreateReservation<'_> {
    fn drop(&mut self) {
        self.creating.lock().remove(&self.name);
    }
}

impl LifecycleCoordinator {
    pub fn new(
        config: DatasetServiceConfig,
        types: Arc<dyn TypeRegistry>,
        instances: Arc<dyn InstanceRegistry>,
        owners: Arc<dyn OwnerStore>,
        executor: Arc<dyn OpExecutor>,
        explore: Arc<dyn ExploreGateway>,
    ) -> Self {
        Self {
            config,
            types,
            instances,
            owners,
            executor,
            explore,
            creating: Mutex::new(HashSet::new()),
        }
    }

    pub fn config(&self) -> &DatasetServiceConfig {
        &self.config
    }

    /// Returns the instance together with its type metadata and owner, or
    /// `None` if no instance of that name is registered.
    pub async fn get(&self, name: &str) -> Result<Option<DatasetMeta>, CatalogError> {
        if !is_valid_instance_name(name) {
            return Ok(None);
        }
        let Some(spec) = self.instances.get(name).await? else {
            return Ok(None);
        };
        let type_meta = self.types.get_type_info(spec.type_name()).await?;
        let owner = self
            .owners
            .get_owner(&self.dataset_id(name))
            .await?
            .map(|principal| principal.as_str().to_string());
        Ok(Some(DatasetMeta::new(spec, type_meta).with_owner_principal(owner)))
    }

    fn dataset_id(&self, name: &str) -> EntityId {
        self.config.namespace().dataset(name)
    }

    /// Reserves `name` for a create, or returns `None` if another create of
    /// the same name is in progress.
    fn reserve_create(&self, name: &str) -> Option<CreateReservation<'_>> {
        if !self.creating.lock().insert(name.to_string()) {
            return None;
        }
        Some(CreateReservation {
            creating: &self.creating,
            name: name.to_string(),
        })
    }

    /// Runs one op executor call under the op timeout, recording its latency
    /// and outcome. A call still running at the deadline is abandoned.
    async fn timed_op<T, F>(
        &self,
        operation: &'static str,
        instance: &str,
        call: F,
    ) -> Result<T, OpExecutorError>
    where
        F: Future<Output = Result<T, OpExecutorError>>,
    {
        let timeout = self.config.op_timeout();
        let started = Instant::now();
        let result = match tokio::time::timeout(timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    "Op executor {} of dataset '{}' exceeded {:?}",
                    operation,
                    instance,
                    timeout
                );
                Err(OpExecutorError::Timeout {
                    operation: operation.to_string(),
                    instance: instance.to_string(),
                    timeout,
                })
            }
        };
        metrics::record_op_executor_call(operation, started.elapsed(), result.is_err());
        result
    }
}

/// Whether `name` may be used for a new dataset instance.
pub fn is_valid_instance_name(name: &str) -> bool {
    INSTANCE_NAME.is_match(name)
}
