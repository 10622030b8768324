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

//! # Dataset Op Execution
//!
//! Physical dataset operations run behind the [`OpExecutor`] boundary. Type
//! code is supplied by users, so the coordinator never calls it directly:
//!
//! - [`IsolatedOpExecutor`] wraps any executor so each call runs on its own
//!   task with owned inputs, contains panics and enforces a timeout.
//! - [`SubprocessOpExecutor`] runs every call in a fresh worker process and
//!   speaks the [`OpRequest`]/[`OpResponse`] protocol over stdin/stdout.
//! - [`LocalOpExecutor`] is what actually runs type code: it resolves the
//!   type to a [`DatasetDefinition`] and works against a data directory.

mod definition;
mod isolated;
mod local;
mod protocol;
mod subprocess;

pub use definition::{
    DatasetDefinition, DefinitionError, KeyValueTableDefinition, TableDefinition,
};
pub use isolated::IsolatedOpExecutor;
pub use local::LocalOpExecutor;
pub use protocol::{execute_request, OpRequest, OpResponse};
pub use subprocess::SubprocessOpExecutor;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::models::{DatasetSpecification, DatasetTypeMeta, Properties};

/// Errors raised at the op executor boundary.
#[derive(Debug, Error)]
pub enum OpExecutorError {
    /// The type code reported a failure.
    #[error("{operation} of dataset '{instance}' failed: {reason}")]
    Execution {
        operation: String,
        instance: String,
        reason: String,
    },

    #[error("{operation} of dataset '{instance}' timed out after {timeout:?}")]
    Timeout {
        operation: String,
        instance: String,
        timeout: Duration,
    },

    /// The type code panicked; the panic did not cross the boundary.
    #[error("{operation} of dataset '{instance}' panicked: {reason}")]
    Panicked {
        operation: String,
        instance: String,
        reason: String,
    },

    /// The worker broke the request/response protocol.
    #[error("Op worker protocol error: {0}")]
    Protocol(String),

    #[error("No definition is available for dataset type '{type_name}'")]
    UnknownType { type_name: String },

    #[error("Dataset '{name}' does not exist in storage")]
    InstanceNotFound { name: String },

    /// Physical resources for the name are already present.
    #[error("Dataset '{name}' already exists in storage")]
    AlreadyExists { name: String },

    #[error("Op executor I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Physical dataset operations, executed inside an isolation boundary.
///
/// Every call is independent; implementations hold no per-instance state
/// between calls beyond what lives in storage.
#[async_trait]
pub trait OpExecutor: Send + Sync {
    /// Configures and creates the physical resources of instance `name`,
    /// returning the resulting specification.
    ///
    /// Fails with [`OpExecutorError::AlreadyExists`] if resources for
    /// `name` are already present; existing resources are never replaced.
    async fn create(
        &self,
        name: &str,
        type_meta: &DatasetTypeMeta,
        properties: &Properties,
    ) -> Result<DatasetSpecification, OpExecutorError>;

    /// Removes the physical resources described by `spec`.
    async fn drop_dataset(
        &self,
        spec: &DatasetSpecification,
        type_meta: &DatasetTypeMeta,
    ) -> Result<(), OpExecutorError>;

    /// Removes all data while keeping the instance.
    async fn truncate(&self, name: &str) -> Result<(), OpExecutorError>;

    /// Re-applies the instance's type code to its existing resources.
    async fn upgrade(&self, name: &str) -> Result<(), OpExecutorError>;

    /// Whether the physical resources of `name` exist.
    async fn exists(&self, name: &str) -> Result<bool, OpExecutorError>;
}
