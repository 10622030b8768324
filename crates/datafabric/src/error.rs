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

//! Error types returned by the lifecycle coordinator.
//!
//! Every variant names the instance, type or operation it concerns.
//! [`CatalogError::kind`] groups variants into the categories transports map
//! to status codes.

use thiserror::Error;

use crate::executor::OpExecutorError;
use crate::explore::ExploreError;
use crate::registry::RegistryError;
use crate::security::OwnerStoreError;

/// Coarse classification of a [`CatalogError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request was malformed; nothing was changed.
    Validation,
    /// The request clashes with existing state.
    Conflict,
    /// The named instance, type or operation does not exist, or another
    /// caller removed the instance first.
    NotFound,
    /// The operation is disabled by configuration.
    Forbidden,
    /// The op executor failed, timed out or panicked.
    IsolationExecution,
    /// A best-effort collaborator failed where its answer was required.
    BestEffort,
    /// A bulk operation completed only in part.
    PartialFailure,
    /// A catalog store failed.
    Internal,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Invalid dataset instance name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Invalid owner for dataset instance '{name}': {source}")]
    InvalidOwner {
        name: String,
        #[source]
        source: OwnerStoreError,
    },

    #[error("Dataset instance '{name}' already exists")]
    InstanceExists { name: String },

    #[error("Owner information already exists for dataset instance '{name}'")]
    OwnerExists { name: String },

    #[error("Dataset instance '{name}' does not exist")]
    InstanceNotFound { name: String },

    #[error("Dataset instance '{name}' was dropped concurrently")]
    ConcurrentlyDropped { name: String },

    #[error("Dataset type '{type_name}' of instance '{name}' was not found")]
    TypeNotFound { name: String, type_name: String },

    #[error("Unknown admin operation '{operation}' for dataset instance '{name}'")]
    UnknownAdminOperation { name: String, operation: String },

    #[error(
        "Admin operation '{operation}' is not available for dataset instance '{name}'; \
         use the dataset {operation} endpoint instead"
    )]
    DisallowedAdminOperation { name: String, operation: String },

    #[error("Failed to {operation} dataset instance '{name}': {source}")]
    Execution {
        operation: String,
        name: String,
        #[source]
        source: OpExecutorError,
    },

    #[error("{0}")]
    ExploreListing(#[source] ExploreError),

    #[error("Operation '{operation}' is disabled")]
    Forbidden { operation: String },

    #[error(
        "Dropped {dropped} dataset instance(s) but failed to drop {}: {}",
        .failed.len(),
        .failed.join(", ")
    )]
    PartialFailure { dropped: usize, failed: Vec<String> },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    OwnerStore(#[from] OwnerStoreError),
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::InvalidName { .. } | CatalogError::InvalidOwner { .. } => {
                ErrorKind::Validation
            }
            CatalogError::InstanceExists { .. }
            | CatalogError::OwnerExists { .. } => ErrorKind::Conflict,
            CatalogError::InstanceNotFound { .. }
            | CatalogError::ConcurrentlyDropped { .. }
            | CatalogError::TypeNotFound { .. }
            | CatalogError::UnknownAdminOperation { .. }
            | CatalogError::DisallowedAdminOperation { .. } => ErrorKind::NotFound,
            CatalogError::Forbidden { .. } => ErrorKind::Forbidden,
            CatalogError::Execution { .. } => ErrorKind::IsolationExecution,
            CatalogError::ExploreListing(_) => ErrorKind::BestEffort,
            CatalogError::PartialFailure { .. } => ErrorKind::PartialFailure,
            CatalogError::Registry(_) | CatalogError::OwnerStore(_) => ErrorKind::Internal,
        }
    }

    /// Stable machine-readable code for the error.
    pub fn error_code(&self) -> &'static str {
        match self {
            CatalogError::InvalidName { .. } => "INVALID_NAME",
            CatalogError::InvalidOwner { .. } => "INVALID_OWNER",
            CatalogError::InstanceExists { .. } => "INSTANCE_EXISTS",
            CatalogError::OwnerExists { .. } => "OWNER_EXISTS",
            CatalogError::InstanceNotFound { .. } => "INSTANCE_NOT_FOUND",
            CatalogError::ConcurrentlyDropped { .. } => "CONCURRENTLY_DROPPED",
            CatalogError::TypeNotFound { .. } => "TYPE_NOT_FOUND",
            CatalogError::UnknownAdminOperation { .. } => "UNKNOWN_OPERATION",
            CatalogError::DisallowedAdminOperation { .. } => "OPERATION_NOT_ALLOWED",
            CatalogError::Execution { .. } => "EXECUTION_FAILED",
            CatalogError::ExploreListing(_) => "EXPLORE_UNAVAILABLE",
            CatalogError::Forbidden { .. } => "FORBIDDEN",
            CatalogError::PartialFailure { .. } => "PARTIAL_FAILURE",
            CatalogError::Registry(_) | CatalogError::OwnerStore(_) => "INTERNAL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_subject() {
        let err = CatalogError::TypeNotFound {
            name: "fooData".into(),
            type_name: "cube".into(),
        };
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains("fooData"));
        assert!(err.to_string().contains("cube"));

        let err = CatalogError::Execution {
            operation: "create".into(),
            name: "fooData".into(),
            source: OpExecutorError::Execution {
                operation: "create".into(),
                instance: "fooData".into(),
                reason: "no space left".into(),
            },
        };
        assert_eq!(err.kind(), ErrorKind::IsolationExecution);
        assert!(err.to_string().contains("no space left"));
    }

    #[test]
    fn test_disallowed_admin_points_at_lifecycle_endpoint() {
        let err = CatalogError::DisallowedAdminOperation {
            name: "fooData".into(),
            operation: "drop".into(),
        };
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains("dataset drop endpoint"));
    }

    #[test]
    fn test_lost_drop_race_is_not_found() {
        let err = CatalogError::ConcurrentlyDropped {
            name: "fooData".into(),
        };
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.error_code(), "CONCURRENTLY_DROPPED");
    }

    #[test]
    fn test_partial_failure_lists_failures() {
        let err = CatalogError::PartialFailure {
            dropped: 2,
            failed: vec!["a".into(), "b".into()],
        };
        assert_eq!(err.kind(), ErrorKind::PartialFailure);
        assert_eq!(
            err.to_string(),
            "Dropped 2 dataset instance(s) but failed to drop 2: a, b"
        );
    }
}
