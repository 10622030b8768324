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

use serde_json::Value;
use std::fmt;

use super::{is_valid_instance_name, LifecycleCoordinator};
use crate::error::CatalogError;
use crate::executor::OpExecutorError;
use crate::models::DatasetAdminOpResponse;
use crate::security::audit;

/// Admin operations that map onto a single op executor call.
///
/// `create` and `drop` are not among them: they must go through the
/// lifecycle protocols so the catalog stays in step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminOperation {
    Exists,
    Truncate,
    Upgrade,
}

impl AdminOperation {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "exists" => Some(AdminOperation::Exists),
            "truncate" => Some(AdminOperation::Truncate),
            "upgrade" => Some(AdminOperation::Upgrade),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AdminOperation::Exists => "exists",
            AdminOperation::Truncate => "truncate",
            AdminOperation::Upgrade => "upgrade",
        }
    }
}

impl fmt::Display for AdminOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl LifecycleCoordinator {
    /// Runs admin operation `method` against instance `name`.
    ///
    /// The catalog is not consulted; the op executor is the authority on
    /// whether the physical resources exist. `exists` answers with a JSON
    /// boolean, the other operations with `null`.
    ///
    /// # Errors
    ///
    /// * [`CatalogError::DisallowedAdminOperation`] - `create` or `drop`
    /// * [`CatalogError::UnknownAdminOperation`] - any other unknown name
    /// * [`CatalogError::InstanceNotFound`] - the executor has no such instance
    /// * [`CatalogError::Execution`] - the executor failed
    pub async fn execute_admin(
        &self,
        name: &str,
        method: &str,
    ) -> Result<DatasetAdminOpResponse, CatalogError> {
        let operation = match AdminOperation::from_name(method) {
            Some(operation) => operation,
            None if method == "create" || method == "drop" => {
                return Err(CatalogError::DisallowedAdminOperation {
                    name: name.to_string(),
                    operation: method.to_string(),
                });
            }
            None => {
                return Err(CatalogError::UnknownAdminOperation {
                    name: name.to_string(),
                    operation: method.to_string(),
                });
            }
        };

        if !is_valid_instance_name(name) {
            return Err(CatalogError::InvalidName {
                name: name.to_string(),
                reason: "not a dataset instance name".to_string(),
            });
        }

        let result = match operation {
            AdminOperation::Exists => self
                .timed_op("exists", name, self.executor.exists(name))
                .await
                .map(Value::Bool),
            AdminOperation::Truncate => self
                .timed_op("truncate", name, self.executor.truncate(name))
                .await
                .map(|()| Value::Null),
            AdminOperation::Upgrade => self
                .timed_op("upgrade", name, self.executor.upgrade(name))
                .await
                .map(|()| Value::Null),
        };

        match result {
            Ok(value) => Ok(DatasetAdminOpResponse::new(value)),
            Err(OpExecutorError::InstanceNotFound { name }) => {
                Err(CatalogError::InstanceNotFound { name })
            }
            Err(source) => {
                audit::log_dataset_admin_failed(name, operation.as_str(), &source.to_string());
                Err(CatalogError::Execution {
                    operation: operation.to_string(),
                    name: name.to_string(),
                    source,
                })
            }
        }
    }
}
