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

//! Request/response messages exchanged with an op worker.
//!
//! One JSON request is written to the worker's stdin and one JSON response is
//! read back from its stdout.

use serde::{Deserialize, Serialize};

use super::{OpExecutor, OpExecutorError};
use crate::models::{DatasetSpecification, DatasetTypeMeta, Properties};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum OpRequest {
    Create {
        name: String,
        #[serde(rename = "typeMeta")]
        type_meta: DatasetTypeMeta,
        #[serde(default)]
        properties: Properties,
    },
    Drop {
        spec: DatasetSpecification,
        #[serde(rename = "typeMeta")]
        type_meta: DatasetTypeMeta,
    },
    Truncate {
        name: String,
    },
    Upgrade {
        name: String,
    },
    Exists {
        name: String,
    },
}

impl OpRequest {
    pub fn operation(&self) -> &'static str {
        match self {
            OpRequest::Create { .. } => "create",
            OpRequest::Drop { .. } => "drop",
            OpRequest::Truncate { .. } => "truncate",
            OpRequest::Upgrade { .. } => "upgrade",
            OpRequest::Exists { .. } => "exists",
        }
    }

    /// Name of the instance the request targets.
    pub fn instance(&self) -> &str {
        match self {
            OpRequest::Create { name, .. }
            | OpRequest::Truncate { name }
            | OpRequest::Upgrade { name }
            | OpRequest::Exists { name } => name,
            OpRequest::Drop { spec, .. } => spec.name(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum OpResponse {
    Created { spec: DatasetSpecification },
    Done,
    Exists { exists: bool },
    /// The instance has no physical resources.
    NotFound { name: String },
    /// The instance already has physical resources.
    AlreadyExists { name: String },
    Failed { message: String },
}

/// Runs `request` against `executor`, folding any error into
/// [`OpResponse::Failed`] except missing or already present resources,
/// which keep their own responses.
pub async fn execute_request<E: OpExecutor + ?Sized>(executor: &E, request: OpRequest) -> OpResponse {
    let result = match request {
        OpRequest::Create {
            name,
            type_meta,
            properties,
        } => executor
            .create(&name, &type_meta, &properties)
            .await
            .map(|spec| OpResponse::Created { spec }),
        OpRequest::Drop { spec, type_meta } => executor
            .drop_dataset(&spec, &type_meta)
            .await
            .map(|()| OpResponse::Done),
        OpRequest::Truncate { name } => executor.truncate(&name).await.map(|()| OpResponse::Done),
        OpRequest::Upgrade { name } => executor.upgrade(&name).await.map(|()| OpResponse::Done),
        OpRequest::Exists { name } => executor
            .exists(&name)
            .await
            .map(|exists| OpResponse::Exists { exists }),
    };

    match result {
        Ok(response) => response,
        Err(OpExecutorError::InstanceNotFound { name }) => OpResponse::NotFound { name },
        Err(OpExecutorError::AlreadyExists { name }) => OpResponse::AlreadyExists { name },
        Err(e) => OpResponse::Failed {
            message: e.to_string(),
        },
    }
}
