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

//! Out-of-process op execution.
//!
//! Each call starts a fresh worker process, writes one [`OpRequest`] to its
//! stdin and reads one [`OpResponse`] from its stdout. The worker never
//! shares memory with the coordinator, so misbehaving type code can at
//! worst fail its own call.

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::protocol::{OpRequest, OpResponse};
use super::{OpExecutor, OpExecutorError};
use crate::models::{DatasetSpecification, DatasetTypeMeta, Properties};

/// [`OpExecutor`] that delegates every call to a worker process.
#[derive(Debug, Clone)]
pub struct SubprocessOpExecutor {
    program: PathBuf,
    args: Vec<OsString>,
}

impl SubprocessOpExecutor {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends arguments passed to every worker invocation.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    async fn call(&self, request: OpRequest) -> Result<OpResponse, OpExecutorError> {
        let operation = request.operation();
        let instance = request.instance().to_string();
        let payload = serde_json::to_vec(&request)
            .map_err(|e| OpExecutorError::Protocol(format!("Failed to encode request: {}", e)))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&payload).await?;
            stdin.shutdown().await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OpExecutorError::Execution {
                operation: operation.to_string(),
                instance,
                reason: format!("worker exited with {}: {}", output.status, stderr.trim()),
            });
        }

        let response: OpResponse = serde_json::from_slice(&output.stdout).map_err(|e| {
            OpExecutorError::Protocol(format!(
                "Malformed {} response for dataset '{}': {}",
                operation, instance, e
            ))
        })?;

        match response {
            OpResponse::Failed { message } => Err(OpExecutorError::Execution {
                operation: operation.to_string(),
                instance,
                reason: message,
            }),
            OpResponse::NotFound { name } => Err(OpExecutorError::InstanceNotFound { name }),
            OpResponse::AlreadyExists { name } => Err(OpExecutorError::AlreadyExists { name }),
            other => Ok(other),
        }
    }
}

fn unexpected(operation: &str, response: OpResponse) -> OpExecutorError {
    OpExecutorError::Protocol(format!(
        "Unexpected response to {}: {:?}",
        operation, response
    ))
}

#[async_trait]
impl OpExecutor for SubprocessOpExecutor {
    async fn create(
        &self,
        name: &str,
        type_meta: &DatasetTypeMeta,
        properties: &Properties,
    ) -> Result<DatasetSpecification, OpExecutorError> {
        let request = OpRequest::Create {
            name: name.to_string(),
            type_meta: type_meta.clone(),
            properties: properties.clone(),
        };
        match self.call(request).await? {
            OpResponse::Created { spec } => Ok(spec),
            other => Err(unexpected("create", other)),
        }
    }

    async fn drop_dataset(
        &self,
        spec: &DatasetSpecification,
        type_meta: &DatasetTypeMeta,
    ) -> Result<(), OpExecutorError> {
        let request = OpRequest::Drop {
            spec: spec.clone(),
            type_meta: type_meta.clone(),
        };
        match self.call(request).await? {
            OpResponse::Done => Ok(()),
            other => Err(unexpected("drop", other)),
        }
    }

    async fn truncate(&self, name: &str) -> Result<(), OpExecutorError> {
        match self.call(OpRequest::Truncate { name: name.to_string() }).await? {
            OpResponse::Done => Ok(()),
            other => Err(unexpected("truncate", other)),
        }
    }

    async fn upgrade(&self, name: &str) -> Result<(), OpExecutorError> {
        match self.call(OpRequest::Upgrade { name: name.to_string() }).await? {
            OpResponse::Done => Ok(()),
            other => Err(unexpected("upgrade", other)),
        }
    }

    async fn exists(&self, name: &str) -> Result<bool, OpExecutorError> {
        match self.call(OpRequest::Exists { name: name.to_string() }).await? {
            OpResponse::Exists { exists } => Ok(exists),
            other => Err(unexpected("exists", other)),
        }
    }
}
