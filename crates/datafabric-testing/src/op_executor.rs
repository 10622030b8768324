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
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use datafabric::executor::{OpExecutor, OpExecutorError};
use datafabric::models::{DatasetSpecification, DatasetTypeMeta, Properties};

/// Op executor calls, for failure injection and call inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptedOp {
    Create,
    Drop,
    Truncate,
    Upgrade,
    Exists,
}

impl ScriptedOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptedOp::Create => "create",
            ScriptedOp::Drop => "drop",
            ScriptedOp::Truncate => "truncate",
            ScriptedOp::Upgrade => "upgrade",
            ScriptedOp::Exists => "exists",
        }
    }
}

/// One call received by a [`ScriptedOpExecutor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub op: ScriptedOp,
    pub instance: String,
}

/// [`OpExecutor`] backed by an in-memory map of "physical" instances.
///
/// Like real storage, creating an instance that already exists physically
/// fails with [`OpExecutorError::AlreadyExists`].
#[derive(Debug, Default)]
pub struct ScriptedOpExecutor {
    physical: RwLock<BTreeMap<String, DatasetSpecification>>,
    failures: RwLock<HashMap<(ScriptedOp, String), String>>,
    delays: Mutex<HashMap<(ScriptedOp, String), Duration>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedOpExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every `op` call for `instance` fail with `message`.
    pub fn fail(&self, op: ScriptedOp, instance: &str, message: &str) {
        self.failures
            .write()
            .insert((op, instance.to_string()), message.to_string());
    }

    /// Makes the next `op` call for `instance` sleep for `delay` before
    /// doing its work.
    pub fn delay_once(&self, op: ScriptedOp, instance: &str, delay: Duration) {
        self.delays.lock().insert((op, instance.to_string()), delay);
    }

    pub fn clear_failures(&self) {
        self.failures.write().clear();
    }

    /// Adds physical resources without going through `create`.
    pub fn insert_physical(&self, spec: DatasetSpecification) {
        self.physical.write().insert(spec.name().to_string(), spec);
    }

    pub fn physically_exists(&self, instance: &str) -> bool {
        self.physical.read().contains_key(instance)
    }

    pub fn physical_names(&self) -> Vec<String> {
        self.physical.read().keys().cloned().collect()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Instances `op` was called for, in call order.
    pub fn calls_for(&self, op: ScriptedOp) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.op == op)
            .map(|call| call.instance.clone())
            .collect()
    }

    fn begin(&self, op: ScriptedOp, instance: &str) -> Result<(), OpExecutorError> {
        self.calls.lock().push(RecordedCall {
            op,
            instance: instance.to_string(),
        });
        match self.failures.read().get(&(op, instance.to_string())) {
            Some(message) => Err(OpExecutorError::Execution {
                operation: op.as_str().to_string(),
                instance: instance.to_string(),
                reason: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn require_physical(&self, instance: &str) -> Result<(), OpExecutorError> {
        if self.physically_exists(instance) {
            Ok(())
        } else {
            Err(OpExecutorError::InstanceNotFound {
                name: instance.to_string(),
            })
        }
    }
}

#[async_trait]
impl OpExecutor for ScriptedOpExecutor {
    async fn create(
        &self,
        name: &str,
        type_meta: &DatasetTypeMeta,
        properties: &Properties,
    ) -> Result<DatasetSpecification, OpExecutorError> {
        self.begin(ScriptedOp::Create, name)?;
        let delay = self.delays.lock().remove(&(ScriptedOp::Create, name.to_string()));
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let spec = DatasetSpecification::builder(name, type_meta.name.as_str())
            .properties(properties)
            .build();
        let mut physical = self.physical.write();
        if physical.contains_key(name) {
            return Err(OpExecutorError::AlreadyExists {
                name: name.to_string(),
            });
        }
        physical.insert(name.to_string(), spec.clone());
        Ok(spec)
    }

    async fn drop_dataset(
        &self,
        spec: &DatasetSpecification,
        _type_meta: &DatasetTypeMeta,
    ) -> Result<(), OpExecutorError> {
        self.begin(ScriptedOp::Drop, spec.name())?;
        self.physical.write().remove(spec.name());
        Ok(())
    }

    async fn truncate(&self, name: &str) -> Result<(), OpExecutorError> {
        self.begin(ScriptedOp::Truncate, name)?;
        self.require_physical(name)
    }

    async fn upgrade(&self, name: &str) -> Result<(), OpExecutorError> {
        self.begin(ScriptedOp::Upgrade, name)?;
        self.require_physical(name)
    }

    async fn exists(&self, name: &str) -> Result<bool, OpExecutorError> {
        self.begin(ScriptedOp::Exists, name)?;
        Ok(self.physically_exists(name))
    }
}
