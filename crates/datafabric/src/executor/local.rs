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

//! Executes dataset type code against a local data directory.
//!
//! Layout of one instance:
//!
//! ```text
//! <data_dir>/<instance>/spec.json
//! <data_dir>/<instance>/data/<instance>/
//! <data_dir>/<instance>/data/<embedded spec name>/...
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::definition::{DatasetDefinition, KeyValueTableDefinition, TableDefinition};
use super::{OpExecutor, OpExecutorError};
use crate::models::{DatasetSpecification, DatasetTypeMeta, Properties};
use crate::storage;

const SPEC_FILE: &str = "spec.json";
const DATA_DIR: &str = "data";

/// [`OpExecutor`] that runs [`DatasetDefinition`]s in the current process.
///
/// On its own this provides no isolation; wrap it in an
/// [`IsolatedOpExecutor`](super::IsolatedOpExecutor) or run it inside the
/// op worker behind a [`SubprocessOpExecutor`](super::SubprocessOpExecutor).
pub struct LocalOpExecutor {
    data_dir: PathBuf,
    definitions: HashMap<String, Arc<dyn DatasetDefinition>>,
}

impl LocalOpExecutor {
    /// An executor with no definitions.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            definitions: HashMap::new(),
        }
    }

    /// An executor that knows the built-in `table` and `keyValueTable` types.
    pub fn with_builtin_definitions(data_dir: impl Into<PathBuf>) -> Self {
        Self::new(data_dir)
            .with_definition(Arc::new(TableDefinition))
            .with_definition(Arc::new(KeyValueTableDefinition))
    }

    pub fn with_definition(mut self, definition: Arc<dyn DatasetDefinition>) -> Self {
        self.definitions
            .insert(definition.type_name().to_string(), definition);
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn definition(&self, type_name: &str) -> Result<&Arc<dyn DatasetDefinition>, OpExecutorError> {
        self.definitions
            .get(type_name)
            .ok_or_else(|| OpExecutorError::UnknownType {
                type_name: type_name.to_string(),
            })
    }

    fn instance_dir(&self, operation: &str, name: &str) -> Result<PathBuf, OpExecutorError> {
        if !storage::is_safe_component(name) {
            return Err(OpExecutorError::Execution {
                operation: operation.to_string(),
                instance: name.to_string(),
                reason: "name cannot be used as a storage path".to_string(),
            });
        }
        Ok(self.data_dir.join(name))
    }

    async fn read_spec(&self, operation: &str, name: &str) -> Result<DatasetSpecification, OpExecutorError> {
        let path = self.instance_dir(operation, name)?.join(SPEC_FILE);
        let bytes = storage::read_if_present(&path)
            .await?
            .ok_or_else(|| OpExecutorError::InstanceNotFound {
                name: name.to_string(),
            })?;
        serde_json::from_slice(&bytes).map_err(|e| OpExecutorError::Execution {
            operation: operation.to_string(),
            instance: name.to_string(),
            reason: format!("stored specification is unreadable: {}", e),
        })
    }

    async fn write_spec(&self, dir: &Path, spec: &DatasetSpecification) -> Result<(), OpExecutorError> {
        let bytes = serde_json::to_vec_pretty(spec).map_err(|e| OpExecutorError::Execution {
            operation: "write specification".to_string(),
            instance: spec.name().to_string(),
            reason: e.to_string(),
        })?;
        let temp = dir.join(format!(".{}.tmp", SPEC_FILE));
        tokio::fs::write(&temp, bytes).await?;
        tokio::fs::rename(&temp, dir.join(SPEC_FILE)).await?;
        Ok(())
    }

    async fn ensure_data_dirs(dir: &Path, spec: &DatasetSpecification) -> io::Result<()> {
        for part in spec.flatten() {
            tokio::fs::create_dir_all(dir.join(DATA_DIR).join(part.name())).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl OpExecutor for LocalOpExecutor {
    async fn create(
        &self,
        name: &str,
        type_meta: &DatasetTypeMeta,
        properties: &Properties,
    ) -> Result<DatasetSpecification, OpExecutorError> {
        let definition = self.definition(&type_meta.name)?;
        let dir = self.instance_dir("create", name)?;
        let spec = definition
            .configure(name, properties)
            .map_err(|e| OpExecutorError::Execution {
                operation: "create".to_string(),
                instance: name.to_string(),
                reason: e.to_string(),
            })?;

        tokio::fs::create_dir_all(&self.data_dir).await?;
        match tokio::fs::create_dir(&dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(OpExecutorError::AlreadyExists {
                    name: name.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        }

        Self::ensure_data_dirs(&dir, &spec).await?;
        self.write_spec(&dir, &spec).await?;
        tracing::debug!("Created storage for dataset '{}' in {}", name, dir.display());
        Ok(spec)
    }

    async fn drop_dataset(
        &self,
        spec: &DatasetSpecification,
        _type_meta: &DatasetTypeMeta,
    ) -> Result<(), OpExecutorError> {
        let dir = self.instance_dir("drop", spec.name())?;
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => {
                tracing::debug!("Dropped storage for dataset '{}'", spec.name());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No storage to drop for dataset '{}'", spec.name());
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn truncate(&self, name: &str) -> Result<(), OpExecutorError> {
        let spec = self.read_spec("truncate", name).await?;
        let dir = self.instance_dir("truncate", name)?;
        for part in spec.flatten() {
            let data = dir.join(DATA_DIR).join(part.name());
            match tokio::fs::remove_dir_all(&data).await {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
            tokio::fs::create_dir_all(&data).await?;
        }
        Ok(())
    }

    async fn upgrade(&self, name: &str) -> Result<(), OpExecutorError> {
        let current = self.read_spec("upgrade", name).await?;
        let definition = self.definition(current.type_name())?;
        let upgraded = definition
            .configure(name, current.properties())
            .map_err(|e| OpExecutorError::Execution {
                operation: "upgrade".to_string(),
                instance: name.to_string(),
                reason: e.to_string(),
            })?;

        let dir = self.instance_dir("upgrade", name)?;
        Self::ensure_data_dirs(&dir, &upgraded).await?;
        self.write_spec(&dir, &upgraded).await?;
        Ok(())
    }

    async fn exists(&self, name: &str) -> Result<bool, OpExecutorError> {
        let path = self.instance_dir("exists", name)?.join(SPEC_FILE);
        Ok(tokio::fs::try_exists(path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::builtin_types;
    use tempfile::TempDir;

    fn meta(type_name: &str) -> DatasetTypeMeta {
        builtin_types()
            .into_iter()
            .find(|m| m.name == type_name)
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_exists_drop() {
        let dir = TempDir::new().unwrap();
        let executor = LocalOpExecutor::with_builtin_definitions(dir.path());

        assert!(!executor.exists("sessions").await.unwrap());
        let spec = executor
            .create("sessions", &meta("keyValueTable"), &Properties::new())
            .await
            .unwrap();
        assert!(executor.exists("sessions").await.unwrap());
        assert!(dir.path().join("sessions/data/sessions.kv").is_dir());

        executor
            .drop_dataset(&spec, &meta("keyValueTable"))
            .await
            .unwrap();
        assert!(!executor.exists("sessions").await.unwrap());
        // Dropping again is a no-op.
        executor
            .drop_dataset(&spec, &meta("keyValueTable"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_refuses_existing_storage() {
        let dir = TempDir::new().unwrap();
        let executor = LocalOpExecutor::with_builtin_definitions(dir.path());
        executor
            .create("purchases", &meta("table"), &Properties::new())
            .await
            .unwrap();

        let err = executor
            .create("purchases", &meta("table"), &Properties::new())
            .await
            .unwrap_err();
        assert!(matches!(err, OpExecutorError::AlreadyExists { ref name } if name == "purchases"));
    }

    #[tokio::test]
    async fn test_partial_storage_blocks_create_until_dropped() {
        let dir = TempDir::new().unwrap();
        let executor = LocalOpExecutor::with_builtin_definitions(dir.path());
        // A create interrupted before it wrote its specification.
        std::fs::create_dir_all(dir.path().join("purchases/data")).unwrap();
        assert!(!executor.exists("purchases").await.unwrap());

        let err = executor
            .create("purchases", &meta("table"), &Properties::new())
            .await
            .unwrap_err();
        assert!(matches!(err, OpExecutorError::AlreadyExists { .. }));

        let leftover = DatasetSpecification::builder("purchases", "table").build();
        executor.drop_dataset(&leftover, &meta("table")).await.unwrap();
        executor
            .create("purchases", &meta("table"), &Properties::new())
            .await
            .unwrap();
        assert!(executor.exists("purchases").await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_type() {
        let dir = TempDir::new().unwrap();
        let executor = LocalOpExecutor::new(dir.path());
        let err = executor
            .create("purchases", &meta("table"), &Properties::new())
            .await
            .unwrap_err();
        assert!(matches!(err, OpExecutorError::UnknownType { ref type_name } if type_name == "table"));
    }

    #[tokio::test]
    async fn test_truncate_empties_data() {
        let dir = TempDir::new().unwrap();
        let executor = LocalOpExecutor::with_builtin_definitions(dir.path());
        executor
            .create("purchases", &meta("table"), &Properties::new())
            .await
            .unwrap();
        let data = dir.path().join("purchases/data/purchases");
        std::fs::write(data.join("segment-0"), b"rows").unwrap();

        executor.truncate("purchases").await.unwrap();
        assert!(data.is_dir());
        assert_eq!(std::fs::read_dir(&data).unwrap().count(), 0);
        assert!(executor.exists("purchases").await.unwrap());
    }

    #[tokio::test]
    async fn test_admin_ops_on_missing_instance() {
        let dir = TempDir::new().unwrap();
        let executor = LocalOpExecutor::with_builtin_definitions(dir.path());
        assert!(matches!(
            executor.truncate("ghost").await,
            Err(OpExecutorError::InstanceNotFound { .. })
        ));
        assert!(matches!(
            executor.upgrade("ghost").await,
            Err(OpExecutorError::InstanceNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_upgrade_restores_missing_data_dirs() {
        let dir = TempDir::new().unwrap();
        let executor = LocalOpExecutor::with_builtin_definitions(dir.path());
        executor
            .create("sessions", &meta("keyValueTable"), &Properties::new())
            .await
            .unwrap();
        let embedded = dir.path().join("sessions/data/sessions.kv");
        std::fs::remove_dir_all(&embedded).unwrap();

        executor.upgrade("sessions").await.unwrap();
        assert!(embedded.is_dir());
    }
}
