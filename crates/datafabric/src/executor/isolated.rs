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

//! Task-level isolation for op executors.
//!
//! Every call is moved onto its own tokio task carrying only owned copies of
//! its inputs. A panic in type code surfaces as
//! [`OpExecutorError::Panicked`] instead of unwinding into the caller, and a
//! call that outlives the configured timeout surfaces as
//! [`OpExecutorError::Timeout`]. The timed-out task is not aborted: create
//! and drop work that has started runs to completion in the background.

use async_trait::async_trait;
use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::{OpExecutor, OpExecutorError};
use crate::models::{DatasetSpecification, DatasetTypeMeta, Properties};

/// Wraps an [`OpExecutor`] so each call is isolated and time-bounded.
pub struct IsolatedOpExecutor<E: ?Sized> {
    inner: Arc<E>,
    timeout: Duration,
}

impl<E: OpExecutor + ?Sized + 'static> IsolatedOpExecutor<E> {
    pub fn new(inner: Arc<E>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn run<T, F>(&self, operation: &str, instance: &str, call: F) -> Result<T, OpExecutorError>
    where
        T: Send + 'static,
        F: Future<Output = Result<T, OpExecutorError>> + Send + 'static,
    {
        let handle = tokio::spawn(call);
        match tokio::time::timeout(self.timeout, handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => {
                let reason = if join_error.is_panic() {
                    panic_message(join_error.into_panic())
                } else {
                    "task was cancelled".to_string()
                };
                tracing::error!(
                    "Op executor {} of dataset '{}' panicked: {}",
                    operation,
                    instance,
                    reason
                );
                Err(OpExecutorError::Panicked {
                    operation: operation.to_string(),
                    instance: instance.to_string(),
                    reason,
                })
            }
            Err(_) => {
                tracing::warn!(
                    "Op executor {} of dataset '{}' exceeded {:?}; leaving it to finish in the background",
                    operation,
                    instance,
                    self.timeout
                );
                Err(OpExecutorError::Timeout {
                    operation: operation.to_string(),
                    instance: instance.to_string(),
                    timeout: self.timeout,
                })
            }
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[async_trait]
impl<E: OpExecutor + ?Sized + 'static> OpExecutor for IsolatedOpExecutor<E> {
    async fn create(
        &self,
        name: &str,
        type_meta: &DatasetTypeMeta,
        properties: &Properties,
    ) -> Result<DatasetSpecification, OpExecutorError> {
        let inner = self.inner.clone();
        let owned_name = name.to_string();
        let type_meta = type_meta.clone();
        let properties = properties.clone();
        self.run("create", name, async move {
            inner.create(&owned_name, &type_meta, &properties).await
        })
        .await
    }

    async fn drop_dataset(
        &self,
        spec: &DatasetSpecification,
        type_meta: &DatasetTypeMeta,
    ) -> Result<(), OpExecutorError> {
        let inner = self.inner.clone();
        let owned_spec = spec.clone();
        let type_meta = type_meta.clone();
        self.run("drop", spec.name(), async move {
            inner.drop_dataset(&owned_spec, &type_meta).await
        })
        .await
    }

    async fn truncate(&self, name: &str) -> Result<(), OpExecutorError> {
        let inner = self.inner.clone();
        let owned_name = name.to_string();
        self.run("truncate", name, async move { inner.truncate(&owned_name).await })
            .await
    }

    async fn upgrade(&self, name: &str) -> Result<(), OpExecutorError> {
        let inner = self.inner.clone();
        let owned_name = name.to_string();
        self.run("upgrade", name, async move { inner.upgrade(&owned_name).await })
            .await
    }

    async fn exists(&self, name: &str) -> Result<bool, OpExecutorError> {
        let inner = self.inner.clone();
        let owned_name = name.to_string();
        self.run("exists", name, async move { inner.exists(&owned_name).await })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Executor whose behaviour is picked by the instance name.
    #[derive(Default)]
    struct Misbehaving {
        finished: AtomicBool,
    }

    #[async_trait]
    impl OpExecutor for Misbehaving {
        async fn create(
            &self,
            name: &str,
            type_meta: &DatasetTypeMeta,
            properties: &Properties,
        ) -> Result<DatasetSpecification, OpExecutorError> {
            match name {
                "panics" => panic!("type code exploded"),
                "slow" => {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    self.finished.store(true, Ordering::SeqCst);
                    Ok(DatasetSpecification::builder(name, &type_meta.name).build())
                }
                _ => Ok(DatasetSpecification::builder(name, &type_meta.name)
                    .properties(properties)
                    .build()),
            }
        }

        async fn drop_dataset(
            &self,
            _spec: &DatasetSpecification,
            _type_meta: &DatasetTypeMeta,
        ) -> Result<(), OpExecutorError> {
            Ok(())
        }

        async fn truncate(&self, name: &str) -> Result<(), OpExecutorError> {
            Err(OpExecutorError::Execution {
                operation: "truncate".into(),
                instance: name.into(),
                reason: "read-only".into(),
            })
        }

        async fn upgrade(&self, _name: &str) -> Result<(), OpExecutorError> {
            Ok(())
        }

        async fn exists(&self, name: &str) -> Result<bool, OpExecutorError> {
            Ok(name == "present")
        }
    }

    fn table_meta() -> DatasetTypeMeta {
        DatasetTypeMeta::new("table", Vec::new())
    }

    #[tokio::test]
    async fn test_results_pass_through() {
        let executor = IsolatedOpExecutor::new(Arc::new(Misbehaving::default()), Duration::from_secs(5));

        let mut properties = Properties::new();
        properties.insert("ttl".into(), "5".into());
        let spec = executor
            .create("fine", &table_meta(), &properties)
            .await
            .unwrap();
        assert_eq!(spec.property("ttl"), Some("5"));

        assert!(executor.exists("present").await.unwrap());
        assert!(!executor.exists("absent").await.unwrap());
        assert!(matches!(
            executor.truncate("fine").await,
            Err(OpExecutorError::Execution { .. })
        ));
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let executor = IsolatedOpExecutor::new(Arc::new(Misbehaving::default()), Duration::from_secs(5));

        let err = executor
            .create("panics", &table_meta(), &Properties::new())
            .await
            .unwrap_err();
        match err {
            OpExecutorError::Panicked {
                operation,
                instance,
                reason,
            } => {
                assert_eq!(operation, "create");
                assert_eq!(instance, "panics");
                assert!(reason.contains("type code exploded"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_timeout_leaves_call_running() {
        let inner = Arc::new(Misbehaving::default());
        let executor = IsolatedOpExecutor::new(inner.clone(), Duration::from_millis(10));

        let err = executor
            .create("slow", &table_meta(), &Properties::new())
            .await
            .unwrap_err();
        assert!(matches!(err, OpExecutorError::Timeout { .. }));
        assert!(!inner.finished.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(inner.finished.load(Ordering::SeqCst));
    }
}
