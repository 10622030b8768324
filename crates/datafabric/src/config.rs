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

//! Configuration for the dataset service.

use std::time::Duration;

use crate::models::NamespaceId;

/// Configuration for the [`LifecycleCoordinator`](crate::LifecycleCoordinator).
///
/// # Construction
///
/// ```rust,ignore
/// let config = DatasetServiceConfig::builder()
///     .namespace(NamespaceId::new("analytics"))
///     .op_timeout(Duration::from_secs(60))
///     .build();
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct DatasetServiceConfig {
    namespace: NamespaceId,
    unrecoverable_reset: bool,
    op_timeout: Duration,
}

impl DatasetServiceConfig {
    /// Creates a new configuration builder with default values.
    pub fn builder() -> DatasetServiceConfigBuilder {
        DatasetServiceConfigBuilder::default()
    }

    /// Namespace that owner records of instances are filed under.
    pub fn namespace(&self) -> &NamespaceId {
        &self.namespace
    }

    /// Whether deleting every dataset instance at once is allowed.
    pub fn unrecoverable_reset(&self) -> bool {
        self.unrecoverable_reset
    }

    /// Upper bound for a single op executor call, enforced by the coordinator.
    pub fn op_timeout(&self) -> Duration {
        self.op_timeout
    }
}

/// Builder for [`DatasetServiceConfig`].
#[derive(Debug, Clone)]
pub struct DatasetServiceConfigBuilder {
    config: DatasetServiceConfig,
}

impl Default for DatasetServiceConfigBuilder {
    fn default() -> Self {
        Self {
            config: DatasetServiceConfig {
                namespace: NamespaceId::default(),
                unrecoverable_reset: false,
                op_timeout: Duration::from_secs(300),
            },
        }
    }
}

impl DatasetServiceConfigBuilder {
    pub fn namespace(mut self, value: NamespaceId) -> Self {
        self.config.namespace = value;
        self
    }

    /// Enables or disables the unrecoverable reset.
    pub fn unrecoverable_reset(mut self, value: bool) -> Self {
        self.config.unrecoverable_reset = value;
        self
    }

    pub fn op_timeout(mut self, value: Duration) -> Self {
        self.config.op_timeout = value;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> DatasetServiceConfig {
        self.config
    }
}

impl Default for DatasetServiceConfig {
    fn default() -> Self {
        DatasetServiceConfigBuilder::default().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DatasetServiceConfig::default();
        assert_eq!(config.namespace().name(), "default");
        assert!(!config.unrecoverable_reset());
        assert_eq!(config.op_timeout(), Duration::from_secs(300));
    }

    #[test]
    fn test_builder_overrides() {
        let config = DatasetServiceConfig::builder()
            .namespace(NamespaceId::new("analytics"))
            .unrecoverable_reset(true)
            .op_timeout(Duration::from_secs(5))
            .build();
        assert_eq!(config.namespace().name(), "analytics");
        assert!(config.unrecoverable_reset());
        assert_eq!(config.op_timeout(), Duration::from_secs(5));
    }
}
