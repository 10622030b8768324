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
use parking_lot::RwLock;
use std::collections::BTreeSet;

use super::{explore_table_name, ExploreError, ExploreGateway};

/// Gateway for deployments without a query engine.
///
/// Enable and disable do nothing and no table is ever explorable.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledExploreGateway;

#[async_trait]
impl ExploreGateway for DisabledExploreGateway {
    async fn enable_explore(&self, _instance: &str) -> Result<(), ExploreError> {
        Ok(())
    }

    async fn disable_explore(&self, _instance: &str) -> Result<(), ExploreError> {
        Ok(())
    }

    async fn get_explorable_table_names(&self) -> Result<Vec<String>, ExploreError> {
        Ok(Vec::new())
    }
}

/// Gateway that keeps the set of exposed tables in memory.
#[derive(Debug, Default)]
pub struct InMemoryExploreGateway {
    tables: RwLock<BTreeSet<String>>,
}

impl InMemoryExploreGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_explorable(&self, instance: &str) -> bool {
        self.tables.read().contains(&explore_table_name(instance))
    }
}

#[async_trait]
impl ExploreGateway for InMemoryExploreGateway {
    async fn enable_explore(&self, instance: &str) -> Result<(), ExploreError> {
        self.tables.write().insert(explore_table_name(instance));
        Ok(())
    }

    async fn disable_explore(&self, instance: &str) -> Result<(), ExploreError> {
        self.tables.write().remove(&explore_table_name(instance));
        Ok(())
    }

    async fn get_explorable_table_names(&self) -> Result<Vec<String>, ExploreError> {
        Ok(self.tables.read().iter().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_enable_disable() {
        let gateway = InMemoryExploreGateway::new();
        gateway.enable_explore("fooData").await.unwrap();
        gateway.enable_explore("sessions.kv").await.unwrap();
        assert!(gateway.is_explorable("fooData"));
        assert_eq!(
            gateway.get_explorable_table_names().await.unwrap(),
            vec!["foodata", "sessions_kv"]
        );

        gateway.disable_explore("fooData").await.unwrap();
        gateway.disable_explore("fooData").await.unwrap();
        assert_eq!(
            gateway.get_explorable_table_names().await.unwrap(),
            vec!["sessions_kv"]
        );
    }

    #[tokio::test]
    async fn test_disabled_gateway_lists_nothing() {
        let gateway = DisabledExploreGateway;
        gateway.enable_explore("fooData").await.unwrap();
        assert!(gateway.get_explorable_table_names().await.unwrap().is_empty());
    }
}
