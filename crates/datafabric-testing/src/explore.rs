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
use std::sync::atomic::{AtomicBool, Ordering};

use datafabric::explore::{explore_table_name, ExploreError, ExploreGateway};

/// [`ExploreGateway`] whose operations can be switched to fail.
#[derive(Debug, Default)]
pub struct ScriptedExploreGateway {
    tables: RwLock<BTreeSet<String>>,
    fail_enable: AtomicBool,
    fail_disable: AtomicBool,
    fail_listing: AtomicBool,
}

impl ScriptedExploreGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_enable(&self, fail: bool) {
        self.fail_enable.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_disable(&self, fail: bool) {
        self.fail_disable.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }

    /// Exposes a table directly, as if another system had enabled it.
    pub fn insert_table(&self, table: &str) {
        self.tables.write().insert(table.to_string());
    }

    pub fn is_explorable(&self, instance: &str) -> bool {
        self.tables.read().contains(&explore_table_name(instance))
    }
}

fn injected(operation: &str, instance: &str) -> ExploreError {
    ExploreError::Operation {
        operation: operation.to_string(),
        instance: instance.to_string(),
        reason: "injected failure".to_string(),
    }
}

#[async_trait]
impl ExploreGateway for ScriptedExploreGateway {
    async fn enable_explore(&self, instance: &str) -> Result<(), ExploreError> {
        if self.fail_enable.load(Ordering::SeqCst) {
            return Err(injected("enable", instance));
        }
        self.tables.write().insert(explore_table_name(instance));
        Ok(())
    }

    async fn disable_explore(&self, instance: &str) -> Result<(), ExploreError> {
        if self.fail_disable.load(Ordering::SeqCst) {
            return Err(injected("disable", instance));
        }
        self.tables.write().remove(&explore_table_name(instance));
        Ok(())
    }

    async fn get_explorable_table_names(&self) -> Result<Vec<String>, ExploreError> {
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(ExploreError::Listing("injected failure".to_string()));
        }
        Ok(self.tables.read().iter().cloned().collect())
    }
}
