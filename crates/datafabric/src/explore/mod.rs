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

//! Query-engine exposure of datasets.
//!
//! Enabling and disabling exploration is best effort from the coordinator's
//! point of view: a failure is logged and the lifecycle operation goes on.
//! Listing explorable tables is not; callers that filter on exploration
//! need an accurate answer or none.

mod memory;

pub use memory::{DisabledExploreGateway, InMemoryExploreGateway};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExploreError {
    #[error("Failed to {operation} exploration of dataset '{instance}': {reason}")]
    Operation {
        operation: String,
        instance: String,
        reason: String,
    },

    #[error("Failed to list explorable tables: {0}")]
    Listing(String),
}

/// The query engine's view of datasets.
#[async_trait]
pub trait ExploreGateway: Send + Sync {
    async fn enable_explore(&self, instance: &str) -> Result<(), ExploreError>;

    async fn disable_explore(&self, instance: &str) -> Result<(), ExploreError>;

    /// Names of the tables the query engine currently exposes.
    async fn get_explorable_table_names(&self) -> Result<Vec<String>, ExploreError>;
}

/// The table name under which the query engine exposes `instance`.
///
/// Dots are not legal in table names, and table names are case-insensitive.
pub fn explore_table_name(instance: &str) -> String {
    instance.replace('.', "_").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explore_table_name() {
        assert_eq!(explore_table_name("fooData"), "foodata");
        assert_eq!(explore_table_name("sessions.kv"), "sessions_kv");
        assert_eq!(explore_table_name("plain"), "plain");
    }
}
