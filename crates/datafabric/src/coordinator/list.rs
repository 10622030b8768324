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

use std::collections::HashSet;

use super::LifecycleCoordinator;
use crate::error::CatalogError;
use crate::explore::explore_table_name;
use crate::metrics;
use crate::models::{DatasetListing, DatasetMeta};

/// What [`LifecycleCoordinator::list`] returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// `Some(true)` keeps only explorable instances, `Some(false)` only the
    /// others. `None` skips the query engine entirely.
    pub explorable: Option<bool>,
    /// Return [`DatasetMeta`] entries instead of bare specifications.
    pub include_meta: bool,
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_meta(mut self) -> Self {
        self.include_meta = true;
        self
    }

    pub fn explorable(mut self, explorable: bool) -> Self {
        self.explorable = Some(explorable);
        self
    }
}

impl LifecycleCoordinator {
    /// Lists registered instances, ordered by name.
    ///
    /// # Errors
    ///
    /// [`CatalogError::ExploreListing`] if an explorable filter was requested
    /// and the query engine could not be asked.
    pub async fn list(&self, options: ListOptions) -> Result<Vec<DatasetListing>, CatalogError> {
        let specs = self.instances.get_all().await?;

        let tables: Option<HashSet<String>> = match options.explorable {
            Some(_) => {
                let names = self.explore.get_explorable_table_names().await.map_err(|e| {
                    tracing::error!("Caught exception while listing explorable datasets: {}", e);
                    metrics::record_explore_failure("list");
                    CatalogError::ExploreListing(e)
                })?;
                Some(names.into_iter().map(|n| n.to_lowercase()).collect())
            }
            None => None,
        };

        let mut listings = Vec::with_capacity(specs.len());
        for spec in specs {
            let table = explore_table_name(spec.name());
            let is_explorable = tables.as_ref().map(|t| t.contains(&table));
            if let (Some(wanted), Some(actual)) = (options.explorable, is_explorable) {
                if wanted != actual {
                    continue;
                }
            }

            if options.include_meta {
                let type_meta = self.types.get_type_info(spec.type_name()).await?;
                let mut meta = DatasetMeta::new(spec, type_meta);
                if is_explorable == Some(true) {
                    meta = meta.with_explore_table_name(table);
                }
                listings.push(DatasetListing::Meta(meta));
            } else {
                listings.push(DatasetListing::Spec(spec));
            }
        }
        Ok(listings)
    }
}
