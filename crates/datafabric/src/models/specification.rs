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

//! Dataset instance specifications.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Instance properties, kept sorted so serialized specifications are stable.
pub type Properties = BTreeMap<String, String>;

/// The configured shape of a dataset instance.
///
/// A specification is produced by the dataset type's configuration code
/// (always inside the executor boundary) and is immutable afterwards: an
/// upgrade replaces it wholesale rather than editing it in place. Composite
/// types embed the specifications of the datasets they are built from,
/// keyed by a local name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSpecification {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    properties: Properties,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    datasets: BTreeMap<String, DatasetSpecification>,
}

impl DatasetSpecification {
    /// Starts a builder for an instance `name` of type `type_name`.
    pub fn builder(
        name: impl Into<String>,
        type_name: impl Into<String>,
    ) -> DatasetSpecificationBuilder {
        DatasetSpecificationBuilder {
            spec: DatasetSpecification {
                name: name.into(),
                type_name: type_name.into(),
                properties: Properties::new(),
                datasets: BTreeMap::new(),
            },
        }
    }

    /// Instance name, unique within a namespace.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the dataset type this instance was configured against.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Embedded specifications, keyed by their local name.
    pub fn datasets(&self) -> &BTreeMap<String, DatasetSpecification> {
        &self.datasets
    }

    /// Looks up an embedded specification by local name.
    pub fn embedded(&self, local_name: &str) -> Option<&DatasetSpecification> {
        self.datasets.get(local_name)
    }

    /// This specification followed by every embedded one, depth first.
    pub fn flatten(&self) -> Vec<&DatasetSpecification> {
        let mut all = vec![self];
        for nested in self.datasets.values() {
            all.extend(nested.flatten());
        }
        all
    }
}

/// Builder for [`DatasetSpecification`].
#[derive(Debug, Clone)]
pub struct DatasetSpecificationBuilder {
    spec: DatasetSpecification,
}

impl DatasetSpecificationBuilder {
    /// Adds a single property, replacing any earlier value for the key.
    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.spec.properties.insert(key.into(), value.into());
        self
    }

    /// Adds all properties from `properties`.
    pub fn properties(mut self, properties: &Properties) -> Self {
        self.spec
            .properties
            .extend(properties.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Embeds `spec` under `local_name`.
    pub fn dataset(mut self, local_name: impl Into<String>, spec: DatasetSpecification) -> Self {
        self.spec.datasets.insert(local_name.into(), spec);
        self
    }

    pub fn build(self) -> DatasetSpecification {
        self.spec
    }
}
