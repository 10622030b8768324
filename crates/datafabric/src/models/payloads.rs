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

//! Request and response payloads of the lifecycle protocols.

use serde::{Deserialize, Serialize};

use super::{DatasetSpecification, DatasetTypeMeta, Properties};

/// What a client asks for when creating an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetInstanceConfiguration {
    pub type_name: String,
    #[serde(default)]
    pub properties: Properties,
    /// Principal to record as the instance owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_principal: Option<String>,
}

impl DatasetInstanceConfiguration {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            properties: Properties::new(),
            owner_principal: None,
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_owner(mut self, principal: impl Into<String>) -> Self {
        self.owner_principal = Some(principal.into());
        self
    }
}

/// A specification together with what the catalog knows about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetMeta {
    pub spec: DatasetSpecification,
    /// `None` when the type has been removed from the type registry.
    #[serde(rename = "type")]
    pub type_meta: Option<DatasetTypeMeta>,
    /// Query-engine table name, present when the instance is explorable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explore_table_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_principal: Option<String>,
}

impl DatasetMeta {
    pub fn new(spec: DatasetSpecification, type_meta: Option<DatasetTypeMeta>) -> Self {
        Self {
            spec,
            type_meta,
            explore_table_name: None,
            owner_principal: None,
        }
    }

    pub fn with_explore_table_name(mut self, table: impl Into<String>) -> Self {
        self.explore_table_name = Some(table.into());
        self
    }

    pub fn with_owner_principal(mut self, principal: Option<String>) -> Self {
        self.owner_principal = principal;
        self
    }
}

/// One entry of a listing: a bare specification, or one with metadata
/// when the caller asked for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DatasetListing {
    Meta(DatasetMeta),
    Spec(DatasetSpecification),
}

impl DatasetListing {
    pub fn spec(&self) -> &DatasetSpecification {
        match self {
            DatasetListing::Meta(meta) => &meta.spec,
            DatasetListing::Spec(spec) => spec,
        }
    }

    pub fn name(&self) -> &str {
        self.spec().name()
    }
}

/// Result of an admin operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetAdminOpResponse {
    pub result: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DatasetAdminOpResponse {
    pub fn new(result: serde_json::Value) -> Self {
        Self {
            result,
            message: None,
        }
    }

    pub fn empty() -> Self {
        Self::new(serde_json::Value::Null)
    }
}
