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

//! Dataset type code.

use thiserror::Error;

use crate::models::{DatasetSpecification, Properties};
use crate::registry::{KEY_VALUE_TABLE_TYPE, TABLE_TYPE};

/// Rejection of an instance configuration by a type.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("Invalid value '{value}' for property '{property}': {reason}")]
    InvalidProperty {
        property: String,
        value: String,
        reason: String,
    },
}

/// Type code for one dataset type.
///
/// `configure` turns the requested properties into the specification that
/// is stored in the catalog. Composite types embed the specifications of
/// the datasets they are built from.
pub trait DatasetDefinition: Send + Sync {
    fn type_name(&self) -> &str;

    fn configure(
        &self,
        instance_name: &str,
        properties: &Properties,
    ) -> Result<DatasetSpecification, DefinitionError>;
}

/// Property holding a table's time-to-live in seconds.
pub const TTL_PROPERTY: &str = "ttl";

fn validate_ttl(properties: &Properties) -> Result<(), DefinitionError> {
    if let Some(ttl) = properties.get(TTL_PROPERTY) {
        ttl.parse::<u64>()
            .map_err(|e| DefinitionError::InvalidProperty {
                property: TTL_PROPERTY.to_string(),
                value: ttl.clone(),
                reason: e.to_string(),
            })?;
    }
    Ok(())
}

/// The built-in `table` type.
#[derive(Debug, Default, Clone, Copy)]
pub struct TableDefinition;

impl DatasetDefinition for TableDefinition {
    fn type_name(&self) -> &str {
        TABLE_TYPE
    }

    fn configure(
        &self,
        instance_name: &str,
        properties: &Properties,
    ) -> Result<DatasetSpecification, DefinitionError> {
        validate_ttl(properties)?;
        Ok(DatasetSpecification::builder(instance_name, TABLE_TYPE)
            .properties(properties)
            .build())
    }
}

/// The built-in `keyValueTable` type, stored in an embedded `table`.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyValueTableDefinition;

impl KeyValueTableDefinition {
    /// Local name of the embedded table.
    pub const EMBEDDED_TABLE: &'static str = "kv";
}

impl DatasetDefinition for KeyValueTableDefinition {
    fn type_name(&self) -> &str {
        KEY_VALUE_TABLE_TYPE
    }

    fn configure(
        &self,
        instance_name: &str,
        properties: &Properties,
    ) -> Result<DatasetSpecification, DefinitionError> {
        let table = TableDefinition.configure(
            &format!("{}.{}", instance_name, Self::EMBEDDED_TABLE),
            properties,
        )?;
        Ok(DatasetSpecification::builder(instance_name, KEY_VALUE_TABLE_TYPE)
            .properties(properties)
            .dataset(Self::EMBEDDED_TABLE, table)
            .build())
    }
}
