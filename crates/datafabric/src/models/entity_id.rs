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

//! Typed identifiers for resources that can carry an owner.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of resource an [`EntityId`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Dataset,
    Stream,
    Topic,
    Application,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Dataset => "dataset",
            EntityType::Stream => "stream",
            EntityType::Topic => "topic",
            EntityType::Application => "application",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A namespace; every entity lives in exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamespaceId(String);

impl NamespaceId {
    pub const DEFAULT: &'static str = "default";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn dataset(&self, name: impl Into<String>) -> EntityId {
        EntityId::new(EntityType::Dataset, self.clone(), name)
    }

    pub fn stream(&self, name: impl Into<String>) -> EntityId {
        EntityId::new(EntityType::Stream, self.clone(), name)
    }

    pub fn topic(&self, name: impl Into<String>) -> EntityId {
        EntityId::new(EntityType::Topic, self.clone(), name)
    }

    pub fn application(&self, name: impl Into<String>) -> EntityId {
        EntityId::new(EntityType::Application, self.clone(), name)
    }
}

impl Default for NamespaceId {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}

impl fmt::Display for NamespaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of an ownable resource: its kind, namespace and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId {
    entity_type: EntityType,
    namespace: NamespaceId,
    name: String,
}

impl EntityId {
    pub fn new(entity_type: EntityType, namespace: NamespaceId, name: impl Into<String>) -> Self {
        Self {
            entity_type,
            namespace,
            name: name.into(),
        }
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    pub fn namespace(&self) -> &NamespaceId {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}.{}", self.entity_type, self.namespace, self.name)
    }
}
