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

use serde::{Deserialize, Serialize};

/// A module contributing an implementation to a dataset type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetModuleMeta {
    pub name: String,
    /// Fully qualified name of the implementing class or symbol.
    pub class_name: String,
    /// Where the module's code lives, if it is not built in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_location: Option<String>,
    /// Modules that must be loaded before this one.
    #[serde(default)]
    pub uses_modules: Vec<String>,
}

impl DatasetModuleMeta {
    pub fn new(name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class_name: class_name.into(),
            artifact_location: None,
            uses_modules: Vec::new(),
        }
    }

    pub fn with_artifact_location(mut self, location: impl Into<String>) -> Self {
        self.artifact_location = Some(location.into());
        self
    }

    pub fn uses(mut self, module: impl Into<String>) -> Self {
        self.uses_modules.push(module.into());
        self
    }
}

/// Metadata describing a dataset type.
///
/// `modules` is ordered by loading stage: a module appears after every
/// module it uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetTypeMeta {
    pub name: String,
    pub modules: Vec<DatasetModuleMeta>,
}

impl DatasetTypeMeta {
    pub fn new(name: impl Into<String>, modules: Vec<DatasetModuleMeta>) -> Self {
        Self {
            name: name.into(),
            modules,
        }
    }

    /// The module that provides the type itself (the last one loaded).
    pub fn implementing_module(&self) -> Option<&DatasetModuleMeta> {
        self.modules.last()
    }
}
