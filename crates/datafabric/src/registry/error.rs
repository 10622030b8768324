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

use thiserror::Error;

/// Errors that can occur in the instance and type registries.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Dataset instance '{name}' already exists")]
    InstanceExists { name: String },

    #[error("Registry storage error: {0}")]
    Storage(String),

    #[error("Failed to (de)serialize registry entry: {0}")]
    Serialization(#[from] serde_json::Error),
}
