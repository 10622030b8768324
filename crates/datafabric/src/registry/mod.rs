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

//! # Dataset Registries
//!
//! Two read/write catalogs back the lifecycle coordinator:
//!
//! - [`InstanceRegistry`]: instance name → [`DatasetSpecification`](crate::models::DatasetSpecification).
//!   `add` is an atomic add-if-absent; it is what makes concurrent creates of
//!   the same name exclusive.
//! - [`TypeRegistry`]: type name → [`DatasetTypeMeta`](crate::models::DatasetTypeMeta),
//!   read-mostly and populated by whatever loads type plugins.
//!
//! Neither registry validates against the other or against physical storage.

mod error;
mod filesystem_instance_registry;
mod instance_registry;
mod type_registry;

pub use error::RegistryError;
pub use filesystem_instance_registry::FilesystemInstanceRegistry;
pub use instance_registry::{InMemoryInstanceRegistry, InstanceRegistry};
pub use type_registry::{
    builtin_types, InMemoryTypeRegistry, TypeRegistry, KEY_VALUE_TABLE_TYPE, TABLE_TYPE,
};
