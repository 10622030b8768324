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

//! Data model shared by the catalog, the executors and the HTTP surface.

mod entity_id;
mod payloads;
mod specification;
mod type_meta;

pub use entity_id::{EntityId, EntityType, NamespaceId};
pub use payloads::{
    DatasetAdminOpResponse, DatasetInstanceConfiguration, DatasetListing, DatasetMeta,
};
pub use specification::{DatasetSpecification, DatasetSpecificationBuilder, Properties};
pub use type_meta::{DatasetModuleMeta, DatasetTypeMeta};
