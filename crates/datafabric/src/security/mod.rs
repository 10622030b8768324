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

//! Ownership and security auditing.
//!
//! This module provides:
//! - [`KerberosPrincipal`] with syntax validation
//! - [`OwnerStore`] trait for the insert-only resource → owner mapping
//! - [`InMemoryOwnerStore`] and [`FilesystemOwnerStore`] implementations
//! - Security audit logging for SIEM integration

pub mod audit;
mod filesystem_owner_store;
mod memory_owner_store;
mod owner_store;
mod principal;

pub use filesystem_owner_store::FilesystemOwnerStore;
pub use memory_owner_store::InMemoryOwnerStore;
pub use owner_store::{
    validate_owner_entry, OwnerStore, OwnerStoreError, SUPPORTED_OWNER_ENTITY_TYPES,
};
pub use principal::{KerberosPrincipal, PrincipalError};
