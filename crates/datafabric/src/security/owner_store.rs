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

//! Owner store trait and associated types.
//!
//! The owner of a resource is the principal that operations on the resource
//! are executed as. Records are insert-only: once an owner is recorded it can
//! only be removed, never replaced.

use async_trait::async_trait;
use thiserror::Error;

use super::principal::{KerberosPrincipal, PrincipalError};
use crate::models::{EntityId, EntityType};

/// Entity types that may carry an owner.
pub const SUPPORTED_OWNER_ENTITY_TYPES: &[EntityType] = &[EntityType::Dataset, EntityType::Stream];

/// Errors that can occur during owner store operations.
#[derive(Debug, Error)]
pub enum OwnerStoreError {
    #[error("Owner information is not supported for {entity_type} entities: {entity}")]
    UnsupportedEntityType {
        entity: EntityId,
        entity_type: EntityType,
    },

    #[error("Invalid owner principal: {0}")]
    InvalidPrincipal(#[from] PrincipalError),

    #[error("Owner information already exists for {0}")]
    AlreadyExists(EntityId),

    #[error("Owner store error: {0}")]
    Storage(String),
}

impl OwnerStoreError {
    /// Whether the error was raised before the store was touched.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            OwnerStoreError::UnsupportedEntityType { .. } | OwnerStoreError::InvalidPrincipal(_)
        )
    }
}

/// Checks an owner entry before it is written.
///
/// The entity type is checked first, so an unsupported entity is rejected
/// regardless of the principal.
pub fn validate_owner_entry(
    entity: &EntityId,
    principal: &KerberosPrincipal,
) -> Result<(), OwnerStoreError> {
    let entity_type = entity.entity_type();
    if !SUPPORTED_OWNER_ENTITY_TYPES.contains(&entity_type) {
        return Err(OwnerStoreError::UnsupportedEntityType {
            entity: entity.clone(),
            entity_type,
        });
    }
    principal.validate()?;
    Ok(())
}

/// Insert-only mapping from resource to owning principal.
///
/// Implementations must be thread-safe (`Send + Sync`) and must make `add`
/// atomic: of two concurrent adds for the same entity exactly one succeeds.
#[async_trait]
pub trait OwnerStore: Send + Sync {
    /// Records `principal` as the owner of `entity`.
    ///
    /// # Errors
    ///
    /// * [`OwnerStoreError::UnsupportedEntityType`] / [`OwnerStoreError::InvalidPrincipal`]
    ///   - rejected before the store is touched
    /// * [`OwnerStoreError::AlreadyExists`] - an owner is already recorded,
    ///   whether or not it equals `principal`
    async fn add(
        &self,
        entity: &EntityId,
        principal: &KerberosPrincipal,
    ) -> Result<(), OwnerStoreError>;

    /// Returns the recorded owner, or `None` if there is none.
    async fn get_owner(
        &self,
        entity: &EntityId,
    ) -> Result<Option<KerberosPrincipal>, OwnerStoreError>;

    async fn exists(&self, entity: &EntityId) -> Result<bool, OwnerStoreError>;

    /// Removes the owner record. Removing an absent record is not an error.
    async fn delete(&self, entity: &EntityId) -> Result<(), OwnerStoreError>;
}
