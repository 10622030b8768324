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

//! Security audit logging for SIEM integration.
//!
//! This module provides structured audit logging for:
//! - Owner record changes (the trust anchor for impersonated execution)
//! - Dataset lifecycle outcomes, including failures at the executor boundary
//! - Best-effort explore failures that leave the catalog and the query
//!   engine out of step
//! - Unrecoverable reset requests
//!
//! All events use structured fields compatible with common SIEM systems.
//! Events are logged using the `tracing` crate at appropriate levels.

use crate::models::EntityId;

/// Event types for audit records.
pub mod events {
    /// Owner recorded.
    pub const OWNER_ADDED: &str = "owner.added";
    /// Owner add refused (invalid input or already recorded).
    pub const OWNER_ADD_REJECTED: &str = "owner.add_rejected";
    /// Owner removed.
    pub const OWNER_DELETED: &str = "owner.deleted";

    /// Dataset instance created and committed to the catalog.
    pub const DATASET_CREATED: &str = "dataset.created";
    /// Physical create failed at the executor boundary.
    pub const DATASET_CREATE_FAILED: &str = "dataset.create_failed";
    /// Dataset instance removed from the catalog and dropped physically.
    pub const DATASET_DROPPED: &str = "dataset.dropped";
    /// Catalog entry removed but the physical drop failed.
    pub const DATASET_DROP_FAILED: &str = "dataset.drop_failed";
    /// Storage with no catalog entry dropped before a create.
    pub const DATASET_ORPHAN_RECLAIMED: &str = "dataset.orphan_reclaimed";
    /// Admin operation failed at the executor boundary.
    pub const DATASET_ADMIN_FAILED: &str = "dataset.admin_failed";

    /// Explore enable/disable failed; catalog state was kept.
    pub const EXPLORE_FAILURE: &str = "explore.failure";

    /// Unrecoverable reset executed.
    pub const UNRECOVERABLE_RESET: &str = "unrecoverable.reset";
    /// Unrecoverable reset refused because it is disabled.
    pub const UNRECOVERABLE_RESET_DENIED: &str = "unrecoverable.reset_denied";
}

/// Log an owner record being written.
pub fn log_owner_added(entity: &EntityId, principal: &str) {
    tracing::warn!(
        event_type = events::OWNER_ADDED,
        entity = %entity,
        principal = %principal,
        "Owner recorded"
    );
}

/// Log a refused owner write.
pub fn log_owner_add_rejected(entity: &EntityId, reason: &str) {
    tracing::warn!(
        event_type = events::OWNER_ADD_REJECTED,
        entity = %entity,
        reason = %reason,
        "Owner record rejected"
    );
}

/// Log an owner record being removed.
pub fn log_owner_deleted(entity: &EntityId) {
    tracing::warn!(
        event_type = events::OWNER_DELETED,
        entity = %entity,
        "Owner record deleted"
    );
}

/// Log a dataset instance creation.
pub fn log_dataset_created(instance: &str, type_name: &str, owner: Option<&str>) {
    tracing::info!(
        event_type = events::DATASET_CREATED,
        instance = %instance,
        type_name = %type_name,
        owner = owner.unwrap_or("<none>"),
        "Dataset instance created"
    );
}

/// Log a failed physical create.
pub fn log_dataset_create_failed(instance: &str, type_name: &str, error: &str) {
    tracing::error!(
        event_type = events::DATASET_CREATE_FAILED,
        instance = %instance,
        type_name = %type_name,
        error = %error,
        "Dataset create failed in the op executor"
    );
}

/// Log a dataset instance drop.
pub fn log_dataset_dropped(instance: &str, type_name: &str) {
    tracing::info!(
        event_type = events::DATASET_DROPPED,
        instance = %instance,
        type_name = %type_name,
        "Dataset instance dropped"
    );
}

/// Log a failed physical drop. The catalog entry is already gone, so the
/// physical resources are orphaned until repaired out of band.
pub fn log_dataset_drop_failed(instance: &str, type_name: &str, error: &str) {
    tracing::error!(
        event_type = events::DATASET_DROP_FAILED,
        instance = %instance,
        type_name = %type_name,
        error = %error,
        orphaned = true,
        "Dataset drop failed in the op executor after catalog removal"
    );
}

/// Log storage left behind by an earlier failed create being dropped.
pub fn log_orphan_reclaimed(instance: &str, type_name: &str) {
    tracing::warn!(
        event_type = events::DATASET_ORPHAN_RECLAIMED,
        instance = %instance,
        type_name = %type_name,
        "Dropped storage that had no catalog entry"
    );
}

/// Log a failed admin operation.
pub fn log_dataset_admin_failed(instance: &str, operation: &str, error: &str) {
    tracing::error!(
        event_type = events::DATASET_ADMIN_FAILED,
        instance = %instance,
        operation = %operation,
        error = %error,
        "Dataset admin operation failed in the op executor"
    );
}

/// Log an explore enable/disable failure that was tolerated.
pub fn log_explore_failure(instance: &str, operation: &str, error: &str) {
    tracing::error!(
        event_type = events::EXPLORE_FAILURE,
        instance = %instance,
        operation = %operation,
        error = %error,
        "Explore operation failed; continuing without it"
    );
}

/// Log the outcome of an unrecoverable reset.
pub fn log_unrecoverable_reset(dropped: usize, failed: usize) {
    tracing::warn!(
        event_type = events::UNRECOVERABLE_RESET,
        dropped = dropped,
        failed = failed,
        "Unrecoverable reset of all dataset instances executed"
    );
}

/// Log a refused unrecoverable reset.
pub fn log_unrecoverable_reset_denied() {
    tracing::warn!(
        event_type = events::UNRECOVERABLE_RESET_DENIED,
        "Unrecoverable reset requested while disabled"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NamespaceId;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct StringWriter(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for StringWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for StringWriter {
        type Writer = StringWriter;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn with_captured_logs<F>(f: F) -> String
    where
        F: FnOnce(),
    {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let writer = StringWriter(buffer.clone());

        let subscriber = tracing_subscriber::fmt()
            .with_writer(writer)
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, f);

        let result = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        result
    }

    #[test]
    fn test_log_owner_added() {
        let output = with_captured_logs(|| {
            log_owner_added(
                &NamespaceId::default().dataset("fooData"),
                "alice/somehost@SOMEKDC.NET",
            );
        });

        assert!(output.contains(events::OWNER_ADDED));
        assert!(output.contains("dataset:default.fooData"));
        assert!(output.contains("alice/somehost@SOMEKDC.NET"));
    }

    #[test]
    fn test_log_dataset_drop_failed_marks_orphan() {
        let output = with_captured_logs(|| {
            log_dataset_drop_failed("fooData", "table", "disk on fire");
        });

        assert!(output.contains(events::DATASET_DROP_FAILED));
        assert!(output.contains("orphaned=true"));
        assert!(output.contains("disk on fire"));
    }

    #[test]
    fn test_log_explore_failure() {
        let output = with_captured_logs(|| {
            log_explore_failure("fooData", "enable", "metastore unavailable");
        });

        assert!(output.contains(events::EXPLORE_FAILURE));
        assert!(output.contains("enable"));
        assert!(output.contains("metastore unavailable"));
    }

    #[test]
    fn test_event_type_constants() {
        assert!(events::OWNER_ADDED.starts_with("owner."));
        assert!(events::DATASET_CREATED.starts_with("dataset."));
        assert!(events::UNRECOVERABLE_RESET.starts_with("unrecoverable."));
    }
}
