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

//! # Datafabric
//!
//! Dataset catalog and lifecycle coordination.
//!
//! The catalog tracks named dataset instances, their types, their owning
//! security principal and their exploration (query-engine) exposure. The
//! physical work of creating, dropping and administering dataset storage is
//! delegated to an isolated [`OpExecutor`](executor::OpExecutor) so that
//! type code supplied by users never runs inside the coordinator's trust
//! domain.
//!
//! ## Key Components
//!
//! - [`coordinator`]: the [`LifecycleCoordinator`] implementing the create,
//!   list, get, drop, bulk-drop and admin protocols
//! - [`registry`]: the instance catalog and the type registry
//! - [`security`]: principals, the write-once [`OwnerStore`](security::OwnerStore)
//!   and structured audit logging
//! - [`executor`]: the isolation boundary for physical dataset operations
//! - [`explore`]: best-effort query-engine exposure
//! - [`models`]: specifications, type metadata and entity identifiers
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use datafabric::{DatasetServiceConfig, LifecycleCoordinator};
//! use datafabric::models::DatasetInstanceConfiguration;
//!
//! let coordinator = LifecycleCoordinator::new(
//!     DatasetServiceConfig::default(),
//!     types,
//!     instances,
//!     owners,
//!     executor,
//!     explore,
//! );
//!
//! coordinator
//!     .create("purchases", DatasetInstanceConfiguration::new("table"))
//!     .await?;
//! ```

pub mod config;
pub mod coordinator;
pub mod error;
pub mod executor;
pub mod explore;
pub mod metrics;
pub mod models;
pub mod registry;
pub mod security;

mod storage;

pub use config::{DatasetServiceConfig, DatasetServiceConfigBuilder};
pub use coordinator::{AdminOperation, BulkDropReport, ListOptions, LifecycleCoordinator};
pub use error::{CatalogError, ErrorKind};
