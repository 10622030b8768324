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

//! # Datafabric Server
//!
//! HTTP surface and process plumbing for the dataset catalog:
//!
//! - [`config`]: TOML server configuration
//! - [`bootstrap`]: builds a [`LifecycleCoordinator`](datafabric::LifecycleCoordinator)
//!   from that configuration
//! - [`routes`]: the axum router
//! - [`error`]: mapping of catalog errors onto status codes
//! - [`logging`]: tracing subscriber setup shared by both binaries

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod logging;
pub mod routes;

pub use bootstrap::{build_coordinator, BootstrapError};
pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use routes::{build_router, AppState};
