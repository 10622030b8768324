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

//! # datafabric-testing
//!
//! Test utilities for the dataset lifecycle coordinator. No data directory,
//! worker process or query engine is required.
//!
//! - [`ScriptedOpExecutor`]: in-memory physical storage with per-call
//!   failure injection and a call log
//! - [`ScriptedExploreGateway`]: explore gateway whose operations can be
//!   switched to fail
//! - [`TestCatalog`]: a coordinator wired to in-memory stores and the two
//!   fakes above
//!
//! ```rust,ignore
//! use datafabric::models::DatasetInstanceConfiguration;
//! use datafabric_testing::{ScriptedOp, TestCatalog};
//!
//! let catalog = TestCatalog::new();
//! catalog.executor.fail(ScriptedOp::Create, "fooData", "disk full");
//!
//! let err = catalog
//!     .coordinator
//!     .create("fooData", DatasetInstanceConfiguration::new("table"))
//!     .await
//!     .unwrap_err();
//! ```

mod catalog;
mod explore;
mod op_executor;

pub use catalog::TestCatalog;
pub use explore::ScriptedExploreGateway;
pub use op_executor::{RecordedCall, ScriptedOp, ScriptedOpExecutor};
