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

//! Dataset lifecycle metrics.
//!
//! Recorded through the `metrics` facade; nothing is exported unless the
//! host process installs a recorder.

use ::metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Duration;

/// Instances created and committed to the catalog.
pub const DATASETS_CREATED: &str = "datafabric_datasets_created_total";

/// Instances removed from the catalog.
pub const DATASETS_DROPPED: &str = "datafabric_datasets_dropped_total";

/// Failed op executor calls, labelled by operation.
pub const OP_EXECUTOR_FAILURES: &str = "datafabric_op_executor_failures_total";

/// Op executor call latency, labelled by operation.
pub const OP_EXECUTOR_DURATION: &str = "datafabric_op_executor_duration_seconds";

/// Tolerated or propagated explore failures, labelled by operation.
pub const EXPLORE_FAILURES: &str = "datafabric_explore_failures_total";

/// Registers all metric descriptions.
///
/// Call this once at startup after installing the metrics recorder.
pub fn register_metrics() {
    describe_counter!(DATASETS_CREATED, "Total dataset instances created");
    describe_counter!(DATASETS_DROPPED, "Total dataset instances dropped");
    describe_counter!(OP_EXECUTOR_FAILURES, "Total failed op executor calls");
    describe_histogram!(OP_EXECUTOR_DURATION, "Duration of op executor calls in seconds");
    describe_counter!(EXPLORE_FAILURES, "Total explore gateway failures");
}

pub(crate) fn record_created(type_name: &str) {
    counter!(DATASETS_CREATED, "type" => type_name.to_string()).increment(1);
}

pub(crate) fn record_dropped(type_name: &str) {
    counter!(DATASETS_DROPPED, "type" => type_name.to_string()).increment(1);
}

pub(crate) fn record_op_executor_call(operation: &'static str, elapsed: Duration, failed: bool) {
    histogram!(OP_EXECUTOR_DURATION, "operation" => operation).record(elapsed.as_secs_f64());
    if failed {
        counter!(OP_EXECUTOR_FAILURES, "operation" => operation).increment(1);
    }
}

pub(crate) fn record_explore_failure(operation: &'static str) {
    counter!(EXPLORE_FAILURES, "operation" => operation).increment(1);
}
