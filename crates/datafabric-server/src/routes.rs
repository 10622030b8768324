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

//! # Dataset HTTP API
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET | `/data/datasets/` | list (`meta`, `exploreEnabled`) |
//! | GET | `/data/datasets/{name}` | get |
//! | PUT | `/data/datasets/{name}` | create |
//! | DELETE | `/data/datasets/{name}` | drop |
//! | DELETE | `/data/unrecoverable/datasets/` | drop everything |
//! | POST | `/data/datasets/{name}/admin/{method}` | admin dispatch |
//! | POST | `/data/datasets/{name}/data/{method}` | always 501 |
//!
//! Collection paths answer with and without the trailing slash.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use tower_http::trace::TraceLayer;

use datafabric::models::{
    DatasetAdminOpResponse, DatasetInstanceConfiguration, DatasetListing, DatasetMeta,
    DatasetSpecification,
};
use datafabric::{BulkDropReport, ListOptions, LifecycleCoordinator};

use crate::error::{ApiError, ApiResult};

#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<LifecycleCoordinator>,
    /// Renders `/metrics`; the endpoint answers 404 without it.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(coordinator: Arc<LifecycleCoordinator>) -> Self {
        Self {
            coordinator,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/data/datasets", get(list_datasets))
        .route("/data/datasets/", get(list_datasets))
        .route(
            "/data/datasets/{name}",
            get(get_dataset).put(create_dataset).delete(drop_dataset),
        )
        .route("/data/datasets/{name}/admin/{method}", post(execute_admin))
        .route("/data/datasets/{name}/data/{method}", post(execute_data_op))
        .route("/data/unrecoverable/datasets", delete(drop_all_datasets))
        .route("/data/unrecoverable/datasets/", delete(drop_all_datasets))
        .route("/health", get(health))
        .route("/metrics", get(render_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Reads the listing options from raw query pairs.
///
/// A parameter may repeat. `meta` is on when any value is `true`;
/// `exploreEnabled` filters only when some value is `true` or `false`,
/// with `true` winning.
fn list_options(params: &[(String, String)]) -> ListOptions {
    let values = |key: &'static str| {
        params
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    };

    let mut options = ListOptions::new();
    if values("meta").any(|v| v == "true") {
        options = options.with_meta();
    }
    if values("exploreEnabled").any(|v| v == "true") {
        options = options.explorable(true);
    } else if values("exploreEnabled").any(|v| v == "false") {
        options = options.explorable(false);
    }
    options
}

async fn list_datasets(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<Json<Vec<DatasetListing>>> {
    let listed = state.coordinator.list(list_options(&params)).await?;
    Ok(Json(listed))
}

async fn get_dataset(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<DatasetMeta>> {
    match state.coordinator.get(&name).await? {
        Some(meta) => Ok(Json(meta)),
        None => Err(ApiError::NotFound { name }),
    }
}

async fn create_dataset(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Result<Json<DatasetInstanceConfiguration>, JsonRejection>,
) -> ApiResult<Json<DatasetSpecification>> {
    let Json(configuration) = body.map_err(|e| ApiError::BadRequest {
        message: format!("Invalid creation properties for dataset '{}': {}", name, e),
    })?;
    let spec = state.coordinator.create(&name, configuration).await?;
    Ok(Json(spec))
}

async fn drop_dataset(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<StatusCode> {
    state.coordinator.drop_instance(&name).await?;
    Ok(StatusCode::OK)
}

async fn drop_all_datasets(State(state): State<AppState>) -> ApiResult<Json<BulkDropReport>> {
    let report = state.coordinator.drop_all_unrecoverable().await?;
    Ok(Json(report))
}

async fn execute_admin(
    State(state): State<AppState>,
    Path((name, method)): Path<(String, String)>,
) -> ApiResult<Json<DatasetAdminOpResponse>> {
    let response = state.coordinator.execute_admin(&name, &method).await?;
    Ok(Json(response))
}

async fn execute_data_op(Path((name, method)): Path<(String, String)>) -> ApiError {
    ApiError::NotImplemented {
        message: format!(
            "Data operation '{}' on dataset '{}' is not supported",
            method, name
        ),
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn render_metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
