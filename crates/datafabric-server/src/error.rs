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

//! HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use datafabric::{CatalogError, ErrorKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Stable error code identifier.
    pub error_code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Dataset instance '{name}' does not exist")]
    NotFound { name: String },

    #[error("{message}")]
    BadRequest { message: String },

    #[error("{message}")]
    NotImplemented { message: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Catalog(e) => match e.kind() {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Forbidden => StatusCode::FORBIDDEN,
                ErrorKind::IsolationExecution
                | ErrorKind::BestEffort
                | ErrorKind::PartialFailure
                | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotImplemented { .. } => StatusCode::NOT_IMPLEMENTED,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Catalog(e) => e.error_code(),
            ApiError::NotFound { .. } => "INSTANCE_NOT_FOUND",
            ApiError::BadRequest { .. } => "BAD_REQUEST",
            ApiError::NotImplemented { .. } => "NOT_SUPPORTED",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error_code = self.error_code(), "{}", self);
        }
        let payload = ErrorResponse {
            error: ErrorDetail {
                error_code: self.error_code().to_string(),
                message: self.to_string(),
            },
        };
        (status, axum::Json(payload)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
