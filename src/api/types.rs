//! Wire types for the quote API
//!
//! All types use camelCase JSON serialization.

use crate::error::Error;
use crate::quote::{MergeReport, Quote};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Request body for adding a quote
#[derive(Debug, Deserialize)]
pub struct AddQuoteRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub category: String,
}

/// Response for an add
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddQuoteResponse {
    pub quote: Quote,
    pub is_new: bool,
    pub total: usize,
    pub storage_error: Option<String>,
}

/// Response for an import
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    #[serde(flatten)]
    pub report: MergeReport,
    pub total: usize,
    pub storage_error: Option<String>,
}

/// Response for a random quote
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomQuoteResponse {
    pub quote: Quote,
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

/// API error detail
#[derive(Debug, Serialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::Validation { .. } | Error::Import(_) | Error::Format(_) => StatusCode::BAD_REQUEST,
        Error::EmptyCategory(_) => StatusCode::NOT_FOUND,
        Error::Sync(_) | Error::Http(_) => StatusCode::BAD_GATEWAY,
        Error::Storage(_)
        | Error::Config(_)
        | Error::Io(_)
        | Error::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        if status.is_server_error() {
            tracing::warn!(error = %self, "Request failed");
        }
        (status, Json(ApiError::new(self.code(), self.to_string()))).into_response()
    }
}
