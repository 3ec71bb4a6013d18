//! HTTP handlers for the quote API
//!
//! - `GET    /api/v1/quotes`: list quotes (optional `category`)
//! - `POST   /api/v1/quotes`: add a quote
//! - `GET    /api/v1/quotes/random`: random quote, remembered in the session
//! - `GET    /api/v1/categories`: sorted distinct categories
//! - `GET    /api/v1/export`: `quotes.json` download
//! - `POST   /api/v1/import`: merge an uploaded JSON array
//! - `GET    /api/v1/sync`: sync status
//! - `POST   /api/v1/sync`: manual sync
//! - `GET    /api/v1/session`: remembered category and quote
//! - `DELETE /api/v1/session`: forget them

use super::types::*;
use crate::app::QuoteApp;
use crate::error::Error;
use crate::transfer::EXPORT_FILE_NAME;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// Shared state for quote handlers
#[derive(Clone)]
pub struct QuotesState {
    pub app: Arc<QuoteApp>,
}

/// Create the quote router with all REST endpoints
pub fn quotes_router(state: QuotesState) -> Router {
    Router::new()
        .route("/api/v1/quotes", get(list_quotes).post(add_quote))
        .route("/api/v1/quotes/random", get(random_quote))
        .route("/api/v1/categories", get(list_categories))
        .route("/api/v1/export", get(export_quotes))
        .route("/api/v1/import", axum::routing::post(import_quotes))
        .route("/api/v1/sync", get(sync_status).post(sync_now))
        .route("/api/v1/session", get(get_session).delete(clear_session))
        .with_state(state)
}

// =============================================================================
// Query parameter types
// =============================================================================

#[derive(Debug, Deserialize)]
struct CategoryQuery {
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImportQuery {
    filename: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SyncQuery {
    #[serde(rename = "pushAll", default)]
    push_all: bool,
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /api/v1/quotes
async fn list_quotes(
    State(state): State<QuotesState>,
    Query(params): Query<CategoryQuery>,
) -> impl IntoResponse {
    Json(state.app.quotes_in(params.category.as_deref()).await)
}

/// POST /api/v1/quotes
async fn add_quote(
    State(state): State<QuotesState>,
    Json(request): Json<AddQuoteRequest>,
) -> Result<impl IntoResponse, Error> {
    let commit = state.app.add_quote(&request.text, &request.category).await?;
    let status = if commit.outcome.is_new {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(AddQuoteResponse {
            quote: commit.outcome.quote,
            is_new: commit.outcome.is_new,
            total: commit.catalog.len(),
            storage_error: commit.storage_error,
        }),
    ))
}

/// GET /api/v1/quotes/random
async fn random_quote(
    State(state): State<QuotesState>,
    Query(params): Query<CategoryQuery>,
) -> Result<impl IntoResponse, Error> {
    let quote = state.app.random_quote(params.category.as_deref()).await?;
    Ok(Json(RandomQuoteResponse { quote }))
}

/// GET /api/v1/categories
async fn list_categories(State(state): State<QuotesState>) -> impl IntoResponse {
    Json(state.app.categories().await)
}

/// GET /api/v1/export
async fn export_quotes(State(state): State<QuotesState>) -> Result<impl IntoResponse, Error> {
    let body = state.app.export().await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME),
            ),
        ],
        body,
    ))
}

/// POST /api/v1/import
async fn import_quotes(
    State(state): State<QuotesState>,
    Query(params): Query<ImportQuery>,
    body: Bytes,
) -> Result<impl IntoResponse, Error> {
    let file_name = params.filename.as_deref().unwrap_or(EXPORT_FILE_NAME);
    let commit = state.app.import_bytes(file_name, &body).await?;
    Ok(Json(ImportResponse {
        report: commit.outcome,
        total: commit.catalog.len(),
        storage_error: commit.storage_error,
    }))
}

/// GET /api/v1/sync
async fn sync_status(State(state): State<QuotesState>) -> impl IntoResponse {
    Json(state.app.sync_status().await)
}

/// POST /api/v1/sync
async fn sync_now(
    State(state): State<QuotesState>,
    Query(params): Query<SyncQuery>,
) -> impl IntoResponse {
    Json(state.app.sync_now(params.push_all).await)
}

/// GET /api/v1/session
async fn get_session(State(state): State<QuotesState>) -> impl IntoResponse {
    Json(state.app.session().await)
}

/// DELETE /api/v1/session
async fn clear_session(State(state): State<QuotesState>) -> impl IntoResponse {
    state.app.clear_session().await;
    StatusCode::NO_CONTENT
}
