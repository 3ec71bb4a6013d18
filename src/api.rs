//! HTTP API for Quotebook
//!
//! Serves the quote router plus a health probe, with CORS and request
//! tracing layers.
//!
//! ## Endpoint Map
//!
//! | Prefix                 | Description                          |
//! |------------------------|--------------------------------------|
//! | `/health`              | Health probe                         |
//! | `/api/v1/quotes*`      | List, add, random quote              |
//! | `/api/v1/categories`   | Category index                       |
//! | `/api/v1/export`       | JSON download                        |
//! | `/api/v1/import`       | JSON upload                          |
//! | `/api/v1/sync`         | Sync status and manual sync          |
//! | `/api/v1/session`      | Session snapshot                     |

mod handler;
mod types;

pub use handler::{quotes_router, QuotesState};
pub use types::{AddQuoteRequest, AddQuoteResponse, ApiError, ImportResponse};

use crate::app::QuoteApp;
use axum::{
    http::{header, Method},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the complete HTTP application
pub fn build_app(app: Arc<QuoteApp>, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(quotes_router(QuotesState { app }))
        .layer(build_cors(cors_origins))
        .layer(TraceLayer::new_for_http())
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let parsed: Vec<_> = origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(parsed)
    }
}
