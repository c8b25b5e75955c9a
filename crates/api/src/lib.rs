//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST routes for producers, journal maintenance, fiscal operations,
//!   reconciliation and reports
//! - Mapping of ledger errors onto JSON error bodies
//! - A report cache keyed by ledger version

pub mod cache;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use folio_core::ledger::Ledger;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use cache::ReportCache;
pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The transactional ledger.
    pub ledger: Arc<Ledger>,
    /// Rendered reports of recent ledger versions.
    pub reports: ReportCache,
}

impl AppState {
    /// Creates the state around a ledger with a default report cache.
    #[must_use]
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self {
            ledger,
            reports: ReportCache::new(),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
