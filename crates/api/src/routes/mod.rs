//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod accounts;
pub mod fiscal;
pub mod health;
pub mod journal;
pub mod producers;
pub mod reconciliation;
pub mod reports;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(accounts::routes())
        .merge(fiscal::routes())
        .merge(journal::routes())
        .merge(producers::routes())
        .merge(reconciliation::routes())
        .merge(reports::routes())
}
