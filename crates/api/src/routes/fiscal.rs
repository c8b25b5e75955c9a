//! Fiscal year and period management routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use folio_core::fiscal::{AccountingPeriod, FiscalYear};
use folio_core::ledger::{LedgerState, YearEndClose};
use folio_shared::types::{FiscalYearId, PeriodId};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::{ApiError, AppState};

/// Creates the fiscal routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/fiscal-years", get(list_fiscal_years).post(create_fiscal_year))
        .route("/fiscal-years/{id}/close", post(close_fiscal_year))
        .route("/fiscal-periods/{id}/lock", post(lock_period))
        .route("/fiscal-periods/{id}/unlock", post(unlock_period))
}

/// Request body for creating a fiscal year.
#[derive(Debug, Deserialize)]
pub struct CreateFiscalYearRequest {
    /// Fiscal year name (e.g., "FY2026").
    pub name: String,
    /// Start date (YYYY-MM-DD).
    pub start_date: NaiveDate,
    /// End date (YYYY-MM-DD).
    pub end_date: NaiveDate,
}

/// Request body for closing a fiscal year.
#[derive(Debug, Deserialize)]
pub struct CloseFiscalYearRequest {
    /// Acting user.
    pub user: String,
}

/// Fiscal year with its nested periods.
#[derive(Debug, Serialize)]
pub struct FiscalYearResponse {
    /// Fiscal year.
    #[serde(flatten)]
    pub year: FiscalYear,
    /// Periods in date order.
    pub periods: Vec<AccountingPeriod>,
}

fn year_response(state: &LedgerState, year: FiscalYear) -> FiscalYearResponse {
    let periods = state.calendar().periods_of(year.id).cloned().collect();
    FiscalYearResponse { year, periods }
}

/// GET `/fiscal-years` - List fiscal years with nested periods.
async fn list_fiscal_years(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.ledger.snapshot();
    let years: Vec<FiscalYearResponse> = snapshot
        .calendar()
        .years()
        .cloned()
        .map(|year| year_response(&snapshot, year))
        .collect();
    Json(json!({ "fiscal_years": years }))
}

/// POST `/fiscal-years` - Create a fiscal year with monthly periods.
async fn create_fiscal_year(
    State(state): State<AppState>,
    Json(payload): Json<CreateFiscalYearRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let response = state
        .ledger
        .transact(move |s| {
            let year = s.create_fiscal_year(payload.name, payload.start_date, payload.end_date)?;
            Ok(year_response(s, year))
        })
        .await?;
    info!(
        fiscal_year_id = %response.year.id,
        name = %response.year.name,
        "Fiscal year created"
    );
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST `/fiscal-years/{id}/close` - Run the year-end close.
async fn close_fiscal_year(
    State(state): State<AppState>,
    Path(id): Path<FiscalYearId>,
    Json(payload): Json<CloseFiscalYearRequest>,
) -> Result<Json<YearEndClose>, ApiError> {
    let closed = state
        .ledger
        .transact(move |s| s.close_year(id, &payload.user))
        .await?;
    info!(
        fiscal_year_id = %closed.fiscal_year_id,
        net_income = %closed.net_income,
        "Fiscal year closed"
    );
    Ok(Json(closed))
}

/// POST `/fiscal-periods/{id}/lock` - Stop postings into a period.
async fn lock_period(
    State(state): State<AppState>,
    Path(id): Path<PeriodId>,
) -> Result<Json<AccountingPeriod>, ApiError> {
    let period = state.ledger.transact(move |s| s.lock_period(id)).await?;
    info!(period_id = %period.id, "Fiscal period locked");
    Ok(Json(period))
}

/// POST `/fiscal-periods/{id}/unlock` - Reopen a locked period.
async fn unlock_period(
    State(state): State<AppState>,
    Path(id): Path<PeriodId>,
) -> Result<Json<AccountingPeriod>, ApiError> {
    let period = state.ledger.transact(move |s| s.unlock_period(id)).await?;
    info!(period_id = %period.id, "Fiscal period unlocked");
    Ok(Json(period))
}
