//! Report routes.
//!
//! Every report is derived from one committed snapshot and cached under the
//! ledger version it was derived from. Trial balance and cash flow are
//! verified before they are returned; a failed check is a consistency error.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use chrono::{NaiveDate, Utc};
use folio_core::ledger::{LedgerState, SourceModule};
use folio_core::reports::{ReportError, ReportFilter, ReportService};
use folio_core::subledger::OpenItemKind;
use folio_shared::AppError;
use folio_shared::types::FiscalYearId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ApiError, AppState};

/// Creates the report routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/trial-balance", get(get_trial_balance))
        .route("/reports/general-ledger", get(get_general_ledger))
        .route("/reports/profit-and-loss", get(get_profit_and_loss))
        .route("/reports/balance-sheet", get(get_balance_sheet))
        .route("/reports/cash-flow", get(get_cash_flow))
        .route("/reports/aging", get(get_aging))
        .route("/reports/vat-return", get(get_vat_return))
        .route("/reports/corporate-tax", get(get_corporate_tax))
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Query parameters for point-in-time reports.
#[derive(Debug, Deserialize)]
pub struct AsOfQuery {
    /// As of date (defaults to today).
    pub as_of: Option<NaiveDate>,
    /// Only this account.
    pub account: Option<String>,
    /// Only lines from this module.
    pub source: Option<SourceModule>,
}

/// Query parameters for range reports.
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    /// Start date.
    pub from: NaiveDate,
    /// End date.
    pub to: NaiveDate,
    /// Only this account.
    pub account: Option<String>,
    /// Only lines from this module.
    pub source: Option<SourceModule>,
}

/// Query parameters for the aging report.
#[derive(Debug, Deserialize)]
pub struct AgingQuery {
    /// Receivables or payables.
    pub kind: OpenItemKind,
    /// As of date (defaults to today).
    pub as_of: Option<NaiveDate>,
}

/// Query parameters for the VAT return.
#[derive(Debug, Deserialize)]
pub struct VatQuery {
    /// Start date.
    pub from: NaiveDate,
    /// End date.
    pub to: NaiveDate,
    /// Manual adjustments to the liability.
    #[serde(default)]
    pub adjustments: Decimal,
}

/// Query parameters for the corporate tax computation.
#[derive(Debug, Deserialize)]
pub struct CorporateTaxQuery {
    /// Fiscal year; replaces `from`/`to`.
    pub fiscal_year_id: Option<FiscalYearId>,
    /// Start date.
    pub from: Option<NaiveDate>,
    /// End date.
    pub to: Option<NaiveDate>,
    /// Non-deductible expenses added back.
    #[serde(default)]
    pub addbacks: Decimal,
    /// Exempt income deducted.
    #[serde(default)]
    pub exempt: Decimal,
}

fn filter(account: Option<&String>, source: Option<SourceModule>) -> ReportFilter {
    ReportFilter {
        account_code: account.cloned(),
        source_module: source,
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Derives a report from the latest snapshot, or serves it from the cache.
async fn cached<T, F>(state: &AppState, key: String, build: F) -> Result<Json<Value>, ApiError>
where
    T: Serialize,
    F: FnOnce(&LedgerState) -> Result<T, ReportError>,
{
    let version = state.ledger.version();
    let snapshot = state.ledger.snapshot();
    let value = state
        .reports
        .get_or_render(version, &key, || async move {
            let report = build(&snapshot)?;
            Ok::<_, ApiError>(serde_json::to_value(report)?)
        })
        .await?;
    Ok(Json(Value::clone(&value)))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET `/reports/trial-balance` - Balances of every leaf account.
async fn get_trial_balance(
    State(state): State<AppState>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<Value>, ApiError> {
    let as_of = query.as_of.unwrap_or_else(today);
    let filter = filter(query.account.as_ref(), query.source);
    let key = format!("trial-balance:{as_of}:{filter:?}");
    cached(&state, key, move |s| {
        let report = ReportService::trial_balance(s, as_of, &filter)?;
        report.verify()?;
        Ok(report)
    })
    .await
}

/// GET `/reports/general-ledger` - Lines per account with running balances.
async fn get_general_ledger(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Value>, ApiError> {
    let filter = filter(query.account.as_ref(), query.source);
    let key = format!("general-ledger:{query:?}");
    cached(&state, key, move |s| {
        ReportService::general_ledger(s, query.from, query.to, &filter)
    })
    .await
}

/// GET `/reports/profit-and-loss` - Income less expenses over a range.
async fn get_profit_and_loss(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Value>, ApiError> {
    let filter = filter(query.account.as_ref(), query.source);
    let key = format!("profit-and-loss:{query:?}");
    cached(&state, key, move |s| {
        ReportService::profit_and_loss(s, query.from, query.to, &filter)
    })
    .await
}

/// GET `/reports/balance-sheet` - Assets against liabilities and equity.
async fn get_balance_sheet(
    State(state): State<AppState>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<Value>, ApiError> {
    let as_of = query.as_of.unwrap_or_else(today);
    let key = format!("balance-sheet:{as_of}");
    cached(&state, key, move |s| {
        Ok(ReportService::balance_sheet(s, as_of))
    })
    .await
}

/// GET `/reports/cash-flow` - Cash movements by activity.
async fn get_cash_flow(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Value>, ApiError> {
    let filter = filter(query.account.as_ref(), query.source);
    let key = format!("cash-flow:{query:?}");
    cached(&state, key, move |s| {
        let report = ReportService::cash_flow(s, query.from, query.to, &filter)?;
        report.verify()?;
        Ok(report)
    })
    .await
}

/// GET `/reports/aging` - Outstanding receivables or payables by age.
async fn get_aging(
    State(state): State<AppState>,
    Query(query): Query<AgingQuery>,
) -> Result<Json<Value>, ApiError> {
    let as_of = query.as_of.unwrap_or_else(today);
    let key = format!("aging:{:?}:{as_of}", query.kind);
    cached(&state, key, move |s| {
        ReportService::aging(s, query.kind, as_of)
    })
    .await
}

/// GET `/reports/vat-return` - Output and input VAT for a range.
async fn get_vat_return(
    State(state): State<AppState>,
    Query(query): Query<VatQuery>,
) -> Result<Json<Value>, ApiError> {
    let key = format!("vat-return:{query:?}");
    cached(&state, key, move |s| {
        ReportService::vat_return(s, query.from, query.to, query.adjustments)
    })
    .await
}

/// GET `/reports/corporate-tax` - Taxable income and tax payable.
async fn get_corporate_tax(
    State(state): State<AppState>,
    Query(query): Query<CorporateTaxQuery>,
) -> Result<Json<Value>, ApiError> {
    let key = format!("corporate-tax:{query:?}");
    match (query.fiscal_year_id, query.from, query.to) {
        (Some(id), _, _) => {
            cached(&state, key, move |s| {
                ReportService::corporate_tax_for_year(s, id, query.addbacks, query.exempt)
            })
            .await
        }
        (None, Some(from), Some(to)) => {
            cached(&state, key, move |s| {
                ReportService::corporate_tax(s, from, to, query.addbacks, query.exempt)
            })
            .await
        }
        _ => Err(ApiError::new(
            AppError::Validation("fiscal_year_id or from and to are required".into()),
            "INVALID_PARAMETER",
        )),
    }
}
