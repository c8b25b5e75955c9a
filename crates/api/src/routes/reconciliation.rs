//! Bank reconciliation routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use folio_core::ledger::{JournalEntry, LedgerError};
use folio_core::reconciliation::{
    AdjustmentKind, AutoMatchResult, BankStatement, BalanceCheck, MatchTarget, NewStatement,
    StatementLine,
};
use folio_shared::types::StatementId;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::{ApiError, AppState};

/// Creates the reconciliation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bank-statements", get(list_statements).post(import_statement))
        .route("/bank-statements/{id}", get(get_statement))
        .route("/bank-statements/{id}/auto-match", post(auto_match))
        .route(
            "/bank-statements/{id}/lines/{line}/match",
            post(manual_match).delete(unmatch),
        )
        .route(
            "/bank-statements/{id}/lines/{line}/adjustment",
            post(create_adjustment),
        )
        .route("/bank-statements/{id}/balance", get(validate_balance))
        .route("/bank-statements/{id}/finalize", post(finalize_statement))
}

/// Request body for an adjustment entry.
#[derive(Debug, Deserialize)]
pub struct AdjustmentRequest {
    /// What the unmatched line represents.
    pub kind: AdjustmentKind,
    /// Acting user.
    pub user: String,
}

/// Statement arithmetic with its verdict.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    /// Computed and stated closing balances.
    #[serde(flatten)]
    pub check: BalanceCheck,
    /// Difference is zero.
    pub is_balanced: bool,
}

/// GET `/bank-statements` - List imported statements.
async fn list_statements(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.ledger.snapshot();
    let statements: Vec<&BankStatement> = snapshot.statements().iter().collect();
    Json(json!({ "statements": statements }))
}

/// POST `/bank-statements` - Import a statement.
async fn import_statement(
    State(state): State<AppState>,
    Json(payload): Json<NewStatement>,
) -> Result<impl IntoResponse, ApiError> {
    let statement = state
        .ledger
        .transact(move |s| s.import_statement(payload))
        .await?;
    info!(
        statement_id = %statement.id,
        account = %statement.bank_account_code,
        lines = statement.lines.len(),
        "Bank statement imported"
    );
    Ok((StatusCode::CREATED, Json(statement)))
}

/// GET `/bank-statements/{id}` - Fetch a statement with its lines.
async fn get_statement(
    State(state): State<AppState>,
    Path(id): Path<StatementId>,
) -> Result<Json<BankStatement>, ApiError> {
    let snapshot = state.ledger.snapshot();
    let statement = snapshot
        .statements()
        .get(id)
        .cloned()
        .ok_or(LedgerError::StatementNotFound(id))?;
    Ok(Json(statement))
}

/// POST `/bank-statements/{id}/auto-match` - Match lines to payments and GL lines.
async fn auto_match(
    State(state): State<AppState>,
    Path(id): Path<StatementId>,
) -> Result<Json<AutoMatchResult>, ApiError> {
    let result = state.ledger.transact(move |s| s.auto_match(id)).await?;
    info!(
        statement_id = %id,
        matched = result.matched.len(),
        unmatched = result.unmatched.len(),
        "Auto-match completed"
    );
    Ok(Json(result))
}

/// POST `/bank-statements/{id}/lines/{line}/match` - Match one line by hand.
async fn manual_match(
    State(state): State<AppState>,
    Path((id, line)): Path<(StatementId, u32)>,
    Json(target): Json<MatchTarget>,
) -> Result<Json<StatementLine>, ApiError> {
    let matched = state
        .ledger
        .transact(move |s| s.manual_match(id, line, target))
        .await?;
    info!(statement_id = %id, line, "Statement line matched");
    Ok(Json(matched))
}

/// DELETE `/bank-statements/{id}/lines/{line}/match` - Clear a match.
async fn unmatch(
    State(state): State<AppState>,
    Path((id, line)): Path<(StatementId, u32)>,
) -> Result<Json<StatementLine>, ApiError> {
    let cleared = state.ledger.transact(move |s| s.unmatch(id, line)).await?;
    info!(statement_id = %id, line, "Statement line unmatched");
    Ok(Json(cleared))
}

/// POST `/bank-statements/{id}/lines/{line}/adjustment` - Book an unmatched line.
async fn create_adjustment(
    State(state): State<AppState>,
    Path((id, line)): Path<(StatementId, u32)>,
    Json(payload): Json<AdjustmentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let entry: JournalEntry = state
        .ledger
        .transact(move |s| s.create_adjustment(id, line, payload.kind, &payload.user))
        .await?;
    info!(
        statement_id = %id,
        line,
        entry_number = %entry.entry_number.as_deref().unwrap_or_default(),
        "Reconciliation adjustment posted"
    );
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET `/bank-statements/{id}/balance` - Check the statement arithmetic.
async fn validate_balance(
    State(state): State<AppState>,
    Path(id): Path<StatementId>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let check = state.ledger.snapshot().validate_balance(id)?;
    Ok(Json(BalanceResponse {
        is_balanced: check.is_balanced(),
        check,
    }))
}

/// POST `/bank-statements/{id}/finalize` - Close a fully reconciled statement.
async fn finalize_statement(
    State(state): State<AppState>,
    Path(id): Path<StatementId>,
) -> Result<Json<BankStatement>, ApiError> {
    let statement = state
        .ledger
        .transact(move |s| s.finalize_statement(id))
        .await?;
    info!(statement_id = %id, "Bank statement finalized");
    Ok(Json(statement))
}
