//! Chart of accounts and account determination routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use folio_core::chart::{Account, NewAccount};
use folio_core::determination::{AccountMapping, TransactionType};
use folio_core::ledger::LedgerError;
use folio_shared::AppError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::{ApiError, AppState};

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route("/accounts/{code}", get(get_account))
        .route("/accounts/{code}/opening-balance", put(set_opening_balance))
        .route("/accounts/{code}/deactivate", post(deactivate_account))
        .route("/mappings", get(list_mappings))
        .route(
            "/mappings/{transaction_type}",
            put(set_mapping).delete(remove_mapping),
        )
}

/// Request body for setting an opening balance.
#[derive(Debug, Deserialize)]
pub struct OpeningBalanceRequest {
    /// Signed amount in the account's normal direction.
    pub amount: Decimal,
}

/// Request body for mapping a transaction type.
#[derive(Debug, Deserialize)]
pub struct SetMappingRequest {
    /// Target leaf account.
    pub account_code: String,
}

/// Account with its display figures.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Stored account.
    #[serde(flatten)]
    pub account: Account,
    /// Balance sign disagrees with the account type.
    pub has_abnormal_balance: bool,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            has_abnormal_balance: account.has_abnormal_balance(),
            account,
        }
    }
}

/// Effective resolution of one transaction type.
#[derive(Debug, Serialize)]
pub struct MappingRow {
    /// Transaction type.
    pub transaction_type: TransactionType,
    /// Configured account, if any.
    pub mapped_account: Option<String>,
    /// Hardcoded fallback code.
    pub fallback_code: &'static str,
}

/// GET `/accounts` - List the chart of accounts.
async fn list_accounts(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.ledger.snapshot();
    let accounts: Vec<AccountResponse> = snapshot
        .chart()
        .iter()
        .cloned()
        .map(AccountResponse::from)
        .collect();
    Json(json!({ "accounts": accounts }))
}

/// POST `/accounts` - Create an account.
async fn create_account(
    State(state): State<AppState>,
    Json(payload): Json<NewAccount>,
) -> Result<impl IntoResponse, ApiError> {
    let account = state
        .ledger
        .transact(move |s| s.create_account(payload))
        .await?;
    info!(account = %account.code, "Account created");
    Ok((StatusCode::CREATED, Json(AccountResponse::from(account))))
}

/// GET `/accounts/{code}` - Fetch one account.
async fn get_account(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let snapshot = state.ledger.snapshot();
    let account = snapshot
        .chart()
        .get(&code)
        .cloned()
        .ok_or(LedgerError::AccountNotFound(code))?;
    Ok(Json(AccountResponse::from(account)))
}

/// PUT `/accounts/{code}/opening-balance` - Set the opening balance.
async fn set_opening_balance(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(payload): Json<OpeningBalanceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let account = state
        .ledger
        .transact(move |s| s.set_opening_balance(&code, payload.amount))
        .await?;
    info!(account = %account.code, amount = %payload.amount, "Opening balance set");
    Ok(Json(AccountResponse::from(account)))
}

/// POST `/accounts/{code}/deactivate` - Stop further postings.
async fn deactivate_account(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let account = state
        .ledger
        .transact(move |s| s.deactivate_account(&code))
        .await?;
    info!(account = %account.code, "Account deactivated");
    Ok(Json(AccountResponse::from(account)))
}

/// GET `/mappings` - Effective resolution for every transaction type.
async fn list_mappings(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.ledger.snapshot();
    let rows: Vec<MappingRow> = TransactionType::ALL
        .iter()
        .map(|&transaction_type| MappingRow {
            transaction_type,
            mapped_account: snapshot
                .mappings()
                .get(transaction_type)
                .map(str::to_string),
            fallback_code: transaction_type.fallback_code(),
        })
        .collect();
    Json(json!({ "mappings": rows }))
}

/// PUT `/mappings/{transaction_type}` - Map a transaction type to an account.
async fn set_mapping(
    State(state): State<AppState>,
    Path(transaction_type): Path<TransactionType>,
    Json(payload): Json<SetMappingRequest>,
) -> Result<Json<AccountMapping>, ApiError> {
    let mapping = state
        .ledger
        .transact(move |s| s.set_mapping(transaction_type, &payload.account_code))
        .await?;
    info!(
        transaction_type = %mapping.transaction_type,
        account = %mapping.account_code,
        "Account mapping set"
    );
    Ok(Json(mapping))
}

/// DELETE `/mappings/{transaction_type}` - Fall back to the hardcoded account.
async fn remove_mapping(
    State(state): State<AppState>,
    Path(transaction_type): Path<TransactionType>,
) -> Result<StatusCode, ApiError> {
    let removed = state
        .ledger
        .transact(move |s| Ok(s.remove_mapping(transaction_type)))
        .await?;
    if !removed {
        return Err(AppError::NotFound(format!("no mapping for {transaction_type}")).into());
    }
    info!(transaction_type = %transaction_type, "Account mapping removed");
    Ok(StatusCode::NO_CONTENT)
}
