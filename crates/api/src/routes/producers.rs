//! Document producer routes.
//!
//! Each handler hands a business document to its producer, which turns it
//! into posting lines and calls `submit_posting` inside one ledger
//! transaction. Cancellations go through the reversal engine.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use folio_core::assets::{FixedAsset, NewFixedAsset};
use folio_core::ledger::{JournalEntry, ReversalRequest};
use folio_core::producers::{
    AssetDisposal, AssetPosting, BankTransfer, ChequePosting, CorporateTaxPayment,
    CorporateTaxProvision, DocumentPosting, ExpenseClaim, ExpenseReimbursement, PaymentInput,
    PaymentPosting, PayrollRun, PdcBounce, PdcClearance, PdcDeposit, SalaryPayment, SalesInvoice,
    VatSettlement, VendorBill, post_corporate_tax_payment, post_corporate_tax_provision,
    post_expense_claim, post_expense_reimbursement, post_payroll_run, post_salary_payment,
    post_vat_settlement,
};
use folio_core::subledger::{ChequeStatus, OpenItem, OpenItemKind, OpenItemStatus, PdcCheque};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::{ApiError, AppState};

/// Creates the producer routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sales-invoices", post(post_sales_invoice))
        .route("/sales-invoices/{number}/cancel", post(cancel_sales_invoice))
        .route("/vendor-bills", post(post_vendor_bill))
        .route("/vendor-bills/{number}/cancel", post(cancel_vendor_bill))
        .route("/open-items", get(list_open_items))
        .route("/payments/receipts", post(record_customer_receipt))
        .route("/payments/disbursements", post(record_vendor_payment))
        .route("/pdc-cheques", get(list_cheques).post(deposit_cheque))
        .route("/pdc-cheques/{number}/clear", post(clear_cheque))
        .route("/pdc-cheques/{number}/bounce", post(bounce_cheque))
        .route("/bank-transfers", post(post_bank_transfer))
        .route("/expense-claims", post(post_claim))
        .route("/expense-claims/reimbursements", post(reimburse_claim))
        .route("/payroll/runs", post(post_payroll))
        .route("/payroll/payments", post(pay_salaries))
        .route("/assets", get(list_assets).post(acquire_asset))
        .route("/assets/depreciation-runs", post(run_depreciation))
        .route("/assets/{code}/depreciate", post(depreciate_asset))
        .route("/assets/{code}/dispose", post(dispose_asset))
        .route("/tax/vat-settlements", post(settle_vat))
        .route("/tax/corporate-tax/provisions", post(provide_corporate_tax))
        .route("/tax/corporate-tax/payments", post(pay_corporate_tax))
}

/// Query parameters for listing open items.
#[derive(Debug, Default, Deserialize)]
pub struct OpenItemQuery {
    /// Receivables or payables.
    pub kind: Option<OpenItemKind>,
    /// Only this party.
    pub party: Option<String>,
    /// Only items in this status.
    pub status: Option<OpenItemStatus>,
}

/// Query parameters for listing post-dated cheques.
#[derive(Debug, Default, Deserialize)]
pub struct ChequeQuery {
    /// Only cheques in this status.
    pub status: Option<ChequeStatus>,
}

/// Request body for acquiring an asset.
#[derive(Debug, Deserialize)]
pub struct AcquireAssetRequest {
    /// Asset master data.
    #[serde(flatten)]
    pub asset: NewFixedAsset,
    /// Credit side of the acquisition; defaults to the mapped clearing account.
    #[serde(default)]
    pub funding_account: Option<String>,
    /// Acting user.
    pub user: String,
}

/// Request body for depreciation.
#[derive(Debug, Deserialize)]
pub struct DepreciationRequest {
    /// Month end being depreciated.
    pub period_end: NaiveDate,
    /// Acting user.
    pub user: String,
}

fn log_entry(entry: &JournalEntry, message: &'static str) {
    info!(
        entry_number = %entry.entry_number.as_deref().unwrap_or_default(),
        reference = %entry.reference,
        total = %entry.total_debit,
        "{message}"
    );
}

/// POST `/sales-invoices` - Post an invoice and register the receivable.
async fn post_sales_invoice(
    State(state): State<AppState>,
    Json(payload): Json<SalesInvoice>,
) -> Result<impl IntoResponse, ApiError> {
    let posted: DocumentPosting = state
        .ledger
        .transact(move |s| s.post_sales_invoice(&payload))
        .await?;
    log_entry(&posted.entry, "Sales invoice posted");
    Ok((StatusCode::CREATED, Json(posted)))
}

/// POST `/sales-invoices/{number}/cancel` - Reverse an unpaid invoice.
async fn cancel_sales_invoice(
    State(state): State<AppState>,
    Path(number): Path<String>,
    Json(payload): Json<ReversalRequest>,
) -> Result<Json<JournalEntry>, ApiError> {
    let reversal = state
        .ledger
        .transact(move |s| s.cancel_sales_invoice(&number, &payload))
        .await?;
    log_entry(&reversal, "Sales invoice cancelled");
    Ok(Json(reversal))
}

/// POST `/vendor-bills` - Post a bill and register the payable.
async fn post_vendor_bill(
    State(state): State<AppState>,
    Json(payload): Json<VendorBill>,
) -> Result<impl IntoResponse, ApiError> {
    let posted: DocumentPosting = state
        .ledger
        .transact(move |s| s.post_vendor_bill(&payload))
        .await?;
    log_entry(&posted.entry, "Vendor bill posted");
    Ok((StatusCode::CREATED, Json(posted)))
}

/// POST `/vendor-bills/{number}/cancel` - Reverse an unpaid bill.
async fn cancel_vendor_bill(
    State(state): State<AppState>,
    Path(number): Path<String>,
    Json(payload): Json<ReversalRequest>,
) -> Result<Json<JournalEntry>, ApiError> {
    let reversal = state
        .ledger
        .transact(move |s| s.cancel_vendor_bill(&number, &payload))
        .await?;
    log_entry(&reversal, "Vendor bill cancelled");
    Ok(Json(reversal))
}

/// GET `/open-items` - Receivables and payables.
async fn list_open_items(
    State(state): State<AppState>,
    Query(query): Query<OpenItemQuery>,
) -> impl IntoResponse {
    let snapshot = state.ledger.snapshot();
    let items: Vec<&OpenItem> = snapshot
        .subledger()
        .items()
        .filter(|i| query.kind.is_none_or(|kind| i.kind == kind))
        .filter(|i| query.party.as_deref().is_none_or(|party| i.party == party))
        .filter(|i| query.status.is_none_or(|status| i.status == status))
        .collect();
    Json(json!({ "open_items": items }))
}

/// POST `/payments/receipts` - Record money received from a customer.
async fn record_customer_receipt(
    State(state): State<AppState>,
    Json(payload): Json<PaymentInput>,
) -> Result<impl IntoResponse, ApiError> {
    let posted: PaymentPosting = state
        .ledger
        .transact(move |s| s.record_customer_receipt(&payload))
        .await?;
    log_entry(&posted.entry, "Customer receipt recorded");
    Ok((StatusCode::CREATED, Json(posted)))
}

/// POST `/payments/disbursements` - Record money paid to a vendor.
async fn record_vendor_payment(
    State(state): State<AppState>,
    Json(payload): Json<PaymentInput>,
) -> Result<impl IntoResponse, ApiError> {
    let posted: PaymentPosting = state
        .ledger
        .transact(move |s| s.record_vendor_payment(&payload))
        .await?;
    log_entry(&posted.entry, "Vendor payment recorded");
    Ok((StatusCode::CREATED, Json(posted)))
}

/// GET `/pdc-cheques` - The post-dated cheque register.
async fn list_cheques(
    State(state): State<AppState>,
    Query(query): Query<ChequeQuery>,
) -> impl IntoResponse {
    let snapshot = state.ledger.snapshot();
    let cheques: Vec<&PdcCheque> = snapshot
        .cheques()
        .iter()
        .filter(|c| query.status.is_none_or(|s| c.status == s))
        .collect();
    Json(json!({ "cheques": cheques }))
}

/// POST `/pdc-cheques` - Deposit a post-dated cheque into PDC control.
async fn deposit_cheque(
    State(state): State<AppState>,
    Json(payload): Json<PdcDeposit>,
) -> Result<impl IntoResponse, ApiError> {
    let posted: ChequePosting = state
        .ledger
        .transact(move |s| s.deposit_pdc(&payload))
        .await?;
    log_entry(&posted.entry, "Post-dated cheque deposited");
    Ok((StatusCode::CREATED, Json(posted)))
}

/// POST `/pdc-cheques/{number}/clear` - Move a matured cheque to the bank.
async fn clear_cheque(
    State(state): State<AppState>,
    Path(number): Path<String>,
    Json(payload): Json<PdcClearance>,
) -> Result<Json<ChequePosting>, ApiError> {
    let posted = state
        .ledger
        .transact(move |s| s.clear_pdc(&number, &payload))
        .await?;
    log_entry(&posted.entry, "Post-dated cheque cleared");
    Ok(Json(posted))
}

/// POST `/pdc-cheques/{number}/bounce` - Reverse a returned cheque.
async fn bounce_cheque(
    State(state): State<AppState>,
    Path(number): Path<String>,
    Json(payload): Json<PdcBounce>,
) -> Result<Json<ChequePosting>, ApiError> {
    let posted = state
        .ledger
        .transact(move |s| s.bounce_pdc(&number, &payload))
        .await?;
    log_entry(&posted.entry, "Post-dated cheque bounced");
    Ok(Json(posted))
}

/// POST `/bank-transfers` - Move money between own cash accounts.
async fn post_bank_transfer(
    State(state): State<AppState>,
    Json(payload): Json<BankTransfer>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state
        .ledger
        .transact(move |s| s.post_bank_transfer(&payload))
        .await?;
    log_entry(&entry, "Bank transfer posted");
    Ok((StatusCode::CREATED, Json(entry)))
}

/// POST `/expense-claims` - Book an approved employee claim.
async fn post_claim(
    State(state): State<AppState>,
    Json(payload): Json<ExpenseClaim>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state
        .ledger
        .transact(move |s| post_expense_claim(s, &payload))
        .await?;
    log_entry(&entry, "Expense claim posted");
    Ok((StatusCode::CREATED, Json(entry)))
}

/// POST `/expense-claims/reimbursements` - Pay an employee's claims.
async fn reimburse_claim(
    State(state): State<AppState>,
    Json(payload): Json<ExpenseReimbursement>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state
        .ledger
        .transact(move |s| post_expense_reimbursement(s, &payload))
        .await?;
    log_entry(&entry, "Expense reimbursement posted");
    Ok((StatusCode::CREATED, Json(entry)))
}

/// POST `/payroll/runs` - Accrue a payroll run.
async fn post_payroll(
    State(state): State<AppState>,
    Json(payload): Json<PayrollRun>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state
        .ledger
        .transact(move |s| post_payroll_run(s, &payload))
        .await?;
    log_entry(&entry, "Payroll run posted");
    Ok((StatusCode::CREATED, Json(entry)))
}

/// POST `/payroll/payments` - Pay accrued salaries.
async fn pay_salaries(
    State(state): State<AppState>,
    Json(payload): Json<SalaryPayment>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state
        .ledger
        .transact(move |s| post_salary_payment(s, &payload))
        .await?;
    log_entry(&entry, "Salary payment posted");
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET `/assets` - The fixed asset register.
async fn list_assets(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.ledger.snapshot();
    let assets: Vec<&FixedAsset> = snapshot.assets().iter().collect();
    Json(json!({ "assets": assets }))
}

/// POST `/assets` - Capitalise an asset.
async fn acquire_asset(
    State(state): State<AppState>,
    Json(payload): Json<AcquireAssetRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let posted: AssetPosting = state
        .ledger
        .transact(move |s| {
            s.acquire_asset(
                payload.asset,
                payload.funding_account.as_deref(),
                &payload.user,
            )
        })
        .await?;
    log_entry(&posted.entry, "Fixed asset acquired");
    Ok((StatusCode::CREATED, Json(posted)))
}

/// POST `/assets/{code}/depreciate` - Depreciate one asset for a month.
async fn depreciate_asset(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(payload): Json<DepreciationRequest>,
) -> Result<Json<AssetPosting>, ApiError> {
    let posted = state
        .ledger
        .transact(move |s| s.depreciate_asset(&code, payload.period_end, &payload.user))
        .await?;
    log_entry(&posted.entry, "Depreciation posted");
    Ok(Json(posted))
}

/// POST `/assets/depreciation-runs` - Depreciate every active asset for a month.
async fn run_depreciation(
    State(state): State<AppState>,
    Json(payload): Json<DepreciationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let period_end = payload.period_end;
    let postings = state
        .ledger
        .transact(move |s| s.run_depreciation(period_end, &payload.user))
        .await?;
    info!(
        period_end = %period_end,
        assets = postings.len(),
        "Depreciation run completed"
    );
    Ok(Json(json!({ "postings": postings })))
}

/// POST `/assets/{code}/dispose` - Sell or scrap an asset.
async fn dispose_asset(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(payload): Json<AssetDisposal>,
) -> Result<Json<AssetPosting>, ApiError> {
    let posted = state
        .ledger
        .transact(move |s| s.dispose_asset(&code, &payload))
        .await?;
    log_entry(&posted.entry, "Fixed asset disposed");
    Ok(Json(posted))
}

/// POST `/tax/vat-settlements` - Clear output and input VAT for a return.
async fn settle_vat(
    State(state): State<AppState>,
    Json(payload): Json<VatSettlement>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state
        .ledger
        .transact(move |s| post_vat_settlement(s, &payload))
        .await?;
    log_entry(&entry, "VAT settlement posted");
    Ok((StatusCode::CREATED, Json(entry)))
}

/// POST `/tax/corporate-tax/provisions` - Book the corporate tax charge.
async fn provide_corporate_tax(
    State(state): State<AppState>,
    Json(payload): Json<CorporateTaxProvision>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state
        .ledger
        .transact(move |s| post_corporate_tax_provision(s, &payload))
        .await?;
    log_entry(&entry, "Corporate tax provision posted");
    Ok((StatusCode::CREATED, Json(entry)))
}

/// POST `/tax/corporate-tax/payments` - Pay corporate tax.
async fn pay_corporate_tax(
    State(state): State<AppState>,
    Json(payload): Json<CorporateTaxPayment>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state
        .ledger
        .transact(move |s| post_corporate_tax_payment(s, &payload))
        .await?;
    log_entry(&entry, "Corporate tax payment posted");
    Ok((StatusCode::CREATED, Json(entry)))
}
