//! End-to-end tests of the HTTP surface against an in-memory ledger.

use std::str::FromStr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::NaiveDate;
use folio_api::{AppState, create_router};
use folio_core::chart::STANDARD_CHART;
use folio_core::ledger::{Ledger, LedgerState};
use folio_shared::LedgerConfig;
use http_body_util::BodyExt;
use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use tower::ServiceExt;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn test_state() -> AppState {
    let mut ledger = LedgerState::new(LedgerConfig::default());
    for account in STANDARD_CHART {
        ledger.create_account(account.to_new_account()).unwrap();
    }
    ledger
        .create_fiscal_year("FY2026", date(2026, 1, 1), date(2026, 12, 31))
        .unwrap();
    AppState::new(Arc::new(Ledger::new(ledger)))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn amount(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().unwrap()).unwrap()
}

fn cash_sale(amount: &str) -> Value {
    json!({
        "source_module": "manual",
        "date": "2026-03-10",
        "reference": "CS-1",
        "user": "alice",
        "lines": [
            { "target": { "account": "1100" }, "debit": amount },
            { "target": { "account": "4000" }, "credit": amount }
        ]
    })
}

#[tokio::test]
async fn test_health_check() {
    let app = create_router(test_state());
    let (status, body) = send(&app, "GET", "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["ledger_version"], 0);
}

#[tokio::test]
async fn test_submit_posting_numbers_entry_and_updates_trial_balance() {
    let app = create_router(test_state());
    let (status, entry) = send(&app, "POST", "/api/v1/journal/postings", Some(cash_sale("250.00"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(entry["entry_number"], "JV-2026-0001");
    assert_eq!(entry["status"], "posted");

    let (status, tb) = send(
        &app,
        "GET",
        "/api/v1/reports/trial-balance?as_of=2026-12-31",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tb["totals"]["is_balanced"], true);
    assert_eq!(amount(&tb["totals"]["total_debit"]), dec!(250));

    let id = entry["id"].as_str().unwrap();
    let (status, fetched) = send(&app, "GET", &format!("/api/v1/journal/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["entry_number"], "JV-2026-0001");
}

#[tokio::test]
async fn test_trial_balance_filtered_by_account() {
    let app = create_router(test_state());
    send(&app, "POST", "/api/v1/journal/postings", Some(cash_sale("200.00"))).await;
    let (status, tb) = send(
        &app,
        "GET",
        "/api/v1/reports/trial-balance?as_of=2026-12-31&account=1100",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tb["rows"].as_array().unwrap().len(), 1);
    assert_eq!(tb["totals"]["is_balanced"], true);
}

#[rstest]
#[case(
    json!([
        { "target": { "account": "1100" }, "debit": "10.00" },
        { "target": { "account": "4000" }, "credit": "9.00" }
    ]),
    StatusCode::BAD_REQUEST,
    "UNBALANCED"
)]
#[case(
    json!([
        { "target": { "account": "100" }, "debit": "10.00" },
        { "target": { "account": "4000" }, "credit": "10.00" }
    ]),
    StatusCode::BAD_REQUEST,
    "NON_LEAF_POSTING"
)]
#[case(
    json!([{ "target": { "account": "1100" }, "debit": "10.00" }]),
    StatusCode::BAD_REQUEST,
    "INSUFFICIENT_LINES"
)]
#[tokio::test]
async fn test_rejected_postings(
    #[case] lines: Value,
    #[case] expected_status: StatusCode,
    #[case] code: &str,
) {
    let app = create_router(test_state());
    let request = json!({
        "source_module": "manual",
        "date": "2026-03-10",
        "lines": lines
    });
    let (status, body) = send(&app, "POST", "/api/v1/journal/postings", Some(request)).await;
    assert_eq!(status, expected_status);
    assert_eq!(body["error"]["code"], code);

    let (_, health) = send(&app, "GET", "/api/v1/health", None).await;
    assert_eq!(health["ledger_version"], 0);
}

#[tokio::test]
async fn test_locked_period_rejects_posting() {
    let app = create_router(test_state());
    let (_, years) = send(&app, "GET", "/api/v1/fiscal-years", None).await;
    let march = years["fiscal_years"][0]["periods"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["start_date"] == "2026-03-01")
        .unwrap();
    let period_id = march["id"].as_str().unwrap();

    let (status, period) = send(
        &app,
        "POST",
        &format!("/api/v1/fiscal-periods/{period_id}/lock"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(period["status"], "locked");

    let (status, body) = send(&app, "POST", "/api/v1/journal/postings", Some(cash_sale("5.00"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "PERIOD_LOCKED");

    send(
        &app,
        "POST",
        &format!("/api/v1/fiscal-periods/{period_id}/unlock"),
        None,
    )
    .await;
    let (status, _) = send(&app, "POST", "/api/v1/journal/postings", Some(cash_sale("5.00"))).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_reversal_neutralizes_balance() {
    let app = create_router(test_state());
    let (_, entry) = send(&app, "POST", "/api/v1/journal/postings", Some(cash_sale("80.00"))).await;
    let id = entry["id"].as_str().unwrap();

    let (status, reversal) = send(
        &app,
        "POST",
        &format!("/api/v1/journal/{id}/reverse"),
        Some(json!({ "reason": "duplicate", "user": "bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(reversal["reversal_of"], id);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/journal/{id}/reverse"),
        Some(json!({ "reason": "again", "user": "bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "NOT_REVERSIBLE");

    let (_, account) = send(&app, "GET", "/api/v1/accounts/1100", None).await;
    assert_eq!(amount(&account["current_balance"]), Decimal::ZERO);
}

#[tokio::test]
async fn test_sales_invoice_flow() {
    let app = create_router(test_state());
    let invoice = json!({
        "number": "INV-1",
        "customer": "ACME",
        "date": "2026-03-01",
        "due_date": "2026-03-31",
        "lines": [{ "description": "consulting", "amount": "1000.00", "vat_rate": "5" }]
    });
    let (status, posted) = send(&app, "POST", "/api/v1/sales-invoices", Some(invoice)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(amount(&posted["entry"]["total_debit"]), dec!(1050));

    let (status, aging) = send(
        &app,
        "GET",
        "/api/v1/reports/aging?kind=receivable&as_of=2026-05-15",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(amount(&aging["totals"]["total"]), dec!(1050));
    assert_eq!(aging["is_consistent"], true);

    let (status, vat) = send(
        &app,
        "GET",
        "/api/v1/reports/vat-return?from=2026-01-01&to=2026-03-31",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(amount(&vat["output_vat"]), dec!(50));

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/sales-invoices/INV-1/cancel",
        Some(json!({ "reason": "wrong customer", "user": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, items) = send(&app, "GET", "/api/v1/open-items?kind=receivable", None).await;
    assert_eq!(items["open_items"][0]["status"], "cancelled");
}

#[tokio::test]
async fn test_post_dated_cheque_lifecycle() {
    let app = create_router(test_state());
    let invoice = json!({
        "number": "INV-9",
        "customer": "Tenant A",
        "date": "2026-03-01",
        "due_date": "2026-03-31",
        "lines": [{ "description": "rent", "amount": "1000.00", "vat_rate": "5" }]
    });
    send(&app, "POST", "/api/v1/sales-invoices", Some(invoice)).await;

    let deposit = json!({
        "cheque_number": "100231",
        "party": "Tenant A",
        "cheque_date": "2026-04-15",
        "deposit_date": "2026-03-20",
        "amount": "1050.00"
    });
    let (status, posted) = send(&app, "POST", "/api/v1/pdc-cheques", Some(deposit.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(posted["cheque"]["status"], "deposited");
    let (status, body) = send(&app, "POST", "/api/v1/pdc-cheques", Some(deposit)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "DUPLICATE_DOCUMENT");

    let early = json!({ "date": "2026-04-01", "bank_account": "1000" });
    let (status, _) = send(&app, "POST", "/api/v1/pdc-cheques/100231/clear", Some(early)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let clearance = json!({ "date": "2026-04-15", "bank_account": "1000" });
    let (status, cleared) =
        send(&app, "POST", "/api/v1/pdc-cheques/100231/clear", Some(clearance.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cleared["cheque"]["bank_account_code"], "1000");
    let (status, body) =
        send(&app, "POST", "/api/v1/pdc-cheques/100231/clear", Some(clearance)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "INVALID_STATUS_TRANSITION");

    let (_, bank) = send(&app, "GET", "/api/v1/accounts/1000", None).await;
    assert_eq!(amount(&bank["current_balance"]), dec!(1050));
    let (_, held) = send(&app, "GET", "/api/v1/pdc-cheques?status=deposited", None).await;
    assert_eq!(held["cheques"].as_array().unwrap().len(), 0);

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/pdc-cheques/999/bounce",
        Some(json!({ "date": "2026-04-20", "reason": "insufficient funds" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "CHEQUE_NOT_FOUND");
}

#[tokio::test]
async fn test_bank_transfer_and_expense_claim() {
    let app = create_router(test_state());
    send(&app, "POST", "/api/v1/journal/postings", Some(cash_sale("500.00"))).await;

    let transfer = json!({
        "reference": "TRF-1",
        "date": "2026-03-11",
        "from_account": "1100",
        "to_account": "1000",
        "amount": "200.00"
    });
    let (status, entry) = send(&app, "POST", "/api/v1/bank-transfers", Some(transfer)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(entry["source_module"], "bank_transfer");

    let claim = json!({
        "number": "EC-1",
        "employee": "E7",
        "date": "2026-03-12",
        "has_receipt": true,
        "lines": [{ "description": "Taxi", "amount": "100.00", "vat_amount": "5.00" }]
    });
    let (status, entry) = send(&app, "POST", "/api/v1/expense-claims", Some(claim)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(amount(&entry["total_credit"]), dec!(105));

    let payment = json!({
        "reference": "RMB-1",
        "employee": "E7",
        "date": "2026-03-13",
        "amount": "105.00",
        "bank_account": "1000"
    });
    let (status, _) =
        send(&app, "POST", "/api/v1/expense-claims/reimbursements", Some(payment)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, payable) = send(&app, "GET", "/api/v1/accounts/2210", None).await;
    assert_eq!(amount(&payable["current_balance"]), Decimal::ZERO);
    let (_, bank) = send(&app, "GET", "/api/v1/accounts/1000", None).await;
    assert_eq!(amount(&bank["current_balance"]), dec!(95));
}

#[tokio::test]
async fn test_reports_follow_new_commits() {
    let app = create_router(test_state());
    send(&app, "POST", "/api/v1/journal/postings", Some(cash_sale("100.00"))).await;
    let uri = "/api/v1/reports/profit-and-loss?from=2026-01-01&to=2026-12-31";
    let (_, first) = send(&app, "GET", uri, None).await;
    let (_, cached) = send(&app, "GET", uri, None).await;
    assert_eq!(first, cached);

    send(&app, "POST", "/api/v1/journal/postings", Some(cash_sale("40.00"))).await;
    let (_, second) = send(&app, "GET", uri, None).await;
    assert_eq!(amount(&first["net_income"]), dec!(100));
    assert_eq!(amount(&second["net_income"]), dec!(140));
}

#[tokio::test]
async fn test_cash_flow_rejects_source_filter() {
    let app = create_router(test_state());
    let (status, body) = send(
        &app,
        "GET",
        "/api/v1/reports/cash-flow?from=2026-01-01&to=2026-12-31&source=sales",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_PARAMETER");
}

#[tokio::test]
async fn test_mapping_overrides_resolution() {
    let app = create_router(test_state());
    let (status, _) = send(
        &app,
        "PUT",
        "/api/v1/mappings/bank_charges",
        Some(json!({ "account_code": "5000" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, mappings) = send(&app, "GET", "/api/v1/mappings", None).await;
    let row = mappings["mappings"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["transaction_type"] == "bank_charges")
        .unwrap();
    assert_eq!(row["mapped_account"], "5000");
    assert_eq!(row["fallback_code"], "7000");

    let (status, _) = send(&app, "DELETE", "/api/v1/mappings/bank_charges", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = send(&app, "DELETE", "/api/v1/mappings/bank_charges", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_unknown_entry_is_not_found() {
    let app = create_router(test_state());
    let (status, body) = send(
        &app,
        "GET",
        "/api/v1/journal/0190a5b4-0000-7000-8000-000000000000",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "ENTRY_NOT_FOUND");
}
