//! Report scenarios over a standard ledger.

use chrono::NaiveDate;
use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::assets::{DepreciationMethod, NewFixedAsset};
use crate::chart::NewAccount;
use crate::ledger::testing::{date, standard_ledger};
use crate::ledger::{
    LedgerState, PostingLine, PostingRequest, ReversalRequest, SourceModule, SubmitPosting,
};
use crate::producers::{
    BankTransfer, DocumentLine, PaymentInput, SalesInvoice, VendorBill,
    post_corporate_tax_provision, post_vat_settlement,
};
use crate::subledger::OpenItemKind;

fn manual(day: NaiveDate, debit: &str, credit: &str, amount: Decimal) -> PostingRequest {
    let mut request = PostingRequest::new(SourceModule::Manual, day, "MAN");
    request.lines = vec![
        PostingLine::account(debit, amount, Decimal::ZERO, ""),
        PostingLine::account(credit, Decimal::ZERO, amount, ""),
    ];
    request
}

fn document_line(amount: Decimal, vat_rate: Decimal) -> DocumentLine {
    DocumentLine {
        description: String::new(),
        amount,
        vat_rate,
        vat_inclusive: false,
        account: None,
    }
}

fn invoice(number: &str, day: NaiveDate, due: NaiveDate, net: Decimal) -> SalesInvoice {
    SalesInvoice {
        number: number.into(),
        customer: "ACME".into(),
        date: day,
        due_date: Some(due),
        lines: vec![document_line(net, dec!(5))],
        user: "sales".into(),
    }
}

fn receipt(day: NaiveDate, amount: Decimal) -> PaymentInput {
    PaymentInput {
        party: "ACME".into(),
        date: day,
        amount,
        reference: "R".into(),
        bank_account: None,
        allocations: Vec::new(),
        user: "cashier".into(),
    }
}

fn row<'a>(report: &'a TrialBalanceReport, code: &str) -> &'a TrialBalanceRow {
    report.rows.iter().find(|r| r.code == code).unwrap()
}

#[test]
fn test_trial_balance_after_sales_invoice() {
    let mut state = standard_ledger();
    let before = ReportService::trial_balance(&state, date(2026, 12, 31), &ReportFilter::all()).unwrap();
    assert!(before.totals.is_balanced);

    state
        .post_sales_invoice(&invoice("INV-1", date(2026, 3, 1), date(2026, 3, 31), dec!(1000)))
        .unwrap();
    let after = ReportService::trial_balance(&state, date(2026, 12, 31), &ReportFilter::all()).unwrap();
    after.verify().unwrap();
    assert_eq!(after.totals.total_debit, dec!(1050));
    assert_eq!(row(&after, "1200").debit, dec!(1050));
    assert_eq!(row(&after, "4000").credit, dec!(1000));
    assert_eq!(row(&after, "2100").credit, dec!(50));
}

#[test]
fn test_abnormal_and_overdraft_display() {
    let mut state = standard_ledger();
    // Bank overdrawn (overdraft allowed), cash overdrawn (not allowed).
    state.submit_posting(manual(date(2026, 1, 5), "5000", "1100", dec!(300))).unwrap();
    state.submit_posting(manual(date(2026, 1, 5), "5000", "1000", dec!(20))).unwrap();
    let report = ReportService::trial_balance(&state, date(2026, 1, 31), &ReportFilter::all()).unwrap();

    let bank = row(&report, "1100");
    assert!(!bank.is_abnormal);
    assert_eq!((bank.debit, bank.credit), (dec!(-300), Decimal::ZERO));
    assert_eq!(bank.display, "(300.00)");

    let cash = row(&report, "1000");
    assert!(cash.is_abnormal);
    assert_eq!((cash.debit, cash.credit), (Decimal::ZERO, dec!(20)));
    assert_eq!(cash.display, "20.00");
    assert!(report.totals.is_balanced);
}

#[test]
fn test_unbalanced_opening_balances_fail_verification() {
    let mut state = standard_ledger();
    state.set_opening_balance("1100", dec!(100)).unwrap();
    let report = ReportService::trial_balance(&state, date(2026, 1, 31), &ReportFilter::all()).unwrap();
    let error = report.verify().unwrap_err();
    assert_eq!(error.error_code(), "TRIAL_BALANCE_OUT_OF_BALANCE");
    assert_eq!(error.category(), crate::ledger::ErrorCategory::Consistency);

    state.set_opening_balance("3200", dec!(100)).unwrap();
    let report = ReportService::trial_balance(&state, date(2026, 1, 31), &ReportFilter::all()).unwrap();
    report.verify().unwrap();
}

#[test]
fn test_general_ledger_running_balance() {
    let mut state = standard_ledger();
    state.set_opening_balance("1100", dec!(1000)).unwrap();
    state.submit_posting(manual(date(2026, 1, 10), "1100", "4000", dec!(200))).unwrap();
    state.submit_posting(manual(date(2026, 2, 10), "5000", "1100", dec!(50))).unwrap();
    state.submit_posting(manual(date(2026, 2, 1), "1100", "4000", dec!(25))).unwrap();

    let report = ReportService::general_ledger(
        &state,
        date(2026, 2, 1),
        date(2026, 2, 28),
        &ReportFilter::account("1100"),
    )
    .unwrap();
    let bank = &report.accounts[0];
    assert_eq!(bank.opening_balance, dec!(1200));
    let balances: Vec<_> = bank.lines.iter().map(|l| l.balance).collect();
    assert_eq!(balances, [dec!(1225), dec!(1175)]);
    assert_eq!(bank.closing_balance, dec!(1175));
    assert_eq!(report.accounts.len(), 1);

    assert!(matches!(
        ReportService::general_ledger(&state, date(2026, 3, 1), date(2026, 2, 1), &ReportFilter::all()),
        Err(ReportError::InvalidDateRange { .. })
    ));
}

#[test]
fn test_profit_and_loss_and_balance_sheet() {
    let mut state = standard_ledger();
    state.set_opening_balance("1100", dec!(5000)).unwrap();
    state.set_opening_balance("3200", dec!(5000)).unwrap();
    state.submit_posting(manual(date(2026, 4, 1), "1100", "4000", dec!(3000))).unwrap();
    state.submit_posting(manual(date(2026, 4, 2), "5000", "1100", dec!(1200))).unwrap();

    let pnl = ReportService::profit_and_loss(&state, date(2026, 1, 1), date(2026, 12, 31), &ReportFilter::all())
        .unwrap();
    assert_eq!(pnl.income.total, dec!(3000));
    assert_eq!(pnl.expenses.total, dec!(1200));
    assert_eq!(pnl.net_income, dec!(1800));

    let sheet = ReportService::balance_sheet(&state, date(2026, 12, 31));
    assert_eq!(sheet.assets.total, dec!(6800));
    assert_eq!(sheet.current_earnings, dec!(1800));
    assert_eq!(sheet.total_equity, dec!(6800));
    assert!(sheet.is_balanced);
}

#[test]
fn test_balance_sheet_after_year_close() {
    let mut state = standard_ledger();
    state.set_opening_balance("1100", dec!(1000)).unwrap();
    state.set_opening_balance("3200", dec!(1000)).unwrap();
    state.submit_posting(manual(date(2026, 6, 1), "1100", "4000", dec!(700))).unwrap();
    let year = state.calendar().years().next().unwrap().id;
    let close = state.close_year(year, "controller").unwrap();

    let sheet = ReportService::balance_sheet(&state, date(2026, 12, 31));
    assert!(sheet.is_balanced);
    assert_eq!(sheet.current_earnings, Decimal::ZERO);
    assert!(sheet.equity.accounts.iter().any(|a| a.code == "3000" && a.amount == dec!(700)));

    // Closing entries do not distort the year's profit.
    let pnl = ReportService::profit_and_loss(&state, date(2026, 1, 1), date(2026, 12, 31), &ReportFilter::all())
        .unwrap();
    assert_eq!(pnl.net_income, dec!(700));

    // The opening memo entry changes nothing in the new year.
    let next = ReportService::balance_sheet(&state, date(2027, 1, 1));
    assert_eq!(next.assets.total, dec!(1700));
    assert!(close.opening_entry.is_some());
}

#[test]
fn test_cash_flow_reconciles_and_classifies() {
    let mut state = standard_ledger();
    state.set_opening_balance("1100", dec!(10000)).unwrap();
    state.set_opening_balance("3200", dec!(10000)).unwrap();
    state
        .post_sales_invoice(&invoice("INV-1", date(2026, 2, 1), date(2026, 2, 28), dec!(1000)))
        .unwrap();
    state.record_customer_receipt(&receipt(date(2026, 2, 10), dec!(1050))).unwrap();
    state
        .acquire_asset(
            NewFixedAsset {
                code: "FA-1".into(),
                name: "Van".into(),
                acquisition_date: date(2026, 2, 15),
                acquisition_cost: dec!(6000),
                salvage_value: Decimal::ZERO,
                useful_life_months: 60,
                method: DepreciationMethod::StraightLine,
            },
            Some("1100"),
            "fa",
        )
        .unwrap();
    state.depreciate_asset("FA-1", date(2026, 2, 28), "fa").unwrap();
    let mut loan = manual(date(2026, 2, 20), "1100", "3200", dec!(2000));
    loan.source_module = SourceModule::Financing;
    state.submit_posting(loan).unwrap();
    // Bank to petty cash: internal, nets to zero.
    state.submit_posting(manual(date(2026, 2, 21), "1000", "1100", dec!(300))).unwrap();

    let report =
        ReportService::cash_flow(&state, date(2026, 2, 1), date(2026, 2, 28), &ReportFilter::all()).unwrap();
    report.verify().unwrap();
    assert_eq!(report.opening_cash, dec!(10000));
    assert_eq!(report.operating.total, dec!(1050));
    assert_eq!(report.investing.total, dec!(-6000));
    assert_eq!(report.financing.total, dec!(2000));
    assert_eq!(report.closing_cash, dec!(7050));
    assert_eq!(
        report.operating.items.len() + report.investing.items.len() + report.financing.items.len(),
        3
    );

    assert!(matches!(
        ReportService::cash_flow(
            &state,
            date(2026, 2, 1),
            date(2026, 2, 28),
            &ReportFilter::source(SourceModule::Sales)
        ),
        Err(ReportError::InvalidParameter(_))
    ));
}

#[test]
fn test_cash_flow_classifies_reversal_by_original_source() {
    let mut state = standard_ledger();
    let mut loan = manual(date(2026, 3, 1), "1100", "3200", dec!(500));
    loan.source_module = SourceModule::Financing;
    let posted = state.submit_posting(loan).unwrap();
    state
        .reverse(posted.id, &ReversalRequest::new("duplicate", "controller"))
        .unwrap();
    let report =
        ReportService::cash_flow(&state, date(2026, 3, 1), date(2026, 3, 31), &ReportFilter::all()).unwrap();
    assert_eq!(report.financing.items.len(), 2);
    assert_eq!(report.financing.total, Decimal::ZERO);
    assert!(report.operating.items.is_empty());
}

#[rstest]
#[case(-5, AgingBucket::Current)]
#[case(0, AgingBucket::Current)]
#[case(1, AgingBucket::Days1To30)]
#[case(30, AgingBucket::Days1To30)]
#[case(31, AgingBucket::Days31To60)]
#[case(60, AgingBucket::Days31To60)]
#[case(61, AgingBucket::Days61To90)]
#[case(90, AgingBucket::Days61To90)]
#[case(91, AgingBucket::Over90)]
fn test_aging_buckets(#[case] days: i64, #[case] expected: AgingBucket) {
    assert_eq!(AgingBucket::for_days(days), expected);
}

#[test]
fn test_receivable_aging_matches_control_account() {
    let mut state = standard_ledger();
    state
        .post_sales_invoice(&invoice("INV-1", date(2026, 1, 1), date(2026, 1, 31), dec!(1000)))
        .unwrap();
    state
        .post_sales_invoice(&invoice("INV-2", date(2026, 4, 1), date(2026, 4, 30), dec!(200)))
        .unwrap();
    state.record_customer_receipt(&receipt(date(2026, 5, 10), dec!(500))).unwrap();

    let report = ReportService::aging(&state, OpenItemKind::Receivable, date(2026, 5, 15)).unwrap();
    assert!(report.is_consistent);
    assert_eq!(report.control_account, "1200");
    assert_eq!(report.totals.total, dec!(760));
    assert_eq!(report.totals.over_90, dec!(550));
    assert_eq!(report.totals.days_1_30, dec!(210));
    assert_eq!(report.parties.len(), 1);

    // Before the receipt the whole first invoice is outstanding.
    let earlier = ReportService::aging(&state, OpenItemKind::Receivable, date(2026, 4, 30)).unwrap();
    assert_eq!(earlier.totals.total, dec!(1260));
    assert!(earlier.is_consistent);
}

#[test]
fn test_vat_return_and_settlement() {
    let mut state = standard_ledger();
    state
        .post_sales_invoice(&invoice("INV-1", date(2026, 1, 10), date(2026, 2, 10), dec!(1000)))
        .unwrap();
    state
        .post_vendor_bill(&VendorBill {
            number: "B-1".into(),
            vendor: "Supplier".into(),
            date: date(2026, 1, 12),
            due_date: None,
            lines: vec![document_line(dec!(400), dec!(5))],
            user: "ap".into(),
        })
        .unwrap();
    let cancelled = invoice("INV-2", date(2026, 2, 1), date(2026, 3, 1), dec!(100));
    state.post_sales_invoice(&cancelled).unwrap();
    state
        .cancel_sales_invoice("INV-2", &ReversalRequest::new("error", "sales"))
        .unwrap();

    let vat = ReportService::vat_return(&state, date(2026, 1, 1), date(2026, 3, 31), Decimal::ZERO).unwrap();
    assert_eq!(vat.output_vat, dec!(50));
    assert_eq!(vat.input_vat, dec!(20));
    assert_eq!(vat.taxable_sales, dec!(1000));
    assert_eq!(vat.taxable_purchases, dec!(400));
    assert_eq!(vat.net_vat, dec!(30));
    assert_eq!(vat.position, VatPosition::Payable);

    post_vat_settlement(&mut state, &vat.settlement("VAT-Q1", "tax")).unwrap();
    assert_eq!(state.chart().get("2100").unwrap().current_balance, Decimal::ZERO);
    assert_eq!(state.chart().get("1300").unwrap().current_balance, Decimal::ZERO);
    assert_eq!(state.chart().get("2110").unwrap().current_balance, dec!(30));
}

fn tax_ledger(revenue: Decimal, expenses: Decimal) -> LedgerState {
    let mut state = standard_ledger();
    state.submit_posting(manual(date(2026, 3, 1), "1100", "4000", revenue)).unwrap();
    state.submit_posting(manual(date(2026, 3, 2), "5000", "1100", expenses)).unwrap();
    state
}

#[test]
fn test_corporate_tax_at_threshold_is_zero() {
    let state = tax_ledger(dec!(600000), dec!(225000));
    let year = state.calendar().years().next().unwrap().id;
    let tax = ReportService::corporate_tax_for_year(&state, year, Decimal::ZERO, Decimal::ZERO).unwrap();
    assert_eq!(tax.accounting_profit, dec!(375000));
    assert_eq!(tax.taxable_income, dec!(375000));
    assert_eq!(tax.tax_payable, Decimal::ZERO);
    assert!(tax.provision("CT-FY2026", "tax").is_none());
}

#[test]
fn test_corporate_tax_above_threshold() {
    let mut state = tax_ledger(dec!(700000), dec!(200000));
    let tax = ReportService::corporate_tax(
        &state,
        date(2026, 1, 1),
        date(2026, 12, 31),
        Decimal::ZERO,
        Decimal::ZERO,
    )
    .unwrap();
    assert_eq!(tax.taxable_income, dec!(500000));
    assert_eq!(tax.tax_payable, dec!(11250.00));

    let provision = tax.provision("CT-FY2026", "tax").unwrap();
    post_corporate_tax_provision(&mut state, &provision).unwrap();
    // The provision does not feed back into its own base.
    let again = ReportService::corporate_tax(
        &state,
        date(2026, 1, 1),
        date(2026, 12, 31),
        Decimal::ZERO,
        Decimal::ZERO,
    )
    .unwrap();
    assert_eq!(again.tax_payable, dec!(11250.00));
}

#[test]
fn test_corporate_tax_adjustments() {
    let state = tax_ledger(dec!(400000), dec!(50000));
    let tax = ReportService::corporate_tax(
        &state,
        date(2026, 1, 1),
        date(2026, 12, 31),
        dec!(25000),
        dec!(10000),
    )
    .unwrap();
    assert_eq!(tax.taxable_income, dec!(365000));
    assert_eq!(tax.tax_payable, Decimal::ZERO);
    assert!(matches!(
        ReportService::corporate_tax(&state, date(2026, 1, 1), date(2026, 12, 31), dec!(-1), Decimal::ZERO),
        Err(ReportError::InvalidParameter(_))
    ));
}

#[test]
fn test_source_filter_drops_openings() {
    let mut state = standard_ledger();
    state
        .create_account(NewAccount::new("1110", "Savings", crate::chart::AccountType::Asset).with_parent("100"))
        .unwrap();
    state.set_opening_balance("1110", dec!(900)).unwrap();
    state
        .post_sales_invoice(&invoice("INV-1", date(2026, 1, 10), date(2026, 2, 10), dec!(100)))
        .unwrap();
    let report =
        ReportService::trial_balance(&state, date(2026, 12, 31), &ReportFilter::source(SourceModule::Sales))
            .unwrap();
    assert!(report.rows.iter().all(|r| r.code != "1110"));
    assert!(report.totals.is_balanced);
}

#[test]
fn test_account_filter_narrows_rows_but_keeps_totals() {
    let mut state = standard_ledger();
    state.submit_posting(manual(date(2026, 2, 3), "1100", "4000", dec!(200))).unwrap();
    let report =
        ReportService::trial_balance(&state, date(2026, 12, 31), &ReportFilter::account("1100")).unwrap();

    assert_eq!(report.rows.len(), 1);
    assert_eq!(row(&report, "1100").debit, dec!(200));
    assert_eq!(report.totals.total_debit, dec!(200));
    assert_eq!(report.totals.total_credit, dec!(200));
    report.verify().unwrap();
}

#[test]
fn test_accumulated_depreciation_sits_in_credit_column() {
    let mut state = standard_ledger();
    state
        .acquire_asset(
            NewFixedAsset {
                code: "FA-9".into(),
                name: "Forklift".into(),
                acquisition_date: date(2026, 1, 10),
                acquisition_cost: dec!(12000),
                salvage_value: Decimal::ZERO,
                useful_life_months: 12,
                method: DepreciationMethod::StraightLine,
            },
            Some("1100"),
            "fa",
        )
        .unwrap();
    state.depreciate_asset("FA-9", date(2026, 1, 31), "fa").unwrap();
    let report = ReportService::trial_balance(&state, date(2026, 1, 31), &ReportFilter::all()).unwrap();

    let accumulated = row(&report, "1401");
    assert!(!accumulated.is_abnormal);
    assert_eq!((accumulated.debit, accumulated.credit), (Decimal::ZERO, dec!(1000)));
    assert_eq!(accumulated.balance, dec!(-1000));
    assert_eq!(accumulated.display, "1000.00");
    assert!(!state.chart().get("1401").unwrap().has_abnormal_balance());
    report.verify().unwrap();

    let sheet = ReportService::balance_sheet(&state, date(2026, 1, 31));
    assert!(sheet.is_balanced);
    assert_eq!(sheet.assets.total, dec!(-1000));
}

#[test]
fn test_fixed_deposit_placement_leaves_cash() {
    let mut state = standard_ledger();
    state.set_opening_balance("1100", dec!(10000)).unwrap();
    state.set_opening_balance("3200", dec!(10000)).unwrap();
    state
        .post_bank_transfer(&BankTransfer {
            reference: "FD-1".into(),
            date: date(2026, 3, 1),
            from_account: "1100".into(),
            to_account: "1150".into(),
            amount: dec!(4000),
            description: "Three-month deposit".into(),
            user: "treasury".into(),
        })
        .unwrap();

    let report =
        ReportService::cash_flow(&state, date(2026, 3, 1), date(2026, 3, 31), &ReportFilter::all()).unwrap();
    report.verify().unwrap();
    assert_eq!(report.opening_cash, dec!(10000));
    assert_eq!(report.investing.total, dec!(-4000));
    assert_eq!(report.closing_cash, dec!(6000));
    assert!(matches!(
        ReportService::cash_flow(
            &state,
            date(2026, 3, 1),
            date(2026, 3, 31),
            &ReportFilter::account("1150")
        ),
        Err(ReportError::InvalidParameter(_))
    ));
}
