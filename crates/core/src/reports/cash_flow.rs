//! Direct-method cash flow.
//!
//! Only lines on cash accounts move cash. Non-cash entries (depreciation,
//! provisions, PDC deposits into PDC control) never touch one, and a
//! transfer between two cash accounts nets to zero, so neither shows up.
//! Fixed deposits are not cash here: money placed on deposit leaves cash.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::error;

use super::error::{ReportError, check_range};
use super::service::ReportService;
use super::types::{CashFlowCategory, CashFlowItem, CashFlowReport, CashFlowSection, ReportFilter};
use crate::ledger::LedgerState;

impl ReportService {
    /// Cash flow over a range, classified by the entries' source module.
    ///
    /// `filter.account_code` narrows the cash accounts; a source filter is
    /// rejected because it would break the reconciliation.
    pub fn cash_flow(
        state: &LedgerState,
        from: NaiveDate,
        to: NaiveDate,
        filter: &ReportFilter,
    ) -> Result<CashFlowReport, ReportError> {
        check_range(from, to)?;
        if filter.source_module.is_some() {
            return Err(ReportError::InvalidParameter(
                "cash flow cannot be filtered by source module",
            ));
        }
        if let Some(code) = &filter.account_code {
            if !state.chart().require(code)?.counts_as_cash() {
                return Err(ReportError::InvalidParameter("account is not a cash account"));
            }
        }
        let cash: BTreeSet<&str> = state
            .chart()
            .iter()
            .filter(|a| a.is_leaf() && a.counts_as_cash() && filter.accepts_account(&a.code))
            .map(|a| a.code.as_str())
            .collect();

        let mut opening_cash: Decimal = state
            .chart()
            .iter()
            .filter(|a| cash.contains(a.code.as_str()))
            .map(|a| a.opening_balance)
            .sum();
        let mut items = Vec::new();

        for entry in state.journal().iter().filter(|e| e.counts_in_reports() && e.date <= to) {
            let net: Decimal = entry
                .lines
                .iter()
                .filter(|l| cash.contains(l.account_code.as_str()))
                .map(|l| l.net())
                .sum();
            if entry.date < from {
                opening_cash += net;
                continue;
            }
            if net.is_zero() {
                continue;
            }
            items.push((
                entry.posting_sequence,
                CashFlowItem {
                    date: entry.date,
                    entry_number: entry.entry_number.clone().unwrap_or_default(),
                    description: entry.description.clone(),
                    source_module: state.effective_source(entry),
                    amount: net,
                },
            ));
        }
        items.sort_by_key(|(sequence, item)| (item.date, *sequence));

        let mut operating = CashFlowSection::default();
        let mut investing = CashFlowSection::default();
        let mut financing = CashFlowSection::default();
        for (_, item) in items {
            let section = match CashFlowCategory::of(item.source_module) {
                CashFlowCategory::Operating => &mut operating,
                CashFlowCategory::Investing => &mut investing,
                CashFlowCategory::Financing => &mut financing,
            };
            section.total += item.amount;
            section.items.push(item);
        }

        let net_change = operating.total + investing.total + financing.total;
        let mut closing_cash = Decimal::ZERO;
        for code in &cash {
            closing_cash += state.balance_as_of(code, to)?;
        }
        Ok(CashFlowReport {
            period_start: from,
            period_end: to,
            currency: state.settings().base_currency.clone(),
            cash_accounts: cash.iter().map(|c| (*c).to_string()).collect(),
            opening_cash,
            operating,
            investing,
            financing,
            net_change,
            closing_cash,
            is_reconciled: opening_cash + net_change == closing_cash,
        })
    }
}

impl CashFlowReport {
    /// Fails with a consistency error when the statement does not reconcile.
    pub fn verify(&self) -> Result<(), ReportError> {
        if self.is_reconciled {
            return Ok(());
        }
        let expected = self.opening_cash + self.net_change;
        error!(
            period_start = %self.period_start,
            period_end = %self.period_end,
            expected = %expected,
            actual = %self.closing_cash,
            "cash flow does not reconcile"
        );
        Err(ReportError::CashFlowNotReconciled {
            expected,
            actual: self.closing_cash,
        })
    }
}
