//! Report generation service.
//!
//! Every report is a pure function of a committed [`LedgerState`]
//! snapshot. Only entries that count in reports are read: drafts and
//! carry-forward memos are skipped, reversed originals stay in and their
//! reversals cancel them out.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use folio_shared::types::{format_accounting, format_money};
use rust_decimal::Decimal;
use tracing::error;

use super::error::{ReportError, check_range};
use super::types::{
    AccountLedger, BalanceSheetReport, GeneralLedgerReport, LedgerLine, ProfitAndLossReport,
    ReportFilter, ReportSection, TrialBalanceReport, TrialBalanceRow, TrialBalanceTotals,
};
use crate::chart::AccountType;
use crate::chart::account::balance_is_abnormal;
use crate::ledger::{
    EntryType, JournalEntry, JournalLine, LedgerState, NormalBalance, RunningBalance,
};

/// Service for generating financial reports.
pub struct ReportService;

/// Debit and credit sums per account code.
pub(crate) type Movements = HashMap<String, (Decimal, Decimal)>;

/// Sums accepted lines dated in `[from, to]`; `from = None` means since inception.
pub(crate) fn movements(
    state: &LedgerState,
    from: Option<NaiveDate>,
    to: NaiveDate,
    filter: &ReportFilter,
    skip_closing: bool,
) -> Movements {
    let mut sums = Movements::new();
    for (entry, line) in state.posted_lines() {
        if entry.date > to || from.is_some_and(|f| entry.date < f) {
            continue;
        }
        if skip_closing && entry.entry_type == EntryType::Closing {
            continue;
        }
        if !filter.accepts_line(state, entry, line) {
            continue;
        }
        let slot = sums.entry(line.account_code.clone()).or_default();
        slot.0 += line.debit;
        slot.1 += line.credit;
    }
    sums
}

fn require_filter_account(state: &LedgerState, filter: &ReportFilter) -> Result<(), ReportError> {
    if let Some(code) = &filter.account_code {
        state.chart().require(code)?;
    }
    Ok(())
}

impl ReportService {
    /// Trial balance of every leaf account as of a date.
    ///
    /// Normal balances go to the account's natural column, which for a
    /// contra account is the opposite of its type. A balance on the wrong
    /// side moves to the other column and is flagged, except on cash
    /// accounts with an overdraft facility, which stay in the debit column
    /// as a negative figure.
    ///
    /// An account filter narrows the rows only; the totals always cover
    /// every leaf account so the debit and credit columns stay comparable.
    pub fn trial_balance(
        state: &LedgerState,
        as_of: NaiveDate,
        filter: &ReportFilter,
    ) -> Result<TrialBalanceReport, ReportError> {
        require_filter_account(state, filter)?;
        let totals_filter = ReportFilter {
            account_code: None,
            source_module: filter.source_module,
        };
        let sums = movements(state, None, as_of, &totals_filter, false);
        let mut rows = Vec::new();
        let mut total_debit = Decimal::ZERO;
        let mut total_credit = Decimal::ZERO;

        for account in state.chart().iter().filter(|a| a.is_leaf()) {
            let side = account.normal_balance();
            let (debit, credit) = sums.get(&account.code).copied().unwrap_or_default();
            let opening = if filter.includes_opening() {
                account.opening_balance
            } else {
                Decimal::ZERO
            };
            let balance = opening + side.balance_change(debit, credit);
            if balance.is_zero() && debit.is_zero() && credit.is_zero() {
                continue;
            }

            let is_abnormal = balance_is_abnormal(account, balance);
            let net = side.to_debit_positive(balance);
            let shown = account.display_balance(balance);
            let (debit_column, credit_column) = match (is_abnormal, account.display_side()) {
                (true, _) if net.is_sign_negative() => (Decimal::ZERO, -net),
                (true, _) => (net, Decimal::ZERO),
                (false, NormalBalance::Debit) => (shown, Decimal::ZERO),
                (false, NormalBalance::Credit) => (Decimal::ZERO, shown),
            };
            total_debit += debit_column;
            total_credit += credit_column;
            if !filter.accepts_account(&account.code) {
                continue;
            }
            rows.push(TrialBalanceRow {
                code: account.code.clone(),
                name: account.name.clone(),
                account_type: account.account_type,
                debit: debit_column,
                credit: credit_column,
                balance,
                is_abnormal,
                display: if is_abnormal {
                    format_money(balance.abs())
                } else {
                    format_accounting(shown)
                },
            });
        }

        Ok(TrialBalanceReport {
            as_of,
            currency: state.settings().base_currency.clone(),
            rows,
            totals: TrialBalanceTotals {
                total_debit,
                total_credit,
                is_balanced: total_debit == total_credit,
            },
        })
    }

    /// Per-account ledgers with running balances.
    ///
    /// Lines are ordered by date, then commit order, then line number.
    pub fn general_ledger(
        state: &LedgerState,
        from: NaiveDate,
        to: NaiveDate,
        filter: &ReportFilter,
    ) -> Result<GeneralLedgerReport, ReportError> {
        check_range(from, to)?;
        require_filter_account(state, filter)?;

        let mut by_account: BTreeMap<&str, Vec<(&JournalEntry, &JournalLine)>> = BTreeMap::new();
        for (entry, line) in state.posted_lines() {
            if entry.date <= to && filter.accepts_line(state, entry, line) {
                by_account.entry(line.account_code.as_str()).or_default().push((entry, line));
            }
        }

        let mut accounts = Vec::new();
        for account in state
            .chart()
            .iter()
            .filter(|a| a.is_leaf() && filter.accepts_account(&a.code))
        {
            let side = account.normal_balance();
            let mut lines = by_account.remove(account.code.as_str()).unwrap_or_default();
            lines.sort_by_key(|(entry, line)| (entry.date, entry.posting_sequence, line.line_number));

            let mut opening = if filter.includes_opening() {
                account.opening_balance
            } else {
                Decimal::ZERO
            };
            let mut running = None;
            let mut ledger_lines = Vec::new();
            let (mut total_debit, mut total_credit) = (Decimal::ZERO, Decimal::ZERO);
            for (entry, line) in lines {
                let change = side.balance_change(line.debit, line.credit);
                if entry.date < from {
                    opening += change;
                    continue;
                }
                let next = running
                    .get_or_insert_with(|| RunningBalance::opening(opening))
                    .next(change);
                running = Some(next);
                total_debit += line.debit;
                total_credit += line.credit;
                ledger_lines.push(LedgerLine {
                    date: entry.date,
                    entry_number: entry.entry_number.clone().unwrap_or_default(),
                    reference: entry.reference.clone(),
                    description: if line.description.is_empty() {
                        entry.description.clone()
                    } else {
                        line.description.clone()
                    },
                    source_module: entry.source_module,
                    debit: line.debit,
                    credit: line.credit,
                    balance: next.current_balance,
                });
            }
            if opening.is_zero() && ledger_lines.is_empty() {
                continue;
            }
            accounts.push(AccountLedger {
                code: account.code.clone(),
                name: account.name.clone(),
                opening_balance: opening,
                closing_balance: running.map_or(opening, |r| r.current_balance),
                lines: ledger_lines,
                total_debit,
                total_credit,
            });
        }

        Ok(GeneralLedgerReport {
            period_start: from,
            period_end: to,
            currency: state.settings().base_currency.clone(),
            accounts,
        })
    }

    /// Income less expenses over a range; closing entries are ignored.
    pub fn profit_and_loss(
        state: &LedgerState,
        from: NaiveDate,
        to: NaiveDate,
        filter: &ReportFilter,
    ) -> Result<ProfitAndLossReport, ReportError> {
        check_range(from, to)?;
        require_filter_account(state, filter)?;
        let sums = movements(state, Some(from), to, filter, true);
        let mut income = ReportSection::default();
        let mut expenses = ReportSection::default();

        for account in state.chart().iter().filter(|a| a.is_leaf()) {
            let Some(&(debit, credit)) = sums.get(&account.code) else {
                continue;
            };
            let amount = account.normal_balance().balance_change(debit, credit);
            match account.account_type {
                AccountType::Income => income.push(&account.code, &account.name, amount),
                AccountType::Expense => expenses.push(&account.code, &account.name, amount),
                _ => {}
            }
        }

        Ok(ProfitAndLossReport {
            period_start: from,
            period_end: to,
            currency: state.settings().base_currency.clone(),
            net_income: income.total - expenses.total,
            income,
            expenses,
        })
    }

    /// Balance sheet as of a date.
    ///
    /// Income and expense balances not yet closed to retained earnings are
    /// shown as current earnings inside equity.
    #[must_use]
    pub fn balance_sheet(state: &LedgerState, as_of: NaiveDate) -> BalanceSheetReport {
        let sums = movements(state, None, as_of, &ReportFilter::all(), false);
        let mut assets = ReportSection::default();
        let mut liabilities = ReportSection::default();
        let mut equity = ReportSection::default();
        let mut current_earnings = Decimal::ZERO;

        for account in state.chart().iter().filter(|a| a.is_leaf()) {
            let (debit, credit) = sums.get(&account.code).copied().unwrap_or_default();
            let balance =
                account.opening_balance + account.normal_balance().balance_change(debit, credit);
            if balance.is_zero() {
                continue;
            }
            match account.account_type {
                AccountType::Asset => assets.push(&account.code, &account.name, balance),
                AccountType::Liability => liabilities.push(&account.code, &account.name, balance),
                AccountType::Equity => equity.push(&account.code, &account.name, balance),
                AccountType::Income => current_earnings += balance,
                AccountType::Expense => current_earnings -= balance,
            }
        }

        let total_equity = equity.total + current_earnings;
        let liabilities_and_equity = liabilities.total + total_equity;
        BalanceSheetReport {
            as_of,
            currency: state.settings().base_currency.clone(),
            is_balanced: assets.total == liabilities_and_equity,
            assets,
            liabilities,
            equity,
            current_earnings,
            total_equity,
            liabilities_and_equity,
        }
    }
}

impl TrialBalanceReport {
    /// Fails with a consistency error when the columns differ.
    pub fn verify(&self) -> Result<(), ReportError> {
        if self.totals.is_balanced {
            return Ok(());
        }
        error!(
            as_of = %self.as_of,
            total_debit = %self.totals.total_debit,
            total_credit = %self.totals.total_credit,
            "trial balance out of balance"
        );
        Err(ReportError::TrialBalanceOutOfBalance {
            total_debit: self.totals.total_debit,
            total_credit: self.totals.total_credit,
        })
    }
}

