//! Year-end close.
//!
//! `Open -> Closing -> Closed`:
//! 1. income and expense leaves are zeroed into retained earnings by a
//!    closing entry dated the last day of the year
//! 2. every period of the year and the year itself are closed
//! 3. the next year is created when missing
//! 4. balance sheet balances are carried forward as an opening entry on the
//!    first day of the next year
//!
//! Balances are cumulative, so the opening entry is a `carry_forward` memo:
//! it is numbered and posted but does not touch account balances again.

use folio_shared::types::{EntryId, FiscalYearId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;
use super::state::LedgerState;
use super::types::{EntryType, PostingLine, PostingRequest, SourceModule};
use crate::determination::TransactionType;

/// Outcome of a year-end close.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearEndClose {
    /// Closed year.
    pub fiscal_year_id: FiscalYearId,
    /// Year receiving the carried-forward balances.
    pub next_fiscal_year_id: FiscalYearId,
    /// Net profit (positive) or loss (negative) moved to retained earnings.
    pub net_income: Decimal,
    /// Closing entry, absent when no income or expense account had a balance.
    pub closing_entry: Option<EntryId>,
    /// Carry-forward opening entry, absent when every balance is zero.
    pub opening_entry: Option<EntryId>,
}

impl LedgerState {
    /// Closes a fiscal year.
    pub fn close_year(&mut self, id: FiscalYearId, user: &str) -> Result<YearEndClose, LedgerError> {
        self.calendar.begin_close(id)?;
        self.changes.fiscal_years.insert(id);
        let year = self.calendar.require_year(id)?.clone();

        // 1. closing entry
        let mut closing = PostingRequest::new(
            SourceModule::YearEnd,
            year.end_date,
            format!("CLOSE-{}", year.name),
        )
        .with_description(format!("Year-end closing {}", year.name))
        .with_entry_type(EntryType::Closing)
        .by(user);
        let mut net_income = Decimal::ZERO;
        for account in self.chart.iter().filter(|a| a.is_leaf()) {
            if account.account_type.is_balance_sheet() {
                continue;
            }
            let balance = self.balance_as_of(&account.code, year.end_date)?;
            if balance.is_zero() {
                continue;
            }
            // Post the opposite of the balance to bring it to zero.
            let net = account.normal_balance().to_debit_positive(balance);
            net_income -= net;
            closing = closing.line(side_line(&account.code, -net, "Close to retained earnings"));
        }
        if !net_income.is_zero() {
            let retained = self.resolve(TransactionType::RetainedEarnings, None)?;
            closing = closing.line(side_line(&retained, -net_income, "Net result for the year"));
        }
        let closing_entry = if closing.lines.len() >= 2 {
            Some(self.submit_with(closing, None, false)?.id)
        } else {
            None
        };

        // 2. lock the year
        let periods = self.calendar.finish_close(id)?;
        self.changes.periods.extend(periods);

        // 3. next year
        let (next_id, created) = self.calendar.ensure_next_year(id)?;
        if created {
            self.record_year(next_id);
        }
        let next = self.calendar.require_year(next_id)?.clone();

        // 4. carry forward
        let mut opening = PostingRequest::new(
            SourceModule::OpeningBalance,
            next.start_date,
            format!("OPEN-{}", next.name),
        )
        .with_description(format!("Opening balances carried forward from {}", year.name))
        .with_entry_type(EntryType::Opening)
        .by(user);
        let mut residual = Decimal::ZERO;
        for account in self.chart.iter().filter(|a| a.is_leaf()) {
            if !account.account_type.is_balance_sheet() {
                continue;
            }
            let balance = self.balance_as_of(&account.code, year.end_date)?;
            let net = account.normal_balance().to_debit_positive(balance);
            residual += net;
            opening = opening.line(side_line(&account.code, net, "Balance brought forward"));
        }
        if !residual.is_zero() {
            let equity = self.resolve(TransactionType::OpeningBalanceEquity, None)?;
            opening = opening.line(side_line(&equity, -residual, "Unbalanced opening difference"));
        }
        let opening_entry = if opening.lines.len() >= 2 {
            Some(self.submit_with(opening, None, true)?.id)
        } else {
            None
        };

        Ok(YearEndClose {
            fiscal_year_id: id,
            next_fiscal_year_id: next_id,
            net_income,
            closing_entry,
            opening_entry,
        })
    }
}

/// A line carrying a debit-positive amount on the right side.
fn side_line(code: &str, debit_positive: Decimal, description: &str) -> PostingLine {
    if debit_positive >= Decimal::ZERO {
        PostingLine::account(code, debit_positive, Decimal::ZERO, description)
    } else {
        PostingLine::account(code, Decimal::ZERO, -debit_positive, description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fiscal::{FiscalYearStatus, PeriodStatus};
    use crate::ledger::SubmitPosting;
    use crate::ledger::testing::{date, standard_ledger};
    use crate::ledger::types::EntryStatus;
    use rust_decimal_macros::dec;

    fn post(state: &mut LedgerState, day: u32, debit: &str, credit: &str, amount: Decimal) {
        let mut request = PostingRequest::new(SourceModule::Manual, date(2026, 6, day), "T");
        request.lines = vec![
            PostingLine::account(debit, amount, Decimal::ZERO, ""),
            PostingLine::account(credit, Decimal::ZERO, amount, ""),
        ];
        state.submit_posting(request).unwrap();
    }

    fn fy2026(state: &LedgerState) -> FiscalYearId {
        state.calendar().year_for(date(2026, 6, 1)).unwrap().id
    }

    #[test]
    fn test_close_year_moves_profit_to_retained_earnings() {
        let mut state = standard_ledger();
        state.set_opening_balance("1100", dec!(5000)).unwrap();
        state.set_opening_balance("3200", dec!(5000)).unwrap();
        post(&mut state, 1, "1100", "4000", dec!(8000));
        post(&mut state, 2, "5000", "1100", dec!(3000));

        let id = fy2026(&state);
        let result = state.close_year(id, "controller").unwrap();
        assert_eq!(result.net_income, dec!(5000));

        let closing = state.entry(result.closing_entry.unwrap()).unwrap();
        assert_eq!(closing.entry_type, EntryType::Closing);
        assert_eq!(closing.source_module, SourceModule::YearEnd);
        assert_eq!(closing.date, date(2026, 12, 31));
        assert!(closing.is_system_generated);

        assert_eq!(state.chart().get("4000").unwrap().current_balance, Decimal::ZERO);
        assert_eq!(state.chart().get("5000").unwrap().current_balance, Decimal::ZERO);
        assert_eq!(state.chart().get("3000").unwrap().current_balance, dec!(5000));

        let year = state.calendar().year(id).unwrap();
        assert_eq!(year.status, FiscalYearStatus::Closed);
        assert!(state.calendar().periods_of(id).all(|p| p.status == PeriodStatus::Closed));
    }

    #[test]
    fn test_carry_forward_does_not_double_balances() {
        let mut state = standard_ledger();
        state.set_opening_balance("1100", dec!(5000)).unwrap();
        state.set_opening_balance("3200", dec!(5000)).unwrap();
        post(&mut state, 1, "1100", "4000", dec!(8000));

        let result = state.close_year(fy2026(&state), "controller").unwrap();
        let opening = state.entry(result.opening_entry.unwrap()).unwrap();
        assert!(opening.carry_forward);
        assert_eq!(opening.status, EntryStatus::Posted);
        assert_eq!(opening.entry_type, EntryType::Opening);
        assert_eq!(opening.date, date(2027, 1, 1));
        assert_eq!(opening.entry_number.as_deref(), Some("JV-2027-0001"));
        assert_eq!(opening.total_debit, dec!(13000));

        assert_eq!(state.chart().get("1100").unwrap().current_balance, dec!(13000));
        assert_eq!(state.balance_as_of("1100", date(2027, 1, 1)), Ok(dec!(13000)));

        let next = state.calendar().year(result.next_fiscal_year_id).unwrap();
        assert_eq!(next.status, FiscalYearStatus::Open);
    }

    #[test]
    fn test_posting_into_closed_year_rejected() {
        let mut state = standard_ledger();
        post(&mut state, 1, "1100", "4000", dec!(10));
        state.close_year(fy2026(&state), "controller").unwrap();

        let mut request = PostingRequest::new(SourceModule::Manual, date(2026, 7, 1), "LATE");
        request.lines = vec![
            PostingLine::account("1100", dec!(1), Decimal::ZERO, ""),
            PostingLine::account("4000", Decimal::ZERO, dec!(1), ""),
        ];
        assert_eq!(
            state.submit_posting(request),
            Err(LedgerError::FiscalYearClosed("FY2026".into()))
        );
    }

    #[test]
    fn test_close_requires_open_year() {
        let mut state = standard_ledger();
        let id = fy2026(&state);
        state.close_year(id, "controller").unwrap();
        assert!(matches!(
            state.close_year(id, "controller"),
            Err(LedgerError::InvalidStatusTransition { from: "closed", .. })
        ));
    }

    #[test]
    fn test_empty_year_closes_without_entries() {
        let mut state = standard_ledger();
        let result = state.close_year(fy2026(&state), "controller").unwrap();
        assert!(result.closing_entry.is_none());
        assert!(result.opening_entry.is_none());
        assert_eq!(result.net_income, Decimal::ZERO);
    }

    #[test]
    fn test_close_year_with_locked_periods() {
        let mut state = standard_ledger();
        state.set_opening_balance("1100", dec!(5000)).unwrap();
        state.set_opening_balance("3200", dec!(5000)).unwrap();
        post(&mut state, 1, "1100", "4000", dec!(700));

        let id = fy2026(&state);
        let periods: Vec<_> = state.calendar().periods_of(id).map(|p| p.id).collect();
        for period in periods {
            state.lock_period(period).unwrap();
        }
        let next = state
            .create_fiscal_year("FY2027", date(2027, 1, 1), date(2027, 12, 31))
            .unwrap()
            .id;
        let january = state.calendar().period_for(date(2027, 1, 1)).unwrap().id;
        state.lock_period(january).unwrap();

        let result = state.close_year(id, "controller").unwrap();
        assert_eq!(result.next_fiscal_year_id, next);
        assert_eq!(result.net_income, dec!(700));
        assert!(result.closing_entry.is_some());
        assert!(result.opening_entry.is_some());
        assert_eq!(state.chart().get("3000").unwrap().current_balance, dec!(700));
        assert!(state.calendar().periods_of(id).all(|p| p.status == PeriodStatus::Closed));
    }

    #[test]
    fn test_closing_entry_type_does_not_bypass_lock_on_open_year() {
        let mut state = standard_ledger();
        let march = state.calendar().period_for(date(2026, 3, 10)).unwrap().id;
        state.lock_period(march).unwrap();

        let mut request = PostingRequest::new(SourceModule::Manual, date(2026, 3, 10), "X")
            .with_entry_type(EntryType::Closing);
        request.lines = vec![
            PostingLine::account("1100", dec!(1), Decimal::ZERO, ""),
            PostingLine::account("4000", Decimal::ZERO, dec!(1), ""),
        ];
        assert!(matches!(
            state.submit_posting(request),
            Err(LedgerError::PeriodLocked { .. })
        ));
    }
}
