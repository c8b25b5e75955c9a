//! Bank reconciliation.
//!
//! Statements live in the ledger state, so match marks and adjustment
//! postings commit together. A payment or GL line can back at most one
//! statement line across all statements.

mod matching;
pub mod statement;

use folio_shared::types::{StatementId, has_money_precision};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

pub use statement::{
    AdjustmentKind, BankStatement, MatchTarget, NewStatement, NewStatementLine, StatementBook,
    StatementLine, StatementStatus,
};

use matching::{Claims, find_candidate, payment_amount};

use crate::ledger::{
    EntryType, JournalEntry, LedgerError, LedgerState, PostingLine, PostingRequest, SourceModule,
    SubmitPosting,
};

/// Outcome of an auto-match pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoMatchResult {
    /// Statement matched.
    pub statement_id: StatementId,
    /// Lines matched by this pass.
    pub matched: Vec<(u32, MatchTarget)>,
    /// Lines still unreconciled.
    pub unmatched: Vec<u32>,
}

/// Statement arithmetic check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceCheck {
    /// Opening balance plus all lines.
    pub computed_closing: Decimal,
    /// Closing balance on the statement.
    pub stated_closing: Decimal,
    /// Stated minus computed.
    pub difference: Decimal,
}

impl BalanceCheck {
    /// Returns true if the statement adds up.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.difference.is_zero()
    }
}

impl LedgerState {
    /// Imports a bank statement for a cash account.
    pub fn import_statement(&mut self, input: NewStatement) -> Result<BankStatement, LedgerError> {
        let account = self.chart.require(&input.bank_account_code)?;
        if !account.is_postable() {
            return Err(LedgerError::NonLeafPosting(account.code.clone()));
        }
        if !account.is_cash_account {
            return Err(LedgerError::InvalidDocument(format!(
                "account {} is not a bank or cash account",
                account.code
            )));
        }
        if input.period_start > input.period_end {
            return Err(LedgerError::InvalidDateRange {
                start: input.period_start,
                end: input.period_end,
            });
        }
        let mut lines = Vec::with_capacity(input.lines.len());
        for (index, line) in input.lines.into_iter().enumerate() {
            let one_sided = line.money_in.is_zero() != line.money_out.is_zero();
            let valid = line.money_in >= Decimal::ZERO
                && line.money_out >= Decimal::ZERO
                && has_money_precision(line.money_in)
                && has_money_precision(line.money_out);
            if !one_sided || !valid {
                return Err(LedgerError::InvalidAmount {
                    amount: line.money_in - line.money_out,
                    reason: "statement line needs exactly one positive side",
                });
            }
            lines.push(StatementLine {
                line_number: u32::try_from(index + 1).unwrap_or(u32::MAX),
                date: line.date,
                description: line.description,
                reference: line.reference,
                money_in: line.money_in,
                money_out: line.money_out,
                matched: None,
                adjustment_entry: None,
            });
        }
        let statement = BankStatement {
            id: StatementId::new(),
            reference: input.reference,
            bank_account_code: input.bank_account_code,
            period_start: input.period_start,
            period_end: input.period_end,
            opening_balance: input.opening_balance,
            closing_balance: input.closing_balance,
            status: StatementStatus::Open,
            lines,
        };
        self.statements.insert(statement.clone());
        self.changes.statements.insert(statement.id);
        Ok(statement)
    }

    /// Matches every unreconciled line that has a unique-enough candidate.
    pub fn auto_match(&mut self, id: StatementId) -> Result<AutoMatchResult, LedgerError> {
        let tolerance = i64::from(self.settings.reconciliation_tolerance_days);
        let statement = self.statements.require_open(id)?.clone();
        let mut claims = Claims::collect(self);
        let mut matched = Vec::new();
        let mut unmatched = Vec::new();

        for line in statement.unreconciled() {
            match find_candidate(self, &statement.bank_account_code, line, tolerance, &claims) {
                Some(target) => {
                    claims.claim(self, target);
                    matched.push((line.line_number, target));
                }
                None => unmatched.push(line.line_number),
            }
        }

        if !matched.is_empty() {
            let stored = self.statements.require_open(id)?;
            for (line_number, target) in &matched {
                stored.line_mut(*line_number)?.matched = Some(*target);
            }
            self.changes.statements.insert(id);
        }
        info!(statement = %statement.reference, matched = matched.len(), unmatched = unmatched.len(), "auto-match finished");
        Ok(AutoMatchResult {
            statement_id: id,
            matched,
            unmatched,
        })
    }

    /// Matches one line to a chosen payment or GL line.
    ///
    /// # Errors
    ///
    /// `LineAlreadyReconciled`, `TargetAlreadyMatched`, or `MatchMismatch`
    /// when the target moves a different amount or another account.
    pub fn manual_match(
        &mut self,
        id: StatementId,
        line_number: u32,
        target: MatchTarget,
    ) -> Result<StatementLine, LedgerError> {
        let statement = self.statements.require_open(id)?;
        let bank = statement.bank_account_code.clone();
        let line = statement.line(line_number)?;
        if line.is_reconciled() {
            return Err(LedgerError::LineAlreadyReconciled(line_number));
        }
        let amount = line.amount();
        if !Claims::collect(self).is_free(target) {
            return Err(LedgerError::TargetAlreadyMatched);
        }
        let fits = match target {
            MatchTarget::Payment { payment_id } => {
                let payment = self
                    .subledger
                    .payment(payment_id)
                    .ok_or(LedgerError::PaymentNotFound(payment_id))?;
                payment.bank_account_code == bank && payment_amount(payment) == amount
            }
            MatchTarget::JournalLine {
                entry_id,
                line_number: gl_line,
            } => {
                let entry = self.entry(entry_id)?;
                entry.counts_in_reports()
                    && entry.lines.iter().any(|l| {
                        l.line_number == gl_line && l.account_code == bank && l.net() == amount
                    })
            }
        };
        if !fits {
            return Err(LedgerError::MatchMismatch(line_number));
        }

        let line = self.statements.require_open(id)?.line_mut(line_number)?;
        line.matched = Some(target);
        let line = line.clone();
        self.changes.statements.insert(id);
        Ok(line)
    }

    /// Removes a line's match.
    pub fn unmatch(&mut self, id: StatementId, line_number: u32) -> Result<StatementLine, LedgerError> {
        let line = self.statements.require_open(id)?.line_mut(line_number)?;
        if line.matched.take().is_none() {
            return Err(LedgerError::LineNotMatched(line_number));
        }
        let line = line.clone();
        self.changes.statements.insert(id);
        Ok(line)
    }

    /// Posts an adjustment for an unmatched line.
    ///
    /// Money in: bank Dr, contra Cr. Money out: contra Dr, bank Cr. The
    /// contra account comes from the adjustment kind.
    pub fn create_adjustment(
        &mut self,
        id: StatementId,
        line_number: u32,
        kind: AdjustmentKind,
        user: &str,
    ) -> Result<JournalEntry, LedgerError> {
        let statement = self.statements.require_open(id)?;
        let bank = statement.bank_account_code.clone();
        let reference = format!("ADJ-{}-{line_number}", statement.reference);
        let line = statement.line(line_number)?;
        if line.is_reconciled() {
            return Err(LedgerError::LineAlreadyReconciled(line_number));
        }
        let line = line.clone();
        let money_in = line.amount() > Decimal::ZERO;
        let contra = kind.transaction_type(money_in);
        let description = if line.description.is_empty() {
            format!("Bank adjustment {reference}")
        } else {
            line.description.clone()
        };

        let request = PostingRequest::new(SourceModule::Adjustment, line.date, reference)
            .with_description(description.clone())
            .with_entry_type(EntryType::Adjustment)
            .with_source_id(id.to_string())
            .by(user);
        let request = if money_in {
            request
                .line(PostingLine::account(bank, line.money_in, Decimal::ZERO, description.clone()))
                .line(PostingLine::credit(contra, line.money_in, description))
        } else {
            request
                .line(PostingLine::debit(contra, line.money_out, description.clone()))
                .line(PostingLine::account(bank, Decimal::ZERO, line.money_out, description))
        };
        let entry = self.submit_posting(request)?;

        self.statements.require_open(id)?.line_mut(line_number)?.adjustment_entry = Some(entry.id);
        self.changes.statements.insert(id);
        Ok(entry)
    }

    /// Checks `opening + money in - money out == closing`.
    pub fn validate_balance(&self, id: StatementId) -> Result<BalanceCheck, LedgerError> {
        let statement = self.statements.require(id)?;
        let computed_closing = statement.computed_closing();
        Ok(BalanceCheck {
            computed_closing,
            stated_closing: statement.closing_balance,
            difference: statement.closing_balance - computed_closing,
        })
    }

    /// Freezes a fully reconciled statement.
    ///
    /// # Errors
    ///
    /// `StatementNotReconciled` while the balance does not add up or any
    /// line is neither matched nor adjusted.
    pub fn finalize_statement(&mut self, id: StatementId) -> Result<BankStatement, LedgerError> {
        let statement = self.statements.require_open(id)?;
        if !statement.is_balanced() {
            return Err(LedgerError::StatementNotReconciled(
                "statement balance does not agree with its lines",
            ));
        }
        if statement.unreconciled().next().is_some() {
            return Err(LedgerError::StatementNotReconciled("unreconciled lines remain"));
        }
        statement.status = StatementStatus::Finalized;
        let statement = statement.clone();
        self.changes.statements.insert(id);
        Ok(statement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::ReversalRequest;
    use crate::ledger::testing::{date, standard_ledger};
    use crate::producers::{DocumentLine, PaymentInput, SalesInvoice};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn statement_line(date: NaiveDate, money_in: Decimal, money_out: Decimal) -> NewStatementLine {
        NewStatementLine {
            date,
            description: String::new(),
            reference: String::new(),
            money_in,
            money_out,
        }
    }

    /// Receipt of 1000 on 10 March and a 500 capital injection on 5 March.
    fn ledger_with_activity() -> LedgerState {
        let mut state = standard_ledger();
        state
            .post_sales_invoice(&SalesInvoice {
                number: "INV-1".into(),
                customer: "ACME".into(),
                date: date(2026, 3, 1),
                due_date: None,
                lines: vec![DocumentLine {
                    description: String::new(),
                    amount: dec!(1000),
                    vat_rate: Decimal::ZERO,
                    vat_inclusive: false,
                    account: None,
                }],
                user: "sales".into(),
            })
            .unwrap();
        state
            .record_customer_receipt(&PaymentInput {
                party: "ACME".into(),
                date: date(2026, 3, 10),
                amount: dec!(1000),
                reference: "TRF-9".into(),
                bank_account: None,
                allocations: Vec::new(),
                user: "cashier".into(),
            })
            .unwrap();
        let mut capital = PostingRequest::new(SourceModule::Financing, date(2026, 3, 5), "CAP-1");
        capital.lines = vec![
            PostingLine::account("1100", dec!(500), Decimal::ZERO, "Capital"),
            PostingLine::account("3200", Decimal::ZERO, dec!(500), "Capital"),
        ];
        state.submit_posting(capital).unwrap();
        state
    }

    fn march_statement(lines: Vec<NewStatementLine>, closing: Decimal) -> NewStatement {
        NewStatement {
            reference: "STMT-03".into(),
            bank_account_code: "1100".into(),
            period_start: date(2026, 3, 1),
            period_end: date(2026, 3, 31),
            opening_balance: Decimal::ZERO,
            closing_balance: closing,
            lines,
        }
    }

    #[test]
    fn test_auto_match_then_adjust_then_finalize() {
        let mut state = ledger_with_activity();
        let statement = state
            .import_statement(march_statement(
                vec![
                    statement_line(date(2026, 3, 12), dec!(1000), Decimal::ZERO),
                    statement_line(date(2026, 3, 5), dec!(500), Decimal::ZERO),
                    statement_line(date(2026, 3, 31), Decimal::ZERO, dec!(25)),
                ],
                dec!(1475),
            ))
            .unwrap();
        assert!(state.validate_balance(statement.id).unwrap().is_balanced());

        let result = state.auto_match(statement.id).unwrap();
        assert_eq!(result.unmatched, vec![3]);
        assert!(matches!(result.matched[0], (1, MatchTarget::Payment { .. })));
        assert!(matches!(result.matched[1], (2, MatchTarget::JournalLine { line_number: 1, .. })));

        assert!(matches!(
            state.finalize_statement(statement.id),
            Err(LedgerError::StatementNotReconciled(_))
        ));

        let adjustment = state
            .create_adjustment(statement.id, 3, AdjustmentKind::BankCharge, "treasury")
            .unwrap();
        assert_eq!(adjustment.reference, "ADJ-STMT-03-3");
        assert_eq!(adjustment.entry_type, EntryType::Adjustment);
        assert_eq!(state.chart().get("7000").unwrap().current_balance, dec!(25));
        assert_eq!(state.chart().get("1100").unwrap().current_balance, dec!(1475));

        let finalized = state.finalize_statement(statement.id).unwrap();
        assert_eq!(finalized.status, StatementStatus::Finalized);
        assert!(matches!(
            state.unmatch(statement.id, 1),
            Err(LedgerError::StatementFinalized(_))
        ));
    }

    #[test]
    fn test_reversed_entries_are_not_candidates() {
        let mut state = ledger_with_activity();
        let capital = state.journal().by_number("JV-2026-0003").unwrap().id;
        state
            .reverse(capital, &ReversalRequest::new("posted twice", "treasury"))
            .unwrap();
        let statement = state
            .import_statement(march_statement(
                vec![
                    statement_line(date(2026, 3, 5), dec!(500), Decimal::ZERO),
                    statement_line(date(2026, 3, 5), Decimal::ZERO, dec!(500)),
                ],
                Decimal::ZERO,
            ))
            .unwrap();
        let result = state.auto_match(statement.id).unwrap();
        assert!(result.matched.is_empty());
        assert_eq!(result.unmatched, vec![1, 2]);
    }

    #[test]
    fn test_date_tolerance() {
        let mut state = ledger_with_activity();
        let statement = state
            .import_statement(march_statement(
                vec![statement_line(date(2026, 3, 14), dec!(1000), Decimal::ZERO)],
                dec!(1000),
            ))
            .unwrap();
        let result = state.auto_match(statement.id).unwrap();
        assert!(result.matched.is_empty());
        assert_eq!(result.unmatched, vec![1]);
    }

    #[test]
    fn test_target_matched_at_most_once() {
        let mut state = ledger_with_activity();
        let first = state
            .import_statement(march_statement(
                vec![statement_line(date(2026, 3, 10), dec!(1000), Decimal::ZERO)],
                dec!(1000),
            ))
            .unwrap();
        let second = state
            .import_statement(march_statement(
                vec![statement_line(date(2026, 3, 10), dec!(1000), Decimal::ZERO)],
                dec!(1000),
            ))
            .unwrap();
        let matched = state.auto_match(first.id).unwrap();
        assert_eq!(matched.matched.len(), 1);
        // Neither the payment nor its GL line is available any more.
        let result = state.auto_match(second.id).unwrap();
        assert_eq!(result.unmatched, vec![1]);

        let (_, target) = matched.matched[0];
        assert_eq!(
            state.manual_match(second.id, 1, target),
            Err(LedgerError::TargetAlreadyMatched)
        );
    }

    #[test]
    fn test_manual_match_and_unmatch() {
        let mut state = ledger_with_activity();
        let statement = state
            .import_statement(march_statement(
                vec![statement_line(date(2026, 3, 20), dec!(500), Decimal::ZERO)],
                dec!(500),
            ))
            .unwrap();
        let payment_id = state.subledger().payments().next().unwrap().id;
        assert_eq!(
            state.manual_match(statement.id, 1, MatchTarget::Payment { payment_id }),
            Err(LedgerError::MatchMismatch(1))
        );

        let capital = state.journal().by_number("JV-2026-0003").unwrap().id;
        let target = MatchTarget::JournalLine {
            entry_id: capital,
            line_number: 1,
        };
        let line = state.manual_match(statement.id, 1, target).unwrap();
        assert_eq!(line.matched, Some(target));
        assert_eq!(
            state.manual_match(statement.id, 1, target),
            Err(LedgerError::LineAlreadyReconciled(1))
        );

        state.unmatch(statement.id, 1).unwrap();
        assert_eq!(state.unmatch(statement.id, 1), Err(LedgerError::LineNotMatched(1)));
    }

    #[test]
    fn test_import_validation() {
        let mut state = standard_ledger();
        let mut input = march_statement(
            vec![statement_line(date(2026, 3, 2), dec!(10), dec!(10))],
            Decimal::ZERO,
        );
        assert!(matches!(
            state.import_statement(input.clone()),
            Err(LedgerError::InvalidAmount { .. })
        ));
        input.lines.clear();
        input.bank_account_code = "1200".into();
        assert!(matches!(
            state.import_statement(input),
            Err(LedgerError::InvalidDocument(_))
        ));
    }

    #[test]
    fn test_unbalanced_statement_cannot_finalize() {
        let mut state = standard_ledger();
        let statement = state
            .import_statement(march_statement(Vec::new(), dec!(10)))
            .unwrap();
        let check = state.validate_balance(statement.id).unwrap();
        assert_eq!(check.difference, dec!(10));
        assert!(matches!(
            state.finalize_statement(statement.id),
            Err(LedgerError::StatementNotReconciled(_))
        ));
    }
}
