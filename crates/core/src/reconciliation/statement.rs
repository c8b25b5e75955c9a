//! Bank statements and their lines.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use folio_shared::types::{EntryId, PaymentId, StatementId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::determination::TransactionType;
use crate::ledger::LedgerError;

/// What a statement line was matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchTarget {
    /// A recorded payment.
    Payment {
        /// Payment identifier.
        payment_id: PaymentId,
    },
    /// A posted line on the bank GL account.
    JournalLine {
        /// Entry identifier.
        entry_id: EntryId,
        /// Line number within the entry.
        line_number: u32,
    },
}

/// Category of an adjustment for an unmatched line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    /// Fees charged by the bank.
    BankCharge,
    /// Interest credited by the bank.
    InterestIncome,
    /// Exchange difference.
    FxDifference,
    /// Anything else, parked in suspense.
    Other,
}

impl AdjustmentKind {
    /// Contra transaction type for money moving in (`true`) or out.
    #[must_use]
    pub fn transaction_type(self, money_in: bool) -> TransactionType {
        match self {
            Self::BankCharge => TransactionType::BankCharges,
            Self::InterestIncome => TransactionType::BankInterestIncome,
            Self::FxDifference if money_in => TransactionType::FxGain,
            Self::FxDifference => TransactionType::FxLoss,
            Self::Other => TransactionType::Suspense,
        }
    }
}

/// Lifecycle of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementStatus {
    /// Being reconciled.
    Open,
    /// Reconciled and frozen.
    Finalized,
}

/// One transaction on a bank statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementLine {
    /// 1-based position.
    pub line_number: u32,
    /// Value date.
    pub date: NaiveDate,
    /// Bank narrative.
    pub description: String,
    /// Bank reference.
    pub reference: String,
    /// Credit to the account.
    pub money_in: Decimal,
    /// Debit to the account.
    pub money_out: Decimal,
    /// Matched payment or GL line.
    pub matched: Option<MatchTarget>,
    /// Adjustment entry posted for the line.
    pub adjustment_entry: Option<EntryId>,
}

impl StatementLine {
    /// Signed movement: positive for money in.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.money_in - self.money_out
    }

    /// Matched or adjusted.
    #[must_use]
    pub fn is_reconciled(&self) -> bool {
        self.matched.is_some() || self.adjustment_entry.is_some()
    }
}

/// A bank statement for one GL bank account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankStatement {
    /// Unique identifier.
    pub id: StatementId,
    /// Statement number from the bank.
    pub reference: String,
    /// GL account the statement belongs to.
    pub bank_account_code: String,
    /// First day covered.
    pub period_start: NaiveDate,
    /// Last day covered.
    pub period_end: NaiveDate,
    /// Balance before the first line.
    pub opening_balance: Decimal,
    /// Balance after the last line.
    pub closing_balance: Decimal,
    /// Lifecycle status.
    pub status: StatementStatus,
    /// Lines in statement order.
    pub lines: Vec<StatementLine>,
}

impl BankStatement {
    /// Opening balance plus every line.
    #[must_use]
    pub fn computed_closing(&self) -> Decimal {
        self.opening_balance + self.lines.iter().map(StatementLine::amount).sum::<Decimal>()
    }

    /// Lines add up to the stated closing balance.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.computed_closing() == self.closing_balance
    }

    /// Lines neither matched nor adjusted.
    pub fn unreconciled(&self) -> impl Iterator<Item = &StatementLine> {
        self.lines.iter().filter(|l| !l.is_reconciled())
    }

    /// Looks up a line.
    pub fn line(&self, line_number: u32) -> Result<&StatementLine, LedgerError> {
        self.lines
            .iter()
            .find(|l| l.line_number == line_number)
            .ok_or(LedgerError::StatementLineNotFound {
                statement: self.id,
                line_number,
            })
    }

    pub(crate) fn line_mut(&mut self, line_number: u32) -> Result<&mut StatementLine, LedgerError> {
        let statement = self.id;
        self.lines
            .iter_mut()
            .find(|l| l.line_number == line_number)
            .ok_or(LedgerError::StatementLineNotFound {
                statement,
                line_number,
            })
    }
}

/// Statement line as imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStatementLine {
    /// Value date.
    pub date: NaiveDate,
    /// Bank narrative.
    #[serde(default)]
    pub description: String,
    /// Bank reference.
    #[serde(default)]
    pub reference: String,
    /// Credit to the account.
    #[serde(default)]
    pub money_in: Decimal,
    /// Debit to the account.
    #[serde(default)]
    pub money_out: Decimal,
}

/// Statement as imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStatement {
    /// Statement number from the bank.
    pub reference: String,
    /// GL bank account.
    pub bank_account_code: String,
    /// First day covered.
    pub period_start: NaiveDate,
    /// Last day covered.
    pub period_end: NaiveDate,
    /// Opening balance.
    pub opening_balance: Decimal,
    /// Closing balance.
    pub closing_balance: Decimal,
    /// Lines.
    pub lines: Vec<NewStatementLine>,
}

/// All imported statements.
#[derive(Debug, Clone, Default)]
pub struct StatementBook {
    statements: BTreeMap<StatementId, BankStatement>,
}

impl StatementBook {
    /// Rebuilds the book from stored statements.
    #[must_use]
    pub fn from_statements(statements: impl IntoIterator<Item = BankStatement>) -> Self {
        Self {
            statements: statements.into_iter().map(|s| (s.id, s)).collect(),
        }
    }

    /// Looks up a statement.
    #[must_use]
    pub fn get(&self, id: StatementId) -> Option<&BankStatement> {
        self.statements.get(&id)
    }

    /// Looks up a statement, failing with `StatementNotFound`.
    pub fn require(&self, id: StatementId) -> Result<&BankStatement, LedgerError> {
        self.get(id).ok_or(LedgerError::StatementNotFound(id))
    }

    /// Looks up an open statement for changes.
    pub(crate) fn require_open(&mut self, id: StatementId) -> Result<&mut BankStatement, LedgerError> {
        let statement = self
            .statements
            .get_mut(&id)
            .ok_or(LedgerError::StatementNotFound(id))?;
        if statement.status == StatementStatus::Finalized {
            return Err(LedgerError::StatementFinalized(id));
        }
        Ok(statement)
    }

    /// Iterates over statements.
    pub fn iter(&self) -> impl Iterator<Item = &BankStatement> {
        self.statements.values()
    }

    pub(crate) fn insert(&mut self, statement: BankStatement) {
        self.statements.insert(statement.id, statement);
    }

    /// Returns true if any statement line is matched to `target`.
    #[must_use]
    pub fn is_claimed(&self, target: MatchTarget) -> bool {
        self.claimed().any(|t| t == target)
    }

    /// Every matched target across all statements.
    pub fn claimed(&self) -> impl Iterator<Item = MatchTarget> + '_ {
        self.statements
            .values()
            .flat_map(|s| s.lines.iter().filter_map(|l| l.matched))
    }
}
