//! Journal domain types: entries, lines and posting requests.

use chrono::{DateTime, NaiveDate, Utc};
use folio_shared::types::{EntryId, FiscalYearId, PeriodId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::determination::TransactionType;

/// Journal entry lifecycle status.
///
/// `Draft -> Posted -> Reversed`; drafts may also be deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Editable, not yet affecting balances.
    Draft,
    /// Committed to the ledger (immutable).
    Posted,
    /// Posted and neutralized by a reversal entry.
    Reversed,
}

impl EntryStatus {
    /// Returns the lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Posted => "posted",
            Self::Reversed => "reversed",
        }
    }
}

/// Kind of journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Regular business entry.
    #[default]
    Standard,
    /// Opening balances.
    Opening,
    /// Manual or reconciliation adjustment.
    Adjustment,
    /// Period-end adjusting entry (accruals, provisions).
    Adjusting,
    /// Mirror of a posted entry.
    Reversal,
    /// Year-end closing of income and expense accounts.
    Closing,
}

/// Module that produced an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceModule {
    /// Manual journal entry.
    #[default]
    Manual,
    /// Sales invoice.
    Sales,
    /// Vendor bill.
    Purchase,
    /// Customer receipt or vendor payment.
    Payment,
    /// Transfer between bank accounts.
    BankTransfer,
    /// Employee expense claim.
    ExpenseClaim,
    /// Payroll run or salary payment.
    Payroll,
    /// Fixed asset acquisition, depreciation or disposal.
    FixedAsset,
    /// Post-dated cheque deposit, clearance or bounce.
    Pdc,
    /// VAT return settlement.
    Vat,
    /// Corporate tax provision or payment.
    CorporateTax,
    /// Opening balances and year-end carry-forward.
    OpeningBalance,
    /// Year-end closing.
    YearEnd,
    /// Reversal entry.
    Reversal,
    /// Manual or reconciliation adjustment.
    Adjustment,
    /// Loans, capital and other financing flows.
    Financing,
}

/// One debit-or-credit leg of a journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    /// Position within the entry, starting at 1.
    pub line_number: u32,
    /// Leaf account the line posts to.
    pub account_code: String,
    /// Line description.
    pub description: String,
    /// Debit amount (>= 0).
    pub debit: Decimal,
    /// Credit amount (>= 0).
    pub credit: Decimal,
}

impl JournalLine {
    /// Returns `debit - credit`.
    #[must_use]
    pub fn net(&self) -> Decimal {
        self.debit - self.credit
    }
}

/// A journal entry with its owned lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique identifier.
    pub id: EntryId,
    /// `<PREFIX>-<YEAR>-<NNNN>`, assigned when posted.
    pub entry_number: Option<String>,
    /// Accounting date.
    pub date: NaiveDate,
    /// External reference (invoice number, cheque number).
    pub reference: String,
    /// Narrative.
    pub description: String,
    /// Lifecycle status.
    pub status: EntryStatus,
    /// Kind of entry.
    pub entry_type: EntryType,
    /// Producer module.
    pub source_module: SourceModule,
    /// Producer document identifier, opaque to the ledger.
    pub source_id: Option<String>,
    /// Created by a producer rather than a user.
    pub is_system_generated: bool,
    /// Set on posting; locked entries can't be edited.
    pub is_locked: bool,
    /// Year-end carry-forward memo; recorded but not applied to balances.
    pub carry_forward: bool,
    /// Fiscal year of the posting date.
    pub fiscal_year_id: Option<FiscalYearId>,
    /// Period of the posting date.
    pub period_id: Option<PeriodId>,
    /// Cached sum of debits.
    pub total_debit: Decimal,
    /// Cached sum of credits.
    pub total_credit: Decimal,
    /// Entry this one reverses.
    pub reversal_of: Option<EntryId>,
    /// Entry that reversed this one.
    pub reversed_by: Option<EntryId>,
    /// Global commit order.
    pub posting_sequence: Option<u64>,
    /// Creator.
    pub created_by: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Posting timestamp.
    pub posted_at: Option<DateTime<Utc>>,
    /// Posting user.
    pub posted_by: Option<String>,
    /// Ordered lines.
    pub lines: Vec<JournalLine>,
}

impl JournalEntry {
    /// Returns true if the entry has been posted (including reversed).
    #[must_use]
    pub fn is_posted(&self) -> bool {
        self.status != EntryStatus::Draft
    }

    /// Returns true if report derivation should include the entry's lines.
    ///
    /// Reversed originals stay in; their reversal neutralizes them.
    #[must_use]
    pub fn counts_in_reports(&self) -> bool {
        self.is_posted() && !self.carry_forward
    }

    /// Returns true if the entry can still be edited or deleted.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        self.status == EntryStatus::Draft && !self.is_system_generated && !self.is_locked
    }

    /// Sums of debit and credit over the lines.
    #[must_use]
    pub fn line_totals(&self) -> (Decimal, Decimal) {
        self.lines.iter().fold((Decimal::ZERO, Decimal::ZERO), |(d, c), line| {
            (d + line.debit, c + line.credit)
        })
    }
}

/// Where a posting line goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineTarget {
    /// An explicit account code.
    Account(String),
    /// A semantic transaction type, resolved through account determination.
    Mapped {
        /// Transaction type.
        transaction_type: TransactionType,
        /// Overrides the type's hardcoded fallback code.
        #[serde(default)]
        fallback_code: Option<String>,
    },
}

/// One line of a posting request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingLine {
    /// Target account or transaction type.
    pub target: LineTarget,
    /// Debit amount.
    #[serde(default)]
    pub debit: Decimal,
    /// Credit amount.
    #[serde(default)]
    pub credit: Decimal,
    /// Line description.
    #[serde(default)]
    pub description: String,
}

impl PostingLine {
    /// Debit line on a transaction type.
    #[must_use]
    pub fn debit(transaction_type: TransactionType, amount: Decimal, description: impl Into<String>) -> Self {
        Self::mapped(transaction_type, amount, Decimal::ZERO, description)
    }

    /// Credit line on a transaction type.
    #[must_use]
    pub fn credit(transaction_type: TransactionType, amount: Decimal, description: impl Into<String>) -> Self {
        Self::mapped(transaction_type, Decimal::ZERO, amount, description)
    }

    /// Line on an explicit account code.
    #[must_use]
    pub fn account(
        code: impl Into<String>,
        debit: Decimal,
        credit: Decimal,
        description: impl Into<String>,
    ) -> Self {
        Self {
            target: LineTarget::Account(code.into()),
            debit,
            credit,
            description: description.into(),
        }
    }

    fn mapped(
        transaction_type: TransactionType,
        debit: Decimal,
        credit: Decimal,
        description: impl Into<String>,
    ) -> Self {
        Self {
            target: LineTarget::Mapped {
                transaction_type,
                fallback_code: None,
            },
            debit,
            credit,
            description: description.into(),
        }
    }

    /// Overrides the fallback code of a mapped line.
    #[must_use]
    pub fn with_fallback(mut self, code: impl Into<String>) -> Self {
        if let LineTarget::Mapped { fallback_code, .. } = &mut self.target {
            *fallback_code = Some(code.into());
        }
        self
    }
}

/// The producer-facing request: one balanced set of lines to commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingRequest {
    /// Producer module.
    pub source_module: SourceModule,
    /// Producer document identifier.
    #[serde(default)]
    pub source_id: Option<String>,
    /// Accounting date.
    pub date: NaiveDate,
    /// External reference.
    #[serde(default)]
    pub reference: String,
    /// Narrative.
    #[serde(default)]
    pub description: String,
    /// Ordered lines.
    pub lines: Vec<PostingLine>,
    /// Kind of entry.
    #[serde(default)]
    pub entry_type: EntryType,
    /// Created by a producer rather than a user.
    #[serde(default)]
    pub is_system_generated: bool,
    /// Acting user.
    #[serde(default = "default_user")]
    pub user: String,
}

fn default_user() -> String {
    "system".to_string()
}

impl PostingRequest {
    /// Creates a system-generated standard request with no lines.
    #[must_use]
    pub fn new(source_module: SourceModule, date: NaiveDate, reference: impl Into<String>) -> Self {
        Self {
            source_module,
            source_id: None,
            date,
            reference: reference.into(),
            description: String::new(),
            lines: Vec::new(),
            entry_type: EntryType::Standard,
            is_system_generated: true,
            user: default_user(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the source document identifier.
    #[must_use]
    pub fn with_source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    /// Sets the entry type.
    #[must_use]
    pub fn with_entry_type(mut self, entry_type: EntryType) -> Self {
        self.entry_type = entry_type;
        self
    }

    /// Sets the acting user.
    #[must_use]
    pub fn by(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Appends a line, skipping lines with no amount on either side.
    #[must_use]
    pub fn line(mut self, line: PostingLine) -> Self {
        if !(line.debit.is_zero() && line.credit.is_zero()) {
            self.lines.push(line);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_request_builder_skips_empty_lines() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let request = PostingRequest::new(SourceModule::Sales, date, "INV-1")
            .line(PostingLine::debit(TransactionType::SalesInvoiceReceivable, dec!(100), ""))
            .line(PostingLine::credit(TransactionType::SalesInvoiceVat, Decimal::ZERO, ""))
            .line(PostingLine::credit(TransactionType::SalesInvoiceRevenue, dec!(100), ""));
        assert_eq!(request.lines.len(), 2);
        assert!(request.is_system_generated);
        assert_eq!(request.user, "system");
    }

    #[test]
    fn test_with_fallback_only_touches_mapped_lines() {
        let line = PostingLine::debit(TransactionType::PdcControl, dec!(5), "").with_fallback("1600");
        assert_eq!(
            line.target,
            LineTarget::Mapped {
                transaction_type: TransactionType::PdcControl,
                fallback_code: Some("1600".into()),
            }
        );
        let explicit = PostingLine::account("1100", dec!(5), Decimal::ZERO, "").with_fallback("1600");
        assert_eq!(explicit.target, LineTarget::Account("1100".into()));
    }

    #[test]
    fn test_posting_request_deserializes_with_defaults() {
        let json = r#"{
            "source_module": "manual",
            "date": "2026-02-01",
            "lines": [
                {"target": {"account": "1100"}, "debit": "10.00"},
                {"target": {"mapped": {"transaction_type": "bank_interest_income"}}, "credit": "10.00"}
            ]
        }"#;
        let request: PostingRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.entry_type, EntryType::Standard);
        assert_eq!(request.user, "system");
        assert_eq!(request.lines[1].credit, dec!(10.00));
        assert!(!request.is_system_generated);
    }
}
