//! Ledger error types for validation, state and resolution errors.
//!
//! Every write path of the ledger (chart setup, fiscal calendar, posting,
//! reversal, producers, reconciliation) reports failures through
//! [`LedgerError`]. Nothing is mutated when one of these is returned.

use chrono::NaiveDate;
use folio_shared::types::{EntryId, FiscalYearId, OpenItemId, PaymentId, PeriodId, StatementId};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::chart::AccountType;
use crate::determination::TransactionType;

/// Error taxonomy used by callers to decide how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Rejected input; never retried automatically.
    Validation,
    /// Precondition violated by the caller or a concurrent actor.
    State,
    /// Configuration gap in account determination.
    Resolution,
    /// Data-integrity problem detected by derivation or persistence.
    Consistency,
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Entry must have at least 2 lines.
    #[error("Journal entry must have at least 2 lines, got {count}")]
    InsufficientLines {
        /// Number of lines on the entry.
        count: usize,
    },

    /// Entry is not balanced (debits != credits).
    #[error("Journal entry is not balanced. Debit: {debit}, Credit: {credit}")]
    Unbalanced {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    /// Posting attempted on an account that has children.
    #[error("Account {0} has child accounts and cannot receive postings")]
    NonLeafPosting(String),

    /// Account code already exists.
    #[error("Account code '{0}' already exists")]
    DuplicateAccountCode(String),

    /// Income and expense accounts must start at zero.
    #[error("Account {code} of type {account_type} cannot carry an opening balance")]
    OpeningBalanceNotAllowed {
        /// Account code.
        code: String,
        /// Account type.
        account_type: AccountType,
    },

    /// Line amounts are malformed (negative, both sides, no side, sub-cent).
    #[error("Line {line_number}: {reason}")]
    InvalidLineAmount {
        /// Line number within the entry.
        line_number: u32,
        /// What is wrong with the amounts.
        reason: &'static str,
    },

    /// Amount is negative, zero or has more than two decimals.
    #[error("Invalid amount {amount}: {reason}")]
    InvalidAmount {
        /// The rejected amount.
        amount: Decimal,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Parent account not found.
    #[error("Parent account not found: {0}")]
    ParentNotFound(String),

    /// Parent account type differs from the child's.
    #[error("Parent account {parent} is not of type {account_type}")]
    ParentTypeMismatch {
        /// Parent account code.
        parent: String,
        /// Type of the new child account.
        account_type: AccountType,
    },

    /// Parent account already received postings and cannot become a group.
    #[error("Account {0} already has postings and cannot become a parent")]
    ParentHasPostings(String),

    /// Account is inactive and cannot be used.
    #[error("Account {0} is inactive")]
    AccountInactive(String),

    /// Account code is empty or malformed.
    #[error("Invalid account code '{0}'")]
    InvalidAccountCode(String),

    /// Date range where start is not before end.
    #[error("Invalid date range: start {start} is not before end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// Fiscal year overlaps an existing year.
    #[error("Fiscal year overlaps with existing year {0}")]
    OverlappingFiscalYear(String),

    /// Allocation exceeds what the document or payment still has open.
    #[error("Allocation of {requested} exceeds the available {available}")]
    OverAllocation {
        /// Requested allocation.
        requested: Decimal,
        /// Amount still open.
        available: Decimal,
    },

    /// Producer document is malformed.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    // ========== State Errors ==========
    /// No accounting period covers the date.
    #[error("No accounting period found for date {0}")]
    NoOpenPeriod(NaiveDate),

    /// Period exists but is not open.
    #[error("Accounting period {period} is not open for date {date}")]
    PeriodLocked {
        /// Posting date.
        date: NaiveDate,
        /// Period name.
        period: String,
    },

    /// Fiscal year is closed.
    #[error("Fiscal year {0} is closed")]
    FiscalYearClosed(String),

    /// Entry is no longer a draft.
    #[error("Journal entry {0} is already posted")]
    AlreadyPosted(String),

    /// Entry cannot be reversed in its current status.
    #[error("Journal entry {id} cannot be reversed: {reason}")]
    NotReversible {
        /// Entry identifier.
        id: EntryId,
        /// Why the reversal was refused.
        reason: &'static str,
    },

    /// Entry cannot be edited or deleted.
    #[error("Journal entry {0} cannot be modified")]
    NotEditable(EntryId),

    /// Opening balance is frozen after the first posting.
    #[error("Opening balance of account {0} is locked")]
    OpeningBalanceLocked(String),

    /// Journal entry not found.
    #[error("Journal entry not found: {0}")]
    EntryNotFound(EntryId),

    /// Fiscal year not found.
    #[error("Fiscal year not found: {0}")]
    FiscalYearNotFound(FiscalYearId),

    /// Accounting period not found.
    #[error("Accounting period not found: {0}")]
    PeriodNotFound(PeriodId),

    /// Invalid period, year or cheque status transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition {
        /// Current status.
        from: &'static str,
        /// Requested status.
        to: &'static str,
    },

    /// Receivable or payable document not found.
    #[error("Open item not found: {0}")]
    OpenItemNotFound(OpenItemId),

    /// Document reference already registered.
    #[error("Document {0} is already registered")]
    DuplicateDocument(String),

    /// Document cannot be cancelled while payments are allocated to it.
    #[error("Document {0} has allocated payments")]
    DocumentHasAllocations(String),

    /// Payment record not found.
    #[error("Payment not found: {0}")]
    PaymentNotFound(PaymentId),

    /// Fixed asset not found.
    #[error("Fixed asset not found: {0}")]
    AssetNotFound(String),

    /// Fixed asset code already registered.
    #[error("Fixed asset {0} is already registered")]
    DuplicateAsset(String),

    /// Fixed asset cannot take the requested action.
    #[error("Fixed asset {code} cannot be processed: {reason}")]
    AssetNotProcessable {
        /// Asset code.
        code: String,
        /// Why the action was refused.
        reason: &'static str,
    },

    /// Post-dated cheque not found.
    #[error("Cheque not found: {0}")]
    ChequeNotFound(String),

    /// Bank statement not found.
    #[error("Bank statement not found: {0}")]
    StatementNotFound(StatementId),

    /// Bank statement line not found.
    #[error("Line {line_number} not found on statement {statement}")]
    StatementLineNotFound {
        /// Statement identifier.
        statement: StatementId,
        /// Line number.
        line_number: u32,
    },

    /// Statement line is already matched or adjusted.
    #[error("Statement line {0} is already reconciled")]
    LineAlreadyReconciled(u32),

    /// Statement line is not matched.
    #[error("Statement line {0} is not matched")]
    LineNotMatched(u32),

    /// Candidate is already matched by another statement line.
    #[error("Match target is already reconciled")]
    TargetAlreadyMatched,

    /// Candidate does not fit the statement line.
    #[error("Match target does not fit statement line {0}")]
    MatchMismatch(u32),

    /// Statement cannot be finalized yet.
    #[error("Bank statement cannot be finalized: {0}")]
    StatementNotReconciled(&'static str),

    /// Statement is finalized and immutable.
    #[error("Bank statement {0} is already reconciled")]
    StatementFinalized(StatementId),

    // ========== Resolution Errors ==========
    /// Neither mapping nor fallback resolves to a leaf account.
    #[error("No postable account resolved for transaction type {transaction_type}")]
    UnresolvedAccount {
        /// Transaction type being resolved.
        transaction_type: TransactionType,
    },

    // ========== Persistence Errors ==========
    /// The committed state could not be stored.
    #[error("Failed to persist ledger changes: {0}")]
    Persistence(String),
}

impl LedgerError {
    /// Returns the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InsufficientLines { .. }
            | Self::Unbalanced { .. }
            | Self::NonLeafPosting(_)
            | Self::DuplicateAccountCode(_)
            | Self::OpeningBalanceNotAllowed { .. }
            | Self::InvalidLineAmount { .. }
            | Self::InvalidAmount { .. }
            | Self::AccountNotFound(_)
            | Self::ParentNotFound(_)
            | Self::ParentTypeMismatch { .. }
            | Self::ParentHasPostings(_)
            | Self::AccountInactive(_)
            | Self::InvalidAccountCode(_)
            | Self::InvalidDateRange { .. }
            | Self::OverlappingFiscalYear(_)
            | Self::OverAllocation { .. }
            | Self::InvalidDocument(_)
            | Self::DuplicateDocument(_)
            | Self::DuplicateAsset(_)
            | Self::MatchMismatch(_) => ErrorCategory::Validation,

            Self::UnresolvedAccount { .. } => ErrorCategory::Resolution,

            Self::Persistence(_) => ErrorCategory::Consistency,

            _ => ErrorCategory::State,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientLines { .. } => "INSUFFICIENT_LINES",
            Self::Unbalanced { .. } => "UNBALANCED",
            Self::NonLeafPosting(_) => "NON_LEAF_POSTING",
            Self::DuplicateAccountCode(_) => "DUPLICATE_ACCOUNT_CODE",
            Self::OpeningBalanceNotAllowed { .. } => "OPENING_BALANCE_NOT_ALLOWED",
            Self::InvalidLineAmount { .. } => "INVALID_LINE_AMOUNT",
            Self::InvalidAmount { .. } => "INVALID_AMOUNT",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::ParentNotFound(_) => "PARENT_NOT_FOUND",
            Self::ParentTypeMismatch { .. } => "PARENT_TYPE_MISMATCH",
            Self::ParentHasPostings(_) => "PARENT_HAS_POSTINGS",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::InvalidAccountCode(_) => "INVALID_ACCOUNT_CODE",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::OverlappingFiscalYear(_) => "OVERLAPPING_FISCAL_YEAR",
            Self::OverAllocation { .. } => "OVER_ALLOCATION",
            Self::InvalidDocument(_) => "INVALID_DOCUMENT",
            Self::NoOpenPeriod(_) => "NO_OPEN_PERIOD",
            Self::PeriodLocked { .. } => "PERIOD_LOCKED",
            Self::FiscalYearClosed(_) => "FISCAL_YEAR_CLOSED",
            Self::AlreadyPosted(_) => "ALREADY_POSTED",
            Self::NotReversible { .. } => "NOT_REVERSIBLE",
            Self::NotEditable(_) => "NOT_EDITABLE",
            Self::OpeningBalanceLocked(_) => "OPENING_BALANCE_LOCKED",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::FiscalYearNotFound(_) => "FISCAL_YEAR_NOT_FOUND",
            Self::PeriodNotFound(_) => "PERIOD_NOT_FOUND",
            Self::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
            Self::OpenItemNotFound(_) => "OPEN_ITEM_NOT_FOUND",
            Self::DuplicateDocument(_) => "DUPLICATE_DOCUMENT",
            Self::DocumentHasAllocations(_) => "DOCUMENT_HAS_ALLOCATIONS",
            Self::PaymentNotFound(_) => "PAYMENT_NOT_FOUND",
            Self::AssetNotFound(_) => "ASSET_NOT_FOUND",
            Self::DuplicateAsset(_) => "DUPLICATE_ASSET",
            Self::AssetNotProcessable { .. } => "ASSET_NOT_PROCESSABLE",
            Self::ChequeNotFound(_) => "CHEQUE_NOT_FOUND",
            Self::StatementNotFound(_) => "STATEMENT_NOT_FOUND",
            Self::StatementLineNotFound { .. } => "STATEMENT_LINE_NOT_FOUND",
            Self::LineAlreadyReconciled(_) => "LINE_ALREADY_RECONCILED",
            Self::LineNotMatched(_) => "LINE_NOT_MATCHED",
            Self::TargetAlreadyMatched => "TARGET_ALREADY_MATCHED",
            Self::MatchMismatch(_) => "MATCH_MISMATCH",
            Self::StatementNotReconciled(_) => "STATEMENT_NOT_RECONCILED",
            Self::StatementFinalized(_) => "STATEMENT_FINALIZED",
            Self::UnresolvedAccount { .. } => "UNRESOLVED_ACCOUNT",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::AccountNotFound(_)
            | Self::EntryNotFound(_)
            | Self::FiscalYearNotFound(_)
            | Self::PeriodNotFound(_)
            | Self::OpenItemNotFound(_)
            | Self::PaymentNotFound(_)
            | Self::AssetNotFound(_)
            | Self::ChequeNotFound(_)
            | Self::StatementNotFound(_)
            | Self::StatementLineNotFound { .. } => 404,
            Self::UnresolvedAccount { .. } => 422,
            Self::Persistence(_) => 500,
            _ => match self.category() {
                ErrorCategory::Validation => 400,
                ErrorCategory::State => 409,
                ErrorCategory::Resolution => 422,
                ErrorCategory::Consistency => 500,
            },
        }
    }

    /// Returns true if this error is retryable.
    ///
    /// Only storage failures qualify; every other error reflects ledger state
    /// the caller must look at first.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LedgerError::InsufficientLines { count: 1 }.error_code(),
            "INSUFFICIENT_LINES"
        );
        assert_eq!(
            LedgerError::Unbalanced {
                debit: dec!(1.00),
                credit: dec!(0.50),
            }
            .error_code(),
            "UNBALANCED"
        );
        assert_eq!(
            LedgerError::NonLeafPosting("100".into()).error_code(),
            "NON_LEAF_POSTING"
        );
        assert_eq!(
            LedgerError::UnresolvedAccount {
                transaction_type: TransactionType::SalesInvoiceVat,
            }
            .error_code(),
            "UNRESOLVED_ACCOUNT"
        );
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            LedgerError::DuplicateAccountCode("1000".into()).category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            LedgerError::FiscalYearClosed("FY 2025".into()).category(),
            ErrorCategory::State
        );
        assert_eq!(
            LedgerError::AlreadyPosted("JV-2026-0001".into()).category(),
            ErrorCategory::State
        );
        assert_eq!(
            LedgerError::UnresolvedAccount {
                transaction_type: TransactionType::BankCharges,
            }
            .category(),
            ErrorCategory::Resolution
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(
            LedgerError::InsufficientLines { count: 0 }.http_status_code(),
            400
        );
        assert_eq!(
            LedgerError::NoOpenPeriod(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap())
                .http_status_code(),
            409
        );
        assert_eq!(
            LedgerError::AccountNotFound("9999".into()).http_status_code(),
            404
        );
        assert_eq!(
            LedgerError::ChequeNotFound("CHQ-1".into()).http_status_code(),
            404
        );
        assert_eq!(
            LedgerError::Persistence("down".into()).http_status_code(),
            500
        );
    }

    #[test]
    fn test_retryable_errors() {
        assert!(LedgerError::Persistence("timeout".into()).is_retryable());
        assert!(!LedgerError::InsufficientLines { count: 1 }.is_retryable());
        assert!(!LedgerError::NotEditable(EntryId::new()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::Unbalanced {
            debit: dec!(100.00),
            credit: dec!(50.00),
        };
        assert_eq!(
            err.to_string(),
            "Journal entry is not balanced. Debit: 100.00, Credit: 50.00"
        );

        let err = LedgerError::PeriodLocked {
            date: NaiveDate::from_ymd_opt(2026, 3, 15).unwrap(),
            period: "March 2026".into(),
        };
        assert_eq!(
            err.to_string(),
            "Accounting period March 2026 is not open for date 2026-03-15"
        );
    }
}
