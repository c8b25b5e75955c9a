//! Report error types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::ledger::{ErrorCategory, LedgerError};

/// Errors that can occur during report generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    /// Invalid date range.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// Rejected report parameter.
    #[error("Invalid report parameter: {0}")]
    InvalidParameter(&'static str),

    /// Debit and credit columns of the trial balance differ.
    #[error("Trial balance out of balance: debit {total_debit}, credit {total_credit}")]
    TrialBalanceOutOfBalance {
        /// Debit column total.
        total_debit: Decimal,
        /// Credit column total.
        total_credit: Decimal,
    },

    /// Opening cash plus movements differs from closing cash.
    #[error("Cash flow does not reconcile: expected closing {expected}, ledger shows {actual}")]
    CashFlowNotReconciled {
        /// Opening cash plus net change.
        expected: Decimal,
        /// Closing cash per the ledger.
        actual: Decimal,
    },

    /// Error raised by the ledger while reading.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl ReportError {
    /// Returns the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidDateRange { .. } | Self::InvalidParameter(_) => ErrorCategory::Validation,
            Self::TrialBalanceOutOfBalance { .. } | Self::CashFlowNotReconciled { .. } => {
                ErrorCategory::Consistency
            }
            Self::Ledger(e) => e.category(),
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::InvalidParameter(_) => "INVALID_PARAMETER",
            Self::TrialBalanceOutOfBalance { .. } => "TRIAL_BALANCE_OUT_OF_BALANCE",
            Self::CashFlowNotReconciled { .. } => "CASH_FLOW_NOT_RECONCILED",
            Self::Ledger(e) => e.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidDateRange { .. } | Self::InvalidParameter(_) => 400,
            Self::TrialBalanceOutOfBalance { .. } | Self::CashFlowNotReconciled { .. } => 500,
            Self::Ledger(e) => e.http_status_code(),
        }
    }
}

/// Rejects ranges whose start is after their end.
pub(crate) fn check_range(start: NaiveDate, end: NaiveDate) -> Result<(), ReportError> {
    if start > end {
        return Err(ReportError::InvalidDateRange { start, end });
    }
    Ok(())
}
