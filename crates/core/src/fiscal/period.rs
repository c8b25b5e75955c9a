//! Fiscal year and accounting period types.

use chrono::NaiveDate;
use folio_shared::types::{FiscalYearId, PeriodId};
use serde::{Deserialize, Serialize};

/// Status of a fiscal year.
///
/// `Open -> Closing -> Closed`. Postings are still accepted while closing so
/// the closing entry itself can be booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FiscalYearStatus {
    /// Accepting postings.
    Open,
    /// Year-end close in progress.
    Closing,
    /// Closed; no posting may be dated inside the year.
    Closed,
}

impl FiscalYearStatus {
    /// Returns the lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closing => "closing",
            Self::Closed => "closed",
        }
    }
}

/// Fiscal year definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalYear {
    /// Unique identifier.
    pub id: FiscalYearId,
    /// Year name (e.g., "FY2026").
    pub name: String,
    /// First day of the year.
    pub start_date: NaiveDate,
    /// Last day of the year.
    pub end_date: NaiveDate,
    /// Current status.
    pub status: FiscalYearStatus,
}

impl FiscalYear {
    /// Returns true once the year is fully closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.status == FiscalYearStatus::Closed
    }

    /// Returns true if the date falls within the year.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

/// Status of an accounting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodStatus {
    /// Period is open for postings.
    Open,
    /// Temporarily locked; can be unlocked.
    Locked,
    /// Closed by year-end; terminal.
    Closed,
}

impl PeriodStatus {
    /// Returns the lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Locked => "locked",
            Self::Closed => "closed",
        }
    }
}

/// A monthly window of a fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountingPeriod {
    /// Unique identifier.
    pub id: PeriodId,
    /// Fiscal year this period belongs to.
    pub fiscal_year_id: FiscalYearId,
    /// Period number within the year, starting at 1.
    pub period_number: u32,
    /// Period name (e.g., "January 2026").
    pub name: String,
    /// First day of the period.
    pub start_date: NaiveDate,
    /// Last day of the period.
    pub end_date: NaiveDate,
    /// Current status.
    pub status: PeriodStatus,
}

impl AccountingPeriod {
    /// Returns true if postings can be dated in this period.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == PeriodStatus::Open
    }

    /// Returns true if the given date falls within this period.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}
