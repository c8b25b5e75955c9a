//! Fiscal years, accounting periods and the posting gate.

pub mod calendar;
pub mod period;

pub use calendar::FiscalCalendar;
pub use period::{AccountingPeriod, FiscalYear, FiscalYearStatus, PeriodStatus};
