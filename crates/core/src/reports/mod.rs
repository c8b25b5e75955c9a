//! Financial report generation.
//!
//! This module derives reports from posted journal lines:
//! - Trial Balance
//! - General Ledger
//! - Profit and Loss
//! - Balance Sheet
//! - Cash Flow (direct method)
//! - AR/AP Aging
//! - VAT Return and Corporate Tax

mod aging;
mod cash_flow;
pub mod error;
pub mod service;
mod tax;
pub mod types;

#[cfg(test)]
mod report_props;
#[cfg(test)]
mod tests;

pub use error::ReportError;
pub use service::ReportService;
pub use types::*;
