//! Core business logic for Folio.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `chart` - Chart of accounts hierarchy and balances
//! - `determination` - Transaction types mapped to accounts
//! - `fiscal` - Fiscal years, periods and the posting gate
//! - `ledger` - Double-entry posting, reversal, year-end close and the store
//! - `subledger` - Receivables, payables, payment allocations and post-dated cheques
//! - `producers` - Document postings (sales, purchases, payments, cheques, claims, payroll, assets, tax)
//! - `assets` - Fixed asset register and depreciation
//! - `reconciliation` - Bank statements, matching and adjustments
//! - `reports` - Financial statements, aging and tax returns

pub mod assets;
pub mod chart;
pub mod determination;
pub mod fiscal;
pub mod ledger;
pub mod producers;
pub mod reconciliation;
pub mod reports;
pub mod subledger;
