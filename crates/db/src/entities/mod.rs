//! `SeaORM` entity definitions for the ledger tables.

pub mod account_mappings;
pub mod accounting_periods;
pub mod accounts;
pub mod bank_statement_lines;
pub mod bank_statements;
pub mod entry_sequences;
pub mod fiscal_years;
pub mod fixed_assets;
pub mod journal_entries;
pub mod journal_entry_lines;
pub mod open_items;
pub mod payments;
pub mod pdc_cheques;
