//! Chart of accounts: account master data, hierarchy and running balances.

pub mod account;
pub mod accounts;
pub mod standard;

pub use account::{Account, AccountType, NewAccount};
pub use accounts::ChartOfAccounts;
pub use standard::{STANDARD_CHART, StandardAccount};
