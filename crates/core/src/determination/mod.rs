//! Account determination: semantic transaction types to concrete accounts.

pub mod mapping;
pub mod transaction_type;

pub use mapping::{AccountMapping, AccountMappings};
pub use transaction_type::TransactionType;
