//! Common types used across the application.

pub mod id;
pub mod money;

pub use id::*;
pub use money::{MONEY_SCALE, format_accounting, format_money, has_money_precision, round_money};
