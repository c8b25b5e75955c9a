//! Mapping table and account resolution.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::transaction_type::TransactionType;
use crate::chart::{Account, ChartOfAccounts};
use crate::ledger::LedgerError;

/// One configured mapping row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMapping {
    /// Transaction type being mapped.
    pub transaction_type: TransactionType,
    /// Target account code.
    pub account_code: String,
}

/// Configured transaction-type to account mappings.
///
/// Pure lookup data; resolution never mutates anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountMappings {
    rows: BTreeMap<TransactionType, String>,
}

impl AccountMappings {
    /// Creates an empty mapping table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the table from stored rows.
    #[must_use]
    pub fn from_rows(rows: impl IntoIterator<Item = AccountMapping>) -> Self {
        Self {
            rows: rows
                .into_iter()
                .map(|row| (row.transaction_type, row.account_code))
                .collect(),
        }
    }

    /// Sets the mapping for a transaction type.
    ///
    /// The target must be an existing postable account.
    pub fn set(
        &mut self,
        chart: &ChartOfAccounts,
        transaction_type: TransactionType,
        account_code: &str,
    ) -> Result<(), LedgerError> {
        let account = chart.require(account_code)?;
        if !account.is_leaf() {
            return Err(LedgerError::NonLeafPosting(account_code.to_string()));
        }
        self.rows.insert(transaction_type, account_code.to_string());
        Ok(())
    }

    /// Removes a mapping; returns true if one existed.
    pub fn remove(&mut self, transaction_type: TransactionType) -> bool {
        self.rows.remove(&transaction_type).is_some()
    }

    /// Returns the configured account code, if any.
    #[must_use]
    pub fn get(&self, transaction_type: TransactionType) -> Option<&str> {
        self.rows.get(&transaction_type).map(String::as_str)
    }

    /// Iterates over all rows in transaction-type order.
    pub fn rows(&self) -> impl Iterator<Item = AccountMapping> + '_ {
        self.rows.iter().map(|(transaction_type, code)| AccountMapping {
            transaction_type: *transaction_type,
            account_code: code.clone(),
        })
    }

    /// Resolves a transaction type to a postable leaf account.
    ///
    /// Order: configured mapping, then `fallback_code` (or the type's
    /// hardcoded default when none is given). Fails with `UnresolvedAccount`
    /// when neither names an existing postable leaf, which happens once the
    /// fallback account is deactivated or gains children.
    pub fn resolve<'a>(
        &self,
        chart: &'a ChartOfAccounts,
        transaction_type: TransactionType,
        fallback_code: Option<&str>,
    ) -> Result<&'a Account, LedgerError> {
        let mapped = self.get(transaction_type);
        let fallback = fallback_code.unwrap_or_else(|| transaction_type.fallback_code());

        mapped
            .into_iter()
            .chain([fallback])
            .find_map(|code| chart.get(code).filter(|a| a.is_postable()))
            .ok_or(LedgerError::UnresolvedAccount { transaction_type })
    }
}
