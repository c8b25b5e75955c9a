//! Arena of accounts indexed by code.

use std::collections::HashMap;

use folio_shared::types::has_money_precision;
use rust_decimal::Decimal;

use super::account::{Account, NewAccount};
use crate::ledger::LedgerError;

/// The chart of accounts.
///
/// Accounts live in a vector in creation order; `index` maps codes to slots.
/// `apply_posting` is the only mutator of `current_balance`.
#[derive(Debug, Clone, Default)]
pub struct ChartOfAccounts {
    accounts: Vec<Account>,
    index: HashMap<String, usize>,
}

impl ChartOfAccounts {
    /// Creates an empty chart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a chart from stored accounts, recomputing leaf status.
    #[must_use]
    pub fn from_accounts(accounts: Vec<Account>) -> Self {
        let mut chart = Self::default();
        for mut account in accounts {
            account.child_count = 0;
            chart.index.insert(account.code.clone(), chart.accounts.len());
            chart.accounts.push(account);
        }
        let parents: Vec<String> = chart
            .accounts
            .iter()
            .filter_map(|a| a.parent.clone())
            .collect();
        for parent in parents {
            if let Some(&slot) = chart.index.get(&parent) {
                chart.accounts[slot].child_count += 1;
            }
        }
        chart
    }

    /// Creates an account.
    ///
    /// # Errors
    ///
    /// - `InvalidAccountCode` for an empty code
    /// - `DuplicateAccountCode` if the code exists
    /// - `OpeningBalanceNotAllowed` for a nonzero Income/Expense opening balance
    /// - `ParentNotFound`, `ParentTypeMismatch`, `ParentHasPostings` for a bad parent
    pub fn create_account(&mut self, input: NewAccount) -> Result<&Account, LedgerError> {
        let code = input.code.trim().to_string();
        if code.is_empty() {
            return Err(LedgerError::InvalidAccountCode(input.code));
        }
        if self.index.contains_key(&code) {
            return Err(LedgerError::DuplicateAccountCode(code));
        }
        if !input.opening_balance.is_zero() && !input.account_type.allows_opening_balance() {
            return Err(LedgerError::OpeningBalanceNotAllowed {
                code,
                account_type: input.account_type,
            });
        }
        if !has_money_precision(input.opening_balance) {
            return Err(LedgerError::InvalidAmount {
                amount: input.opening_balance,
                reason: "more than two decimal places",
            });
        }

        let parent_slot = match &input.parent {
            Some(parent) => {
                let slot = *self
                    .index
                    .get(parent)
                    .ok_or_else(|| LedgerError::ParentNotFound(parent.clone()))?;
                let parent_account = &self.accounts[slot];
                if parent_account.account_type != input.account_type {
                    return Err(LedgerError::ParentTypeMismatch {
                        parent: parent.clone(),
                        account_type: input.account_type,
                    });
                }
                // A parent with balance would strand it once it stops being a leaf.
                if parent_account.opening_balance_locked
                    || !parent_account.current_balance.is_zero()
                {
                    return Err(LedgerError::ParentHasPostings(parent.clone()));
                }
                Some(slot)
            }
            None => None,
        };

        if let Some(slot) = parent_slot {
            self.accounts[slot].child_count += 1;
        }

        let slot = self.accounts.len();
        self.accounts.push(Account {
            code: code.clone(),
            name: input.name,
            description: input.description,
            account_type: input.account_type,
            parent: input.parent,
            opening_balance: input.opening_balance,
            current_balance: input.opening_balance,
            opening_balance_locked: false,
            is_cash_account: input.is_cash_account,
            overdraft_allowed: input.overdraft_allowed,
            is_contra_account: input.is_contra_account,
            is_fixed_deposit: input.is_fixed_deposit,
            is_active: true,
            child_count: 0,
        });
        self.index.insert(code, slot);
        Ok(&self.accounts[slot])
    }

    /// Looks up an account by code.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&Account> {
        self.index.get(code).map(|&slot| &self.accounts[slot])
    }

    /// Looks up an account, failing with `AccountNotFound`.
    pub fn require(&self, code: &str) -> Result<&Account, LedgerError> {
        self.get(code)
            .ok_or_else(|| LedgerError::AccountNotFound(code.to_string()))
    }

    /// Returns true iff the account exists, is active and has no children.
    #[must_use]
    pub fn is_postable(&self, code: &str) -> bool {
        self.get(code).is_some_and(Account::is_postable)
    }

    /// Applies a posting to an account's balance.
    ///
    /// Computes the delta by the normal-balance rule, adds it to the balance
    /// and permanently locks the opening balance. Returns the new balance.
    pub fn apply_posting(
        &mut self,
        code: &str,
        debit: Decimal,
        credit: Decimal,
    ) -> Result<Decimal, LedgerError> {
        let slot = *self
            .index
            .get(code)
            .ok_or_else(|| LedgerError::AccountNotFound(code.to_string()))?;
        let account = &mut self.accounts[slot];
        account.current_balance += account.normal_balance().balance_change(debit, credit);
        account.opening_balance_locked = true;
        Ok(account.current_balance)
    }

    /// Changes the opening balance of an account that has not been posted to.
    pub fn set_opening_balance(&mut self, code: &str, amount: Decimal) -> Result<&Account, LedgerError> {
        let slot = *self
            .index
            .get(code)
            .ok_or_else(|| LedgerError::AccountNotFound(code.to_string()))?;
        let account = &mut self.accounts[slot];
        if account.opening_balance_locked {
            return Err(LedgerError::OpeningBalanceLocked(code.to_string()));
        }
        if !amount.is_zero() && !account.account_type.allows_opening_balance() {
            return Err(LedgerError::OpeningBalanceNotAllowed {
                code: code.to_string(),
                account_type: account.account_type,
            });
        }
        if !has_money_precision(amount) {
            return Err(LedgerError::InvalidAmount {
                amount,
                reason: "more than two decimal places",
            });
        }
        account.current_balance = account.current_balance - account.opening_balance + amount;
        account.opening_balance = amount;
        Ok(account)
    }

    /// Soft-deactivates an account.
    pub fn deactivate(&mut self, code: &str) -> Result<&Account, LedgerError> {
        let slot = *self
            .index
            .get(code)
            .ok_or_else(|| LedgerError::AccountNotFound(code.to_string()))?;
        self.accounts[slot].is_active = false;
        Ok(&self.accounts[slot])
    }

    /// Iterates over all accounts in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.accounts.iter()
    }

    /// Iterates over the direct children of an account.
    pub fn children<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Account> + 'a {
        self.accounts
            .iter()
            .filter(move |a| a.parent.as_deref() == Some(code))
    }

    /// Number of accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Returns true if the chart has no accounts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::AccountType;
    use rust_decimal_macros::dec;

    fn chart() -> ChartOfAccounts {
        let mut chart = ChartOfAccounts::new();
        chart
            .create_account(NewAccount::new("100", "Assets", AccountType::Asset))
            .unwrap();
        chart
            .create_account(NewAccount::new("1100", "Bank", AccountType::Asset).with_parent("100"))
            .unwrap();
        chart
            .create_account(NewAccount::new("4000", "Sales", AccountType::Income))
            .unwrap();
        chart
    }

    #[test]
    fn test_parent_becomes_non_leaf() {
        let chart = chart();
        assert!(!chart.is_postable("100"));
        assert!(chart.is_postable("1100"));
        assert!(!chart.is_postable("9999"));
        assert_eq!(chart.children("100").count(), 1);
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let mut chart = chart();
        let result = chart.create_account(NewAccount::new("1100", "Other", AccountType::Asset));
        assert!(matches!(result, Err(LedgerError::DuplicateAccountCode(code)) if code == "1100"));
    }

    #[test]
    fn test_income_opening_balance_rejected() {
        let mut chart = chart();
        let result = chart.create_account(
            NewAccount::new("4100", "Interest", AccountType::Income).with_opening_balance(dec!(10)),
        );
        assert!(matches!(
            result,
            Err(LedgerError::OpeningBalanceNotAllowed { account_type: AccountType::Income, .. })
        ));
    }

    #[test]
    fn test_parent_rules() {
        let mut chart = chart();
        let missing = chart.create_account(
            NewAccount::new("1200", "AR", AccountType::Asset).with_parent("999"),
        );
        assert!(matches!(missing, Err(LedgerError::ParentNotFound(_))));

        let mismatch = chart.create_account(
            NewAccount::new("2000", "AP", AccountType::Liability).with_parent("100"),
        );
        assert!(matches!(mismatch, Err(LedgerError::ParentTypeMismatch { .. })));

        chart.apply_posting("1100", dec!(10), Decimal::ZERO).unwrap();
        let posted = chart.create_account(
            NewAccount::new("1101", "Sub bank", AccountType::Asset).with_parent("1100"),
        );
        assert!(matches!(posted, Err(LedgerError::ParentHasPostings(_))));
    }

    #[test]
    fn test_apply_posting_uses_normal_balance() {
        let mut chart = chart();
        assert_eq!(chart.apply_posting("1100", dec!(500), Decimal::ZERO).unwrap(), dec!(500));
        assert_eq!(chart.apply_posting("1100", Decimal::ZERO, dec!(200)).unwrap(), dec!(300));
        assert_eq!(chart.apply_posting("4000", Decimal::ZERO, dec!(500)).unwrap(), dec!(500));
        assert!(chart.get("1100").unwrap().opening_balance_locked);
    }

    #[test]
    fn test_opening_balance_locks_after_posting() {
        let mut chart = chart();
        chart.set_opening_balance("1100", dec!(1000)).unwrap();
        assert_eq!(chart.get("1100").unwrap().current_balance, dec!(1000));

        chart.apply_posting("1100", dec!(1), Decimal::ZERO).unwrap();
        let result = chart.set_opening_balance("1100", dec!(5));
        assert!(matches!(result, Err(LedgerError::OpeningBalanceLocked(_))));
    }

    #[test]
    fn test_deactivated_account_not_postable() {
        let mut chart = chart();
        chart.deactivate("1100").unwrap();
        assert!(!chart.is_postable("1100"));
        assert!(chart.get("1100").is_some());
    }

    #[test]
    fn test_from_accounts_recomputes_leaves() {
        let original = chart();
        let restored = ChartOfAccounts::from_accounts(original.iter().cloned().collect());
        assert!(!restored.is_postable("100"));
        assert!(restored.is_postable("1100"));
        assert_eq!(restored.len(), 3);
    }
}
