//! Account types and the account record.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::balance::NormalBalance;

/// Account classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Resources owned.
    Asset,
    /// Obligations owed.
    Liability,
    /// Owners' residual interest.
    Equity,
    /// Revenue and other income.
    Income,
    /// Costs incurred.
    Expense,
}

impl AccountType {
    /// All account types in statement order.
    pub const ALL: [Self; 5] = [
        Self::Asset,
        Self::Liability,
        Self::Equity,
        Self::Income,
        Self::Expense,
    ];

    /// Returns true for debit-normal types (Asset, Expense).
    #[must_use]
    pub const fn normal_balance_is_debit(self) -> bool {
        matches!(self, Self::Asset | Self::Expense)
    }

    /// Returns the normal balance side.
    #[must_use]
    pub const fn normal_balance(self) -> NormalBalance {
        if self.normal_balance_is_debit() {
            NormalBalance::Debit
        } else {
            NormalBalance::Credit
        }
    }

    /// Returns true for Asset, Liability and Equity.
    #[must_use]
    pub const fn is_balance_sheet(self) -> bool {
        matches!(self, Self::Asset | Self::Liability | Self::Equity)
    }

    /// Only balance sheet accounts may start with a nonzero balance.
    #[must_use]
    pub const fn allows_opening_balance(self) -> bool {
        self.is_balance_sheet()
    }

    /// Returns the lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asset" => Ok(Self::Asset),
            "liability" => Ok(Self::Liability),
            "equity" => Ok(Self::Equity),
            "income" | "revenue" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown account type: {s}")),
        }
    }
}

/// A node in the chart of accounts.
///
/// Balances are kept on the account's normal side: a positive balance on a
/// liability is a credit balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique account code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Account classification.
    pub account_type: AccountType,
    /// Parent account code.
    pub parent: Option<String>,
    /// Balance before any posting.
    pub opening_balance: Decimal,
    /// Opening balance plus every posting applied so far.
    pub current_balance: Decimal,
    /// Set once the first posting touches the account.
    pub opening_balance_locked: bool,
    /// Cash or bank account (drives the cash flow statement).
    pub is_cash_account: bool,
    /// Negative balance expected (bank overdraft).
    pub overdraft_allowed: bool,
    /// Carries the opposite normal side of its type (accumulated depreciation).
    #[serde(default)]
    pub is_contra_account: bool,
    /// Term deposit held in a cash account; kept out of the cash flow.
    #[serde(default)]
    pub is_fixed_deposit: bool,
    /// Soft-deactivation flag; accounts are never deleted.
    pub is_active: bool,
    #[serde(skip)]
    pub(crate) child_count: u32,
}

impl Account {
    /// Rebuilds a stored account. Leaf status is recomputed by
    /// [`ChartOfAccounts::from_accounts`](super::ChartOfAccounts::from_accounts).
    #[must_use]
    pub fn restore(
        input: NewAccount,
        current_balance: Decimal,
        opening_balance_locked: bool,
        is_active: bool,
    ) -> Self {
        Self {
            code: input.code,
            name: input.name,
            description: input.description,
            account_type: input.account_type,
            parent: input.parent,
            opening_balance: input.opening_balance,
            current_balance,
            opening_balance_locked,
            is_cash_account: input.is_cash_account,
            overdraft_allowed: input.overdraft_allowed,
            is_contra_account: input.is_contra_account,
            is_fixed_deposit: input.is_fixed_deposit,
            is_active,
            child_count: 0,
        }
    }

    /// Returns true if the account has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.child_count == 0
    }

    /// Returns true if the account can receive postings.
    #[must_use]
    pub fn is_postable(&self) -> bool {
        self.is_leaf() && self.is_active
    }

    /// Returns the normal balance side of the account type.
    ///
    /// Stored balances always follow this side, contra or not, so a contra
    /// asset nets down its group on the balance sheet.
    #[must_use]
    pub fn normal_balance(&self) -> NormalBalance {
        self.account_type.normal_balance()
    }

    /// Returns the side a healthy balance sits on.
    ///
    /// Contra accounts flip the side of their type.
    #[must_use]
    pub fn display_side(&self) -> NormalBalance {
        match (self.is_contra_account, self.normal_balance()) {
            (false, side) => side,
            (true, NormalBalance::Debit) => NormalBalance::Credit,
            (true, NormalBalance::Credit) => NormalBalance::Debit,
        }
    }

    /// Turns a stored balance into its amount on [`display_side`](Self::display_side).
    #[must_use]
    pub fn display_balance(&self, balance: Decimal) -> Decimal {
        if self.is_contra_account { -balance } else { balance }
    }

    /// Returns true if the balance sits on the wrong side.
    ///
    /// Cash accounts with an overdraft facility are never abnormal.
    #[must_use]
    pub fn has_abnormal_balance(&self) -> bool {
        balance_is_abnormal(self, self.current_balance)
    }

    /// Returns true for cash accounts whose movements count as cash flow.
    #[must_use]
    pub fn counts_as_cash(&self) -> bool {
        self.is_cash_account && !self.is_fixed_deposit
    }
}

/// Abnormal-side rule for an arbitrary stored balance of `account`.
pub(crate) fn balance_is_abnormal(account: &Account, balance: Decimal) -> bool {
    let shown = account.display_balance(balance);
    shown.is_sign_negative()
        && !shown.is_zero()
        && !(account.is_cash_account && account.overdraft_allowed)
}

/// Input for creating an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
    /// Unique account code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Account classification.
    pub account_type: AccountType,
    /// Parent account code.
    #[serde(default)]
    pub parent: Option<String>,
    /// Opening balance on the normal side.
    #[serde(default)]
    pub opening_balance: Decimal,
    /// Cash or bank account.
    #[serde(default)]
    pub is_cash_account: bool,
    /// Negative balance expected.
    #[serde(default)]
    pub overdraft_allowed: bool,
    /// Opposite normal side to its type.
    #[serde(default)]
    pub is_contra_account: bool,
    /// Fixed deposit held in a cash account.
    #[serde(default)]
    pub is_fixed_deposit: bool,
}

impl NewAccount {
    /// Creates an input with zero opening balance and no parent.
    #[must_use]
    pub fn new(code: impl Into<String>, name: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            description: None,
            account_type,
            parent: None,
            opening_balance: Decimal::ZERO,
            is_cash_account: false,
            overdraft_allowed: false,
            is_contra_account: false,
            is_fixed_deposit: false,
        }
    }

    /// Places the account under a parent.
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Sets the opening balance.
    #[must_use]
    pub fn with_opening_balance(mut self, amount: Decimal) -> Self {
        self.opening_balance = amount;
        self
    }

    /// Flags the account as cash, optionally allowing overdraft.
    #[must_use]
    pub fn cash(mut self, overdraft_allowed: bool) -> Self {
        self.is_cash_account = true;
        self.overdraft_allowed = overdraft_allowed;
        self
    }

    /// Flags the account as contra to its type.
    #[must_use]
    pub fn contra(mut self) -> Self {
        self.is_contra_account = true;
        self
    }

    /// Flags a cash account as a fixed deposit.
    #[must_use]
    pub fn fixed_deposit(mut self) -> Self {
        self.is_cash_account = true;
        self.is_fixed_deposit = true;
        self
    }
}
