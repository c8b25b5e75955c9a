//! Standard chart of accounts used by the seeder and the test fixtures.
//!
//! Leaf codes line up with the fallback codes of account determination, so a
//! freshly seeded ledger resolves every transaction type without mappings.

use super::account::{AccountType, NewAccount};
use AccountType::{Asset, Equity, Expense, Income, Liability};

/// Definition of one standard account.
#[derive(Debug, Clone, Copy)]
pub struct StandardAccount {
    /// Account code.
    pub code: &'static str,
    /// Account name.
    pub name: &'static str,
    /// Account type.
    pub account_type: AccountType,
    /// Parent group code.
    pub parent: Option<&'static str>,
    /// Cash or bank account.
    pub is_cash_account: bool,
    /// Overdraft facility.
    pub overdraft_allowed: bool,
    /// Opposite normal side to its type.
    pub is_contra_account: bool,
    /// Fixed deposit held in a cash account.
    pub is_fixed_deposit: bool,
}

impl StandardAccount {
    const fn group(code: &'static str, name: &'static str, account_type: AccountType) -> Self {
        Self {
            code,
            name,
            account_type,
            parent: None,
            is_cash_account: false,
            overdraft_allowed: false,
            is_contra_account: false,
            is_fixed_deposit: false,
        }
    }

    const fn leaf(
        code: &'static str,
        name: &'static str,
        account_type: AccountType,
        parent: &'static str,
    ) -> Self {
        Self {
            code,
            name,
            account_type,
            parent: Some(parent),
            is_cash_account: false,
            overdraft_allowed: false,
            is_contra_account: false,
            is_fixed_deposit: false,
        }
    }

    const fn cash(mut self, overdraft_allowed: bool) -> Self {
        self.is_cash_account = true;
        self.overdraft_allowed = overdraft_allowed;
        self
    }

    const fn contra(mut self) -> Self {
        self.is_contra_account = true;
        self
    }

    const fn fixed_deposit(mut self) -> Self {
        self.is_cash_account = true;
        self.is_fixed_deposit = true;
        self
    }

    /// Builds the creation input for this account.
    #[must_use]
    pub fn to_new_account(&self) -> NewAccount {
        let mut input = NewAccount::new(self.code, self.name, self.account_type);
        input.parent = self.parent.map(str::to_string);
        input.is_cash_account = self.is_cash_account;
        input.overdraft_allowed = self.overdraft_allowed;
        input.is_contra_account = self.is_contra_account;
        input.is_fixed_deposit = self.is_fixed_deposit;
        input
    }
}

/// Standard chart, parents before children.
pub const STANDARD_CHART: &[StandardAccount] = &[
    StandardAccount::group("100", "Assets", Asset),
    StandardAccount::leaf("1000", "Cash", Asset, "100").cash(false),
    StandardAccount::leaf("1100", "Bank", Asset, "100").cash(true),
    StandardAccount::leaf("1150", "Fixed Deposits", Asset, "100").fixed_deposit(),
    StandardAccount::leaf("1200", "Accounts Receivable", Asset, "100"),
    StandardAccount::leaf("1300", "VAT Recoverable", Asset, "100"),
    StandardAccount::leaf("1400", "Fixed Assets", Asset, "100"),
    StandardAccount::leaf("1401", "Accumulated Depreciation", Asset, "100").contra(),
    StandardAccount::leaf("1600", "PDC Control", Asset, "100"),
    StandardAccount::leaf("1700", "Vendor Advances", Asset, "100"),
    StandardAccount::leaf("9000", "Suspense", Asset, "100"),
    StandardAccount::group("200", "Liabilities", Liability),
    StandardAccount::leaf("2000", "Accounts Payable", Liability, "200"),
    StandardAccount::leaf("2100", "VAT Payable", Liability, "200"),
    StandardAccount::leaf("2110", "VAT Settlement", Liability, "200"),
    StandardAccount::leaf("2200", "Customer Advances", Liability, "200"),
    StandardAccount::leaf("2210", "Employee Payable", Liability, "200"),
    StandardAccount::leaf("2300", "Salary Payable", Liability, "200"),
    StandardAccount::leaf("2400", "Corporate Tax Payable", Liability, "200"),
    StandardAccount::group("300", "Equity", Equity),
    StandardAccount::leaf("3000", "Retained Earnings", Equity, "300"),
    StandardAccount::leaf("3100", "Opening Balance Equity", Equity, "300"),
    StandardAccount::leaf("3200", "Share Capital", Equity, "300"),
    StandardAccount::group("400", "Income", Income),
    StandardAccount::leaf("4000", "Sales Revenue", Income, "400"),
    StandardAccount::leaf("4100", "Bank Interest Income", Income, "400"),
    StandardAccount::leaf("4500", "Gain on Disposal", Income, "400"),
    StandardAccount::leaf("8000", "FX Gain", Income, "400"),
    StandardAccount::group("500", "Expenses", Expense),
    StandardAccount::leaf("5000", "General Expenses", Expense, "500"),
    StandardAccount::leaf("5100", "Salary Expense", Expense, "500"),
    StandardAccount::leaf("5300", "Depreciation Expense", Expense, "500"),
    StandardAccount::leaf("5400", "Loss on Disposal", Expense, "500"),
    StandardAccount::leaf("5900", "Corporate Tax Expense", Expense, "500"),
    StandardAccount::leaf("7000", "Bank Charges", Expense, "500"),
    StandardAccount::leaf("8100", "FX Loss", Expense, "500"),
];
