//! The ledger state: every aggregate the posting engine writes to.
//!
//! A `LedgerState` is a plain value. The store clones it, runs one operation
//! against the clone and swaps it in on success, so every `&mut self` method
//! here can fail half way without leaving a trace. Each mutation records what
//! it touched in the [`ChangeSet`] so the persistence layer writes only those
//! rows.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use folio_shared::LedgerConfig;
use folio_shared::types::{EntryId, FiscalYearId, OpenItemId, PaymentId, PeriodId, StatementId};
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::journal::Journal;
use super::types::{JournalEntry, JournalLine, SourceModule};
use crate::assets::{AssetRegister, FixedAsset};
use crate::chart::{Account, ChartOfAccounts, NewAccount};
use crate::determination::{AccountMapping, AccountMappings, TransactionType};
use crate::fiscal::{AccountingPeriod, FiscalCalendar, FiscalYear};
use crate::reconciliation::{BankStatement, StatementBook};
use crate::subledger::{ChequeRegister, OpenItem, PaymentRecord, PdcCheque, Subledger};

/// Keys of the rows changed by one commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Account codes.
    pub accounts: BTreeSet<String>,
    /// Inserted or updated entries.
    pub entries: BTreeSet<EntryId>,
    /// Deleted draft entries.
    pub deleted_entries: BTreeSet<EntryId>,
    /// Fiscal years.
    pub fiscal_years: BTreeSet<FiscalYearId>,
    /// Accounting periods.
    pub periods: BTreeSet<PeriodId>,
    /// Mapping rows; a key missing from the state means the row was removed.
    pub mappings: BTreeSet<TransactionType>,
    /// Numbering counters.
    pub sequences: BTreeSet<(String, i32)>,
    /// Open items.
    pub open_items: BTreeSet<OpenItemId>,
    /// Payment records.
    pub payments: BTreeSet<PaymentId>,
    /// Fixed asset codes.
    pub assets: BTreeSet<String>,
    /// Post-dated cheque numbers.
    pub cheques: BTreeSet<String>,
    /// Bank statements.
    pub statements: BTreeSet<StatementId>,
}

impl ChangeSet {
    /// Returns true if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
            && self.entries.is_empty()
            && self.deleted_entries.is_empty()
            && self.fiscal_years.is_empty()
            && self.periods.is_empty()
            && self.mappings.is_empty()
            && self.sequences.is_empty()
            && self.open_items.is_empty()
            && self.payments.is_empty()
            && self.assets.is_empty()
            && self.cheques.is_empty()
            && self.statements.is_empty()
    }
}

/// Stored rows a ledger state is rebuilt from.
#[derive(Debug, Clone, Default)]
pub struct LedgerParts {
    /// Ledger settings.
    pub settings: LedgerConfig,
    /// Accounts, any order.
    pub accounts: Vec<Account>,
    /// Fiscal years.
    pub fiscal_years: Vec<FiscalYear>,
    /// Accounting periods.
    pub periods: Vec<AccountingPeriod>,
    /// Account determination rows.
    pub mappings: Vec<AccountMapping>,
    /// Journal entries with their lines.
    pub entries: Vec<JournalEntry>,
    /// Numbering counters keyed by prefix and year.
    pub sequences: Vec<((String, i32), u32)>,
    /// Receivables and payables.
    pub open_items: Vec<OpenItem>,
    /// Payment records.
    pub payments: Vec<PaymentRecord>,
    /// Fixed assets.
    pub assets: Vec<FixedAsset>,
    /// Post-dated cheques.
    pub cheques: Vec<PdcCheque>,
    /// Bank statements.
    pub statements: Vec<BankStatement>,
}

/// All ledger aggregates.
#[derive(Debug, Clone, Default)]
pub struct LedgerState {
    pub(crate) settings: LedgerConfig,
    pub(crate) chart: ChartOfAccounts,
    pub(crate) calendar: FiscalCalendar,
    pub(crate) mappings: AccountMappings,
    pub(crate) journal: Journal,
    pub(crate) subledger: Subledger,
    pub(crate) assets: AssetRegister,
    pub(crate) cheques: ChequeRegister,
    pub(crate) statements: StatementBook,
    pub(crate) changes: ChangeSet,
}

impl LedgerState {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new(settings: LedgerConfig) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Rebuilds a ledger from stored rows.
    #[must_use]
    pub fn from_parts(parts: LedgerParts) -> Self {
        Self {
            settings: parts.settings,
            chart: ChartOfAccounts::from_accounts(parts.accounts),
            calendar: FiscalCalendar::from_parts(parts.fiscal_years, parts.periods),
            mappings: AccountMappings::from_rows(parts.mappings),
            journal: Journal::from_parts(parts.entries, parts.sequences),
            subledger: Subledger::from_parts(parts.open_items, parts.payments),
            assets: AssetRegister::from_assets(parts.assets),
            cheques: ChequeRegister::from_cheques(parts.cheques),
            statements: StatementBook::from_statements(parts.statements),
            changes: ChangeSet::default(),
        }
    }

    // ---- read access ----

    /// Ledger settings.
    #[must_use]
    pub fn settings(&self) -> &LedgerConfig {
        &self.settings
    }

    /// Chart of accounts.
    #[must_use]
    pub fn chart(&self) -> &ChartOfAccounts {
        &self.chart
    }

    /// Fiscal calendar.
    #[must_use]
    pub fn calendar(&self) -> &FiscalCalendar {
        &self.calendar
    }

    /// Account determination table.
    #[must_use]
    pub fn mappings(&self) -> &AccountMappings {
        &self.mappings
    }

    /// Journal.
    #[must_use]
    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Looks up an entry, failing with `EntryNotFound`.
    pub fn entry(&self, id: EntryId) -> Result<&JournalEntry, LedgerError> {
        self.journal.get(id).ok_or(LedgerError::EntryNotFound(id))
    }

    /// Receivables, payables and payments.
    #[must_use]
    pub fn subledger(&self) -> &Subledger {
        &self.subledger
    }

    /// Fixed asset register.
    #[must_use]
    pub fn assets(&self) -> &AssetRegister {
        &self.assets
    }

    /// Post-dated cheque register.
    #[must_use]
    pub fn cheques(&self) -> &ChequeRegister {
        &self.cheques
    }

    /// Bank statements.
    #[must_use]
    pub fn statements(&self) -> &StatementBook {
        &self.statements
    }

    /// Changes recorded since the last commit.
    #[must_use]
    pub fn pending_changes(&self) -> &ChangeSet {
        &self.changes
    }

    pub(crate) fn take_changes(&mut self) -> ChangeSet {
        std::mem::take(&mut self.changes)
    }

    // ---- chart of accounts ----

    /// Creates an account.
    pub fn create_account(&mut self, input: NewAccount) -> Result<Account, LedgerError> {
        let parent = input.parent.clone();
        let account = self.chart.create_account(input)?.clone();
        self.changes.accounts.insert(account.code.clone());
        if let Some(parent) = parent {
            self.changes.accounts.insert(parent);
        }
        Ok(account)
    }

    /// Sets the opening balance of an account that has never been posted to.
    pub fn set_opening_balance(&mut self, code: &str, amount: Decimal) -> Result<Account, LedgerError> {
        let account = self.chart.set_opening_balance(code, amount)?.clone();
        self.changes.accounts.insert(account.code.clone());
        Ok(account)
    }

    /// Soft-deactivates an account.
    pub fn deactivate_account(&mut self, code: &str) -> Result<Account, LedgerError> {
        let account = self.chart.deactivate(code)?.clone();
        self.changes.accounts.insert(account.code.clone());
        Ok(account)
    }

    // ---- account determination ----

    /// Maps a transaction type to an account.
    pub fn set_mapping(
        &mut self,
        transaction_type: TransactionType,
        account_code: &str,
    ) -> Result<AccountMapping, LedgerError> {
        self.mappings.set(&self.chart, transaction_type, account_code)?;
        self.changes.mappings.insert(transaction_type);
        Ok(AccountMapping {
            transaction_type,
            account_code: account_code.to_string(),
        })
    }

    /// Removes a mapping so the fallback code applies again.
    pub fn remove_mapping(&mut self, transaction_type: TransactionType) -> bool {
        let removed = self.mappings.remove(transaction_type);
        if removed {
            self.changes.mappings.insert(transaction_type);
        }
        removed
    }

    /// Resolves a transaction type to a postable account code.
    pub fn resolve(
        &self,
        transaction_type: TransactionType,
        fallback_code: Option<&str>,
    ) -> Result<String, LedgerError> {
        self.mappings
            .resolve(&self.chart, transaction_type, fallback_code)
            .map(|account| account.code.clone())
    }

    // ---- fiscal calendar ----

    /// Creates a fiscal year with monthly periods.
    pub fn create_fiscal_year(
        &mut self,
        name: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FiscalYear, LedgerError> {
        let year = self.calendar.create_year(name, start, end)?.clone();
        self.record_year(year.id);
        Ok(year)
    }

    /// Locks an open period.
    pub fn lock_period(&mut self, id: PeriodId) -> Result<AccountingPeriod, LedgerError> {
        let period = self.calendar.lock_period(id)?.clone();
        self.changes.periods.insert(id);
        Ok(period)
    }

    /// Reopens a locked period.
    pub fn unlock_period(&mut self, id: PeriodId) -> Result<AccountingPeriod, LedgerError> {
        let period = self.calendar.unlock_period(id)?.clone();
        self.changes.periods.insert(id);
        Ok(period)
    }

    pub(crate) fn record_year(&mut self, id: FiscalYearId) {
        self.changes.fiscal_years.insert(id);
        let periods: Vec<_> = self.calendar.periods_of(id).map(|p| p.id).collect();
        self.changes.periods.extend(periods);
    }

    // ---- derived reads ----

    /// Lines of every entry that counts in reports, in commit order.
    pub fn posted_lines(&self) -> impl Iterator<Item = (&JournalEntry, &JournalLine)> {
        self.journal
            .iter()
            .filter(|e| e.counts_in_reports())
            .flat_map(|e| e.lines.iter().map(move |line| (e, line)))
    }

    /// Normal-side balance of an account as of a date, opening balance included.
    pub fn balance_as_of(&self, code: &str, as_of: NaiveDate) -> Result<Decimal, LedgerError> {
        let account = self.chart.require(code)?;
        let side = account.normal_balance();
        let movement: Decimal = self
            .posted_lines()
            .filter(|(entry, line)| entry.date <= as_of && line.account_code == code)
            .map(|(_, line)| side.balance_change(line.debit, line.credit))
            .sum();
        Ok(account.opening_balance + movement)
    }

    /// Source module used for classification; reversals inherit the
    /// original's source.
    #[must_use]
    pub fn effective_source(&self, entry: &JournalEntry) -> SourceModule {
        entry
            .reversal_of
            .and_then(|id| self.journal.get(id))
            .map_or(entry.source_module, |original| original.source_module)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::AccountType;
    use rust_decimal_macros::dec;

    #[test]
    fn test_chart_mutations_are_recorded() {
        let mut state = LedgerState::new(LedgerConfig::default());
        state
            .create_account(NewAccount::new("100", "Assets", AccountType::Asset))
            .unwrap();
        state
            .create_account(NewAccount::new("1100", "Bank", AccountType::Asset).with_parent("100"))
            .unwrap();
        state.set_opening_balance("1100", dec!(250)).unwrap();

        let changes = state.take_changes();
        assert_eq!(changes.accounts.len(), 2);
        assert!(changes.accounts.contains("100"));
        assert!(state.pending_changes().is_empty());
        assert_eq!(
            state.balance_as_of("1100", NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()),
            Ok(dec!(250))
        );
    }

    #[test]
    fn test_mapping_removal_is_recorded() {
        let mut state = LedgerState::new(LedgerConfig::default());
        state
            .create_account(NewAccount::new("1650", "PDC", AccountType::Asset))
            .unwrap();
        state.set_mapping(TransactionType::PdcControl, "1650").unwrap();
        assert_eq!(state.resolve(TransactionType::PdcControl, None), Ok("1650".into()));
        state.take_changes();

        assert!(state.remove_mapping(TransactionType::PdcControl));
        assert!(!state.remove_mapping(TransactionType::PdcControl));
        assert!(state.pending_changes().mappings.contains(&TransactionType::PdcControl));
        assert!(matches!(
            state.resolve(TransactionType::PdcControl, None),
            Err(LedgerError::UnresolvedAccount { .. })
        ));
    }

    #[test]
    fn test_fiscal_year_records_periods() {
        let mut state = LedgerState::new(LedgerConfig::default());
        let year = state
            .create_fiscal_year(
                "FY2026",
                NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
            )
            .unwrap();
        assert!(state.pending_changes().fiscal_years.contains(&year.id));
        assert_eq!(state.pending_changes().periods.len(), 12);
    }
}
