//! The posting engine: drafts, the commit step and `submit_posting`.
//!
//! `post` is the only code path that calls `ChartOfAccounts::apply_posting`.
//! Producers, the reversal engine, year-end close and reconciliation all go
//! through [`SubmitPosting`].

use chrono::{Datelike, Utc};
use folio_shared::types::{EntryId, FiscalYearId, PeriodId, has_money_precision};
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::state::LedgerState;
use super::types::{
    EntryStatus, EntryType, JournalEntry, JournalLine, LineTarget, PostingLine, PostingRequest,
};
use crate::fiscal::FiscalYearStatus;

/// The narrow capability every producer depends on.
pub trait SubmitPosting {
    /// Resolves, validates and posts a request as one atomic step.
    ///
    /// Returns the posted entry.
    fn submit_posting(&mut self, request: PostingRequest) -> Result<JournalEntry, LedgerError>;
}

impl SubmitPosting for LedgerState {
    fn submit_posting(&mut self, request: PostingRequest) -> Result<JournalEntry, LedgerError> {
        self.submit_with(request, None, false)
    }
}

/// Validates line amounts: non-negative, cent precision, exactly one side.
pub fn validate_line_amounts(lines: &[PostingLine]) -> Result<(), LedgerError> {
    for (index, line) in lines.iter().enumerate() {
        let line_number = u32::try_from(index + 1).unwrap_or(u32::MAX);
        if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
            return Err(LedgerError::InvalidLineAmount {
                line_number,
                reason: "amounts must not be negative",
            });
        }
        if !has_money_precision(line.debit) || !has_money_precision(line.credit) {
            return Err(LedgerError::InvalidLineAmount {
                line_number,
                reason: "amounts must have at most two decimal places",
            });
        }
        if line.debit.is_zero() == line.credit.is_zero() {
            return Err(LedgerError::InvalidLineAmount {
                line_number,
                reason: "exactly one of debit or credit must be nonzero",
            });
        }
    }
    Ok(())
}

fn check_line_count(count: usize) -> Result<(), LedgerError> {
    if count < 2 {
        return Err(LedgerError::InsufficientLines { count });
    }
    Ok(())
}

fn check_balance(debit: Decimal, credit: Decimal) -> Result<(), LedgerError> {
    if debit != credit {
        return Err(LedgerError::Unbalanced { debit, credit });
    }
    Ok(())
}

impl LedgerState {
    /// Creates a draft entry from a request.
    ///
    /// Line targets are resolved now; balance and period checks wait for
    /// `post`.
    pub fn create_draft(&mut self, request: PostingRequest) -> Result<JournalEntry, LedgerError> {
        let entry = self.draft_entry(request)?;
        self.changes.entries.insert(entry.id);
        self.journal.insert(entry.clone());
        Ok(entry)
    }

    fn draft_entry(&self, request: PostingRequest) -> Result<JournalEntry, LedgerError> {
        let lines = self.build_lines(&request.lines)?;
        Ok(JournalEntry {
            id: EntryId::new(),
            entry_number: None,
            date: request.date,
            reference: request.reference,
            description: request.description,
            status: EntryStatus::Draft,
            entry_type: request.entry_type,
            source_module: request.source_module,
            source_id: request.source_id,
            is_system_generated: request.is_system_generated,
            is_locked: false,
            carry_forward: false,
            fiscal_year_id: None,
            period_id: None,
            total_debit: Decimal::ZERO,
            total_credit: Decimal::ZERO,
            reversal_of: None,
            reversed_by: None,
            posting_sequence: None,
            created_by: request.user,
            created_at: Utc::now(),
            posted_at: None,
            posted_by: None,
            lines,
        })
    }

    /// Replaces the content of a manual draft.
    ///
    /// Source module, creator and system flag are kept.
    pub fn update_draft(
        &mut self,
        id: EntryId,
        request: PostingRequest,
    ) -> Result<JournalEntry, LedgerError> {
        if !self.entry(id)?.is_editable() {
            return Err(LedgerError::NotEditable(id));
        }
        let lines = self.build_lines(&request.lines)?;
        let entry = self
            .journal
            .get_mut(id)
            .ok_or(LedgerError::EntryNotFound(id))?;
        entry.date = request.date;
        entry.reference = request.reference;
        entry.description = request.description;
        entry.entry_type = request.entry_type;
        entry.lines = lines;
        let updated = entry.clone();
        self.changes.entries.insert(id);
        Ok(updated)
    }

    /// Deletes a manual draft. Posted entries are only ever reversed.
    pub fn delete_draft(&mut self, id: EntryId) -> Result<(), LedgerError> {
        if !self.entry(id)?.is_editable() {
            return Err(LedgerError::NotEditable(id));
        }
        self.journal.remove(id);
        self.changes.entries.remove(&id);
        self.changes.deleted_entries.insert(id);
        Ok(())
    }

    /// Posts a draft.
    ///
    /// Checks run in order and the first failure wins:
    /// 1. at least two lines (`InsufficientLines`)
    /// 2. debits equal credits (`Unbalanced`)
    /// 3. every account exists, is active and is a leaf
    /// 4. the date is postable in the fiscal calendar
    /// 5. the entry is still a draft (`AlreadyPosted`)
    pub fn post(&mut self, id: EntryId, user: &str) -> Result<JournalEntry, LedgerError> {
        let entry = self.entry(id)?;
        let (fiscal_year_id, period_id) = self.check_postable(entry)?;
        if entry.status != EntryStatus::Draft {
            return Err(LedgerError::AlreadyPosted(
                entry.entry_number.clone().unwrap_or_else(|| id.to_string()),
            ));
        }
        self.commit_entry(id, fiscal_year_id, period_id, user)
    }

    /// Checks 1 to 4 of `post`, without touching state.
    fn check_postable(&self, entry: &JournalEntry) -> Result<(FiscalYearId, PeriodId), LedgerError> {
        check_line_count(entry.lines.len())?;
        let (total_debit, total_credit) = entry.line_totals();
        check_balance(total_debit, total_credit)?;
        for line in &entry.lines {
            let account = self.chart.require(&line.account_code)?;
            if !account.is_active {
                return Err(LedgerError::AccountInactive(account.code.clone()));
            }
            if !account.is_leaf() {
                return Err(LedgerError::NonLeafPosting(account.code.clone()));
            }
        }
        if self.is_year_end_entry(entry) {
            self.calendar.assert_year_end_postable(entry.date)
        } else {
            self.calendar.assert_postable(entry.date)
        }
    }

    /// Closing entries of a year being closed and carry-forward memos.
    fn is_year_end_entry(&self, entry: &JournalEntry) -> bool {
        entry.carry_forward
            || (entry.entry_type == EntryType::Closing
                && self
                    .calendar
                    .year_for(entry.date)
                    .is_some_and(|y| y.status == FiscalYearStatus::Closing))
    }

    /// Applies balances, numbers the entry and marks it posted.
    fn commit_entry(
        &mut self,
        id: EntryId,
        fiscal_year_id: FiscalYearId,
        period_id: PeriodId,
        user: &str,
    ) -> Result<JournalEntry, LedgerError> {
        let entry = self.entry(id)?;
        let year = entry.date.year();
        let (total_debit, total_credit) = entry.line_totals();
        let lines = if entry.carry_forward {
            Vec::new()
        } else {
            entry.lines.clone()
        };

        for line in &lines {
            self.chart
                .apply_posting(&line.account_code, line.debit, line.credit)?;
            self.changes.accounts.insert(line.account_code.clone());
        }

        let prefix = self.settings.entry_prefix.clone();
        let (number, sequence) = self.journal.allocate(&prefix, year);
        self.changes.sequences.insert((prefix, year));

        let entry = self
            .journal
            .get_mut(id)
            .ok_or(LedgerError::EntryNotFound(id))?;
        entry.entry_number = Some(number);
        entry.status = EntryStatus::Posted;
        entry.is_locked = true;
        entry.fiscal_year_id = Some(fiscal_year_id);
        entry.period_id = Some(period_id);
        entry.total_debit = total_debit;
        entry.total_credit = total_credit;
        entry.posting_sequence = Some(sequence);
        entry.posted_at = Some(Utc::now());
        entry.posted_by = Some(user.to_string());
        let posted = entry.clone();
        self.changes.entries.insert(id);
        Ok(posted)
    }

    /// Creates and posts an entry in one step.
    ///
    /// Every check runs before the entry is added to the journal, so a
    /// rejected request leaves no draft behind.
    pub(crate) fn submit_with(
        &mut self,
        request: PostingRequest,
        reversal_of: Option<EntryId>,
        carry_forward: bool,
    ) -> Result<JournalEntry, LedgerError> {
        check_line_count(request.lines.len())?;
        validate_line_amounts(&request.lines)?;
        let (debit, credit) = request
            .lines
            .iter()
            .fold((Decimal::ZERO, Decimal::ZERO), |(d, c), l| (d + l.debit, c + l.credit));
        check_balance(debit, credit)?;

        let user = request.user.clone();
        let mut entry = self.draft_entry(request)?;
        entry.reversal_of = reversal_of;
        entry.carry_forward = carry_forward;
        let (fiscal_year_id, period_id) = self.check_postable(&entry)?;

        let id = entry.id;
        self.changes.entries.insert(id);
        self.journal.insert(entry);
        self.commit_entry(id, fiscal_year_id, period_id, &user)
    }

    fn build_lines(&self, lines: &[PostingLine]) -> Result<Vec<JournalLine>, LedgerError> {
        validate_line_amounts(lines)?;
        lines
            .iter()
            .enumerate()
            .map(|(index, line)| {
                let account_code = match &line.target {
                    LineTarget::Account(code) => self.chart.require(code)?.code.clone(),
                    LineTarget::Mapped {
                        transaction_type,
                        fallback_code,
                    } => self.resolve(*transaction_type, fallback_code.as_deref())?,
                };
                Ok(JournalLine {
                    line_number: u32::try_from(index + 1).unwrap_or(u32::MAX),
                    account_code,
                    description: line.description.clone(),
                    debit: line.debit,
                    credit: line.credit,
                })
            })
            .collect()
    }
}
