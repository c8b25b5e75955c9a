//! The reversal engine.
//!
//! A reversal is a normal posting whose lines mirror the original with debit
//! and credit swapped. The original keeps its content; only its status moves
//! to `Reversed`.

use chrono::NaiveDate;
use folio_shared::types::EntryId;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;
use super::state::LedgerState;
use super::types::{EntryStatus, EntryType, JournalEntry, PostingLine, PostingRequest, SourceModule};

/// Parameters of a reversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReversalRequest {
    /// Date of the reversal entry; defaults to the original's date.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Why the entry is reversed.
    pub reason: String,
    /// Acting user.
    pub user: String,
}

impl ReversalRequest {
    /// Reversal on the original's date.
    #[must_use]
    pub fn new(reason: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            date: None,
            reason: reason.into(),
            user: user.into(),
        }
    }

    /// Reversal on a specific date.
    #[must_use]
    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

/// Builds the mirror request for a posted entry.
pub fn reversal_request(original: &JournalEntry, request: &ReversalRequest) -> PostingRequest {
    let number = original
        .entry_number
        .clone()
        .unwrap_or_else(|| original.id.to_string());
    let mut posting = PostingRequest::new(
        SourceModule::Reversal,
        request.date.unwrap_or(original.date),
        format!("REV-{number}"),
    )
    .with_description(format!("Reversal of {number}: {}", request.reason))
    .with_source_id(original.id.to_string())
    .with_entry_type(EntryType::Reversal)
    .by(request.user.clone());
    posting.lines = original
        .lines
        .iter()
        .map(|line| {
            PostingLine::account(
                line.account_code.clone(),
                line.credit,
                line.debit,
                format!("Reversal: {}", line.description),
            )
        })
        .collect();
    posting
}

impl LedgerState {
    /// Reverses a posted entry and returns the reversal.
    ///
    /// # Errors
    ///
    /// `NotReversible` unless the original is `Posted`; otherwise any error a
    /// forward posting can raise (for example `PeriodLocked` on the reversal
    /// date).
    pub fn reverse(
        &mut self,
        id: EntryId,
        request: &ReversalRequest,
    ) -> Result<JournalEntry, LedgerError> {
        let original = self.entry(id)?;
        match original.status {
            EntryStatus::Posted => {}
            EntryStatus::Draft => {
                return Err(LedgerError::NotReversible {
                    id,
                    reason: "drafts are deleted, not reversed",
                });
            }
            EntryStatus::Reversed => {
                return Err(LedgerError::NotReversible {
                    id,
                    reason: "entry is already reversed",
                });
            }
        }
        if original.carry_forward {
            return Err(LedgerError::NotReversible {
                id,
                reason: "carry-forward entries do not affect balances",
            });
        }

        let posting = reversal_request(original, request);
        let reversal = self.submit_with(posting, Some(id), false)?;

        let original = self
            .journal
            .get_mut(id)
            .ok_or(LedgerError::EntryNotFound(id))?;
        original.status = EntryStatus::Reversed;
        original.reversed_by = Some(reversal.id);
        self.changes.entries.insert(id);
        Ok(reversal)
    }
}
