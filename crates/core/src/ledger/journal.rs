//! Journal storage and gapless entry numbering.

use std::collections::BTreeMap;

use folio_shared::types::EntryId;

use super::types::JournalEntry;

/// Formats an entry number as `<PREFIX>-<YEAR>-<NNNN>`.
#[must_use]
pub fn format_entry_number(prefix: &str, year: i32, sequence: u32) -> String {
    format!("{prefix}-{year}-{sequence:04}")
}

/// Journal entries plus the numbering counters.
///
/// Counters advance only inside a commit, so a failed posting never burns a
/// number.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: BTreeMap<EntryId, JournalEntry>,
    sequences: BTreeMap<(String, i32), u32>,
    posting_counter: u64,
}

impl Journal {
    /// Rebuilds a journal from stored entries and counters.
    #[must_use]
    pub fn from_parts(
        entries: impl IntoIterator<Item = JournalEntry>,
        sequences: impl IntoIterator<Item = ((String, i32), u32)>,
    ) -> Self {
        let entries: BTreeMap<_, _> = entries.into_iter().map(|e| (e.id, e)).collect();
        let posting_counter = entries
            .values()
            .filter_map(|e| e.posting_sequence)
            .max()
            .unwrap_or(0);
        Self {
            entries,
            sequences: sequences.into_iter().collect(),
            posting_counter,
        }
    }

    /// Looks up an entry.
    #[must_use]
    pub fn get(&self, id: EntryId) -> Option<&JournalEntry> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: EntryId) -> Option<&mut JournalEntry> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn insert(&mut self, entry: JournalEntry) {
        self.entries.insert(entry.id, entry);
    }

    pub(crate) fn remove(&mut self, id: EntryId) -> Option<JournalEntry> {
        self.entries.remove(&id)
    }

    /// Iterates over every entry, drafts included.
    pub fn iter(&self) -> impl Iterator<Item = &JournalEntry> {
        self.entries.values()
    }

    /// Finds a posted entry by its number.
    #[must_use]
    pub fn by_number(&self, number: &str) -> Option<&JournalEntry> {
        self.entries
            .values()
            .find(|e| e.entry_number.as_deref() == Some(number))
    }

    /// Last issued sequence for a prefix and year.
    #[must_use]
    pub fn last_sequence(&self, prefix: &str, year: i32) -> u32 {
        self.sequences
            .get(&(prefix.to_string(), year))
            .copied()
            .unwrap_or(0)
    }

    /// Iterates over all numbering counters.
    pub fn sequences(&self) -> impl Iterator<Item = (&(String, i32), &u32)> {
        self.sequences.iter()
    }

    /// Issues the next entry number and posting sequence.
    pub(crate) fn allocate(&mut self, prefix: &str, year: i32) -> (String, u64) {
        let counter = self.sequences.entry((prefix.to_string(), year)).or_insert(0);
        *counter += 1;
        self.posting_counter += 1;
        (format_entry_number(prefix, year, *counter), self.posting_counter)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no entry exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
