//! Double-entry bookkeeping: the journal, the posting engine and the store.
//!
//! - `types` - journal entries, lines and posting requests
//! - `posting` - drafts, the commit step and `submit_posting`
//! - `reversal` - mirror-image correction of posted entries
//! - `closing` - year-end close and carry-forward
//! - `state` / `store` - the transactional ledger store

pub mod balance;
pub mod closing;
pub mod error;
pub mod journal;
pub mod posting;
pub mod reversal;
pub mod state;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

#[cfg(test)]
mod posting_props;
#[cfg(test)]
mod reversal_props;

pub use balance::{NormalBalance, RunningBalance};
pub use closing::YearEndClose;
pub use error::{ErrorCategory, LedgerError};
pub use journal::{Journal, format_entry_number};
pub use posting::{SubmitPosting, validate_line_amounts};
pub use reversal::{ReversalRequest, reversal_request};
pub use state::{ChangeSet, LedgerParts, LedgerState};
pub use store::{CommitSink, InMemorySink, Ledger};
pub use types::{
    EntryStatus, EntryType, JournalEntry, JournalLine, LineTarget, PostingLine, PostingRequest,
    SourceModule,
};
