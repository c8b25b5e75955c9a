//! Transactional ledger store.
//!
//! Writers serialize on one commit lock. Each transaction runs against a
//! private clone of the current state; on success the changed rows go to the
//! [`CommitSink`] and the clone replaces the shared snapshot. Readers take the
//! current `Arc` and never see a half-applied operation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::error::LedgerError;
use super::state::{ChangeSet, LedgerState};

/// Destination of committed changes.
#[async_trait::async_trait]
pub trait CommitSink: Send + Sync {
    /// Durably stores the rows named in `changes`, reading them from `state`.
    ///
    /// An error aborts the commit; the in-memory state is left untouched.
    async fn persist(&self, state: &LedgerState, changes: &ChangeSet) -> Result<(), LedgerError>;
}

/// Sink for ledgers that live only in memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct InMemorySink;

#[async_trait::async_trait]
impl CommitSink for InMemorySink {
    async fn persist(&self, _state: &LedgerState, _changes: &ChangeSet) -> Result<(), LedgerError> {
        Ok(())
    }
}

/// Shared handle to the ledger.
pub struct Ledger {
    snapshot: RwLock<Arc<LedgerState>>,
    commit_lock: Mutex<()>,
    sink: Arc<dyn CommitSink>,
    version: AtomicU64,
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("version", &self.version())
            .finish_non_exhaustive()
    }
}

impl Ledger {
    /// Creates an in-memory ledger.
    #[must_use]
    pub fn new(state: LedgerState) -> Self {
        Self::with_sink(state, Arc::new(InMemorySink))
    }

    /// Creates a ledger that persists every commit through `sink`.
    #[must_use]
    pub fn with_sink(mut state: LedgerState, sink: Arc<dyn CommitSink>) -> Self {
        state.take_changes();
        Self {
            snapshot: RwLock::new(Arc::new(state)),
            commit_lock: Mutex::new(()),
            sink,
            version: AtomicU64::new(0),
        }
    }

    /// Latest committed state.
    #[must_use]
    pub fn snapshot(&self) -> Arc<LedgerState> {
        Arc::clone(&self.snapshot.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Number of commits since the ledger was opened.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Runs `op` as one all-or-nothing transaction.
    ///
    /// Either every change `op` made is persisted and published, or none is.
    pub async fn transact<F, T>(&self, op: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut LedgerState) -> Result<T, LedgerError> + Send,
        T: Send,
    {
        let _guard = self.commit_lock.lock().await;
        let mut next = LedgerState::clone(&self.snapshot());
        next.take_changes();

        let value = op(&mut next)?;
        let changes = next.take_changes();
        if changes.is_empty() {
            return Ok(value);
        }

        if let Err(e) = self.sink.persist(&next, &changes).await {
            warn!(error = %e, "commit not persisted, discarding changes");
            return Err(e);
        }
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(next);
        let version = self.version.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(version, entries = changes.entries.len(), "ledger commit");
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::testing::{date, standard_ledger};
    use crate::ledger::types::{PostingLine, PostingRequest, SourceModule};
    use crate::ledger::{EntryStatus, SubmitPosting};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::atomic::AtomicUsize;

    fn sale(amount: Decimal) -> PostingRequest {
        let mut request = PostingRequest::new(SourceModule::Manual, date(2026, 2, 3), "S");
        request.lines = vec![
            PostingLine::account("1100", amount, Decimal::ZERO, ""),
            PostingLine::account("4000", Decimal::ZERO, amount, ""),
        ];
        request
    }

    struct FailingSink;

    #[async_trait::async_trait]
    impl CommitSink for FailingSink {
        async fn persist(&self, _: &LedgerState, _: &ChangeSet) -> Result<(), LedgerError> {
            Err(LedgerError::Persistence("disk full".into()))
        }
    }

    #[derive(Default)]
    struct CountingSink {
        commits: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl CommitSink for CountingSink {
        async fn persist(&self, _: &LedgerState, changes: &ChangeSet) -> Result<(), LedgerError> {
            assert!(!changes.is_empty());
            self.commits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_failed_operation_leaves_no_trace() {
        let ledger = Ledger::new(standard_ledger());
        let mut bad = sale(dec!(10));
        bad.lines[0].target = crate::ledger::LineTarget::Account("100".into());

        let result = ledger.transact(|s| s.submit_posting(bad)).await;
        assert_eq!(result, Err(LedgerError::NonLeafPosting("100".into())));

        let snapshot = ledger.snapshot();
        assert!(snapshot.journal().is_empty());
        assert_eq!(ledger.version(), 0);
    }

    #[tokio::test]
    async fn test_persistence_failure_rolls_back() {
        let ledger = Ledger::with_sink(standard_ledger(), Arc::new(FailingSink));
        let result = ledger.transact(|s| s.submit_posting(sale(dec!(10)))).await;
        assert!(matches!(result, Err(LedgerError::Persistence(_))));
        assert_eq!(ledger.snapshot().chart().get("1100").unwrap().current_balance, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_read_only_transaction_skips_sink() {
        let sink = Arc::new(CountingSink::default());
        let ledger = Ledger::with_sink(standard_ledger(), sink.clone());
        let count = ledger.transact(|s| Ok(s.journal().len())).await.unwrap();
        assert_eq!(count, 0);
        ledger.transact(|s| s.submit_posting(sale(dec!(1)))).await.unwrap();
        assert_eq!(sink.commits.load(Ordering::SeqCst), 1);
        assert_eq!(ledger.version(), 1);
    }

    #[tokio::test]
    async fn test_snapshot_is_stable_across_commits() {
        let ledger = Ledger::new(standard_ledger());
        let before = ledger.snapshot();
        ledger.transact(|s| s.submit_posting(sale(dec!(5)))).await.unwrap();
        assert!(before.journal().is_empty());
        assert_eq!(ledger.snapshot().journal().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_posting_is_serialized() {
        let ledger = Arc::new(Ledger::new(standard_ledger()));
        let id = ledger
            .transact(|s| s.create_draft(sale(dec!(100))))
            .await
            .unwrap()
            .id;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let ledger = Arc::clone(&ledger);
            handles.push(tokio::spawn(async move {
                ledger.transact(move |s| s.post(id, "worker")).await
            }));
        }
        let mut wins = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(entry) => {
                    assert_eq!(entry.status, EntryStatus::Posted);
                    wins += 1;
                }
                Err(err) => assert!(matches!(err, LedgerError::AlreadyPosted(_))),
            }
        }
        assert_eq!(wins, 1);
        assert_eq!(
            ledger.snapshot().chart().get("1100").unwrap().current_balance,
            dec!(100)
        );

        let mut handles = Vec::new();
        for i in 0..10 {
            let ledger = Arc::clone(&ledger);
            handles.push(tokio::spawn(async move {
                ledger
                    .transact(move |s| s.submit_posting(sale(Decimal::from(i + 1))))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        let snapshot = ledger.snapshot();
        assert_eq!(snapshot.chart().get("1100").unwrap().current_balance, dec!(155));
        assert_eq!(snapshot.journal().last_sequence("JV", 2026), 11);
    }
}
