//! Property-based tests for the posting engine.
//!
//! - every posted entry balances to the cent
//! - unbalanced requests never touch the ledger
//! - the sum of debit-positive balances never moves

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::posting::SubmitPosting;
use super::state::LedgerState;
use super::testing::{date, standard_ledger};
use super::types::{PostingLine, PostingRequest, SourceModule};

const LEAVES: [&str; 8] = ["1000", "1100", "1200", "2000", "2100", "3200", "4000", "5000"];

/// Strategy for amounts from 0.01 to 10,000.00.
fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for a balanced set of lines: random debits, one balancing credit
/// split in two.
fn balanced_lines() -> impl Strategy<Value = Vec<PostingLine>> {
    (
        prop::collection::vec((0usize..LEAVES.len(), amount()), 1..5),
        0usize..LEAVES.len(),
        0usize..LEAVES.len(),
    )
        .prop_map(|(debits, credit_a, credit_b)| {
            let total: Decimal = debits.iter().map(|(_, a)| *a).sum();
            let half = (total / Decimal::TWO).round_dp(2);
            let (first, second) = if half.is_zero() {
                (total, Decimal::ZERO)
            } else {
                (half, total - half)
            };
            let mut lines: Vec<_> = debits
                .into_iter()
                .map(|(i, a)| PostingLine::account(LEAVES[i], a, Decimal::ZERO, "dr"))
                .collect();
            lines.push(PostingLine::account(LEAVES[credit_a], Decimal::ZERO, first, "cr"));
            if !second.is_zero() {
                lines.push(PostingLine::account(LEAVES[credit_b], Decimal::ZERO, second, "cr"));
            }
            lines
        })
}

fn request(lines: Vec<PostingLine>) -> PostingRequest {
    let mut request = PostingRequest::new(SourceModule::Manual, date(2026, 5, 20), "P");
    request.lines = lines;
    request
}

/// Σ debit-positive balances over all accounts.
fn debit_positive_total(state: &LedgerState) -> Decimal {
    state
        .chart()
        .iter()
        .map(|a| a.normal_balance().to_debit_positive(a.current_balance))
        .sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Posted entries always carry equal cached totals.
    #[test]
    fn prop_posted_entries_balance(batches in prop::collection::vec(balanced_lines(), 1..6)) {
        let mut state = standard_ledger();
        for lines in batches {
            let entry = state.submit_posting(request(lines)).unwrap();
            prop_assert_eq!(entry.total_debit, entry.total_credit);
            prop_assert_eq!(entry.line_totals(), (entry.total_debit, entry.total_credit));
        }
        prop_assert_eq!(debit_positive_total(&state), Decimal::ZERO);
    }

    /// An unbalanced request fails with `Unbalanced` and changes nothing.
    #[test]
    fn prop_unbalanced_rejected(lines in balanced_lines(), skew in amount()) {
        let mut state = standard_ledger();
        let mut lines = lines;
        lines[0].debit += skew;
        let before = debit_positive_total(&state);

        let result = state.submit_posting(request(lines));
        let is_unbalanced = matches!(result, Err(LedgerError::Unbalanced { .. }));
        prop_assert!(is_unbalanced);
        prop_assert!(state.journal().is_empty());
        prop_assert_eq!(debit_positive_total(&state), before);
    }

    /// Entry numbers are gapless in commit order.
    #[test]
    fn prop_numbers_are_gapless(batches in prop::collection::vec(balanced_lines(), 1..8)) {
        let mut state = standard_ledger();
        let count = batches.len();
        for lines in batches {
            state.submit_posting(request(lines)).unwrap();
        }
        let mut numbers: Vec<_> = state
            .journal()
            .iter()
            .filter_map(|e| e.posting_sequence.zip(e.entry_number.clone()))
            .collect();
        numbers.sort();
        for (i, (_, number)) in numbers.iter().enumerate() {
            prop_assert_eq!(number, &format!("JV-2026-{:04}", i + 1));
        }
        prop_assert_eq!(numbers.len(), count);
    }
}
