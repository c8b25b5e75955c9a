//! Property-based tests for the reversal engine.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::posting::SubmitPosting;
use super::reversal::ReversalRequest;
use super::testing::{date, standard_ledger};
use super::types::{EntryStatus, PostingLine, PostingRequest, SourceModule};

const LEAVES: [&str; 6] = ["1100", "1200", "2000", "4000", "5000", "5300"];

fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..500_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn pair() -> impl Strategy<Value = (usize, usize, Decimal)> {
    (0usize..LEAVES.len(), 0usize..LEAVES.len(), amount())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Reversing an entry restores every touched balance exactly.
    #[test]
    fn prop_reversal_is_neutral(
        setup in prop::collection::vec(pair(), 0..4),
        target in prop::collection::vec(pair(), 1..4),
    ) {
        let mut state = standard_ledger();
        let post = |state: &mut crate::ledger::LedgerState, pairs: &[(usize, usize, Decimal)]| {
            let mut request = PostingRequest::new(SourceModule::Manual, date(2026, 8, 1), "X");
            for (dr, cr, a) in pairs {
                request.lines.push(PostingLine::account(LEAVES[*dr], *a, Decimal::ZERO, ""));
                request.lines.push(PostingLine::account(LEAVES[*cr], Decimal::ZERO, *a, ""));
            }
            state.submit_posting(request).unwrap()
        };
        for p in &setup {
            post(&mut state, std::slice::from_ref(p));
        }
        let before: Vec<_> = LEAVES
            .iter()
            .map(|c| state.chart().get(c).unwrap().current_balance)
            .collect();

        let entry = post(&mut state, &target);
        let reversal = state
            .reverse(entry.id, &ReversalRequest::new("prop", "tester"))
            .unwrap();

        let after: Vec<_> = LEAVES
            .iter()
            .map(|c| state.chart().get(c).unwrap().current_balance)
            .collect();
        prop_assert_eq!(before, after);
        prop_assert_eq!(reversal.total_debit, entry.total_credit);
        prop_assert_eq!(state.entry(entry.id).unwrap().status, EntryStatus::Reversed);

        let net: Decimal = entry
            .lines
            .iter()
            .chain(reversal.lines.iter())
            .map(|l| l.debit - l.credit)
            .sum();
        prop_assert_eq!(net, Decimal::ZERO);
    }
}
