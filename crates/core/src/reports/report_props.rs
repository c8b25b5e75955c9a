//! Property tests for the trial balance and balance sheet.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::{ReportFilter, ReportService};
use crate::ledger::testing::{date, standard_ledger};
use crate::ledger::{PostingLine, PostingRequest, ReversalRequest, SourceModule, SubmitPosting};

const LEAVES: &[&str] = &[
    "1000", "1100", "1200", "1300", "2000", "2100", "3200", "4000", "5000", "7000",
];

fn posting_strategy() -> impl Strategy<Value = (usize, usize, i64, u32, bool)> {
    (
        0..LEAVES.len(),
        0..LEAVES.len(),
        1i64..1_000_000i64,
        1u32..=365,
        any::<bool>(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any set of posted entries, some reversed, keeps both columns equal
    /// and the accounting equation intact.
    #[test]
    fn prop_trial_balance_and_equation_hold(
        postings in prop::collection::vec(posting_strategy(), 1..25)
    ) {
        let mut state = standard_ledger();
        for (debit, credit, cents, day, reverse) in postings {
            if debit == credit {
                continue;
            }
            let amount = Decimal::new(cents, 2);
            let when = date(2026, 1, 1) + chrono::Duration::days(i64::from(day - 1));
            let mut request = PostingRequest::new(SourceModule::Manual, when, "P");
            request.lines = vec![
                PostingLine::account(LEAVES[debit], amount, Decimal::ZERO, ""),
                PostingLine::account(LEAVES[credit], Decimal::ZERO, amount, ""),
            ];
            let posted = state.submit_posting(request).unwrap();
            if reverse {
                state.reverse(posted.id, &ReversalRequest::new("test", "prop")).unwrap();
            }
        }

        let as_of = date(2026, 12, 31);
        let trial = ReportService::trial_balance(&state, as_of, &ReportFilter::all()).unwrap();
        prop_assert!(trial.totals.is_balanced);
        prop_assert!(trial.verify().is_ok());

        let sheet = ReportService::balance_sheet(&state, as_of);
        prop_assert!(sheet.is_balanced);
    }
}
