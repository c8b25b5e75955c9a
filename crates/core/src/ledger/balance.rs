//! Normal-balance arithmetic and running balances.
//!
//! - Asset/Expense: balance += debit - credit (debit-normal)
//! - Liability/Equity/Income: balance += credit - debit (credit-normal)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Side on which an account naturally accumulates value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalBalance {
    /// Debit-normal accounts (Asset, Expense).
    Debit,
    /// Credit-normal accounts (Liability, Equity, Income).
    Credit,
}

impl NormalBalance {
    /// Calculates the balance change for a debit/credit pair.
    #[must_use]
    pub fn balance_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Debit => debit - credit,
            Self::Credit => credit - debit,
        }
    }

    /// Converts a normal-side balance into debit-positive terms.
    #[must_use]
    pub fn to_debit_positive(self, balance: Decimal) -> Decimal {
        match self {
            Self::Debit => balance,
            Self::Credit => -balance,
        }
    }

    /// Converts a debit-positive net into a normal-side balance.
    #[must_use]
    pub fn from_debit_positive(self, net: Decimal) -> Decimal {
        self.to_debit_positive(net)
    }
}

/// Running balance after one ledger line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningBalance {
    /// Number of lines applied so far.
    pub line_count: u64,
    /// Balance before this line.
    pub previous_balance: Decimal,
    /// Balance after this line.
    pub current_balance: Decimal,
}

impl RunningBalance {
    /// Starts a chain at an opening balance.
    #[must_use]
    pub fn opening(balance: Decimal) -> Self {
        Self {
            line_count: 0,
            previous_balance: balance,
            current_balance: balance,
        }
    }

    /// Applies the next balance change.
    #[must_use]
    pub fn next(&self, balance_change: Decimal) -> Self {
        Self {
            line_count: self.line_count + 1,
            previous_balance: self.current_balance,
            current_balance: self.current_balance + balance_change,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(NormalBalance::Debit, dec!(100), dec!(0), dec!(100))]
    #[case(NormalBalance::Debit, dec!(0), dec!(40), dec!(-40))]
    #[case(NormalBalance::Credit, dec!(100), dec!(0), dec!(-100))]
    #[case(NormalBalance::Credit, dec!(0), dec!(40), dec!(40))]
    fn test_balance_change(
        #[case] side: NormalBalance,
        #[case] debit: Decimal,
        #[case] credit: Decimal,
        #[case] expected: Decimal,
    ) {
        assert_eq!(side.balance_change(debit, credit), expected);
    }

    #[test]
    fn test_debit_positive_conversion() {
        assert_eq!(NormalBalance::Credit.to_debit_positive(dec!(50)), dec!(-50));
        assert_eq!(NormalBalance::Debit.to_debit_positive(dec!(50)), dec!(50));
        assert_eq!(NormalBalance::Credit.from_debit_positive(dec!(-50)), dec!(50));
    }

    #[test]
    fn test_running_balance_from_opening() {
        let rb = RunningBalance::opening(dec!(1000)).next(dec!(250)).next(dec!(-100));
        assert_eq!(rb.line_count, 2);
        assert_eq!(rb.previous_balance, dec!(1250));
        assert_eq!(rb.current_balance, dec!(1150));
    }

    fn balance_change_strategy() -> impl Strategy<Value = Decimal> {
        (-100_000i64..100_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// A line's change seen from either side has opposite sign.
        #[test]
        fn prop_sides_are_mirror_images(
            debit in balance_change_strategy(),
            credit in balance_change_strategy(),
        ) {
            prop_assert_eq!(
                NormalBalance::Debit.balance_change(debit, credit),
                -NormalBalance::Credit.balance_change(debit, credit)
            );
        }

        /// The final running balance equals the opening plus every change.
        #[test]
        fn prop_final_balance_equals_opening_plus_changes(
            opening in balance_change_strategy(),
            changes in prop::collection::vec(balance_change_strategy(), 1..20),
        ) {
            let mut current = RunningBalance::opening(opening);
            for change in &changes {
                let next = current.next(*change);
                prop_assert_eq!(next.previous_balance, current.current_balance);
                current = next;
            }
            let expected = opening + changes.iter().copied().sum::<Decimal>();
            prop_assert_eq!(current.current_balance, expected);
            prop_assert_eq!(current.line_count, changes.len() as u64);
        }
    }
}
