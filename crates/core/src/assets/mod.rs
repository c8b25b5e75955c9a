//! Fixed asset register and depreciation schedules.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use folio_shared::types::{EntryId, round_money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::LedgerError;

/// Depreciation method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepreciationMethod {
    /// `(cost - salvage) / months` every month.
    StraightLine,
    /// Double declining balance: `book * 2 / months`.
    DecliningBalance,
}

/// Asset lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    /// In service and depreciating.
    Active,
    /// Book value has reached salvage value.
    FullyDepreciated,
    /// Sold or scrapped.
    Disposed,
}

/// A capitalised asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedAsset {
    /// Unique asset code.
    pub code: String,
    /// Description.
    pub name: String,
    /// Date placed in service.
    pub acquisition_date: NaiveDate,
    /// Capitalised cost.
    pub acquisition_cost: Decimal,
    /// Residual value at end of life.
    pub salvage_value: Decimal,
    /// Useful life in months.
    pub useful_life_months: u32,
    /// Depreciation method.
    pub method: DepreciationMethod,
    /// Depreciation booked so far.
    pub accumulated_depreciation: Decimal,
    /// Number of monthly runs booked.
    pub depreciation_runs: u32,
    /// Last day of the last depreciated month.
    pub last_depreciation_date: Option<NaiveDate>,
    /// Lifecycle status.
    pub status: AssetStatus,
    /// Acquisition posting.
    pub acquisition_entry: Option<EntryId>,
    /// Disposal posting.
    pub disposal_entry: Option<EntryId>,
}

impl FixedAsset {
    /// Cost less accumulated depreciation.
    #[must_use]
    pub fn book_value(&self) -> Decimal {
        self.acquisition_cost - self.accumulated_depreciation
    }

    /// Depreciation left before book value reaches salvage.
    #[must_use]
    pub fn depreciable_remaining(&self) -> Decimal {
        (self.book_value() - self.salvage_value).max(Decimal::ZERO)
    }

    /// Charge for the next monthly run.
    ///
    /// The final run of the useful life takes whatever is left, and no run
    /// takes the book value below salvage.
    #[must_use]
    pub fn monthly_charge(&self) -> Decimal {
        let remaining = self.depreciable_remaining();
        if remaining.is_zero() || self.useful_life_months == 0 {
            return remaining;
        }
        let months = Decimal::from(self.useful_life_months);
        let base = match self.method {
            DepreciationMethod::StraightLine => {
                round_money((self.acquisition_cost - self.salvage_value) / months)
            }
            DepreciationMethod::DecliningBalance => {
                round_money(self.book_value() * Decimal::TWO / months)
            }
        };
        if self.depreciation_runs + 1 >= self.useful_life_months {
            remaining
        } else {
            base.min(remaining)
        }
    }

    /// Returns true if a run for the month of `date` was already booked.
    #[must_use]
    pub fn depreciated_in_month(&self, date: NaiveDate) -> bool {
        self.last_depreciation_date
            .is_some_and(|last| last.year() == date.year() && last.month() == date.month())
    }
}

/// Registration input for an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFixedAsset {
    /// Unique asset code.
    pub code: String,
    /// Description.
    pub name: String,
    /// Date placed in service.
    pub acquisition_date: NaiveDate,
    /// Capitalised cost.
    pub acquisition_cost: Decimal,
    /// Residual value.
    #[serde(default)]
    pub salvage_value: Decimal,
    /// Useful life in months.
    pub useful_life_months: u32,
    /// Depreciation method.
    pub method: DepreciationMethod,
}

/// All fixed assets keyed by code.
#[derive(Debug, Clone, Default)]
pub struct AssetRegister {
    assets: BTreeMap<String, FixedAsset>,
}

impl AssetRegister {
    /// Rebuilds the register from stored rows.
    #[must_use]
    pub fn from_assets(assets: impl IntoIterator<Item = FixedAsset>) -> Self {
        Self {
            assets: assets.into_iter().map(|a| (a.code.clone(), a)).collect(),
        }
    }

    /// Looks up an asset.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&FixedAsset> {
        self.assets.get(code)
    }

    /// Looks up an asset, failing with `AssetNotFound`.
    pub fn require(&self, code: &str) -> Result<&FixedAsset, LedgerError> {
        self.get(code)
            .ok_or_else(|| LedgerError::AssetNotFound(code.to_string()))
    }

    pub(crate) fn require_mut(&mut self, code: &str) -> Result<&mut FixedAsset, LedgerError> {
        self.assets
            .get_mut(code)
            .ok_or_else(|| LedgerError::AssetNotFound(code.to_string()))
    }

    /// Iterates over assets in code order.
    pub fn iter(&self) -> impl Iterator<Item = &FixedAsset> {
        self.assets.values()
    }

    /// Validates and registers a new asset.
    pub(crate) fn register(&mut self, input: NewFixedAsset) -> Result<&FixedAsset, LedgerError> {
        if self.assets.contains_key(&input.code) {
            return Err(LedgerError::DuplicateAsset(input.code));
        }
        if input.acquisition_cost <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount {
                amount: input.acquisition_cost,
                reason: "acquisition cost must be positive",
            });
        }
        if input.salvage_value < Decimal::ZERO || input.salvage_value > input.acquisition_cost {
            return Err(LedgerError::InvalidAmount {
                amount: input.salvage_value,
                reason: "salvage value must be between zero and cost",
            });
        }
        if input.useful_life_months == 0 {
            return Err(LedgerError::InvalidDocument(
                "useful life must be at least one month".into(),
            ));
        }
        let code = input.code.clone();
        let asset = FixedAsset {
            code: input.code,
            name: input.name,
            acquisition_date: input.acquisition_date,
            acquisition_cost: input.acquisition_cost,
            salvage_value: input.salvage_value,
            useful_life_months: input.useful_life_months,
            method: input.method,
            accumulated_depreciation: Decimal::ZERO,
            depreciation_runs: 0,
            last_depreciation_date: None,
            status: AssetStatus::Active,
            acquisition_entry: None,
            disposal_entry: None,
        };
        Ok(self.assets.entry(code).or_insert(asset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn asset(cost: Decimal, salvage: Decimal, months: u32, method: DepreciationMethod) -> FixedAsset {
        let mut register = AssetRegister::default();
        register
            .register(NewFixedAsset {
                code: "FA-1".into(),
                name: "Server".into(),
                acquisition_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                acquisition_cost: cost,
                salvage_value: salvage,
                useful_life_months: months,
                method,
            })
            .unwrap()
            .clone()
    }

    fn run(asset: &mut FixedAsset) -> Decimal {
        let charge = asset.monthly_charge();
        asset.accumulated_depreciation += charge;
        asset.depreciation_runs += 1;
        charge
    }

    #[test]
    fn test_straight_line_schedule() {
        let mut a = asset(dec!(12000), Decimal::ZERO, 24, DepreciationMethod::StraightLine);
        assert_eq!(a.monthly_charge(), dec!(500.00));
        let total: Decimal = (0..24).map(|_| run(&mut a)).sum();
        assert_eq!(total, dec!(12000));
        assert_eq!(a.book_value(), Decimal::ZERO);
        assert_eq!(a.monthly_charge(), Decimal::ZERO);
    }

    #[test]
    fn test_last_run_takes_rounding_remainder() {
        let mut a = asset(dec!(1000), dec!(0), 3, DepreciationMethod::StraightLine);
        assert_eq!(run(&mut a), dec!(333.33));
        assert_eq!(run(&mut a), dec!(333.33));
        assert_eq!(run(&mut a), dec!(333.34));
        assert_eq!(a.book_value(), Decimal::ZERO);
    }

    #[test]
    fn test_declining_balance_stops_at_salvage() {
        let mut a = asset(dec!(10000), dec!(1000), 12, DepreciationMethod::DecliningBalance);
        assert_eq!(run(&mut a), dec!(1666.67));
        for _ in 1..12 {
            run(&mut a);
        }
        assert_eq!(a.book_value(), dec!(1000));
        assert_eq!(a.depreciable_remaining(), Decimal::ZERO);
    }

    #[test]
    fn test_register_validation() {
        let mut register = AssetRegister::default();
        let input = NewFixedAsset {
            code: "FA-2".into(),
            name: "Van".into(),
            acquisition_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            acquisition_cost: dec!(100),
            salvage_value: dec!(200),
            useful_life_months: 12,
            method: DepreciationMethod::StraightLine,
        };
        assert!(matches!(
            register.register(input.clone()),
            Err(LedgerError::InvalidAmount { .. })
        ));
        let valid = NewFixedAsset {
            salvage_value: Decimal::ZERO,
            ..input
        };
        register.register(valid.clone()).unwrap();
        assert_eq!(
            register.register(valid),
            Err(LedgerError::DuplicateAsset("FA-2".into()))
        );
    }
}
