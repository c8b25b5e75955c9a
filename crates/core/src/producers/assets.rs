//! Fixed asset acquisition, depreciation and disposal postings.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::sales::system_user;
use super::{bank_line, require_positive};
use crate::assets::{AssetStatus, FixedAsset, NewFixedAsset};
use crate::determination::TransactionType;
use crate::ledger::{
    JournalEntry, LedgerError, LedgerState, PostingLine, PostingRequest, SourceModule,
    SubmitPosting,
};

/// An asset and the entry that last changed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPosting {
    /// Asset after the posting.
    pub asset: FixedAsset,
    /// The posted entry.
    pub entry: JournalEntry,
}

/// Sale or scrapping of an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDisposal {
    /// Disposal date.
    pub date: NaiveDate,
    /// Sale proceeds; zero for scrapping.
    #[serde(default)]
    pub proceeds: Decimal,
    /// Account receiving the proceeds; defaults to the mapped receivable.
    #[serde(default)]
    pub proceeds_account: Option<String>,
    /// Acting user.
    #[serde(default = "system_user")]
    pub user: String,
}

fn period_key(date: NaiveDate) -> String {
    format!("{:04}{:02}", date.year(), date.month())
}

impl LedgerState {
    /// Registers an asset and posts its acquisition.
    ///
    /// Fixed asset Dr cost, clearing (or `funding_account`) Cr cost.
    pub fn acquire_asset(
        &mut self,
        input: NewFixedAsset,
        funding_account: Option<&str>,
        user: &str,
    ) -> Result<AssetPosting, LedgerError> {
        let code = input.code.clone();
        let (cost, date, name) = {
            let asset = self.assets.register(input)?;
            (asset.acquisition_cost, asset.acquisition_date, asset.name.clone())
        };
        let request = PostingRequest::new(SourceModule::FixedAsset, date, format!("ACQ-{code}"))
            .with_description(format!("Acquisition of {name}"))
            .with_source_id(code.clone())
            .by(user)
            .line(PostingLine::debit(TransactionType::FixedAsset, cost, name.clone()))
            .line(bank_line(
                funding_account,
                TransactionType::FixedAssetClearing,
                Decimal::ZERO,
                cost,
                "Asset acquisition",
            ));
        let entry = self.submit_posting(request)?;
        let asset = self.assets.require_mut(&code)?;
        asset.acquisition_entry = Some(entry.id);
        let asset = asset.clone();
        self.changes.assets.insert(code);
        Ok(AssetPosting { asset, entry })
    }

    /// Posts one month of depreciation for an asset, dated `period_end`.
    ///
    /// # Errors
    ///
    /// `AssetNotProcessable` when the asset is not active, the date is before
    /// acquisition or an earlier run, or the month was already depreciated.
    pub fn depreciate_asset(
        &mut self,
        code: &str,
        period_end: NaiveDate,
        user: &str,
    ) -> Result<AssetPosting, LedgerError> {
        let asset = self.assets.require(code)?;
        let refuse = |reason| LedgerError::AssetNotProcessable {
            code: code.to_string(),
            reason,
        };
        if asset.status != AssetStatus::Active {
            return Err(refuse("asset is not active"));
        }
        if period_end < asset.acquisition_date {
            return Err(refuse("date is before acquisition"));
        }
        if asset.depreciated_in_month(period_end) {
            return Err(refuse("month already depreciated"));
        }
        if asset.last_depreciation_date.is_some_and(|last| last > period_end) {
            return Err(refuse("date is before the last depreciation run"));
        }
        let charge = asset.monthly_charge();
        if charge.is_zero() {
            return Err(refuse("nothing left to depreciate"));
        }
        let name = asset.name.clone();

        let request = PostingRequest::new(
            SourceModule::FixedAsset,
            period_end,
            format!("DEP-{code}-{}", period_key(period_end)),
        )
        .with_description(format!("Depreciation of {name}"))
        .with_source_id(code)
        .by(user)
        .line(PostingLine::debit(
            TransactionType::DepreciationExpense,
            charge,
            format!("Depreciation {name}"),
        ))
        .line(PostingLine::credit(
            TransactionType::AccumulatedDepreciation,
            charge,
            format!("Accumulated depreciation {name}"),
        ));
        let entry = self.submit_posting(request)?;

        let asset = self.assets.require_mut(code)?;
        asset.accumulated_depreciation += charge;
        asset.depreciation_runs += 1;
        asset.last_depreciation_date = Some(period_end);
        if asset.depreciable_remaining().is_zero() {
            asset.status = AssetStatus::FullyDepreciated;
        }
        let asset = asset.clone();
        self.changes.assets.insert(code.to_string());
        debug!(asset = %code, charge = %charge, book_value = %asset.book_value(), "depreciation posted");
        Ok(AssetPosting { asset, entry })
    }

    /// Depreciates every active asset not yet run for `period_end`'s month.
    pub fn run_depreciation(
        &mut self,
        period_end: NaiveDate,
        user: &str,
    ) -> Result<Vec<AssetPosting>, LedgerError> {
        let due: Vec<String> = self
            .assets
            .iter()
            .filter(|a| {
                a.status == AssetStatus::Active
                    && a.acquisition_date <= period_end
                    && !a.depreciated_in_month(period_end)
                    && a.last_depreciation_date.is_none_or(|last| last < period_end)
            })
            .map(|a| a.code.clone())
            .collect();
        due.iter()
            .map(|code| self.depreciate_asset(code, period_end, user))
            .collect()
    }

    /// Disposes of an asset, booking proceeds and the gain or loss.
    ///
    /// Accumulated depreciation Dr, proceeds Dr, fixed asset Cr cost, and
    /// the difference to gain (Cr) or loss (Dr) on disposal.
    pub fn dispose_asset(
        &mut self,
        code: &str,
        disposal: &AssetDisposal,
    ) -> Result<AssetPosting, LedgerError> {
        let asset = self.assets.require(code)?;
        if asset.status == AssetStatus::Disposed {
            return Err(LedgerError::AssetNotProcessable {
                code: code.to_string(),
                reason: "asset is already disposed",
            });
        }
        if !disposal.proceeds.is_zero() {
            require_positive(disposal.proceeds, "proceeds must be positive")?;
        }
        let result = disposal.proceeds - asset.book_value();
        let name = asset.name.clone();

        let mut request =
            PostingRequest::new(SourceModule::FixedAsset, disposal.date, format!("DSP-{code}"))
                .with_description(format!("Disposal of {name}"))
                .with_source_id(code)
                .by(disposal.user.clone())
                .line(PostingLine::debit(
                    TransactionType::AccumulatedDepreciation,
                    asset.accumulated_depreciation,
                    "Clear accumulated depreciation",
                ))
                .line(bank_line(
                    disposal.proceeds_account.as_deref(),
                    TransactionType::DisposalProceeds,
                    disposal.proceeds,
                    Decimal::ZERO,
                    "Disposal proceeds",
                ))
                .line(PostingLine::credit(
                    TransactionType::FixedAsset,
                    asset.acquisition_cost,
                    "Clear cost",
                ));
        request = if result > Decimal::ZERO {
            request.line(PostingLine::credit(TransactionType::GainOnDisposal, result, "Gain on disposal"))
        } else {
            request.line(PostingLine::debit(TransactionType::LossOnDisposal, -result, "Loss on disposal"))
        };
        let entry = self.submit_posting(request)?;

        let asset = self.assets.require_mut(code)?;
        asset.status = AssetStatus::Disposed;
        asset.disposal_entry = Some(entry.id);
        let asset = asset.clone();
        self.changes.assets.insert(code.to_string());
        Ok(AssetPosting { asset, entry })
    }
}
