//! Transfers between the company's own cash accounts.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::require_positive;
use super::sales::system_user;
use crate::ledger::{
    JournalEntry, LedgerError, LedgerState, PostingLine, PostingRequest, SourceModule,
    SubmitPosting,
};

/// Money moved from one cash or bank account to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankTransfer {
    /// Transfer reference.
    pub reference: String,
    /// Value date.
    pub date: NaiveDate,
    /// Account the money leaves.
    pub from_account: String,
    /// Account the money arrives in.
    pub to_account: String,
    /// Amount moved.
    pub amount: Decimal,
    /// Narrative.
    #[serde(default)]
    pub description: String,
    /// Acting user.
    #[serde(default = "system_user")]
    pub user: String,
}

impl LedgerState {
    /// Posts a transfer: destination Dr, source Cr.
    ///
    /// Both sides must be cash accounts and must differ. Fixed deposits count
    /// as cash accounts here, so placing money on deposit is a transfer.
    pub fn post_bank_transfer(&mut self, transfer: &BankTransfer) -> Result<JournalEntry, LedgerError> {
        require_positive(transfer.amount, "transfer amount must be positive")?;
        if transfer.from_account == transfer.to_account {
            return Err(LedgerError::InvalidDocument(format!(
                "transfer {} has the same source and destination",
                transfer.reference
            )));
        }
        for code in [&transfer.from_account, &transfer.to_account] {
            if !self.chart.require(code)?.is_cash_account {
                return Err(LedgerError::InvalidDocument(format!(
                    "account {code} is not a cash account"
                )));
            }
        }

        let description = if transfer.description.is_empty() {
            format!("Transfer {} to {}", transfer.from_account, transfer.to_account)
        } else {
            transfer.description.clone()
        };
        let request = PostingRequest::new(SourceModule::BankTransfer, transfer.date, transfer.reference.clone())
            .with_description(description)
            .by(transfer.user.clone())
            .line(PostingLine::account(
                transfer.to_account.clone(),
                transfer.amount,
                Decimal::ZERO,
                format!("From {}", transfer.from_account),
            ))
            .line(PostingLine::account(
                transfer.from_account.clone(),
                Decimal::ZERO,
                transfer.amount,
                format!("To {}", transfer.to_account),
            ));
        self.submit_posting(request)
    }
}
