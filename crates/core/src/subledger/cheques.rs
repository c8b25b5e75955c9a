//! Post-dated cheques received from customers.
//!
//! A cheque enters the register when it is deposited and then either clears
//! into a bank account or bounces. Both exits are final.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use folio_shared::types::EntryId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::Allocation;
use crate::ledger::LedgerError;

/// Lifecycle of a post-dated cheque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChequeStatus {
    /// Held in PDC control awaiting its date.
    Deposited,
    /// Funds received in the bank.
    Cleared,
    /// Returned unpaid.
    Bounced,
}

impl ChequeStatus {
    /// Returns the lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deposited => "deposited",
            Self::Cleared => "cleared",
            Self::Bounced => "bounced",
        }
    }
}

/// A customer cheque dated in the future.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdcCheque {
    /// Cheque number, unique in the register.
    pub cheque_number: String,
    /// Customer who issued the cheque.
    pub party: String,
    /// Date written on the cheque; it cannot clear earlier.
    pub cheque_date: NaiveDate,
    /// Date it was deposited.
    pub deposit_date: NaiveDate,
    /// Face value.
    pub amount: Decimal,
    /// Invoices the cheque settles.
    pub allocations: Vec<Allocation>,
    /// Lifecycle status.
    pub status: ChequeStatus,
    /// Bank account the funds cleared into.
    pub bank_account_code: Option<String>,
    /// PDC control posting.
    pub deposit_entry: EntryId,
    /// Bank posting on clearance.
    pub clearance_entry: Option<EntryId>,
    /// Date the cheque was returned.
    pub bounce_date: Option<NaiveDate>,
    /// Bank's reason for returning it.
    pub bounce_reason: Option<String>,
}

impl PdcCheque {
    /// Part of the face value applied to invoices.
    #[must_use]
    pub fn allocated(&self) -> Decimal {
        self.allocations.iter().map(|a| a.amount).sum()
    }
}

/// All cheques keyed by number.
#[derive(Debug, Clone, Default)]
pub struct ChequeRegister {
    cheques: BTreeMap<String, PdcCheque>,
}

impl ChequeRegister {
    /// Rebuilds the register from stored rows.
    #[must_use]
    pub fn from_cheques(cheques: impl IntoIterator<Item = PdcCheque>) -> Self {
        Self {
            cheques: cheques
                .into_iter()
                .map(|c| (c.cheque_number.clone(), c))
                .collect(),
        }
    }

    /// Looks up a cheque.
    #[must_use]
    pub fn get(&self, cheque_number: &str) -> Option<&PdcCheque> {
        self.cheques.get(cheque_number)
    }

    /// Looks up a cheque, failing with `ChequeNotFound`.
    pub fn require(&self, cheque_number: &str) -> Result<&PdcCheque, LedgerError> {
        self.get(cheque_number)
            .ok_or_else(|| LedgerError::ChequeNotFound(cheque_number.to_string()))
    }

    pub(crate) fn require_mut(&mut self, cheque_number: &str) -> Result<&mut PdcCheque, LedgerError> {
        self.cheques
            .get_mut(cheque_number)
            .ok_or_else(|| LedgerError::ChequeNotFound(cheque_number.to_string()))
    }

    /// Iterates over cheques in number order.
    pub fn iter(&self) -> impl Iterator<Item = &PdcCheque> {
        self.cheques.values()
    }

    /// Cheques still held in PDC control.
    pub fn deposited(&self) -> impl Iterator<Item = &PdcCheque> {
        self.iter().filter(|c| c.status == ChequeStatus::Deposited)
    }

    pub(crate) fn contains(&self, cheque_number: &str) -> bool {
        self.cheques.contains_key(cheque_number)
    }

    pub(crate) fn insert(&mut self, cheque: PdcCheque) -> Result<(), LedgerError> {
        if self.contains(&cheque.cheque_number) {
            return Err(LedgerError::DuplicateDocument(cheque.cheque_number));
        }
        self.cheques.insert(cheque.cheque_number.clone(), cheque);
        Ok(())
    }
}
