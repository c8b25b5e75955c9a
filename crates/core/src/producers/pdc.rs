//! Post-dated cheques: deposit, clearance and bounce.
//!
//! Depositing a cheque settles the customer's invoices against PDC control
//! instead of the bank. Clearance moves the amount from PDC control to the
//! bank. A bounce reverses whatever was posted and reopens the invoices.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::payment::AllocationInput;
use super::sales::system_user;
use super::{bank_line, require_positive};
use crate::determination::TransactionType;
use crate::ledger::{
    JournalEntry, LedgerError, LedgerState, PostingLine, PostingRequest, ReversalRequest,
    SourceModule, SubmitPosting,
};
use crate::subledger::{ChequeStatus, OpenItemKind, PdcCheque};

/// A customer cheque handed in for deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdcDeposit {
    /// Cheque number.
    pub cheque_number: String,
    /// Issuing customer.
    pub party: String,
    /// Date written on the cheque.
    pub cheque_date: NaiveDate,
    /// Deposit date; the PDC control posting is dated here.
    pub deposit_date: NaiveDate,
    /// Face value.
    pub amount: Decimal,
    /// Invoices settled; empty means oldest-due first.
    #[serde(default)]
    pub allocations: Vec<AllocationInput>,
    /// Acting user.
    #[serde(default = "system_user")]
    pub user: String,
}

/// Funds of a deposited cheque arriving in the bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdcClearance {
    /// Clearance date, on or after the cheque date.
    pub date: NaiveDate,
    /// Receiving bank account; defaults to the mapped receipt account.
    #[serde(default)]
    pub bank_account: Option<String>,
    /// Acting user.
    #[serde(default = "system_user")]
    pub user: String,
}

/// A cheque returned unpaid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdcBounce {
    /// Date the bank returned the cheque.
    pub date: NaiveDate,
    /// Bank's reason.
    pub reason: String,
    /// Acting user.
    #[serde(default = "system_user")]
    pub user: String,
}

/// A cheque together with the entry that moved it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChequePosting {
    /// The posted entry (the deposit reversal for a bounce).
    pub entry: JournalEntry,
    /// The cheque after the move.
    pub cheque: PdcCheque,
}

fn require_status(
    cheque: &PdcCheque,
    allowed: &[ChequeStatus],
    to: ChequeStatus,
) -> Result<(), LedgerError> {
    if allowed.contains(&cheque.status) {
        Ok(())
    } else {
        Err(LedgerError::InvalidStatusTransition {
            from: cheque.status.as_str(),
            to: to.as_str(),
        })
    }
}

impl LedgerState {
    /// Deposits a post-dated cheque.
    ///
    /// PDC control Dr amount, AR Cr allocated, Customer Advances Cr the rest.
    pub fn deposit_pdc(&mut self, deposit: &PdcDeposit) -> Result<ChequePosting, LedgerError> {
        require_positive(deposit.amount, "cheque amount must be positive")?;
        if deposit.cheque_number.trim().is_empty() {
            return Err(LedgerError::InvalidDocument("cheque number is required".into()));
        }
        if self.cheques.contains(&deposit.cheque_number) {
            return Err(LedgerError::DuplicateDocument(deposit.cheque_number.clone()));
        }
        let plan = self.plan_allocations(
            OpenItemKind::Receivable,
            &deposit.party,
            deposit.amount,
            &deposit.allocations,
        )?;
        let allocated: Decimal = plan.iter().map(|a| a.amount).sum();

        let number = &deposit.cheque_number;
        let request = PostingRequest::new(SourceModule::Pdc, deposit.deposit_date, format!("PDC-{number}"))
            .with_description(format!("PDC {number} from {}", deposit.party))
            .with_source_id(number.clone())
            .by(deposit.user.clone())
            .line(PostingLine::debit(
                TransactionType::PdcControl,
                deposit.amount,
                format!("Cheque {number} dated {}", deposit.cheque_date),
            ))
            .line(PostingLine::credit(
                TransactionType::CustomerReceiptArClear,
                allocated,
                format!("Settlement {}", deposit.party),
            ))
            .line(PostingLine::credit(
                TransactionType::CustomerAdvance,
                deposit.amount - allocated,
                format!("Advance from {}", deposit.party),
            ));
        let entry = self.submit_posting(request)?;

        for allocation in &plan {
            self.subledger.allocate(allocation.open_item_id, allocation.amount)?;
            self.changes.open_items.insert(allocation.open_item_id);
        }
        let cheque = PdcCheque {
            cheque_number: number.clone(),
            party: deposit.party.clone(),
            cheque_date: deposit.cheque_date,
            deposit_date: deposit.deposit_date,
            amount: deposit.amount,
            allocations: plan,
            status: ChequeStatus::Deposited,
            bank_account_code: None,
            deposit_entry: entry.id,
            clearance_entry: None,
            bounce_date: None,
            bounce_reason: None,
        };
        self.cheques.insert(cheque.clone())?;
        self.changes.cheques.insert(cheque.cheque_number.clone());
        Ok(ChequePosting { entry, cheque })
    }

    /// Clears a deposited cheque: bank Dr, PDC control Cr.
    pub fn clear_pdc(
        &mut self,
        cheque_number: &str,
        clearance: &PdcClearance,
    ) -> Result<ChequePosting, LedgerError> {
        let cheque = self.cheques.require(cheque_number)?;
        require_status(cheque, &[ChequeStatus::Deposited], ChequeStatus::Cleared)?;
        if clearance.date < cheque.cheque_date {
            return Err(LedgerError::InvalidDocument(format!(
                "cheque {cheque_number} is dated {} and cannot clear earlier",
                cheque.cheque_date
            )));
        }
        let amount = cheque.amount;

        let request = PostingRequest::new(SourceModule::Pdc, clearance.date, format!("CLR-{cheque_number}"))
            .with_description(format!("PDC {cheque_number} cleared"))
            .with_source_id(cheque_number.to_string())
            .by(clearance.user.clone())
            .line(bank_line(
                clearance.bank_account.as_deref(),
                TransactionType::CustomerReceipt,
                amount,
                Decimal::ZERO,
                "Cheque proceeds",
            ))
            .line(PostingLine::credit(
                TransactionType::PdcControl,
                amount,
                format!("Cheque {cheque_number} cleared"),
            ));
        let entry = self.submit_posting(request)?;

        let cheque = self.cheques.require_mut(cheque_number)?;
        cheque.status = ChequeStatus::Cleared;
        cheque.clearance_entry = Some(entry.id);
        cheque.bank_account_code = entry.lines.first().map(|l| l.account_code.clone());
        let cheque = cheque.clone();
        self.changes.cheques.insert(cheque.cheque_number.clone());
        Ok(ChequePosting { entry, cheque })
    }

    /// Records a returned cheque.
    ///
    /// Reverses the clearance (if any) and the deposit on the bounce date,
    /// then releases the cheque's allocations so the invoices fall due again.
    pub fn bounce_pdc(
        &mut self,
        cheque_number: &str,
        bounce: &PdcBounce,
    ) -> Result<ChequePosting, LedgerError> {
        let cheque = self.cheques.require(cheque_number)?;
        require_status(
            cheque,
            &[ChequeStatus::Deposited, ChequeStatus::Cleared],
            ChequeStatus::Bounced,
        )?;
        let (deposit_entry, clearance_entry) = (cheque.deposit_entry, cheque.clearance_entry);
        let allocations = cheque.allocations.clone();

        let reversal = ReversalRequest::new(
            format!("cheque {cheque_number} returned: {}", bounce.reason),
            bounce.user.clone(),
        )
        .on(bounce.date);
        if let Some(id) = clearance_entry {
            self.reverse(id, &reversal)?;
        }
        let entry = self.reverse(deposit_entry, &reversal)?;
        for allocation in &allocations {
            self.subledger.release(allocation.open_item_id, allocation.amount)?;
            self.changes.open_items.insert(allocation.open_item_id);
        }

        let cheque = self.cheques.require_mut(cheque_number)?;
        cheque.status = ChequeStatus::Bounced;
        cheque.bounce_date = Some(bounce.date);
        cheque.bounce_reason = Some(bounce.reason.clone());
        let cheque = cheque.clone();
        self.changes.cheques.insert(cheque.cheque_number.clone());
        warn!(
            cheque = %cheque.cheque_number,
            party = %cheque.party,
            amount = %cheque.amount,
            "post-dated cheque bounced"
        );
        Ok(ChequePosting { entry, cheque })
    }
}
