//! Producers: operational documents turned into posting requests.
//!
//! Every producer names its lines by [`TransactionType`] and hands the
//! request to [`SubmitPosting`]; none builds a journal entry itself.
//! Producers that keep subledger or asset state are methods on
//! [`LedgerState`](crate::ledger::LedgerState) so the document and its
//! posting commit together.
//!
//! [`TransactionType`]: crate::determination::TransactionType
//! [`SubmitPosting`]: crate::ledger::SubmitPosting

pub mod assets;
pub mod bank_transfer;
pub mod expense_claim;
pub mod payment;
pub mod payroll;
pub mod pdc;
pub mod purchase;
pub mod sales;
pub mod tax;

use folio_shared::types::has_money_precision;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use assets::{AssetDisposal, AssetPosting};
pub use bank_transfer::BankTransfer;
pub use expense_claim::{
    ExpenseClaim, ExpenseClaimLine, ExpenseReimbursement, post_expense_claim,
    post_expense_reimbursement,
};
pub use payment::{AllocationInput, PaymentInput, PaymentPosting};
pub use payroll::{PayrollRun, Payslip, SalaryPayment, post_payroll_run, post_salary_payment};
pub use pdc::{ChequePosting, PdcBounce, PdcClearance, PdcDeposit};
pub use purchase::VendorBill;
pub use sales::{DocumentLine, DocumentTotals, SalesInvoice, VatSplit, split_vat};
pub use tax::{
    CorporateTaxPayment, CorporateTaxProvision, VatSettlement, post_corporate_tax_payment,
    post_corporate_tax_provision, post_vat_settlement,
};

use crate::determination::TransactionType;
use crate::ledger::{LedgerError, PostingLine};
use crate::subledger::OpenItem;

/// A posted document together with its subledger item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentPosting {
    /// The posted entry.
    pub entry: crate::ledger::JournalEntry,
    /// The registered receivable or payable.
    pub open_item: OpenItem,
}

/// Rejects zero, negative and sub-cent amounts.
pub(crate) fn require_positive(amount: Decimal, what: &'static str) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount {
            amount,
            reason: what,
        });
    }
    if !has_money_precision(amount) {
        return Err(LedgerError::InvalidAmount {
            amount,
            reason: "more than two decimal places",
        });
    }
    Ok(())
}

/// Bank line: an explicit account when given, else the transaction type.
pub(crate) fn bank_line(
    bank_account: Option<&str>,
    transaction_type: TransactionType,
    debit: Decimal,
    credit: Decimal,
    description: &str,
) -> PostingLine {
    match bank_account {
        Some(code) => PostingLine::account(code, debit, credit, description),
        None if debit.is_zero() => PostingLine::credit(transaction_type, credit, description),
        None => PostingLine::debit(transaction_type, debit, description),
    }
}
