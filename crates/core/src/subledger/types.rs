//! Open items and payment records.

use chrono::NaiveDate;
use folio_shared::types::{EntryId, OpenItemId, PaymentId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Side of the subledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenItemKind {
    /// Customer owes us (sales invoice).
    Receivable,
    /// We owe a vendor (vendor bill).
    Payable,
}

/// Settlement status of an open item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenItemStatus {
    /// Partly or wholly outstanding.
    Open,
    /// Fully allocated.
    Paid,
    /// Cancelled by reversal.
    Cancelled,
}

/// A receivable or payable document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenItem {
    /// Unique identifier.
    pub id: OpenItemId,
    /// Receivable or payable.
    pub kind: OpenItemKind,
    /// Customer or vendor.
    pub party: String,
    /// Document number (invoice or bill).
    pub document_ref: String,
    /// Document date.
    pub date: NaiveDate,
    /// Due date used for aging.
    pub due_date: NaiveDate,
    /// Document total including VAT.
    pub total: Decimal,
    /// Sum of payment allocations.
    pub allocated: Decimal,
    /// Posting that recognised the document.
    pub entry_id: EntryId,
    /// Settlement status.
    pub status: OpenItemStatus,
}

impl OpenItem {
    /// Amount still outstanding.
    #[must_use]
    pub fn outstanding(&self) -> Decimal {
        match self.status {
            OpenItemStatus::Cancelled => Decimal::ZERO,
            _ => self.total - self.allocated,
        }
    }
}

/// Direction of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentDirection {
    /// Money in from a customer.
    Received,
    /// Money out to a vendor or employee.
    Made,
}

/// Part of a payment applied to one open item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    /// Settled item.
    pub open_item_id: OpenItemId,
    /// Amount applied.
    pub amount: Decimal,
}

/// A payment that went through a bank or cash account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Unique identifier.
    pub id: PaymentId,
    /// In or out.
    pub direction: PaymentDirection,
    /// Customer, vendor or employee.
    pub party: String,
    /// Value date.
    pub date: NaiveDate,
    /// Bank or cash account the money moved through.
    pub bank_account_code: String,
    /// Gross payment amount.
    pub amount: Decimal,
    /// Part applied to open items.
    pub allocated: Decimal,
    /// Payment reference (cheque or transfer number).
    pub reference: String,
    /// Posting that recorded the payment.
    pub entry_id: EntryId,
    /// Applied items.
    pub allocations: Vec<Allocation>,
}

impl PaymentRecord {
    /// Part not applied to any item (advance).
    #[must_use]
    pub fn unallocated(&self) -> Decimal {
        self.amount - self.allocated
    }
}
