//! Customer receipts and vendor payments.
//!
//! A payment settles open items of one party. Without explicit allocations
//! the amount is applied oldest-due first; whatever is left becomes an
//! advance (customer advance for receipts, vendor advance for payments).

use chrono::NaiveDate;
use folio_shared::types::{OpenItemId, PaymentId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::sales::system_user;
use super::{bank_line, require_positive};
use crate::determination::TransactionType;
use crate::ledger::{
    JournalEntry, LedgerError, LedgerState, PostingLine, PostingRequest, SourceModule,
    SubmitPosting,
};
use crate::subledger::{
    Allocation, OpenItemKind, OpenItemStatus, PaymentDirection, PaymentRecord,
};

/// Amount applied to one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationInput {
    /// Invoice or bill number.
    pub document_ref: String,
    /// Amount applied.
    pub amount: Decimal,
}

/// A receipt or payment as entered by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInput {
    /// Customer or vendor.
    pub party: String,
    /// Value date.
    pub date: NaiveDate,
    /// Gross amount.
    pub amount: Decimal,
    /// Cheque or transfer reference.
    #[serde(default)]
    pub reference: String,
    /// Bank or cash account; defaults to the mapped bank account.
    #[serde(default)]
    pub bank_account: Option<String>,
    /// Explicit allocations; empty means oldest-due first.
    #[serde(default)]
    pub allocations: Vec<AllocationInput>,
    /// Acting user.
    #[serde(default = "system_user")]
    pub user: String,
}

/// A posted payment together with its record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentPosting {
    /// The posted entry.
    pub entry: JournalEntry,
    /// The stored payment.
    pub payment: PaymentRecord,
}

impl LedgerState {
    /// Records money received from a customer.
    ///
    /// Bank Dr amount, AR Cr allocated, Customer Advances Cr the rest.
    pub fn record_customer_receipt(
        &mut self,
        input: &PaymentInput,
    ) -> Result<PaymentPosting, LedgerError> {
        self.record_payment(PaymentDirection::Received, input)
    }

    /// Records money paid to a vendor.
    ///
    /// AP Dr allocated, Vendor Advances Dr the rest, Bank Cr amount.
    pub fn record_vendor_payment(
        &mut self,
        input: &PaymentInput,
    ) -> Result<PaymentPosting, LedgerError> {
        self.record_payment(PaymentDirection::Made, input)
    }

    fn record_payment(
        &mut self,
        direction: PaymentDirection,
        input: &PaymentInput,
    ) -> Result<PaymentPosting, LedgerError> {
        require_positive(input.amount, "payment amount must be positive")?;
        let kind = match direction {
            PaymentDirection::Received => OpenItemKind::Receivable,
            PaymentDirection::Made => OpenItemKind::Payable,
        };
        let plan = self.plan_allocations(kind, &input.party, input.amount, &input.allocations)?;
        let allocated: Decimal = plan.iter().map(|a| a.amount).sum();
        let unallocated = input.amount - allocated;
        let bank = input.bank_account.as_deref();

        let reference = if input.reference.is_empty() {
            format!("PAY-{}", input.party)
        } else {
            input.reference.clone()
        };
        let request = PostingRequest::new(SourceModule::Payment, input.date, reference.clone())
            .by(input.user.clone());
        let request = match direction {
            PaymentDirection::Received => request
                .with_description(format!("Receipt from {}", input.party))
                .line(bank_line(
                    bank,
                    TransactionType::CustomerReceipt,
                    input.amount,
                    Decimal::ZERO,
                    "Bank receipt",
                ))
                .line(PostingLine::credit(
                    TransactionType::CustomerReceiptArClear,
                    allocated,
                    format!("Settlement {}", input.party),
                ))
                .line(PostingLine::credit(
                    TransactionType::CustomerAdvance,
                    unallocated,
                    format!("Advance from {}", input.party),
                )),
            PaymentDirection::Made => request
                .with_description(format!("Payment to {}", input.party))
                .line(PostingLine::debit(
                    TransactionType::VendorPaymentApClear,
                    allocated,
                    format!("Settlement {}", input.party),
                ))
                .line(PostingLine::debit(
                    TransactionType::VendorAdvance,
                    unallocated,
                    format!("Advance to {}", input.party),
                ))
                .line(bank_line(
                    bank,
                    TransactionType::VendorPayment,
                    Decimal::ZERO,
                    input.amount,
                    "Bank payment",
                )),
        };
        let entry = self.submit_posting(request)?;

        for allocation in &plan {
            self.subledger.allocate(allocation.open_item_id, allocation.amount)?;
            self.changes.open_items.insert(allocation.open_item_id);
        }
        let bank_line = match direction {
            PaymentDirection::Received => entry.lines.first(),
            PaymentDirection::Made => entry.lines.last(),
        };
        let payment = PaymentRecord {
            id: PaymentId::new(),
            direction,
            party: input.party.clone(),
            date: input.date,
            bank_account_code: bank_line.map(|l| l.account_code.clone()).unwrap_or_default(),
            amount: input.amount,
            allocated,
            reference,
            entry_id: entry.id,
            allocations: plan,
        };
        self.subledger.insert_payment(payment.clone());
        self.changes.payments.insert(payment.id);
        Ok(PaymentPosting { entry, payment })
    }

    /// Resolves explicit allocations, or spreads the amount oldest-due first.
    pub(super) fn plan_allocations(
        &self,
        kind: OpenItemKind,
        party: &str,
        amount: Decimal,
        requests: &[AllocationInput],
    ) -> Result<Vec<Allocation>, LedgerError> {
        if requests.is_empty() {
            let mut items: Vec<_> = self
                .subledger
                .items()
                .filter(|i| {
                    i.kind == kind && i.party == party && i.status == OpenItemStatus::Open
                })
                .collect();
            items.sort_by_key(|i| (i.due_date, i.date, i.document_ref.clone()));
            let mut remaining = amount;
            let mut plan = Vec::new();
            for item in items {
                if remaining.is_zero() {
                    break;
                }
                let applied = remaining.min(item.outstanding());
                if applied > Decimal::ZERO {
                    plan.push(Allocation {
                        open_item_id: item.id,
                        amount: applied,
                    });
                    remaining -= applied;
                }
            }
            return Ok(plan);
        }

        let mut plan: Vec<Allocation> = Vec::with_capacity(requests.len());
        let mut total = Decimal::ZERO;
        for requested in requests {
            require_positive(requested.amount, "allocation must be positive")?;
            let item = self
                .subledger
                .item_by_ref(kind, &requested.document_ref)
                .ok_or_else(|| {
                    LedgerError::InvalidDocument(format!(
                        "unknown document {}",
                        requested.document_ref
                    ))
                })?;
            if item.party != party {
                return Err(LedgerError::InvalidDocument(format!(
                    "document {} belongs to {}",
                    item.document_ref, item.party
                )));
            }
            let already: Decimal = plan
                .iter()
                .filter(|a| a.open_item_id == item.id)
                .map(|a| a.amount)
                .sum();
            let available = item.outstanding() - already;
            if item.status != OpenItemStatus::Open || requested.amount > available {
                return Err(LedgerError::OverAllocation {
                    requested: requested.amount,
                    available: available.max(Decimal::ZERO),
                });
            }
            total += requested.amount;
            plan.push(Allocation {
                open_item_id: item.id,
                amount: requested.amount,
            });
        }
        if total > amount {
            return Err(LedgerError::OverAllocation {
                requested: total,
                available: amount,
            });
        }
        Ok(plan)
    }

    /// Payments allocated to an open item, with the amount each applied.
    pub fn allocations_of(&self, id: OpenItemId) -> impl Iterator<Item = (&PaymentRecord, Decimal)> {
        self.subledger.payments().flat_map(move |p| {
            p.allocations
                .iter()
                .filter(move |a| a.open_item_id == id)
                .map(move |a| (p, a.amount))
        })
    }
}
