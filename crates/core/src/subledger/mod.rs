//! Receivables, payables and the payments that settle them.
//!
//! The subledger lives inside the ledger state so allocations commit in the
//! same transaction as the postings that back them.

pub mod cheques;
pub mod types;

use std::collections::BTreeMap;

use folio_shared::types::{OpenItemId, PaymentId};
use rust_decimal::Decimal;

pub use cheques::{ChequeRegister, ChequeStatus, PdcCheque};
pub use types::{
    Allocation, OpenItem, OpenItemKind, OpenItemStatus, PaymentDirection, PaymentRecord,
};

use crate::ledger::LedgerError;

/// Open items and payments.
#[derive(Debug, Clone, Default)]
pub struct Subledger {
    items: BTreeMap<OpenItemId, OpenItem>,
    payments: BTreeMap<PaymentId, PaymentRecord>,
}

impl Subledger {
    /// Rebuilds the subledger from stored rows.
    #[must_use]
    pub fn from_parts(
        items: impl IntoIterator<Item = OpenItem>,
        payments: impl IntoIterator<Item = PaymentRecord>,
    ) -> Self {
        Self {
            items: items.into_iter().map(|i| (i.id, i)).collect(),
            payments: payments.into_iter().map(|p| (p.id, p)).collect(),
        }
    }

    /// Looks up an item.
    #[must_use]
    pub fn item(&self, id: OpenItemId) -> Option<&OpenItem> {
        self.items.get(&id)
    }

    /// Looks up an item, failing with `OpenItemNotFound`.
    pub fn require_item(&self, id: OpenItemId) -> Result<&OpenItem, LedgerError> {
        self.item(id).ok_or(LedgerError::OpenItemNotFound(id))
    }

    /// Finds an item by kind and document reference.
    #[must_use]
    pub fn item_by_ref(&self, kind: OpenItemKind, document_ref: &str) -> Option<&OpenItem> {
        self.items
            .values()
            .find(|i| i.kind == kind && i.document_ref == document_ref)
    }

    /// Iterates over all items.
    pub fn items(&self) -> impl Iterator<Item = &OpenItem> {
        self.items.values()
    }

    /// Looks up a payment.
    #[must_use]
    pub fn payment(&self, id: PaymentId) -> Option<&PaymentRecord> {
        self.payments.get(&id)
    }

    /// Iterates over all payments.
    pub fn payments(&self) -> impl Iterator<Item = &PaymentRecord> {
        self.payments.values()
    }

    /// Registers a new open item; document references are unique per kind.
    pub(crate) fn register_item(&mut self, item: OpenItem) -> Result<(), LedgerError> {
        if self.item_by_ref(item.kind, &item.document_ref).is_some() {
            return Err(LedgerError::DuplicateDocument(item.document_ref));
        }
        self.items.insert(item.id, item);
        Ok(())
    }

    /// Applies `amount` to an item.
    pub(crate) fn allocate(&mut self, id: OpenItemId, amount: Decimal) -> Result<(), LedgerError> {
        let item = self
            .items
            .get_mut(&id)
            .ok_or(LedgerError::OpenItemNotFound(id))?;
        let available = item.outstanding();
        if amount > available || item.status != OpenItemStatus::Open {
            return Err(LedgerError::OverAllocation {
                requested: amount,
                available,
            });
        }
        item.allocated += amount;
        if item.outstanding().is_zero() {
            item.status = OpenItemStatus::Paid;
        }
        Ok(())
    }

    /// Takes back part of an earlier allocation, reopening a paid item.
    pub(crate) fn release(&mut self, id: OpenItemId, amount: Decimal) -> Result<(), LedgerError> {
        let item = self
            .items
            .get_mut(&id)
            .ok_or(LedgerError::OpenItemNotFound(id))?;
        if amount > item.allocated {
            return Err(LedgerError::OverAllocation {
                requested: amount,
                available: item.allocated,
            });
        }
        item.allocated -= amount;
        if item.status == OpenItemStatus::Paid && !item.outstanding().is_zero() {
            item.status = OpenItemStatus::Open;
        }
        Ok(())
    }

    /// Marks an item cancelled.
    pub(crate) fn cancel_item(&mut self, id: OpenItemId) -> Result<(), LedgerError> {
        let item = self
            .items
            .get_mut(&id)
            .ok_or(LedgerError::OpenItemNotFound(id))?;
        if !item.allocated.is_zero() {
            return Err(LedgerError::DocumentHasAllocations(item.document_ref.clone()));
        }
        item.status = OpenItemStatus::Cancelled;
        Ok(())
    }

    pub(crate) fn insert_payment(&mut self, payment: PaymentRecord) {
        self.payments.insert(payment.id, payment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use folio_shared::types::EntryId;
    use rust_decimal_macros::dec;

    fn invoice(document_ref: &str, total: Decimal) -> OpenItem {
        let date = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
        OpenItem {
            id: OpenItemId::new(),
            kind: OpenItemKind::Receivable,
            party: "ACME".into(),
            document_ref: document_ref.into(),
            date,
            due_date: date,
            total,
            allocated: Decimal::ZERO,
            entry_id: EntryId::new(),
            status: OpenItemStatus::Open,
        }
    }

    #[test]
    fn test_allocation_never_exceeds_outstanding() {
        let mut ledger = Subledger::default();
        let item = invoice("INV-1", dec!(1000));
        let id = item.id;
        ledger.register_item(item).unwrap();

        ledger.allocate(id, dec!(400)).unwrap();
        assert_eq!(
            ledger.allocate(id, dec!(700)),
            Err(LedgerError::OverAllocation {
                requested: dec!(700),
                available: dec!(600)
            })
        );
        ledger.allocate(id, dec!(600)).unwrap();
        assert_eq!(ledger.item(id).unwrap().status, OpenItemStatus::Paid);
        assert_eq!(ledger.item(id).unwrap().outstanding(), Decimal::ZERO);
    }

    #[test]
    fn test_release_reopens_paid_item() {
        let mut ledger = Subledger::default();
        let item = invoice("INV-3", dec!(500));
        let id = item.id;
        ledger.register_item(item).unwrap();
        ledger.allocate(id, dec!(500)).unwrap();

        ledger.release(id, dec!(200)).unwrap();
        let item = ledger.item(id).unwrap();
        assert_eq!(item.status, OpenItemStatus::Open);
        assert_eq!(item.outstanding(), dec!(200));
        assert!(matches!(
            ledger.release(id, dec!(301)),
            Err(LedgerError::OverAllocation { .. })
        ));
    }

    #[test]
    fn test_duplicate_document_rejected() {
        let mut ledger = Subledger::default();
        ledger.register_item(invoice("INV-1", dec!(1))).unwrap();
        assert_eq!(
            ledger.register_item(invoice("INV-1", dec!(2))),
            Err(LedgerError::DuplicateDocument("INV-1".into()))
        );
    }

    #[test]
    fn test_cancel_requires_no_allocations() {
        let mut ledger = Subledger::default();
        let item = invoice("INV-2", dec!(100));
        let id = item.id;
        ledger.register_item(item).unwrap();
        ledger.allocate(id, dec!(10)).unwrap();
        assert!(matches!(
            ledger.cancel_item(id),
            Err(LedgerError::DocumentHasAllocations(_))
        ));
    }
}
