//! Vendor bills.

use chrono::NaiveDate;
use folio_shared::types::OpenItemId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::DocumentPosting;
use super::sales::{DocumentLine, DocumentTotals, split_lines, system_user};
use crate::determination::TransactionType;
use crate::ledger::{
    JournalEntry, LedgerError, LedgerState, PostingLine, PostingRequest, ReversalRequest,
    SourceModule, SubmitPosting,
};
use crate::subledger::{OpenItem, OpenItemKind, OpenItemStatus};

/// A bill received from a vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorBill {
    /// Vendor's bill number.
    pub number: String,
    /// Vendor.
    pub vendor: String,
    /// Bill date.
    pub date: NaiveDate,
    /// Due date; defaults to the bill date.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Lines; `account` overrides the expense account.
    pub lines: Vec<DocumentLine>,
    /// Acting user.
    #[serde(default = "system_user")]
    pub user: String,
}

impl VendorBill {
    /// Document totals.
    pub fn totals(&self) -> Result<DocumentTotals, LedgerError> {
        split_lines(&self.lines).map(|(_, totals)| totals)
    }

    /// Builds the posting: expense Dr subtotal, input VAT Dr, AP Cr total.
    pub fn posting_request(&self) -> Result<PostingRequest, LedgerError> {
        let (groups, totals) = split_lines(&self.lines)?;
        let mut request =
            PostingRequest::new(SourceModule::Purchase, self.date, self.number.clone())
                .with_description(format!("Vendor bill {} - {}", self.number, self.vendor))
                .with_source_id(self.number.clone())
                .by(self.user.clone());
        for (account, net) in groups {
            let line = match account {
                Some(code) => PostingLine::account(code, net, Decimal::ZERO, "Purchase expense"),
                None => PostingLine::debit(TransactionType::VendorBillExpense, net, "Purchase expense"),
            };
            request = request.line(line);
        }
        Ok(request
            .line(PostingLine::debit(
                TransactionType::VendorBillVat,
                totals.vat_amount,
                "Input VAT",
            ))
            .line(PostingLine::credit(
                TransactionType::VendorBillPayable,
                totals.total_amount,
                format!("Payable {}", self.vendor),
            )))
    }
}

impl LedgerState {
    /// Posts a vendor bill and registers the payable.
    pub fn post_vendor_bill(&mut self, bill: &VendorBill) -> Result<DocumentPosting, LedgerError> {
        if self
            .subledger
            .item_by_ref(OpenItemKind::Payable, &bill.number)
            .is_some()
        {
            return Err(LedgerError::DuplicateDocument(bill.number.clone()));
        }
        let request = bill.posting_request()?;
        let total = request
            .lines
            .last()
            .map_or(Decimal::ZERO, |line| line.credit);
        let entry = self.submit_posting(request)?;
        let open_item = OpenItem {
            id: OpenItemId::new(),
            kind: OpenItemKind::Payable,
            party: bill.vendor.clone(),
            document_ref: bill.number.clone(),
            date: bill.date,
            due_date: bill.due_date.unwrap_or(bill.date),
            total,
            allocated: Decimal::ZERO,
            entry_id: entry.id,
            status: OpenItemStatus::Open,
        };
        self.subledger.register_item(open_item.clone())?;
        self.changes.open_items.insert(open_item.id);
        Ok(DocumentPosting { entry, open_item })
    }

    /// Cancels a posted vendor bill by reversing its entry.
    pub fn cancel_vendor_bill(
        &mut self,
        number: &str,
        request: &ReversalRequest,
    ) -> Result<JournalEntry, LedgerError> {
        self.cancel_document(OpenItemKind::Payable, number, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::testing::{date, standard_ledger};
    use rust_decimal_macros::dec;

    fn bill(lines: Vec<DocumentLine>) -> VendorBill {
        VendorBill {
            number: "BILL-77".into(),
            vendor: "Stationers".into(),
            date: date(2026, 2, 10),
            due_date: None,
            lines,
            user: "ap".into(),
        }
    }

    fn line(amount: Decimal, account: Option<&str>) -> DocumentLine {
        DocumentLine {
            description: "Supplies".into(),
            amount,
            vat_rate: dec!(5),
            vat_inclusive: true,
            account: account.map(str::to_string),
        }
    }

    #[test]
    fn test_vat_inclusive_bill() {
        let mut state = standard_ledger();
        let posted = state.post_vendor_bill(&bill(vec![line(dec!(1050), None)])).unwrap();
        let lines: Vec<_> = posted
            .entry
            .lines
            .iter()
            .map(|l| (l.account_code.as_str(), l.debit, l.credit))
            .collect();
        assert_eq!(
            lines,
            [
                ("5000", dec!(1000.00), Decimal::ZERO),
                ("1300", dec!(50.00), Decimal::ZERO),
                ("2000", Decimal::ZERO, dec!(1050.00)),
            ]
        );
        assert_eq!(posted.open_item.kind, OpenItemKind::Payable);
        assert_eq!(posted.open_item.due_date, date(2026, 2, 10));
        assert_eq!(state.chart().get("2000").unwrap().current_balance, dec!(1050.00));
    }

    #[test]
    fn test_expense_override_groups_lines() {
        let mut state = standard_ledger();
        let doc = bill(vec![
            line(dec!(105), Some("7000")),
            line(dec!(210), None),
            line(dec!(105), Some("7000")),
        ]);
        let posted = state.post_vendor_bill(&doc).unwrap();
        assert_eq!(posted.entry.lines[0].account_code, "7000");
        assert_eq!(posted.entry.lines[0].debit, dec!(200.00));
        assert_eq!(posted.entry.lines[1].account_code, "5000");
        assert_eq!(posted.entry.lines[1].debit, dec!(200.00));
        assert_eq!(doc.totals().unwrap().total_amount, dec!(420.00));
    }

    #[test]
    fn test_cancelled_bill_leaves_no_balance() {
        let mut state = standard_ledger();
        state.post_vendor_bill(&bill(vec![line(dec!(1050), None)])).unwrap();
        state
            .cancel_vendor_bill("BILL-77", &ReversalRequest::new("wrong vendor", "ap"))
            .unwrap();
        assert_eq!(state.chart().get("2000").unwrap().current_balance, Decimal::ZERO);
        assert_eq!(state.chart().get("5000").unwrap().current_balance, Decimal::ZERO);
    }
}
