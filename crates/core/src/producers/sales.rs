//! Sales invoices.

use chrono::NaiveDate;
use folio_shared::types::{OpenItemId, round_money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{DocumentPosting, require_positive};
use crate::determination::TransactionType;
use crate::ledger::{
    JournalEntry, LedgerError, LedgerState, PostingLine, PostingRequest, ReversalRequest,
    SourceModule, SubmitPosting,
};
use crate::subledger::{OpenItem, OpenItemKind, OpenItemStatus};

/// Net, VAT and gross of one amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatSplit {
    /// Amount before VAT.
    pub net: Decimal,
    /// VAT amount.
    pub vat: Decimal,
    /// Net plus VAT.
    pub gross: Decimal,
}

/// Splits an amount at `rate` percent.
///
/// Exclusive: `vat = round(amount * rate / 100)`. Inclusive:
/// `net = round(amount / (1 + rate / 100))` and VAT takes the rest, so net
/// plus VAT always equals the gross.
#[must_use]
pub fn split_vat(amount: Decimal, rate: Decimal, inclusive: bool) -> VatSplit {
    let hundred = Decimal::ONE_HUNDRED;
    if inclusive {
        let net = round_money(amount / (Decimal::ONE + rate / hundred));
        let gross = round_money(amount);
        VatSplit {
            net,
            vat: gross - net,
            gross,
        }
    } else {
        let net = round_money(amount);
        let vat = round_money(net * rate / hundred);
        VatSplit {
            net,
            vat,
            gross: net + vat,
        }
    }
}

/// One invoice or bill line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentLine {
    /// Narrative.
    #[serde(default)]
    pub description: String,
    /// Line amount, net or gross depending on `vat_inclusive`.
    pub amount: Decimal,
    /// VAT rate in percent.
    #[serde(default)]
    pub vat_rate: Decimal,
    /// `amount` already includes VAT.
    #[serde(default)]
    pub vat_inclusive: bool,
    /// Revenue or expense account overriding the default mapping.
    #[serde(default)]
    pub account: Option<String>,
}

/// Subtotal, VAT and total of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentTotals {
    /// Sum of net amounts.
    pub subtotal: Decimal,
    /// Sum of VAT amounts.
    pub vat_amount: Decimal,
    /// Subtotal plus VAT.
    pub total_amount: Decimal,
}

/// Net amount per override account, in first-seen order, and the totals.
pub(crate) fn split_lines(
    lines: &[DocumentLine],
) -> Result<(Vec<(Option<String>, Decimal)>, DocumentTotals), LedgerError> {
    if lines.is_empty() {
        return Err(LedgerError::InvalidDocument("document has no lines".into()));
    }
    let mut groups: Vec<(Option<String>, Decimal)> = Vec::new();
    let mut totals = DocumentTotals::default();
    for line in lines {
        require_positive(line.amount, "line amount must be positive")?;
        if line.vat_rate < Decimal::ZERO {
            return Err(LedgerError::InvalidAmount {
                amount: line.vat_rate,
                reason: "VAT rate must not be negative",
            });
        }
        let split = split_vat(line.amount, line.vat_rate, line.vat_inclusive);
        totals.subtotal += split.net;
        totals.vat_amount += split.vat;
        totals.total_amount += split.gross;
        match groups.iter_mut().find(|(account, _)| *account == line.account) {
            Some((_, net)) => *net += split.net,
            None => groups.push((line.account.clone(), split.net)),
        }
    }
    Ok((groups, totals))
}

/// A customer invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesInvoice {
    /// Invoice number.
    pub number: String,
    /// Customer.
    pub customer: String,
    /// Invoice date.
    pub date: NaiveDate,
    /// Due date; defaults to the invoice date.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Lines.
    pub lines: Vec<DocumentLine>,
    /// Acting user.
    #[serde(default = "system_user")]
    pub user: String,
}

pub(crate) fn system_user() -> String {
    "system".to_string()
}

impl SalesInvoice {
    /// Document totals.
    pub fn totals(&self) -> Result<DocumentTotals, LedgerError> {
        split_lines(&self.lines).map(|(_, totals)| totals)
    }

    /// Builds the posting: AR Dr total, revenue Cr subtotal, VAT Cr VAT.
    pub fn posting_request(&self) -> Result<PostingRequest, LedgerError> {
        let (groups, totals) = split_lines(&self.lines)?;
        let mut request = PostingRequest::new(SourceModule::Sales, self.date, self.number.clone())
            .with_description(format!("Sales invoice {} - {}", self.number, self.customer))
            .with_source_id(self.number.clone())
            .by(self.user.clone())
            .line(PostingLine::debit(
                TransactionType::SalesInvoiceReceivable,
                totals.total_amount,
                format!("Receivable {}", self.customer),
            ));
        for (account, net) in groups {
            let line = match account {
                Some(code) => PostingLine::account(code, Decimal::ZERO, net, "Sales revenue"),
                None => PostingLine::credit(TransactionType::SalesInvoiceRevenue, net, "Sales revenue"),
            };
            request = request.line(line);
        }
        Ok(request.line(PostingLine::credit(
            TransactionType::SalesInvoiceVat,
            totals.vat_amount,
            "Output VAT",
        )))
    }
}

impl LedgerState {
    /// Posts a sales invoice and registers the receivable.
    pub fn post_sales_invoice(
        &mut self,
        invoice: &SalesInvoice,
    ) -> Result<DocumentPosting, LedgerError> {
        if self
            .subledger
            .item_by_ref(OpenItemKind::Receivable, &invoice.number)
            .is_some()
        {
            return Err(LedgerError::DuplicateDocument(invoice.number.clone()));
        }
        let request = invoice.posting_request()?;
        let total = request
            .lines
            .first()
            .map_or(Decimal::ZERO, |line| line.debit);
        let entry = self.submit_posting(request)?;
        let open_item = OpenItem {
            id: OpenItemId::new(),
            kind: OpenItemKind::Receivable,
            party: invoice.customer.clone(),
            document_ref: invoice.number.clone(),
            date: invoice.date,
            due_date: invoice.due_date.unwrap_or(invoice.date),
            total,
            allocated: Decimal::ZERO,
            entry_id: entry.id,
            status: OpenItemStatus::Open,
        };
        self.subledger.register_item(open_item.clone())?;
        self.changes.open_items.insert(open_item.id);
        Ok(DocumentPosting { entry, open_item })
    }

    /// Cancels a posted sales invoice by reversing its entry.
    ///
    /// Cancellation never happens implicitly; the caller decides.
    pub fn cancel_sales_invoice(
        &mut self,
        number: &str,
        request: &ReversalRequest,
    ) -> Result<JournalEntry, LedgerError> {
        self.cancel_document(OpenItemKind::Receivable, number, request)
    }

    pub(crate) fn cancel_document(
        &mut self,
        kind: OpenItemKind,
        number: &str,
        request: &ReversalRequest,
    ) -> Result<JournalEntry, LedgerError> {
        let item = self
            .subledger
            .item_by_ref(kind, number)
            .ok_or_else(|| LedgerError::InvalidDocument(format!("unknown document {number}")))?;
        let (id, entry_id) = (item.id, item.entry_id);
        self.subledger.cancel_item(id)?;
        self.changes.open_items.insert(id);
        self.reverse(entry_id, request)
    }
}
