//! VAT settlement and corporate tax postings.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::sales::system_user;
use super::{bank_line, require_positive};
use crate::determination::TransactionType;
use crate::ledger::{
    EntryType, JournalEntry, LedgerError, PostingLine, PostingRequest, SourceModule,
    SubmitPosting,
};

/// Closing of the VAT accounts for a return period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatSettlement {
    /// Return reference (`VAT-2026-Q1`).
    pub reference: String,
    /// Posting date.
    pub date: NaiveDate,
    /// Output VAT to clear.
    pub output_vat: Decimal,
    /// Input VAT to clear.
    pub input_vat: Decimal,
    /// Adjustments increasing (positive) or reducing (negative) the liability.
    #[serde(default)]
    pub adjustments: Decimal,
    /// Acting user.
    #[serde(default = "system_user")]
    pub user: String,
}

impl VatSettlement {
    /// Output less input plus adjustments; negative means refundable.
    #[must_use]
    pub fn net_payable(&self) -> Decimal {
        self.output_vat - self.input_vat + self.adjustments
    }
}

/// Debit for a positive amount, credit for a negative one.
fn signed_debit(
    transaction_type: TransactionType,
    amount: Decimal,
    description: &str,
) -> PostingLine {
    if amount < Decimal::ZERO {
        PostingLine::credit(transaction_type, -amount, description)
    } else {
        PostingLine::debit(transaction_type, amount, description)
    }
}

/// Posts a VAT return.
///
/// VAT payable Dr output, VAT recoverable Cr input, adjustments Dr against
/// `vat_adjustment`, and the net to the VAT settlement account: Cr when
/// payable, Dr when refundable.
pub fn post_vat_settlement<P: SubmitPosting + ?Sized>(
    ledger: &mut P,
    settlement: &VatSettlement,
) -> Result<JournalEntry, LedgerError> {
    if settlement.output_vat < Decimal::ZERO || settlement.input_vat < Decimal::ZERO {
        return Err(LedgerError::InvalidDocument(
            "VAT totals must not be negative".into(),
        ));
    }
    let net = settlement.net_payable();
    let request = PostingRequest::new(SourceModule::Vat, settlement.date, settlement.reference.clone())
        .with_description(format!("VAT return {}", settlement.reference))
        .with_source_id(settlement.reference.clone())
        .by(settlement.user.clone())
        .line(PostingLine::debit(TransactionType::VatOutput, settlement.output_vat, "Clear output VAT"))
        .line(PostingLine::credit(TransactionType::VatInput, settlement.input_vat, "Clear input VAT"))
        .line(signed_debit(TransactionType::VatAdjustment, settlement.adjustments, "VAT adjustments"))
        .line(signed_debit(
            TransactionType::VatPayable,
            -net,
            if net < Decimal::ZERO { "VAT refundable" } else { "VAT payable" },
        ));
    ledger.submit_posting(request)
}

/// Corporate tax provision for a fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorporateTaxProvision {
    /// Reference (`CT-FY2026`).
    pub reference: String,
    /// Posting date, usually the year end.
    pub date: NaiveDate,
    /// Tax payable.
    pub amount: Decimal,
    /// Acting user.
    #[serde(default = "system_user")]
    pub user: String,
}

/// Payment of corporate tax to the authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorporateTaxPayment {
    /// Payment reference.
    pub reference: String,
    /// Value date.
    pub date: NaiveDate,
    /// Amount paid.
    pub amount: Decimal,
    /// Bank account; defaults to the mapped bank.
    #[serde(default)]
    pub bank_account: Option<String>,
    /// Acting user.
    #[serde(default = "system_user")]
    pub user: String,
}

/// Books the provision: tax expense Dr, tax payable Cr, as an adjusting entry.
pub fn post_corporate_tax_provision<P: SubmitPosting + ?Sized>(
    ledger: &mut P,
    provision: &CorporateTaxProvision,
) -> Result<JournalEntry, LedgerError> {
    require_positive(provision.amount, "tax provision must be positive")?;
    let request =
        PostingRequest::new(SourceModule::CorporateTax, provision.date, provision.reference.clone())
            .with_description(format!("Corporate tax provision {}", provision.reference))
            .with_entry_type(EntryType::Adjusting)
            .by(provision.user.clone())
            .line(PostingLine::debit(
                TransactionType::CorporateTaxExpense,
                provision.amount,
                "Corporate tax expense",
            ))
            .line(PostingLine::credit(
                TransactionType::CorporateTaxPayable,
                provision.amount,
                "Corporate tax payable",
            ));
    ledger.submit_posting(request)
}

/// Books the payment: tax payable Dr, bank Cr.
pub fn post_corporate_tax_payment<P: SubmitPosting + ?Sized>(
    ledger: &mut P,
    payment: &CorporateTaxPayment,
) -> Result<JournalEntry, LedgerError> {
    require_positive(payment.amount, "tax payment must be positive")?;
    let request =
        PostingRequest::new(SourceModule::CorporateTax, payment.date, payment.reference.clone())
            .with_description(format!("Corporate tax payment {}", payment.reference))
            .by(payment.user.clone())
            .line(PostingLine::debit(
                TransactionType::CorporateTaxPayable,
                payment.amount,
                "Corporate tax settled",
            ))
            .line(bank_line(
                payment.bank_account.as_deref(),
                TransactionType::VendorPayment,
                Decimal::ZERO,
                payment.amount,
                "Corporate tax payment",
            ));
    ledger.submit_posting(request)
}
