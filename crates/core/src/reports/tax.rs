//! VAT return and corporate tax computations.

use chrono::NaiveDate;
use folio_shared::types::{FiscalYearId, round_money};
use rust_decimal::Decimal;

use super::error::{ReportError, check_range};
use super::service::ReportService;
use super::types::{CorporateTaxReport, VatPosition, VatReturn};
use crate::chart::AccountType;
use crate::determination::TransactionType;
use crate::ledger::{EntryType, LedgerState, SourceModule};
use crate::producers::{CorporateTaxProvision, VatSettlement};

impl ReportService {
    /// VAT return for a range.
    ///
    /// Output VAT is read from sales-sourced lines on the output VAT
    /// account, input VAT from purchase-sourced lines on the recoverable
    /// account. Reversals count under their original's source.
    pub fn vat_return(
        state: &LedgerState,
        from: NaiveDate,
        to: NaiveDate,
        adjustments: Decimal,
    ) -> Result<VatReturn, ReportError> {
        check_range(from, to)?;
        let output_account = state.resolve(TransactionType::SalesInvoiceVat, None)?;
        let input_account = state.resolve(TransactionType::VendorBillVat, None)?;

        let mut report = VatReturn {
            period_start: from,
            period_end: to,
            taxable_sales: Decimal::ZERO,
            output_vat: Decimal::ZERO,
            taxable_purchases: Decimal::ZERO,
            input_vat: Decimal::ZERO,
            adjustments,
            net_vat: Decimal::ZERO,
            position: VatPosition::Nil,
        };
        for (entry, line) in state.posted_lines() {
            if entry.date < from || entry.date > to {
                continue;
            }
            let account_type = state.chart().get(&line.account_code).map(|a| a.account_type);
            match state.effective_source(entry) {
                SourceModule::Sales if line.account_code == output_account => {
                    report.output_vat += line.credit - line.debit;
                }
                SourceModule::Sales if account_type == Some(AccountType::Income) => {
                    report.taxable_sales += line.credit - line.debit;
                }
                SourceModule::Purchase if line.account_code == input_account => {
                    report.input_vat += line.debit - line.credit;
                }
                SourceModule::Purchase
                    if matches!(account_type, Some(AccountType::Expense | AccountType::Asset)) =>
                {
                    report.taxable_purchases += line.debit - line.credit;
                }
                _ => {}
            }
        }
        report.net_vat = report.output_vat - report.input_vat + adjustments;
        report.position = if report.net_vat > Decimal::ZERO {
            VatPosition::Payable
        } else if report.net_vat < Decimal::ZERO {
            VatPosition::Refundable
        } else {
            VatPosition::Nil
        };
        Ok(report)
    }

    /// Corporate tax for a range.
    ///
    /// `tax = max(0, taxable_income - threshold) * rate`, with threshold and
    /// rate from the ledger settings. Closing entries and the tax postings
    /// themselves are left out of profit.
    pub fn corporate_tax(
        state: &LedgerState,
        from: NaiveDate,
        to: NaiveDate,
        non_deductible_addbacks: Decimal,
        exempt_income: Decimal,
    ) -> Result<CorporateTaxReport, ReportError> {
        check_range(from, to)?;
        if non_deductible_addbacks < Decimal::ZERO || exempt_income < Decimal::ZERO {
            return Err(ReportError::InvalidParameter(
                "add-backs and exempt income must not be negative",
            ));
        }
        let mut revenue = Decimal::ZERO;
        let mut expenses = Decimal::ZERO;
        for (entry, line) in state.posted_lines() {
            if entry.date < from
                || entry.date > to
                || entry.entry_type == EntryType::Closing
                || state.effective_source(entry) == SourceModule::CorporateTax
            {
                continue;
            }
            match state.chart().get(&line.account_code).map(|a| a.account_type) {
                Some(AccountType::Income) => revenue += line.credit - line.debit,
                Some(AccountType::Expense) => expenses += line.debit - line.credit,
                _ => {}
            }
        }

        let settings = state.settings();
        let accounting_profit = revenue - expenses;
        let taxable_income = accounting_profit + non_deductible_addbacks - exempt_income;
        let tax_payable = round_money(
            (taxable_income - settings.corporate_tax_threshold).max(Decimal::ZERO)
                * settings.corporate_tax_rate,
        );
        Ok(CorporateTaxReport {
            period_start: from,
            period_end: to,
            revenue,
            expenses,
            accounting_profit,
            non_deductible_addbacks,
            exempt_income,
            taxable_income,
            threshold: settings.corporate_tax_threshold,
            rate: settings.corporate_tax_rate,
            tax_payable,
        })
    }

    /// Corporate tax over one fiscal year.
    pub fn corporate_tax_for_year(
        state: &LedgerState,
        fiscal_year_id: FiscalYearId,
        non_deductible_addbacks: Decimal,
        exempt_income: Decimal,
    ) -> Result<CorporateTaxReport, ReportError> {
        let year = state.calendar().require_year(fiscal_year_id)?;
        Self::corporate_tax(
            state,
            year.start_date,
            year.end_date,
            non_deductible_addbacks,
            exempt_income,
        )
    }
}

impl VatReturn {
    /// Settlement posting that clears this return.
    #[must_use]
    pub fn settlement(&self, reference: impl Into<String>, user: impl Into<String>) -> VatSettlement {
        VatSettlement {
            reference: reference.into(),
            date: self.period_end,
            output_vat: self.output_vat,
            input_vat: self.input_vat,
            adjustments: self.adjustments,
            user: user.into(),
        }
    }
}

impl CorporateTaxReport {
    /// Provision for the computed tax, if any is due.
    #[must_use]
    pub fn provision(
        &self,
        reference: impl Into<String>,
        user: impl Into<String>,
    ) -> Option<CorporateTaxProvision> {
        (self.tax_payable > Decimal::ZERO).then(|| CorporateTaxProvision {
            reference: reference.into(),
            date: self.period_end,
            amount: self.tax_payable,
            user: user.into(),
        })
    }
}
