//! Semantic transaction types used by producers instead of account codes.

use serde::{Deserialize, Serialize};

/// A semantic role a posting line plays.
///
/// Producers name the role; account determination turns it into a concrete
/// leaf account through the mapping table or the hardcoded fallback code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Customer receivable raised by an invoice.
    SalesInvoiceReceivable,
    /// Revenue recognised by an invoice.
    SalesInvoiceRevenue,
    /// Output VAT charged on an invoice.
    SalesInvoiceVat,
    /// Bank side of a customer receipt.
    CustomerReceipt,
    /// Receivable settled by a receipt.
    CustomerReceiptArClear,
    /// Receipt in excess of open invoices.
    CustomerAdvance,
    /// Vendor payable raised by a bill.
    VendorBillPayable,
    /// Expense recognised by a bill.
    VendorBillExpense,
    /// Recoverable input VAT on a bill.
    VendorBillVat,
    /// Bank side of a vendor payment.
    VendorPayment,
    /// Payable settled by a payment.
    VendorPaymentApClear,
    /// Payment in excess of open bills.
    VendorAdvance,
    /// Expense recognised by an employee claim.
    ExpenseClaimExpense,
    /// Recoverable VAT on a claim backed by receipts.
    ExpenseClaimVat,
    /// Amount owed to the claiming employee.
    ExpenseClaimPayable,
    /// Gross salaries of a payroll run.
    PayrollSalaryExpense,
    /// Net salaries owed to employees.
    PayrollSalaryPayable,
    /// Amounts withheld from salaries.
    PayrollDeduction,
    /// Bank side of a salary payment.
    PayrollPayment,
    /// Salary payable settled by a payment.
    PayrollPaymentClear,
    /// Capitalised cost of an asset.
    FixedAsset,
    /// Credit side of an acquisition.
    FixedAssetClearing,
    /// Monthly depreciation charge.
    DepreciationExpense,
    /// Depreciation booked against an asset so far.
    AccumulatedDepreciation,
    /// Proceeds above book value.
    GainOnDisposal,
    /// Book value above proceeds.
    LossOnDisposal,
    /// Money receivable from a disposal.
    DisposalProceeds,
    /// Corporate tax charge for the year.
    CorporateTaxExpense,
    /// Corporate tax owed to the authority.
    CorporateTaxPayable,
    /// Output VAT cleared by a settlement.
    VatOutput,
    /// Input VAT cleared by a settlement.
    VatInput,
    /// Net VAT owed or refundable after a settlement.
    VatPayable,
    /// Correction to a VAT return.
    VatAdjustment,
    /// Fees charged by the bank.
    BankCharges,
    /// Interest credited by the bank.
    BankInterestIncome,
    /// Exchange gain.
    FxGain,
    /// Exchange loss.
    FxLoss,
    /// Profit carried into equity at year end.
    RetainedEarnings,
    /// Balancing side of opening balances.
    OpeningBalanceEquity,
    /// Unidentified amounts awaiting review.
    Suspense,
    /// Post-dated cheques deposited but not yet cleared.
    PdcControl,
}

impl TransactionType {
    /// Every transaction type, in declaration order.
    pub const ALL: [Self; 41] = [
        Self::SalesInvoiceReceivable,
        Self::SalesInvoiceRevenue,
        Self::SalesInvoiceVat,
        Self::CustomerReceipt,
        Self::CustomerReceiptArClear,
        Self::CustomerAdvance,
        Self::VendorBillPayable,
        Self::VendorBillExpense,
        Self::VendorBillVat,
        Self::VendorPayment,
        Self::VendorPaymentApClear,
        Self::VendorAdvance,
        Self::ExpenseClaimExpense,
        Self::ExpenseClaimVat,
        Self::ExpenseClaimPayable,
        Self::PayrollSalaryExpense,
        Self::PayrollSalaryPayable,
        Self::PayrollDeduction,
        Self::PayrollPayment,
        Self::PayrollPaymentClear,
        Self::FixedAsset,
        Self::FixedAssetClearing,
        Self::DepreciationExpense,
        Self::AccumulatedDepreciation,
        Self::GainOnDisposal,
        Self::LossOnDisposal,
        Self::DisposalProceeds,
        Self::CorporateTaxExpense,
        Self::CorporateTaxPayable,
        Self::VatOutput,
        Self::VatInput,
        Self::VatPayable,
        Self::VatAdjustment,
        Self::BankCharges,
        Self::BankInterestIncome,
        Self::FxGain,
        Self::FxLoss,
        Self::RetainedEarnings,
        Self::OpeningBalanceEquity,
        Self::Suspense,
        Self::PdcControl,
    ];

    /// Hardcoded default account code, used when no mapping row exists.
    #[must_use]
    pub const fn fallback_code(self) -> &'static str {
        match self {
            Self::SalesInvoiceReceivable
            | Self::CustomerReceiptArClear
            | Self::DisposalProceeds => "1200",
            Self::SalesInvoiceRevenue => "4000",
            Self::SalesInvoiceVat | Self::VatOutput => "2100",
            Self::CustomerReceipt | Self::VendorPayment | Self::PayrollPayment => "1100",
            Self::CustomerAdvance => "2200",
            Self::VendorBillPayable | Self::VendorPaymentApClear | Self::FixedAssetClearing => {
                "2000"
            }
            Self::VendorBillExpense | Self::ExpenseClaimExpense => "5000",
            Self::VendorBillVat | Self::ExpenseClaimVat | Self::VatInput => "1300",
            Self::VendorAdvance => "1700",
            Self::ExpenseClaimPayable => "2210",
            Self::PayrollSalaryExpense => "5100",
            Self::PayrollSalaryPayable | Self::PayrollDeduction | Self::PayrollPaymentClear => {
                "2300"
            }
            Self::FixedAsset => "1400",
            Self::DepreciationExpense => "5300",
            Self::AccumulatedDepreciation => "1401",
            Self::GainOnDisposal => "4500",
            Self::LossOnDisposal => "5400",
            Self::CorporateTaxExpense => "5900",
            Self::CorporateTaxPayable => "2400",
            Self::VatPayable => "2110",
            Self::VatAdjustment | Self::Suspense => "9000",
            Self::BankCharges => "7000",
            Self::BankInterestIncome => "4100",
            Self::FxGain => "8000",
            Self::FxLoss => "8100",
            Self::RetainedEarnings => "3000",
            Self::OpeningBalanceEquity => "3100",
            Self::PdcControl => "1600",
        }
    }

    /// Returns the snake_case name used in mapping rows.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SalesInvoiceReceivable => "sales_invoice_receivable",
            Self::SalesInvoiceRevenue => "sales_invoice_revenue",
            Self::SalesInvoiceVat => "sales_invoice_vat",
            Self::CustomerReceipt => "customer_receipt",
            Self::CustomerReceiptArClear => "customer_receipt_ar_clear",
            Self::CustomerAdvance => "customer_advance",
            Self::VendorBillPayable => "vendor_bill_payable",
            Self::VendorBillExpense => "vendor_bill_expense",
            Self::VendorBillVat => "vendor_bill_vat",
            Self::VendorPayment => "vendor_payment",
            Self::VendorPaymentApClear => "vendor_payment_ap_clear",
            Self::VendorAdvance => "vendor_advance",
            Self::ExpenseClaimExpense => "expense_claim_expense",
            Self::ExpenseClaimVat => "expense_claim_vat",
            Self::ExpenseClaimPayable => "expense_claim_payable",
            Self::PayrollSalaryExpense => "payroll_salary_expense",
            Self::PayrollSalaryPayable => "payroll_salary_payable",
            Self::PayrollDeduction => "payroll_deduction",
            Self::PayrollPayment => "payroll_payment",
            Self::PayrollPaymentClear => "payroll_payment_clear",
            Self::FixedAsset => "fixed_asset",
            Self::FixedAssetClearing => "fixed_asset_clearing",
            Self::DepreciationExpense => "depreciation_expense",
            Self::AccumulatedDepreciation => "accumulated_depreciation",
            Self::GainOnDisposal => "gain_on_disposal",
            Self::LossOnDisposal => "loss_on_disposal",
            Self::DisposalProceeds => "disposal_proceeds",
            Self::CorporateTaxExpense => "corporate_tax_expense",
            Self::CorporateTaxPayable => "corporate_tax_payable",
            Self::VatOutput => "vat_output",
            Self::VatInput => "vat_input",
            Self::VatPayable => "vat_payable",
            Self::VatAdjustment => "vat_adjustment",
            Self::BankCharges => "bank_charges",
            Self::BankInterestIncome => "bank_interest_income",
            Self::FxGain => "fx_gain",
            Self::FxLoss => "fx_loss",
            Self::RetainedEarnings => "retained_earnings",
            Self::OpeningBalanceEquity => "opening_balance_equity",
            Self::Suspense => "suspense",
            Self::PdcControl => "pdc_control",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown transaction type: {s}"))
    }
}
