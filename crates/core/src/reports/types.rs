//! Report data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::chart::AccountType;
use crate::ledger::{JournalEntry, JournalLine, LedgerState, SourceModule};

/// Optional narrowing applied to the lines a report reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFilter {
    /// Only this account.
    #[serde(default)]
    pub account_code: Option<String>,
    /// Only lines whose entry comes from this module.
    #[serde(default)]
    pub source_module: Option<SourceModule>,
}

impl ReportFilter {
    /// No filtering.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restricts to one account.
    #[must_use]
    pub fn account(code: impl Into<String>) -> Self {
        Self {
            account_code: Some(code.into()),
            source_module: None,
        }
    }

    /// Restricts to one source module.
    #[must_use]
    pub fn source(source_module: SourceModule) -> Self {
        Self {
            account_code: None,
            source_module: Some(source_module),
        }
    }

    pub(crate) fn accepts_account(&self, code: &str) -> bool {
        self.account_code.as_deref().is_none_or(|c| c == code)
    }

    /// Opening balances belong to no module, so a source filter drops them.
    pub(crate) fn includes_opening(&self) -> bool {
        self.source_module.is_none()
    }

    pub(crate) fn accepts_line(
        &self,
        state: &LedgerState,
        entry: &JournalEntry,
        line: &JournalLine,
    ) -> bool {
        self.accepts_account(&line.account_code)
            && self
                .source_module
                .is_none_or(|source| state.effective_source(entry) == source)
    }
}

/// One trial balance row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Debit column.
    pub debit: Decimal,
    /// Credit column.
    pub credit: Decimal,
    /// Balance on the account's normal side.
    pub balance: Decimal,
    /// Balance sits on the wrong side.
    pub is_abnormal: bool,
    /// Balance as printed, negatives in parentheses.
    pub display: String,
}

/// Trial balance totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceTotals {
    /// Total debit.
    pub total_debit: Decimal,
    /// Total credit.
    pub total_credit: Decimal,
    /// Whether debits equal credits.
    pub is_balanced: bool,
}

/// Trial balance report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceReport {
    /// As of date.
    pub as_of: NaiveDate,
    /// Currency code.
    pub currency: String,
    /// Leaf accounts with a balance or activity.
    pub rows: Vec<TrialBalanceRow>,
    /// Totals.
    pub totals: TrialBalanceTotals,
}

/// One line of an account's ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerLine {
    /// Entry date.
    pub date: NaiveDate,
    /// Entry number.
    pub entry_number: String,
    /// Entry reference.
    pub reference: String,
    /// Line description, or the entry's when empty.
    pub description: String,
    /// Source module of the entry.
    pub source_module: SourceModule,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Normal-side balance after this line.
    pub balance: Decimal,
}

/// Ledger of one account over a range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountLedger {
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Balance before the range.
    pub opening_balance: Decimal,
    /// Lines in date order.
    pub lines: Vec<LedgerLine>,
    /// Total debits in the range.
    pub total_debit: Decimal,
    /// Total credits in the range.
    pub total_credit: Decimal,
    /// Balance after the range.
    pub closing_balance: Decimal,
}

/// General ledger report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralLedgerReport {
    /// First day.
    pub period_start: NaiveDate,
    /// Last day.
    pub period_end: NaiveDate,
    /// Currency code.
    pub currency: String,
    /// One ledger per account with a balance or activity.
    pub accounts: Vec<AccountLedger>,
}

/// An account and its amount in a statement section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountAmount {
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Normal-side amount.
    pub amount: Decimal,
}

/// A group of accounts with a total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSection {
    /// Accounts.
    pub accounts: Vec<AccountAmount>,
    /// Sum of the amounts.
    pub total: Decimal,
}

impl ReportSection {
    pub(crate) fn push(&mut self, code: &str, name: &str, amount: Decimal) {
        self.total += amount;
        self.accounts.push(AccountAmount {
            code: code.to_string(),
            name: name.to_string(),
            amount,
        });
    }
}

/// Profit and loss report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitAndLossReport {
    /// First day.
    pub period_start: NaiveDate,
    /// Last day.
    pub period_end: NaiveDate,
    /// Currency code.
    pub currency: String,
    /// Income accounts.
    pub income: ReportSection,
    /// Expense accounts.
    pub expenses: ReportSection,
    /// Income less expenses.
    pub net_income: Decimal,
}

/// Balance sheet report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSheetReport {
    /// As of date.
    pub as_of: NaiveDate,
    /// Currency code.
    pub currency: String,
    /// Asset accounts.
    pub assets: ReportSection,
    /// Liability accounts.
    pub liabilities: ReportSection,
    /// Equity accounts, excluding current earnings.
    pub equity: ReportSection,
    /// Unclosed profit folded into equity.
    pub current_earnings: Decimal,
    /// Equity plus current earnings.
    pub total_equity: Decimal,
    /// Liabilities plus total equity.
    pub liabilities_and_equity: Decimal,
    /// Whether assets equal liabilities plus equity.
    pub is_balanced: bool,
}

/// Cash flow activity class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CashFlowCategory {
    /// Trading.
    Operating,
    /// Long-term assets.
    Investing,
    /// Owners and lenders.
    Financing,
}

impl CashFlowCategory {
    /// Class of a source module.
    ///
    /// Transfers between two cash accounts net to zero, so a bank transfer
    /// that moves cash at all is a fixed deposit placement or withdrawal.
    #[must_use]
    pub fn of(source: SourceModule) -> Self {
        match source {
            SourceModule::FixedAsset | SourceModule::BankTransfer => Self::Investing,
            SourceModule::Financing => Self::Financing,
            _ => Self::Operating,
        }
    }
}

/// One entry's effect on cash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowItem {
    /// Entry date.
    pub date: NaiveDate,
    /// Entry number.
    pub entry_number: String,
    /// Entry description.
    pub description: String,
    /// Source module used for classification.
    pub source_module: SourceModule,
    /// Net cash in (positive) or out (negative).
    pub amount: Decimal,
}

/// Items of one activity class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowSection {
    /// Items in date order.
    pub items: Vec<CashFlowItem>,
    /// Net of the items.
    pub total: Decimal,
}

/// Direct-method cash flow statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowReport {
    /// First day.
    pub period_start: NaiveDate,
    /// Last day.
    pub period_end: NaiveDate,
    /// Currency code.
    pub currency: String,
    /// Cash accounts included.
    pub cash_accounts: Vec<String>,
    /// Cash before the range.
    pub opening_cash: Decimal,
    /// Operating activities.
    pub operating: CashFlowSection,
    /// Investing activities.
    pub investing: CashFlowSection,
    /// Financing activities.
    pub financing: CashFlowSection,
    /// Sum of the three sections.
    pub net_change: Decimal,
    /// Cash after the range per the ledger.
    pub closing_cash: Decimal,
    /// Whether opening plus net change equals closing.
    pub is_reconciled: bool,
}

/// Age bucket of an overdue amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgingBucket {
    /// Not yet due.
    Current,
    /// 1 to 30 days overdue.
    Days1To30,
    /// 31 to 60 days overdue.
    Days31To60,
    /// 61 to 90 days overdue.
    Days61To90,
    /// More than 90 days overdue.
    Over90,
}

impl AgingBucket {
    /// Bucket for a number of days past due.
    #[must_use]
    pub fn for_days(days_overdue: i64) -> Self {
        match days_overdue {
            i64::MIN..=0 => Self::Current,
            1..=30 => Self::Days1To30,
            31..=60 => Self::Days31To60,
            61..=90 => Self::Days61To90,
            _ => Self::Over90,
        }
    }
}

/// One outstanding document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingItem {
    /// Document number.
    pub document_ref: String,
    /// Customer or vendor.
    pub party: String,
    /// Document date.
    pub date: NaiveDate,
    /// Due date.
    pub due_date: NaiveDate,
    /// Document total.
    pub total: Decimal,
    /// Outstanding as of the report date.
    pub outstanding: Decimal,
    /// Days past due.
    pub days_overdue: i64,
    /// Bucket.
    pub bucket: AgingBucket,
}

/// Outstanding amounts per bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingTotals {
    /// Not yet due.
    pub current: Decimal,
    /// 1 to 30 days.
    pub days_1_30: Decimal,
    /// 31 to 60 days.
    pub days_31_60: Decimal,
    /// 61 to 90 days.
    pub days_61_90: Decimal,
    /// Over 90 days.
    pub over_90: Decimal,
    /// All buckets.
    pub total: Decimal,
}

impl AgingTotals {
    pub(crate) fn add(&mut self, bucket: AgingBucket, amount: Decimal) {
        let slot = match bucket {
            AgingBucket::Current => &mut self.current,
            AgingBucket::Days1To30 => &mut self.days_1_30,
            AgingBucket::Days31To60 => &mut self.days_31_60,
            AgingBucket::Days61To90 => &mut self.days_61_90,
            AgingBucket::Over90 => &mut self.over_90,
        };
        *slot += amount;
        self.total += amount;
    }
}

/// Buckets of one party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyAging {
    /// Customer or vendor.
    pub party: String,
    /// Bucket totals.
    pub totals: AgingTotals,
}

/// AR or AP aging report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingReport {
    /// Report date.
    pub as_of: NaiveDate,
    /// Receivables or payables.
    pub kind: crate::subledger::OpenItemKind,
    /// Documents with an outstanding amount.
    pub items: Vec<AgingItem>,
    /// Totals per party.
    pub parties: Vec<PartyAging>,
    /// Grand totals.
    pub totals: AgingTotals,
    /// Control account.
    pub control_account: String,
    /// Control account balance as of the report date.
    pub control_balance: Decimal,
    /// Whether the subledger agrees with the control account.
    pub is_consistent: bool,
}

/// Whether a VAT return is payable or refundable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VatPosition {
    /// Net amount due to the authority.
    Payable,
    /// Net amount due from the authority.
    Refundable,
    /// Nothing due either way.
    Nil,
}

/// VAT return for a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatReturn {
    /// First day.
    pub period_start: NaiveDate,
    /// Last day.
    pub period_end: NaiveDate,
    /// Net sales on sales documents.
    pub taxable_sales: Decimal,
    /// VAT charged on sales.
    pub output_vat: Decimal,
    /// Net purchases on purchase documents.
    pub taxable_purchases: Decimal,
    /// VAT recoverable on purchases.
    pub input_vat: Decimal,
    /// Manual adjustments.
    pub adjustments: Decimal,
    /// Output less input plus adjustments.
    pub net_vat: Decimal,
    /// Direction of the net amount.
    pub position: VatPosition,
}

/// Corporate tax computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorporateTaxReport {
    /// First day.
    pub period_start: NaiveDate,
    /// Last day.
    pub period_end: NaiveDate,
    /// Income for the period.
    pub revenue: Decimal,
    /// Expenses for the period, tax expense excluded.
    pub expenses: Decimal,
    /// Revenue less expenses.
    pub accounting_profit: Decimal,
    /// Non-deductible expenses added back.
    pub non_deductible_addbacks: Decimal,
    /// Exempt income deducted.
    pub exempt_income: Decimal,
    /// Profit after adjustments.
    pub taxable_income: Decimal,
    /// Exempt threshold.
    pub threshold: Decimal,
    /// Tax rate.
    pub rate: Decimal,
    /// Tax due.
    pub tax_payable: Decimal,
}
