//! Payroll runs and salary payments.
//!
//! Payroll keeps no subledger state here, so both producers work against
//! any [`SubmitPosting`] implementation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::sales::system_user;
use super::{bank_line, require_positive};
use crate::determination::TransactionType;
use crate::ledger::{
    JournalEntry, LedgerError, PostingLine, PostingRequest, SourceModule, SubmitPosting,
};

/// One employee's pay for the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payslip {
    /// Employee identifier.
    pub employee: String,
    /// Basic salary.
    pub basic: Decimal,
    /// Allowances.
    #[serde(default)]
    pub allowances: Decimal,
    /// Deductions withheld.
    #[serde(default)]
    pub deductions: Decimal,
}

impl Payslip {
    /// Basic plus allowances.
    #[must_use]
    pub fn gross(&self) -> Decimal {
        self.basic + self.allowances
    }

    /// Gross less deductions.
    #[must_use]
    pub fn net(&self) -> Decimal {
        self.gross() - self.deductions
    }
}

/// A monthly payroll run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRun {
    /// Run reference (`PR-2026-03`).
    pub reference: String,
    /// Posting date, usually the month end.
    pub date: NaiveDate,
    /// Payslips.
    pub payslips: Vec<Payslip>,
    /// Acting user.
    #[serde(default = "system_user")]
    pub user: String,
}

/// Transfer of net salaries to employees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryPayment {
    /// Payment reference.
    pub reference: String,
    /// Value date.
    pub date: NaiveDate,
    /// Amount paid.
    pub amount: Decimal,
    /// Bank account; defaults to the mapped payroll bank.
    #[serde(default)]
    pub bank_account: Option<String>,
    /// Acting user.
    #[serde(default = "system_user")]
    pub user: String,
}

/// Posts a payroll run.
///
/// Salary expense Dr gross, salary payable Cr net, deductions Cr through
/// `payroll_deduction`, which falls back to salary payable.
pub fn post_payroll_run<P: SubmitPosting + ?Sized>(
    ledger: &mut P,
    run: &PayrollRun,
) -> Result<JournalEntry, LedgerError> {
    if run.payslips.is_empty() {
        return Err(LedgerError::InvalidDocument("payroll run has no payslips".into()));
    }
    let mut gross = Decimal::ZERO;
    let mut net = Decimal::ZERO;
    let mut deductions = Decimal::ZERO;
    for slip in &run.payslips {
        require_positive(slip.basic, "basic salary must be positive")?;
        if slip.allowances < Decimal::ZERO || slip.deductions < Decimal::ZERO {
            return Err(LedgerError::InvalidDocument(format!(
                "negative allowance or deduction for {}",
                slip.employee
            )));
        }
        if slip.net() < Decimal::ZERO {
            return Err(LedgerError::InvalidDocument(format!(
                "deductions exceed gross pay for {}",
                slip.employee
            )));
        }
        gross += slip.gross();
        net += slip.net();
        deductions += slip.deductions;
    }

    let request = PostingRequest::new(SourceModule::Payroll, run.date, run.reference.clone())
        .with_description(format!("Payroll {}", run.reference))
        .with_source_id(run.reference.clone())
        .by(run.user.clone())
        .line(PostingLine::debit(
            TransactionType::PayrollSalaryExpense,
            gross,
            "Gross salaries",
        ))
        .line(PostingLine::credit(
            TransactionType::PayrollSalaryPayable,
            net,
            "Net salaries payable",
        ))
        .line(PostingLine::credit(
            TransactionType::PayrollDeduction,
            deductions,
            "Payroll deductions",
        ));
    ledger.submit_posting(request)
}

/// Posts the payment of net salaries: salary payable Dr, bank Cr.
pub fn post_salary_payment<P: SubmitPosting + ?Sized>(
    ledger: &mut P,
    payment: &SalaryPayment,
) -> Result<JournalEntry, LedgerError> {
    require_positive(payment.amount, "salary payment must be positive")?;
    let request = PostingRequest::new(SourceModule::Payroll, payment.date, payment.reference.clone())
        .with_description(format!("Salary payment {}", payment.reference))
        .by(payment.user.clone())
        .line(PostingLine::debit(
            TransactionType::PayrollPaymentClear,
            payment.amount,
            "Salaries paid",
        ))
        .line(bank_line(
            payment.bank_account.as_deref(),
            TransactionType::PayrollPayment,
            Decimal::ZERO,
            payment.amount,
            "Salary transfer",
        ));
    ledger.submit_posting(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::testing::{date, standard_ledger};
    use rust_decimal_macros::dec;

    fn run() -> PayrollRun {
        PayrollRun {
            reference: "PR-2026-03".into(),
            date: date(2026, 3, 31),
            payslips: vec![
                Payslip {
                    employee: "E1".into(),
                    basic: dec!(8000),
                    allowances: dec!(2000),
                    deductions: dec!(500),
                },
                Payslip {
                    employee: "E2".into(),
                    basic: dec!(5000),
                    allowances: Decimal::ZERO,
                    deductions: Decimal::ZERO,
                },
            ],
            user: "hr".into(),
        }
    }

    #[test]
    fn test_deductions_default_to_salary_payable() {
        let mut state = standard_ledger();
        let entry = post_payroll_run(&mut state, &run()).unwrap();
        assert_eq!(entry.total_debit, dec!(15000));
        assert!(entry.lines[1..].iter().all(|l| l.account_code == "2300"));
        assert_eq!(state.chart().get("5100").unwrap().current_balance, dec!(15000));
        assert_eq!(state.chart().get("2300").unwrap().current_balance, dec!(15000));
    }

    #[test]
    fn test_deduction_mapping_is_pluggable() {
        let mut state = standard_ledger();
        state
            .set_mapping(TransactionType::PayrollDeduction, "2210")
            .unwrap();
        post_payroll_run(&mut state, &run()).unwrap();
        assert_eq!(state.chart().get("2300").unwrap().current_balance, dec!(14500));
        assert_eq!(state.chart().get("2210").unwrap().current_balance, dec!(500));
    }

    #[test]
    fn test_salary_payment_clears_payable() {
        let mut state = standard_ledger();
        post_payroll_run(&mut state, &run()).unwrap();
        post_salary_payment(
            &mut state,
            &SalaryPayment {
                reference: "SP-2026-03".into(),
                date: date(2026, 4, 1),
                amount: dec!(14500),
                bank_account: None,
                user: "hr".into(),
            },
        )
        .unwrap();
        assert_eq!(state.chart().get("2300").unwrap().current_balance, dec!(500));
        assert_eq!(state.chart().get("1100").unwrap().current_balance, dec!(-14500));
    }

    #[test]
    fn test_negative_net_rejected() {
        let mut state = standard_ledger();
        let mut bad = run();
        bad.payslips[1].deductions = dec!(6000);
        assert!(matches!(
            post_payroll_run(&mut state, &bad),
            Err(LedgerError::InvalidDocument(_))
        ));
    }
}
