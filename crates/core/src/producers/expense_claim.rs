//! Employee expense claims and their reimbursement.
//!
//! VAT on a claim is recoverable only when the employee handed in tax
//! receipts and the expense is deductible; otherwise it is part of the
//! expense. Claims keep no subledger state, so both producers work against
//! any [`SubmitPosting`] implementation.

use chrono::NaiveDate;
use folio_shared::types::has_money_precision;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::sales::system_user;
use super::{bank_line, require_positive};
use crate::determination::TransactionType;
use crate::ledger::{
    JournalEntry, LedgerError, PostingLine, PostingRequest, SourceModule, SubmitPosting,
};

/// One receipt on a claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseClaimLine {
    /// What was bought.
    pub description: String,
    /// Net amount.
    pub amount: Decimal,
    /// VAT shown on the receipt.
    #[serde(default)]
    pub vat_amount: Decimal,
    /// Expense account; defaults to the mapped claim expense.
    #[serde(default)]
    pub account: Option<String>,
    /// VAT on this line can never be recovered (entertainment and the like).
    #[serde(default)]
    pub non_deductible: bool,
}

/// An approved expense claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseClaim {
    /// Claim number.
    pub number: String,
    /// Claiming employee.
    pub employee: String,
    /// Approval date.
    pub date: NaiveDate,
    /// Tax receipts were handed in.
    #[serde(default)]
    pub has_receipt: bool,
    /// Receipts.
    pub lines: Vec<ExpenseClaimLine>,
    /// Acting user.
    #[serde(default = "system_user")]
    pub user: String,
}

/// Payment of an approved claim to the employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseReimbursement {
    /// Payment reference.
    pub reference: String,
    /// Employee paid.
    pub employee: String,
    /// Value date.
    pub date: NaiveDate,
    /// Amount paid.
    pub amount: Decimal,
    /// Bank account; defaults to the mapped disbursement bank.
    #[serde(default)]
    pub bank_account: Option<String>,
    /// Acting user.
    #[serde(default = "system_user")]
    pub user: String,
}

/// Posts an approved claim.
///
/// Expense Dr per line, recoverable VAT Dr, employee payable Cr the total.
pub fn post_expense_claim<P: SubmitPosting + ?Sized>(
    ledger: &mut P,
    claim: &ExpenseClaim,
) -> Result<JournalEntry, LedgerError> {
    if claim.lines.is_empty() {
        return Err(LedgerError::InvalidDocument(format!(
            "expense claim {} has no lines",
            claim.number
        )));
    }
    let mut request = PostingRequest::new(SourceModule::ExpenseClaim, claim.date, claim.number.clone())
        .with_description(format!("Expense claim {} ({})", claim.number, claim.employee))
        .with_source_id(claim.number.clone())
        .by(claim.user.clone());

    let mut recoverable_vat = Decimal::ZERO;
    let mut total = Decimal::ZERO;
    for line in &claim.lines {
        require_positive(line.amount, "claim line amount must be positive")?;
        if line.vat_amount < Decimal::ZERO || !has_money_precision(line.vat_amount) {
            return Err(LedgerError::InvalidAmount {
                amount: line.vat_amount,
                reason: "claim VAT must be a non-negative money amount",
            });
        }
        let expense = if claim.has_receipt && !line.non_deductible {
            recoverable_vat += line.vat_amount;
            line.amount
        } else {
            line.amount + line.vat_amount
        };
        total += line.amount + line.vat_amount;
        request = request.line(match &line.account {
            Some(code) => PostingLine::account(code.clone(), expense, Decimal::ZERO, line.description.clone()),
            None => PostingLine::debit(TransactionType::ExpenseClaimExpense, expense, line.description.clone()),
        });
    }

    let request = request
        .line(PostingLine::debit(
            TransactionType::ExpenseClaimVat,
            recoverable_vat,
            "Recoverable VAT",
        ))
        .line(PostingLine::credit(
            TransactionType::ExpenseClaimPayable,
            total,
            format!("Due to {}", claim.employee),
        ));
    ledger.submit_posting(request)
}

/// Pays a claim: employee payable Dr, bank Cr.
pub fn post_expense_reimbursement<P: SubmitPosting + ?Sized>(
    ledger: &mut P,
    payment: &ExpenseReimbursement,
) -> Result<JournalEntry, LedgerError> {
    require_positive(payment.amount, "reimbursement must be positive")?;
    let request = PostingRequest::new(SourceModule::ExpenseClaim, payment.date, payment.reference.clone())
        .with_description(format!("Reimbursement to {}", payment.employee))
        .by(payment.user.clone())
        .line(PostingLine::debit(
            TransactionType::ExpenseClaimPayable,
            payment.amount,
            format!("Claims settled for {}", payment.employee),
        ))
        // Employees are paid from the disbursement bank.
        .line(bank_line(
            payment.bank_account.as_deref(),
            TransactionType::VendorPayment,
            Decimal::ZERO,
            payment.amount,
            "Reimbursement transfer",
        ));
    ledger.submit_posting(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::testing::{date, standard_ledger};
    use rust_decimal_macros::dec;

    fn claim(has_receipt: bool) -> ExpenseClaim {
        ExpenseClaim {
            number: "EC-2026-0004".into(),
            employee: "E7".into(),
            date: date(2026, 5, 12),
            has_receipt,
            lines: vec![
                ExpenseClaimLine {
                    description: "Taxi".into(),
                    amount: dec!(100),
                    vat_amount: dec!(5),
                    account: None,
                    non_deductible: false,
                },
                ExpenseClaimLine {
                    description: "Client dinner".into(),
                    amount: dec!(200),
                    vat_amount: dec!(10),
                    account: None,
                    non_deductible: true,
                },
            ],
            user: "finance".into(),
        }
    }

    fn balance(state: &crate::ledger::LedgerState, code: &str) -> Decimal {
        state.chart().get(code).unwrap().current_balance
    }

    #[test]
    fn test_receipted_claim_recovers_deductible_vat() {
        let mut state = standard_ledger();
        let entry = post_expense_claim(&mut state, &claim(true)).unwrap();

        assert_eq!(entry.source_module, SourceModule::ExpenseClaim);
        assert_eq!(entry.total_debit, dec!(315));
        assert_eq!(balance(&state, "5000"), dec!(310));
        assert_eq!(balance(&state, "1300"), dec!(5));
        assert_eq!(balance(&state, "2210"), dec!(315));
    }

    #[test]
    fn test_claim_without_receipt_expenses_all_vat() {
        let mut state = standard_ledger();
        let entry = post_expense_claim(&mut state, &claim(false)).unwrap();
        assert_eq!(entry.lines.len(), 3);
        assert_eq!(balance(&state, "5000"), dec!(315));
        assert_eq!(balance(&state, "1300"), Decimal::ZERO);
    }

    #[test]
    fn test_line_account_override_and_validation() {
        let mut state = standard_ledger();
        let mut travel = claim(true);
        travel.lines[0].account = Some("7000".into());
        post_expense_claim(&mut state, &travel).unwrap();
        assert_eq!(balance(&state, "7000"), dec!(100));

        let mut empty = claim(true);
        empty.number = "EC-2026-0005".into();
        empty.lines.clear();
        assert!(matches!(
            post_expense_claim(&mut state, &empty),
            Err(LedgerError::InvalidDocument(_))
        ));
        let mut negative = claim(true);
        negative.lines[1].vat_amount = dec!(-1);
        assert!(matches!(
            post_expense_claim(&mut state, &negative),
            Err(LedgerError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_reimbursement_clears_employee_payable() {
        let mut state = standard_ledger();
        post_expense_claim(&mut state, &claim(true)).unwrap();
        post_expense_reimbursement(
            &mut state,
            &ExpenseReimbursement {
                reference: "RMB-0001".into(),
                employee: "E7".into(),
                date: date(2026, 5, 20),
                amount: dec!(315),
                bank_account: Some("1000".into()),
                user: "finance".into(),
            },
        )
        .unwrap();
        assert_eq!(balance(&state, "2210"), Decimal::ZERO);
        assert_eq!(balance(&state, "1000"), dec!(-315));
    }
}
