//! Candidate search for statement lines.
//!
//! Payments are searched before GL lines. A candidate must move the same
//! signed amount through the statement's bank account, fall within the date
//! tolerance and not be claimed already. Reversed entries and their
//! reversals cancel out and are never candidates. The closest date wins; ties go to
//! the lowest line number.

use std::collections::BTreeSet;

use folio_shared::types::EntryId;

use super::statement::{MatchTarget, StatementLine};
use crate::ledger::{EntryStatus, LedgerState};
use crate::subledger::{PaymentDirection, PaymentRecord};

/// Signed movement of a payment on its bank account.
pub(crate) fn payment_amount(payment: &PaymentRecord) -> rust_decimal::Decimal {
    match payment.direction {
        PaymentDirection::Received => payment.amount,
        PaymentDirection::Made => -payment.amount,
    }
}

/// Targets already taken, plus entries whose bank line is accounted for
/// (behind a matched payment, or posted as an adjustment).
#[derive(Debug, Default)]
pub(crate) struct Claims {
    pub(crate) targets: BTreeSet<MatchTarget>,
    pub(crate) entries: BTreeSet<EntryId>,
}

impl Claims {
    pub(crate) fn collect(state: &LedgerState) -> Self {
        let mut claims = Self::default();
        for target in state.statements.claimed() {
            claims.claim(state, target);
        }
        claims.entries.extend(
            state
                .statements
                .iter()
                .flat_map(|s| s.lines.iter().filter_map(|l| l.adjustment_entry)),
        );
        claims
    }

    pub(crate) fn claim(&mut self, state: &LedgerState, target: MatchTarget) {
        if let MatchTarget::Payment { payment_id } = target {
            if let Some(payment) = state.subledger.payment(payment_id) {
                self.entries.insert(payment.entry_id);
            }
        }
        self.targets.insert(target);
    }

    pub(crate) fn is_free(&self, target: MatchTarget) -> bool {
        match target {
            MatchTarget::Payment { .. } => !self.targets.contains(&target),
            MatchTarget::JournalLine { entry_id, .. } => {
                !self.targets.contains(&target) && !self.entries.contains(&entry_id)
            }
        }
    }
}

/// Best candidate for `line` on `bank_account`, if any.
pub(crate) fn find_candidate(
    state: &LedgerState,
    bank_account: &str,
    line: &StatementLine,
    tolerance_days: i64,
    claims: &Claims,
) -> Option<MatchTarget> {
    let amount = line.amount();
    let within = |date: chrono::NaiveDate| (date - line.date).num_days().abs() <= tolerance_days;

    let payment = state
        .subledger
        .payments()
        .filter(|p| p.bank_account_code == bank_account && payment_amount(p) == amount)
        .filter(|p| within(p.date))
        .map(|p| (p, MatchTarget::Payment { payment_id: p.id }))
        .filter(|(_, target)| claims.is_free(*target))
        .min_by_key(|(p, _)| ((p.date - line.date).num_days().abs(), p.date, p.id));
    if let Some((_, target)) = payment {
        return Some(target);
    }

    state
        .posted_lines()
        .filter(|(entry, gl)| {
            entry.status != EntryStatus::Reversed
                && entry.reversal_of.is_none()
                && gl.account_code == bank_account
                && gl.net() == amount
                && within(entry.date)
        })
        .map(|(entry, gl)| {
            let target = MatchTarget::JournalLine {
                entry_id: entry.id,
                line_number: gl.line_number,
            };
            (entry, gl, target)
        })
        .filter(|(_, _, target)| claims.is_free(*target))
        .min_by_key(|(entry, gl, _)| {
            (
                (entry.date - line.date).num_days().abs(),
                gl.line_number,
                entry.posting_sequence,
            )
        })
        .map(|(_, _, target)| target)
}
