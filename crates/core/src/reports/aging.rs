//! Receivable and payable aging.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::ReportError;
use super::service::ReportService;
use super::types::{AgingBucket, AgingItem, AgingReport, AgingTotals, PartyAging};
use crate::determination::TransactionType;
use crate::ledger::LedgerState;
use crate::subledger::{OpenItemKind, OpenItemStatus};

impl ReportService {
    /// Outstanding documents bucketed by days past due.
    ///
    /// Only allocations from payments dated on or before `as_of` reduce an
    /// item. The subledger total is compared with the control account.
    pub fn aging(
        state: &LedgerState,
        kind: OpenItemKind,
        as_of: NaiveDate,
    ) -> Result<AgingReport, ReportError> {
        let control_type = match kind {
            OpenItemKind::Receivable => TransactionType::SalesInvoiceReceivable,
            OpenItemKind::Payable => TransactionType::VendorBillPayable,
        };
        let control_account = state.resolve(control_type, None)?;
        let control_balance = state.balance_as_of(&control_account, as_of)?;

        let mut allocated: BTreeMap<_, Decimal> = BTreeMap::new();
        for payment in state.subledger().payments().filter(|p| p.date <= as_of) {
            for allocation in &payment.allocations {
                *allocated.entry(allocation.open_item_id).or_default() += allocation.amount;
            }
        }

        let mut items: Vec<AgingItem> = state
            .subledger()
            .items()
            .filter(|i| i.kind == kind && i.date <= as_of && i.status != OpenItemStatus::Cancelled)
            .filter_map(|item| {
                let outstanding =
                    item.total - allocated.get(&item.id).copied().unwrap_or_default();
                if outstanding.is_zero() {
                    return None;
                }
                let days_overdue = (as_of - item.due_date).num_days();
                Some(AgingItem {
                    document_ref: item.document_ref.clone(),
                    party: item.party.clone(),
                    date: item.date,
                    due_date: item.due_date,
                    total: item.total,
                    outstanding,
                    days_overdue,
                    bucket: AgingBucket::for_days(days_overdue),
                })
            })
            .collect();
        items.sort_by(|a, b| {
            (&a.party, a.due_date, &a.document_ref).cmp(&(&b.party, b.due_date, &b.document_ref))
        });

        let mut totals = AgingTotals::default();
        let mut per_party: BTreeMap<&str, AgingTotals> = BTreeMap::new();
        for item in &items {
            totals.add(item.bucket, item.outstanding);
            per_party
                .entry(item.party.as_str())
                .or_default()
                .add(item.bucket, item.outstanding);
        }
        let parties = per_party
            .into_iter()
            .map(|(party, totals)| PartyAging {
                party: party.to_string(),
                totals,
            })
            .collect();

        Ok(AgingReport {
            as_of,
            kind,
            is_consistent: totals.total == control_balance,
            parties,
            items,
            totals,
            control_account,
            control_balance,
        })
    }
}
