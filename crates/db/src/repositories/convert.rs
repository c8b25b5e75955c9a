//! Row conversions between entities and ledger domain types.

use chrono::Utc;
use folio_core::assets::FixedAsset;
use folio_core::chart::{Account, NewAccount};
use folio_core::determination::AccountMapping;
use folio_core::fiscal::{AccountingPeriod, FiscalYear};
use folio_core::ledger::{JournalEntry, JournalLine};
use folio_core::reconciliation::{BankStatement, StatementLine};
use folio_core::subledger::{Allocation, OpenItem, PaymentRecord, PdcCheque};
use folio_shared::types::{EntryId, FiscalYearId, OpenItemId, PaymentId, PeriodId, StatementId};
use sea_orm::Set;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::ledger::RepositoryError;
use crate::entities::{
    account_mappings, accounting_periods, accounts, bank_statement_lines, bank_statements,
    fiscal_years, fixed_assets, journal_entries, journal_entry_lines, open_items, payments,
    pdc_cheques,
};

/// Serialized name of a unit enum (`"posted"`, `"sales_invoice_vat"`).
pub(crate) fn encode<T: Serialize>(value: &T) -> Result<String, RepositoryError> {
    match serde_json::to_value(value)? {
        Value::String(text) => Ok(text),
        other => Err(RepositoryError::Corrupt(format!("expected a string tag, got {other}"))),
    }
}

/// Parses a serialized enum name read from `column`.
pub(crate) fn decode<T: DeserializeOwned>(column: &str, text: &str) -> Result<T, RepositoryError> {
    serde_json::from_value(Value::String(text.to_owned()))
        .map_err(|_| RepositoryError::Corrupt(format!("invalid {column}: {text}")))
}

fn to_i32(column: &str, value: u32) -> Result<i32, RepositoryError> {
    i32::try_from(value).map_err(|_| RepositoryError::Corrupt(format!("{column} out of range: {value}")))
}

fn to_u32(column: &str, value: i32) -> Result<u32, RepositoryError> {
    u32::try_from(value).map_err(|_| RepositoryError::Corrupt(format!("{column} out of range: {value}")))
}

// ---- accounts ----

pub(crate) fn account_from_row(row: accounts::Model) -> Result<Account, RepositoryError> {
    let input = NewAccount {
        account_type: decode("account_type", &row.account_type)?,
        code: row.code,
        name: row.name,
        description: row.description,
        parent: row.parent_code,
        opening_balance: row.opening_balance,
        is_cash_account: row.is_cash_account,
        overdraft_allowed: row.overdraft_allowed,
        is_contra_account: row.is_contra_account,
        is_fixed_deposit: row.is_fixed_deposit,
    };
    Ok(Account::restore(
        input,
        row.current_balance,
        row.opening_balance_locked,
        row.is_active,
    ))
}

pub(crate) fn account_row(account: &Account) -> Result<accounts::ActiveModel, RepositoryError> {
    let now = Utc::now().into();
    Ok(accounts::ActiveModel {
        code: Set(account.code.clone()),
        name: Set(account.name.clone()),
        description: Set(account.description.clone()),
        account_type: Set(encode(&account.account_type)?),
        parent_code: Set(account.parent.clone()),
        opening_balance: Set(account.opening_balance),
        current_balance: Set(account.current_balance),
        opening_balance_locked: Set(account.opening_balance_locked),
        is_cash_account: Set(account.is_cash_account),
        overdraft_allowed: Set(account.overdraft_allowed),
        is_contra_account: Set(account.is_contra_account),
        is_fixed_deposit: Set(account.is_fixed_deposit),
        is_active: Set(account.is_active),
        created_at: Set(now),
        updated_at: Set(now),
    })
}

pub(crate) fn mapping_from_row(row: account_mappings::Model) -> Result<AccountMapping, RepositoryError> {
    Ok(AccountMapping {
        transaction_type: decode("transaction_type", &row.transaction_type)?,
        account_code: row.account_code,
    })
}

pub(crate) fn mapping_row(mapping: &AccountMapping) -> Result<account_mappings::ActiveModel, RepositoryError> {
    Ok(account_mappings::ActiveModel {
        transaction_type: Set(encode(&mapping.transaction_type)?),
        account_code: Set(mapping.account_code.clone()),
        updated_at: Set(Utc::now().into()),
    })
}

// ---- fiscal calendar ----

pub(crate) fn year_from_row(row: fiscal_years::Model) -> Result<FiscalYear, RepositoryError> {
    Ok(FiscalYear {
        id: FiscalYearId::from_uuid(row.id),
        name: row.name,
        start_date: row.start_date,
        end_date: row.end_date,
        status: decode("fiscal year status", &row.status)?,
    })
}

pub(crate) fn year_row(year: &FiscalYear) -> Result<fiscal_years::ActiveModel, RepositoryError> {
    Ok(fiscal_years::ActiveModel {
        id: Set(year.id.into_inner()),
        name: Set(year.name.clone()),
        start_date: Set(year.start_date),
        end_date: Set(year.end_date),
        status: Set(encode(&year.status)?),
    })
}

pub(crate) fn period_from_row(row: accounting_periods::Model) -> Result<AccountingPeriod, RepositoryError> {
    Ok(AccountingPeriod {
        id: PeriodId::from_uuid(row.id),
        fiscal_year_id: FiscalYearId::from_uuid(row.fiscal_year_id),
        period_number: to_u32("period_number", i32::from(row.period_number))?,
        name: row.name,
        start_date: row.start_date,
        end_date: row.end_date,
        status: decode("period status", &row.status)?,
    })
}

pub(crate) fn period_row(period: &AccountingPeriod) -> Result<accounting_periods::ActiveModel, RepositoryError> {
    let number = i16::try_from(period.period_number)
        .map_err(|_| RepositoryError::Corrupt(format!("period_number out of range: {}", period.period_number)))?;
    Ok(accounting_periods::ActiveModel {
        id: Set(period.id.into_inner()),
        fiscal_year_id: Set(period.fiscal_year_id.into_inner()),
        period_number: Set(number),
        name: Set(period.name.clone()),
        start_date: Set(period.start_date),
        end_date: Set(period.end_date),
        status: Set(encode(&period.status)?),
    })
}

// ---- journal ----

pub(crate) fn entry_from_rows(
    row: journal_entries::Model,
    lines: Vec<journal_entry_lines::Model>,
) -> Result<JournalEntry, RepositoryError> {
    let mut lines = lines
        .into_iter()
        .map(|line| {
            Ok(JournalLine {
                line_number: to_u32("line_number", line.line_number)?,
                account_code: line.account_code,
                description: line.description,
                debit: line.debit,
                credit: line.credit,
            })
        })
        .collect::<Result<Vec<_>, RepositoryError>>()?;
    lines.sort_by_key(|l| l.line_number);
    let posting_sequence = row
        .posting_sequence
        .map(|s| {
            u64::try_from(s)
                .map_err(|_| RepositoryError::Corrupt(format!("posting_sequence out of range: {s}")))
        })
        .transpose()?;

    Ok(JournalEntry {
        id: EntryId::from_uuid(row.id),
        entry_number: row.entry_number,
        date: row.entry_date,
        reference: row.reference,
        description: row.description,
        status: decode("entry status", &row.status)?,
        entry_type: decode("entry_type", &row.entry_type)?,
        source_module: decode("source_module", &row.source_module)?,
        source_id: row.source_id,
        is_system_generated: row.is_system_generated,
        is_locked: row.is_locked,
        carry_forward: row.carry_forward,
        fiscal_year_id: row.fiscal_year_id.map(FiscalYearId::from_uuid),
        period_id: row.period_id.map(PeriodId::from_uuid),
        total_debit: row.total_debit,
        total_credit: row.total_credit,
        reversal_of: row.reversal_of.map(EntryId::from_uuid),
        reversed_by: row.reversed_by.map(EntryId::from_uuid),
        posting_sequence,
        created_by: row.created_by,
        created_at: row.created_at.into(),
        posted_at: row.posted_at.map(Into::into),
        posted_by: row.posted_by,
        lines,
    })
}

pub(crate) fn entry_row(entry: &JournalEntry) -> Result<journal_entries::ActiveModel, RepositoryError> {
    let posting_sequence = entry
        .posting_sequence
        .map(|s| {
            i64::try_from(s)
                .map_err(|_| RepositoryError::Corrupt(format!("posting_sequence out of range: {s}")))
        })
        .transpose()?;
    Ok(journal_entries::ActiveModel {
        id: Set(entry.id.into_inner()),
        entry_number: Set(entry.entry_number.clone()),
        entry_date: Set(entry.date),
        reference: Set(entry.reference.clone()),
        description: Set(entry.description.clone()),
        status: Set(encode(&entry.status)?),
        entry_type: Set(encode(&entry.entry_type)?),
        source_module: Set(encode(&entry.source_module)?),
        source_id: Set(entry.source_id.clone()),
        is_system_generated: Set(entry.is_system_generated),
        is_locked: Set(entry.is_locked),
        carry_forward: Set(entry.carry_forward),
        fiscal_year_id: Set(entry.fiscal_year_id.map(FiscalYearId::into_inner)),
        period_id: Set(entry.period_id.map(PeriodId::into_inner)),
        total_debit: Set(entry.total_debit),
        total_credit: Set(entry.total_credit),
        reversal_of: Set(entry.reversal_of.map(EntryId::into_inner)),
        reversed_by: Set(entry.reversed_by.map(EntryId::into_inner)),
        posting_sequence: Set(posting_sequence),
        created_by: Set(entry.created_by.clone()),
        created_at: Set(entry.created_at.into()),
        posted_at: Set(entry.posted_at.map(Into::into)),
        posted_by: Set(entry.posted_by.clone()),
    })
}

pub(crate) fn line_rows(entry: &JournalEntry) -> Result<Vec<journal_entry_lines::ActiveModel>, RepositoryError> {
    entry
        .lines
        .iter()
        .map(|line| {
            Ok(journal_entry_lines::ActiveModel {
                entry_id: Set(entry.id.into_inner()),
                line_number: Set(to_i32("line_number", line.line_number)?),
                account_code: Set(line.account_code.clone()),
                description: Set(line.description.clone()),
                debit: Set(line.debit),
                credit: Set(line.credit),
            })
        })
        .collect()
}

// ---- subledger ----

pub(crate) fn open_item_from_row(row: open_items::Model) -> Result<OpenItem, RepositoryError> {
    Ok(OpenItem {
        id: OpenItemId::from_uuid(row.id),
        kind: decode("open item kind", &row.kind)?,
        party: row.party,
        document_ref: row.document_ref,
        date: row.document_date,
        due_date: row.due_date,
        total: row.total,
        allocated: row.allocated,
        entry_id: EntryId::from_uuid(row.entry_id),
        status: decode("open item status", &row.status)?,
    })
}

pub(crate) fn open_item_row(item: &OpenItem) -> Result<open_items::ActiveModel, RepositoryError> {
    Ok(open_items::ActiveModel {
        id: Set(item.id.into_inner()),
        kind: Set(encode(&item.kind)?),
        party: Set(item.party.clone()),
        document_ref: Set(item.document_ref.clone()),
        document_date: Set(item.date),
        due_date: Set(item.due_date),
        total: Set(item.total),
        allocated: Set(item.allocated),
        entry_id: Set(item.entry_id.into_inner()),
        status: Set(encode(&item.status)?),
    })
}

pub(crate) fn payment_from_row(row: payments::Model) -> Result<PaymentRecord, RepositoryError> {
    let allocations: Vec<Allocation> = serde_json::from_value(row.allocations)?;
    Ok(PaymentRecord {
        id: PaymentId::from_uuid(row.id),
        direction: decode("payment direction", &row.direction)?,
        party: row.party,
        date: row.payment_date,
        bank_account_code: row.bank_account_code,
        amount: row.amount,
        allocated: row.allocated,
        reference: row.reference,
        entry_id: EntryId::from_uuid(row.entry_id),
        allocations,
    })
}

pub(crate) fn payment_row(payment: &PaymentRecord) -> Result<payments::ActiveModel, RepositoryError> {
    Ok(payments::ActiveModel {
        id: Set(payment.id.into_inner()),
        direction: Set(encode(&payment.direction)?),
        party: Set(payment.party.clone()),
        payment_date: Set(payment.date),
        bank_account_code: Set(payment.bank_account_code.clone()),
        amount: Set(payment.amount),
        allocated: Set(payment.allocated),
        reference: Set(payment.reference.clone()),
        entry_id: Set(payment.entry_id.into_inner()),
        allocations: Set(serde_json::to_value(&payment.allocations)?),
    })
}

// ---- post-dated cheques ----

pub(crate) fn cheque_from_row(row: pdc_cheques::Model) -> Result<PdcCheque, RepositoryError> {
    Ok(PdcCheque {
        allocations: serde_json::from_value(row.allocations)?,
        status: decode("cheque status", &row.status)?,
        cheque_number: row.cheque_number,
        party: row.party,
        cheque_date: row.cheque_date,
        deposit_date: row.deposit_date,
        amount: row.amount,
        bank_account_code: row.bank_account_code,
        deposit_entry: EntryId::from_uuid(row.deposit_entry),
        clearance_entry: row.clearance_entry.map(EntryId::from_uuid),
        bounce_date: row.bounce_date,
        bounce_reason: row.bounce_reason,
    })
}

pub(crate) fn cheque_row(cheque: &PdcCheque) -> Result<pdc_cheques::ActiveModel, RepositoryError> {
    Ok(pdc_cheques::ActiveModel {
        cheque_number: Set(cheque.cheque_number.clone()),
        party: Set(cheque.party.clone()),
        cheque_date: Set(cheque.cheque_date),
        deposit_date: Set(cheque.deposit_date),
        amount: Set(cheque.amount),
        allocations: Set(serde_json::to_value(&cheque.allocations)?),
        status: Set(encode(&cheque.status)?),
        bank_account_code: Set(cheque.bank_account_code.clone()),
        deposit_entry: Set(cheque.deposit_entry.into_inner()),
        clearance_entry: Set(cheque.clearance_entry.map(EntryId::into_inner)),
        bounce_date: Set(cheque.bounce_date),
        bounce_reason: Set(cheque.bounce_reason.clone()),
    })
}

// ---- fixed assets ----

pub(crate) fn asset_from_row(row: fixed_assets::Model) -> Result<FixedAsset, RepositoryError> {
    Ok(FixedAsset {
        method: decode("depreciation method", &row.method)?,
        status: decode("asset status", &row.status)?,
        useful_life_months: to_u32("useful_life_months", row.useful_life_months)?,
        depreciation_runs: to_u32("depreciation_runs", row.depreciation_runs)?,
        code: row.code,
        name: row.name,
        acquisition_date: row.acquisition_date,
        acquisition_cost: row.acquisition_cost,
        salvage_value: row.salvage_value,
        accumulated_depreciation: row.accumulated_depreciation,
        last_depreciation_date: row.last_depreciation_date,
        acquisition_entry: row.acquisition_entry.map(EntryId::from_uuid),
        disposal_entry: row.disposal_entry.map(EntryId::from_uuid),
    })
}

pub(crate) fn asset_row(asset: &FixedAsset) -> Result<fixed_assets::ActiveModel, RepositoryError> {
    Ok(fixed_assets::ActiveModel {
        code: Set(asset.code.clone()),
        name: Set(asset.name.clone()),
        acquisition_date: Set(asset.acquisition_date),
        acquisition_cost: Set(asset.acquisition_cost),
        salvage_value: Set(asset.salvage_value),
        useful_life_months: Set(to_i32("useful_life_months", asset.useful_life_months)?),
        method: Set(encode(&asset.method)?),
        accumulated_depreciation: Set(asset.accumulated_depreciation),
        depreciation_runs: Set(to_i32("depreciation_runs", asset.depreciation_runs)?),
        last_depreciation_date: Set(asset.last_depreciation_date),
        status: Set(encode(&asset.status)?),
        acquisition_entry: Set(asset.acquisition_entry.map(EntryId::into_inner)),
        disposal_entry: Set(asset.disposal_entry.map(EntryId::into_inner)),
    })
}

// ---- bank statements ----

pub(crate) fn statement_from_rows(
    row: bank_statements::Model,
    lines: Vec<bank_statement_lines::Model>,
) -> Result<BankStatement, RepositoryError> {
    let mut lines = lines
        .into_iter()
        .map(|line| {
            Ok(StatementLine {
                line_number: to_u32("line_number", line.line_number)?,
                date: line.line_date,
                description: line.description,
                reference: line.reference,
                money_in: line.money_in,
                money_out: line.money_out,
                matched: line.matched.map(serde_json::from_value).transpose()?,
                adjustment_entry: line.adjustment_entry.map(EntryId::from_uuid),
            })
        })
        .collect::<Result<Vec<_>, RepositoryError>>()?;
    lines.sort_by_key(|l| l.line_number);
    Ok(BankStatement {
        id: StatementId::from_uuid(row.id),
        reference: row.reference,
        bank_account_code: row.bank_account_code,
        period_start: row.period_start,
        period_end: row.period_end,
        opening_balance: row.opening_balance,
        closing_balance: row.closing_balance,
        status: decode("statement status", &row.status)?,
        lines,
    })
}

pub(crate) fn statement_row(statement: &BankStatement) -> Result<bank_statements::ActiveModel, RepositoryError> {
    Ok(bank_statements::ActiveModel {
        id: Set(statement.id.into_inner()),
        reference: Set(statement.reference.clone()),
        bank_account_code: Set(statement.bank_account_code.clone()),
        period_start: Set(statement.period_start),
        period_end: Set(statement.period_end),
        opening_balance: Set(statement.opening_balance),
        closing_balance: Set(statement.closing_balance),
        status: Set(encode(&statement.status)?),
    })
}

pub(crate) fn statement_line_rows(
    statement: &BankStatement,
) -> Result<Vec<bank_statement_lines::ActiveModel>, RepositoryError> {
    statement
        .lines
        .iter()
        .map(|line| {
            Ok(bank_statement_lines::ActiveModel {
                statement_id: Set(statement.id.into_inner()),
                line_number: Set(to_i32("line_number", line.line_number)?),
                line_date: Set(line.date),
                description: Set(line.description.clone()),
                reference: Set(line.reference.clone()),
                money_in: Set(line.money_in),
                money_out: Set(line.money_out),
                matched: Set(line.matched.map(serde_json::to_value).transpose()?),
                adjustment_entry: Set(line.adjustment_entry.map(EntryId::into_inner)),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::chart::AccountType;
    use folio_core::determination::TransactionType;
    use folio_core::ledger::{EntryStatus, SourceModule};
    use folio_core::reconciliation::{MatchTarget, StatementStatus};
    use rstest::rstest;

    #[rstest]
    #[case(encode(&EntryStatus::Reversed).unwrap(), "reversed")]
    #[case(encode(&SourceModule::CorporateTax).unwrap(), "corporate_tax")]
    #[case(encode(&TransactionType::SalesInvoiceVat).unwrap(), "sales_invoice_vat")]
    #[case(encode(&AccountType::Income).unwrap(), "income")]
    #[case(encode(&StatementStatus::Finalized).unwrap(), "finalized")]
    fn test_enum_columns_use_serialized_names(#[case] encoded: String, #[case] expected: &str) {
        assert_eq!(encoded, expected);
    }

    #[test]
    fn test_decode_rejects_unknown_names() {
        let result: Result<EntryStatus, _> = decode("entry status", "archived");
        assert!(matches!(result, Err(RepositoryError::Corrupt(msg)) if msg.contains("archived")));
    }

    #[test]
    fn test_struct_values_are_not_enum_columns() {
        let target = MatchTarget::Payment {
            payment_id: PaymentId::new(),
        };
        assert!(matches!(encode(&target), Err(RepositoryError::Corrupt(_))));
    }
}
