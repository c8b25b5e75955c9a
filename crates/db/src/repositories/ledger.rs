//! Ledger repository: loads the ledger state and persists commits.
//!
//! The in-memory ledger is the write model. Every commit hands this
//! repository the keys it touched; the rows are upserted in one database
//! transaction so a failed write leaves both the database and the in-memory
//! snapshot unchanged.

use std::collections::BTreeMap;

use folio_core::determination::AccountMapping;
use folio_core::ledger::{ChangeSet, CommitSink, LedgerError, LedgerParts, LedgerState};
use folio_shared::LedgerConfig;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::{debug, info};

use super::convert::{
    account_from_row, account_row, asset_from_row, asset_row, cheque_from_row, cheque_row, encode,
    entry_from_rows, entry_row, line_rows, mapping_from_row, mapping_row, open_item_from_row, open_item_row, payment_from_row,
    payment_row, period_from_row, period_row, statement_from_rows, statement_line_rows,
    statement_row, year_from_row, year_row,
};
use crate::entities::{
    account_mappings, accounting_periods, accounts, bank_statement_lines, bank_statements,
    entry_sequences, fiscal_years, fixed_assets, journal_entries, journal_entry_lines, open_items,
    payments, pdc_cheques,
};

/// Error types for ledger persistence.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// JSON column could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored value does not map onto the domain.
    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

impl From<RepositoryError> for LedgerError {
    fn from(err: RepositoryError) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Repository for the ledger tables.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns true if no account has been stored yet.
    pub async fn is_empty(&self) -> Result<bool, RepositoryError> {
        Ok(accounts::Entity::find().count(&self.db).await? == 0)
    }

    /// Reads every stored row needed to rebuild the ledger.
    pub async fn load_parts(&self, settings: LedgerConfig) -> Result<LedgerParts, RepositoryError> {
        let accounts = accounts::Entity::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(account_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        let fiscal_years = fiscal_years::Entity::find()
            .order_by_asc(fiscal_years::Column::StartDate)
            .all(&self.db)
            .await?
            .into_iter()
            .map(year_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        let periods = accounting_periods::Entity::find()
            .order_by_asc(accounting_periods::Column::StartDate)
            .all(&self.db)
            .await?
            .into_iter()
            .map(period_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        let mappings = account_mappings::Entity::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(mapping_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        let mut lines_by_entry: BTreeMap<_, Vec<_>> = BTreeMap::new();
        for line in journal_entry_lines::Entity::find().all(&self.db).await? {
            lines_by_entry.entry(line.entry_id).or_default().push(line);
        }
        let entries = journal_entries::Entity::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|row| {
                let lines = lines_by_entry.remove(&row.id).unwrap_or_default();
                entry_from_rows(row, lines)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let sequences = entry_sequences::Entity::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|row| {
                let last = u32::try_from(row.last_value).map_err(|_| {
                    RepositoryError::Corrupt(format!("sequence out of range: {}", row.last_value))
                })?;
                Ok(((row.prefix, row.year), last))
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        let open_items = open_items::Entity::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(open_item_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        let payments = payments::Entity::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(payment_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        let cheques = pdc_cheques::Entity::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(cheque_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        let assets = fixed_assets::Entity::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(asset_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        let mut lines_by_statement: BTreeMap<_, Vec<_>> = BTreeMap::new();
        for line in bank_statement_lines::Entity::find().all(&self.db).await? {
            lines_by_statement.entry(line.statement_id).or_default().push(line);
        }
        let statements = bank_statements::Entity::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|row| {
                let lines = lines_by_statement.remove(&row.id).unwrap_or_default();
                statement_from_rows(row, lines)
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            accounts = accounts.len(),
            entries = entries.len(),
            statements = statements.len(),
            "ledger rows loaded"
        );
        Ok(LedgerParts {
            settings,
            accounts,
            fiscal_years,
            periods,
            mappings,
            entries,
            sequences,
            open_items,
            payments,
            assets,
            cheques,
            statements,
        })
    }

    /// Rebuilds the ledger state from the database.
    pub async fn load(&self, settings: LedgerConfig) -> Result<LedgerState, RepositoryError> {
        Ok(LedgerState::from_parts(self.load_parts(settings).await?))
    }

    /// Writes the rows named in `changes` inside one transaction.
    pub async fn write_changes(
        &self,
        state: &LedgerState,
        changes: &ChangeSet,
    ) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await?;
        write_accounts(&txn, state, changes).await?;
        write_mappings(&txn, state, changes).await?;
        write_calendar(&txn, state, changes).await?;
        write_journal(&txn, state, changes).await?;
        write_subledger(&txn, state, changes).await?;
        write_cheques(&txn, state, changes).await?;
        write_assets(&txn, state, changes).await?;
        write_statements(&txn, state, changes).await?;
        txn.commit().await?;
        debug!(
            entries = changes.entries.len(),
            accounts = changes.accounts.len(),
            "ledger changes written"
        );
        Ok(())
    }
}

#[async_trait::async_trait]
impl CommitSink for LedgerRepository {
    async fn persist(&self, state: &LedgerState, changes: &ChangeSet) -> Result<(), LedgerError> {
        self.write_changes(state, changes).await.map_err(Into::into)
    }
}

async fn write_accounts(
    txn: &DatabaseTransaction,
    state: &LedgerState,
    changes: &ChangeSet,
) -> Result<(), RepositoryError> {
    use accounts::Column;
    for code in &changes.accounts {
        let Some(account) = state.chart().get(code) else {
            continue;
        };
        accounts::Entity::insert(account_row(account)?)
            .on_conflict(
                OnConflict::column(Column::Code)
                    .update_columns([
                        Column::Name,
                        Column::Description,
                        Column::AccountType,
                        Column::ParentCode,
                        Column::OpeningBalance,
                        Column::CurrentBalance,
                        Column::OpeningBalanceLocked,
                        Column::IsCashAccount,
                        Column::OverdraftAllowed,
                        Column::IsContraAccount,
                        Column::IsFixedDeposit,
                        Column::IsActive,
                        Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(txn)
            .await?;
    }
    Ok(())
}

async fn write_mappings(
    txn: &DatabaseTransaction,
    state: &LedgerState,
    changes: &ChangeSet,
) -> Result<(), RepositoryError> {
    use account_mappings::Column;
    for &transaction_type in &changes.mappings {
        match state.mappings().get(transaction_type) {
            Some(code) => {
                let mapping = AccountMapping {
                    transaction_type,
                    account_code: code.to_string(),
                };
                account_mappings::Entity::insert(mapping_row(&mapping)?)
                    .on_conflict(
                        OnConflict::column(Column::TransactionType)
                            .update_columns([Column::AccountCode, Column::UpdatedAt])
                            .to_owned(),
                    )
                    .exec(txn)
                    .await?;
            }
            None => {
                account_mappings::Entity::delete_many()
                    .filter(Column::TransactionType.eq(encode(&transaction_type)?))
                    .exec(txn)
                    .await?;
            }
        }
    }
    Ok(())
}

async fn write_calendar(
    txn: &DatabaseTransaction,
    state: &LedgerState,
    changes: &ChangeSet,
) -> Result<(), RepositoryError> {
    for &id in &changes.fiscal_years {
        let Some(year) = state.calendar().year(id) else {
            continue;
        };
        fiscal_years::Entity::insert(year_row(year)?)
            .on_conflict(
                OnConflict::column(fiscal_years::Column::Id)
                    .update_columns([fiscal_years::Column::Name, fiscal_years::Column::Status])
                    .to_owned(),
            )
            .exec(txn)
            .await?;
    }
    for &id in &changes.periods {
        let Some(period) = state.calendar().period(id) else {
            continue;
        };
        accounting_periods::Entity::insert(period_row(period)?)
            .on_conflict(
                OnConflict::column(accounting_periods::Column::Id)
                    .update_columns([
                        accounting_periods::Column::Name,
                        accounting_periods::Column::Status,
                    ])
                    .to_owned(),
            )
            .exec(txn)
            .await?;
    }
    Ok(())
}

async fn write_journal(
    txn: &DatabaseTransaction,
    state: &LedgerState,
    changes: &ChangeSet,
) -> Result<(), RepositoryError> {
    use journal_entries::Column;
    for &id in &changes.deleted_entries {
        journal_entries::Entity::delete_by_id(id.into_inner()).exec(txn).await?;
    }
    for &id in &changes.entries {
        let Some(entry) = state.journal().get(id) else {
            continue;
        };
        journal_entries::Entity::insert(entry_row(entry)?)
            .on_conflict(
                OnConflict::column(Column::Id)
                    .update_columns([
                        Column::EntryNumber,
                        Column::EntryDate,
                        Column::Reference,
                        Column::Description,
                        Column::Status,
                        Column::EntryType,
                        Column::SourceId,
                        Column::IsLocked,
                        Column::FiscalYearId,
                        Column::PeriodId,
                        Column::TotalDebit,
                        Column::TotalCredit,
                        Column::ReversedBy,
                        Column::PostingSequence,
                        Column::PostedAt,
                        Column::PostedBy,
                    ])
                    .to_owned(),
            )
            .exec(txn)
            .await?;
        // Draft edits may change the line set; lines are rewritten whole.
        journal_entry_lines::Entity::delete_many()
            .filter(journal_entry_lines::Column::EntryId.eq(id.into_inner()))
            .exec(txn)
            .await?;
        let lines = line_rows(entry)?;
        if !lines.is_empty() {
            journal_entry_lines::Entity::insert_many(lines).exec(txn).await?;
        }
    }
    for (prefix, year) in &changes.sequences {
        let last = state.journal().last_sequence(prefix, *year);
        let row = entry_sequences::ActiveModel {
            prefix: sea_orm::Set(prefix.clone()),
            year: sea_orm::Set(*year),
            last_value: sea_orm::Set(i32::try_from(last).map_err(|_| {
                RepositoryError::Corrupt(format!("sequence out of range: {last}"))
            })?),
        };
        entry_sequences::Entity::insert(row)
            .on_conflict(
                OnConflict::columns([entry_sequences::Column::Prefix, entry_sequences::Column::Year])
                    .update_column(entry_sequences::Column::LastValue)
                    .to_owned(),
            )
            .exec(txn)
            .await?;
    }
    Ok(())
}

async fn write_subledger(
    txn: &DatabaseTransaction,
    state: &LedgerState,
    changes: &ChangeSet,
) -> Result<(), RepositoryError> {
    for &id in &changes.open_items {
        let Some(item) = state.subledger().item(id) else {
            continue;
        };
        open_items::Entity::insert(open_item_row(item)?)
            .on_conflict(
                OnConflict::column(open_items::Column::Id)
                    .update_columns([open_items::Column::Allocated, open_items::Column::Status])
                    .to_owned(),
            )
            .exec(txn)
            .await?;
    }
    for &id in &changes.payments {
        let Some(payment) = state.subledger().payment(id) else {
            continue;
        };
        payments::Entity::insert(payment_row(payment)?)
            .on_conflict(
                OnConflict::column(payments::Column::Id)
                    .update_columns([payments::Column::Allocated, payments::Column::Allocations])
                    .to_owned(),
            )
            .exec(txn)
            .await?;
    }
    Ok(())
}

async fn write_cheques(
    txn: &DatabaseTransaction,
    state: &LedgerState,
    changes: &ChangeSet,
) -> Result<(), RepositoryError> {
    use pdc_cheques::Column;
    for number in &changes.cheques {
        let Some(cheque) = state.cheques().get(number) else {
            continue;
        };
        pdc_cheques::Entity::insert(cheque_row(cheque)?)
            .on_conflict(
                OnConflict::column(Column::ChequeNumber)
                    .update_columns([
                        Column::Status,
                        Column::BankAccountCode,
                        Column::ClearanceEntry,
                        Column::BounceDate,
                        Column::BounceReason,
                    ])
                    .to_owned(),
            )
            .exec(txn)
            .await?;
    }
    Ok(())
}

async fn write_assets(
    txn: &DatabaseTransaction,
    state: &LedgerState,
    changes: &ChangeSet,
) -> Result<(), RepositoryError> {
    use fixed_assets::Column;
    for code in &changes.assets {
        let Some(asset) = state.assets().get(code) else {
            continue;
        };
        fixed_assets::Entity::insert(asset_row(asset)?)
            .on_conflict(
                OnConflict::column(Column::Code)
                    .update_columns([
                        Column::AccumulatedDepreciation,
                        Column::DepreciationRuns,
                        Column::LastDepreciationDate,
                        Column::Status,
                        Column::AcquisitionEntry,
                        Column::DisposalEntry,
                    ])
                    .to_owned(),
            )
            .exec(txn)
            .await?;
    }
    Ok(())
}

async fn write_statements(
    txn: &DatabaseTransaction,
    state: &LedgerState,
    changes: &ChangeSet,
) -> Result<(), RepositoryError> {
    for &id in &changes.statements {
        let Some(statement) = state.statements().get(id) else {
            continue;
        };
        bank_statements::Entity::insert(statement_row(statement)?)
            .on_conflict(
                OnConflict::column(bank_statements::Column::Id)
                    .update_column(bank_statements::Column::Status)
                    .to_owned(),
            )
            .exec(txn)
            .await?;
        bank_statement_lines::Entity::delete_many()
            .filter(bank_statement_lines::Column::StatementId.eq(id.into_inner()))
            .exec(txn)
            .await?;
        let lines = statement_line_rows(statement)?;
        if !lines.is_empty() {
            bank_statement_lines::Entity::insert_many(lines).exec(txn).await?;
        }
    }
    Ok(())
}
