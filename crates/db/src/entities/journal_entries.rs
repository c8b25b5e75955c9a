//! `SeaORM` Entity for journal_entries table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "journal_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub entry_number: Option<String>,
    pub entry_date: Date,
    pub reference: String,
    pub description: String,
    pub status: String,
    pub entry_type: String,
    pub source_module: String,
    pub source_id: Option<String>,
    pub is_system_generated: bool,
    pub is_locked: bool,
    pub carry_forward: bool,
    pub fiscal_year_id: Option<Uuid>,
    pub period_id: Option<Uuid>,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
    pub reversal_of: Option<Uuid>,
    pub reversed_by: Option<Uuid>,
    #[sea_orm(unique)]
    pub posting_sequence: Option<i64>,
    pub created_by: String,
    pub created_at: DateTimeWithTimeZone,
    pub posted_at: Option<DateTimeWithTimeZone>,
    pub posted_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::journal_entry_lines::Entity")]
    JournalEntryLines,
}

impl Related<super::journal_entry_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalEntryLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
