//! `SeaORM` Entity for payments table.
//!
//! Allocations are stored inline as a JSON array of `{open_item_id, amount}`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub direction: String,
    pub party: String,
    pub payment_date: Date,
    pub bank_account_code: String,
    pub amount: Decimal,
    pub allocated: Decimal,
    pub reference: String,
    pub entry_id: Uuid,
    #[sea_orm(column_type = "JsonBinary")]
    pub allocations: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::journal_entries::Entity",
        from = "Column::EntryId",
        to = "super::journal_entries::Column::Id"
    )]
    JournalEntries,
}

impl Related<super::journal_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
