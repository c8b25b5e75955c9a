//! `SeaORM` Entity for bank_statements table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "bank_statements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub reference: String,
    pub bank_account_code: String,
    pub period_start: Date,
    pub period_end: Date,
    pub opening_balance: Decimal,
    pub closing_balance: Decimal,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bank_statement_lines::Entity")]
    BankStatementLines,
}

impl Related<super::bank_statement_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankStatementLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
