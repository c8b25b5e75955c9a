//! `SeaORM` Entity for bank_statement_lines table.
//!
//! `matched` holds the serialized match target, `NULL` while unmatched.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "bank_statement_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub statement_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub line_number: i32,
    pub line_date: Date,
    pub description: String,
    pub reference: String,
    pub money_in: Decimal,
    pub money_out: Decimal,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub matched: Option<Json>,
    pub adjustment_entry: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bank_statements::Entity",
        from = "Column::StatementId",
        to = "super::bank_statements::Column::Id",
        on_delete = "Cascade"
    )]
    BankStatements,
}

impl Related<super::bank_statements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankStatements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
