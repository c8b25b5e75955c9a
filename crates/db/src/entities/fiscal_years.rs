//! `SeaORM` Entity for fiscal_years table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "fiscal_years")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub start_date: Date,
    pub end_date: Date,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::accounting_periods::Entity")]
    AccountingPeriods,
}

impl Related<super::accounting_periods::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountingPeriods.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
