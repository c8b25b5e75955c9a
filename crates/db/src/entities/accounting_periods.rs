//! `SeaORM` Entity for accounting_periods table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "accounting_periods")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub fiscal_year_id: Uuid,
    pub period_number: i16,
    pub name: String,
    pub start_date: Date,
    pub end_date: Date,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::fiscal_years::Entity",
        from = "Column::FiscalYearId",
        to = "super::fiscal_years::Column::Id",
        on_delete = "Cascade"
    )]
    FiscalYears,
}

impl Related<super::fiscal_years::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FiscalYears.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
