//! `SeaORM` Entity for fixed_assets table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "fixed_assets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub code: String,
    pub name: String,
    pub acquisition_date: Date,
    pub acquisition_cost: Decimal,
    pub salvage_value: Decimal,
    pub useful_life_months: i32,
    pub method: String,
    pub accumulated_depreciation: Decimal,
    pub depreciation_runs: i32,
    pub last_depreciation_date: Option<Date>,
    pub status: String,
    pub acquisition_entry: Option<Uuid>,
    pub disposal_entry: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
