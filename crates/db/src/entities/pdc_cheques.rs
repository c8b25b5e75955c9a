//! `SeaORM` Entity for pdc_cheques table.
//!
//! Allocations are stored inline as a JSON array of `{open_item_id, amount}`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "pdc_cheques")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub cheque_number: String,
    pub party: String,
    pub cheque_date: Date,
    pub deposit_date: Date,
    pub amount: Decimal,
    #[sea_orm(column_type = "JsonBinary")]
    pub allocations: Json,
    pub status: String,
    pub bank_account_code: Option<String>,
    pub deposit_entry: Uuid,
    pub clearance_entry: Option<Uuid>,
    pub bounce_date: Option<Date>,
    pub bounce_reason: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
