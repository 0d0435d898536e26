//! Payments table.
//!
//! A payment records one settled transfer between two users. It is created
//! atomically with the item and invoice updates it causes and is immutable
//! afterwards. One payment may span many items; an item references at most
//! one payment.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::Money;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: i32,
    pub payer_id: i32,
    pub receiver_id: i32,
    pub amount: Money,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub payer_id: i32,
    pub receiver_id: i32,
    pub amount_cents: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::items::Entity")]
    Items,
}

impl Related<super::items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Payment {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            payer_id: model.payer_id,
            receiver_id: model.receiver_id,
            amount: Money::new(model.amount_cents),
        }
    }
}
