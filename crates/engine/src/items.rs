//! Items table.
//!
//! The smallest billable unit of an invoice. Items start unassigned
//! (`debtor_id` null) and unpaid; assignment tags a debtor, reconciliation
//! fills `paid` until `is_paid` flips. Items are never deleted by the normal
//! flow.
//!
//! Invariants, tolerance one cent:
//! - `0 <= paid <= total`
//! - `is_paid` exactly when `paid >= total - epsilon`

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{Money, TipRate};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i32,
    pub invoice_id: i32,
    pub description: Option<String>,
    pub debtor_id: Option<i32>,
    pub unit_price: Money,
    pub tip_rate: TipRate,
    pub total: Money,
    pub paid: Money,
    pub is_paid: bool,
    pub payment_id: Option<i32>,
}

impl Item {
    /// The amount still owed on the item.
    pub fn outstanding(&self) -> Money {
        (self.total - self.paid).clamp_zero()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub invoice_id: i32,
    pub description: Option<String>,
    pub debtor_id: Option<i32>,
    pub unit_price_cents: i64,
    pub tip_rate_bp: i64,
    pub total_cents: i64,
    pub paid_cents: i64,
    pub is_paid: bool,
    pub payment_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::invoices::Entity",
        from = "Column::InvoiceId",
        to = "super::invoices::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Invoices,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::DebtorId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Debtor,
    #[sea_orm(
        belongs_to = "super::payments::Entity",
        from = "Column::PaymentId",
        to = "super::payments::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Payments,
}

impl Related<super::invoices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Item {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            invoice_id: model.invoice_id,
            description: model.description,
            debtor_id: model.debtor_id,
            unit_price: Money::new(model.unit_price_cents),
            tip_rate: TipRate::from_basis_points(model.tip_rate_bp),
            total: Money::new(model.total_cents),
            paid: Money::new(model.paid_cents),
            is_paid: model.is_paid,
            payment_id: model.payment_id,
        }
    }
}
