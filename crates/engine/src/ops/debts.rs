//! Read-only debt summaries for one user.

use sea_orm::{JoinType, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};
use serde::Serialize;

use crate::{Money, ResultEngine, User, invoices, items, users};

use super::{Engine, with_tx};

/// One unpaid item a user owes.
#[derive(Clone, Debug, Serialize)]
pub struct DebtItem {
    pub item_id: i32,
    pub description: Option<String>,
    pub amount: Money,
    pub invoice_description: Option<String>,
}

/// A user's unpaid items towards one creditor.
#[derive(Clone, Debug, Serialize)]
pub struct CreditorDebt {
    pub creditor: User,
    pub items: Vec<DebtItem>,
    pub subtotal: Money,
}

/// An unpaid item of the session nobody has claimed yet. Informational only.
#[derive(Clone, Debug, Serialize)]
pub struct UnassignedItem {
    pub item_id: i32,
    pub description: Option<String>,
    pub amount: Money,
    pub paid_by: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct DebtSummary {
    pub session_description: Option<String>,
    pub by_creditor: Vec<CreditorDebt>,
    pub total: Money,
    pub unassigned: Vec<UnassignedItem>,
}

/// Result of [`Engine::debt_summary`]. Having no active session is a normal
/// answer, not an error.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DebtStatus {
    NoActiveSession,
    Summary(DebtSummary),
}

impl Engine {
    /// Summarizes what a user owes inside their active session, grouped by
    /// creditor, plus the session's still-unassigned items.
    ///
    /// Creditors appear in the order their first unpaid item was created;
    /// fully paid items never show up.
    pub async fn debt_summary(&self, user_id: i32) -> ResultEngine<DebtStatus> {
        with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, user_id).await?;
            let Some(session) = self.active_session_model_of(&db_tx, user.id).await? else {
                return Ok(DebtStatus::NoActiveSession);
            };

            let my_items = items::Entity::find()
                .join(JoinType::InnerJoin, items::Relation::Invoices.def())
                .filter(invoices::Column::SessionId.eq(session.id.clone()))
                .filter(items::Column::DebtorId.eq(user.id))
                .filter(items::Column::IsPaid.eq(false))
                .order_by_asc(items::Column::Id)
                .all(&db_tx)
                .await?;

            let invoice_map = self
                .invoices_by_ids(&db_tx, my_items.iter().map(|m| m.invoice_id))
                .await?;

            let mut by_creditor: Vec<CreditorDebt> = Vec::new();
            let mut total = Money::ZERO;
            for item in &my_items {
                let invoice = invoice_map
                    .get(&item.invoice_id)
                    .ok_or_else(|| crate::EngineError::NotFound("invoice".to_string()))?;
                let debt_item = DebtItem {
                    item_id: item.id,
                    description: item.description.clone(),
                    amount: Money::new(item.total_cents),
                    invoice_description: invoice.description.clone(),
                };
                total += debt_item.amount;

                match by_creditor
                    .iter()
                    .position(|c| c.creditor.id == invoice.payer_id)
                {
                    Some(index) => {
                        let entry = &mut by_creditor[index];
                        entry.subtotal += debt_item.amount;
                        entry.items.push(debt_item);
                    }
                    None => {
                        let creditor = self.require_user(&db_tx, invoice.payer_id).await?;
                        by_creditor.push(CreditorDebt {
                            creditor: User::from(creditor),
                            subtotal: debt_item.amount,
                            items: vec![debt_item],
                        });
                    }
                }
            }

            let untagged = items::Entity::find()
                .join(JoinType::InnerJoin, items::Relation::Invoices.def())
                .filter(invoices::Column::SessionId.eq(session.id.clone()))
                .filter(items::Column::DebtorId.is_null())
                .filter(items::Column::IsPaid.eq(false))
                .order_by_asc(items::Column::Id)
                .all(&db_tx)
                .await?;

            let untagged_invoices = self
                .invoices_by_ids(&db_tx, untagged.iter().map(|m| m.invoice_id))
                .await?;
            let payer_ids: Vec<i32> = untagged_invoices.values().map(|m| m.payer_id).collect();
            let payers: std::collections::HashMap<i32, String> = users::Entity::find()
                .filter(users::Column::Id.is_in(payer_ids))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|m| (m.id, m.name))
                .collect();

            let mut unassigned = Vec::with_capacity(untagged.len());
            for item in untagged {
                let invoice = untagged_invoices
                    .get(&item.invoice_id)
                    .ok_or_else(|| crate::EngineError::NotFound("invoice".to_string()))?;
                unassigned.push(UnassignedItem {
                    item_id: item.id,
                    description: item.description,
                    amount: Money::new(item.total_cents),
                    paid_by: payers.get(&invoice.payer_id).cloned().unwrap_or_default(),
                });
            }

            Ok(DebtStatus::Summary(DebtSummary {
                session_description: session.description,
                by_creditor,
                total,
                unassigned,
            }))
        })
    }
}
