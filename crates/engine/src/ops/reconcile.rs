//! Payment reconciliation: matching an incoming transfer against a debtor's
//! outstanding items.
//!
//! The pending set is read and mutated inside one database transaction, so
//! the unpaid check and the updates observe a single snapshot and a transfer
//! can never spend the same item twice within it.

use std::collections::HashMap;

use sea_orm::{
    ActiveValue, JoinType, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
};
use serde::Serialize;

use crate::{
    EngineError, Money, Payment, ReconcileCmd, ResultEngine, SessionStatus, invoices, items,
    payments, session_members, sessions, users,
};

use super::{Engine, with_tx};

/// A creditor a pending item set points at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Creditor {
    pub id: i32,
    pub name: String,
}

/// What a committed reconciliation did.
#[derive(Clone, Debug, Serialize)]
pub struct Settlement {
    pub payment: Payment,
    pub items_paid: usize,
    pub items_partial: usize,
    /// Debt left over after the transfer (zero when settled in full).
    pub remaining: Money,
}

/// Result of [`Engine::reconcile_transfer`].
///
/// Mismatches are ordinary business results, not errors: the ledger is
/// untouched for every variant except `Settled` and `PartiallySettled`.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    /// The payer has no outstanding items; nothing was mutated.
    NothingPending,
    /// The transfer covered the whole pending set (within tolerance).
    Settled(Settlement),
    /// The transfer covered part of the pending set; items were paid in
    /// creation order and at most one item is left partially paid.
    PartiallySettled(Settlement),
    /// The transfer exceeds the pending total; rejected without mutation.
    AmountExceedsPending { transfer: Money, pending: Money },
    /// The pending items belong to several creditors; the caller must name
    /// the creditor the transfer is for before reconciling.
    MixedCreditors { creditors: Vec<Creditor> },
}

impl Engine {
    /// Allocates an incoming transfer across the payer's outstanding items.
    ///
    /// The pending set is every unpaid item assigned to the payer inside an
    /// ACTIVE session the payer is a member of, in creation order. The
    /// transfer is compared against the set's outstanding total with the
    /// command's tolerance (one cent by default):
    ///
    /// - equal within tolerance: every item is paid in full;
    /// - less: items are paid greedily in order, the last touched item may
    ///   remain partially paid, untouched items keep their balance;
    /// - more: rejected, nothing is mutated.
    ///
    /// One payment row records the transfer and references every touched
    /// item; each touched invoice's pending amount drops by what was
    /// allocated to it.
    pub async fn reconcile_transfer(&self, cmd: ReconcileCmd) -> ResultEngine<ReconcileOutcome> {
        if !cmd.amount.is_positive() {
            return Err(EngineError::Validation(
                "transfer amount must be positive".to_string(),
            ));
        }
        if cmd.tolerance.is_negative() {
            return Err(EngineError::Validation(
                "tolerance must not be negative".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let payer = self.require_user(&db_tx, cmd.payer_id).await?;

            let mut pending = self.pending_item_models(&db_tx, payer.id).await?;
            if pending.is_empty() {
                return Ok(ReconcileOutcome::NothingPending);
            }

            let invoice_map = self
                .invoices_by_ids(&db_tx, pending.iter().map(|m| m.invoice_id))
                .await?;
            let creditor_of = |item: &items::Model| -> ResultEngine<i32> {
                invoice_map
                    .get(&item.invoice_id)
                    .map(|inv| inv.payer_id)
                    .ok_or_else(|| EngineError::NotFound("invoice".to_string()))
            };

            match cmd.creditor_id {
                Some(creditor_id) => {
                    let mut narrowed = Vec::with_capacity(pending.len());
                    for item in pending {
                        if creditor_of(&item)? == creditor_id {
                            narrowed.push(item);
                        }
                    }
                    pending = narrowed;
                    if pending.is_empty() {
                        return Ok(ReconcileOutcome::NothingPending);
                    }
                }
                None => {
                    let mut creditor_ids: Vec<i32> = Vec::new();
                    for item in &pending {
                        let id = creditor_of(item)?;
                        if !creditor_ids.contains(&id) {
                            creditor_ids.push(id);
                        }
                    }
                    if creditor_ids.len() > 1 {
                        let creditors = self.load_creditors(&db_tx, &creditor_ids).await?;
                        return Ok(ReconcileOutcome::MixedCreditors { creditors });
                    }
                }
            }

            let receiver_id = creditor_of(&pending[0])?;
            let total_pending: i64 = pending
                .iter()
                .map(|m| (m.total_cents - m.paid_cents).max(0))
                .sum();

            let transfer = cmd.amount.cents();
            let eps = cmd.tolerance.cents();

            if transfer > total_pending + eps {
                return Ok(ReconcileOutcome::AmountExceedsPending {
                    transfer: cmd.amount,
                    pending: Money::new(total_pending),
                });
            }
            let exact = (transfer - total_pending).abs() <= eps;

            let payment_model = payments::ActiveModel {
                id: ActiveValue::NotSet,
                payer_id: ActiveValue::Set(payer.id),
                receiver_id: ActiveValue::Set(receiver_id),
                amount_cents: ActiveValue::Set(transfer),
            }
            .insert(&db_tx)
            .await?;

            let mut allocation_left = transfer;
            let mut allocated_per_invoice: HashMap<i32, i64> = HashMap::new();
            let mut items_paid = 0usize;
            let mut items_partial = 0usize;

            for item in &pending {
                let outstanding = (item.total_cents - item.paid_cents).max(0);
                let (allocated, fully) = if exact || allocation_left >= outstanding {
                    (outstanding, true)
                } else {
                    (allocation_left, false)
                };
                if !exact && allocated == 0 {
                    break;
                }

                let paid_cents = if fully {
                    item.total_cents
                } else {
                    item.paid_cents + allocated
                };
                items::ActiveModel {
                    id: ActiveValue::Set(item.id),
                    paid_cents: ActiveValue::Set(paid_cents),
                    is_paid: ActiveValue::Set(fully),
                    payment_id: ActiveValue::Set(Some(payment_model.id)),
                    ..Default::default()
                }
                .update(&db_tx)
                .await?;

                *allocated_per_invoice.entry(item.invoice_id).or_insert(0) += allocated;
                if fully {
                    items_paid += 1;
                } else {
                    items_partial += 1;
                }
                if !exact {
                    allocation_left -= allocated;
                    if allocation_left == 0 {
                        break;
                    }
                }
            }

            for (invoice_id, allocated) in allocated_per_invoice {
                let invoice = invoice_map
                    .get(&invoice_id)
                    .ok_or_else(|| EngineError::NotFound("invoice".to_string()))?;
                invoices::ActiveModel {
                    id: ActiveValue::Set(invoice_id),
                    pending_cents: ActiveValue::Set((invoice.pending_cents - allocated).max(0)),
                    ..Default::default()
                }
                .update(&db_tx)
                .await?;
            }

            let payment = Payment::from(payment_model);
            let settlement = Settlement {
                payment,
                items_paid,
                items_partial,
                remaining: Money::new((total_pending - transfer).max(0)),
            };

            if exact {
                tracing::info!(
                    payment = settlement.payment.id,
                    payer = payer.id,
                    receiver = receiver_id,
                    "transfer settled all pending items"
                );
                Ok(ReconcileOutcome::Settled(settlement))
            } else {
                tracing::info!(
                    payment = settlement.payment.id,
                    payer = payer.id,
                    receiver = receiver_id,
                    paid = settlement.items_paid,
                    partial = settlement.items_partial,
                    "transfer partially settled pending items"
                );
                Ok(ReconcileOutcome::PartiallySettled(settlement))
            }
        })
    }

    /// The payer's unpaid items across ACTIVE sessions they belong to, in
    /// creation order. This is the scope every reconciliation and collection
    /// works on.
    pub(super) async fn pending_item_models(
        &self,
        db: &sea_orm::DatabaseTransaction,
        debtor_id: i32,
    ) -> ResultEngine<Vec<items::Model>> {
        items::Entity::find()
            .join(JoinType::InnerJoin, items::Relation::Invoices.def())
            .join(JoinType::InnerJoin, invoices::Relation::Sessions.def())
            .join(JoinType::InnerJoin, sessions::Relation::Members.def())
            .filter(items::Column::DebtorId.eq(debtor_id))
            .filter(items::Column::IsPaid.eq(false))
            .filter(sessions::Column::Status.eq(SessionStatus::Active.as_str()))
            .filter(session_members::Column::UserId.eq(debtor_id))
            .order_by_asc(items::Column::Id)
            .all(db)
            .await
            .map_err(Into::into)
    }

    pub(super) async fn invoices_by_ids(
        &self,
        db: &sea_orm::DatabaseTransaction,
        ids: impl Iterator<Item = i32>,
    ) -> ResultEngine<HashMap<i32, invoices::Model>> {
        let mut unique: Vec<i32> = ids.collect();
        unique.sort_unstable();
        unique.dedup();

        let models = invoices::Entity::find()
            .filter(invoices::Column::Id.is_in(unique))
            .all(db)
            .await?;
        Ok(models.into_iter().map(|m| (m.id, m)).collect())
    }

    async fn load_creditors(
        &self,
        db: &sea_orm::DatabaseTransaction,
        creditor_ids: &[i32],
    ) -> ResultEngine<Vec<Creditor>> {
        let models = users::Entity::find()
            .filter(users::Column::Id.is_in(creditor_ids.to_vec()))
            .all(db)
            .await?;
        let names: HashMap<i32, String> =
            models.into_iter().map(|m| (m.id, m.name)).collect();

        // Preserve the encounter order of the pending set.
        Ok(creditor_ids
            .iter()
            .map(|id| Creditor {
                id: *id,
                name: names.get(id).cloned().unwrap_or_default(),
            })
            .collect())
    }
}
