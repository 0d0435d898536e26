//! Collection: building and dispatching "you owe me" messages.

use sea_orm::TransactionTrait;
use serde::Serialize;

use crate::{
    CollectCmd, DebtItem, EngineError, Money, NotificationSender, PaymentMethod, ResultEngine,
    User, render,
};

use super::{Engine, with_tx};

/// A debtor's pending items towards one invoice of the collector.
#[derive(Clone, Debug, Serialize)]
pub struct InvoiceDebt {
    pub invoice_description: Option<String>,
    pub items: Vec<DebtItem>,
    pub subtotal: Money,
}

/// Everything needed to ask one debtor to pay the collector.
#[derive(Clone, Debug, Serialize)]
pub struct CollectionNotice {
    pub debtor: User,
    pub collector_name: String,
    pub invoices: Vec<InvoiceDebt>,
    pub total: Money,
    pub payment_methods: Vec<PaymentMethod>,
}

/// Tally of a [`Engine::collect_all`] round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CollectReport {
    pub notified: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl Engine {
    /// What a debtor owes the collector right now, grouped per invoice, or
    /// `None` when there is no debt between the two.
    pub async fn collection_notice(
        &self,
        debtor_id: i32,
        collector_id: i32,
    ) -> ResultEngine<Option<CollectionNotice>> {
        with_tx!(self, |db_tx| {
            self.collection_notice_in_tx(&db_tx, debtor_id, collector_id)
                .await
        })
    }

    /// Sends a collection message to every member of the collector's active
    /// session who owes them something. Members with no debt towards the
    /// collector are skipped silently.
    ///
    /// The ledger is read first and messages go out afterwards; a failed
    /// delivery is logged and counted but changes nothing in the ledger.
    pub async fn collect_all<N>(
        &self,
        cmd: CollectCmd,
        notifier: &N,
    ) -> ResultEngine<CollectReport>
    where
        N: NotificationSender + Sync,
    {
        let (notices, skipped) = with_tx!(self, |db_tx| {
            let collector = self.require_user(&db_tx, cmd.collector_id).await?;
            let session = self
                .active_session_model_of(&db_tx, collector.id)
                .await?
                .ok_or_else(|| EngineError::Validation("no active session".to_string()))?;

            let members = self.session_member_models(&db_tx, &session.id).await?;
            let mut notices = Vec::new();
            let mut skipped = 0usize;
            for member in members {
                if member.id == collector.id {
                    continue;
                }
                match self
                    .collection_notice_in_tx(&db_tx, member.id, collector.id)
                    .await?
                {
                    Some(notice) => notices.push((member.phone, notice)),
                    None => skipped += 1,
                }
            }
            Ok::<_, EngineError>((notices, skipped))
        })?;

        let mut report = CollectReport {
            skipped,
            ..CollectReport::default()
        };
        for (phone, notice) in notices {
            let text = render::collection_message(&notice);
            match notifier.send(&phone, &text).await {
                Ok(()) => report.notified += 1,
                Err(err) => {
                    tracing::warn!(debtor = notice.debtor.id, "collection message not delivered: {err}");
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            notified = report.notified,
            skipped = report.skipped,
            failed = report.failed,
            "collection round finished"
        );
        Ok(report)
    }

    async fn collection_notice_in_tx(
        &self,
        db_tx: &sea_orm::DatabaseTransaction,
        debtor_id: i32,
        collector_id: i32,
    ) -> ResultEngine<Option<CollectionNotice>> {
        let debtor = self.require_user(db_tx, debtor_id).await?;
        let collector = self.require_user(db_tx, collector_id).await?;

        let pending = self.pending_item_models(db_tx, debtor.id).await?;
        let invoice_map = self
            .invoices_by_ids(db_tx, pending.iter().map(|m| m.invoice_id))
            .await?;

        let mut invoices: Vec<(i32, InvoiceDebt)> = Vec::new();
        let mut total = Money::ZERO;
        for item in &pending {
            let invoice = invoice_map
                .get(&item.invoice_id)
                .ok_or_else(|| EngineError::NotFound("invoice".to_string()))?;
            if invoice.payer_id != collector.id {
                continue;
            }

            let debt_item = DebtItem {
                item_id: item.id,
                description: item.description.clone(),
                amount: Money::new(item.total_cents),
                invoice_description: invoice.description.clone(),
            };
            total += debt_item.amount;

            match invoices.iter().position(|(id, _)| *id == invoice.id) {
                Some(index) => {
                    let (_, entry) = &mut invoices[index];
                    entry.subtotal += debt_item.amount;
                    entry.items.push(debt_item);
                }
                None => invoices.push((
                    invoice.id,
                    InvoiceDebt {
                        invoice_description: invoice.description.clone(),
                        subtotal: debt_item.amount,
                        items: vec![debt_item],
                    },
                )),
            }
        }

        if invoices.is_empty() {
            return Ok(None);
        }

        let payment_methods = self.payment_method_models_in_tx(db_tx, collector.id).await?;
        Ok(Some(CollectionNotice {
            debtor: User::from(debtor),
            collector_name: collector.name,
            invoices: invoices.into_iter().map(|(_, debt)| debt).collect(),
            total,
            payment_methods,
        }))
    }
}
