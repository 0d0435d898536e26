//! Receipt ingestion: one parsed receipt becomes one invoice plus its items.

use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    EngineError, IngestReceiptCmd, Invoice, Item, ResultEngine, TipRate, invoices, items,
};

use super::{Engine, normalize_optional_text, with_tx};

impl Engine {
    /// Fetches an invoice together with its items, in creation order.
    pub async fn invoice(&self, invoice_id: i32) -> ResultEngine<(Invoice, Vec<Item>)> {
        with_tx!(self, |db_tx| {
            let model = invoices::Entity::find_by_id(invoice_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound("invoice".to_string()))?;
            let item_models = items::Entity::find()
                .filter(items::Column::InvoiceId.eq(invoice_id))
                .order_by_asc(items::Column::Id)
                .all(&db_tx)
                .await?;
            Ok((
                Invoice::try_from(model)?,
                item_models.into_iter().map(Item::from).collect(),
            ))
        })
    }

    /// Writes a parsed receipt into the submitter's active session.
    ///
    /// The submitter becomes the invoice's payer (creditor). Each receipt
    /// line is expanded by its `count` into individual items carrying the
    /// receipt-wide tip rate, unassigned and unpaid. The invoice and all its
    /// items commit together or not at all.
    pub async fn ingest_receipt(
        &self,
        cmd: IngestReceiptCmd,
    ) -> ResultEngine<(Invoice, Vec<Item>)> {
        let receipt = cmd.receipt;

        if !receipt.total.is_positive() {
            return Err(EngineError::Validation(
                "receipt total must be positive".to_string(),
            ));
        }
        if receipt.items.is_empty() {
            return Err(EngineError::Validation(
                "receipt has no items".to_string(),
            ));
        }
        if receipt.tip.is_negative() {
            return Err(EngineError::Validation(
                "tip must not be negative".to_string(),
            ));
        }
        for line in &receipt.items {
            if !line.unit_amount.is_positive() {
                return Err(EngineError::Validation(format!(
                    "item '{}' must have a positive amount",
                    line.description
                )));
            }
            if line.count == 0 {
                return Err(EngineError::Validation(format!(
                    "item '{}' must have a positive count",
                    line.description
                )));
            }
        }

        let tip_rate = TipRate::from_amounts(receipt.tip, receipt.total);

        with_tx!(self, |db_tx| {
            let submitter = self.require_user(&db_tx, cmd.submitter_id).await?;
            let session = self
                .active_session_model_of(&db_tx, submitter.id)
                .await?
                .ok_or_else(|| EngineError::Validation("no active session".to_string()))?;

            let invoice_model = invoices::ActiveModel {
                id: ActiveValue::NotSet,
                description: ActiveValue::Set(normalize_optional_text(Some(&receipt.merchant))),
                total_cents: ActiveValue::Set(receipt.total.cents()),
                pending_cents: ActiveValue::Set(receipt.total.cents()),
                payer_id: ActiveValue::Set(submitter.id),
                session_id: ActiveValue::Set(session.id.clone()),
            }
            .insert(&db_tx)
            .await?;

            let mut created = Vec::new();
            for line in &receipt.items {
                let total = line.unit_amount.with_tip(tip_rate);
                for _ in 0..line.count {
                    let item_model = items::ActiveModel {
                        id: ActiveValue::NotSet,
                        invoice_id: ActiveValue::Set(invoice_model.id),
                        description: ActiveValue::Set(normalize_optional_text(Some(
                            &line.description,
                        ))),
                        debtor_id: ActiveValue::Set(None),
                        unit_price_cents: ActiveValue::Set(line.unit_amount.cents()),
                        tip_rate_bp: ActiveValue::Set(tip_rate.basis_points()),
                        total_cents: ActiveValue::Set(total.cents()),
                        paid_cents: ActiveValue::Set(0),
                        is_paid: ActiveValue::Set(false),
                        payment_id: ActiveValue::Set(None),
                    }
                    .insert(&db_tx)
                    .await?;
                    created.push(Item::from(item_model));
                }
            }

            let invoice = Invoice::try_from(invoice_model)?;
            tracing::info!(
                invoice = invoice.id,
                session = %invoice.session_id,
                items = created.len(),
                "receipt ingested"
            );
            Ok((invoice, created))
        })
    }
}
