//! Item assignment: tagging an unassigned item with its debtor.

use sea_orm::{
    ActiveValue, JoinType, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
};

use crate::{
    AssignItemCmd, EngineError, Item, ItemSelector, ResultEngine, UserSelector, invoices, items,
};

use super::{Engine, access::normalize_name_key, with_tx};

impl Engine {
    /// Assigns an unassigned item of the session to a debtor.
    ///
    /// The candidate set is the session's unassigned items only; already
    /// tagged items never move. When a description selector matches several
    /// candidates the lowest item id wins, so repeating a command cannot pick
    /// a different row.
    pub async fn assign_item(&self, cmd: AssignItemCmd) -> ResultEngine<Item> {
        with_tx!(self, |db_tx| {
            let requester = self.require_user(&db_tx, cmd.requester_id).await?;
            let session = self.require_session_model(&db_tx, cmd.session_id).await?;

            let candidates = {
                let mut query = items::Entity::find()
                    .join(JoinType::InnerJoin, items::Relation::Invoices.def())
                    .filter(invoices::Column::SessionId.eq(session.id.clone()))
                    .filter(items::Column::DebtorId.is_null())
                    .order_by_asc(items::Column::Id);

                match &cmd.selector {
                    ItemSelector::ById(item_id) => {
                        query = query.filter(items::Column::Id.eq(*item_id));
                    }
                    ItemSelector::ByDescription { invoice_id, .. } => {
                        if let Some(invoice_id) = invoice_id {
                            query = query.filter(items::Column::InvoiceId.eq(*invoice_id));
                        }
                    }
                }
                query.all(&db_tx).await?
            };

            let item_model = match &cmd.selector {
                ItemSelector::ById(_) => candidates.into_iter().next(),
                ItemSelector::ByDescription { needle, .. } => {
                    let needle_key = normalize_name_key(needle).ok_or_else(|| {
                        EngineError::Validation("item description must not be empty".to_string())
                    })?;
                    candidates.into_iter().find(|m| {
                        m.description
                            .as_deref()
                            .and_then(normalize_name_key)
                            .is_some_and(|key| key.contains(&needle_key))
                    })
                }
            }
            .ok_or_else(|| EngineError::NotFound("item".to_string()))?;

            let target = match &cmd.target {
                UserSelector::Requester => requester,
                UserSelector::ById(user_id) => self.require_user(&db_tx, *user_id).await?,
                UserSelector::ByName(needle) => {
                    self.resolve_member_by_name(&db_tx, &session.id, needle).await?
                }
            };

            let updated = items::ActiveModel {
                id: ActiveValue::Set(item_model.id),
                debtor_id: ActiveValue::Set(Some(target.id)),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            tracing::info!(item = updated.id, debtor = target.id, "item assigned");
            Ok(Item::from(updated))
        })
    }
}
