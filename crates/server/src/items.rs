//! Item assignment API endpoint

use api_types::item::ItemAssign;
use axum::{Json, extract::State};
use engine::{AssignItemCmd, Item, ItemSelector, UserSelector};

use crate::{ServerError, server::ServerState};

pub async fn assign(
    State(state): State<ServerState>,
    Json(payload): Json<ItemAssign>,
) -> Result<Json<Item>, ServerError> {
    let selector = match (payload.item_id, payload.item_description) {
        (Some(item_id), _) => ItemSelector::ById(item_id),
        (None, Some(needle)) => ItemSelector::ByDescription {
            invoice_id: payload.invoice_id,
            needle,
        },
        (None, None) => {
            return Err(ServerError::Generic(
                "item_id or item_description is required".to_string(),
            ));
        }
    };

    let target = match (payload.user_id, payload.user_name) {
        (Some(user_id), _) => UserSelector::ById(user_id),
        (None, Some(name)) => UserSelector::ByName(name),
        (None, None) => UserSelector::Requester,
    };

    let item = state
        .engine
        .assign_item(
            AssignItemCmd::new(payload.session_id, payload.requester_id, selector)
                .target(target),
        )
        .await?;
    Ok(Json(item))
}
