//! Collection trigger API endpoint

use api_types::collect::CollectNew;
use axum::{Json, extract::State};
use engine::{CollectCmd, CollectReport};

use crate::{ServerError, server::ServerState};

pub async fn trigger(
    State(state): State<ServerState>,
    Json(payload): Json<CollectNew>,
) -> Result<Json<CollectReport>, ServerError> {
    let report = state
        .engine
        .collect_all(CollectCmd::new(payload.collector_id), state.notifier.as_ref())
        .await?;
    Ok(Json(report))
}
