//! Debt summary API endpoint

use axum::{
    Json,
    extract::{Path, State},
};
use engine::DebtStatus;

use crate::{ServerError, server::ServerState};

pub async fn summary(
    State(state): State<ServerState>,
    Path(user_id): Path<i32>,
) -> Result<Json<DebtStatus>, ServerError> {
    let status = state.engine.debt_summary(user_id).await?;
    Ok(Json(status))
}
