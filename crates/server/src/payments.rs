//! Payment reconciliation API endpoint

use api_types::payment::PaymentNew;
use axum::{Json, extract::State};
use engine::{Money, ReconcileCmd, ReconcileOutcome};

use crate::{ServerError, server::ServerState};

pub async fn reconcile(
    State(state): State<ServerState>,
    Json(payload): Json<PaymentNew>,
) -> Result<Json<ReconcileOutcome>, ServerError> {
    let mut cmd = ReconcileCmd::new(payload.payer_id, Money::new(payload.amount_cents));
    if let Some(creditor_id) = payload.creditor_id {
        cmd = cmd.creditor(creditor_id);
    }
    let outcome = state.engine.reconcile_transfer(cmd).await?;
    Ok(Json(outcome))
}
