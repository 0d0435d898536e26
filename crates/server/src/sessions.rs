//! Session API endpoints

use api_types::session::{SessionClose, SessionJoin, SessionNew};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use engine::{
    CloseSessionCmd, CreateSessionCmd, JoinOutcome, JoinSessionCmd, Session,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<SessionNew>,
) -> Result<Json<Session>, ServerError> {
    let mut cmd = CreateSessionCmd::new(payload.owner_id);
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    let session = state.engine.create_session(cmd).await?;
    Ok(Json(session))
}

#[derive(Deserialize)]
pub struct ActiveQuery {
    pub user_id: i32,
}

pub async fn active(
    State(state): State<ServerState>,
    Query(query): Query<ActiveQuery>,
) -> Result<Json<Option<Session>>, ServerError> {
    let session = state.engine.active_session_of(query.user_id).await?;
    Ok(Json(session))
}

pub async fn join(
    State(state): State<ServerState>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<SessionJoin>,
) -> Result<Json<JoinOutcome>, ServerError> {
    let outcome = state
        .engine
        .join_session(JoinSessionCmd::new(session_id, payload.user_id))
        .await?;
    Ok(Json(outcome))
}

pub async fn close(
    State(state): State<ServerState>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<SessionClose>,
) -> Result<Json<Session>, ServerError> {
    let session = state
        .engine
        .close_session(CloseSessionCmd::new(session_id, payload.requester_id))
        .await?;
    Ok(Json(session))
}
