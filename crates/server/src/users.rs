//! User API endpoints

use api_types::user::{PaymentMethodNew, UserEnsure};
use axum::{
    Json,
    extract::{Path, State},
};
use engine::{EngineError, PaymentMethod, User};

use crate::{ServerError, server::ServerState};

/// Get-or-create a user by phone number.
pub async fn ensure(
    State(state): State<ServerState>,
    Json(payload): Json<UserEnsure>,
) -> Result<Json<User>, ServerError> {
    let user = state.engine.ensure_user(&payload.phone, &payload.name).await?;
    Ok(Json(user))
}

pub async fn by_phone(
    State(state): State<ServerState>,
    Path(phone): Path<String>,
) -> Result<Json<User>, ServerError> {
    let user = state
        .engine
        .user_by_phone(&phone)
        .await?
        .ok_or_else(|| EngineError::NotFound("user".to_string()))?;
    Ok(Json(user))
}

#[derive(serde::Deserialize)]
pub struct UserRename {
    pub name: String,
}

pub async fn rename(
    State(state): State<ServerState>,
    Path(user_id): Path<i32>,
    Json(payload): Json<UserRename>,
) -> Result<Json<User>, ServerError> {
    let user = state.engine.rename_user(user_id, &payload.name).await?;
    Ok(Json(user))
}

pub async fn payment_methods(
    State(state): State<ServerState>,
    Path(user_id): Path<i32>,
) -> Result<Json<Vec<PaymentMethod>>, ServerError> {
    let methods = state.engine.payment_methods_of(user_id).await?;
    Ok(Json(methods))
}

/// Register a payment method for a user.
pub async fn payment_method_new(
    State(state): State<ServerState>,
    Json(payload): Json<PaymentMethodNew>,
) -> Result<Json<PaymentMethod>, ServerError> {
    let method = state
        .engine
        .add_payment_method(payload.user_id, &payload.name, payload.description.as_deref())
        .await?;
    Ok(Json(method))
}
