//! Decoded-action dispatch.
//!
//! The command interpreter (external) turns a free-text WhatsApp message into
//! one [`InterpreterAction`]; this endpoint routes the action to the ledger
//! and answers with the text to send back to the sender. The sender is
//! registered on first contact.

use axum::{Json, extract::State};
use engine::{
    AssignItemCmd, CloseSessionCmd, CollectCmd, CreateSessionCmd, EngineError, InterpreterAction,
    ItemSelector, JoinSessionCmd, UserSelector, render,
};
use serde::{Deserialize, Serialize};

use crate::{ServerError, server::ServerState};

const TOO_MANY_ACTIVE_SESSIONS_MESSAGE: &str = "No puedes tener más de una sesión activa a la \
                                                vez, por favor cierra la sesión anterior antes \
                                                de crear una nueva.";
const NO_ACTIVE_SESSION_MESSAGE: &str = "No tienes una sesión activa.";

#[derive(Debug, Deserialize)]
pub struct DispatchRequest {
    pub sender_phone: String,
    pub sender_name: Option<String>,
    pub action: InterpreterAction,
}

#[derive(Debug, Serialize)]
pub struct DispatchReply {
    /// Text to send back to the sender.
    pub reply: String,
}

pub async fn handle(
    State(state): State<ServerState>,
    Json(payload): Json<DispatchRequest>,
) -> Result<Json<DispatchReply>, ServerError> {
    let name = payload
        .sender_name
        .as_deref()
        .unwrap_or(payload.sender_phone.as_str());
    let user = state
        .engine
        .ensure_user(&payload.sender_phone, name)
        .await?;

    let reply = match payload.action {
        InterpreterAction::CreateSession { description } => {
            match state
                .engine
                .create_session(CreateSessionCmd::new(user.id).description(description))
                .await
            {
                Ok(session) => match state.bot_phone.as_deref() {
                    Some(bot_phone) => format!(
                        "Sesión creada.\n{}",
                        render::session_invite_link(session.id, bot_phone)
                    ),
                    None => "Sesión creada.".to_string(),
                },
                Err(EngineError::Conflict(_)) => TOO_MANY_ACTIVE_SESSIONS_MESSAGE.to_string(),
                Err(err) => return Err(err.into()),
            }
        }
        InterpreterAction::CloseSession { session_id } => {
            let session_id = match session_id {
                Some(id) => id,
                None => match state.engine.active_session_of(user.id).await? {
                    Some(session) => session.id,
                    None => {
                        return Ok(Json(DispatchReply {
                            reply: NO_ACTIVE_SESSION_MESSAGE.to_string(),
                        }));
                    }
                },
            };
            state
                .engine
                .close_session(CloseSessionCmd::new(session_id, user.id))
                .await?;
            "Sesión cerrada. ¡Gracias!".to_string()
        }
        InterpreterAction::JoinSession { session_id } => {
            let outcome = state
                .engine
                .join_session(JoinSessionCmd::new(session_id, user.id))
                .await?;
            if outcome.already_member {
                "Ya eras parte de esta sesión.".to_string()
            } else if outcome.closed_session.is_some() {
                "Te uniste a la sesión. Tu sesión anterior quedó cerrada.".to_string()
            } else {
                "Te uniste a la sesión.".to_string()
            }
        }
        InterpreterAction::AssignItem {
            item_id,
            invoice_id,
            item_description,
            user_id,
            user_name,
        } => {
            let Some(session) = state.engine.active_session_of(user.id).await? else {
                return Ok(Json(DispatchReply {
                    reply: NO_ACTIVE_SESSION_MESSAGE.to_string(),
                }));
            };

            let selector = match (item_id, item_description) {
                (Some(id), _) => ItemSelector::ById(id),
                (None, Some(needle)) => ItemSelector::ByDescription { invoice_id, needle },
                (None, None) => {
                    return Ok(Json(DispatchReply {
                        reply: "Dime qué item quieres asignar.".to_string(),
                    }));
                }
            };
            let target = match (user_id, user_name) {
                (Some(id), _) => UserSelector::ById(id),
                (None, Some(name)) => UserSelector::ByName(name),
                (None, None) => UserSelector::Requester,
            };

            let item = state
                .engine
                .assign_item(AssignItemCmd::new(session.id, user.id, selector).target(target))
                .await?;
            format!(
                "Item asignado: {} ({})",
                item.description.as_deref().unwrap_or("Sin descripción"),
                item.total
            )
        }
        InterpreterAction::Collect => {
            let report = state
                .engine
                .collect_all(CollectCmd::new(user.id), state.notifier.as_ref())
                .await?;
            format!(
                "Mensajes de cobro enviados a {} personas ({} sin deudas).",
                report.notified, report.skipped
            )
        }
        InterpreterAction::QueryDebtStatus => {
            let status = state.engine.debt_summary(user.id).await?;
            render::debt_status_message(&status)
        }
        InterpreterAction::Unknown { reason } => {
            if let Some(reason) = reason {
                tracing::info!(user = user.id, %reason, "unrecognized command");
            }
            "No entendí el mensaje. Puedes crear una sesión, unirte a una, asignar items, \
             consultar tus deudas o cobrar."
                .to_string()
        }
    };

    Ok(Json(DispatchReply { reply }))
}
