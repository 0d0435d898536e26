//! Session lifecycle: create, join, close, active-session lookup.

use sea_orm::{ActiveValue, TransactionTrait, prelude::*};
use serde::Serialize;

use crate::{
    CloseSessionCmd, CreateSessionCmd, EngineError, JoinSessionCmd, ResultEngine, Session,
    SessionStatus, session_members, sessions,
};

use super::{Engine, normalize_optional_text, with_tx};

/// Result of [`Engine::join_session`].
///
/// Joining may close the session the joiner previously owned; that side
/// effect is returned here so callers can notify about it instead of
/// discovering it later.
#[derive(Clone, Debug, Serialize)]
pub struct JoinOutcome {
    pub session: Session,
    pub already_member: bool,
    pub closed_session: Option<Session>,
}

impl Engine {
    /// Opens a new session owned by `cmd.owner_id` and enrolls the owner as
    /// its first member.
    ///
    /// A user owns at most one ACTIVE session; a second one is a conflict.
    pub async fn create_session(&self, cmd: CreateSessionCmd) -> ResultEngine<Session> {
        let description = normalize_optional_text(cmd.description.as_deref());

        with_tx!(self, |db_tx| {
            let owner = self.require_user(&db_tx, cmd.owner_id).await?;

            if self.owned_active_session(&db_tx, owner.id).await?.is_some() {
                return Err(EngineError::Conflict(
                    "owner already has an active session".to_string(),
                ));
            }

            let session = Session::new(description.clone(), owner.id);
            sessions::ActiveModel::from(&session).insert(&db_tx).await?;
            session_members::ActiveModel {
                session_id: ActiveValue::Set(session.id.to_string()),
                user_id: ActiveValue::Set(owner.id),
            }
            .insert(&db_tx)
            .await?;

            tracing::info!(session = %session.id, owner = owner.id, "session created");
            Ok(session)
        })
    }

    /// Adds a user to an ACTIVE session.
    ///
    /// Re-joining is a no-op reported through `already_member`. If the joiner
    /// owns a different ACTIVE session it is closed first and returned in
    /// `closed_session`.
    pub async fn join_session(&self, cmd: JoinSessionCmd) -> ResultEngine<JoinOutcome> {
        with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, cmd.user_id).await?;
            let model = self.require_session_model(&db_tx, cmd.session_id).await?;
            let session = Session::try_from(model)?;

            if !session.is_active() {
                return Err(EngineError::Validation("session is closed".to_string()));
            }

            if self
                .is_session_member(&db_tx, &session.id.to_string(), user.id)
                .await?
            {
                return Ok(JoinOutcome {
                    session,
                    already_member: true,
                    closed_session: None,
                });
            }

            let closed_session = match self.owned_active_session(&db_tx, user.id).await? {
                Some(owned) => {
                    sessions::ActiveModel {
                        id: ActiveValue::Set(owned.id.clone()),
                        status: ActiveValue::Set(SessionStatus::Closed.as_str().to_string()),
                        ..Default::default()
                    }
                    .update(&db_tx)
                    .await?;

                    let mut closed = Session::try_from(owned)?;
                    closed.status = SessionStatus::Closed;
                    tracing::info!(
                        session = %closed.id,
                        user = user.id,
                        "previously owned session closed on join"
                    );
                    Some(closed)
                }
                None => None,
            };

            session_members::ActiveModel {
                session_id: ActiveValue::Set(session.id.to_string()),
                user_id: ActiveValue::Set(user.id),
            }
            .insert(&db_tx)
            .await?;

            tracing::info!(session = %session.id, user = user.id, "member joined");
            Ok(JoinOutcome {
                session,
                already_member: false,
                closed_session,
            })
        })
    }

    /// Closes a session. Only the owner may close; closing twice is rejected
    /// so callers can tell a stale command from a fresh one.
    pub async fn close_session(&self, cmd: CloseSessionCmd) -> ResultEngine<Session> {
        with_tx!(self, |db_tx| {
            let requester = self.require_user(&db_tx, cmd.requester_id).await?;
            let model = self.require_session_model(&db_tx, cmd.session_id).await?;
            let mut session = Session::try_from(model)?;

            if session.owner_id != requester.id {
                return Err(EngineError::Validation(
                    "only the owner may close the session".to_string(),
                ));
            }
            if !session.is_active() {
                return Err(EngineError::Validation(
                    "session already closed".to_string(),
                ));
            }

            sessions::ActiveModel {
                id: ActiveValue::Set(session.id.to_string()),
                status: ActiveValue::Set(SessionStatus::Closed.as_str().to_string()),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            session.status = SessionStatus::Closed;
            tracing::info!(session = %session.id, "session closed");
            Ok(session)
        })
    }

    /// The ACTIVE session a user is currently a member of, if any.
    pub async fn active_session_of(&self, user_id: i32) -> ResultEngine<Option<Session>> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            self.active_session_model_of(&db_tx, user_id)
                .await?
                .map(Session::try_from)
                .transpose()
        })
    }
}
