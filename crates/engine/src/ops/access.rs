//! Lookups shared by the ledger operations.
//!
//! Every helper takes the open `DatabaseTransaction` so reads and the
//! mutations that depend on them observe one snapshot.

use sea_orm::{DatabaseTransaction, JoinType, QueryFilter, QueryOrder, QuerySelect, prelude::*};
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, SessionStatus, session_members, sessions, users,
};

use super::Engine;

impl Engine {
    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        user_id: i32,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("user".to_string()))
    }

    pub(super) async fn user_model_by_phone(
        &self,
        db: &DatabaseTransaction,
        phone: &str,
    ) -> ResultEngine<Option<users::Model>> {
        users::Entity::find()
            .filter(users::Column::Phone.eq(phone))
            .one(db)
            .await
            .map_err(Into::into)
    }

    pub(super) async fn require_session_model(
        &self,
        db: &DatabaseTransaction,
        session_id: Uuid,
    ) -> ResultEngine<sessions::Model> {
        sessions::Entity::find_by_id(session_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("session".to_string()))
    }

    pub(super) async fn is_session_member(
        &self,
        db: &DatabaseTransaction,
        session_id: &str,
        user_id: i32,
    ) -> ResultEngine<bool> {
        session_members::Entity::find_by_id((session_id.to_string(), user_id))
            .one(db)
            .await
            .map(|row| row.is_some())
            .map_err(Into::into)
    }

    /// The ACTIVE session owned by a user, if any.
    ///
    /// More than one row violates the one-active-session-per-owner invariant
    /// and is surfaced as a conflict, never resolved by picking one.
    pub(super) async fn owned_active_session(
        &self,
        db: &DatabaseTransaction,
        owner_id: i32,
    ) -> ResultEngine<Option<sessions::Model>> {
        let models = sessions::Entity::find()
            .filter(sessions::Column::OwnerId.eq(owner_id))
            .filter(sessions::Column::Status.eq(SessionStatus::Active.as_str()))
            .all(db)
            .await?;

        let mut iter = models.into_iter();
        let first = iter.next();
        if iter.next().is_some() {
            return Err(EngineError::Conflict(
                "more than one active session owned by user".to_string(),
            ));
        }
        Ok(first)
    }

    /// The ACTIVE session a user is a member of, if any (owners are members).
    ///
    /// A user belonging to several ACTIVE sessions is ambiguous and surfaced
    /// as a conflict.
    pub(super) async fn active_session_model_of(
        &self,
        db: &DatabaseTransaction,
        user_id: i32,
    ) -> ResultEngine<Option<sessions::Model>> {
        let models = sessions::Entity::find()
            .join(JoinType::InnerJoin, sessions::Relation::Members.def())
            .filter(session_members::Column::UserId.eq(user_id))
            .filter(sessions::Column::Status.eq(SessionStatus::Active.as_str()))
            .all(db)
            .await?;

        let mut iter = models.into_iter();
        let first = iter.next();
        if iter.next().is_some() {
            return Err(EngineError::Conflict(
                "user belongs to more than one active session".to_string(),
            ));
        }
        Ok(first)
    }

    /// All members of a session, ordered by user id.
    pub(super) async fn session_member_models(
        &self,
        db: &DatabaseTransaction,
        session_id: &str,
    ) -> ResultEngine<Vec<users::Model>> {
        users::Entity::find()
            .join(JoinType::InnerJoin, users::Relation::Memberships.def())
            .filter(session_members::Column::SessionId.eq(session_id.to_string()))
            .order_by_asc(users::Column::Id)
            .all(db)
            .await
            .map_err(Into::into)
    }

    /// Resolves a member of the session by name substring.
    ///
    /// Matching is accent- and case-insensitive; with several matches the
    /// lowest user id wins so repeated commands resolve identically.
    pub(super) async fn resolve_member_by_name(
        &self,
        db: &DatabaseTransaction,
        session_id: &str,
        needle: &str,
    ) -> ResultEngine<users::Model> {
        let needle_key = normalize_name_key(needle)
            .ok_or_else(|| EngineError::Validation("user name must not be empty".to_string()))?;

        let members = self.session_member_models(db, session_id).await?;
        members
            .into_iter()
            .find(|m| {
                normalize_name_key(&m.name).is_some_and(|key| key.contains(&needle_key))
            })
            .ok_or_else(|| EngineError::NotFound("user".to_string()))
    }
}

/// Lowercases, strips accents and collapses separators so "José" matches
/// "jose".
pub(super) fn normalize_name_key(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut out = String::new();
    let mut prev_space = false;
    for ch in trimmed.nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            for lower in ch.to_lowercase() {
                out.push(lower);
            }
            prev_space = false;
        } else if !out.is_empty() && !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }
    let normalized = out.trim();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized.to_string())
    }
}
