//! The module contains the error the engine can throw.
//!
//! Callers branch on the variant, never on message text:
//!
//! - [`NotFound`] a user/session/invoice/item lookup failed; nothing was mutated.
//! - [`Validation`] malformed input or a lifecycle/ownership rule was violated.
//! - [`Conflict`] the stored state is ambiguous (e.g. two ACTIVE sessions for
//!   one owner) and must never be resolved by silently picking one row.
//!
//! Amount mismatches during reconciliation are *not* errors; they are
//! variants of [`ReconcileOutcome`].
//!
//!  [`NotFound`]: EngineError::NotFound
//!  [`Validation`]: EngineError::Validation
//!  [`Conflict`]: EngineError::Conflict
//!  [`ReconcileOutcome`]: crate::ReconcileOutcome
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("conflicting state: {0}")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
