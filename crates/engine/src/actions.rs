//! Decoded free-text commands.
//!
//! The command interpreter (an external collaborator) turns free text into
//! exactly one of these actions plus its slot data; the dispatch layer
//! branches on the tag. `Unknown` is a first-class action so callers can
//! answer gracefully instead of guessing.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum InterpreterAction {
    CreateSession {
        description: String,
    },
    CloseSession {
        session_id: Option<Uuid>,
    },
    JoinSession {
        session_id: Uuid,
    },
    AssignItem {
        item_id: Option<i32>,
        invoice_id: Option<i32>,
        item_description: Option<String>,
        user_id: Option<i32>,
        user_name: Option<String>,
    },
    Collect,
    QueryDebtStatus,
    Unknown {
        reason: Option<String>,
    },
}
