//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and enumerating exactly the fields each operation may touch —
//! there is no update-anything-by-name path into the ledger.

use uuid::Uuid;

use crate::{Money, PAYMENT_EPSILON, ParsedReceipt};

/// Create a session owned by a user.
#[derive(Clone, Debug)]
pub struct CreateSessionCmd {
    pub owner_id: i32,
    pub description: Option<String>,
}

impl CreateSessionCmd {
    #[must_use]
    pub fn new(owner_id: i32) -> Self {
        Self {
            owner_id,
            description: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Join an existing session.
#[derive(Clone, Debug)]
pub struct JoinSessionCmd {
    pub session_id: Uuid,
    pub user_id: i32,
}

impl JoinSessionCmd {
    #[must_use]
    pub fn new(session_id: Uuid, user_id: i32) -> Self {
        Self {
            session_id,
            user_id,
        }
    }
}

/// Close a session (owner only).
#[derive(Clone, Debug)]
pub struct CloseSessionCmd {
    pub session_id: Uuid,
    pub requester_id: i32,
}

impl CloseSessionCmd {
    #[must_use]
    pub fn new(session_id: Uuid, requester_id: i32) -> Self {
        Self {
            session_id,
            requester_id,
        }
    }
}

/// Ingest a parsed receipt into the submitter's active session.
#[derive(Clone, Debug)]
pub struct IngestReceiptCmd {
    pub submitter_id: i32,
    pub receipt: ParsedReceipt,
}

impl IngestReceiptCmd {
    #[must_use]
    pub fn new(submitter_id: i32, receipt: ParsedReceipt) -> Self {
        Self {
            submitter_id,
            receipt,
        }
    }
}

/// How to pick the item to assign.
#[derive(Clone, Debug)]
pub enum ItemSelector {
    ById(i32),
    /// Substring match over unassigned item descriptions, optionally narrowed
    /// to one invoice. Multiple matches resolve to the lowest item id.
    ByDescription {
        invoice_id: Option<i32>,
        needle: String,
    },
}

/// Who the item gets assigned to.
#[derive(Clone, Debug, Default)]
pub enum UserSelector {
    ById(i32),
    /// Substring match over member names, accent- and case-insensitive.
    /// Multiple matches resolve to the lowest user id.
    ByName(String),
    /// The user issuing the command ("that one is mine").
    #[default]
    Requester,
}

/// Tag an unassigned item with a debtor.
#[derive(Clone, Debug)]
pub struct AssignItemCmd {
    pub session_id: Uuid,
    pub requester_id: i32,
    pub selector: ItemSelector,
    pub target: UserSelector,
}

impl AssignItemCmd {
    #[must_use]
    pub fn new(session_id: Uuid, requester_id: i32, selector: ItemSelector) -> Self {
        Self {
            session_id,
            requester_id,
            selector,
            target: UserSelector::Requester,
        }
    }

    #[must_use]
    pub fn target(mut self, target: UserSelector) -> Self {
        self.target = target;
        self
    }
}

/// Match an incoming transfer against the payer's outstanding items.
#[derive(Clone, Debug)]
pub struct ReconcileCmd {
    pub payer_id: i32,
    pub amount: Money,
    pub tolerance: Money,
    /// When the payer owes several creditors at once, names which creditor
    /// this transfer is for. Without it a mixed pending set is rejected.
    pub creditor_id: Option<i32>,
}

impl ReconcileCmd {
    #[must_use]
    pub fn new(payer_id: i32, amount: Money) -> Self {
        Self {
            payer_id,
            amount,
            tolerance: PAYMENT_EPSILON,
            creditor_id: None,
        }
    }

    #[must_use]
    pub fn tolerance(mut self, tolerance: Money) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn creditor(mut self, creditor_id: i32) -> Self {
        self.creditor_id = Some(creditor_id);
        self
    }
}

/// Send collection messages to every session member owing the collector.
#[derive(Clone, Debug)]
pub struct CollectCmd {
    pub collector_id: i32,
}

impl CollectCmd {
    #[must_use]
    pub fn new(collector_id: i32) -> Self {
        Self { collector_id }
    }
}
