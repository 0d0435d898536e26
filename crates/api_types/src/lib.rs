//! Request payloads shared between the server and its clients.
//!
//! Amounts travel as integer cents (2 fixed decimals); tip rates as integer
//! basis points (4 fixed decimals). Session ids are UUIDs, every other id a
//! plain integer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod user {
    use super::*;

    /// Get-or-create a user by phone number.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserEnsure {
        pub phone: String,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentMethodNew {
        pub user_id: i32,
        pub name: String,
        pub description: Option<String>,
    }
}

pub mod session {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionNew {
        pub owner_id: i32,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionJoin {
        pub user_id: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionClose {
        pub requester_id: i32,
    }
}

pub mod invoice {
    use super::*;

    /// One line of a parsed receipt as submitted for ingestion.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReceiptLineNew {
        pub description: String,
        pub unit_amount_cents: i64,
        pub count: u32,
    }

    /// A parsed receipt to write into the submitter's active session.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct InvoiceNew {
        pub submitter_id: i32,
        pub merchant: String,
        pub total_cents: i64,
        pub tip_cents: i64,
        pub items: Vec<ReceiptLineNew>,
    }
}

pub mod item {
    use super::*;

    /// Assign an unassigned item. Exactly one of `item_id` or
    /// `item_description` selects the item; the target defaults to the
    /// requester when no user field is given.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemAssign {
        pub session_id: Uuid,
        pub requester_id: i32,
        pub item_id: Option<i32>,
        pub invoice_id: Option<i32>,
        pub item_description: Option<String>,
        pub user_id: Option<i32>,
        pub user_name: Option<String>,
    }
}

pub mod payment {
    use super::*;

    /// Reconcile an incoming transfer against the payer's pending items.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentNew {
        pub payer_id: i32,
        pub amount_cents: i64,
        /// Required when the payer owes more than one creditor.
        pub creditor_id: Option<i32>,
    }
}

pub mod collect {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CollectNew {
        pub collector_id: i32,
    }
}
