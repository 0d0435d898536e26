//! Outbound notification contract.
//!
//! Message delivery is an external collaborator: the engine renders text and
//! hands it to a [`NotificationSender`]. Delivery is fire-and-forget —
//! failures are logged by the caller, never retried, and never affect ledger
//! state that already committed.

use std::future::Future;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Sends a text message to a phone number.
pub trait NotificationSender {
    fn send(
        &self,
        phone: &str,
        text: &str,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send;
}
