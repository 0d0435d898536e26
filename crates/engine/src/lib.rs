//! Ledger and reconciliation engine for shared-expense sessions.
//!
//! Groups of users pool receipts into a [`Session`], split them into
//! per-person [`Item`]s and settle their debts by bank transfer. The engine
//! owns the session lifecycle, the invoice/item data model and the
//! payment-matching algorithm that allocates an incoming transfer across a
//! debtor's outstanding items.
//!
//! Every mutating operation runs inside one database transaction: either the
//! whole mutation (invoice plus all its items, payment plus all item and
//! invoice updates) lands, or nothing does.

pub use actions::InterpreterAction;
pub use commands::{
    AssignItemCmd, CloseSessionCmd, CollectCmd, CreateSessionCmd, IngestReceiptCmd, ItemSelector,
    JoinSessionCmd, ReconcileCmd, UserSelector,
};
pub use error::EngineError;
pub use invoices::Invoice;
pub use items::Item;
pub use money::{Money, PAYMENT_EPSILON, TipRate};
pub use notify::{NotificationSender, NotifyError};
pub use ops::{
    CollectReport, CollectionNotice, Creditor, CreditorDebt, DebtItem, DebtStatus, DebtSummary,
    Engine, EngineBuilder, InvoiceDebt, JoinOutcome, ReconcileOutcome, Settlement, UnassignedItem,
};
pub use payment_methods::PaymentMethod;
pub use payments::Payment;
pub use receipt::{ParsedDocument, ParsedReceipt, ParsedReceiptItem, ParsedTransfer};
pub use sessions::{Session, SessionStatus};
pub use users::User;

mod actions;
mod commands;
mod error;
mod invoices;
mod items;
mod money;
mod notify;
mod ops;
mod payment_methods;
mod payments;
mod receipt;
pub mod render;
mod session_members;
mod sessions;
mod users;

type ResultEngine<T> = Result<T, EngineError>;
