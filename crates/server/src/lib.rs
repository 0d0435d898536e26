use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{run, run_with_listener, spawn_with_listener};
pub use whatsapp::{Notifier, WhatsAppGateway};

mod collect;
mod debts;
mod dispatch;
mod documents;
mod invoices;
mod items;
mod payments;
mod server;
mod sessions;
mod users;
mod whatsapp;

pub mod types {
    pub mod user {
        pub use api_types::user::{PaymentMethodNew, UserEnsure};
        pub use engine::{PaymentMethod, User};
    }

    pub mod session {
        pub use api_types::session::{SessionClose, SessionJoin, SessionNew};
        pub use engine::{JoinOutcome, Session, SessionStatus};
    }

    pub mod invoice {
        pub use api_types::invoice::{InvoiceNew, ReceiptLineNew};
        pub use engine::{Invoice, Item};
    }

    pub mod item {
        pub use api_types::item::ItemAssign;
    }

    pub mod payment {
        pub use api_types::payment::PaymentNew;
        pub use engine::{Payment, ReconcileOutcome, Settlement};
    }

    pub mod debt {
        pub use engine::{DebtStatus, DebtSummary};
    }

    pub mod collect {
        pub use api_types::collect::CollectNew;
        pub use engine::CollectReport;
    }

    pub mod dispatch {
        pub use engine::InterpreterAction;
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Conflict(_) => StatusCode::CONFLICT,
        EngineError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::NotFound("user".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::Conflict("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        let res = ServerError::from(EngineError::Validation("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
