use axum::{
    Router,
    routing::{get, post},
};

use std::sync::Arc;

use crate::{
    collect, debts, dispatch, documents, invoices, items, payments, sessions, users, whatsapp,
};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub notifier: Arc<whatsapp::Notifier>,
    /// The bot's own WhatsApp number, used to build session invite links.
    pub bot_phone: Option<String>,
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/v1/users", post(users::ensure))
        .route("/v1/users/{user_id}/rename", post(users::rename))
        .route("/v1/users/{user_id}/paymentMethods", get(users::payment_methods))
        .route("/v1/users/by-phone/{phone}", get(users::by_phone))
        .route("/v1/paymentMethods", post(users::payment_method_new))
        .route("/v1/sessions", post(sessions::create))
        .route("/v1/sessions/active", get(sessions::active))
        .route("/v1/sessions/{session_id}/join", post(sessions::join))
        .route("/v1/sessions/{session_id}/close", post(sessions::close))
        .route("/v1/invoices", post(invoices::ingest))
        .route("/v1/invoices/{invoice_id}", get(invoices::get))
        .route("/v1/documents", post(documents::submit))
        .route("/v1/items/assign", post(items::assign))
        .route("/v1/payments", post(payments::reconcile))
        .route("/v1/debts/{user_id}", get(debts::summary))
        .route("/v1/collect", post(collect::trigger))
        .route("/v1/dispatch", post(dispatch::handle))
        .with_state(state)
}

pub async fn run(engine: Engine, notifier: whatsapp::Notifier, bot_phone: Option<String>) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, notifier, bot_phone, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    notifier: whatsapp::Notifier,
    bot_phone: Option<String>,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        notifier: Arc::new(notifier),
        bot_phone,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    notifier: whatsapp::Notifier,
    bot_phone: Option<String>,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, notifier, bot_phone, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
