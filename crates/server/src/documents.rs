//! Extracted-document submission.
//!
//! A photographed document goes through the external extractor first; what
//! arrives here is its parsed output. Receipts are written into the ledger,
//! transfer vouchers are reconciled against the submitter's pending items.

use axum::{Json, extract::State};
use engine::{
    IngestReceiptCmd, Invoice, Item, ParsedDocument, ReconcileCmd, ReconcileOutcome, render,
};
use serde::{Deserialize, Serialize};

use crate::{ServerError, server::ServerState};

#[derive(Debug, Deserialize)]
pub struct DocumentSubmit {
    pub submitter_id: i32,
    /// Required for transfers when the submitter owes several creditors.
    pub creditor_id: Option<i32>,
    pub document: ParsedDocument,
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentOutcome {
    Ingested {
        invoice: Invoice,
        items: Vec<Item>,
        message: String,
    },
    Reconciled {
        outcome: ReconcileOutcome,
    },
}

pub async fn submit(
    State(state): State<ServerState>,
    Json(payload): Json<DocumentSubmit>,
) -> Result<Json<DocumentOutcome>, ServerError> {
    let outcome = match payload.document {
        ParsedDocument::Receipt(receipt) => {
            let (invoice, items) = state
                .engine
                .ingest_receipt(IngestReceiptCmd::new(payload.submitter_id, receipt))
                .await?;
            let message = render::invoice_created_message(&invoice, &items);
            DocumentOutcome::Ingested {
                invoice,
                items,
                message,
            }
        }
        ParsedDocument::Transfer(transfer) => {
            let mut cmd = ReconcileCmd::new(payload.submitter_id, transfer.amount);
            if let Some(creditor_id) = payload.creditor_id {
                cmd = cmd.creditor(creditor_id);
            }
            let outcome = state.engine.reconcile_transfer(cmd).await?;
            DocumentOutcome::Reconciled { outcome }
        }
    };

    Ok(Json(outcome))
}
