//! Invoice ingestion API endpoint

use api_types::invoice::InvoiceNew;
use axum::{
    Json,
    extract::{Path, State},
};
use engine::{
    IngestReceiptCmd, Invoice, Item, Money, ParsedReceipt, ParsedReceiptItem, render,
};
use serde::Serialize;

use crate::{ServerError, server::ServerState};

#[derive(Serialize)]
pub struct InvoiceDetail {
    pub invoice: Invoice,
    pub items: Vec<Item>,
}

pub async fn get(
    State(state): State<ServerState>,
    Path(invoice_id): Path<i32>,
) -> Result<Json<InvoiceDetail>, ServerError> {
    let (invoice, items) = state.engine.invoice(invoice_id).await?;
    Ok(Json(InvoiceDetail { invoice, items }))
}

#[derive(Serialize)]
pub struct InvoiceCreated {
    pub invoice: Invoice,
    pub items: Vec<Item>,
    /// Confirmation text ready to forward to the submitter.
    pub message: String,
}

pub async fn ingest(
    State(state): State<ServerState>,
    Json(payload): Json<InvoiceNew>,
) -> Result<Json<InvoiceCreated>, ServerError> {
    let receipt = ParsedReceipt {
        merchant: payload.merchant,
        total: Money::new(payload.total_cents),
        tip: Money::new(payload.tip_cents),
        items: payload
            .items
            .into_iter()
            .map(|line| ParsedReceiptItem {
                description: line.description,
                unit_amount: Money::new(line.unit_amount_cents),
                count: line.count,
            })
            .collect(),
    };

    let (invoice, items) = state
        .engine
        .ingest_receipt(IngestReceiptCmd::new(payload.submitter_id, receipt))
        .await?;
    let message = render::invoice_created_message(&invoice, &items);

    Ok(Json(InvoiceCreated {
        invoice,
        items,
        message,
    }))
}
