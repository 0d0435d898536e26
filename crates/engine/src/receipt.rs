//! Boundary types produced by the receipt/transfer extractor.
//!
//! The extractor (OCR over a photographed document) is an external
//! collaborator; the engine only consumes its already-parsed output. A
//! document is either a receipt to ingest or a transfer to reconcile.

use serde::{Deserialize, Serialize};

use crate::Money;

/// One line of a parsed receipt. `count` expands into that many item rows at
/// ingestion so each unit can be assigned to a different debtor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedReceiptItem {
    pub description: String,
    pub unit_amount: Money,
    pub count: u32,
}

/// A parsed receipt. `total` is the amount printed on the receipt and is
/// expected to be positive; `tip` may be zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedReceipt {
    pub merchant: String,
    pub total: Money,
    pub tip: Money,
    pub items: Vec<ParsedReceiptItem>,
}

/// A parsed bank-transfer voucher.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTransfer {
    pub recipient: String,
    pub amount: Money,
    pub description: Option<String>,
}

/// Tagged union over the two document kinds the extractor recognizes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "document_type", rename_all = "snake_case")]
pub enum ParsedDocument {
    Receipt(ParsedReceipt),
    Transfer(ParsedTransfer),
}
