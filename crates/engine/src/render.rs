//! Deterministic message rendering.
//!
//! Pure functions from domain values to the Spanish texts the bot sends.
//! Delivery is someone else's job; these only build strings, so the same
//! ledger state always renders the same message.

use uuid::Uuid;

use crate::{CollectionNotice, DebtStatus, Invoice, Item};

const NO_DESCRIPTION: &str = "Sin descripción";

fn description_or_default(description: Option<&str>) -> &str {
    match description {
        Some(d) if !d.is_empty() => d,
        _ => NO_DESCRIPTION,
    }
}

/// Confirmation sent to the submitter after a receipt lands in the ledger.
pub fn invoice_created_message(invoice: &Invoice, items: &[Item]) -> String {
    let mut parts = vec![
        "Boleta ingresada correctamente.".to_string(),
        String::new(),
        format!(
            "{}, Total: {}",
            description_or_default(invoice.description.as_deref()),
            invoice.total
        ),
        "Detalle:".to_string(),
    ];
    for item in items {
        let tip_part = if item.tip_rate.is_zero() {
            String::new()
        } else {
            format!(" tip: {},", item.tip_rate)
        };
        parts.push(format!(
            "• {}, {},{} total: {}",
            description_or_default(item.description.as_deref()),
            item.unit_price,
            tip_part,
            item.total
        ));
    }
    parts.join("\n")
}

/// Invite link a session owner forwards so others can join.
pub fn session_invite_link(session_id: Uuid, bot_phone: &str) -> String {
    format!("Unete a mi sesión de cobro: https://wa.me/{bot_phone}?text={session_id}")
}

/// A user's debt overview, grouped by creditor.
pub fn debt_status_message(status: &DebtStatus) -> String {
    let summary = match status {
        DebtStatus::NoActiveSession => return "❌ No tienes una sesión activa".to_string(),
        DebtStatus::Summary(summary) => summary,
    };

    let mut lines = Vec::new();
    match summary.session_description.as_deref() {
        Some(description) => lines.push(format!("📊 Estado de deudas - {description}\n")),
        None => lines.push("📊 Estado de deudas\n".to_string()),
    }

    if summary.by_creditor.is_empty() {
        lines.push("✅ No tienes deudas pendientes".to_string());
    } else {
        lines.push("💰 A quién le debo:".to_string());
        for debt in &summary.by_creditor {
            lines.push(format!("\n👤 {}:", debt.creditor.name));
            for item in &debt.items {
                lines.push(format!(
                    "  • {}: ${}",
                    description_or_default(item.description.as_deref()),
                    item.amount
                ));
            }
            lines.push(format!("  Subtotal: ${}", debt.subtotal));
        }
        lines.push(format!("\n💵 Total que debo: ${}", summary.total));
    }

    if !summary.unassigned.is_empty() {
        lines.push("\n\n❓ Items sin asignar:".to_string());
        for item in &summary.unassigned {
            lines.push(format!(
                "  • {}: ${} (pagado por {})",
                description_or_default(item.description.as_deref()),
                item.amount,
                item.paid_by
            ));
        }
        lines.push("\n💡 Estos items aún no tienen deudor asignado".to_string());
    }

    lines.join("\n")
}

/// The message one debtor receives when the collector triggers a round.
pub fn collection_message(notice: &CollectionNotice) -> String {
    let mut parts = Vec::new();

    for invoice in &notice.invoices {
        parts.push(format!(
            "Le debes a {} {}:",
            notice.collector_name, invoice.subtotal
        ));
        for item in &invoice.items {
            parts.push(format!(
                "  • {}: {}",
                description_or_default(item.description.as_deref()),
                item.amount
            ));
        }
        parts.push(String::new());
    }

    if !notice.payment_methods.is_empty() {
        parts.push("Puedes pagar a:".to_string());
        for method in &notice.payment_methods {
            match method.description.as_deref() {
                Some(description) if !description.is_empty() => {
                    parts.push(format!("• {}:", method.name));
                    for line in description.lines() {
                        parts.push(format!("  {line}"));
                    }
                }
                _ => parts.push(format!("• {}", method.name)),
            }
        }
    }

    parts.join("\n").trim_end().to_string()
}
