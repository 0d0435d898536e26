//! Outbound WhatsApp delivery through a Kapso-style HTTP gateway.

use engine::{NotificationSender, NotifyError};
use serde::Serialize;

#[derive(Clone, Debug)]
pub struct WhatsAppGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    phone_number_id: String,
}

#[derive(Serialize)]
struct TextBody {
    body: String,
}

#[derive(Serialize)]
struct TextMessage {
    to: String,
    #[serde(rename = "type")]
    kind: &'static str,
    text: TextBody,
}

impl WhatsAppGateway {
    pub fn new(base_url: String, api_key: String, phone_number_id: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            phone_number_id,
        }
    }

    async fn send_text(&self, phone: &str, text: &str) -> Result<(), NotifyError> {
        let url = format!(
            "{}/{}/messages",
            self.base_url.trim_end_matches('/'),
            self.phone_number_id
        );
        let body = TextMessage {
            to: phone.to_string(),
            kind: "text",
            text: TextBody {
                body: text.to_string(),
            },
        };

        let response = self
            .client
            .post(url)
            .header("X-API-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| NotifyError::Delivery(err.to_string()))?;

        response
            .error_for_status()
            .map_err(|err| NotifyError::Delivery(err.to_string()))?;
        Ok(())
    }
}

/// The sender wired into the server. `Disabled` keeps local and test setups
/// running without a gateway; it logs instead of delivering.
#[derive(Clone, Debug)]
pub enum Notifier {
    Gateway(WhatsAppGateway),
    Disabled,
}

impl NotificationSender for Notifier {
    async fn send(&self, phone: &str, text: &str) -> Result<(), NotifyError> {
        match self {
            Self::Gateway(gateway) => gateway.send_text(phone, text).await,
            Self::Disabled => {
                tracing::info!(to = phone, "notification delivery disabled; dropping message");
                Ok(())
            }
        }
    }
}
