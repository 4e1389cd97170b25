use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::Notifier;
use crate::errors::CycleError;

/// Delivers messages to one chat through the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramNotifier {
    client: reqwest::Client,
    api_url: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(
        api_url: impl Into<String>,
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .user_agent(concat!("homework-watch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
        })
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_url, self.bot_token)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, message: &str) -> Result<(), CycleError> {
        let payload = SendMessage {
            chat_id: &self.chat_id,
            text: message,
        };

        // reqwest errors embed the URL, which carries the bot token.
        let resp = self
            .client
            .post(self.send_message_url())
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                CycleError::DeliveryFailure(format!("telegram request failed: {}", e.without_url()))
            })?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        let reply: Option<TelegramReply> = serde_json::from_str(&body).ok();

        match reply {
            Some(TelegramReply { ok: true, .. }) if status.is_success() => {
                tracing::info!(chat_id = %self.chat_id, "sent telegram message");
                Ok(())
            }
            Some(TelegramReply { description, .. }) => Err(CycleError::DeliveryFailure(format!(
                "telegram returned {}: {}",
                status,
                description.unwrap_or_default()
            ))),
            None => Err(CycleError::DeliveryFailure(format!(
                "telegram returned {} with unreadable body",
                status
            ))),
        }
    }
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct TelegramReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}
