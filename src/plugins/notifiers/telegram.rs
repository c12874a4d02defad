use crate::config::TelegramConfig;
use crate::plugins::notifiers::escape_html;
use crate::plugins::traits::{NotificationEvent, NotifierPlugin};
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::json;
use std::time::Duration;

const CHANNEL: &str = "telegram";

/// Sends messages through the Bot API `sendMessage` method using HTML markup.
pub struct TelegramNotifier {
    client: Client,
    endpoint: String,
    chat_id: String,
    timeout: Duration,
}

impl TelegramNotifier {
    pub fn new(client: Client, config: &TelegramConfig, timeout: Duration) -> Self {
        Self {
            client,
            endpoint: format!(
                "{}/bot{}/sendMessage",
                config.api_base.trim_end_matches('/'),
                config.bot_token
            ),
            chat_id: config.chat_id.clone(),
            timeout,
        }
    }

    fn format_message(event: &NotificationEvent) -> String {
        format!(
            "<b>{}</b>\n🏷️ {}\n🔗 {}\n📷 {}",
            escape_html(&event.item.title),
            escape_html(&event.formatted_price()),
            escape_html(&event.item.url),
            escape_html(&event.item.image_url)
        )
    }

    fn create_payload(&self, event: &NotificationEvent) -> serde_json::Value {
        json!({
            "chat_id": self.chat_id,
            "text": Self::format_message(event),
            "parse_mode": "HTML"
        })
    }
}

#[async_trait]
impl NotifierPlugin for TelegramNotifier {
    fn name(&self) -> &str {
        "Telegram Notifier"
    }

    fn plugin_type(&self) -> &str {
        CHANNEL
    }

    async fn notify(&self, event: &NotificationEvent) -> Result<()> {
        // The endpoint embeds the bot token, so it is never logged
        let response = self
            .client
            .post(&self.endpoint)
            .json(&self.create_payload(event))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AppError::delivery(CHANNEL, e.without_url().to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::delivery(
                CHANNEL,
                format!("bot API returned {}: {}", status, body),
            ));
        }

        tracing::info!(channel = CHANNEL, item_id = %event.item.id, "Telegram message sent");
        Ok(())
    }
}
