use crate::config::SlackConfig;
use crate::plugins::traits::{NotificationEvent, NotifierPlugin};
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::json;
use std::time::Duration;

const CHANNEL: &str = "slack";

/// Posts `{"text": ...}` payloads to an incoming-webhook URL.
pub struct SlackNotifier {
    client: Client,
    webhook_url: String,
    timeout: Duration,
}

impl SlackNotifier {
    pub fn new(client: Client, config: &SlackConfig, timeout: Duration) -> Self {
        Self {
            client,
            webhook_url: config.webhook_url.clone(),
            timeout,
        }
    }

    fn format_message(event: &NotificationEvent) -> String {
        format!(
            "*{}*\n🏷️ {}\n🔗 {}\n📷 {}",
            event.item.title,
            event.formatted_price(),
            event.item.url,
            event.item.image_url
        )
    }

    fn create_payload(event: &NotificationEvent) -> serde_json::Value {
        json!({ "text": Self::format_message(event) })
    }
}

#[async_trait]
impl NotifierPlugin for SlackNotifier {
    fn name(&self) -> &str {
        "Slack Notifier"
    }

    fn plugin_type(&self) -> &str {
        CHANNEL
    }

    async fn notify(&self, event: &NotificationEvent) -> Result<()> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&Self::create_payload(event))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AppError::delivery(CHANNEL, e.without_url().to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::delivery(
                CHANNEL,
                format!("webhook returned {}: {}", status, body),
            ));
        }

        tracing::info!(channel = CHANNEL, item_id = %event.item.id, "Slack message sent");
        Ok(())
    }
}
