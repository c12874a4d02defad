use reqwest::Client;
use std::time::Duration;

use super::notifiers::{EmailNotifier, SlackNotifier, TelegramNotifier};
use super::traits::{NotificationEvent, NotificationResult, NotifierPlugin};
use crate::config::NotificationsConfig;
use crate::utils::error::Result;

pub type NotifierPluginBox = Box<dyn NotifierPlugin>;

/// Fans a new item out to every configured channel.
///
/// Channels are attempted one after another in registration order. A failure
/// on one channel is logged and reported in its outcome; it never stops the
/// remaining channels.
#[derive(Default)]
pub struct NotificationDispatcher {
    notifiers: Vec<NotifierPluginBox>,
}

impl NotificationDispatcher {
    pub fn new() -> Self {
        Self {
            notifiers: Vec::new(),
        }
    }

    /// Build the channel list from configuration in fixed order: email, slack,
    /// telegram. Channels without a config section are skipped.
    pub fn from_config(config: &NotificationsConfig, client: Client, timeout: Duration) -> Result<Self> {
        let mut dispatcher = Self::new();

        if let Some(smtp) = &config.smtp {
            dispatcher.register_notifier(Box::new(EmailNotifier::new(smtp, timeout)?));
        }
        if let Some(slack) = &config.slack {
            dispatcher.register_notifier(Box::new(SlackNotifier::new(client.clone(), slack, timeout)));
        }
        if let Some(telegram) = &config.telegram {
            dispatcher.register_notifier(Box::new(TelegramNotifier::new(client, telegram, timeout)));
        }

        if dispatcher.is_empty() {
            tracing::warn!("No notification channels configured; new items will only be recorded");
        } else {
            tracing::info!(
                channels = ?dispatcher.list_notifier_types(),
                notifiers = ?dispatcher.list_notifier_names(),
                "Notification channels ready"
            );
        }

        Ok(dispatcher)
    }

    /// Register a notifier plugin at the end of the channel order
    pub fn register_notifier(&mut self, plugin: NotifierPluginBox) {
        tracing::debug!(channel = plugin.plugin_type(), name = plugin.name(), "Registered notifier");
        self.notifiers.push(plugin);
    }

    pub fn has_notifier(&self, plugin_type: &str) -> bool {
        self.notifiers.iter().any(|n| n.plugin_type() == plugin_type)
    }

    pub fn list_notifier_types(&self) -> Vec<String> {
        self.notifiers.iter().map(|n| n.plugin_type().to_string()).collect()
    }

    pub fn list_notifier_names(&self) -> Vec<String> {
        self.notifiers.iter().map(|n| n.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }

    /// Attempt delivery on every channel and return one outcome per channel.
    pub async fn notify(&self, event: &NotificationEvent) -> Vec<NotificationResult> {
        let mut outcomes = Vec::with_capacity(self.notifiers.len());

        for notifier in &self.notifiers {
            let channel = notifier.plugin_type().to_string();
            match notifier.notify(event).await {
                Ok(()) => outcomes.push(NotificationResult {
                    channel,
                    success: true,
                    error: None,
                }),
                Err(e) => {
                    tracing::error!(
                        channel = %channel,
                        item_id = %event.item.id,
                        error = %e,
                        "Notification delivery failed"
                    );
                    outcomes.push(NotificationResult {
                        channel,
                        success: false,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        outcomes
    }
}
