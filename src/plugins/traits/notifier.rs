use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Item, Query};
use crate::utils::error::Result;

/// A newly discovered item, as handed to every channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub item: Item,
    /// Label of the query that surfaced the item.
    pub query: String,
    pub discovered_at: DateTime<Utc>,
}

impl NotificationEvent {
    pub fn new(item: Item, query: &Query) -> Self {
        Self {
            item,
            query: query.to_string(),
            discovered_at: Utc::now(),
        }
    }

    pub fn formatted_price(&self) -> String {
        self.item.price.to_string()
    }
}

/// Per-channel outcome of one dispatch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationResult {
    pub channel: String,
    pub success: bool,
    pub error: Option<String>,
}

/// Trait for implementing notification channels (email, chat webhook, bot API)
#[async_trait]
pub trait NotifierPlugin: Send + Sync {
    /// Plugin metadata
    fn name(&self) -> &str;
    fn plugin_type(&self) -> &str;

    /// Deliver one event. Failures are reported as `AppError::Delivery`.
    async fn notify(&self, event: &NotificationEvent) -> Result<()>;
}
