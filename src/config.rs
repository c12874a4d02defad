use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::models::Query;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub marketplace: MarketplaceConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub queries: Vec<Query>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketplaceConfig {
    /// Site root, used for the session bootstrap request.
    pub base_url: String,
    #[serde(default = "default_api_path")]
    pub api_path: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    #[serde(default = "default_headers")]
    pub headers: BTreeMap<String, String>,
}

impl MarketplaceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_path: default_api_path(),
            request_timeout: default_request_timeout(),
            headers: default_headers(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn api_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.api_path.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub items_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            items_file: PathBuf::from("seen_items.txt"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub directory: PathBuf,
    pub file_prefix: String,
    pub level: String,
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
            file_prefix: "listing-watcher.log".to_string(),
            level: "info".to_string(),
            max_files: 5,
        }
    }
}

/// Each sink is enabled by the presence of its section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationsConfig {
    pub smtp: Option<SmtpConfig>,
    pub slack: Option<SlackConfig>,
    pub telegram: Option<TelegramConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
    #[serde(default = "default_from_name")]
    pub from_name: String,
    pub recipients: Vec<String>,
    #[serde(default = "default_true")]
    pub use_tls: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    pub webhook_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    #[serde(default = "default_telegram_api")]
    pub api_base: String,
}

fn default_api_path() -> String {
    "/api/v2/catalog/items".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_smtp_port() -> u16 {
    587
}

fn default_from_name() -> String {
    "Listing Watcher".to_string()
}

fn default_true() -> bool {
    true
}

fn default_telegram_api() -> String {
    "https://api.telegram.org".to_string()
}

/// Browser-like headers sent with every marketplace request unless the
/// configuration supplies its own set.
pub fn default_headers() -> BTreeMap<String, String> {
    [
        (
            "user-agent",
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:128.0) Gecko/20100101 Firefox/128.0",
        ),
        (
            "accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
        ("accept-language", "en-US,en;q=0.5"),
        ("dnt", "1"),
        ("upgrade-insecure-requests", "1"),
        ("sec-fetch-dest", "document"),
        ("sec-fetch-mode", "navigate"),
        ("sec-fetch-site", "cross-site"),
        ("pragma", "no-cache"),
        ("cache-control", "no-cache"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

impl AppConfig {
    /// Load from a TOML file, then environment variables prefixed `WATCHER`
    /// (e.g. `WATCHER__NOTIFICATIONS__SMTP__PASSWORD`).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::from(path.to_path_buf()).format(FileFormat::Toml))
            .add_source(Environment::with_prefix("WATCHER").separator("__"))
            .build()?;

        let config: AppConfig = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::from_str(contents, FileFormat::Toml))
            .build()?;

        let config: AppConfig = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if Url::parse(&self.marketplace.base_url).is_err() {
            return Err(ConfigError::Message("Invalid marketplace base_url format".into()));
        }

        if self.marketplace.request_timeout == 0 {
            return Err(ConfigError::Message("Marketplace request_timeout must be greater than 0".into()));
        }

        for (index, query) in self.queries.iter().enumerate() {
            if query.page == 0 {
                return Err(ConfigError::Message(format!("Query #{} page must be greater than 0", index + 1)));
            }
            if query.per_page == 0 {
                return Err(ConfigError::Message(format!("Query #{} per_page must be greater than 0", index + 1)));
            }
        }

        if let Some(smtp) = &self.notifications.smtp {
            if smtp.port == 0 {
                return Err(ConfigError::Message("SMTP port must be greater than 0".into()));
            }
            if smtp.recipients.is_empty() {
                return Err(ConfigError::Message("SMTP recipients must not be empty".into()));
            }
            let addresses = std::iter::once(&smtp.from_address).chain(smtp.recipients.iter());
            for address in addresses {
                if address.parse::<lettre::message::Mailbox>().is_err() {
                    return Err(ConfigError::Message(format!("Invalid SMTP mailbox: {}", address)));
                }
            }
        }

        if let Some(slack) = &self.notifications.slack {
            if Url::parse(&slack.webhook_url).is_err() {
                return Err(ConfigError::Message("Invalid Slack webhook_url format".into()));
            }
        }

        if let Some(telegram) = &self.notifications.telegram {
            if telegram.bot_token.trim().is_empty() || telegram.chat_id.trim().is_empty() {
                return Err(ConfigError::Message("Telegram bot_token and chat_id are required".into()));
            }
            if Url::parse(&telegram.api_base).is_err() {
                return Err(ConfigError::Message("Invalid Telegram api_base format".into()));
            }
        }

        Ok(())
    }
}
