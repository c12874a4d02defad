use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::Client;
use std::time::Duration;

use crate::config::MarketplaceConfig;
use crate::models::{Item, Query};
use crate::session::{build_headers, Session};
use crate::utils::error::{AppError, Result};

/// Runs configured searches against the catalog API.
pub struct CatalogClient {
    client: Client,
    api_url: String,
    headers: HeaderMap,
    timeout: Duration,
}

impl CatalogClient {
    pub fn new(client: Client, config: &MarketplaceConfig) -> Result<Self> {
        Ok(Self {
            client,
            api_url: config.api_url(),
            headers: build_headers(&config.headers)?,
            timeout: config.timeout(),
        })
    }

    /// Execute one query and return its items in the order the API sent them.
    ///
    /// Transport failures are [`AppError::Network`]; a non-2xx status or a body
    /// without an `items` array is [`AppError::Parse`]. Individual malformed
    /// entries are dropped with a warning.
    pub async fn fetch(&self, query: &Query, session: &Session) -> Result<Vec<Item>> {
        let mut headers = self.headers.clone();
        if let Some(cookie) = session.cookie_header() {
            let value = HeaderValue::from_str(&cookie)
                .map_err(|e| AppError::Validation(format!("Invalid session cookie: {}", e)))?;
            headers.insert(COOKIE, value);
        }

        tracing::debug!(query = %query, url = %self.api_url, "Fetching catalog items");

        let response = self
            .client
            .get(&self.api_url)
            .query(&query.to_params())
            .headers(headers)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(AppError::parse(format!(
                "catalog API returned {}: {}",
                status,
                truncate(&body, 200)
            )));
        }

        parse_items(&body, query)
    }
}

/// Parse a catalog response body, skipping entries that fail to normalize.
pub fn parse_items(body: &str, query: &Query) -> Result<Vec<Item>> {
    let data: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| AppError::parse(format!("catalog response is not JSON: {}", e)))?;

    let entries = data
        .get("items")
        .and_then(|v| v.as_array())
        .ok_or_else(|| AppError::parse("catalog response has no items array"))?;

    let mut items = Vec::with_capacity(entries.len());
    for entry in entries {
        match Item::from_api(entry) {
            Ok(item) => items.push(item),
            Err(e) => {
                tracing::warn!(query = %query, error = %e, "Dropping malformed item");
            }
        }
    }

    tracing::debug!(query = %query, received = entries.len(), kept = items.len(), "Parsed catalog response");
    Ok(items)
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => format!("{}...", &text[..index]),
        None => text.to_string(),
    }
}
