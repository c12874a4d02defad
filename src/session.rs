use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::MarketplaceConfig;
use crate::utils::error::{AppError, Result};

/// Cookie context obtained from the marketplace root, valid for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    cookies: BTreeMap<String, String>,
}

impl Session {
    pub fn from_cookies<I, K, V>(cookies: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            cookies: cookies
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Value for a `Cookie` request header, or `None` when no cookies were set.
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

/// Convert configured header pairs into a `HeaderMap`.
pub fn build_headers(headers: &BTreeMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| AppError::Validation(format!("Invalid header name '{}': {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| AppError::Validation(format!("Invalid value for header '{}': {}", name, e)))?;
        map.insert(name, value);
    }
    Ok(map)
}

pub fn build_client() -> Result<Client> {
    Client::builder()
        .build()
        .map_err(|e| AppError::Network(format!("Failed to build HTTP client: {}", e)))
}

pub struct SessionProvider {
    client: Client,
    base_url: String,
    headers: HeaderMap,
    timeout: Duration,
}

impl SessionProvider {
    pub fn new(client: Client, config: &MarketplaceConfig) -> Result<Self> {
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            headers: build_headers(&config.headers)?,
            timeout: config.timeout(),
        })
    }

    /// Single bootstrap request against the site root. No retry.
    ///
    /// A non-2xx status still yields whatever cookies were set; only transport
    /// failures (connect, timeout) are errors.
    pub async fn acquire(&self) -> Result<Session> {
        tracing::debug!(url = %self.base_url, "Requesting session cookies");

        let response = self
            .client
            .post(&self.base_url)
            .headers(self.headers.clone())
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %self.base_url, %status, "Session bootstrap returned non-success status");
        }

        let session = Session::from_cookies(
            response
                .cookies()
                .map(|c| (c.name().to_string(), c.value().to_string())),
        );
        tracing::info!(cookies = session.len(), "Session acquired");

        Ok(session)
    }
}
