use serde::{Deserialize, Serialize};
use std::fmt;

/// Result ordering requested from the catalog search endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Relevance,
    #[default]
    NewestFirst,
    PriceHighToLow,
    PriceLowToHigh,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Relevance => "relevance",
            SortOrder::NewestFirst => "newest_first",
            SortOrder::PriceHighToLow => "price_high_to_low",
            SortOrder::PriceLowToHigh => "price_low_to_high",
        }
    }
}

/// One configured catalog search. Supplied by configuration and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Query {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[serde(default)]
    pub search_text: String,
    #[serde(default)]
    pub catalog_ids: Vec<u64>,
    #[serde(default)]
    pub brand_ids: Vec<u64>,
    #[serde(default)]
    pub order: SortOrder,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    96
}

impl Default for Query {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
            search_text: String::new(),
            catalog_ids: Vec::new(),
            brand_ids: Vec::new(),
            order: SortOrder::default(),
        }
    }
}

impl Query {
    /// Query-string pairs in the shape the catalog API expects.
    /// Empty filters are sent as empty strings rather than omitted.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("page", self.page.to_string()),
            ("per_page", self.per_page.to_string()),
            ("search_text", self.search_text.clone()),
            ("catalog_ids", join_ids(&self.catalog_ids)),
            ("brand_ids", join_ids(&self.brand_ids)),
            ("order", self.order.as_str().to_string()),
        ]
    }
}

fn join_ids(ids: &[u64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

// Short label for log lines
impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.search_text.is_empty() {
            parts.push(format!("\"{}\"", self.search_text));
        }
        if !self.catalog_ids.is_empty() {
            parts.push(format!("catalog={}", join_ids(&self.catalog_ids)));
        }
        if !self.brand_ids.is_empty() {
            parts.push(format!("brand={}", join_ids(&self.brand_ids)));
        }
        if parts.is_empty() {
            parts.push("<all>".to_string());
        }
        write!(f, "{} [{}]", parts.join(" "), self.order.as_str())
    }
}
