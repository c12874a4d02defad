use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Price {
    pub amount: Decimal,
    pub currency: String,
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

/// A single listing returned by a catalog search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: String,
    pub title: String,
    pub url: String,
    pub price: Price,
    pub image_url: String,
}

// Raw shapes as the catalog API returns them

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct RawPrice {
    amount: serde_json::Value,
    currency_code: String,
}

#[derive(Debug, Deserialize)]
struct RawPhoto {
    full_size_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    id: RawId,
    title: String,
    url: String,
    price: Option<serde_json::Value>,
    photo: Option<RawPhoto>,
}

impl Item {
    /// Normalize one entry of the API's `items` array.
    ///
    /// Fails with [`AppError::Parse`] when the entry is missing its price or
    /// photo, or when the price is not the nested `{amount, currency_code}`
    /// object. Callers drop such entries and keep the rest of the batch.
    pub fn from_api(value: &serde_json::Value) -> Result<Self> {
        let raw: RawItem = serde_json::from_value(value.clone())
            .map_err(|e| AppError::parse(format!("malformed item: {}", e)))?;

        let id = match raw.id {
            RawId::Number(n) => n.to_string(),
            RawId::Text(s) if !s.trim().is_empty() => s.trim().to_string(),
            RawId::Text(_) => return Err(AppError::parse("empty item id")),
        };
        if !is_valid_item_id(&id) {
            return Err(AppError::parse(format!("item id {:?} has unsupported characters", id)));
        }

        let price_value = raw
            .price
            .ok_or_else(|| AppError::parse(format!("item {} has no price", id)))?;
        let raw_price: RawPrice = serde_json::from_value(price_value).map_err(|e| {
            AppError::parse(format!("item {} has an unexpected price shape: {}", id, e))
        })?;
        let amount = parse_amount(&raw_price.amount).ok_or_else(|| {
            AppError::parse(format!(
                "item {} has an unparsable price amount: {}",
                id, raw_price.amount
            ))
        })?;

        let image_url = raw
            .photo
            .and_then(|p| p.full_size_url)
            .ok_or_else(|| AppError::parse(format!("item {} has no photo", id)))?;

        Ok(Item {
            id,
            title: raw.title,
            url: raw.url,
            price: Price {
                amount,
                currency: raw_price.currency_code,
            },
            image_url,
        })
    }
}

/// Ids are kept to ASCII alphanumerics, `-` and `_` so that each one fits on a
/// single line of the item history and survives a reload unchanged.
pub fn is_valid_item_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn parse_amount(value: &serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::String(s) => Decimal::from_str(s.trim()).ok(),
        serde_json::Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    }
}
