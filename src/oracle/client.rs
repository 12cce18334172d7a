//! HTTP client for the remote price API.

use rocket::serde::json::Value;

use super::{AssetPair, PriceSnapshot};

#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("oracle API key not configured")]
    MissingApiKey,

    #[error("oracle request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("oracle API error: {0}")]
    Status(u16),

    #[error("malformed oracle payload: {0}")]
    Malformed(String),
}

/// Client for `GET {base_url}/latest?pair=...` with bearer authentication.
#[derive(Debug, Clone)]
pub struct OracleClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl OracleClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        OracleClient {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Fetch the raw JSON payload for `pair`, passed through unchanged.
    pub async fn fetch_latest(&self, pair: &str) -> Result<Value, OracleError> {
        let api_key = self.api_key.as_deref().ok_or(OracleError::MissingApiKey)?;
        let url = format!("{}/latest", self.base_url);

        log::debug!("Fetching oracle price for {} from {}", pair, url);

        let response = self
            .http
            .get(&url)
            .query(&[("pair", pair)])
            .bearer_auth(api_key)
            .header("Content-Type", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OracleError::Status(status.as_u16()));
        }
        Ok(response.json::<Value>().await?)
    }

    pub async fn fetch_snapshot(&self, pair: AssetPair) -> Result<PriceSnapshot, OracleError> {
        let payload = self.fetch_latest(pair.symbol()).await?;
        parse_snapshot(&payload)
    }
}

/// Read a number that the API may send either as JSON number or numeric string.
fn numeric_field(payload: &Value, field: &str) -> Result<f64, OracleError> {
    let value = payload
        .get(field)
        .ok_or_else(|| OracleError::Malformed(format!("missing field {}", field)))?;
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| OracleError::Malformed(format!("field {} is not a number", field)))
}

/// Build a snapshot from a `{ "price": .., "change_24h": .. }` payload.
pub fn parse_snapshot(payload: &Value) -> Result<PriceSnapshot, OracleError> {
    let price = numeric_field(payload, "price")?;
    if price <= 0.0 {
        return Err(OracleError::Malformed(format!(
            "price must be positive, got {}",
            price
        )));
    }
    let change = numeric_field(payload, "change_24h")?;
    Ok(PriceSnapshot::from_change(price, change))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocket::serde::json::json;

    #[test]
    fn parses_numbers_and_strings() {
        let a = parse_snapshot(&json!({ "price": 3000.5, "change_24h": -1.5 })).expect("numbers");
        assert_eq!(a.price, 3000.5);
        assert_eq!(a.fractional_delta, -0.015);

        let b = parse_snapshot(&json!({ "price": "96000.1", "change_24h": "0.4" }))
            .expect("strings");
        assert_eq!(b.percent_change, 0.4);
    }

    #[test]
    fn rejects_bad_payloads() {
        assert!(matches!(
            parse_snapshot(&json!({ "change_24h": 1.0 })),
            Err(OracleError::Malformed(_))
        ));
        assert!(matches!(
            parse_snapshot(&json!({ "price": "abc", "change_24h": 1.0 })),
            Err(OracleError::Malformed(_))
        ));
        assert!(matches!(
            parse_snapshot(&json!({ "price": 0, "change_24h": 1.0 })),
            Err(OracleError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn missing_key_short_circuits() {
        let client = OracleClient::new("http://127.0.0.1:9", None);
        assert!(!client.has_api_key());
        assert!(matches!(
            client.fetch_latest("ETH/USD").await,
            Err(OracleError::MissingApiKey)
        ));
    }
}
