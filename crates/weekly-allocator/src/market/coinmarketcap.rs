//! CoinMarketCap Fear & Greed Client

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::SentimentSource;
use crate::error::{AllocatorError, Result};

pub const DEFAULT_BASE_URL: &str = "https://pro-api.coinmarketcap.com";

const SOURCE: &str = "coinmarketcap";

pub struct CoinMarketCapClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl CoinMarketCapClient {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct FearGreedResponse {
    data: FearGreedData,
}

#[derive(Debug, Deserialize)]
struct FearGreedData {
    value: Value,
    #[serde(default)]
    value_classification: Option<String>,
}

/// Extract `data.value` from a `/v3/fear-and-greed/latest` body
fn parse_latest(body: &str) -> Result<(i64, Option<String>)> {
    let response: FearGreedResponse = serde_json::from_str(body)?;
    let value = parse_fng_value(&response.data.value)?;
    Ok((value, response.data.value_classification))
}

/// Accepts integral JSON numbers only
pub fn parse_fng_value(value: &Value) -> Result<i64> {
    if let Some(v) = value.as_i64() {
        return Ok(v);
    }
    match value.as_f64() {
        Some(v) if v.is_finite() && v.fract() == 0.0 => Ok(v as i64),
        _ => Err(AllocatorError::InvalidInput(format!(
            "Fear & Greed value is not an integer: {value}"
        ))),
    }
}

#[async_trait]
impl SentimentSource for CoinMarketCapClient {
    async fn fear_greed(&self) -> Result<i64> {
        let url = format!("{}/v3/fear-and-greed/latest", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Accepts", "application/json")
            .header("X-CMC_PRO_API_KEY", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AllocatorError::feed(SOURCE, format!("HTTP {status}: {body}")));
        }

        let (value, classification) = parse_latest(&body)?;
        debug!(value, ?classification, "fear & greed fetched");
        Ok(value)
    }

    fn name(&self) -> &str {
        SOURCE
    }
}
