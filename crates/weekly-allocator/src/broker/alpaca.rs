//! Alpaca Trading API Client

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{BrokerClient, OrderAck, OrderRequest, OrderSide, TimeInForce};
use crate::error::{AllocatorError, Result};

pub const PAPER_BASE_URL: &str = "https://paper-api.alpaca.markets";
pub const LIVE_BASE_URL: &str = "https://api.alpaca.markets";

pub struct AlpacaClient {
    client: reqwest::Client,
    key_id: String,
    secret_key: String,
    base_url: String,
}

impl AlpacaClient {
    /// Client against the paper trading endpoint
    pub fn new(client: reqwest::Client, key_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            client,
            key_id: key_id.into(),
            secret_key: secret_key.into(),
            base_url: PAPER_BASE_URL.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Debug, Serialize)]
struct OrderBody<'a> {
    symbol: &'a str,
    notional: String,
    side: OrderSide,
    #[serde(rename = "type")]
    order_type: &'static str,
    time_in_force: TimeInForce,
    client_order_id: String,
}

impl<'a> From<&'a OrderRequest> for OrderBody<'a> {
    fn from(order: &'a OrderRequest) -> Self {
        Self {
            symbol: &order.symbol,
            notional: order.notional.to_string(),
            side: order.side,
            order_type: "market",
            time_in_force: order.time_in_force,
            client_order_id: order.client_order_id.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AlpacaOrder {
    id: String,
    symbol: String,
    status: String,
    #[serde(default)]
    notional: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct AlpacaErrorBody {
    #[serde(default)]
    code: Option<i64>,
    message: String,
}

fn parse_order(body: &str, requested: Decimal) -> Result<OrderAck> {
    let order: AlpacaOrder = serde_json::from_str(body)?;
    Ok(OrderAck {
        order_id: order.id,
        symbol: order.symbol,
        status: order.status,
        notional: order.notional.unwrap_or(requested),
    })
}

fn describe_error(body: &str) -> String {
    match serde_json::from_str::<AlpacaErrorBody>(body) {
        Ok(AlpacaErrorBody {
            code: Some(code),
            message,
        }) => format!("{message} (code {code})"),
        Ok(AlpacaErrorBody { message, .. }) => message,
        Err(_) => body.to_string(),
    }
}

#[async_trait]
impl BrokerClient for AlpacaClient {
    async fn submit_order(&self, order: &OrderRequest) -> Result<OrderAck> {
        let url = format!("{}/v2/orders", self.base_url);
        let body = OrderBody::from(order);
        debug!(symbol = %order.symbol, notional = %order.notional, "submitting order");

        let response = self
            .client
            .post(&url)
            .header("APCA-API-KEY-ID", &self.key_id)
            .header("APCA-API-SECRET-KEY", &self.secret_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(AllocatorError::Broker(format!(
                "{} rejected (HTTP {status}): {}",
                order.symbol,
                describe_error(&text)
            )));
        }

        let ack = parse_order(&text, order.notional)?;
        info!(order_id = %ack.order_id, symbol = %ack.symbol, status = %ack.status, "order accepted");
        Ok(ack)
    }

    fn name(&self) -> &str {
        "Alpaca"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AssetClass;
    use rust_decimal_macros::dec;

    #[test]
    fn test_order_body_shape() {
        let order = OrderRequest::market_buy(AssetClass::Cash, dec!(75.00));
        let json = serde_json::to_value(OrderBody::from(&order)).unwrap();
        assert_eq!(json["symbol"], "VBIL");
        assert_eq!(json["notional"], "75.00");
        assert_eq!(json["side"], "buy");
        assert_eq!(json["type"], "market");
        assert_eq!(json["time_in_force"], "day");
        assert_eq!(json["client_order_id"], order.client_order_id.to_string());
    }

    #[test]
    fn test_parse_order() {
        let body = r#"{"id": "61e69015-8549-4bfd-b9c3-01e75843f47d", "client_order_id": "x",
            "symbol": "VOO", "status": "accepted", "notional": "75", "qty": null}"#;
        let ack = parse_order(body, dec!(75.00)).unwrap();
        assert_eq!(ack.symbol, "VOO");
        assert_eq!(ack.status, "accepted");
        assert_eq!(ack.notional, dec!(75));
    }

    #[test]
    fn test_describe_error() {
        let body = r#"{"code": 40310000, "message": "insufficient buying power"}"#;
        assert_eq!(describe_error(body), "insufficient buying power (code 40310000)");
        assert_eq!(describe_error("gateway timeout"), "gateway timeout");
    }

    #[test]
    fn test_base_url_trimmed() {
        let client = AlpacaClient::new(reqwest::Client::new(), "k", "s")
            .with_base_url("https://paper-api.alpaca.markets/");
        assert_eq!(client.base_url(), PAPER_BASE_URL);
    }
}
