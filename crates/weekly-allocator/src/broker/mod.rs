//! Brokerage Integration
//!
//! Notional market buys for each asset class with a positive dollar amount.

mod alpaca;
mod paper;

pub use alpaca::{AlpacaClient, LIVE_BASE_URL, PAPER_BASE_URL};
pub use paper::PaperBroker;

use async_trait::async_trait;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::model::{AllocationDollars, AssetClass};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeInForce {
    Day,
}

/// A notional market order
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub asset: AssetClass,

    /// Broker ticker (`FBTC`, `VOO`, `VBIL`)
    pub symbol: String,

    /// Dollar amount in whole cents
    pub notional: Decimal,

    pub side: OrderSide,

    pub time_in_force: TimeInForce,

    /// Idempotency key sent with the order
    pub client_order_id: Uuid,
}

impl OrderRequest {
    pub fn market_buy(asset: AssetClass, notional: Decimal) -> Self {
        Self {
            asset,
            symbol: asset.order_symbol().to_string(),
            notional,
            side: OrderSide::Buy,
            time_in_force: TimeInForce::Day,
            client_order_id: Uuid::new_v4(),
        }
    }
}

/// Broker acknowledgement of a submitted order
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderAck {
    pub order_id: String,
    pub symbol: String,
    pub status: String,
    pub notional: Decimal,
}

/// Brokerage client trait
///
/// Implement this for each broker; [`PaperBroker`] records orders locally.
#[async_trait]
pub trait BrokerClient: Send + Sync {
    async fn submit_order(&self, order: &OrderRequest) -> Result<OrderAck>;

    fn name(&self) -> &str;
}

/// Dollar amount cut down to whole cents
///
/// Float noise is rounded away first so `74.99999999999999` stays `75.00`;
/// truncating after that keeps the legs from summing above the contribution.
pub fn to_notional(amount: f64) -> Decimal {
    Decimal::from_f64_retain(amount)
        .unwrap_or(Decimal::ZERO)
        .round_dp(6)
        .round_dp_with_strategy(2, RoundingStrategy::ToZero)
}

/// One market buy per asset class whose rounded amount is positive
pub fn plan_orders(dollars: &AllocationDollars) -> Vec<OrderRequest> {
    dollars
        .iter()
        .map(|(asset, amount)| (asset, to_notional(amount)))
        .filter(|(_, notional)| *notional > Decimal::ZERO)
        .map(|(asset, notional)| OrderRequest::market_buy(asset, notional))
        .collect()
}
