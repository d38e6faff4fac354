//! Paper Broker
//!
//! Accepts every order and keeps it in memory. Used for dry runs and tests.

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{BrokerClient, OrderAck, OrderRequest};
use crate::error::Result;

#[derive(Debug, Default)]
pub struct PaperBroker {
    orders: Mutex<Vec<OrderRequest>>,
}

impl PaperBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Orders submitted so far, in submission order
    pub async fn orders(&self) -> Vec<OrderRequest> {
        self.orders.lock().await.clone()
    }
}

#[async_trait]
impl BrokerClient for PaperBroker {
    async fn submit_order(&self, order: &OrderRequest) -> Result<OrderAck> {
        self.orders.lock().await.push(order.clone());
        Ok(OrderAck {
            order_id: order.client_order_id.to_string(),
            symbol: order.symbol.clone(),
            status: "accepted".into(),
            notional: order.notional,
        })
    }

    fn name(&self) -> &str {
        "PaperBroker"
    }
}
