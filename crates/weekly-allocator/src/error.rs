//! Error Types for the Weekly Allocator

use thiserror::Error;

use crate::broker::OrderAck;

pub type Result<T> = std::result::Result<T, AllocatorError>;

#[derive(Error, Debug)]
pub enum AllocatorError {
    /// Non-numeric or out-of-domain value reaching arithmetic
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The zone table failed to classify a value. The table ends in a
    /// catch-all band, so this is an internal invariant violation.
    #[error("No risk zone matches Fear & Greed value {0}")]
    NoMatchingZone(i64),

    #[error("Data feed error ({source_name}): {message}")]
    Feed {
        source_name: String,
        message: String,
    },

    #[error("Broker error: {0}")]
    Broker(String),

    /// An order submission failed. `placed` holds the legs the broker had
    /// already accepted; rerunning the week would buy them again.
    #[error("Order placement stopped after {} of {planned} order(s): {reason}", .placed.len())]
    OrdersIncomplete {
        placed: Vec<OrderAck>,
        planned: usize,
        reason: String,
    },

    #[error("Notification error: {0}")]
    Notify(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Journal error: {0}")]
    Journal(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AllocatorError {
    pub fn feed(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Feed {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Whether the weekly run could reasonably be retried.
    ///
    /// Upstream data and network failures are transient; bad inputs and
    /// configuration are not. Broker failures never are: an order may have
    /// gone through before the error, and a rerun sends fresh order ids.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AllocatorError::Feed { .. } | AllocatorError::Network(_))
    }

    /// Orders the broker accepted before a failure, if any
    pub fn placed_orders(&self) -> &[OrderAck] {
        match self {
            AllocatorError::OrdersIncomplete { placed, .. } => placed,
            _ => &[],
        }
    }
}
