//! Market Data
//!
//! Sentiment, price and macro series sources plus the series arithmetic
//! that turns them into weekly deltas.

mod coinmarketcap;
mod fred;
mod mock;
pub mod series;
mod yahoo;

pub use coinmarketcap::{CoinMarketCapClient, parse_fng_value};
pub use fred::FredClient;
pub use mock::StaticMarketData;
pub use series::{Observation, WeekWindow, percent_change, value_asof};
pub use yahoo::YahooChartClient;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;

/// Ticker whose weekly move is reported alongside the allocation
pub const BITCOIN_PROXY_SYMBOL: &str = "FBTC";

/// US Dollar Index ticker
pub const DOLLAR_INDEX_SYMBOL: &str = "DX-Y.NYB";

/// FRED M2 money stock, monthly
pub const M2_SERIES_ID: &str = "M2SL";

/// FRED 10-Year Treasury constant maturity, daily
pub const TEN_YEAR_SERIES_ID: &str = "DGS10";

/// Sentiment provider (Fear & Greed Index)
#[async_trait]
pub trait SentimentSource: Send + Sync {
    /// Latest Fear & Greed value, 0-100
    async fn fear_greed(&self) -> Result<i64>;

    fn name(&self) -> &str;
}

/// Daily price history provider
#[async_trait]
pub trait PriceHistory: Send + Sync {
    /// Daily closes with `start <= date < end`, oldest first
    async fn daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Observation>>;

    fn name(&self) -> &str;
}

/// Macroeconomic series provider
#[async_trait]
pub trait MacroSeries: Send + Sync {
    /// Numeric observations on or after `start`, oldest first
    async fn observations(&self, series_id: &str, start: NaiveDate) -> Result<Vec<Observation>>;

    fn name(&self) -> &str;
}
