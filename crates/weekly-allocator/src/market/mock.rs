//! Static Market Data
//!
//! In-memory sentiment, price and macro series for dry runs and tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;

use super::{MacroSeries, Observation, PriceHistory, SentimentSource};
use crate::error::{AllocatorError, Result};

const SOURCE: &str = "static";

/// Serves whatever series it was built with
#[derive(Clone, Debug, Default)]
pub struct StaticMarketData {
    fng_value: Option<i64>,
    prices: HashMap<String, Vec<Observation>>,
    series: HashMap<String, Vec<Observation>>,
}

impl StaticMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fear_greed(mut self, value: i64) -> Self {
        self.fng_value = Some(value);
        self
    }

    pub fn with_prices(mut self, symbol: impl Into<String>, closes: Vec<Observation>) -> Self {
        self.prices.insert(symbol.into().to_uppercase(), closes);
        self
    }

    pub fn with_series(mut self, series_id: impl Into<String>, values: Vec<Observation>) -> Self {
        self.series.insert(series_id.into().to_uppercase(), values);
        self
    }
}

#[async_trait]
impl SentimentSource for StaticMarketData {
    async fn fear_greed(&self) -> Result<i64> {
        self.fng_value
            .ok_or_else(|| AllocatorError::feed(SOURCE, "no Fear & Greed value loaded"))
    }

    fn name(&self) -> &str {
        SOURCE
    }
}

#[async_trait]
impl PriceHistory for StaticMarketData {
    async fn daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Observation>> {
        let closes = self
            .prices
            .get(&symbol.to_uppercase())
            .ok_or_else(|| AllocatorError::feed(SOURCE, format!("no prices for {symbol}")))?;
        Ok(closes
            .iter()
            .filter(|o| start <= o.date && o.date < end)
            .copied()
            .collect())
    }

    fn name(&self) -> &str {
        SOURCE
    }
}

#[async_trait]
impl MacroSeries for StaticMarketData {
    async fn observations(&self, series_id: &str, start: NaiveDate) -> Result<Vec<Observation>> {
        let values = self
            .series
            .get(&series_id.to_uppercase())
            .ok_or_else(|| AllocatorError::feed(SOURCE, format!("no series {series_id}")))?;
        Ok(values.iter().filter(|o| o.date >= start).copied().collect())
    }

    fn name(&self) -> &str {
        SOURCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn test_static_sources() {
        let data = StaticMarketData::new()
            .with_fear_greed(28)
            .with_prices(
                "fbtc",
                vec![
                    Observation::new(d("2024-06-10"), 60.0),
                    Observation::new(d("2024-06-14"), 61.0),
                ],
            )
            .with_series("DGS10", vec![Observation::new(d("2024-06-10"), 4.4)]);

        assert_eq!(data.fear_greed().await.unwrap(), 28);

        let closes = data
            .daily_closes("FBTC", d("2024-06-10"), d("2024-06-14"))
            .await
            .unwrap();
        assert_eq!(closes.len(), 1);

        let yields = data.observations("DGS10", d("2024-06-11")).await.unwrap();
        assert!(yields.is_empty());
    }

    #[tokio::test]
    async fn test_missing_series() {
        let data = StaticMarketData::new();
        assert!(data.fear_greed().await.is_err());
        assert!(data.observations("M2SL", d("2010-01-01")).await.is_err());
    }
}
