//! Yahoo Finance Chart Client
//!
//! Daily closes from the public `v8/finance/chart` endpoint.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use tracing::debug;

use super::{Observation, PriceHistory};
use crate::error::{AllocatorError, Result};

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

const SOURCE: &str = "yahoo";

pub struct YahooChartClient {
    client: reqwest::Client,
    base_url: String,
}

impl YahooChartClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

fn parse_chart(body: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<Observation>> {
    let response: ChartResponse = serde_json::from_str(body)?;
    if let Some(err) = response.chart.error {
        return Err(AllocatorError::feed(
            SOURCE,
            format!("{}: {}", err.code, err.description),
        ));
    }

    let result = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| AllocatorError::feed(SOURCE, "empty chart result"))?;
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    let mut observations: Vec<Observation> = result
        .timestamp
        .iter()
        .zip(closes)
        .filter_map(|(&ts, close)| {
            let date = DateTime::from_timestamp(ts, 0)?.date_naive();
            let value = close.filter(|v| v.is_finite())?;
            Some(Observation::new(date, value))
        })
        .filter(|o| start <= o.date && o.date < end)
        .collect();
    observations.sort_by_key(|o| o.date);
    Ok(observations)
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

#[async_trait]
impl PriceHistory for YahooChartClient {
    async fn daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Observation>> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let period1 = unix_midnight(start).to_string();
        let period2 = unix_midnight(end).to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.as_str()),
                ("period2", period2.as_str()),
                ("interval", "1d"),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AllocatorError::feed(
                SOURCE,
                format!("{symbol}: HTTP {status}: {body}"),
            ));
        }

        let closes = parse_chart(&body, start, end)?;
        debug!(symbol, count = closes.len(), %start, %end, "daily closes fetched");
        Ok(closes)
    }

    fn name(&self) -> &str {
        SOURCE
    }
}
