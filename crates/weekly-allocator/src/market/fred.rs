//! FRED Series Client
//!
//! St. Louis Fed `series/observations` for M2 and the 10-Year yield.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use super::{MacroSeries, Observation};
use crate::error::{AllocatorError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.stlouisfed.org";

const SOURCE: &str = "fred";

pub struct FredClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl FredClient {
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
struct ObservationsResponse {
    observations: Vec<RawObservation>,
}

#[derive(Debug, Deserialize)]
struct RawObservation {
    date: String,
    value: String,
}

/// Missing values come through as "." and are skipped
fn parse_observations(body: &str) -> Result<Vec<Observation>> {
    let response: ObservationsResponse = serde_json::from_str(body)?;
    let mut observations: Vec<Observation> = response
        .observations
        .iter()
        .filter_map(|raw| {
            let date = NaiveDate::parse_from_str(&raw.date, "%Y-%m-%d").ok()?;
            let value = raw.value.trim().parse::<f64>().ok()?;
            Some(Observation::new(date, value))
        })
        .collect();
    observations.sort_by_key(|o| o.date);
    Ok(observations)
}

#[async_trait]
impl MacroSeries for FredClient {
    async fn observations(&self, series_id: &str, start: NaiveDate) -> Result<Vec<Observation>> {
        let url = format!("{}/fred/series/observations", self.base_url);
        let start = start.format("%Y-%m-%d").to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("series_id", series_id),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
                ("observation_start", start.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AllocatorError::feed(
                SOURCE,
                format!("{series_id}: HTTP {status}: {body}"),
            ));
        }

        let observations = parse_observations(&body)?;
        debug!(series_id, count = observations.len(), "observations fetched");
        Ok(observations)
    }

    fn name(&self) -> &str {
        SOURCE
    }
}
