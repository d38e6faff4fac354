//! Configuration
//!
//! Settings come from environment variables (a `.env` file is loaded by the
//! runner before this is read).

use std::path::PathBuf;
use std::time::Duration;

use crate::broker::PAPER_BASE_URL;
use crate::error::{AllocatorError, Result};
use crate::notify::TwilioConfig;

pub const DEFAULT_CONTRIBUTION: f64 = 150.0;
pub const DEFAULT_JOURNAL_PATH: &str = "allocation_history.csv";
pub const HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct BrokerCredentials {
    pub key_id: String,
    pub secret_key: String,
    pub base_url: String,
}

#[derive(Clone, Debug)]
pub struct AllocatorConfig {
    /// CoinMarketCap API key (`CMC_KEY`)
    pub cmc_key: String,

    /// FRED API key (`FRED_KEY`)
    pub fred_key: String,

    /// Alpaca credentials; None when neither key is set
    pub broker: Option<BrokerCredentials>,

    /// Twilio settings; None when SMS is not configured
    pub twilio: Option<TwilioConfig>,

    /// Dollars invested per weekly run
    pub contribution: f64,

    pub journal_path: PathBuf,

    /// Count rising 10Y yields as risk-on
    pub yields_risk_on: bool,
}

impl AllocatorConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| AllocatorError::Config(format!("{key} not set")))
        };

        let cmc_key = require("CMC_KEY")?;
        let fred_key = require("FRED_KEY")?;

        let broker = match (get("ALPACA_KEY_ID"), get("ALPACA_SECRET_KEY")) {
            (Some(key_id), Some(secret_key)) => Some(BrokerCredentials {
                key_id,
                secret_key,
                base_url: get("ALPACA_BASE_URL").unwrap_or_else(|| PAPER_BASE_URL.into()),
            }),
            (None, None) => None,
            _ => {
                return Err(AllocatorError::Config(
                    "ALPACA_KEY_ID and ALPACA_SECRET_KEY must be set together".into(),
                ));
            }
        };

        const TWILIO_KEYS: [&str; 4] = [
            "TWILIO_ACCOUNT_SID",
            "TWILIO_AUTH_TOKEN",
            "TWILIO_PHONE_NUMBER",
            "MY_PHONE_NUMBER",
        ];
        let twilio_values: Vec<Option<String>> = TWILIO_KEYS.iter().map(|k| get(*k)).collect();
        let twilio = match twilio_values.as_slice() {
            [Some(sid), Some(token), Some(from), Some(to)] => Some(TwilioConfig {
                account_sid: sid.clone(),
                auth_token: token.clone(),
                from_number: from.clone(),
                to_number: to.clone(),
            }),
            values if values.iter().all(Option::is_none) => None,
            values => {
                let missing: Vec<&str> = TWILIO_KEYS
                    .iter()
                    .zip(values)
                    .filter(|(_, v)| v.is_none())
                    .map(|(k, _)| *k)
                    .collect();
                return Err(AllocatorError::Config(format!(
                    "incomplete Twilio settings, missing {}",
                    missing.join(", ")
                )));
            }
        };

        let contribution = match get("CONTRIBUTION") {
            Some(raw) => parse_contribution(&raw)?,
            None => DEFAULT_CONTRIBUTION,
        };

        let yields_risk_on = match get("YIELDS_RISK_ON") {
            Some(raw) => parse_flag("YIELDS_RISK_ON", &raw)?,
            None => true,
        };

        Ok(Self {
            cmc_key,
            fred_key,
            broker,
            twilio,
            contribution,
            journal_path: get("JOURNAL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_JOURNAL_PATH)),
            yields_risk_on,
        })
    }
}

/// Shared HTTP client for every API the weekly run talks to
pub fn http_client() -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("weekly-allocator/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .build()?;
    Ok(client)
}

pub fn parse_contribution(raw: &str) -> Result<f64> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(AllocatorError::Config(format!(
            "CONTRIBUTION must be a non-negative number, got {raw:?}"
        ))),
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AllocatorError::Config(format!(
            "{key} must be true or false, got {raw:?}"
        ))),
    }
}
