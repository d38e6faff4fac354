//! Weekly Journal
//!
//! Append-only CSV history, one row per weekly run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::error::{AllocatorError, Result};
use crate::notify::WeeklySummary;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JournalRecord {
    pub date: NaiveDate,
    pub fng_value: i64,
    pub zone: String,
    pub btc_factor: f64,
    pub usd_pct_change: f64,
    pub m2_pct_change: f64,
    pub yield_pct_change: f64,
    pub index_strength: f64,
    pub bitcoin_weekly_change: Option<f64>,
    pub contribution: f64,
    pub btc_weight: f64,
    pub voo_weight: f64,
    pub bil_weight: f64,
    pub btc_dollars: f64,
    pub voo_dollars: f64,
    pub bil_dollars: f64,
    pub orders_placed: usize,
}

impl JournalRecord {
    pub fn from_summary(summary: &WeeklySummary, orders_placed: usize) -> Self {
        let weights = &summary.allocation.weights;
        let dollars = &summary.allocation.dollars;
        let deltas = &summary.inputs.deltas;
        Self {
            date: summary.date,
            fng_value: summary.inputs.fng_value,
            zone: summary.allocation.zone_label().to_string(),
            btc_factor: summary.allocation.btc_factor,
            usd_pct_change: deltas.usd_pct_change,
            m2_pct_change: deltas.m2_pct_change,
            yield_pct_change: deltas.yield_pct_change,
            index_strength: summary.index_strength,
            bitcoin_weekly_change: summary.inputs.bitcoin_weekly_change,
            contribution: summary.contribution,
            btc_weight: weights.bitcoin,
            voo_weight: weights.equity,
            bil_weight: weights.cash,
            btc_dollars: dollars.bitcoin,
            voo_dollars: dollars.equity,
            bil_dollars: dollars.cash,
            orders_placed,
        }
    }
}

/// CSV file that only ever grows
#[derive(Clone, Debug)]
pub struct WeeklyJournal {
    path: PathBuf,
}

impl WeeklyJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row, writing the header first if the file is new or empty
    pub fn append(&self, record: &JournalRecord) -> Result<()> {
        let needs_header = std::fs::metadata(&self.path)
            .map(|m| m.len() == 0)
            .unwrap_or(true);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| AllocatorError::Journal(format!("{}: {e}", self.path.display())))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;
        Ok(())
    }

    pub fn read_all(&self) -> Result<Vec<JournalRecord>> {
        let mut reader = csv::Reader::from_path(&self.path)?;
        reader
            .deserialize()
            .map(|row| row.map_err(AllocatorError::from))
            .collect()
    }
}
