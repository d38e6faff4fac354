//! Allocation Engine
//!
//! Splits one contribution across bitcoin, equities and T-bills from the
//! Fear & Greed zone and the macro index strength.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AllocatorError, Result};
use crate::model::{AllocationDollars, AllocationWeights};
use crate::strategy::zone::{RiskZone, ZoneTable};

/// Zones with a btc factor below this keep half of the non-bitcoin share
/// in cash instead of sending all of it to equities.
pub const EQUITY_FULL_SHARE_MIN_FACTOR: f64 = 0.5;

/// Outcome of one allocation decision
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AllocationResult {
    pub weights: AllocationWeights,
    pub dollars: AllocationDollars,
    pub zone: RiskZone,
    pub btc_factor: f64,
}

impl AllocationResult {
    pub fn zone_label(&self) -> &'static str {
        self.zone.label()
    }
}

/// Pure mapping from (F&G, strength, contribution) to an allocation
#[derive(Clone, Debug, Default)]
pub struct AllocationEngine {
    zones: ZoneTable,
}

impl AllocationEngine {
    pub fn new(zones: ZoneTable) -> Self {
        Self { zones }
    }

    pub fn zones(&self) -> &ZoneTable {
        &self.zones
    }

    pub fn allocate(
        &self,
        fng_value: i64,
        index_strength: f64,
        contribution: f64,
    ) -> Result<AllocationResult> {
        validate(index_strength, contribution)?;

        let zone = self.zones.classify(fng_value)?;
        let btc_factor = zone.btc_factor();

        let btc_raw = index_strength * btc_factor;
        let equity_share = if btc_factor >= EQUITY_FULL_SHARE_MIN_FACTOR {
            1.0
        } else {
            0.5
        };
        let equity_raw = (1.0 - btc_raw) * equity_share;
        let cash_raw = 1.0 - btc_raw - equity_raw;

        let total = btc_raw + equity_raw + cash_raw;
        if !(total.is_finite() && total > 0.0) {
            return Err(AllocatorError::InvalidInput(format!(
                "raw weights sum to {total}, cannot normalize"
            )));
        }

        let weights = AllocationWeights {
            bitcoin: btc_raw / total,
            equity: equity_raw / total,
            cash: cash_raw / total,
        };
        let dollars = weights.to_dollars(contribution);

        debug!(
            fng_value,
            index_strength,
            zone = zone.label(),
            btc_factor,
            btc = weights.bitcoin,
            equity = weights.equity,
            cash = weights.cash,
            "allocation computed"
        );

        Ok(AllocationResult {
            weights,
            dollars,
            zone,
            btc_factor,
        })
    }
}

/// Allocate with the standard zone table
pub fn allocate(fng_value: i64, index_strength: f64, contribution: f64) -> Result<AllocationResult> {
    AllocationEngine::default().allocate(fng_value, index_strength, contribution)
}

fn validate(index_strength: f64, contribution: f64) -> Result<()> {
    if !index_strength.is_finite() || !(0.0..=1.0).contains(&index_strength) {
        return Err(AllocatorError::InvalidInput(format!(
            "index strength must be within [0, 1], got {index_strength}"
        )));
    }
    if !contribution.is_finite() || contribution < 0.0 {
        return Err(AllocatorError::InvalidInput(format!(
            "contribution must be a non-negative amount, got {contribution}"
        )));
    }
    Ok(())
}
