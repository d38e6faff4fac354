//! Domain Models
//!
//! Weekly inputs and allocation outputs. Weights and dollar amounts are
//! plain `f64` fractions; order notionals are converted to `rust_decimal`
//! at the broker boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three sleeves the weekly contribution is split across
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetClass {
    Bitcoin,
    Equity,
    Cash,
}

impl AssetClass {
    pub const ALL: [AssetClass; 3] = [AssetClass::Bitcoin, AssetClass::Equity, AssetClass::Cash];

    /// Symbol used in allocation tables and the weekly journal
    pub fn symbol(self) -> &'static str {
        match self {
            AssetClass::Bitcoin => "BTC-USD",
            AssetClass::Equity => "VOO",
            AssetClass::Cash => "BIL",
        }
    }

    /// Symbol actually traded at the broker
    pub fn order_symbol(self) -> &'static str {
        match self {
            AssetClass::Bitcoin => "FBTC",
            AssetClass::Equity => "VOO",
            AssetClass::Cash => "VBIL",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Week-over-week (or month-over-month for M2) percent changes
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroDeltas {
    /// US Dollar Index, last Monday to last Friday
    pub usd_pct_change: f64,

    /// M2 money supply, last two monthly observations
    pub m2_pct_change: f64,

    /// 10-Year Treasury yield, last Monday to last Friday
    pub yield_pct_change: f64,
}

impl MacroDeltas {
    pub fn new(usd_pct_change: f64, m2_pct_change: f64, yield_pct_change: f64) -> Self {
        Self {
            usd_pct_change,
            m2_pct_change,
            yield_pct_change,
        }
    }
}

/// The three risk-on flags derived from [`MacroDeltas`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroSignal {
    pub usd_weaker: bool,
    pub m2_growing: bool,
    pub yield_rising: bool,
}

impl MacroSignal {
    pub fn from_deltas(deltas: &MacroDeltas) -> Self {
        Self {
            usd_weaker: deltas.usd_pct_change < 0.0,
            m2_growing: deltas.m2_pct_change > 0.0,
            yield_rising: deltas.yield_pct_change > 0.0,
        }
    }
}

/// Everything the engine needs for one weekly run
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeeklyInputs {
    /// Fear & Greed Index, 0-100
    pub fng_value: i64,

    pub deltas: MacroDeltas,

    /// Bitcoin proxy performance over the week, informational only
    pub bitcoin_weekly_change: Option<f64>,
}

/// Normalized fractions per asset class; they sum to 1
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationWeights {
    pub bitcoin: f64,
    pub equity: f64,
    pub cash: f64,
}

impl AllocationWeights {
    pub fn get(&self, asset: AssetClass) -> f64 {
        match asset {
            AssetClass::Bitcoin => self.bitcoin,
            AssetClass::Equity => self.equity,
            AssetClass::Cash => self.cash,
        }
    }

    pub fn total(&self) -> f64 {
        self.bitcoin + self.equity + self.cash
    }

    /// (symbol, weight) pairs in a fixed order
    pub fn iter(&self) -> impl Iterator<Item = (AssetClass, f64)> + '_ {
        AssetClass::ALL.into_iter().map(|a| (a, self.get(a)))
    }

    /// Scale every weight by `contribution`
    pub fn to_dollars(&self, contribution: f64) -> AllocationDollars {
        AllocationDollars {
            bitcoin: self.bitcoin * contribution,
            equity: self.equity * contribution,
            cash: self.cash * contribution,
        }
    }
}

/// Dollar amount per asset class for one contribution
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationDollars {
    pub bitcoin: f64,
    pub equity: f64,
    pub cash: f64,
}

impl AllocationDollars {
    pub fn get(&self, asset: AssetClass) -> f64 {
        match asset {
            AssetClass::Bitcoin => self.bitcoin,
            AssetClass::Equity => self.equity,
            AssetClass::Cash => self.cash,
        }
    }

    pub fn total(&self) -> f64 {
        self.bitcoin + self.equity + self.cash
    }

    pub fn iter(&self) -> impl Iterator<Item = (AssetClass, f64)> + '_ {
        AssetClass::ALL.into_iter().map(|a| (a, self.get(a)))
    }
}
