//! Index Strength
//!
//! Composite macro risk-on score from three binary signals.

use serde::{Deserialize, Serialize};

use crate::model::{MacroDeltas, MacroSignal};

/// Score every week starts from
pub const BASELINE_STRENGTH: f64 = 0.25;

/// Added per risk-on signal
pub const SIGNAL_STEP: f64 = 0.25;

/// Maps macro deltas to a score in {0.25, 0.50, 0.75, 1.00}
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStrengthCalculator {
    /// Rising 10Y yields count as risk-on. This is the model's long-standing
    /// heuristic; switch it off to reward falling yields instead.
    pub yields_risk_on: bool,
}

impl Default for IndexStrengthCalculator {
    fn default() -> Self {
        Self {
            yields_risk_on: true,
        }
    }
}

impl IndexStrengthCalculator {
    pub fn new(yields_risk_on: bool) -> Self {
        Self { yields_risk_on }
    }

    /// Score from raw percent changes
    pub fn compute(&self, usd_pct_change: f64, m2_pct_change: f64, yield_pct_change: f64) -> f64 {
        let signal = self.signal(&MacroDeltas::new(usd_pct_change, m2_pct_change, yield_pct_change));
        (0..signal.risk_on()).fold(BASELINE_STRENGTH, |acc, _| acc + SIGNAL_STEP)
    }

    pub fn score(&self, deltas: &MacroDeltas) -> f64 {
        self.compute(
            deltas.usd_pct_change,
            deltas.m2_pct_change,
            deltas.yield_pct_change,
        )
    }

    /// Whether this week's yield move earns its quarter
    pub fn yield_counts(&self, yield_pct_change: f64) -> bool {
        if self.yields_risk_on {
            yield_pct_change > 0.0
        } else {
            yield_pct_change < 0.0
        }
    }

    /// The flags behind a score. `yield_rising` is the raw direction;
    /// `yield_counts` says whether it scored under this heuristic.
    pub fn signal(&self, deltas: &MacroDeltas) -> ScoredSignal {
        ScoredSignal {
            raw: MacroSignal::from_deltas(deltas),
            yield_counts: self.yield_counts(deltas.yield_pct_change),
        }
    }
}

/// Macro flags plus the yield flag as the calculator scored it
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScoredSignal {
    pub raw: MacroSignal,
    pub yield_counts: bool,
}

impl ScoredSignal {
    /// Number of flags that add a step
    pub fn risk_on(&self) -> usize {
        [self.raw.usd_weaker, self.raw.m2_growing, self.yield_counts]
            .into_iter()
            .filter(|&on| on)
            .count()
    }
}

/// Score with the default heuristic (rising yields are risk-on)
pub fn compute(usd_pct_change: f64, m2_pct_change: f64, yield_pct_change: f64) -> f64 {
    IndexStrengthCalculator::default().compute(usd_pct_change, m2_pct_change, yield_pct_change)
}
