//! Weekly summary text

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

use crate::model::{AssetClass, WeeklyInputs};
use crate::strategy::AllocationResult;

/// Everything that went into and came out of one weekly run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeeklySummary {
    pub date: NaiveDate,
    pub inputs: WeeklyInputs,
    pub index_strength: f64,
    pub contribution: f64,
    pub allocation: AllocationResult,
}

impl WeeklySummary {
    /// SMS body
    pub fn to_text(&self) -> String {
        let dollars = &self.allocation.dollars;
        let deltas = &self.inputs.deltas;

        let mut s = String::new();
        let _ = writeln!(s, "Weekly Allocation Summary ({}):", self.date);
        let _ = writeln!(
            s,
            "{}: ${:.2}, {}: ${:.2}, {}: ${:.2}",
            AssetClass::Bitcoin.order_symbol(),
            dollars.bitcoin,
            AssetClass::Equity.symbol(),
            dollars.equity,
            AssetClass::Cash.symbol(),
            dollars.cash,
        );
        s.push('\n');
        let _ = writeln!(
            s,
            "F&G Index: {} ({}, BTC factor {:?})",
            self.inputs.fng_value,
            self.allocation.zone_label(),
            self.allocation.btc_factor,
        );
        let _ = writeln!(
            s,
            "USD Δ: {:.2}% | M2 Δ: {:.2}% | 10Y Δ: {:.2}%",
            deltas.usd_pct_change, deltas.m2_pct_change, deltas.yield_pct_change,
        );
        let _ = write!(s, "Index Strength: {:?}", self.index_strength);
        if let Some(change) = self.inputs.bitcoin_weekly_change {
            let _ = write!(s, "\nFBTC week: {change:+.2}%");
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MacroDeltas;
    use crate::strategy::allocate;

    fn summary(bitcoin_weekly_change: Option<f64>) -> WeeklySummary {
        WeeklySummary {
            date: NaiveDate::from_ymd_opt(2024, 6, 17).unwrap(),
            inputs: WeeklyInputs {
                fng_value: 90,
                deltas: MacroDeltas::new(-0.314, 0.52, 1.0),
                bitcoin_weekly_change,
            },
            index_strength: 1.0,
            contribution: 150.0,
            allocation: allocate(90, 1.0, 150.0).unwrap(),
        }
    }

    #[test]
    fn test_summary_text() {
        let text = summary(None).to_text();
        let expected = "Weekly Allocation Summary (2024-06-17):\n\
            FBTC: $0.00, VOO: $75.00, BIL: $75.00\n\
            \n\
            F&G Index: 90 (Extreme Greed, BTC factor 0.0)\n\
            USD Δ: -0.31% | M2 Δ: 0.52% | 10Y Δ: 1.00%\n\
            Index Strength: 1.0";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_summary_includes_bitcoin_week() {
        let text = summary(Some(-2.5)).to_text();
        assert!(text.ends_with("FBTC week: -2.50%"));
    }

    #[test]
    fn test_fractional_strength_and_factor() {
        let mut week = summary(None);
        week.index_strength = 0.75;
        week.allocation = allocate(40, 0.75, 150.0).unwrap();
        let text = week.to_text();
        assert!(text.contains("(Fear, BTC factor 0.75)"));
        assert!(text.ends_with("Index Strength: 0.75"));
    }
}
