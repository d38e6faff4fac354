//! Risk Zones
//!
//! Fear & Greed bands, each carrying the share of index strength bitcoin
//! may take.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AllocatorError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskZone {
    ExtremeFear,
    Fear,
    NeutralGreed,
    ExtremeGreed,
    /// Value outside 0-100
    Unknown,
}

impl RiskZone {
    pub fn btc_factor(self) -> f64 {
        match self {
            RiskZone::ExtremeFear => 1.0,
            RiskZone::Fear => 0.75,
            RiskZone::NeutralGreed => 0.5,
            RiskZone::ExtremeGreed => 0.0,
            RiskZone::Unknown => 0.5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskZone::ExtremeFear => "Extreme Fear",
            RiskZone::Fear => "Fear",
            RiskZone::NeutralGreed => "Neutral/Greed",
            RiskZone::ExtremeGreed => "Extreme Greed",
            RiskZone::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for RiskZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Half-open band `[lower, upper)` over the Fear & Greed value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZoneBand {
    pub lower: i64,
    pub upper: i64,
    pub zone: RiskZone,
}

impl ZoneBand {
    pub const fn new(lower: i64, upper: i64, zone: RiskZone) -> Self {
        Self { lower, upper, zone }
    }

    pub fn contains(&self, value: i64) -> bool {
        self.lower <= value && value < self.upper
    }
}

/// Bands checked in order, first match wins
pub const STANDARD_BANDS: [ZoneBand; 4] = [
    ZoneBand::new(0, 35, RiskZone::ExtremeFear),
    ZoneBand::new(35, 50, RiskZone::Fear),
    ZoneBand::new(50, 80, RiskZone::NeutralGreed),
    ZoneBand::new(80, 101, RiskZone::ExtremeGreed),
];

/// Ordered band list plus the zone used when nothing matches
#[derive(Clone, Debug, PartialEq)]
pub struct ZoneTable {
    bands: Vec<ZoneBand>,
    fallback: Option<RiskZone>,
}

impl Default for ZoneTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl ZoneTable {
    pub fn standard() -> Self {
        Self {
            bands: STANDARD_BANDS.to_vec(),
            fallback: Some(RiskZone::Unknown),
        }
    }

    /// A table without a catch-all; unmatched values are an error
    pub fn strict(bands: Vec<ZoneBand>) -> Self {
        Self {
            bands,
            fallback: None,
        }
    }

    pub fn bands(&self) -> &[ZoneBand] {
        &self.bands
    }

    pub fn classify(&self, fng_value: i64) -> Result<RiskZone> {
        self.bands
            .iter()
            .find(|band| band.contains(fng_value))
            .map(|band| band.zone)
            .or(self.fallback)
            .ok_or(AllocatorError::NoMatchingZone(fng_value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_edges_go_up() {
        let table = ZoneTable::standard();
        assert_eq!(table.classify(34).unwrap(), RiskZone::ExtremeFear);
        assert_eq!(table.classify(35).unwrap(), RiskZone::Fear);
        assert_eq!(table.classify(49).unwrap(), RiskZone::Fear);
        assert_eq!(table.classify(50).unwrap(), RiskZone::NeutralGreed);
        assert_eq!(table.classify(79).unwrap(), RiskZone::NeutralGreed);
        assert_eq!(table.classify(80).unwrap(), RiskZone::ExtremeGreed);
        assert_eq!(table.classify(100).unwrap(), RiskZone::ExtremeGreed);
    }

    #[test]
    fn test_out_of_range_falls_back() {
        let table = ZoneTable::standard();
        assert_eq!(table.classify(-1).unwrap(), RiskZone::Unknown);
        assert_eq!(table.classify(101).unwrap(), RiskZone::Unknown);
        assert_eq!(RiskZone::Unknown.btc_factor(), 0.5);
    }

    #[test]
    fn test_bands_partition_expected_range() {
        for value in 0..=100 {
            let hits = STANDARD_BANDS.iter().filter(|b| b.contains(value)).count();
            assert_eq!(hits, 1, "value {value} matched {hits} bands");
        }
    }

    #[test]
    fn test_strict_table_reports_gap() {
        let table = ZoneTable::strict(STANDARD_BANDS[..2].to_vec());
        assert_eq!(table.classify(10).unwrap(), RiskZone::ExtremeFear);
        assert!(matches!(
            table.classify(60),
            Err(AllocatorError::NoMatchingZone(60))
        ));
    }

    #[test]
    fn test_labels() {
        assert_eq!(RiskZone::NeutralGreed.to_string(), "Neutral/Greed");
        assert_eq!(RiskZone::ExtremeGreed.btc_factor(), 0.0);
    }
}
