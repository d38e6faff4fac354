//! Allocation Strategy
//!
//! Macro index strength, Fear & Greed zones and the allocation engine.

pub mod allocation;
pub mod index_strength;
pub mod zone;

pub use allocation::{AllocationEngine, AllocationResult, allocate};
pub use index_strength::{IndexStrengthCalculator, ScoredSignal, compute};
pub use zone::{RiskZone, ZoneBand, ZoneTable};
