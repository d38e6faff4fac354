//! # weekly-allocator
//!
//! Weekly split of a fixed contribution across a bitcoin proxy, a broad
//! equity ETF and a T-bill ETF, driven by market sentiment and the macro
//! backdrop.
//!
//! ## How a week is decided
//!
//! 1. **Index strength** - start at 0.25 and add 0.25 for each risk-on macro
//!    signal: a weaker dollar (DXY down), growing M2, rising 10Y yields.
//! 2. **Risk zone** - the Fear & Greed Index picks a band, and the band caps
//!    how much of the index strength bitcoin may take.
//! 3. **Weights** - bitcoin gets `strength * btc_factor`. The rest goes to
//!    equities, except in Extreme Greed where it is split evenly between
//!    equities and T-bills.
//!
//! ```text
//! ┌───────────────────────────┬────────────┬────────────┬───────────────────┐
//! │  F&G band                 │ btc factor │ BTC weight │ remainder         │
//! ├───────────────────────────┼────────────┼────────────┼───────────────────┤
//! │  [0, 35)   Extreme Fear   │    1.00    │  s * 1.00  │ all VOO           │
//! │  [35, 50)  Fear           │    0.75    │  s * 0.75  │ all VOO           │
//! │  [50, 80)  Neutral/Greed  │    0.50    │  s * 0.50  │ all VOO           │
//! │  [80, 101) Extreme Greed  │    0.00    │  0         │ 50% VOO / 50% BIL │
//! │  otherwise Unknown        │    0.50    │  s * 0.50  │ all VOO           │
//! └───────────────────────────┴────────────┴────────────┴───────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use weekly_allocator::strategy::{allocate, compute};
//!
//! // Dollar down, M2 up, yields up: full strength
//! let strength = compute(-0.4, 0.2, 1.1);
//! assert_eq!(strength, 1.0);
//!
//! let result = allocate(90, strength, 150.0).unwrap();
//! assert_eq!(result.zone_label(), "Extreme Greed");
//! assert!((result.dollars.equity - 75.0).abs() < 1e-9);
//! assert!((result.dollars.cash - 75.0).abs() < 1e-9);
//! ```

pub mod broker;
pub mod config;
pub mod error;
pub mod journal;
pub mod market;
pub mod model;
pub mod notify;
pub mod pipeline;
pub mod strategy;

pub use config::AllocatorConfig;
pub use error::{AllocatorError, Result};
pub use model::{
    AllocationDollars, AllocationWeights, AssetClass, MacroDeltas, MacroSignal, WeeklyInputs,
};
pub use pipeline::{WeeklyReport, WeeklyRun};
pub use strategy::{AllocationEngine, AllocationResult, IndexStrengthCalculator, RiskZone};
