//! # Portfolio Analytics
//!
//! Valuation, gain/loss, and return metrics for a set of holdings priced
//! against a market snapshot.
//!
//! ## Architectural Principles
//!
//! - **Pure queries:** Every operation is a function of
//!   `(snapshot, holdings, parameters)`. Cards with no price history simply
//!   contribute nothing; nothing here errors on thin data.
//! - **Cutoffs are data-relative:** "days ago" is measured back from the
//!   snapshot's latest observation, never from the wall clock, so results
//!   are reproducible against a fixed snapshot.

pub mod engine;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use engine::PortfolioAnalytics;
pub use report::{AverageCardValue, CardCount, GainLoss, PortfolioValue, TimeWeightedReturn};
