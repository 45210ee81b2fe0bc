//! # Market Analytics Engine
//!
//! Market-wide valuation and movement statistics over a price snapshot.
//!
//! ## Architectural Principles
//!
//! - **Pure queries:** Every operation is a function of the snapshot and its
//!   parameters. Missing or thin data produces explicit neutral results, not
//!   errors.
//! - **Version-keyed memoization:** The total-market-value sum is the one
//!   cached derived value. The cache is keyed by the snapshot version, so a
//!   refreshed snapshot can never serve a stale total.
//!
//! ## Public API
//!
//! - `MarketAnalytics`: the calculator.
//! - `MarketValue`, `MarketChange`, `SetPerformance`, `TopMover`,
//!   `ListingActivity`: the structured results.

pub mod engine;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use engine::MarketAnalytics;
pub use report::{ListingActivity, MarketChange, MarketValue, SetPerformance, TopMover};
