//! # Portfolio Risk Scoring
//!
//! Concentration, volatility, and diversity scores for a set of holdings.
//!
//! ## Architectural Principles
//!
//! - **Pure queries:** Each score is a function of
//!   `(snapshot, holdings)`. Thin or missing data produces an explicit
//!   low-information result with a human-readable description, never an
//!   error.
//! - **Bucketed output:** Every score is reported both as a number and as a
//!   `RiskLevel` bucket so consumers can switch on it exhaustively.

pub mod analyzer;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use analyzer::RiskAnalyzer;
pub use report::{DiversityScore, MarketExposure, VolatilityRating};
