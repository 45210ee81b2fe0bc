//! # Signal Engine
//!
//! Technical-indicator computation and discrete trading-signal
//! classification for card price series.
//!
//! ## Architectural Principles
//!
//! - **Indicator classifier, not a state machine:** Every signal is computed
//!   fresh from the daily series handed in; there is no cross-query state.
//! - **Source seam:** The backtester consumes signals through the
//!   [`SignalSource`] trait, so a simulation can run against the real engine
//!   or a scripted stand-in.
//! - **Reused working buffers:** The daily grid and indicator instances live
//!   on the engine and are reset per evaluation instead of reallocated.
//!
//! ## Public API
//!
//! - `SignalEngine`: the indicator-based classifier.
//! - `SignalSource`: the evaluation trait the backtester drives.
//! - `TradingSignal` / `SignalIndicators`: the structured result.

pub mod engine;
pub mod signal;

// Re-export the key components to create a clean, public-facing API.
pub use engine::SignalEngine;
pub use signal::{SignalIndicators, TradingSignal};

use chrono::NaiveDate;
use core_types::CardId;
use rust_decimal::Decimal;

/// The seam between signal generation and its consumers.
///
/// `daily` is a date-ordered, day-collapsed price series (one observation
/// per calendar day). The `&mut self` allows implementations to reuse
/// internal buffers across evaluations.
pub trait SignalSource: Send {
    fn evaluate(&mut self, card_id: CardId, daily: &[(NaiveDate, Decimal)]) -> TradingSignal;
}
