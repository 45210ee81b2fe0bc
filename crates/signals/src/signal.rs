use core_types::{CardId, SignalKind};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The classified signal for one card, with the indicator readings that
/// produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingSignal {
    pub card_id: CardId,
    pub signal: SignalKind,
    /// 0-100; high magnitude scores in calm markets score highest.
    pub confidence: f64,
    pub reason: String,
    /// Trend-projected price, clamped to +/-50% of the current price.
    /// Absent when there was not enough data to project.
    pub target_price: Option<Decimal>,
    /// Bullish minus bearish points.
    pub net_score: i32,
    pub indicators: Option<SignalIndicators>,
}

impl TradingSignal {
    /// The neutral result for cards without enough usable history.
    pub fn hold(card_id: CardId, reason: &str) -> Self {
        Self {
            card_id,
            signal: SignalKind::Hold,
            confidence: 0.0,
            reason: reason.to_string(),
            target_price: None,
            net_score: 0,
            indicators: None,
        }
    }
}

/// Raw indicator readings behind a signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalIndicators {
    pub current_price: f64,
    pub ma_5: f64,
    pub ma_15: f64,
    /// Least-squares price change per day.
    pub slope: f64,
    /// Slope as a fraction of the current price.
    pub slope_pct: f64,
    /// Population standard deviation of daily returns.
    pub volatility_daily: f64,
    /// Daily volatility annualized by sqrt(252), in percent.
    pub volatility_annual_pct: f64,
    pub rsi: f64,
    /// Grid days that survived reindexing and forward-fill.
    pub lookback_days_used: usize,
}
