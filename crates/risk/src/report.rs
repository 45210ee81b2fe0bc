use core_types::RiskLevel;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Herfindahl-based diversification score, amplified by set and rarity
/// breadth and capped at 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiversityScore {
    pub score: Decimal,
    pub level: RiskLevel,
    pub description: String,
}

/// Mean per-card standard deviation of day-over-day returns, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityRating {
    pub volatility_pct: Decimal,
    pub level: RiskLevel,
    pub description: String,
}

/// Concentration of value in the largest positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketExposure {
    pub max_position_pct: Decimal,
    pub top3_pct: Decimal,
    pub level: RiskLevel,
    pub description: String,
}
