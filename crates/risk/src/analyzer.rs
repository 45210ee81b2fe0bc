use crate::report::{DiversityScore, MarketExposure, VolatilityRating};
use core_types::{CardId, PortfolioHolding, RiskLevel};
use datastore::MarketSnapshot;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use std::collections::{HashMap, HashSet};

/// A stateless calculator for the three portfolio risk scores.
#[derive(Debug, Default)]
pub struct RiskAnalyzer {}

impl RiskAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diversification across sets and rarities.
    ///
    /// The base score is `(1 - H) * 100` where H is the Herfindahl index of
    /// per-set quantity shares, amplified by `(1 + sets/10) * (1 +
    /// rarities/5)` and capped at 100. Holdings without metadata count
    /// toward total quantity but not toward any set.
    pub fn diversity_score(
        &self,
        snapshot: &MarketSnapshot,
        holdings: &[PortfolioHolding],
    ) -> DiversityScore {
        let total_quantity: u64 = holdings.iter().map(|h| u64::from(h.quantity)).sum();
        if total_quantity == 0 {
            return DiversityScore {
                score: Decimal::ZERO,
                level: RiskLevel::Low,
                description: "No data to calculate diversity.".to_string(),
            };
        }

        let mut quantity_by_set: HashMap<&str, u64> = HashMap::new();
        let mut sets: HashSet<&str> = HashSet::new();
        let mut rarities: HashSet<&str> = HashSet::new();
        for holding in holdings {
            if let Some(meta) = snapshot.metadata(holding.card_id) {
                *quantity_by_set.entry(meta.set_id.as_str()).or_insert(0) +=
                    u64::from(holding.quantity);
                sets.insert(meta.set_id.as_str());
                rarities.insert(meta.rarity.as_str());
            }
        }

        let total = Decimal::from(total_quantity);
        let herfindahl: Decimal = quantity_by_set
            .values()
            .map(|&q| {
                let share = Decimal::from(q) / total;
                share * share
            })
            .sum();

        let mut score = (dec!(1) - herfindahl) * dec!(100);
        score *= dec!(1) + Decimal::from(sets.len()) / dec!(10);
        score *= dec!(1) + Decimal::from(rarities.len()) / dec!(5);
        let score = score.min(dec!(100));

        let (level, description) = if score >= dec!(70) {
            (
                RiskLevel::High,
                "Your portfolio is well-diversified across multiple sets and rarities.",
            )
        } else if score >= dec!(40) {
            (
                RiskLevel::Medium,
                "Moderate diversification. Consider adding cards from more sets.",
            )
        } else {
            (
                RiskLevel::Low,
                "Low diversification. Your portfolio is concentrated in few sets.",
            )
        };

        DiversityScore {
            score,
            level,
            description: description.to_string(),
        }
    }

    /// Mean per-card sample standard deviation of day-over-day percent
    /// returns, in percent. Cards without at least two returns are excluded.
    pub fn volatility_rating(
        &self,
        snapshot: &MarketSnapshot,
        holdings: &[PortfolioHolding],
    ) -> VolatilityRating {
        let unique_cards: HashSet<CardId> = holdings.iter().map(|h| h.card_id).collect();

        let mut volatilities: Vec<Decimal> = Vec::new();
        for card_id in unique_cards {
            let daily = snapshot.daily_prices(card_id);
            let mut returns: Vec<Decimal> = Vec::new();
            for pair in daily.windows(2) {
                if pair[0].1 > Decimal::ZERO {
                    returns.push(pair[1].1 / pair[0].1 - dec!(1));
                }
            }
            // A sample standard deviation needs at least two returns.
            if returns.len() < 2 {
                continue;
            }
            let n = Decimal::from(returns.len());
            let mean = returns.iter().sum::<Decimal>() / n;
            let variance = returns
                .iter()
                .map(|r| (*r - mean) * (*r - mean))
                .sum::<Decimal>()
                / (n - dec!(1));
            if let Some(std_dev) = variance.sqrt() {
                volatilities.push(std_dev);
            }
        }

        if volatilities.is_empty() {
            return VolatilityRating {
                volatility_pct: Decimal::ZERO,
                level: RiskLevel::Low,
                description: "Insufficient data to calculate volatility.".to_string(),
            };
        }

        let volatility_pct =
            volatilities.iter().sum::<Decimal>() / Decimal::from(volatilities.len()) * dec!(100);

        let (level, description) = if volatility_pct < dec!(5) {
            (
                RiskLevel::Low,
                "Stable portfolio with minimal price fluctuations.",
            )
        } else if volatility_pct < dec!(15) {
            (
                RiskLevel::Medium,
                "Moderate price fluctuations expected based on card types.",
            )
        } else {
            (
                RiskLevel::High,
                "High volatility. Expect significant price swings.",
            )
        };

        VolatilityRating {
            volatility_pct,
            level,
            description: description.to_string(),
        }
    }

    /// Concentration of current value in the largest positions (per card,
    /// lots merged).
    pub fn market_exposure(
        &self,
        snapshot: &MarketSnapshot,
        holdings: &[PortfolioHolding],
    ) -> MarketExposure {
        let mut value_by_card: HashMap<CardId, Decimal> = HashMap::new();
        for holding in holdings {
            if let Some(listing) = snapshot.latest_listing(holding.card_id) {
                *value_by_card.entry(holding.card_id).or_insert(Decimal::ZERO) +=
                    listing.price * Decimal::from(holding.quantity);
            }
        }

        let total: Decimal = value_by_card.values().sum();
        if total <= Decimal::ZERO {
            return MarketExposure {
                max_position_pct: Decimal::ZERO,
                top3_pct: Decimal::ZERO,
                level: RiskLevel::Low,
                description: "No market exposure.".to_string(),
            };
        }

        let mut values: Vec<Decimal> = value_by_card.into_values().collect();
        values.sort_by(|a, b| b.cmp(a));
        let max_position_pct = values[0] / total * dec!(100);
        let top3_pct = values.iter().take(3).sum::<Decimal>() / total * dec!(100);

        let (level, description) = if max_position_pct > dec!(30) || top3_pct > dec!(60) {
            (
                RiskLevel::High,
                "High concentration in few cards. Consider diversifying.",
            )
        } else if max_position_pct > dec!(15) || top3_pct > dec!(40) {
            (
                RiskLevel::Medium,
                "Moderate concentration. Monitor top holdings.",
            )
        } else {
            (
                RiskLevel::Low,
                "Low concentration in any single card or set.",
            )
        };

        MarketExposure {
            max_position_pct,
            top3_pct,
            level,
            description: description.to_string(),
        }
    }
}
