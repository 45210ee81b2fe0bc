use crate::report::{AverageCardValue, CardCount, GainLoss, PortfolioValue, TimeWeightedReturn};
use chrono::{DateTime, Duration, Utc};
use core_types::PortfolioHolding;
use datastore::MarketSnapshot;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashSet;

/// A stateless calculator for portfolio-level valuation metrics.
#[derive(Debug, Default)]
pub struct PortfolioAnalytics {}

impl PortfolioAnalytics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current holdings value, with a past value and percent change when a
    /// trailing window is requested.
    pub fn total_value(
        &self,
        snapshot: &MarketSnapshot,
        holdings: &[PortfolioHolding],
        days: Option<i64>,
    ) -> PortfolioValue {
        let current = self.value_now(snapshot, holdings);

        let Some(cutoff) = cutoff(snapshot, days) else {
            return PortfolioValue::new(current, None, None);
        };
        let past = self.value_at(snapshot, holdings, cutoff);
        let change_pct = if past > Decimal::ZERO {
            Some((current - past) / past * dec!(100))
        } else {
            None
        };
        PortfolioValue::new(current, Some(past), change_pct)
    }

    /// Holdings value against cost basis.
    ///
    /// The basis is each holding's buy price, or — when a window is
    /// requested — the historical price at the cutoff, falling back to the
    /// buy price for cards with no observation that old.
    pub fn gain_loss(
        &self,
        snapshot: &MarketSnapshot,
        holdings: &[PortfolioHolding],
        days: Option<i64>,
    ) -> GainLoss {
        let current = self.value_now(snapshot, holdings);

        let basis = match cutoff(snapshot, days) {
            None => holdings
                .iter()
                .map(|h| h.buy_price * Decimal::from(h.quantity))
                .sum(),
            Some(cutoff) => holdings
                .iter()
                .map(|h| {
                    let unit = snapshot
                        .latest_listing_at_or_before(h.card_id, cutoff)
                        .map(|p| p.price)
                        .unwrap_or(h.buy_price);
                    unit * Decimal::from(h.quantity)
                })
                .sum(),
        };

        GainLoss::new(current, basis)
    }

    /// Total quantity and unique-card count, with a delta against holdings
    /// bought on or before the cutoff when a window is requested.
    pub fn card_count(
        &self,
        snapshot: &MarketSnapshot,
        holdings: &[PortfolioHolding],
        days: Option<i64>,
    ) -> CardCount {
        let total_quantity: u64 = holdings.iter().map(|h| u64::from(h.quantity)).sum();
        let unique_cards = holdings
            .iter()
            .map(|h| h.card_id)
            .collect::<HashSet<_>>()
            .len();

        let delta = cutoff(snapshot, days).map(|cutoff| {
            let held_then: u64 = holdings
                .iter()
                .filter(|h| h.buy_date <= cutoff)
                .map(|h| u64::from(h.quantity))
                .sum();
            total_quantity as i64 - held_then as i64
        });

        CardCount {
            formatted: format!("{total_quantity} cards"),
            total_quantity,
            unique_cards,
            delta,
        }
    }

    /// Average market value per held card; zero for an empty portfolio.
    pub fn average_card_value(
        &self,
        snapshot: &MarketSnapshot,
        holdings: &[PortfolioHolding],
    ) -> AverageCardValue {
        let total_quantity: u64 = holdings.iter().map(|h| u64::from(h.quantity)).sum();
        if total_quantity == 0 {
            return AverageCardValue::new(Decimal::ZERO);
        }
        let value = self.value_now(snapshot, holdings) / Decimal::from(total_quantity);
        AverageCardValue::new(value)
    }

    /// Unweighted mean of each card's compounded per-period return over its
    /// daily series (windowed when `days` is given).
    ///
    /// Position size deliberately does not weight the mean; see the design
    /// notes for the rationale review flag.
    pub fn time_weighted_return(
        &self,
        snapshot: &MarketSnapshot,
        holdings: &[PortfolioHolding],
        days: Option<i64>,
    ) -> TimeWeightedReturn {
        let window_start = cutoff(snapshot, days).map(|c| c.date_naive());

        let unique_cards: HashSet<_> = holdings.iter().map(|h| h.card_id).collect();
        let mut card_returns: Vec<Decimal> = Vec::new();
        for card_id in unique_cards {
            let daily = snapshot.daily_prices(card_id);
            let windowed: Vec<Decimal> = daily
                .iter()
                .filter(|(day, _)| window_start.is_none_or(|start| *day >= start))
                .map(|(_, price)| *price)
                .collect();
            if windowed.len() < 2 {
                continue;
            }

            let mut growth = dec!(1);
            let mut periods = 0;
            for pair in windowed.windows(2) {
                if pair[0] <= Decimal::ZERO {
                    continue;
                }
                growth *= pair[1] / pair[0];
                periods += 1;
            }
            if periods > 0 {
                card_returns.push(growth - dec!(1));
            }
        }

        if card_returns.is_empty() {
            return TimeWeightedReturn {
                return_pct: Decimal::ZERO,
                cards_measured: 0,
            };
        }
        let mean = card_returns.iter().sum::<Decimal>() / Decimal::from(card_returns.len());
        tracing::debug!(
            cards_measured = card_returns.len(),
            %mean,
            "compounded per-card returns"
        );
        TimeWeightedReturn {
            return_pct: mean * dec!(100),
            cards_measured: card_returns.len(),
        }
    }

    fn value_now(&self, snapshot: &MarketSnapshot, holdings: &[PortfolioHolding]) -> Decimal {
        holdings
            .iter()
            .filter_map(|h| {
                snapshot
                    .latest_listing(h.card_id)
                    .map(|p| p.price * Decimal::from(h.quantity))
            })
            .sum()
    }

    fn value_at(
        &self,
        snapshot: &MarketSnapshot,
        holdings: &[PortfolioHolding],
        cutoff: DateTime<Utc>,
    ) -> Decimal {
        holdings
            .iter()
            .filter_map(|h| {
                snapshot
                    .latest_listing_at_or_before(h.card_id, cutoff)
                    .map(|p| p.price * Decimal::from(h.quantity))
            })
            .sum()
    }
}

/// The trailing-window cutoff, measured back from the snapshot's latest
/// observation.
fn cutoff(snapshot: &MarketSnapshot, days: Option<i64>) -> Option<DateTime<Utc>> {
    Some(snapshot.last_observed()? - Duration::days(days?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use core_types::{CardId, PricePoint};

    fn listing(card_id: CardId, day: u32, price: Decimal) -> PricePoint {
        PricePoint {
            card_id,
            timestamp: Utc.with_ymd_and_hms(2025, 7, day, 0, 0, 0).unwrap(),
            price,
            condition: "Near Mint".to_string(),
            volume: None,
        }
    }

    fn holding(card_id: CardId, quantity: u32, buy_price: Decimal, day: u32) -> PortfolioHolding {
        PortfolioHolding {
            card_id,
            quantity,
            buy_price,
            buy_date: Utc.with_ymd_and_hms(2025, 7, day, 0, 0, 0).unwrap(),
        }
    }

    fn snapshot() -> MarketSnapshot {
        MarketSnapshot::new(
            vec![
                listing(1, 1, dec!(10)),
                listing(1, 10, dec!(20)),
                listing(2, 1, dec!(100)),
                listing(2, 10, dec!(90)),
            ],
            vec![],
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn total_value_multiplies_quantity() {
        let holdings = vec![holding(1, 3, dec!(8), 1), holding(2, 1, dec!(80), 1)];
        let value = PortfolioAnalytics::new().total_value(&snapshot(), &holdings, None);
        assert_eq!(value.value, dec!(150));
        assert!(value.past_value.is_none());
    }

    #[test]
    fn windowed_total_value_reports_change() {
        let holdings = vec![holding(1, 1, dec!(8), 1)];
        let value = PortfolioAnalytics::new().total_value(&snapshot(), &holdings, Some(5));
        // Cutoff lands on day 5; the day-1 price of 10 is the past value.
        assert_eq!(value.past_value, Some(dec!(10)));
        assert_eq!(value.change_pct, Some(dec!(100)));
    }

    #[test]
    fn gain_loss_uses_buy_price_without_a_window() {
        let holdings = vec![holding(1, 2, dec!(5), 1)];
        let gain = PortfolioAnalytics::new().gain_loss(&snapshot(), &holdings, None);
        assert_eq!(gain.cost_basis, dec!(10));
        assert_eq!(gain.current_value, dec!(40));
        assert_eq!(gain.gain_loss, dec!(30));
        assert_eq!(gain.gain_loss_pct, dec!(300));
    }

    #[test]
    fn gain_loss_falls_back_to_buy_price_per_card() {
        // Card 3 has no price history at all; its basis stays the buy price.
        let holdings = vec![holding(1, 1, dec!(5), 1), holding(3, 1, dec!(7), 1)];
        let gain = PortfolioAnalytics::new().gain_loss(&snapshot(), &holdings, Some(5));
        assert_eq!(gain.cost_basis, dec!(17));
    }

    #[test]
    fn card_count_tracks_quantity_and_breadth() {
        let holdings = vec![
            holding(1, 2, dec!(5), 1),
            holding(1, 1, dec!(6), 9),
            holding(2, 1, dec!(80), 9),
        ];
        let count = PortfolioAnalytics::new().card_count(&snapshot(), &holdings, Some(5));
        assert_eq!(count.total_quantity, 4);
        assert_eq!(count.unique_cards, 2);
        // Only the day-1 lot (2 cards) predates the day-5 cutoff.
        assert_eq!(count.delta, Some(2));
    }

    #[test]
    fn average_card_value_handles_empty_holdings() {
        let average = PortfolioAnalytics::new().average_card_value(&snapshot(), &[]);
        assert_eq!(average.value, Decimal::ZERO);
    }

    #[test]
    fn time_weighted_return_averages_per_card_unweighted() {
        // Card 1 doubles, card 2 loses 10%; the mean ignores position size.
        let holdings = vec![holding(1, 1, dec!(10), 1), holding(2, 50, dec!(100), 1)];
        let twr = PortfolioAnalytics::new().time_weighted_return(&snapshot(), &holdings, None);
        assert_eq!(twr.cards_measured, 2);
        assert_eq!(twr.return_pct, dec!(45));
    }
}
