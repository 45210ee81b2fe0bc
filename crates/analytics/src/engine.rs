use crate::report::{ListingActivity, MarketChange, MarketValue, SetPerformance, TopMover};
use chrono::Duration;
use core_types::{CardId, TrendDirection};
use datastore::MarketSnapshot;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::cell::Cell;
use std::collections::{HashMap, HashSet};

/// Market-wide statistics over a snapshot.
///
/// Holds no data itself; the only state is the version-keyed memo of the
/// total market value, which the snapshot version keeps honest across
/// refreshes.
#[derive(Debug, Default)]
pub struct MarketAnalytics {
    market_value_memo: Cell<Option<(u64, Decimal)>>,
}

impl MarketAnalytics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total market value: the sum of each tracked card's most recent price.
    pub fn total_value(&self, snapshot: &MarketSnapshot) -> MarketValue {
        if let Some((version, value)) = self.market_value_memo.get() {
            if version == snapshot.version() {
                return MarketValue::new(value);
            }
        }

        let total: Decimal = snapshot
            .listed_cards()
            .filter_map(|card_id| snapshot.latest_listing(card_id))
            .map(|listing| listing.price)
            .sum();

        self.market_value_memo.set(Some((snapshot.version(), total)));
        tracing::debug!(version = snapshot.version(), %total, "computed total market value");
        MarketValue::new(total)
    }

    /// Market change between the current totals and the totals at
    /// `max_date - days` (the earliest record when `days` is `None`).
    ///
    /// Returns the explicit neutral result when no past total exists or the
    /// past total is not positive; this operation never fails.
    pub fn change(&self, snapshot: &MarketSnapshot, days: Option<i64>) -> MarketChange {
        let Some(cutoff) = (match days {
            Some(days) => snapshot.last_observed().map(|last| last - Duration::days(days)),
            None => snapshot.first_observed(),
        }) else {
            return MarketChange::neutral();
        };

        let past: Decimal = snapshot
            .listed_cards()
            .filter_map(|card_id| snapshot.latest_listing_at_or_before(card_id, cutoff))
            .map(|listing| listing.price)
            .sum();
        if past <= Decimal::ZERO {
            return MarketChange::neutral();
        }

        let current = self.total_value(snapshot).value;
        let change_value = current - past;
        let change_pct = change_value / past * dec!(100);
        MarketChange::new(change_value, change_pct)
    }

    /// The set whose cards gained the most over the trailing window, by the
    /// sum of per-card `(end - start) / start`.
    ///
    /// Ties keep whichever set the iteration visits first; the order is
    /// unspecified.
    pub fn best_performing_set(
        &self,
        snapshot: &MarketSnapshot,
        days: i64,
    ) -> Option<SetPerformance> {
        let cutoff = snapshot.last_observed()? - Duration::days(days);

        struct SetAccumulator {
            set_name: String,
            change_sum: Decimal,
            cards: usize,
        }
        let mut by_set: HashMap<String, SetAccumulator> = HashMap::new();

        for card_id in snapshot.listed_cards() {
            let Some(meta) = snapshot.metadata(card_id) else {
                continue;
            };
            let windowed: Vec<Decimal> = snapshot
                .listings(card_id)
                .iter()
                .filter(|p| p.timestamp >= cutoff)
                .map(|p| p.price)
                .collect();
            let (Some(start), Some(end)) = (windowed.first(), windowed.last()) else {
                continue;
            };
            if *start <= Decimal::ZERO {
                continue;
            }
            let change = (*end - *start) / *start;

            by_set
                .entry(meta.set_id.clone())
                .and_modify(|acc| {
                    acc.change_sum += change;
                    acc.cards += 1;
                })
                .or_insert(SetAccumulator {
                    set_name: meta.set_name.clone(),
                    change_sum: change,
                    cards: 1,
                });
        }

        let mut best: Option<(String, SetAccumulator)> = None;
        for (set_id, acc) in by_set {
            match &best {
                Some((_, current)) if acc.change_sum <= current.change_sum => {}
                _ => best = Some((set_id, acc)),
            }
        }
        best.map(|(set_id, acc)| SetPerformance {
            set_id,
            set_name: acc.set_name,
            aggregate_change_pct: acc.change_sum * dec!(100),
            cards_measured: acc.cards,
        })
    }

    /// Cards ranked by in-window percent change, best first.
    ///
    /// Cards need at least two in-window observations. Selection at the
    /// `n`-th boundary is tie-inclusive, so the result may hold more than
    /// `n` rows.
    pub fn top_movers(
        &self,
        snapshot: &MarketSnapshot,
        days: i64,
        n: usize,
        min_volume: Option<u32>,
    ) -> Vec<TopMover> {
        let Some(last) = snapshot.last_observed() else {
            return Vec::new();
        };
        let cutoff = last - Duration::days(days);

        let mut movers: Vec<TopMover> = Vec::new();
        for card_id in snapshot.listed_cards() {
            let windowed: Vec<&core_types::PricePoint> = snapshot
                .listings(card_id)
                .iter()
                .filter(|p| p.timestamp >= cutoff)
                .collect();
            if windowed.len() < 2 {
                continue;
            }
            if let Some(min_volume) = min_volume {
                let volume: u64 = windowed.iter().map(|p| u64::from(p.volume.unwrap_or(0))).sum();
                if volume < u64::from(min_volume) {
                    continue;
                }
            }
            let start = windowed[0].price;
            let end = windowed[windowed.len() - 1].price;
            if start <= Decimal::ZERO {
                continue;
            }

            let (name, set_name) = match snapshot.metadata(card_id) {
                Some(meta) => (meta.name.clone(), meta.set_name.clone()),
                None => (format!("#{card_id}"), "N/A".to_string()),
            };
            movers.push(TopMover {
                card_id,
                name,
                set_name,
                current_price: end,
                price_change: end - start,
                pct_change: (end - start) / start * dec!(100),
            });
        }

        movers.sort_by(|a, b| b.pct_change.cmp(&a.pct_change));

        // Tie-inclusive cut: everything tied with the n-th row stays in.
        if n == 0 {
            movers.clear();
        } else if movers.len() > n {
            let boundary = movers[n - 1].pct_change;
            let keep = movers
                .iter()
                .position(|m| m.pct_change < boundary)
                .unwrap_or(movers.len());
            movers.truncate(keep);
        }
        movers
    }

    /// In-window listing activity.
    pub fn active_listings(&self, snapshot: &MarketSnapshot, days: i64) -> ListingActivity {
        let Some(last) = snapshot.last_observed() else {
            return ListingActivity {
                count: 0,
                from_volume: false,
            };
        };
        let cutoff = last - Duration::days(days);

        let mut volume_total: u64 = 0;
        let mut has_volume = false;
        let mut observation_days: HashSet<(CardId, chrono::NaiveDate)> = HashSet::new();
        for card_id in snapshot.listed_cards() {
            for point in snapshot.listings(card_id) {
                if point.timestamp < cutoff {
                    continue;
                }
                if let Some(volume) = point.volume {
                    has_volume = true;
                    volume_total += u64::from(volume);
                }
                observation_days.insert((card_id, point.timestamp.date_naive()));
            }
        }

        if has_volume {
            ListingActivity {
                count: volume_total,
                from_volume: true,
            }
        } else {
            ListingActivity {
                count: observation_days.len() as u64,
                from_volume: false,
            }
        }
    }

    /// Coarse trend of one card's full daily series: OLS slope sign plus a
    /// +/-2% total-change threshold.
    pub fn card_trend(&self, snapshot: &MarketSnapshot, card_id: CardId) -> TrendDirection {
        let daily = snapshot.daily_prices(card_id);
        if daily.len() < 2 {
            return TrendDirection::NotEnoughData;
        }

        let first = daily[0].1;
        let last = daily[daily.len() - 1].1;
        if first <= Decimal::ZERO {
            return TrendDirection::Stable;
        }
        let total_change = ((last - first) / first).to_f64().unwrap_or(0.0);

        let prices: Vec<f64> = daily
            .iter()
            .map(|(_, price)| price.to_f64().unwrap_or(0.0))
            .collect();
        let slope = ols_slope(&prices);

        const TREND_THRESHOLD: f64 = 0.02;
        if slope > 0.0 && total_change > TREND_THRESHOLD {
            TrendDirection::Up
        } else if slope < 0.0 && total_change < -TREND_THRESHOLD {
            TrendDirection::Down
        } else {
            TrendDirection::Stable
        }
    }
}

/// Least-squares slope of `values` against their indices.
fn ols_slope(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / n;
    let mut covariance = 0.0;
    let mut variance = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        covariance += dx * (y - mean_y);
        variance += dx * dx;
    }
    if variance == 0.0 {
        0.0
    } else {
        covariance / variance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use core_types::{CardMetadata, PricePoint};

    fn listing(card_id: CardId, day: u32, price: Decimal) -> PricePoint {
        PricePoint {
            card_id,
            timestamp: Utc.with_ymd_and_hms(2025, 7, day, 0, 0, 0).unwrap(),
            price,
            condition: "Near Mint".to_string(),
            volume: None,
        }
    }

    fn meta(card_id: CardId, set_id: &str) -> CardMetadata {
        CardMetadata {
            card_id,
            name: format!("Card {card_id}"),
            set_id: set_id.to_string(),
            set_name: format!("Set {set_id}"),
            rarity: "Rare".to_string(),
        }
    }

    #[test]
    fn change_with_no_window_compares_first_and_last() {
        let snapshot = MarketSnapshot::new(
            vec![listing(1, 1, dec!(100)), listing(1, 2, dec!(150))],
            vec![],
            vec![],
        )
        .unwrap();
        let change = MarketAnalytics::new().change(&snapshot, None);
        assert_eq!(change.change_pct, dec!(50));
        assert_eq!(change.change_value, dec!(50));
    }

    #[test]
    fn change_without_history_is_neutral() {
        let snapshot = MarketSnapshot::new(vec![], vec![], vec![]).unwrap();
        let change = MarketAnalytics::new().change(&snapshot, Some(1));
        assert_eq!(change, MarketChange::neutral());
    }

    #[test]
    fn total_value_memo_tracks_the_snapshot_version() {
        let analytics = MarketAnalytics::new();
        let snapshot =
            MarketSnapshot::new(vec![listing(1, 1, dec!(10))], vec![], vec![]).unwrap();
        assert_eq!(analytics.total_value(&snapshot).value, dec!(10));
        // Same version: served from the memo.
        assert_eq!(analytics.total_value(&snapshot).value, dec!(10));

        let refreshed = snapshot
            .refreshed(vec![listing(1, 1, dec!(10)), listing(1, 2, dec!(25))], vec![], vec![])
            .unwrap();
        assert_eq!(analytics.total_value(&refreshed).value, dec!(25));
    }

    #[test]
    fn best_performing_set_sums_per_card_changes() {
        let listings = vec![
            // Set A: +50% and +10%.
            listing(1, 1, dec!(10)),
            listing(1, 9, dec!(15)),
            listing(2, 1, dec!(100)),
            listing(2, 9, dec!(110)),
            // Set B: -20%.
            listing(3, 1, dec!(50)),
            listing(3, 9, dec!(40)),
        ];
        let metadata = vec![meta(1, "A"), meta(2, "A"), meta(3, "B")];
        let snapshot = MarketSnapshot::new(listings, vec![], metadata).unwrap();

        let best = MarketAnalytics::new()
            .best_performing_set(&snapshot, 30)
            .unwrap();
        assert_eq!(best.set_id, "A");
        assert_eq!(best.cards_measured, 2);
        assert_eq!(best.aggregate_change_pct, dec!(60));
    }

    #[test]
    fn top_movers_requires_two_observations_and_ranks_by_pct() {
        let listings = vec![
            listing(1, 1, dec!(10)),
            listing(1, 9, dec!(20)), // +100%
            listing(2, 1, dec!(10)),
            listing(2, 9, dec!(11)), // +10%
            listing(3, 9, dec!(99)), // single observation: excluded
        ];
        let snapshot = MarketSnapshot::new(listings, vec![], vec![]).unwrap();
        let movers = MarketAnalytics::new().top_movers(&snapshot, 30, 10, None);
        assert_eq!(movers.len(), 2);
        assert_eq!(movers[0].card_id, 1);
        assert_eq!(movers[0].pct_change, dec!(100));
    }

    #[test]
    fn top_movers_keeps_ties_at_the_boundary() {
        // Three cards tied at +10% behind one leader; asking for 2 returns 4.
        let listings = vec![
            listing(1, 1, dec!(10)),
            listing(1, 9, dec!(20)),
            listing(2, 1, dec!(10)),
            listing(2, 9, dec!(11)),
            listing(3, 1, dec!(20)),
            listing(3, 9, dec!(22)),
            listing(4, 1, dec!(40)),
            listing(4, 9, dec!(44)),
        ];
        let snapshot = MarketSnapshot::new(listings, vec![], vec![]).unwrap();
        let movers = MarketAnalytics::new().top_movers(&snapshot, 30, 2, None);
        assert_eq!(movers.len(), 4);
        assert_eq!(movers[0].card_id, 1);
    }

    #[test]
    fn active_listings_counts_distinct_days_without_volume() {
        let listings = vec![
            listing(1, 1, dec!(10)),
            listing(1, 2, dec!(10)),
            listing(2, 2, dec!(10)),
        ];
        let snapshot = MarketSnapshot::new(listings, vec![], vec![]).unwrap();
        let activity = MarketAnalytics::new().active_listings(&snapshot, 30);
        assert_eq!(activity.count, 3);
        assert!(!activity.from_volume);
    }

    #[test]
    fn active_listings_prefers_volume_when_present() {
        let mut with_volume = listing(1, 1, dec!(10));
        with_volume.volume = Some(5);
        let mut more_volume = listing(1, 2, dec!(10));
        more_volume.volume = Some(7);
        let snapshot =
            MarketSnapshot::new(vec![with_volume, more_volume], vec![], vec![]).unwrap();
        let activity = MarketAnalytics::new().active_listings(&snapshot, 30);
        assert_eq!(activity.count, 12);
        assert!(activity.from_volume);
    }

    #[test]
    fn card_trend_classifies_direction() {
        let rising = MarketSnapshot::new(
            vec![
                listing(1, 1, dec!(10)),
                listing(1, 2, dec!(11)),
                listing(1, 3, dec!(12)),
            ],
            vec![],
            vec![],
        )
        .unwrap();
        let analytics = MarketAnalytics::new();
        assert_eq!(analytics.card_trend(&rising, 1), TrendDirection::Up);
        assert_eq!(analytics.card_trend(&rising, 99), TrendDirection::NotEnoughData);
    }
}
