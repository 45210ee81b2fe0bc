//! # Price Aggregator
//!
//! Outlier-aware per-card price statistics. This is a pure logic crate: it
//! reads a [`datastore::MarketSnapshot`] slice, fences outliers with an
//! interquartile-range filter, and reports the surviving distribution with a
//! confidence grade.

pub mod stat;

pub use stat::AggregatedPriceStat;

use chrono::Duration;
use core_types::{CardId, Confidence};
use datastore::MarketSnapshot;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;

/// Which price table (and slice of it) an aggregation reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceScope<'a> {
    /// Ungraded listings, optionally narrowed to one condition.
    Ungraded { condition: Option<&'a str> },
    /// Graded sales for one grade label (e.g. "psa10").
    Graded { grade: &'a str },
}

/// A stateless calculator for per-card, per-condition/grade price statistics.
#[derive(Debug, Default)]
pub struct PriceAggregator {}

impl PriceAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregates a card's prices inside `scope`.
    ///
    /// With `days`, only the trailing window ending at the max observed date
    /// in the filtered set is considered; an empty window falls back to the
    /// whole filtered set. Values outside the interquartile fence
    /// `[Q1 - 1.5*IQR, Q3 + 1.5*IQR]` are rejected, unless rejection would
    /// empty the set. Empty input yields a zeroed stat with
    /// `Confidence::None` rather than an error.
    pub fn aggregate(
        &self,
        snapshot: &MarketSnapshot,
        card_id: CardId,
        scope: PriceScope<'_>,
        days: Option<i64>,
    ) -> AggregatedPriceStat {
        let observations = collect(snapshot, card_id, scope);
        if observations.is_empty() {
            return AggregatedPriceStat::empty();
        }

        let windowed = apply_window(&observations, days);
        let prices: Vec<Decimal> = windowed.iter().map(|(_, price)| *price).collect();
        let fenced = fence_outliers(&prices);

        let mut sorted = fenced.clone();
        sorted.sort();
        let sample_size = sorted.len();
        let average = sorted.iter().sum::<Decimal>() / Decimal::from(sample_size);
        let median = quantile(&sorted, dec!(0.5));
        let min = sorted[0];
        let max = sorted[sample_size - 1];

        let relative_spread = if average > Decimal::ZERO {
            (max - min) / average * dec!(100)
        } else {
            dec!(100)
        };
        let confidence = if sample_size >= 20 && relative_spread < dec!(20) {
            Confidence::High
        } else if sample_size >= 10 && relative_spread < dec!(40) {
            Confidence::Medium
        } else {
            Confidence::Low
        };

        tracing::debug!(
            card_id,
            sample_size,
            %average,
            %relative_spread,
            "aggregated prices"
        );

        AggregatedPriceStat {
            average,
            median,
            min,
            max,
            confidence,
            sample_size,
        }
    }
}

type Observation = (chrono::DateTime<chrono::Utc>, Decimal);

fn collect(
    snapshot: &MarketSnapshot,
    card_id: CardId,
    scope: PriceScope<'_>,
) -> Vec<Observation> {
    match scope {
        PriceScope::Ungraded { condition } => snapshot
            .listings(card_id)
            .iter()
            .filter(|p| condition.is_none_or(|c| p.condition == c))
            .map(|p| (p.timestamp, p.price))
            .collect(),
        PriceScope::Graded { grade } => {
            let wanted = normalize_grade(grade);
            snapshot
                .graded(card_id)
                .iter()
                .filter(|s| normalize_grade(&s.grade) == wanted)
                .map(|s| (s.timestamp, s.price))
                .collect()
        }
    }
}

fn normalize_grade(grade: &str) -> String {
    grade
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Restricts to the trailing `days`-long window ending at the latest
/// observation, keeping the full set when the window would be empty.
fn apply_window(observations: &[Observation], days: Option<i64>) -> Vec<Observation> {
    let Some(days) = days else {
        return observations.to_vec();
    };
    let Some(last) = observations.iter().map(|(ts, _)| *ts).max() else {
        return observations.to_vec();
    };
    let cutoff = last - Duration::days(days);
    let recent: Vec<Observation> = observations
        .iter()
        .filter(|(ts, _)| *ts >= cutoff)
        .copied()
        .collect();
    if recent.is_empty() {
        observations.to_vec()
    } else {
        recent
    }
}

/// Keeps values inside `[Q1 - 1.5*IQR, Q3 + 1.5*IQR]`; reverts to the input
/// when the fence rejects everything.
fn fence_outliers(prices: &[Decimal]) -> Vec<Decimal> {
    let mut sorted = prices.to_vec();
    sorted.sort();
    let q1 = quantile(&sorted, dec!(0.25));
    let q3 = quantile(&sorted, dec!(0.75));
    let iqr = q3 - q1;
    let lower = q1 - dec!(1.5) * iqr;
    let upper = q3 + dec!(1.5) * iqr;

    let fenced: Vec<Decimal> = prices
        .iter()
        .filter(|p| **p >= lower && **p <= upper)
        .copied()
        .collect();
    if fenced.is_empty() {
        prices.to_vec()
    } else {
        fenced
    }
}

/// Linear-interpolation quantile over a sorted, non-empty slice.
fn quantile(sorted: &[Decimal], q: Decimal) -> Decimal {
    let rank = q * Decimal::from(sorted.len() - 1);
    let lower_index = rank.floor().to_usize().unwrap_or(0);
    let upper_index = (lower_index + 1).min(sorted.len() - 1);
    let fraction = rank - rank.floor();
    sorted[lower_index] + (sorted[upper_index] - sorted[lower_index]) * fraction
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use core_types::{GradedSale, PricePoint};

    fn listing(day: u32, price: Decimal) -> PricePoint {
        PricePoint {
            card_id: 7,
            timestamp: Utc.with_ymd_and_hms(2025, 3, day, 0, 0, 0).unwrap(),
            price,
            condition: "Near Mint".to_string(),
            volume: None,
        }
    }

    fn snapshot_of(prices: &[Decimal]) -> MarketSnapshot {
        let listings = prices
            .iter()
            .enumerate()
            .map(|(i, p)| listing(1 + i as u32, *p))
            .collect();
        MarketSnapshot::new(listings, vec![], vec![]).unwrap()
    }

    const UNGRADED: PriceScope<'static> = PriceScope::Ungraded { condition: None };

    #[test]
    fn empty_input_yields_a_neutral_stat() {
        let snapshot = snapshot_of(&[]);
        let stat = PriceAggregator::new().aggregate(&snapshot, 7, UNGRADED, None);
        assert_eq!(stat.confidence, Confidence::None);
        assert_eq!(stat.sample_size, 0);
    }

    #[test]
    fn single_observation_collapses_all_fields() {
        let snapshot = snapshot_of(&[dec!(42.5)]);
        let stat = PriceAggregator::new().aggregate(&snapshot, 7, UNGRADED, None);
        assert_eq!(stat.average, dec!(42.5));
        assert_eq!(stat.median, dec!(42.5));
        assert_eq!(stat.min, dec!(42.5));
        assert_eq!(stat.max, dec!(42.5));
        assert_eq!(stat.confidence, Confidence::Low);
        assert_eq!(stat.sample_size, 1);
    }

    #[test]
    fn iqr_fence_drops_the_outlier() {
        let snapshot = snapshot_of(&[dec!(10), dec!(10), dec!(10), dec!(10), dec!(100)]);
        let stat = PriceAggregator::new().aggregate(&snapshot, 7, UNGRADED, None);
        assert_eq!(stat.sample_size, 4);
        assert_eq!(stat.average, dec!(10));
        assert_eq!(stat.max, dec!(10));
    }

    #[test]
    fn ordering_invariant_holds() {
        let snapshot = snapshot_of(&[dec!(12), dec!(8), dec!(15), dec!(9), dec!(11)]);
        let stat = PriceAggregator::new().aggregate(&snapshot, 7, UNGRADED, None);
        assert!(stat.min <= stat.median && stat.median <= stat.max);
    }

    #[test]
    fn tight_large_sample_is_high_confidence() {
        let prices: Vec<Decimal> = (0..20).map(|_| dec!(50)).collect();
        let snapshot = snapshot_of(&prices);
        let stat = PriceAggregator::new().aggregate(&snapshot, 7, UNGRADED, None);
        assert_eq!(stat.confidence, Confidence::High);
    }

    #[test]
    fn medium_confidence_needs_ten_samples_under_forty_percent_spread() {
        // 46..=55: inside the fence, ~18% relative spread, 10 samples.
        let prices: Vec<Decimal> = (46..=55).map(Decimal::from).collect();
        let snapshot = snapshot_of(&prices);
        let stat = PriceAggregator::new().aggregate(&snapshot, 7, UNGRADED, None);
        assert_eq!(stat.sample_size, 10);
        assert_eq!(stat.confidence, Confidence::Medium);
    }

    #[test]
    fn window_is_anchored_at_the_latest_observation() {
        // Two early points, one late point; a 3-day window ending at the max
        // observed date keeps only the late one, regardless of "now".
        let listings = vec![
            listing(1, dec!(10)),
            listing(2, dec!(10)),
            listing(10, dec!(99)),
        ];
        let snapshot = MarketSnapshot::new(listings, vec![], vec![]).unwrap();
        let stat = PriceAggregator::new().aggregate(&snapshot, 7, UNGRADED, Some(3));
        assert_eq!(stat.sample_size, 1);
        assert_eq!(stat.average, dec!(99));
    }

    #[test]
    fn grade_scope_reads_the_graded_table() {
        let sales = vec![
            GradedSale {
                card_id: 7,
                timestamp: Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
                price: dec!(80),
                grade: "psa10".to_string(),
            },
            GradedSale {
                card_id: 7,
                timestamp: Utc.with_ymd_and_hms(2025, 3, 2, 0, 0, 0).unwrap(),
                price: dec!(30),
                grade: "psa9".to_string(),
            },
        ];
        let snapshot = MarketSnapshot::new(vec![], sales, vec![]).unwrap();
        let stat = PriceAggregator::new().aggregate(
            &snapshot,
            7,
            PriceScope::Graded { grade: "PSA 10" },
            None,
        );
        assert_eq!(stat.sample_size, 1);
        assert_eq!(stat.average, dec!(80));
    }
}
