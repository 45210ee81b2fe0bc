use crate::error::SnapshotError;
use chrono::{DateTime, NaiveDate, Utc};
use core_types::{CardId, CardMetadata, GradedSale, PricePoint};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// An immutable, versioned view of the price-history table, the graded-sale
/// table, and the card metadata table.
///
/// Rows are stored sorted by `(card_id, timestamp)` with per-card index
/// ranges, so every per-card query hands out a date-ordered slice without
/// copying.
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    version: u64,
    price_history: Vec<PricePoint>,
    graded_sales: Vec<GradedSale>,
    listing_ranges: HashMap<CardId, (usize, usize)>,
    sale_ranges: HashMap<CardId, (usize, usize)>,
    metadata: HashMap<CardId, CardMetadata>,
    first_observed: Option<DateTime<Utc>>,
    last_observed: Option<DateTime<Utc>>,
}

impl MarketSnapshot {
    /// Builds the first snapshot (version 1) from raw table rows.
    pub fn new(
        price_history: Vec<PricePoint>,
        graded_sales: Vec<GradedSale>,
        metadata: Vec<CardMetadata>,
    ) -> Result<Self, SnapshotError> {
        Self::build(1, price_history, graded_sales, metadata)
    }

    /// Builds a replacement snapshot from refreshed table rows, bumping the
    /// version so any version-keyed caches miss.
    pub fn refreshed(
        &self,
        price_history: Vec<PricePoint>,
        graded_sales: Vec<GradedSale>,
        metadata: Vec<CardMetadata>,
    ) -> Result<Self, SnapshotError> {
        Self::build(self.version + 1, price_history, graded_sales, metadata)
    }

    fn build(
        version: u64,
        mut price_history: Vec<PricePoint>,
        mut graded_sales: Vec<GradedSale>,
        metadata: Vec<CardMetadata>,
    ) -> Result<Self, SnapshotError> {
        for point in &price_history {
            if point.price < Decimal::ZERO {
                return Err(SnapshotError::NegativePrice {
                    card_id: point.card_id,
                    price: point.price,
                });
            }
        }
        for sale in &graded_sales {
            if sale.price < Decimal::ZERO {
                return Err(SnapshotError::NegativePrice {
                    card_id: sale.card_id,
                    price: sale.price,
                });
            }
        }

        // Stable sort: rows sharing a timestamp keep their source order, so
        // "last observation of the day" matches the input table's order.
        price_history.sort_by(|a, b| (a.card_id, a.timestamp).cmp(&(b.card_id, b.timestamp)));
        graded_sales.sort_by(|a, b| (a.card_id, a.timestamp).cmp(&(b.card_id, b.timestamp)));

        let listing_ranges = index_ranges(price_history.iter().map(|p| p.card_id));
        let sale_ranges = index_ranges(graded_sales.iter().map(|s| s.card_id));

        let mut metadata_map = HashMap::with_capacity(metadata.len());
        for card in metadata {
            let card_id = card.card_id;
            if metadata_map.insert(card_id, card).is_some() {
                return Err(SnapshotError::DuplicateMetadata(card_id));
            }
        }

        let first_observed = price_history.iter().map(|p| p.timestamp).min();
        let last_observed = price_history.iter().map(|p| p.timestamp).max();

        tracing::debug!(
            version,
            listings = price_history.len(),
            graded = graded_sales.len(),
            cards = metadata_map.len(),
            "built market snapshot"
        );

        Ok(Self {
            version,
            price_history,
            graded_sales,
            listing_ranges,
            sale_ranges,
            metadata: metadata_map,
            first_observed,
            last_observed,
        })
    }

    /// Monotonically increasing snapshot version; the cache key for any
    /// memoized derived value.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// All ungraded listings for a card, ordered by timestamp.
    pub fn listings(&self, card_id: CardId) -> &[PricePoint] {
        match self.listing_ranges.get(&card_id) {
            Some(&(start, end)) => &self.price_history[start..end],
            None => &[],
        }
    }

    /// All graded sales for a card, ordered by timestamp.
    pub fn graded(&self, card_id: CardId) -> &[GradedSale] {
        match self.sale_ranges.get(&card_id) {
            Some(&(start, end)) => &self.graded_sales[start..end],
            None => &[],
        }
    }

    /// Cards that appear in the price-history table.
    ///
    /// Iteration order is map order, i.e. unspecified.
    pub fn listed_cards(&self) -> impl Iterator<Item = CardId> + '_ {
        self.listing_ranges.keys().copied()
    }

    pub fn metadata(&self, card_id: CardId) -> Option<&CardMetadata> {
        self.metadata.get(&card_id)
    }

    /// The most recent listing for a card, if any.
    pub fn latest_listing(&self, card_id: CardId) -> Option<&PricePoint> {
        self.listings(card_id).last()
    }

    /// The most recent listing at or before `cutoff`.
    pub fn latest_listing_at_or_before(
        &self,
        card_id: CardId,
        cutoff: DateTime<Utc>,
    ) -> Option<&PricePoint> {
        self.listings(card_id)
            .iter()
            .rev()
            .find(|p| p.timestamp <= cutoff)
    }

    /// Earliest observation timestamp across the whole price-history table.
    pub fn first_observed(&self) -> Option<DateTime<Utc>> {
        self.first_observed
    }

    /// Latest observation timestamp across the whole price-history table.
    pub fn last_observed(&self) -> Option<DateTime<Utc>> {
        self.last_observed
    }

    /// A card's listing history collapsed to one price per calendar day,
    /// the day's last observation winning.
    pub fn daily_prices(&self, card_id: CardId) -> Vec<(NaiveDate, Decimal)> {
        collapse_daily(self.listings(card_id).iter().map(|p| (p.timestamp.date_naive(), p.price)))
    }

    /// Like [`Self::daily_prices`], restricted to days in `[start, end]`.
    pub fn daily_prices_between(
        &self,
        card_id: CardId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<(NaiveDate, Decimal)> {
        collapse_daily(
            self.listings(card_id)
                .iter()
                .map(|p| (p.timestamp.date_naive(), p.price))
                .filter(|(day, _)| *day >= start && *day <= end),
        )
    }
}

/// Scans `card_id`s of a sorted table and records each card's `[start, end)`
/// index range.
fn index_ranges(ids: impl Iterator<Item = CardId>) -> HashMap<CardId, (usize, usize)> {
    let mut ranges: HashMap<CardId, (usize, usize)> = HashMap::new();
    for (index, card_id) in ids.enumerate() {
        ranges
            .entry(card_id)
            .and_modify(|(_, end)| *end = index + 1)
            .or_insert((index, index + 1));
    }
    ranges
}

/// Collapses a date-ordered stream of observations to one value per day.
fn collapse_daily(
    observations: impl Iterator<Item = (NaiveDate, Decimal)>,
) -> Vec<(NaiveDate, Decimal)> {
    let mut daily: Vec<(NaiveDate, Decimal)> = Vec::new();
    for (day, price) in observations {
        match daily.last_mut() {
            Some((last_day, last_price)) if *last_day == day => *last_price = price,
            _ => daily.push((day, price)),
        }
    }
    daily
}
