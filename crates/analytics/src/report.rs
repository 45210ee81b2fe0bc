use core_types::display::{format_currency, format_percent, format_signed_currency};
use core_types::CardId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sum of every tracked card's most recent price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketValue {
    pub value: Decimal,
    pub formatted: String,
}

impl MarketValue {
    pub fn new(value: Decimal) -> Self {
        Self {
            formatted: format_currency(value),
            value,
        }
    }
}

/// Market movement between a past cutoff and the current snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketChange {
    pub change_value: Decimal,
    pub change_pct: Decimal,
    pub formatted_value: String,
    pub formatted_pct: String,
}

impl MarketChange {
    pub fn new(change_value: Decimal, change_pct: Decimal) -> Self {
        Self {
            formatted_value: format_signed_currency(change_value),
            formatted_pct: format_percent(change_pct),
            change_value,
            change_pct,
        }
    }

    /// The explicit zero result used when no past total exists to compare
    /// against.
    pub fn neutral() -> Self {
        Self::new(Decimal::ZERO, Decimal::ZERO)
    }
}

/// The grouping (set) with the highest aggregate per-card change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetPerformance {
    pub set_id: String,
    pub set_name: String,
    /// Sum of per-card `(end - start) / start` over the window, as percent.
    pub aggregate_change_pct: Decimal,
    pub cards_measured: usize,
}

/// One row of the top-movers ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopMover {
    pub card_id: CardId,
    pub name: String,
    pub set_name: String,
    pub current_price: Decimal,
    pub price_change: Decimal,
    pub pct_change: Decimal,
}

/// In-window listing activity: summed volume when the table carries volume,
/// otherwise distinct (card, day) observation pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingActivity {
    pub count: u64,
    pub from_volume: bool,
}
