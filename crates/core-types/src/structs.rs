use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::grade::parse_psa_grade;

/// The identifier shared by both price tables and the metadata table.
pub type CardId = i64;

/// A single ungraded listing observation from the price-history table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub card_id: CardId,
    pub timestamp: DateTime<Utc>,
    /// Market price of the listing. Always >= 0; enforced when a snapshot is built.
    pub price: Decimal,
    /// Listing condition, e.g. "Near Mint".
    pub condition: String,
    /// Listing volume for the observation date, when the source provides it.
    pub volume: Option<u32>,
}

/// A graded-sale observation, keyed by a grade label such as "psa10".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradedSale {
    pub card_id: CardId,
    pub timestamp: DateTime<Utc>,
    /// Average sale price reported for this (card, date, grade) row.
    pub price: Decimal,
    pub grade: String,
}

impl GradedSale {
    /// The numeric PSA grade parsed from the label, if the label carries one.
    pub fn psa_grade(&self) -> Option<u8> {
        parse_psa_grade(&self.grade)
    }
}

/// Static card attributes, joined into both price tables by `card_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardMetadata {
    pub card_id: CardId,
    pub name: String,
    pub set_id: String,
    pub set_name: String,
    pub rarity: String,
}

/// One position in a user's portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioHolding {
    pub card_id: CardId,
    pub quantity: u32,
    pub buy_price: Decimal,
    pub buy_date: DateTime<Utc>,
}
