use core_types::CardId;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Negative price {price} for card {card_id}; prices must be >= 0")]
    NegativePrice { card_id: CardId, price: Decimal },

    #[error("Metadata row for card {0} appears more than once")]
    DuplicateMetadata(CardId),
}
