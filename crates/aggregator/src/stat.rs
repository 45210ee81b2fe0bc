use core_types::Confidence;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Outlier-filtered distribution summary for one card in one scope.
///
/// Whenever `sample_size > 0`, the fields satisfy `min <= median <= max`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedPriceStat {
    pub average: Decimal,
    pub median: Decimal,
    pub min: Decimal,
    pub max: Decimal,
    pub confidence: Confidence,
    pub sample_size: usize,
}

impl AggregatedPriceStat {
    /// The well-formed neutral stat returned for empty input.
    pub fn empty() -> Self {
        Self {
            average: Decimal::ZERO,
            median: Decimal::ZERO,
            min: Decimal::ZERO,
            max: Decimal::ZERO,
            confidence: Confidence::None,
            sample_size: 0,
        }
    }
}
