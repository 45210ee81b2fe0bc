use core_types::display::{format_currency, format_signed_currency};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Current (and optionally past) market value of the holdings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioValue {
    pub value: Decimal,
    pub formatted: String,
    /// Value at the cutoff, when a window was requested.
    pub past_value: Option<Decimal>,
    /// Percent change against `past_value`, when it is positive.
    pub change_pct: Option<Decimal>,
}

impl PortfolioValue {
    pub fn new(value: Decimal, past_value: Option<Decimal>, change_pct: Option<Decimal>) -> Self {
        Self {
            formatted: format_currency(value),
            value,
            past_value,
            change_pct,
        }
    }
}

/// Holdings value against their cost basis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GainLoss {
    pub current_value: Decimal,
    pub cost_basis: Decimal,
    pub gain_loss: Decimal,
    pub gain_loss_pct: Decimal,
    pub formatted: String,
}

impl GainLoss {
    pub fn new(current_value: Decimal, cost_basis: Decimal) -> Self {
        let gain_loss = current_value - cost_basis;
        let gain_loss_pct = if cost_basis > Decimal::ZERO {
            gain_loss / cost_basis * Decimal::from(100)
        } else {
            Decimal::ZERO
        };
        Self {
            formatted: format_signed_currency(gain_loss),
            current_value,
            cost_basis,
            gain_loss,
            gain_loss_pct,
        }
    }
}

/// Quantity and breadth of the holdings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardCount {
    pub total_quantity: u64,
    pub unique_cards: usize,
    /// Change in total quantity against holdings bought on or before the
    /// cutoff, when a window was requested.
    pub delta: Option<i64>,
    pub formatted: String,
}

/// Average market value per held card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageCardValue {
    pub value: Decimal,
    pub formatted: String,
}

impl AverageCardValue {
    pub fn new(value: Decimal) -> Self {
        Self {
            formatted: format_currency(value),
            value,
        }
    }
}

/// Unweighted mean of per-card compounded returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeWeightedReturn {
    pub return_pct: Decimal,
    /// Cards with enough history to contribute a compounded return.
    pub cards_measured: usize,
}
