use chrono::NaiveDate;
use core_types::CardId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeAction {
    Buy,
    Sell,
}

/// One executed simulation trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutedTrade {
    pub date: NaiveDate,
    pub action: TradeAction,
    pub price: Decimal,
    pub quantity: Decimal,
}

/// Portfolio equity recorded after one simulated day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: Decimal,
}

/// The full outcome of a backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub card_id: CardId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: Decimal,
    pub final_value: Decimal,
    pub total_return_pct: Decimal,
    pub num_trades: usize,
    /// Buy/sell round trips; the denominator of the win rate.
    pub closed_trades: usize,
    /// `None` when no round trip closed.
    pub win_rate_pct: Option<Decimal>,
    /// Worst peak-to-trough equity decline, as a (negative or zero) percent.
    pub max_drawdown_pct: Decimal,
    pub trades: Vec<ExecutedTrade>,
    pub equity_curve: Vec<EquityPoint>,
}
