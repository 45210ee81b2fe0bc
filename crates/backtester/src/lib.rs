//! # Backtester
//!
//! A deterministic, day-stepped trading simulator. Each simulated day, the
//! signal source is evaluated over strictly prior data (no look-ahead) and a
//! single FLAT/LONG position is moved all-in or all-out accordingly.
//!
//! Unlike the signal engine's graceful degradation, a window too small to
//! simulate is a hard error: a backtest over too little data would report
//! authoritative-looking noise.

pub mod error;
pub mod report;

pub use error::BacktestError;
pub use report::{BacktestResult, EquityPoint, ExecutedTrade, TradeAction};

use chrono::NaiveDate;
use configuration::BacktestParams;
use core_types::CardId;
use datastore::MarketSnapshot;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use signals::SignalSource;

/// Days of usable history required beyond the lookback window.
const MIN_TEST_DAYS: usize = 5;

/// The day-stepped simulation engine.
///
/// Generic over the signal seam: production runs hand it a
/// `signals::SignalEngine`, tests hand it scripted sources.
pub struct Backtester {
    source: Box<dyn SignalSource>,
    params: BacktestParams,
}

impl Backtester {
    pub fn new(source: Box<dyn SignalSource>, params: BacktestParams) -> Self {
        Self { source, params }
    }

    /// Simulates trading one card between `start` and `end` inclusive.
    ///
    /// Fails with [`BacktestError::InsufficientData`] when the window holds
    /// fewer than `lookback_days + 5` daily points.
    pub fn run(
        &mut self,
        snapshot: &MarketSnapshot,
        card_id: CardId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BacktestResult, BacktestError> {
        let daily = snapshot.daily_prices_between(card_id, start, end);
        if daily.is_empty() {
            return Err(BacktestError::NoData(card_id));
        }
        let need = self.params.lookback_days + MIN_TEST_DAYS;
        if daily.len() < need {
            return Err(BacktestError::InsufficientData {
                have: daily.len(),
                need,
            });
        }

        let mut capital = self.params.initial_capital;
        let mut position = Decimal::ZERO;
        let mut entry_price: Option<Decimal> = None;
        let mut trades: Vec<ExecutedTrade> = Vec::new();
        let mut equity_curve: Vec<EquityPoint> = Vec::with_capacity(daily.len());
        let mut wins = 0u32;
        let mut closed_trades = 0usize;

        let progress_bar = ProgressBar::new((daily.len() - self.params.lookback_days) as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
                .progress_chars("=>-"),
        );

        for i in self.params.lookback_days..daily.len() {
            // Signals only ever see days before the one being traded.
            let history = &daily[..i];
            let signal = self.source.evaluate(card_id, history);

            let (date, price) = daily[i];

            if signal.signal.is_buy() && position.is_zero() && price > Decimal::ZERO {
                position = capital / price;
                entry_price = Some(price);
                capital = Decimal::ZERO;
                trades.push(ExecutedTrade {
                    date,
                    action: TradeAction::Buy,
                    price,
                    quantity: position,
                });
                tracing::debug!(card_id, %date, %price, "opened position");
            } else if signal.signal.is_sell() && position > Decimal::ZERO {
                capital = position * price;
                trades.push(ExecutedTrade {
                    date,
                    action: TradeAction::Sell,
                    price,
                    quantity: position,
                });
                if let Some(entry) = entry_price.take() {
                    if price > entry {
                        wins += 1;
                    }
                    closed_trades += 1;
                }
                position = Decimal::ZERO;
                tracing::debug!(card_id, %date, %price, "closed position");
            }

            equity_curve.push(EquityPoint {
                date,
                equity: capital + position * price,
            });
            progress_bar.inc(1);
        }
        progress_bar.finish_and_clear();

        let (end_date, final_price) = daily[daily.len() - 1];
        let final_value = capital + position * final_price;
        let total_return_pct =
            (final_value - self.params.initial_capital) / self.params.initial_capital * dec!(100);
        let win_rate_pct = if closed_trades > 0 {
            Some(Decimal::from(wins) / Decimal::from(closed_trades as u64) * dec!(100))
        } else {
            None
        };

        Ok(BacktestResult {
            card_id,
            start_date: daily[0].0,
            end_date,
            initial_capital: self.params.initial_capital,
            final_value,
            total_return_pct,
            num_trades: trades.len(),
            closed_trades,
            win_rate_pct,
            max_drawdown_pct: max_drawdown_pct(&equity_curve),
            trades,
            equity_curve,
        })
    }
}

/// Worst peak-to-trough decline over the equity curve:
/// `min((equity - running_max) / running_max) * 100`, zero or negative.
fn max_drawdown_pct(equity_curve: &[EquityPoint]) -> Decimal {
    let mut peak = Decimal::ZERO;
    let mut worst = Decimal::ZERO;
    for point in equity_curve {
        if point.equity > peak {
            peak = point.equity;
        }
        if peak > Decimal::ZERO {
            let drawdown = (point.equity - peak) / peak;
            if drawdown < worst {
                worst = drawdown;
            }
        }
    }
    worst * dec!(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use core_types::{PricePoint, SignalKind};
    use rust_decimal::prelude::FromPrimitive;
    use signals::TradingSignal;

    use std::sync::{Arc, Mutex};

    /// Signal source that emits one scripted signal per evaluation (holding
    /// once the script runs out) and records the history length it was
    /// shown each day.
    struct Scripted {
        script: Vec<SignalKind>,
        calls: usize,
        seen_history_lens: Arc<Mutex<Vec<usize>>>,
    }

    impl Scripted {
        fn new(script: Vec<SignalKind>) -> Self {
            Self {
                script,
                calls: 0,
                seen_history_lens: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn always(kind: SignalKind) -> Self {
            Self::new(vec![kind; 1000])
        }

        fn history_lens(&self) -> Arc<Mutex<Vec<usize>>> {
            Arc::clone(&self.seen_history_lens)
        }
    }

    impl SignalSource for Scripted {
        fn evaluate(
            &mut self,
            card_id: CardId,
            daily: &[(NaiveDate, Decimal)],
        ) -> TradingSignal {
            self.seen_history_lens.lock().unwrap().push(daily.len());
            let kind = self
                .script
                .get(self.calls)
                .copied()
                .unwrap_or(SignalKind::Hold);
            self.calls += 1;
            let mut signal = TradingSignal::hold(card_id, "scripted");
            signal.signal = kind;
            signal
        }
    }

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 1).unwrap() + Duration::days(offset)
    }

    fn rising_snapshot(days: i64) -> MarketSnapshot {
        let listings = (0..days)
            .map(|i| PricePoint {
                card_id: 1,
                timestamp: day(i).and_hms_opt(12, 0, 0).unwrap().and_utc(),
                price: Decimal::from_f64(100.0 + i as f64).unwrap(),
                condition: "Near Mint".to_string(),
                volume: None,
            })
            .collect();
        MarketSnapshot::new(listings, vec![], vec![]).unwrap()
    }

    fn params(lookback_days: usize) -> BacktestParams {
        BacktestParams {
            lookback_days,
            initial_capital: dec!(1000),
        }
    }

    #[test]
    fn small_window_is_a_hard_error() {
        let snapshot = rising_snapshot(8);
        let mut backtester =
            Backtester::new(Box::new(Scripted::always(SignalKind::Hold)), params(5));
        let result = backtester.run(&snapshot, 1, day(0), day(7));
        assert!(matches!(
            result,
            Err(BacktestError::InsufficientData { have: 8, need: 10 })
        ));
    }

    #[test]
    fn missing_card_is_a_hard_error() {
        let snapshot = rising_snapshot(12);
        let mut backtester =
            Backtester::new(Box::new(Scripted::always(SignalKind::Hold)), params(5));
        assert!(matches!(
            backtester.run(&snapshot, 99, day(0), day(11)),
            Err(BacktestError::NoData(99))
        ));
    }

    #[test]
    fn always_buy_on_a_rising_series_buys_once_and_never_draws_down() {
        let snapshot = rising_snapshot(12);
        let mut backtester =
            Backtester::new(Box::new(Scripted::always(SignalKind::Buy)), params(5));
        let result = backtester.run(&snapshot, 1, day(0), day(11)).unwrap();

        assert_eq!(result.num_trades, 1);
        assert_eq!(result.trades[0].action, TradeAction::Buy);
        assert_eq!(result.closed_trades, 0);
        assert_eq!(result.win_rate_pct, None);
        assert!(result.total_return_pct > Decimal::ZERO);
        assert_eq!(result.max_drawdown_pct, Decimal::ZERO);
        for pair in result.equity_curve.windows(2) {
            assert!(pair[1].equity >= pair[0].equity);
        }
    }

    #[test]
    fn round_trip_on_a_rising_series_is_a_win() {
        let snapshot = rising_snapshot(12);
        let script = vec![SignalKind::Buy, SignalKind::Hold, SignalKind::StrongSell];
        let mut backtester = Backtester::new(Box::new(Scripted::new(script)), params(5));
        let result = backtester.run(&snapshot, 1, day(0), day(11)).unwrap();

        assert_eq!(result.num_trades, 2);
        assert_eq!(result.closed_trades, 1);
        assert_eq!(result.win_rate_pct, Some(dec!(100)));
        // Bought at 105, sold at 107, then flat.
        assert_eq!(result.trades[0].price, dec!(105));
        assert_eq!(result.trades[1].price, dec!(107));
    }

    #[test]
    fn runs_end_to_end_with_the_real_signal_engine() {
        use configuration::SignalParams;
        use signals::SignalEngine;

        let snapshot = rising_snapshot(45);
        let engine = SignalEngine::new(SignalParams::default());
        let mut backtester = Backtester::new(Box::new(engine), params(30));
        let result = backtester.run(&snapshot, 1, day(0), day(44)).unwrap();

        assert_eq!(result.equity_curve.len(), 15);
        assert!(result.final_value > Decimal::ZERO);
        // A steady uptrend reads bullish, so the simulation goes long.
        assert!(result.num_trades >= 1);
        assert_eq!(result.trades[0].action, TradeAction::Buy);
    }

    #[test]
    fn signals_never_see_the_traded_day() {
        let snapshot = rising_snapshot(12);
        let source = Scripted::always(SignalKind::Hold);
        let lens = source.history_lens();
        let mut backtester = Backtester::new(Box::new(source), params(5));
        backtester.run(&snapshot, 1, day(0), day(11)).unwrap();

        // Day i is traded against a history of exactly i strictly prior days.
        assert_eq!(*lens.lock().unwrap(), (5..12).collect::<Vec<_>>());
    }
}
