use crate::signal::{SignalIndicators, TradingSignal};
use crate::SignalSource;
use chrono::{Duration, NaiveDate};
use configuration::SignalParams;
use core_types::{CardId, SignalKind};
use datastore::MarketSnapshot;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use ta::indicators::SimpleMovingAverage as Sma;
use ta::{Next, Reset};

/// Trading days per year, for annualizing daily volatility.
const TRADING_DAYS: f64 = 252.0;

/// Daily slope thresholds: +/-0.1% of the current price per day.
const SLOPE_THRESHOLD: f64 = 0.001;

const RSI_OVERSOLD: f64 = 30.0;
const RSI_OVERBOUGHT: f64 = 70.0;

/// The indicator-based signal classifier.
///
/// Holds its daily working grid and moving-average instances across calls;
/// [`SignalSource::evaluate`] resets them instead of reallocating.
pub struct SignalEngine {
    params: SignalParams,
    ma_5: Sma,
    ma_15: Sma,
    grid: Vec<f64>,
}

impl SignalEngine {
    pub fn new(params: SignalParams) -> Self {
        Self {
            params,
            // Periods are compile-time constants, so construction cannot fail.
            ma_5: Sma::new(5).unwrap(),
            ma_15: Sma::new(15).unwrap(),
            grid: Vec::new(),
        }
    }

    /// Classifies a card straight from a snapshot.
    pub fn generate(&mut self, snapshot: &MarketSnapshot, card_id: CardId) -> TradingSignal {
        let daily = snapshot.daily_prices(card_id);
        self.evaluate(card_id, &daily)
    }

    /// Rebuilds the continuous daily grid: one slot per calendar day over
    /// the trailing lookback window, forward-filled across gaps, leading
    /// gap dropped.
    fn fill_grid(&mut self, daily: &[(NaiveDate, Decimal)], end: NaiveDate) {
        self.grid.clear();
        let start = end - Duration::days(self.params.lookback_days - 1);

        let mut observations = daily
            .iter()
            .filter(|(day, _)| *day >= start && *day <= end)
            .peekable();
        let mut filled: Option<f64> = None;
        let mut day = start;
        while day <= end {
            if let Some((observed, price)) = observations.peek() {
                if *observed == day {
                    filled = price.to_f64();
                    observations.next();
                }
            }
            if let Some(price) = filled {
                self.grid.push(price);
            }
            day += Duration::days(1);
        }
    }
}

impl SignalSource for SignalEngine {
    fn evaluate(&mut self, card_id: CardId, daily: &[(NaiveDate, Decimal)]) -> TradingSignal {
        let Some(&(end, _)) = daily.last() else {
            return TradingSignal::hold(card_id, "No price history available");
        };
        self.fill_grid(daily, end);

        if self.grid.len() < 5 {
            return TradingSignal::hold(card_id, "Insufficient data (need >=5 days)");
        }

        // --- Indicators ---
        self.ma_5.reset();
        self.ma_15.reset();
        let mut ma_5 = 0.0;
        let mut ma_15 = 0.0;
        for &price in &self.grid {
            ma_5 = self.ma_5.next(price);
            ma_15 = self.ma_15.next(price);
        }

        let current_price = self.grid[self.grid.len() - 1];
        let slope = ols_slope(&self.grid);
        let slope_pct = if current_price != 0.0 {
            slope / current_price
        } else {
            0.0
        };
        let volatility_daily = return_volatility(&self.grid);
        let volatility_annual_pct = volatility_daily * TRADING_DAYS.sqrt() * 100.0;
        let rsi = tail_rsi(&self.grid, self.params.rsi_window);

        // --- Decision logic ---
        let mut bullish = 0;
        let mut bearish = 0;

        // MA crossover
        if ma_5 > ma_15 {
            bullish += 2;
        } else {
            bearish += 2;
        }

        // Trend direction
        if slope_pct > SLOPE_THRESHOLD {
            bullish += 2;
        } else if slope_pct < -SLOPE_THRESHOLD {
            bearish += 2;
        }

        // RSI extremes
        if rsi < RSI_OVERSOLD {
            bullish += 3;
        } else if rsi > RSI_OVERBOUGHT {
            bearish += 3;
        }

        // Price relative to the slow MA
        if current_price > ma_15 {
            bullish += 1;
        } else {
            bearish += 1;
        }

        let net_score: i32 = bullish - bearish;

        let (signal, reason) = if net_score >= 5 {
            (
                SignalKind::StrongBuy,
                "Multiple bullish indicators (MA crossover, trend, RSI)",
            )
        } else if net_score >= 2 {
            (SignalKind::Buy, "Bullish momentum and positive indicators")
        } else if net_score <= -5 {
            (
                SignalKind::StrongSell,
                "Multiple bearish indicators (MA crossover, trend, RSI)",
            )
        } else if net_score <= -2 {
            (SignalKind::Sell, "Bearish momentum and negative indicators")
        } else {
            (SignalKind::Hold, "Mixed indicators, no clear direction")
        };

        // --- Confidence: strong scores discounted by volatility ---
        let base_confidence = (net_score.unsigned_abs() as f64 / 6.0 * 100.0).min(100.0);
        let volatility_factor = 1.0 - (volatility_daily * TRADING_DAYS.sqrt()).min(1.0);
        let confidence = (base_confidence * volatility_factor.max(0.2)).clamp(0.0, 100.0);

        // --- Target: trend projection, clamped to +/-50% of current ---
        let projected = current_price + slope * self.params.projection_days as f64;
        let projected = projected.clamp(0.5 * current_price, 1.5 * current_price);

        tracing::debug!(card_id, net_score, %signal, confidence, "classified signal");

        TradingSignal {
            card_id,
            signal,
            confidence,
            reason: reason.to_string(),
            target_price: Decimal::from_f64(projected),
            net_score,
            indicators: Some(SignalIndicators {
                current_price,
                ma_5,
                ma_15,
                slope,
                slope_pct,
                volatility_daily,
                volatility_annual_pct,
                rsi,
                lookback_days_used: self.grid.len(),
            }),
        }
    }
}

/// Least-squares slope of `values` against their day indices.
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

/// Population standard deviation of day-over-day returns.
fn return_volatility(prices: &[f64]) -> f64 {
    let returns: Vec<f64> = prices
        .windows(2)
        .filter(|pair| pair[0] != 0.0)
        .map(|pair| pair[1] / pair[0] - 1.0)
        .collect();
    if returns.is_empty() {
        return 0.0;
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean) * (r - mean)).sum::<f64>() / n;
    variance.sqrt()
}

/// RSI from the rolling average gain and average loss over the last
/// `window` daily moves.
///
/// Degenerate windows resolve to bounded values: 100 when only gains
/// exist, 50 when the series is flat.
fn tail_rsi(prices: &[f64], window: usize) -> f64 {
    // Deltas padded so the slot count matches the price count, mirroring a
    // rolling mean over the full series.
    let mut gains = vec![0.0];
    let mut losses = vec![0.0];
    for pair in prices.windows(2) {
        let delta = pair[1] - pair[0];
        gains.push(delta.max(0.0));
        losses.push((-delta).max(0.0));
    }

    let span = window.min(gains.len());
    let avg_gain = gains[gains.len() - span..].iter().sum::<f64>() / span as f64;
    let avg_loss = losses[losses.len() - span..].iter().sum::<f64>() / span as f64;

    if avg_loss == 0.0 {
        if avg_gain > 0.0 { 100.0 } else { 50.0 }
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 1).unwrap() + Duration::days(offset)
    }

    fn series(prices: &[f64]) -> Vec<(NaiveDate, Decimal)> {
        prices
            .iter()
            .enumerate()
            .map(|(i, p)| (day(i as i64), Decimal::from_f64(*p).unwrap()))
            .collect()
    }

    fn engine() -> SignalEngine {
        SignalEngine::new(SignalParams::default())
    }

    #[test]
    fn empty_series_holds_with_zero_confidence() {
        let signal = engine().evaluate(1, &[]);
        assert_eq!(signal.signal, SignalKind::Hold);
        assert_eq!(signal.confidence, 0.0);
        assert!(signal.indicators.is_none());
    }

    #[test]
    fn short_series_holds_with_zero_confidence() {
        let signal = engine().evaluate(1, &series(&[10.0, 11.0, 12.0]));
        assert_eq!(signal.signal, SignalKind::Hold);
        assert_eq!(signal.confidence, 0.0);
        assert!(signal.reason.contains("Insufficient data"));
    }

    #[test]
    fn steady_uptrend_signals_a_buy() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let signal = engine().evaluate(1, &series(&prices));
        assert!(signal.signal.is_buy());
        assert!(signal.confidence > 0.0);

        let indicators = signal.indicators.unwrap();
        assert!(indicators.ma_5 > indicators.ma_15);
        assert!(indicators.slope > 0.9 && indicators.slope < 1.1);
    }

    #[test]
    fn steady_downtrend_signals_a_sell() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 - i as f64 * 0.5).collect();
        let signal = engine().evaluate(1, &series(&prices));
        assert!(signal.signal.is_sell());
    }

    #[test]
    fn rsi_stays_within_bounds() {
        let zigzag: Vec<f64> = (0..40)
            .map(|i| if i % 2 == 0 { 100.0 } else { 110.0 })
            .collect();
        let signal = engine().evaluate(1, &series(&zigzag));
        let rsi = signal.indicators.unwrap().rsi;
        assert!((0.0..=100.0).contains(&rsi));
    }

    #[test]
    fn gaps_are_forward_filled_onto_the_grid() {
        // Observations on days 0..4 and 9; days 5..8 fill from day 4.
        let mut daily = series(&[10.0, 10.0, 10.0, 10.0, 10.0]);
        daily.push((day(9), dec!(12)));
        let signal = engine().evaluate(1, &daily);
        let indicators = signal.indicators.unwrap();
        assert_eq!(indicators.lookback_days_used, 10);
        assert_eq!(indicators.current_price, 12.0);
    }

    #[test]
    fn target_price_is_clamped_to_half_the_current_price() {
        // A violent downtrend projects far below zero; the clamp floors the
        // target at 50% of current.
        let prices: Vec<f64> = (0..10).map(|i| 1000.0 - i as f64 * 90.0).collect();
        let signal = engine().evaluate(1, &series(&prices));
        let current = signal.indicators.as_ref().unwrap().current_price;
        let target = signal.target_price.unwrap().to_f64().unwrap();
        assert!((target - 0.5 * current).abs() < 1e-9);
    }

    #[test]
    fn flat_series_is_penalized_bearish() {
        // Ties on every indicator fall to the bearish side by construction.
        let signal = engine().evaluate(1, &series(&[10.0; 20]));
        assert_eq!(signal.signal, SignalKind::Sell);
        assert_eq!(signal.net_score, -3);
    }
}
