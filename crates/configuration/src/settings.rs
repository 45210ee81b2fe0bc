use crate::error::ConfigError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// The root configuration structure for the analytics engine.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub grading: GradingParams,
    pub signals: SignalParams,
    pub backtest: BacktestParams,
}

impl AnalysisConfig {
    /// Rejects parameter combinations the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.signals.rsi_window == 0 {
            return Err(ConfigError::ValidationError(
                "signals.rsi_window must be greater than 0".to_string(),
            ));
        }
        if self.signals.lookback_days < 5 {
            return Err(ConfigError::ValidationError(
                "signals.lookback_days must be at least 5".to_string(),
            ));
        }
        if self.backtest.lookback_days == 0 {
            return Err(ConfigError::ValidationError(
                "backtest.lookback_days must be greater than 0".to_string(),
            ));
        }
        if self.backtest.initial_capital <= Decimal::ZERO {
            return Err(ConfigError::ValidationError(
                "backtest.initial_capital must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parameters for the grading ROI comparison.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GradingParams {
    /// Cost of submitting one card for grading.
    pub grading_cost: Decimal,
}

impl Default for GradingParams {
    fn default() -> Self {
        Self {
            grading_cost: dec!(20),
        }
    }
}

/// Parameters for the technical-indicator signal engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SignalParams {
    /// Length of the continuous daily window the indicators are computed over.
    pub lookback_days: i64,
    /// RSI averaging window, in daily periods.
    pub rsi_window: usize,
    /// How far ahead the target price is projected along the trend slope.
    pub projection_days: i64,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            lookback_days: 90,
            rsi_window: 14,
            projection_days: 30,
        }
    }
}

/// Parameters for a backtest run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BacktestParams {
    /// Days of history each simulated day's signal is computed from.
    pub lookback_days: usize,
    /// Starting capital for the simulation.
    pub initial_capital: Decimal,
}

impl Default for BacktestParams {
    fn default() -> Self {
        Self {
            lookback_days: 30,
            initial_capital: dec!(1000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_rsi_window_is_rejected() {
        let mut config = AnalysisConfig::default();
        config.signals.rsi_window = 0;
        assert!(config.validate().is_err());
    }
}
