use core_types::CardId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BacktestError {
    #[error("No price data for card {0} in the requested period")]
    NoData(CardId),

    #[error("Not enough data in the selected period: have {have} daily points, need at least {need}")]
    InsufficientData { have: usize, need: usize },

    #[error("Progress bar template error: {0}")]
    ProgressBarTemplate(String),
}

impl From<indicatif::style::TemplateError> for BacktestError {
    fn from(error: indicatif::style::TemplateError) -> Self {
        BacktestError::ProgressBarTemplate(error.to_string())
    }
}
