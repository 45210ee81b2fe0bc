use serde::{Deserialize, Serialize};
use std::fmt;

/// How trustworthy an aggregated price statistic is, given its sample size
/// and relative spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    None,
    Low,
    Medium,
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Confidence::None => "none",
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        };
        write!(f, "{label}")
    }
}

/// The five-valued trading signal produced by the signal engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalKind {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl SignalKind {
    /// True for `Buy` and `StrongBuy`.
    pub fn is_buy(&self) -> bool {
        matches!(self, SignalKind::Buy | SignalKind::StrongBuy)
    }

    /// True for `Sell` and `StrongSell`.
    pub fn is_sell(&self) -> bool {
        matches!(self, SignalKind::Sell | SignalKind::StrongSell)
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SignalKind::StrongBuy => "Strong Buy",
            SignalKind::Buy => "Buy",
            SignalKind::Hold => "Hold",
            SignalKind::Sell => "Sell",
            SignalKind::StrongSell => "Strong Sell",
        };
        write!(f, "{label}")
    }
}

/// Bucketed level shared by the portfolio risk scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        };
        write!(f, "{label}")
    }
}

/// Coarse direction of a card's price series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
    NotEnoughData,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TrendDirection::Up => "up",
            TrendDirection::Down => "down",
            TrendDirection::Stable => "stable",
            TrendDirection::NotEnoughData => "not enough data",
        };
        write!(f, "{label}")
    }
}

/// The grading ROI verdict for a single grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoiVerdict {
    WorthGrading,
    NotWorthGrading,
}

impl fmt::Display for RoiVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RoiVerdict::WorthGrading => "WORTH GRADING",
            RoiVerdict::NotWorthGrading => "NOT WORTH GRADING",
        };
        write!(f, "{label}")
    }
}
