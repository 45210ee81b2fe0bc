//! # Grading ROI
//!
//! Is a raw card worth sending to the graders? This crate compares the
//! ungraded market against graded sales per grade, net of the grading fee
//! and a 10%-of-raw-price friction cost, and also summarizes the graded
//! population distribution.
//!
//! ## Public API
//!
//! - `GradingRoi`: the ROI calculator.
//! - `GradingRoiReport` / `GradeRoi` / `RoiOutcome`: per-grade verdicts.
//! - `grade_statistics` / `GradeStatistics`: population distribution,
//!   PSA 10 rarity, and premium.

pub mod roi;
pub mod stats;

// Re-export the key components to create a clean, public-facing API.
pub use roi::{GradeRoi, GradingRoi, GradingRoiReport, RoiOutcome};
pub use stats::{grade_statistics, GradeBucket, GradeStatistics, PopulationRarity};
