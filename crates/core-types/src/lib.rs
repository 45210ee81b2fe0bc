pub mod display;
pub mod enums;
pub mod grade;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{Confidence, RiskLevel, RoiVerdict, SignalKind, TrendDirection};
pub use grade::parse_psa_grade;
pub use structs::{CardId, CardMetadata, GradedSale, PortfolioHolding, PricePoint};
