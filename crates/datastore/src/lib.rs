//! # Market Snapshot Store
//!
//! This crate owns the immutable, versioned view of the three input tables
//! (ungraded price history, graded sales, card metadata) that every
//! analytics crate computes against.
//!
//! ## Architectural Principles
//!
//! - **Explicit snapshot injection:** There is no process-wide table state.
//!   Callers construct a [`MarketSnapshot`] and pass it into every analytics
//!   call, so a data refresh can never be observed mid-computation.
//! - **Versioned for caching:** Each snapshot carries a monotonically
//!   increasing version. Derived-value caches key on it, which makes stale
//!   results structurally impossible after a refresh.
//! - **Read-only:** Once built, a snapshot is append-only history frozen in
//!   place; refreshing produces a new snapshot with a bumped version.

pub mod error;
pub mod snapshot;

// Re-export the key components to create a clean, public-facing API.
pub use error::SnapshotError;
pub use snapshot::MarketSnapshot;
