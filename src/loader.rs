//! JSON table loading for the CLI.
//!
//! The analytics crates never touch files; this module is the external
//! collaborator that turns the three on-disk tables (plus an optional
//! holdings file) into an in-memory snapshot.

use anyhow::Context;
use core_types::{CardMetadata, GradedSale, PortfolioHolding, PricePoint};
use datastore::MarketSnapshot;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse {}", path.display()))
}

/// Loads the three input tables and builds a version-1 snapshot.
pub fn load_snapshot(
    price_history: &Path,
    graded_sales: &Path,
    metadata: &Path,
) -> anyhow::Result<MarketSnapshot> {
    let price_history: Vec<PricePoint> = read_json(price_history)?;
    let graded_sales: Vec<GradedSale> = read_json(graded_sales)?;
    let metadata: Vec<CardMetadata> = read_json(metadata)?;

    tracing::info!(
        listings = price_history.len(),
        graded = graded_sales.len(),
        cards = metadata.len(),
        "loaded input tables"
    );

    MarketSnapshot::new(price_history, graded_sales, metadata)
        .context("input tables failed snapshot validation")
}

/// Loads a holdings file for the portfolio commands.
pub fn load_holdings(path: &Path) -> anyhow::Result<Vec<PortfolioHolding>> {
    read_json(path)
}
