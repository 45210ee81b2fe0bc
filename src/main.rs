mod loader;

use aggregator::{PriceAggregator, PriceScope};
use analytics::MarketAnalytics;
use backtester::Backtester;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use comfy_table::Table;
use configuration::AnalysisConfig;
use core_types::display::{format_currency, format_percent};
use grading::{grade_statistics, GradingRoi, RoiOutcome};
use portfolio::PortfolioAnalytics;
use risk::RiskAnalyzer;
use signals::SignalEngine;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// The main entry point for the cardquant analytics CLI.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

/// Card price analytics: market stats, portfolio risk, grading ROI, trading
/// signals, and backtests.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the ungraded price-history table (JSON).
    #[arg(long, default_value = "data/price_history.json")]
    price_history: PathBuf,

    /// Path to the graded-sale table (JSON).
    #[arg(long, default_value = "data/graded_sales.json")]
    graded_sales: PathBuf,

    /// Path to the card metadata table (JSON).
    #[arg(long, default_value = "data/cards.json")]
    metadata: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Market-wide valuation, change, best set, movers, and activity.
    Market {
        /// Trailing window in days for change, best set, and movers.
        #[arg(long, default_value_t = 30)]
        days: i64,

        /// How many top movers to show (ties at the cutoff are kept).
        #[arg(long, default_value_t = 10)]
        movers: usize,
    },

    /// Outlier-filtered price statistics for one card.
    Aggregate {
        #[arg(long)]
        card: i64,

        /// Restrict to one listing condition (e.g. "Near Mint").
        #[arg(long)]
        condition: Option<String>,

        /// Aggregate the graded table for this grade label instead
        /// (e.g. "psa10").
        #[arg(long)]
        grade: Option<String>,

        /// Trailing window in days.
        #[arg(long)]
        days: Option<i64>,
    },

    /// Portfolio valuation, gain/loss, and risk scores.
    Portfolio {
        /// Path to the holdings file (JSON).
        #[arg(long, default_value = "data/holdings.json")]
        holdings: PathBuf,

        /// Trailing window in days for change and deltas.
        #[arg(long)]
        days: Option<i64>,
    },

    /// Grading ROI and grade-population statistics for one card.
    Roi {
        #[arg(long)]
        card: i64,

        /// Ungraded condition the comparison is anchored on.
        #[arg(long)]
        condition: Option<String>,
    },

    /// Technical-indicator trading signal for one card.
    Signal {
        #[arg(long)]
        card: i64,
    },

    /// Day-stepped signal backtest for one card.
    Backtest {
        #[arg(long)]
        card: i64,

        /// Start date (YYYY-MM-DD).
        #[arg(long)]
        from: NaiveDate,

        /// End date (YYYY-MM-DD).
        #[arg(long)]
        to: NaiveDate,
    },
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config_or_default();
    let snapshot = loader::load_snapshot(&cli.price_history, &cli.graded_sales, &cli.metadata)?;

    match cli.command {
        Commands::Market { days, movers } => {
            let analytics = MarketAnalytics::new();

            let total = analytics.total_value(&snapshot);
            println!("Total market value: {}", total.formatted);

            let change = analytics.change(&snapshot, Some(days));
            println!(
                "{days}d change: {} ({})",
                change.formatted_pct, change.formatted_value
            );

            match analytics.best_performing_set(&snapshot, days) {
                Some(best) => println!(
                    "Best performing set: {} ({}, {} cards)",
                    best.set_name,
                    format_percent(best.aggregate_change_pct),
                    best.cards_measured
                ),
                None => println!("Best performing set: no data"),
            }

            let activity = analytics.active_listings(&snapshot, days);
            let basis = if activity.from_volume {
                "volume"
            } else {
                "observations"
            };
            println!("Active listings ({basis}): {}", activity.count);

            let mut table = Table::new();
            table.set_header(vec!["Card", "Set", "Price", "Change", "%"]);
            for mover in analytics.top_movers(&snapshot, days, movers, None) {
                table.add_row(vec![
                    mover.name,
                    mover.set_name,
                    format_currency(mover.current_price),
                    format_currency(mover.price_change),
                    format_percent(mover.pct_change),
                ]);
            }
            println!("\nTop movers ({days}d):\n{table}");
        }

        Commands::Aggregate {
            card,
            condition,
            grade,
            days,
        } => {
            let scope = match grade.as_deref() {
                Some(grade) => PriceScope::Graded { grade },
                None => PriceScope::Ungraded {
                    condition: condition.as_deref(),
                },
            };
            let stat = PriceAggregator::new().aggregate(&snapshot, card, scope, days);
            println!("Sample size: {}", stat.sample_size);
            println!("Average:     {}", format_currency(stat.average));
            println!("Median:      {}", format_currency(stat.median));
            println!("Min:         {}", format_currency(stat.min));
            println!("Max:         {}", format_currency(stat.max));
            println!("Confidence:  {}", stat.confidence);
        }

        Commands::Portfolio { holdings, days } => {
            let holdings = loader::load_holdings(&holdings)?;
            let analytics = PortfolioAnalytics::new();
            let risk = RiskAnalyzer::new();

            let value = analytics.total_value(&snapshot, &holdings, days);
            println!("Total value: {}", value.formatted);
            if let Some(change_pct) = value.change_pct {
                println!("Change:      {}", format_percent(change_pct));
            }

            let gain = analytics.gain_loss(&snapshot, &holdings, days);
            println!(
                "Gain/loss:   {} ({})",
                gain.formatted,
                format_percent(gain.gain_loss_pct)
            );

            let count = analytics.card_count(&snapshot, &holdings, days);
            println!(
                "Cards:       {} ({} unique)",
                count.formatted, count.unique_cards
            );

            let average = analytics.average_card_value(&snapshot, &holdings);
            println!("Average:     {}", average.formatted);

            let twr = analytics.time_weighted_return(&snapshot, &holdings, days);
            println!(
                "TWR:         {} over {} cards",
                format_percent(twr.return_pct),
                twr.cards_measured
            );

            let diversity = risk.diversity_score(&snapshot, &holdings);
            println!(
                "\nDiversity:  {:.1} ({}) - {}",
                diversity.score, diversity.level, diversity.description
            );
            let volatility = risk.volatility_rating(&snapshot, &holdings);
            println!(
                "Volatility: {:.1}% ({}) - {}",
                volatility.volatility_pct, volatility.level, volatility.description
            );
            let exposure = risk.market_exposure(&snapshot, &holdings);
            println!(
                "Exposure:   max {:.1}%, top3 {:.1}% ({}) - {}",
                exposure.max_position_pct, exposure.top3_pct, exposure.level, exposure.description
            );
        }

        Commands::Roi { card, condition } => {
            let report = GradingRoi::new().analyze(
                &snapshot,
                card,
                condition.as_deref(),
                config.grading.grading_cost,
            );
            println!(
                "Ungraded average: {} ({} sales{})",
                format_currency(report.ungraded_avg),
                report.ungraded_sales,
                if report.used_graded_proxy {
                    ", graded proxy"
                } else {
                    ""
                }
            );
            for grade in &report.grades {
                match &grade.outcome {
                    RoiOutcome::NoGradedSales => {
                        println!("PSA {}: no graded sales for this grade", grade.grade);
                    }
                    RoiOutcome::Evaluated {
                        graded_avg,
                        sales,
                        roi,
                        roi_pct,
                        verdict,
                    } => {
                        println!(
                            "PSA {}: avg {} over {} sales, ROI {} ({}) | {}",
                            grade.grade,
                            format_currency(*graded_avg),
                            sales,
                            format_currency(*roi),
                            format_percent(*roi_pct),
                            verdict
                        );
                    }
                }
            }

            let stats = grade_statistics(&snapshot, card);
            println!("\nGraded population: {} sales", stats.total_graded);
            for bucket in &stats.distribution {
                println!(
                    "  {}: {} ({:.1}%)",
                    bucket.bucket, bucket.count, bucket.percentage
                );
            }
            println!(
                "PSA 10 rarity: {:.1}% ({}), average grade {:.1}, premium {}",
                stats.psa10_rarity_pct,
                stats.rarity,
                stats.average_grade,
                format_percent(stats.psa10_premium_pct)
            );
        }

        Commands::Signal { card } => {
            let mut engine = SignalEngine::new(config.signals.clone());
            let signal = engine.generate(&snapshot, card);
            let trend = MarketAnalytics::new().card_trend(&snapshot, card);
            println!("Signal:     {}", signal.signal);
            println!("Trend:      {trend}");
            println!("Confidence: {:.1}", signal.confidence);
            println!("Reason:     {}", signal.reason);
            println!("Net score:  {}", signal.net_score);
            if let Some(target) = signal.target_price {
                println!("Target:     {}", format_currency(target));
            }
            if let Some(ind) = signal.indicators {
                println!(
                    "Indicators: MA5 {:.2}, MA15 {:.2}, slope {:.4}/day, vol {:.2}%/yr, RSI {:.1} ({} days)",
                    ind.ma_5,
                    ind.ma_15,
                    ind.slope,
                    ind.volatility_annual_pct,
                    ind.rsi,
                    ind.lookback_days_used
                );
            }
        }

        Commands::Backtest { card, from, to } => {
            let engine = SignalEngine::new(config.signals.clone());
            let mut backtester = Backtester::new(Box::new(engine), config.backtest.clone());
            let result = backtester.run(&snapshot, card, from, to)?;

            println!(
                "Backtest {} from {} to {}",
                card, result.start_date, result.end_date
            );
            println!(
                "Final value: {} (return {})",
                format_currency(result.final_value),
                format_percent(result.total_return_pct)
            );
            println!(
                "Trades: {} ({} closed), win rate: {}",
                result.num_trades,
                result.closed_trades,
                result
                    .win_rate_pct
                    .map_or("n/a".to_string(), |w| format!("{w:.1}%"))
            );
            println!("Max drawdown: {:.2}%", result.max_drawdown_pct);

            let mut table = Table::new();
            table.set_header(vec!["Date", "Action", "Price", "Quantity"]);
            for trade in &result.trades {
                table.add_row(vec![
                    trade.date.to_string(),
                    format!("{:?}", trade.action),
                    format_currency(trade.price),
                    format!("{:.4}", trade.quantity),
                ]);
            }
            println!("\n{table}");
        }
    }

    Ok(())
}

/// Loads config.toml when present, falling back to the engine defaults.
fn load_config_or_default() -> AnalysisConfig {
    match configuration::load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::info!("using default configuration ({e})");
            AnalysisConfig::default()
        }
    }
}
