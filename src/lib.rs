// Core modules
pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod session;
pub mod utils;

// Re-export the types collaborating front ends consume
pub use analysis::MultiplierTable;
pub use data::{
    BinanceProvider, CandleStore, Database, HistoryFetcher, MarketDataProvider,
    SelectionStateStore, SqliteCandleStore, SqliteRangeStore,
};
pub use domain::{AssetRanges, AssetSeries, Candle, SelectionRange};
pub use session::{RangeOverrides, SessionOutcome, SessionView, run_session};

use std::sync::Arc;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use tabled::{Table, Tabled};

use crate::{
    config::{BINANCE, PERSISTENCE, WATCHED_ASSETS},
    utils::{epoch_ms_to_date_string, parse_date_to_epoch_sec},
};

// CLI argument parsing

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// SQLite database file holding candles and selection ranges
    #[arg(long, default_value_t = PERSISTENCE.db_path.to_string())]
    pub db: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Full historical backfill for every watched asset
    Update,
    /// Fetch only the most recent daily window for every watched asset
    Refresh {
        #[arg(long, default_value_t = BINANCE.history.refresh_window_days)]
        days: i32,
    },
    /// Compute trend, mean and targets for one asset using persisted ranges
    Show {
        asset: String,
        /// Regression window start (YYYY-MM-DD); requires --reg-end
        #[arg(long)]
        reg_start: Option<String>,
        /// Regression window end (YYYY-MM-DD); requires --reg-start
        #[arg(long)]
        reg_end: Option<String>,
        /// Mean window start (YYYY-MM-DD); requires --mean-end
        #[arg(long)]
        mean_start: Option<String>,
        /// Mean window end (YYYY-MM-DD); requires --mean-start
        #[arg(long)]
        mean_end: Option<String>,
        /// Display currency factor applied to all price outputs
        #[arg(long, default_value_t = 1.0)]
        scale: f64,
        /// Emit the full session view as JSON instead of a summary table
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

pub async fn run(args: Cli) -> Result<()> {
    let db = Database::open(&args.db).await?;
    let candles = SqliteCandleStore::new(&db);

    match args.command {
        Command::Update => {
            let fetcher = new_fetcher()?;
            watch_for_ctrl_c(&fetcher);
            let total = fetcher.backfill_all(&candles, WATCHED_ASSETS).await;
            log::info!("backfill complete, {total} rows committed");
        }
        Command::Refresh { days } => {
            let fetcher = new_fetcher()?;
            let total = fetcher.refresh_all(&candles, WATCHED_ASSETS, days).await;
            log::info!("refresh complete, {total} rows committed");
        }
        Command::Show {
            asset,
            reg_start,
            reg_end,
            mean_start,
            mean_end,
            scale,
            json,
        } => {
            if candles.list_assets().await?.is_empty() {
                println!("No price data found in the database. Run `range-lens update` first.");
                return Ok(());
            }

            let ranges = SqliteRangeStore::new(&db).await?;
            let overrides = RangeOverrides {
                regression: parse_range_args(&reg_start, &reg_end, "reg")?,
                mean: parse_range_args(&mean_start, &mean_end, "mean")?,
            };

            let outcome = run_session(
                &candles,
                &ranges,
                &MultiplierTable::standard(),
                &asset,
                overrides,
                scale,
            )
            .await?;

            match outcome {
                SessionOutcome::NoData => println!("No stored data for {asset}."),
                SessionOutcome::Ready(view) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&*view)?);
                    } else {
                        print_summary(&view);
                    }
                }
            }
        }
    }

    Ok(())
}

fn new_fetcher() -> Result<HistoryFetcher> {
    let provider = Arc::new(BinanceProvider::new()?);
    Ok(HistoryFetcher::new(provider, BINANCE.limits.page_pause_ms))
}

/// A long backfill is interruptible between pages; committed pages stay.
fn watch_for_ctrl_c(fetcher: &HistoryFetcher) {
    let stop = fetcher.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("interrupt received, stopping after the current page");
            stop.store(true, std::sync::atomic::Ordering::Relaxed);
        }
    });
}

fn parse_range_args(
    start: &Option<String>,
    end: &Option<String>,
    which: &str,
) -> Result<Option<SelectionRange>> {
    match (start, end) {
        (None, None) => Ok(None),
        (Some(s), Some(e)) => Ok(Some(SelectionRange::new(
            parse_date_to_epoch_sec(s)?,
            parse_date_to_epoch_sec(e)?,
        ))),
        _ => bail!("--{which}-start and --{which}-end must be given together"),
    }
}

#[derive(Tabled)]
struct StatRow {
    metric: &'static str,
    value: String,
}

fn print_summary(view: &SessionView) {
    let last_idx = view.closes.len() - 1;
    let rows = vec![
        StatRow {
            metric: "asset",
            value: view.asset.clone(),
        },
        StatRow {
            metric: "candles",
            value: format!(
                "{} ({} -> {})",
                view.closes.len(),
                epoch_ms_to_date_string(view.open_times_ms[0]),
                epoch_ms_to_date_string(view.open_times_ms[last_idx]),
            ),
        },
        StatRow {
            metric: "regression window",
            value: view.regression_range.to_string(),
        },
        StatRow {
            metric: "mean window",
            value: view.mean_range.to_string(),
        },
        StatRow {
            metric: "trend at last candle",
            value: format!("{:.2}", view.trend_line[last_idx]),
        },
        StatRow {
            metric: "mean price",
            value: format!("{:.2}", view.mean_price),
        },
        StatRow {
            metric: "multiplier",
            value: format!("{:.6}", view.multiplier),
        },
        StatRow {
            metric: "sell target (mean x k)",
            value: format!("{:.2}", view.sell_target),
        },
        StatRow {
            metric: "buy target (mean / k)",
            value: format!("{:.2}", view.buy_target),
        },
    ];

    println!("{}", Table::new(rows));
}
