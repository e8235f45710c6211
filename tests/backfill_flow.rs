//! Backfill pipeline tests against a scripted provider and a temporary
//! SQLite database.

use std::collections::VecDeque;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

use anyhow::{Result, bail};
use async_trait::async_trait;
use tempfile::TempDir;

use range_lens::config::{AssetDef, BINANCE};
use range_lens::utils::TimeUtils;
use range_lens::{
    Candle, CandleStore, Database, HistoryFetcher, MarketDataProvider, SqliteCandleStore,
};

/// Returns pre-scripted pages in order, then empty pages forever. Records
/// the start time of every request it receives.
struct ScriptedProvider {
    pages: Mutex<VecDeque<Vec<Candle>>>,
    requested_starts: Mutex<Vec<Option<i64>>>,
    fail_symbol: Option<&'static str>,
}

impl ScriptedProvider {
    fn new(pages: Vec<Vec<Candle>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            requested_starts: Mutex::new(Vec::new()),
            fail_symbol: None,
        }
    }

    fn failing_for(pages: Vec<Vec<Candle>>, symbol: &'static str) -> Self {
        Self {
            fail_symbol: Some(symbol),
            ..Self::new(pages)
        }
    }

    fn starts(&self) -> Vec<Option<i64>> {
        self.requested_starts.lock().unwrap().clone()
    }

    fn call_count(&self) -> usize {
        self.requested_starts.lock().unwrap().len()
    }
}

#[async_trait]
impl MarketDataProvider for ScriptedProvider {
    async fn fetch_daily_candles(
        &self,
        symbol: &str,
        start_time_ms: Option<i64>,
        _limit: i32,
    ) -> Result<Vec<Candle>> {
        self.requested_starts.lock().unwrap().push(start_time_ms);
        if self.fail_symbol == Some(symbol) {
            bail!("simulated exchange failure for {symbol}");
        }
        Ok(self.pages.lock().unwrap().pop_front().unwrap_or_default())
    }
}

fn daily_candle(day: i64, close: f64) -> Candle {
    let open_time = BINANCE.history.epoch_start_ms + day * TimeUtils::MS_IN_D;
    Candle::new(open_time, close, close + 1.0, close - 1.0, close, 10.0)
}

async fn temp_store() -> (TempDir, Database, SqliteCandleStore) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("test.db");
    let db = Database::open(path.to_str().unwrap()).await.expect("open db");
    let store = SqliteCandleStore::new(&db);
    (dir, db, store)
}

#[tokio::test]
async fn backfill_commits_both_pages_then_stops_on_the_empty_page() {
    let (_dir, _db, store) = temp_store().await;

    let page1: Vec<Candle> = (0..3).map(|d| daily_candle(d, 100.0 + d as f64)).collect();
    let page2: Vec<Candle> = (3..5).map(|d| daily_candle(d, 100.0 + d as f64)).collect();
    let provider = Arc::new(ScriptedProvider::new(vec![page1.clone(), page2.clone()]));

    let fetcher = HistoryFetcher::new(provider.clone(), 0);
    let committed = fetcher.backfill(&store, "BTC", "BTCUSDT").await.unwrap();

    // Exactly the union of both pages is stored, and the empty third page
    // produced no further request or commit.
    assert_eq!(committed, 5);
    let series = store.load_series("BTC").await.unwrap();
    assert_eq!(series.len(), 5);
    let closes: Vec<f64> = series.closes().collect();
    assert_eq!(closes, vec![100.0, 101.0, 102.0, 103.0, 104.0]);

    let starts = provider.starts();
    assert_eq!(starts.len(), 3);
    assert_eq!(starts[0], Some(BINANCE.history.epoch_start_ms));
    assert_eq!(starts[1], Some(page1.last().unwrap().open_time_ms + 1));
    assert_eq!(starts[2], Some(page2.last().unwrap().open_time_ms + 1));
}

#[tokio::test]
async fn rerunning_backfill_over_full_data_leaves_the_series_unchanged() {
    let (_dir, _db, store) = temp_store().await;

    let page: Vec<Candle> = (0..4).map(|d| daily_candle(d, 50.0 + d as f64)).collect();

    for _ in 0..2 {
        let provider = Arc::new(ScriptedProvider::new(vec![page.clone()]));
        let fetcher = HistoryFetcher::new(provider, 0);
        fetcher.backfill(&store, "ETH", "ETHUSDT").await.unwrap();
    }

    let series = store.load_series("ETH").await.unwrap();
    assert_eq!(series.len(), 4);
    let closes: Vec<f64> = series.closes().collect();
    assert_eq!(closes, vec![50.0, 51.0, 52.0, 53.0]);
}

#[tokio::test]
async fn one_failing_asset_does_not_abort_the_others() {
    let (_dir, _db, store) = temp_store().await;

    let page: Vec<Candle> = (0..2).map(|d| daily_candle(d, 7.0)).collect();
    let provider = Arc::new(ScriptedProvider::failing_for(vec![page], "ETHUSDT"));
    let fetcher = HistoryFetcher::new(provider, 0);

    let catalog = [
        AssetDef { name: "ETH", symbol: "ETHUSDT" },
        AssetDef { name: "BTC", symbol: "BTCUSDT" },
    ];
    let total = fetcher.backfill_all(&store, &catalog).await;

    assert_eq!(total, 2);
    assert!(store.load_series("ETH").await.unwrap().is_empty());
    assert_eq!(store.load_series("BTC").await.unwrap().len(), 2);
}

#[tokio::test]
async fn a_raised_stop_flag_halts_before_the_next_page_request() {
    let (_dir, _db, store) = temp_store().await;

    let page: Vec<Candle> = (0..2).map(|d| daily_candle(d, 1.0)).collect();
    let provider = Arc::new(ScriptedProvider::new(vec![page]));
    let fetcher = HistoryFetcher::new(provider.clone(), 0);

    fetcher.stop_handle().store(true, Ordering::Relaxed);
    let committed = fetcher.backfill(&store, "BTC", "BTCUSDT").await.unwrap();

    assert_eq!(committed, 0);
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn refresh_upserts_the_latest_window_through_the_same_path() {
    let (_dir, _db, store) = temp_store().await;

    // Seed two days, then refresh with an overlapping revised window.
    store
        .upsert_batch("ADA", &[daily_candle(0, 1.0), daily_candle(1, 2.0)])
        .await
        .unwrap();

    let window = vec![daily_candle(1, 2.5), daily_candle(2, 3.0)];
    let provider = Arc::new(ScriptedProvider::new(vec![window]));
    let fetcher = HistoryFetcher::new(provider.clone(), 0);
    let committed = fetcher
        .refresh_latest(&store, "ADA", "ADAUSDT", 30)
        .await
        .unwrap();

    assert_eq!(committed, 2);
    // No start time on the latest-window request.
    assert_eq!(provider.starts(), vec![None]);

    let series = store.load_series("ADA").await.unwrap();
    let closes: Vec<f64> = series.closes().collect();
    assert_eq!(closes, vec![1.0, 2.5, 3.0]); // day 1 overwritten, day 2 appended
}
