use {
    anyhow::{Context, Result},
    std::sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use crate::{
    config::{AssetDef, BINANCE},
    data::{CandleStore, MarketDataProvider, RequestPacer},
    utils::epoch_ms_to_date_string,
};

/// Drives the candle store from a market-data provider: full historical
/// backfill with forward pagination, and an incremental latest-window refresh.
pub struct HistoryFetcher {
    provider: Arc<dyn MarketDataProvider>,
    pacer: RequestPacer,
    stop: Arc<AtomicBool>,
}

impl HistoryFetcher {
    pub fn new(provider: Arc<dyn MarketDataProvider>, page_pause_ms: u64) -> Self {
        Self {
            provider,
            pacer: RequestPacer::new(page_pause_ms),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared flag a caller can set to interrupt a running backfill. The
    /// flag is checked right before each page request; pages already
    /// committed stay committed.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    /// Pages through all available history for one asset, from the fixed
    /// epoch forward. Each page is committed before the next is requested,
    /// so a crash mid-backfill loses nothing and a rerun upserts the same
    /// rows idempotently. The first empty page terminates the walk.
    ///
    /// Returns the number of rows committed.
    pub async fn backfill(
        &self,
        store: &dyn CandleStore,
        asset: &str,
        symbol: &str,
    ) -> Result<u64> {
        let mut cursor = BINANCE.history.epoch_start_ms;
        let mut committed: u64 = 0;

        loop {
            if self.stop.load(Ordering::Relaxed) {
                log::info!(
                    "{asset}: backfill interrupted at {}, {committed} rows committed",
                    epoch_ms_to_date_string(cursor)
                );
                break;
            }

            self.pacer.pause().await;

            let page = self
                .provider
                .fetch_daily_candles(symbol, Some(cursor), BINANCE.limits.klines_limit)
                .await
                .with_context(|| {
                    format!(
                        "{asset}: klines page starting {} failed",
                        epoch_ms_to_date_string(cursor)
                    )
                })?;

            let Some(last) = page.last() else {
                break; // no candles past the cursor, history is complete
            };

            // Advance one unit past the last open time; startTime is inclusive.
            let next_cursor = last.open_time_ms + 1;
            committed += store.upsert_batch(asset, &page).await?;

            log::info!(
                "{asset}: committed {} rows up to {}",
                page.len(),
                epoch_ms_to_date_string(last.open_time_ms)
            );
            cursor = next_cursor;
        }

        Ok(committed)
    }

    /// Incremental variant: fetches only the most recent `window_days`
    /// candles (clamped to one API page) through the same upsert path, so
    /// reruns are idempotent regardless of overlap with stored data.
    pub async fn refresh_latest(
        &self,
        store: &dyn CandleStore,
        asset: &str,
        symbol: &str,
        window_days: i32,
    ) -> Result<u64> {
        let limit = window_days.clamp(1, BINANCE.limits.klines_limit);

        self.pacer.pause().await;
        let page = self
            .provider
            .fetch_daily_candles(symbol, None, limit)
            .await
            .with_context(|| format!("{asset}: latest-window fetch failed"))?;

        let committed = store.upsert_batch(asset, &page).await?;
        log::info!("{asset}: refreshed {committed} recent rows");
        Ok(committed)
    }

    /// Full backfill across the catalog. One asset's failure is logged and
    /// does not abort the rest; partial data already committed is retained.
    pub async fn backfill_all(&self, store: &dyn CandleStore, catalog: &[AssetDef]) -> u64 {
        let mut total: u64 = 0;
        for asset in catalog {
            match self.backfill(store, asset.name, asset.symbol).await {
                Ok(rows) => total += rows,
                Err(e) => log::error!("{}: backfill aborted: {e:#}", asset.name),
            }
        }
        total
    }

    /// Latest-window refresh across the catalog, same failure isolation.
    pub async fn refresh_all(
        &self,
        store: &dyn CandleStore,
        catalog: &[AssetDef],
        window_days: i32,
    ) -> u64 {
        let mut total: u64 = 0;
        for asset in catalog {
            match self
                .refresh_latest(store, asset.name, asset.symbol, window_days)
                .await
            {
                Ok(rows) => total += rows,
                Err(e) => log::error!("{}: refresh failed: {e:#}", asset.name),
            }
        }
        total
    }
}
