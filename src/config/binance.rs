pub struct BinanceApiConfig {
    pub timeout_ms: u64,
    pub retries: u32,
    pub backoff_ms: u64,
}

impl Default for BinanceApiConfig {
    fn default() -> Self {
        Self {
            timeout_ms: BINANCE.client.timeout_ms,
            retries: BINANCE.client.retries,
            backoff_ms: BINANCE.client.backoff_ms,
        }
    }
}

/// REST constraints: klines page size and the pause between page requests.
pub struct RestLimits {
    pub klines_limit: i32,
    pub page_pause_ms: u64,
}

/// Backfill window: where history starts and how wide the incremental refresh is.
pub struct HistoryConfig {
    pub epoch_start_ms: i64,
    pub refresh_window_days: i32,
}

pub struct ClientDefaults {
    pub timeout_ms: u64,
    pub retries: u32,
    pub backoff_ms: u64,
}

pub struct BinanceConfig {
    pub limits: RestLimits,
    pub history: HistoryConfig,
    pub client: ClientDefaults,
}

pub const BINANCE: BinanceConfig = BinanceConfig {
    limits: RestLimits {
        klines_limit: 1000,
        page_pause_ms: 250,
    },
    history: HistoryConfig {
        epoch_start_ms: 1_483_228_800_000, // 2017-01-01, predates every listed pair
        refresh_window_days: 90,
    },
    client: ClientDefaults {
        timeout_ms: 5000,
        retries: 5,
        backoff_ms: 5000,
    },
};
