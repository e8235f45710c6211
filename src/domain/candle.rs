use serde::{Deserialize, Serialize};

/// One day's aggregated open/high/low/close/volume for an asset.
///
/// `open_time_ms` is the exchange's open timestamp in epoch milliseconds and
/// acts as the per-asset primary key: at most one candle exists per open time,
/// and a re-ingested candle overwrites the stored one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open_time_ms: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(open_time_ms: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Candle {
            open_time_ms,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    pub fn open_time_sec(&self) -> i64 {
        self.open_time_ms / 1000
    }
}
