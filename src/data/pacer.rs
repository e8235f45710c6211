use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Enforces a fixed minimum gap between consecutive REST page requests.
///
/// Far simpler than a weight budget, but sufficient for daily-candle
/// backfills where every call costs the same.
#[derive(Clone)]
pub struct RequestPacer {
    last_request: Arc<Mutex<Option<Instant>>>,
    gap: Duration,
}

impl RequestPacer {
    pub fn new(gap_ms: u64) -> Self {
        Self {
            last_request: Arc::new(Mutex::new(None)),
            gap: Duration::from_millis(gap_ms),
        }
    }

    /// Waits until at least the configured gap has passed since the previous
    /// call, then records the new request time. Concurrent callers serialize
    /// on the shared slot, so the gap holds globally.
    pub async fn pause(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.gap {
                tokio::time::sleep(self.gap - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}
