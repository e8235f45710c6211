use crate::domain::{Candle, SelectionRange};

/// In-memory candle run for one asset, strictly ascending by open time.
///
/// The positional index into this sequence is the unit the range indexer and
/// the stats engine operate on.
#[derive(Debug, Clone, Default)]
pub struct AssetSeries {
    candles: Vec<Candle>,
}

impl AssetSeries {
    /// Wraps candles that are already sorted ascending (the store's load order).
    pub fn from_ascending(candles: Vec<Candle>) -> Self {
        debug_assert!(
            candles.windows(2).all(|w| w[0].open_time_ms < w[1].open_time_ms),
            "series must be strictly ascending by open time"
        );
        AssetSeries { candles }
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.candles.iter().map(|c| c.close)
    }

    /// The full available date span, used as the default selection range.
    /// `None` for an empty series.
    pub fn full_span(&self) -> Option<SelectionRange> {
        let first = self.candles.first()?;
        let last = self.candles.last()?;
        Some(SelectionRange::new(first.open_time_sec(), last.open_time_sec()))
    }
}
