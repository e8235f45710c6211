use anyhow::{Result, ensure};

use crate::domain::{AssetSeries, Candle, SelectionRange};

/// Position in `series` whose open time lies closest to `target_ms` by
/// absolute distance. Exact ties resolve to the earlier candle, which keeps
/// marker anchoring and slice boundaries deterministic.
pub fn nearest_index(series: &AssetSeries, target_ms: i64) -> Result<usize> {
    ensure!(!series.is_empty(), "cannot locate a date in an empty series");

    let mut best = 0usize;
    let mut best_dist = i64::MAX;
    for (idx, candle) in series.candles().iter().enumerate() {
        let dist = (candle.open_time_ms - target_ms).abs();
        if dist < best_dist {
            best = idx;
            best_dist = dist;
        }
    }
    Ok(best)
}

/// The contiguous candle run from `start_idx` to `end_idx` inclusive.
/// Inverted bounds are a contract violation, not a request to reverse.
pub fn slice_inclusive(
    series: &AssetSeries,
    start_idx: usize,
    end_idx: usize,
) -> Result<&[Candle]> {
    ensure!(
        start_idx <= end_idx,
        "inverted slice bounds: start {start_idx} > end {end_idx}"
    );
    ensure!(
        end_idx < series.len(),
        "slice end {end_idx} outside series of {} rows",
        series.len()
    );
    Ok(&series.candles()[start_idx..=end_idx])
}

/// Maps a persisted date range onto series positions. A user range whose
/// endpoints resolve out of order is rejected rather than silently swapped.
pub fn resolve_range(series: &AssetSeries, range: &SelectionRange) -> Result<(usize, usize)> {
    let start = nearest_index(series, range.start_ms())?;
    let end = nearest_index(series, range.end_ms())?;
    ensure!(
        start <= end,
        "range {range} resolves to inverted positions ({start} > {end})"
    );
    Ok((start, end))
}
