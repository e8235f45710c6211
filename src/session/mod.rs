//! One interactive session step: load a stored series, resolve the
//! regression/mean date ranges, run the stats engine and target calculator,
//! and persist the resolved ranges so the next session restores them.
//!
//! A concurrent backfill writing the same asset is not coordinated with a
//! session read; the loaded series may then reflect a partially updated
//! history (per-row upserts are atomic, batches are not isolated).

use anyhow::Result;
use serde::Serialize;

use crate::{
    analysis::{MultiplierTable, compute_mean, fit_trend, resolve_range, slice_inclusive, targets},
    data::{CandleStore, SelectionStateStore},
    domain::{AssetRanges, SelectionRange},
};

/// Date ranges supplied by the front end for this render, when the user
/// moved a control. Anything left `None` falls back to the persisted range,
/// then to the full series span.
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeOverrides {
    pub regression: Option<SelectionRange>,
    pub mean: Option<SelectionRange>,
}

/// Everything a front end needs to render one asset. All price-valued
/// numbers are already scaled by the caller's display factor; the stored
/// unit never leaves the engine unscaled mid-computation.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub asset: String,
    pub open_times_ms: Vec<i64>,
    pub closes: Vec<f64>,
    /// The fitted trend evaluated at every series position.
    pub trend_line: Vec<f64>,
    pub mean_price: f64,
    pub multiplier: f64,
    pub sell_target: f64,
    pub buy_target: f64,
    pub regression_range: SelectionRange,
    pub mean_range: SelectionRange,
    /// Resolved inclusive positions, for range markers.
    pub regression_bounds: (usize, usize),
    pub mean_bounds: (usize, usize),
}

/// Outcome of a session request. Absence of data is an explicit state,
/// never a fabricated default series.
#[derive(Debug)]
pub enum SessionOutcome {
    NoData,
    Ready(Box<SessionView>),
}

pub async fn run_session(
    candles: &dyn CandleStore,
    ranges: &dyn SelectionStateStore,
    multipliers: &MultiplierTable,
    asset: &str,
    overrides: RangeOverrides,
    display_scale: f64,
) -> Result<SessionOutcome> {
    let series = candles.load_series(asset).await?;
    let Some(full_span) = series.full_span() else {
        log::warn!("no stored candles for {asset}");
        return Ok(SessionOutcome::NoData);
    };

    let persisted = ranges.load(asset).await?.unwrap_or(AssetRanges {
        regression: full_span,
        mean: full_span,
    });
    let regression_range = overrides.regression.unwrap_or(persisted.regression);
    let mean_range = overrides.mean.unwrap_or(persisted.mean);

    let regression_bounds = resolve_range(&series, &regression_range)?;
    let mean_bounds = resolve_range(&series, &mean_range)?;

    let trend = fit_trend(slice_inclusive(&series, regression_bounds.0, regression_bounds.1)?)?;
    let mean_price = compute_mean(slice_inclusive(&series, mean_bounds.0, mean_bounds.1)?)?;

    let multiplier = multipliers.for_asset(asset);
    let (sell_target, buy_target) = targets(mean_price, multiplier)?;

    // Persist the resolved selections so the next session restores them.
    ranges
        .save(
            asset,
            &AssetRanges {
                regression: regression_range,
                mean: mean_range,
            },
        )
        .await?;

    let view = SessionView {
        asset: asset.to_string(),
        open_times_ms: series.candles().iter().map(|c| c.open_time_ms).collect(),
        closes: series.closes().map(|v| v * display_scale).collect(),
        trend_line: trend
            .project(series.len())
            .into_iter()
            .map(|v| v * display_scale)
            .collect(),
        mean_price: mean_price * display_scale,
        multiplier,
        sell_target: sell_target * display_scale,
        buy_target: buy_target * display_scale,
        regression_range,
        mean_range,
        regression_bounds,
        mean_bounds,
    };

    Ok(SessionOutcome::Ready(Box::new(view)))
}
