use anyhow::{Result, ensure};

use crate::domain::Candle;

/// An ordinary-least-squares line of close price against integer position.
///
/// Position 0 is the first row of the slice the line was fitted on. The line
/// is routinely evaluated at positions of the *full* series, i.e. it
/// extrapolates outside the fitted window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    pub fn value_at(&self, position: usize) -> f64 {
        self.intercept + self.slope * position as f64
    }

    /// The line sampled at every position of a series of `len` rows.
    pub fn project(&self, len: usize) -> Vec<f64> {
        (0..len).map(|i| self.value_at(i)).collect()
    }
}

/// Fits close price against position within `slice` by least squares.
///
/// A single-row slice has no defined slope and degrades to a flat line at
/// that row's close. An empty slice indicates an upstream indexing bug and
/// is rejected.
pub fn fit_trend(slice: &[Candle]) -> Result<TrendLine> {
    ensure!(!slice.is_empty(), "regression slice is empty");

    if slice.len() == 1 {
        return Ok(TrendLine {
            slope: 0.0,
            intercept: slice[0].close,
        });
    }

    let n = slice.len() as f64;
    let mean_x = (slice.len() - 1) as f64 / 2.0;
    let mean_y: f64 = slice.iter().map(|c| c.close).sum::<f64>() / n;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, candle) in slice.iter().enumerate() {
        let dx = i as f64 - mean_x;
        numerator += dx * (candle.close - mean_y);
        denominator += dx * dx;
    }

    // denominator > 0 whenever the slice has two or more distinct positions
    let slope = numerator / denominator;
    Ok(TrendLine {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

/// Arithmetic mean of close over the slice. An empty slice is an error, not
/// a silent zero.
pub fn compute_mean(slice: &[Candle]) -> Result<f64> {
    ensure!(!slice.is_empty(), "mean slice is empty");
    Ok(slice.iter().map(|c| c.close).sum::<f64>() / slice.len() as f64)
}
