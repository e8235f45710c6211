use std::collections::HashMap;

use anyhow::{Result, ensure};

use crate::config::{CALIBRATION, WATCHED_ASSETS};

/// Per-asset target multipliers, derived once at startup from the named
/// calibration constants. Assets outside the table use the fallback value.
pub struct MultiplierTable {
    by_asset: HashMap<&'static str, f64>,
    fallback: f64,
}

impl MultiplierTable {
    pub fn standard() -> Self {
        let c = &CALIBRATION;
        let derived = (1.0 - c.mean_drift_pct).powi(c.drift_periods) * c.fee_haircut * c.fee_haircut;

        let by_asset = WATCHED_ASSETS.iter().map(|a| (a.name, derived)).collect();
        Self {
            by_asset,
            fallback: c.fallback_multiplier,
        }
    }

    /// A fixed multiplier for every asset. Useful for collaborating front
    /// ends that want to preview alternative calibrations.
    pub fn uniform(multiplier: f64) -> Self {
        Self {
            by_asset: HashMap::new(),
            fallback: multiplier,
        }
    }

    pub fn for_asset(&self, asset: &str) -> f64 {
        self.by_asset.get(asset).copied().unwrap_or(self.fallback)
    }
}

/// Sell and buy targets bracketing `mean`: `(mean * k, mean / k)`.
///
/// The multiplier is defined as a positive real derived from probabilities
/// in (0, 1); zero or negative values are a contract violation.
pub fn targets(mean: f64, multiplier: f64) -> Result<(f64, f64)> {
    ensure!(
        multiplier > 0.0,
        "multiplier must be positive, got {multiplier}"
    );
    Ok((mean * multiplier, mean / multiplier))
}
