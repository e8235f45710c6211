//! Watched-asset catalog and target-multiplier calibration.

/// One tracked asset: the name used for storage/display and the exchange symbol.
pub struct AssetDef {
    pub name: &'static str,
    pub symbol: &'static str,
}

pub const WATCHED_ASSETS: &[AssetDef] = &[
    AssetDef { name: "BTC", symbol: "BTCUSDT" },
    AssetDef { name: "ETH", symbol: "ETHUSDT" },
    AssetDef { name: "ADA", symbol: "ADAUSDT" },
    AssetDef { name: "AVAX", symbol: "AVAXUSDT" },
];

/// Named inputs the per-asset target multiplier is derived from.
///
/// The multiplier itself is `(1 - mean_drift_pct)^drift_periods * fee_haircut^2`,
/// computed once at startup (see `analysis::MultiplierTable`).
pub struct TargetCalibration {
    pub mean_drift_pct: f64,
    pub drift_periods: i32,
    pub fee_haircut: f64,
    /// Used for any asset missing from the catalog.
    pub fallback_multiplier: f64,
}

pub const CALIBRATION: TargetCalibration = TargetCalibration {
    mean_drift_pct: 0.01693333333,
    drift_periods: 4,
    fee_haircut: 0.95,
    fallback_multiplier: 1.5,
};
