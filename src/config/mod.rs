//! Configuration module for the range-lens application.

mod assets;
mod binance;
mod persistence;

// Re-export commonly used items
pub use assets::{AssetDef, CALIBRATION, TargetCalibration, WATCHED_ASSETS};
pub use binance::{BINANCE, BinanceApiConfig};
pub use persistence::PERSISTENCE;
