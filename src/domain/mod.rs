// Domain types and value objects
mod candle;
mod selection;
mod series;

// Re-export commonly used types
pub use candle::Candle;
pub use selection::{AssetRanges, SelectionRange};
pub use series::AssetSeries;
