// Range resolution and the statistics computed over selected sub-ranges.
mod range_index;
mod stats;
mod targets;

pub use {
    range_index::{nearest_index, resolve_range, slice_inclusive},
    stats::{TrendLine, compute_mean, fit_trend},
    targets::{MultiplierTable, targets},
};
