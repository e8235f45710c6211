use serde::{Deserialize, Serialize};

use crate::utils::epoch_sec_to_date_string;

/// A user-selected calendar date range, stored as epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRange {
    pub start_sec: i64,
    pub end_sec: i64,
}

impl SelectionRange {
    pub fn new(start_sec: i64, end_sec: i64) -> Self {
        SelectionRange { start_sec, end_sec }
    }

    pub fn start_ms(&self) -> i64 {
        self.start_sec * 1000
    }

    pub fn end_ms(&self) -> i64 {
        self.end_sec * 1000
    }
}

impl std::fmt::Display for SelectionRange {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} -> {}",
            epoch_sec_to_date_string(self.start_sec),
            epoch_sec_to_date_string(self.end_sec)
        )
    }
}

/// The pair of persisted ranges a session keeps per asset.
///
/// Saved and overwritten as a unit; no history of earlier selections is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRanges {
    pub regression: SelectionRange,
    pub mean: SelectionRange,
}
