use {
    binance_sdk::spot::rest_api::KlinesItemInner,
    std::{error::Error, fmt},
};

use crate::domain::Candle;

/// A kline row that cannot be turned into a complete candle. The session
/// stats require a close price, so partial rows are rejected rather than
/// defaulted.
#[derive(Debug)]
pub enum KlineParseError {
    InvalidLength,
    InvalidField(&'static str),
}

impl fmt::Display for KlineParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KlineParseError::InvalidLength => write!(f, "kline row too short"),
            KlineParseError::InvalidField(name) => {
                write!(f, "kline field '{}' missing or not numeric", name)
            }
        }
    }
}

impl Error for KlineParseError {}

fn field_to_f64(item: Option<KlinesItemInner>, name: &'static str) -> Result<f64, KlineParseError> {
    match item {
        Some(KlinesItemInner::String(s)) => {
            s.parse::<f64>().map_err(|_| KlineParseError::InvalidField(name))
        }
        _ => Err(KlineParseError::InvalidField(name)),
    }
}

/// Converts one raw kline row into a candle. Only the first six fields
/// (open time and OHLCV) are consumed; the rest of the row is ignored.
pub(crate) fn candle_from_kline_row(
    row: Vec<KlinesItemInner>,
) -> Result<Candle, KlineParseError> {
    let mut items = row.into_iter();

    let open_time_ms = match items.next().ok_or(KlineParseError::InvalidLength)? {
        KlinesItemInner::Integer(ms) => ms,
        _ => return Err(KlineParseError::InvalidField("open_time")),
    };

    let open = field_to_f64(items.next(), "open")?;
    let high = field_to_f64(items.next(), "high")?;
    let low = field_to_f64(items.next(), "low")?;
    let close = field_to_f64(items.next(), "close")?;
    let volume = field_to_f64(items.next(), "volume")?;

    Ok(Candle::new(open_time_ms, open, high, low, close, volume))
}

pub(crate) fn candles_from_kline_rows(
    rows: Vec<Vec<KlinesItemInner>>,
) -> Result<Vec<Candle>, KlineParseError> {
    rows.into_iter().map(candle_from_kline_row).collect()
}
