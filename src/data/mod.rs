mod bn_kline;
mod fetcher;
mod pacer;
mod provider;
mod ranges;
mod store;

pub use {
    fetcher::HistoryFetcher,
    pacer::RequestPacer,
    provider::{BinanceProvider, MarketDataProvider},
    ranges::{SelectionStateStore, SqliteRangeStore},
    store::{CandleStore, Database, SqliteCandleStore},
};
