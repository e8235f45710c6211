use {
    anyhow::Result,
    async_trait::async_trait,
    binance_sdk::{
        config::ConfigurationRestApi,
        errors::{self, ConnectorError},
        spot::{
            SpotRestApi,
            rest_api::{KlinesIntervalEnum, KlinesParams, RestApi},
        },
    },
};

use crate::{
    config::BinanceApiConfig,
    data::bn_kline::candles_from_kline_rows,
    domain::Candle,
};

/// Abstract interface for fetching daily market data.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch up to `limit` daily candles for `symbol`, oldest first.
    /// With `start_time_ms` set the window begins there (inclusive);
    /// without it the exchange returns the most recent `limit` candles.
    async fn fetch_daily_candles(
        &self,
        symbol: &str,
        start_time_ms: Option<i64>,
        limit: i32,
    ) -> Result<Vec<Candle>>;
}

pub struct BinanceProvider {
    rest_client: RestApi,
}

impl BinanceProvider {
    pub fn new() -> Result<Self> {
        let config = BinanceApiConfig::default();
        let rest_conf = ConfigurationRestApi::builder()
            .timeout(config.timeout_ms)
            .retries(config.retries)
            .backoff(config.backoff_ms)
            .build()?;

        Ok(Self {
            rest_client: SpotRestApi::production(rest_conf),
        })
    }
}

#[async_trait]
impl MarketDataProvider for BinanceProvider {
    async fn fetch_daily_candles(
        &self,
        symbol: &str,
        start_time_ms: Option<i64>,
        limit: i32,
    ) -> Result<Vec<Candle>> {
        let params = KlinesParams::builder(symbol.to_string(), KlinesIntervalEnum::Interval1d)
            .limit(limit)
            .start_time(start_time_ms)
            .build()?;

        let response = match self.rest_client.klines(params).await {
            Ok(r) => r,
            Err(e) => {
                if let Some(conn_err) = e.downcast_ref::<errors::ConnectorError>() {
                    match conn_err {
                        ConnectorError::TooManyRequestsError(msg) => {
                            log::warn!("{symbol}: rate limit exceeded. {msg}");
                        }
                        ConnectorError::ServerError { msg, status_code } => {
                            log::error!("{symbol}: server error {status_code:?}: {msg}");
                        }
                        ConnectorError::NetworkError(msg) => {
                            log::error!("{symbol}: network error: {msg}");
                        }
                        other => {
                            log::error!("{symbol}: klines request failed: {other:?}");
                        }
                    }
                } else {
                    log::error!("{symbol}: unexpected klines error: {e:#}");
                }
                return Err(e.context(format!("klines request failed for {symbol}")));
            }
        };

        let rows = response.data().await?;
        let candles = candles_from_kline_rows(rows)
            .map_err(|e| anyhow::Error::new(e).context(format!("malformed kline payload for {symbol}")))?;

        Ok(candles)
    }
}
