use {
    crate::domain::{AssetSeries, Candle},
    anyhow::{Context, Result, ensure},
    async_trait::async_trait,
    sqlx::{
        ConnectOptions, Pool, QueryBuilder, Row, Sqlite,
        sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
    },
    std::{str::FromStr, time::Duration},
};

/// Suffix of every per-asset candle table, e.g. `BTC_prices`.
const PRICE_TABLE_SUFFIX: &str = "_prices";

/// Handle to the SQLite file backing both the candle and the range stores.
/// Opened once at startup; the stores share its pool.
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    pub async fn open(db_path: &str) -> Result<Self> {
        let connection_options = SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(60))
            .synchronous(SqliteSynchronous::Normal)
            .log_slow_statements(log::LevelFilter::Warn, Duration::from_secs(10));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connection_options)
            .await
            .with_context(|| format!("failed to open database at {db_path}"))?;

        Ok(Self { pool })
    }

    pub(crate) fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[async_trait]
pub trait CandleStore: Send + Sync {
    /// Inserts or replaces the candle keyed by its open time. Last write wins.
    async fn upsert(&self, asset: &str, candle: &Candle) -> Result<()>;
    /// Page-sized variant of `upsert`; one call per fetched page.
    async fn upsert_batch(&self, asset: &str, candles: &[Candle]) -> Result<u64>;
    /// Assets for which any candle data exists.
    async fn list_assets(&self) -> Result<Vec<String>>;
    /// All stored candles for `asset`, ascending by open time.
    /// An unknown asset yields an empty series, not an error.
    async fn load_series(&self, asset: &str) -> Result<AssetSeries>;
}

pub struct SqliteCandleStore {
    pool: Pool<Sqlite>,
}

impl SqliteCandleStore {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    /// Table names are interpolated into SQL, so the asset name must be a
    /// plain identifier. The watched catalog always satisfies this.
    fn price_table(asset: &str) -> Result<String> {
        ensure!(
            !asset.is_empty() && asset.chars().all(|c| c.is_ascii_alphanumeric()),
            "asset name '{asset}' is not a valid table identifier"
        );
        Ok(format!("{asset}{PRICE_TABLE_SUFFIX}"))
    }

    async fn ensure_table(&self, table: &str) -> Result<()> {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                open_time INTEGER PRIMARY KEY,
                open REAL NOT NULL,
                high REAL NOT NULL,
                low REAL NOT NULL,
                close REAL NOT NULL,
                volume REAL NOT NULL
            );
            "#
        ))
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to create table {table}"))?;

        Ok(())
    }

    async fn table_exists(&self, table: &str) -> Result<bool> {
        let row = sqlx::query("SELECT name FROM sqlite_master WHERE type='table' AND name = ?")
            .bind(table)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }
}

#[async_trait]
impl CandleStore for SqliteCandleStore {
    async fn upsert(&self, asset: &str, candle: &Candle) -> Result<()> {
        self.upsert_batch(asset, std::slice::from_ref(candle)).await?;
        Ok(())
    }

    /// Batches rows in chunks of 3000 to stay within SQLite's 32k parameter limit.
    async fn upsert_batch(&self, asset: &str, candles: &[Candle]) -> Result<u64> {
        if candles.is_empty() {
            return Ok(0);
        }

        let table = Self::price_table(asset)?;
        self.ensure_table(&table).await?;

        for chunk in candles.chunks(3000) {
            let mut query_builder = QueryBuilder::new(format!(
                "INSERT OR REPLACE INTO {table} (open_time, open, high, low, close, volume) "
            ));

            query_builder.push_values(chunk, |mut b, c| {
                b.push_bind(c.open_time_ms)
                    .push_bind(c.open)
                    .push_bind(c.high)
                    .push_bind(c.low)
                    .push_bind(c.close)
                    .push_bind(c.volume);
            });

            query_builder.build().execute(&self.pool).await?;
        }

        Ok(candles.len() as u64)
    }

    async fn list_assets(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        let assets = rows
            .iter()
            .filter_map(|row| {
                let name: String = row.get("name");
                name.strip_suffix(PRICE_TABLE_SUFFIX).map(str::to_string)
            })
            .collect();

        Ok(assets)
    }

    async fn load_series(&self, asset: &str) -> Result<AssetSeries> {
        let table = Self::price_table(asset)?;
        if !self.table_exists(&table).await? {
            return Ok(AssetSeries::default());
        }

        let rows = sqlx::query(&format!(
            r#"
            SELECT open_time, open, high, low, close, volume
            FROM {table}
            ORDER BY open_time ASC
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        let candles = rows
            .iter()
            .map(|row| {
                Candle::new(
                    row.get("open_time"),
                    row.get("open"),
                    row.get("high"),
                    row.get("low"),
                    row.get("close"),
                    row.get("volume"),
                )
            })
            .collect();

        Ok(AssetSeries::from_ascending(candles))
    }
}
