use {
    crate::{
        data::Database,
        domain::{AssetRanges, SelectionRange},
    },
    anyhow::{Context, Result},
    async_trait::async_trait,
    sqlx::{Pool, Row, Sqlite},
};

/// Persisted per-asset regression/mean date ranges, so a session can restore
/// its previous selections.
#[async_trait]
pub trait SelectionStateStore: Send + Sync {
    /// The last-saved ranges for `asset`, or `None` if it was never configured.
    async fn load(&self, asset: &str) -> Result<Option<AssetRanges>>;
    /// Full overwrite of both ranges, keyed by asset. The previous value is lost.
    async fn save(&self, asset: &str, ranges: &AssetRanges) -> Result<()>;
}

pub struct SqliteRangeStore {
    pool: Pool<Sqlite>,
}

impl SqliteRangeStore {
    pub async fn new(db: &Database) -> Result<Self> {
        let store = Self {
            pool: db.pool().clone(),
        };
        store.initialize().await?;
        Ok(store)
    }

    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS coin_ranges (
                coin TEXT PRIMARY KEY,
                regression_start INTEGER,
                regression_end INTEGER,
                mean_start INTEGER,
                mean_end INTEGER
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("failed to create coin_ranges table")?;

        Ok(())
    }
}

#[async_trait]
impl SelectionStateStore for SqliteRangeStore {
    async fn load(&self, asset: &str) -> Result<Option<AssetRanges>> {
        let row = sqlx::query(
            r#"
            SELECT regression_start, regression_end, mean_start, mean_end
            FROM coin_ranges
            WHERE coin = ?
            "#,
        )
        .bind(asset)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| AssetRanges {
            regression: SelectionRange::new(r.get("regression_start"), r.get("regression_end")),
            mean: SelectionRange::new(r.get("mean_start"), r.get("mean_end")),
        }))
    }

    async fn save(&self, asset: &str, ranges: &AssetRanges) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO coin_ranges (coin, regression_start, regression_end, mean_start, mean_end)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(coin) DO UPDATE SET
                regression_start = excluded.regression_start,
                regression_end = excluded.regression_end,
                mean_start = excluded.mean_start,
                mean_end = excluded.mean_end
            "#,
        )
        .bind(asset)
        .bind(ranges.regression.start_sec)
        .bind(ranges.regression.end_sec)
        .bind(ranges.mean.start_sec)
        .bind(ranges.mean.end_sec)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to save selection ranges for {asset}"))?;

        Ok(())
    }
}
