//! Database persistence configuration

pub struct PersistenceConfig {
    /// Default path of the SQLite file holding candles and selection ranges.
    pub db_path: &'static str,
}

pub const PERSISTENCE: PersistenceConfig = PersistenceConfig {
    db_path: "crypto_prices.db",
};
