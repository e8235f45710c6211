//! Store round-trips and full session runs against a temporary database.

use tempfile::TempDir;

use range_lens::analysis::MultiplierTable;
use range_lens::utils::TimeUtils;
use range_lens::{
    AssetRanges, Candle, CandleStore, Database, RangeOverrides, SelectionRange,
    SelectionStateStore, SessionOutcome, SqliteCandleStore, SqliteRangeStore, run_session,
};

// 2020-01-01 00:00 UTC
const DAY0_SEC: i64 = 1_577_836_800;
const DAY0_MS: i64 = DAY0_SEC * 1000;

fn candle_on_day(day: i64, close: f64) -> Candle {
    Candle::new(DAY0_MS + day * TimeUtils::MS_IN_D, close, close, close, close, 5.0)
}

async fn temp_db() -> (TempDir, Database) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("test.db");
    let db = Database::open(path.to_str().unwrap()).await.expect("open db");
    (dir, db)
}

#[tokio::test]
async fn upsert_on_the_same_open_time_overwrites_the_row() {
    let (_dir, db) = temp_db().await;
    let store = SqliteCandleStore::new(&db);

    store.upsert("BTC", &candle_on_day(0, 100.0)).await.unwrap();
    store.upsert("BTC", &candle_on_day(0, 110.0)).await.unwrap();

    let series = store.load_series("BTC").await.unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series.candles()[0].close, 110.0);
}

#[tokio::test]
async fn list_assets_reports_only_price_tables() {
    let (_dir, db) = temp_db().await;
    let store = SqliteCandleStore::new(&db);
    // coin_ranges exists alongside the price tables but is not an asset.
    let _ranges = SqliteRangeStore::new(&db).await.unwrap();

    assert!(store.list_assets().await.unwrap().is_empty());

    store.upsert("ETH", &candle_on_day(0, 1.0)).await.unwrap();
    store.upsert("BTC", &candle_on_day(0, 2.0)).await.unwrap();

    assert_eq!(store.list_assets().await.unwrap(), vec!["BTC", "ETH"]);
}

#[tokio::test]
async fn loading_an_unknown_asset_yields_an_empty_series() {
    let (_dir, db) = temp_db().await;
    let store = SqliteCandleStore::new(&db);
    assert!(store.load_series("DOGE").await.unwrap().is_empty());
}

#[tokio::test]
async fn saved_ranges_round_trip_exactly_and_overwrite_on_resave() {
    let (_dir, db) = temp_db().await;
    let store = SqliteRangeStore::new(&db).await.unwrap();

    assert!(store.load("BTC").await.unwrap().is_none());

    let first = AssetRanges {
        regression: SelectionRange::new(DAY0_SEC, DAY0_SEC + 86_400),
        mean: SelectionRange::new(DAY0_SEC, DAY0_SEC + 2 * 86_400),
    };
    store.save("BTC", &first).await.unwrap();
    assert_eq!(store.load("BTC").await.unwrap(), Some(first));

    let second = AssetRanges {
        regression: SelectionRange::new(DAY0_SEC + 86_400, DAY0_SEC + 2 * 86_400),
        mean: first.mean,
    };
    store.save("BTC", &second).await.unwrap();
    assert_eq!(store.load("BTC").await.unwrap(), Some(second));
}

#[tokio::test]
async fn first_session_defaults_to_the_full_span_and_persists_it() {
    let (_dir, db) = temp_db().await;
    let candles = SqliteCandleStore::new(&db);
    let ranges = SqliteRangeStore::new(&db).await.unwrap();

    candles
        .upsert_batch(
            "BTC",
            &[
                candle_on_day(0, 100.0),
                candle_on_day(1, 200.0),
                candle_on_day(2, 300.0),
            ],
        )
        .await
        .unwrap();

    let outcome = run_session(
        &candles,
        &ranges,
        &MultiplierTable::uniform(0.8),
        "BTC",
        RangeOverrides::default(),
        1.0,
    )
    .await
    .unwrap();

    let SessionOutcome::Ready(view) = outcome else {
        panic!("expected a ready session");
    };

    assert_eq!(view.mean_price, 200.0);
    assert!((view.sell_target - 160.0).abs() < 1e-9);
    assert!((view.buy_target - 250.0).abs() < 1e-9);
    assert_eq!(view.trend_line.len(), 3);
    // Closes 100/200/300 lie exactly on the fitted line.
    assert!((view.trend_line[0] - 100.0).abs() < 1e-9);
    assert!((view.trend_line[2] - 300.0).abs() < 1e-9);
    assert_eq!(view.regression_bounds, (0, 2));
    assert_eq!(view.mean_bounds, (0, 2));

    // The defaulted full span was persisted for the next session.
    let saved = ranges.load("BTC").await.unwrap().unwrap();
    let full = SelectionRange::new(DAY0_SEC, DAY0_SEC + 2 * 86_400);
    assert_eq!(saved.regression, full);
    assert_eq!(saved.mean, full);
}

#[tokio::test]
async fn overridden_ranges_win_and_replace_the_persisted_ones() {
    let (_dir, db) = temp_db().await;
    let candles = SqliteCandleStore::new(&db);
    let ranges = SqliteRangeStore::new(&db).await.unwrap();

    candles
        .upsert_batch(
            "BTC",
            &[
                candle_on_day(0, 100.0),
                candle_on_day(1, 200.0),
                candle_on_day(2, 300.0),
            ],
        )
        .await
        .unwrap();

    let first_day = SelectionRange::new(DAY0_SEC, DAY0_SEC);
    let outcome = run_session(
        &candles,
        &ranges,
        &MultiplierTable::uniform(0.8),
        "BTC",
        RangeOverrides {
            regression: None,
            mean: Some(first_day),
        },
        1.0,
    )
    .await
    .unwrap();

    let SessionOutcome::Ready(view) = outcome else {
        panic!("expected a ready session");
    };
    assert_eq!(view.mean_price, 100.0);
    assert_eq!(view.mean_bounds, (0, 0));

    let saved = ranges.load("BTC").await.unwrap().unwrap();
    assert_eq!(saved.mean, first_day);
    // The untouched regression range still defaulted to the full span.
    assert_eq!(saved.regression, SelectionRange::new(DAY0_SEC, DAY0_SEC + 2 * 86_400));
}

#[tokio::test]
async fn display_scale_multiplies_every_price_output() {
    let (_dir, db) = temp_db().await;
    let candles = SqliteCandleStore::new(&db);
    let ranges = SqliteRangeStore::new(&db).await.unwrap();

    candles
        .upsert_batch("BTC", &[candle_on_day(0, 100.0), candle_on_day(1, 200.0)])
        .await
        .unwrap();

    let outcome = run_session(
        &candles,
        &ranges,
        &MultiplierTable::uniform(0.5),
        "BTC",
        RangeOverrides::default(),
        2.0,
    )
    .await
    .unwrap();

    let SessionOutcome::Ready(view) = outcome else {
        panic!("expected a ready session");
    };
    assert_eq!(view.mean_price, 300.0); // (100+200)/2, scaled by 2
    assert_eq!(view.closes, vec![200.0, 400.0]);
    assert!((view.sell_target - 150.0).abs() < 1e-9);
    assert!((view.buy_target - 600.0).abs() < 1e-9);
}

#[tokio::test]
async fn a_session_for_an_unknown_asset_reports_no_data() {
    let (_dir, db) = temp_db().await;
    let candles = SqliteCandleStore::new(&db);
    let ranges = SqliteRangeStore::new(&db).await.unwrap();

    let outcome = run_session(
        &candles,
        &ranges,
        &MultiplierTable::standard(),
        "DOGE",
        RangeOverrides::default(),
        1.0,
    )
    .await
    .unwrap();

    assert!(matches!(outcome, SessionOutcome::NoData));
    // Nothing was persisted for the missing asset.
    assert!(ranges.load("DOGE").await.unwrap().is_none());
}
