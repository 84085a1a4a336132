//! Integration tests for the two-tier record store
//!
//! Exercises store selection at startup, per-call demotion to the fallback
//! file and the export snapshot against a file-backed SQLite database.

use hsurvey_common::{Expenses, SurveyResponse};
use hsurvey_web::store::{
    CsvFileStore, DatabaseStore, ExportOutcome, SaveOutcome, StoreMode, TieredStore,
};
use sqlx::sqlite::SqlitePoolOptions;
use tempfile::TempDir;

fn database_url(temp: &TempDir) -> String {
    format!("sqlite://{}?mode=rwc", temp.path().join("survey.db").display())
}

fn responses() -> Vec<SurveyResponse> {
    vec![
        SurveyResponse::new(
            30,
            "F",
            1000.0,
            Expenses {
                utilities: 200.0,
                entertainment: 50.0,
                ..Default::default()
            },
        ),
        SurveyResponse::new(
            52,
            "M",
            3100.5,
            Expenses {
                school_fees: 800.0,
                healthcare: 95.25,
                ..Default::default()
            },
        ),
    ]
}

#[tokio::test]
async fn test_open_without_database_is_fallback_only() {
    let temp = TempDir::new().unwrap();
    let store = TieredStore::open(None, temp.path().join("user_data.csv")).await;
    let records = responses();

    assert_eq!(store.mode(), StoreMode::FallbackOnly);
    for record in &records {
        assert_eq!(store.save(record).await.unwrap(), SaveOutcome::Fallback);
    }
    assert_eq!(store.load_all().await, records);
}

#[tokio::test]
async fn test_open_unreachable_database_is_fallback_only() {
    let temp = TempDir::new().unwrap();
    // SQLite creates the file but never its parent directory
    let url = format!(
        "sqlite://{}",
        temp.path().join("no-such-dir").join("survey.db").display()
    );
    let store = TieredStore::open(Some(&url), temp.path().join("user_data.csv")).await;

    assert_eq!(store.mode(), StoreMode::FallbackOnly);
    assert!(store.load_all().await.is_empty());
}

#[tokio::test]
async fn test_open_database_is_tiered() {
    let temp = TempDir::new().unwrap();
    let store = TieredStore::open(Some(&database_url(&temp)), temp.path().join("user_data.csv")).await;
    let records = responses();

    assert_eq!(store.mode(), StoreMode::Tiered);
    for record in &records {
        assert_eq!(store.save(record).await.unwrap(), SaveOutcome::Primary);
    }
    assert_eq!(store.load_all().await, records);
    assert!(!store.fallback_path().exists());

    store.close().await;
}

#[tokio::test]
async fn test_plain_url_creates_database_on_first_run() {
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("fresh.db");
    let url = format!("sqlite://{}", db_path.display());

    let store = TieredStore::open(Some(&url), temp.path().join("user_data.csv")).await;
    assert_eq!(store.mode(), StoreMode::Tiered);
    assert!(db_path.exists());
    store.close().await;
}

#[tokio::test]
async fn test_export_then_fallback_read_matches_primary() {
    let temp = TempDir::new().unwrap();
    let fallback_path = temp.path().join("user_data.csv");
    let store = TieredStore::open(Some(&database_url(&temp)), &fallback_path).await;
    let records = responses();
    for record in &records {
        store.save(record).await.unwrap();
    }

    let outcome = store.export_all().await.unwrap();
    assert_eq!(
        outcome,
        ExportOutcome::Exported {
            records: 2,
            path: fallback_path.clone(),
        }
    );
    store.close().await;

    let file_only = TieredStore::new(None, CsvFileStore::new(&fallback_path));
    assert_eq!(file_only.load_all().await, records);
}

#[tokio::test]
async fn test_export_overwrites_fallback_rows() {
    let temp = TempDir::new().unwrap();
    let fallback_path = temp.path().join("user_data.csv");
    let records = responses();

    // A row that only ever reached the fallback file
    TieredStore::new(None, CsvFileStore::new(&fallback_path))
        .save(&records[1])
        .await
        .unwrap();

    let store = TieredStore::open(Some(&database_url(&temp)), &fallback_path).await;
    store.save(&records[0]).await.unwrap();
    store.export_all().await.unwrap();
    store.close().await;

    let file_only = TieredStore::new(None, CsvFileStore::new(&fallback_path));
    assert_eq!(file_only.load_all().await, vec![records[0].clone()]);
}

#[tokio::test]
async fn test_failed_primary_write_falls_back_per_call() {
    let temp = TempDir::new().unwrap();
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    let primary = DatabaseStore::from_pool(pool.clone()).await.unwrap();
    let store = TieredStore::new(
        Some(Box::new(primary)),
        CsvFileStore::new(temp.path().join("user_data.csv")),
    );
    let records = responses();

    // Primary goes away after startup selection
    pool.close().await;

    assert_eq!(store.mode(), StoreMode::Tiered);
    assert_eq!(store.save(&records[0]).await.unwrap(), SaveOutcome::Fallback);
    assert_eq!(store.load_all().await, vec![records[0].clone()]);
    assert!(store.export_all().await.is_err());
}
