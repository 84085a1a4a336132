//! Primary tier: SQLite database accessed through a sqlx pool

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hsurvey_common::{Expenses, Result, SurveyResponse};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::types::Json;
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

use super::ResponseStore;

/// Survey responses table. `expenses` holds the nested category document as JSON.
const CREATE_RESPONSES_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS survey_responses (
        guid TEXT PRIMARY KEY,
        age INTEGER NOT NULL,
        gender TEXT NOT NULL,
        total_income REAL NOT NULL,
        expenses TEXT NOT NULL,
        timestamp TEXT NOT NULL
    )
"#;

pub struct DatabaseStore {
    pool: SqlitePool,
}

impl DatabaseStore {
    /// Connect using a connection string and create the schema if needed.
    ///
    /// The database file is created on first run unless the URL asks for a
    /// read-only open.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    /// Wrap an existing pool and create the schema if needed
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::query(CREATE_RESPONSES_TABLE).execute(&pool).await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl ResponseStore for DatabaseStore {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert(&self, response: &SurveyResponse) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO survey_responses (guid, age, gender, total_income, expenses, timestamp)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(response.age)
        .bind(&response.gender)
        .bind(response.total_income)
        .bind(Json(response.expenses))
        .bind(response.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn fetch_all(&self) -> Result<Vec<SurveyResponse>> {
        let rows = sqlx::query_as::<_, (i64, String, f64, Json<Expenses>, DateTime<Utc>)>(
            "SELECT age, gender, total_income, expenses, timestamp FROM survey_responses ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(age, gender, total_income, expenses, timestamp)| SurveyResponse {
                age,
                gender,
                total_income,
                expenses: expenses.0,
                timestamp,
            })
            .collect())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> DatabaseStore {
        // Single connection: every pooled connection would otherwise get its own database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        DatabaseStore::from_pool(pool).await.unwrap()
    }

    #[tokio::test]
    async fn test_connect_creates_missing_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("survey.db");
        let url = format!("sqlite://{}", path.display());

        let store = DatabaseStore::connect(&url).await.unwrap();
        store.ping().await.unwrap();
        assert!(path.exists());
        store.close().await;
    }

    #[tokio::test]
    async fn test_ping() {
        let store = memory_store().await;
        store.ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_insert_and_fetch_preserve_fields() {
        let store = memory_store().await;
        let response = SurveyResponse::new(
            30,
            "F",
            1000.0,
            Expenses {
                utilities: 200.0,
                entertainment: 50.0,
                ..Default::default()
            },
        );

        store.insert(&response).await.unwrap();
        let fetched = store.fetch_all().await.unwrap();

        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].age, 30);
        assert_eq!(fetched[0].gender, "F");
        assert_eq!(fetched[0].expenses, response.expenses);
        assert_eq!(fetched[0].expenses.school_fees, 0.0);
        assert_eq!(fetched[0].timestamp, response.timestamp);
    }

    #[tokio::test]
    async fn test_fetch_keeps_insertion_order() {
        let store = memory_store().await;
        for age in [40, 20, 30] {
            let response = SurveyResponse::new(age, "M", 500.0, Expenses::default());
            store.insert(&response).await.unwrap();
        }

        let ages: Vec<i64> = store
            .fetch_all()
            .await
            .unwrap()
            .iter()
            .map(|r| r.age)
            .collect();
        assert_eq!(ages, vec![40, 20, 30]);
    }

    #[tokio::test]
    async fn test_closed_pool_fails() {
        let store = memory_store().await;
        store.close().await;

        let response = SurveyResponse::new(30, "F", 1.0, Expenses::default());
        assert!(store.insert(&response).await.is_err());
        assert!(store.ping().await.is_err());
    }
}
