//! Record store: a primary database tier with an append-only CSV fallback tier
//!
//! The primary tier is selected once, at startup, by an explicit health check.
//! When it is absent or unhealthy the process runs in fallback-only mode for its
//! lifetime. Per-call primary failures demote only that call.

use async_trait::async_trait;
use hsurvey_common::{Result, SurveyResponse};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

mod database;
mod fallback;

pub use database::DatabaseStore;
pub use fallback::{CsvFileStore, FILE_HEADER};

/// One persistence tier
#[async_trait]
pub trait ResponseStore: Send + Sync {
    /// Human-readable tier name for logs
    fn name(&self) -> &'static str;

    /// Health check used to select the tier at startup
    async fn ping(&self) -> Result<()>;

    /// Append one response
    async fn insert(&self, response: &SurveyResponse) -> Result<()>;

    /// Every stored response, in insertion order
    async fn fetch_all(&self) -> Result<Vec<SurveyResponse>>;

    /// Release held resources
    async fn close(&self) {}
}

/// Which tiers are active for the process lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreMode {
    /// Primary database with per-call fallback
    Tiered,
    /// No usable primary; everything goes to the fallback file
    FallbackOnly,
}

/// Tier that accepted a saved response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Primary,
    Fallback,
}

/// Result of an on-demand snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Primary records written over the fallback file
    Exported { records: usize, path: PathBuf },
    /// No primary tier; responses already land in the fallback file
    FallbackOnly { path: PathBuf },
}

/// Two-tier store handle shared by all request handlers
pub struct TieredStore {
    primary: Option<Box<dyn ResponseStore>>,
    fallback: CsvFileStore,
}

impl TieredStore {
    /// Assemble a store from already-opened tiers
    pub fn new(primary: Option<Box<dyn ResponseStore>>, fallback: CsvFileStore) -> Self {
        Self { primary, fallback }
    }

    /// Open the store for the process lifetime.
    ///
    /// Connects to `database_url` when given and keeps it only if the health
    /// check passes. Never fails: an unusable primary selects fallback mode.
    pub async fn open(database_url: Option<&str>, fallback_path: impl Into<PathBuf>) -> Self {
        let fallback = CsvFileStore::new(fallback_path);

        let Some(url) = database_url else {
            info!(
                "No database configured, saving responses to {}",
                fallback.path().display()
            );
            return Self::new(None, fallback);
        };

        let primary = match DatabaseStore::connect(url).await {
            Ok(db) => db,
            Err(e) => {
                warn!("Could not connect to database: {}", e);
                warn!("Falling back to {}", fallback.path().display());
                return Self::new(None, fallback);
            }
        };

        match primary.ping().await {
            Ok(()) => {
                info!("✓ Connected to primary database");
                Self::new(Some(Box::new(primary)), fallback)
            }
            Err(e) => {
                warn!("Database health check failed: {}", e);
                warn!("Falling back to {}", fallback.path().display());
                primary.close().await;
                Self::new(None, fallback)
            }
        }
    }

    pub fn mode(&self) -> StoreMode {
        if self.primary.is_some() {
            StoreMode::Tiered
        } else {
            StoreMode::FallbackOnly
        }
    }

    pub fn fallback_path(&self) -> &Path {
        self.fallback.path()
    }

    /// Append one response to the primary tier, or the fallback file if the
    /// primary is absent or the write fails
    pub async fn save(&self, response: &SurveyResponse) -> Result<SaveOutcome> {
        if let Some(primary) = &self.primary {
            match primary.insert(response).await {
                Ok(()) => {
                    info!("Response saved to {}", primary.name());
                    return Ok(SaveOutcome::Primary);
                }
                Err(e) => {
                    warn!("Error saving to {}: {}; using fallback file", primary.name(), e);
                }
            }
        }

        self.fallback.insert(response).await?;
        info!("Response saved to {}", self.fallback.path().display());
        Ok(SaveOutcome::Fallback)
    }

    /// Every stored response.
    ///
    /// Prefers the primary tier when reachable and non-empty. A missing or
    /// unreadable fallback file yields an empty result.
    pub async fn load_all(&self) -> Vec<SurveyResponse> {
        if let Some(primary) = &self.primary {
            match primary.fetch_all().await {
                Ok(records) if !records.is_empty() => return records,
                Ok(_) => debug!("{} is empty, reading fallback file", primary.name()),
                Err(e) => warn!("Error retrieving data from {}: {}", primary.name(), e),
            }
        }

        match self.fallback.fetch_all().await {
            Ok(records) => records,
            Err(e) => {
                error!("Error reading {}: {}", self.fallback.path().display(), e);
                Vec::new()
            }
        }
    }

    /// Snapshot every primary record into the fallback file, overwriting it
    pub async fn export_all(&self) -> Result<ExportOutcome> {
        let path = self.fallback.path().to_path_buf();
        let Some(primary) = &self.primary else {
            return Ok(ExportOutcome::FallbackOnly { path });
        };

        let records = primary.fetch_all().await?;
        self.fallback.replace_all(records.clone()).await?;
        info!("Exported {} responses to {}", records.len(), path.display());

        Ok(ExportOutcome::Exported {
            records: records.len(),
            path,
        })
    }

    /// Close the primary tier. Called once after the server stops.
    pub async fn close(&self) {
        if let Some(primary) = &self.primary {
            primary.close().await;
            info!("Closed {}", primary.name());
        }
    }
}
