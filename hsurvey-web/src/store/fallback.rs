//! Fallback tier: append-only CSV file
//!
//! Each write opens, appends one line and closes the file. There is no
//! cross-request locking; concurrent appends may interleave in order only.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hsurvey_common::{Error, Expenses, Result, SurveyResponse};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::warn;

use super::ResponseStore;

/// Column order of the fallback file
pub const FILE_HEADER: [&str; 9] = [
    "timestamp",
    "age",
    "gender",
    "total_income",
    "utilities",
    "entertainment",
    "school_fees",
    "shopping",
    "healthcare",
];

/// One line of the fallback file.
///
/// Reading is lenient: missing or unparsable expense cells read as 0. A row
/// without a numeric `age` and `total_income` is not a response.
#[derive(Debug, Serialize, Deserialize)]
struct FileRow {
    #[serde(default, deserialize_with = "csv::invalid_option")]
    timestamp: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    age: Option<f64>,
    #[serde(default)]
    gender: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    total_income: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    utilities: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    entertainment: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    school_fees: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    shopping: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    healthcare: Option<f64>,
}

impl From<&SurveyResponse> for FileRow {
    fn from(response: &SurveyResponse) -> Self {
        let expenses = &response.expenses;
        Self {
            timestamp: Some(response.timestamp),
            age: Some(response.age as f64),
            gender: response.gender.clone(),
            total_income: Some(response.total_income),
            utilities: Some(expenses.utilities),
            entertainment: Some(expenses.entertainment),
            school_fees: Some(expenses.school_fees),
            shopping: Some(expenses.shopping),
            healthcare: Some(expenses.healthcare),
        }
    }
}

impl TryFrom<FileRow> for SurveyResponse {
    type Error = &'static str;

    fn try_from(row: FileRow) -> std::result::Result<Self, Self::Error> {
        let age = row.age.ok_or("missing or non-numeric age")?;
        let total_income = row.total_income.ok_or("missing or non-numeric total_income")?;

        Ok(Self {
            age: age.round() as i64,
            gender: row.gender,
            total_income,
            expenses: Expenses {
                utilities: row.utilities.unwrap_or(0.0),
                entertainment: row.entertainment.unwrap_or(0.0),
                school_fees: row.school_fees.unwrap_or(0.0),
                shopping: row.shopping.unwrap_or(0.0),
                healthcare: row.healthcare.unwrap_or(0.0),
            },
            // Rows exported without a timestamp column
            timestamp: row.timestamp.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        })
    }
}

#[derive(Debug, Clone)]
pub struct CsvFileStore {
    path: PathBuf,
}

impl CsvFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the whole file with `records`
    pub async fn replace_all(&self, records: Vec<SurveyResponse>) -> Result<()> {
        let path = self.path.clone();
        blocking(move || write_all(&path, &records)).await
    }
}

#[async_trait]
impl ResponseStore for CsvFileStore {
    fn name(&self) -> &'static str {
        "fallback file"
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn insert(&self, response: &SurveyResponse) -> Result<()> {
        let path = self.path.clone();
        let row = FileRow::from(response);
        blocking(move || append_row(&path, &row)).await
    }

    async fn fetch_all(&self) -> Result<Vec<SurveyResponse>> {
        let path = self.path.clone();
        blocking(move || read_all(&path)).await
    }
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::Internal(format!("File task failed: {}", e)))?
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn append_row(path: &Path, row: &FileRow) -> Result<()> {
    ensure_parent(path)?;
    let needs_header = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    if needs_header {
        writer.write_record(FILE_HEADER)?;
    }
    writer.serialize(row)?;
    writer.flush()?;
    Ok(())
}

fn write_all(path: &Path, records: &[SurveyResponse]) -> Result<()> {
    ensure_parent(path)?;
    let file = File::create(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    writer.write_record(FILE_HEADER)?;
    for record in records {
        writer.serialize(FileRow::from(record))?;
    }
    writer.flush()?;
    Ok(())
}

fn read_all(path: &Path) -> Result<Vec<SurveyResponse>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut records = Vec::new();
    for (index, row) in reader.deserialize::<FileRow>().enumerate() {
        match row.map_err(|e| e.to_string()).and_then(|row| {
            SurveyResponse::try_from(row).map_err(str::to_string)
        }) {
            Ok(response) => records.push(response),
            Err(e) => warn!("Skipping row {} of {}: {}", index + 1, path.display(), e),
        }
    }
    Ok(records)
}
