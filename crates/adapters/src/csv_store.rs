//! CSV-backed review store and result sink

use async_trait::async_trait;
use review_labeler_domain::{
    OutputRecord, ResultSink, ReviewRecord, ReviewStore, StoreError, validate_reviews,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;

const REVIEW_HEADERS: [&str; 3] = ["review_id", "review_text", "true_is_political"];

const OUTPUT_HEADERS: [&str; 6] = [
    "review_id",
    "review_text",
    "true_is_political",
    "pred_is_political",
    "reasoning",
    "reasoning_words",
];

/// Review table stored as a CSV file
#[derive(Debug, Clone)]
pub struct CsvReviewStore {
    path: PathBuf,
}

impl CsvReviewStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn csv_error(&self, err: impl std::fmt::Display) -> StoreError {
        StoreError::Csv {
            path: self.path.display().to_string(),
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl ReviewStore for CsvReviewStore {
    async fn has_data(&self) -> Result<bool, StoreError> {
        match fs::metadata(&self.path).await {
            Ok(meta) => Ok(meta.len() > 0),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn load(&self) -> Result<Vec<ReviewRecord>, StoreError> {
        let bytes = fs::read(&self.path).await?;
        let mut reader = csv::Reader::from_reader(bytes.as_slice());

        let records = reader
            .deserialize::<ReviewRecord>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| self.csv_error(e))?;

        validate_reviews(&records)?;

        tracing::debug!(
            path = %self.path.display(),
            count = records.len(),
            "Loaded reviews"
        );

        Ok(records)
    }

    async fn save(&self, records: &[ReviewRecord]) -> Result<(), StoreError> {
        let bytes = encode_csv(&REVIEW_HEADERS, records).map_err(|e| self.csv_error(e))?;
        write_file(&self.path, &bytes).await
    }
}

/// Labeled output written as a CSV file, replaced on every run
#[derive(Debug, Clone)]
pub struct CsvResultSink {
    path: PathBuf,
}

impl CsvResultSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ResultSink for CsvResultSink {
    async fn write(&self, records: &[OutputRecord]) -> Result<(), StoreError> {
        let bytes = encode_csv(&OUTPUT_HEADERS, records).map_err(|e| StoreError::Csv {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;
        write_file(&self.path, &bytes).await?;

        tracing::info!(
            path = %self.path.display(),
            count = records.len(),
            "Wrote labeled reviews"
        );

        Ok(())
    }
}

/// Serialize rows under an explicit header so empty tables still get one
fn encode_csv<T: Serialize>(headers: &[&str], rows: &[T]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(headers)?;
    for row in rows {
        writer.serialize(row)?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    fs::write(path, bytes).await?;
    Ok(())
}
