// src/loader.rs
//! CSV → [`Record`] loading for the four analytics collections.
//!
//! [`DataSource::load`] never fails: a missing file is an empty collection
//! (warned), one that cannot be opened or has no readable header is an empty
//! collection (logged as an error). Bad rows cost only themselves.
//! Analyses then degrade to zero/empty results.

use anyhow::{Context, Result};
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::config::{AppConfig, FileNames};
use crate::record::{Datasets, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    Customers,
    Tickets,
    Incidents,
    Feedback,
}

impl Dataset {
    pub const ALL: [Dataset; 4] = [
        Dataset::Customers,
        Dataset::Tickets,
        Dataset::Incidents,
        Dataset::Feedback,
    ];

    /// Label used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Dataset::Customers => "customers",
            Dataset::Tickets => "tickets",
            Dataset::Incidents => "incidents",
            Dataset::Feedback => "feedback",
        }
    }

    fn file_name<'a>(&self, files: &'a FileNames) -> &'a str {
        match self {
            Dataset::Customers => &files.customers,
            Dataset::Tickets => &files.tickets,
            Dataset::Incidents => &files.incidents,
            Dataset::Feedback => &files.feedback,
        }
    }
}

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_gauge!("dataset_rows", "Rows in the most recent load of a dataset.");
        describe_counter!(
            "dataset_load_errors_total",
            "CSV files that existed but could not be read."
        );
    });
}

/// Resolves dataset files under the configured data directory.
#[derive(Debug, Clone)]
pub struct DataSource {
    data_dir: PathBuf,
    files: FileNames,
}

impl DataSource {
    pub fn new(data_dir: impl Into<PathBuf>, files: FileNames) -> Self {
        Self {
            data_dir: data_dir.into(),
            files,
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        Self::new(cfg.data_dir.clone(), cfg.files.clone())
    }

    pub fn path_of(&self, ds: Dataset) -> PathBuf {
        self.data_dir.join(ds.file_name(&self.files))
    }

    /// Load one collection; never fails (see module docs).
    pub fn load(&self, ds: Dataset) -> Vec<Record> {
        ensure_metrics_described();
        let path = self.path_of(ds);

        if !path.exists() {
            warn!(dataset = ds.label(), path = %path.display(), "dataset file not found; using empty collection");
            gauge!("dataset_rows", "dataset" => ds.label()).set(0.0);
            return Vec::new();
        }

        match read_csv(&path) {
            Ok(rows) => {
                debug!(dataset = ds.label(), rows = rows.len(), "dataset loaded");
                gauge!("dataset_rows", "dataset" => ds.label()).set(rows.len() as f64);
                rows
            }
            Err(e) => {
                error!(dataset = ds.label(), error = ?e, "failed to read dataset; using empty collection");
                counter!("dataset_load_errors_total", "dataset" => ds.label()).increment(1);
                Vec::new()
            }
        }
    }

    pub fn load_all(&self) -> Datasets {
        Datasets {
            customers: self.load(Dataset::Customers),
            tickets: self.load(Dataset::Tickets),
            incidents: self.load(Dataset::Incidents),
            feedback: self.load(Dataset::Feedback),
        }
    }
}

/// CSV read: header row + records, short rows tolerated.
///
/// Fields are decoded lossily, so invalid UTF-8 yields U+FFFD rather than
/// losing the row. A row the reader cannot parse at all is skipped with a
/// warning; only failing to open the file or read its header is an error.
pub fn read_csv(path: &Path) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let columns: Arc<[String]> = reader
        .byte_headers()
        .with_context(|| format!("reading header of {}", path.display()))?
        .iter()
        .map(|h| String::from_utf8_lossy(h).trim().to_string())
        .collect::<Vec<_>>()
        .into();

    let mut rows = Vec::new();
    for (i, rec) in reader.byte_records().enumerate() {
        match rec {
            Ok(rec) => rows.push(Record::new(
                Arc::clone(&columns),
                rec.iter()
                    .map(|f| String::from_utf8_lossy(f).into_owned())
                    .collect(),
            )),
            Err(e) => {
                warn!(path = %path.display(), row = i + 1, error = %e, "skipping unreadable csv row");
            }
        }
    }
    Ok(rows)
}
