//! Dataset loading and date filtering.
//!
//! The CSV is read once into an immutable [`Dataset`]; every recompute
//! borrows it and filters by an inclusive [`DateRange`].

use crate::models::{DateRange, OrderRecord};
use chrono::{NaiveDate, NaiveDateTime};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Header names the loader requires.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "order_id",
    "order_purchase_timestamp_x",
    "order_estimated_delivery_date_y",
    "payment_value_x",
    "customer_id_x",
    "customer_state_x",
    "product_category_name_english",
];

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Errors that abort loading the dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to open dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("dataset is missing required column '{0}'")]
    MissingColumn(String),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Row as it appears in the CSV, before type conversion.
#[derive(Debug, Deserialize)]
struct RawOrderRow {
    #[serde(default)]
    order_id: String,
    order_purchase_timestamp_x: Option<String>,
    order_estimated_delivery_date_y: Option<String>,
    payment_value_x: Option<String>,
    customer_id_x: Option<String>,
    customer_state_x: Option<String>,
    product_category_name_english: Option<String>,
}

/// Counters collected while loading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Rows read from the file.
    pub rows: usize,
    /// Purchase timestamps that were present but could not be parsed.
    pub bad_timestamps: usize,
    /// Payment values that were present but could not be parsed.
    pub bad_payments: usize,
}

/// Options for loading a dataset.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Show a spinner while reading.
    pub show_progress: bool,
}

/// The base dataset, sorted by purchase timestamp.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<OrderRecord>,
    stats: LoadStats,
}

impl Dataset {
    /// Load the dataset from a CSV file.
    pub fn load(path: &Path, options: &LoadOptions) -> Result<Self, DatasetError> {
        info!("Loading dataset: {}", path.display());

        let file = File::open(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let spinner = if options.show_progress {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
            {
                pb.set_style(style);
            }
            pb.set_message(format!("Reading {}", path.display()));
            pb.enable_steady_tick(Duration::from_millis(100));
            Some(pb)
        } else {
            None
        };

        let result = Self::from_reader(file);

        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        let dataset = result?;
        let stats = dataset.stats();
        info!(
            "Loaded {} order lines ({} bad timestamps, {} bad payments)",
            stats.rows, stats.bad_timestamps, stats.bad_payments
        );
        Ok(dataset)
    }

    /// Load the dataset from any CSV source with a header row.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(DatasetError::MissingColumn(column.to_string()));
            }
        }

        let mut stats = LoadStats::default();
        let mut records = Vec::new();

        for row in csv_reader.deserialize::<RawOrderRow>() {
            let row = row?;
            stats.rows += 1;
            records.push(convert_row(row, &mut stats));
        }

        if stats.bad_timestamps > 0 {
            warn!(
                "{} purchase timestamps could not be parsed and were treated as missing",
                stats.bad_timestamps
            );
        }
        if stats.bad_payments > 0 {
            warn!(
                "{} payment values could not be parsed and were treated as missing",
                stats.bad_payments
            );
        }

        let mut dataset = Self::from_records(records);
        dataset.stats = stats;
        Ok(dataset)
    }

    /// Build a dataset from already-parsed records.
    ///
    /// Records are sorted by purchase timestamp; rows without one go last.
    pub fn from_records(mut records: Vec<OrderRecord>) -> Self {
        records.sort_by_key(|r| (r.purchase_timestamp.is_none(), r.purchase_timestamp));
        let stats = LoadStats {
            rows: records.len(),
            ..LoadStats::default()
        };
        Self { records, stats }
    }

    pub fn records(&self) -> &[OrderRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn stats(&self) -> LoadStats {
        self.stats
    }

    /// Earliest and latest purchase day, the bounds of the date picker.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.records.iter().filter_map(|r| r.purchase_date());
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }

    /// The range covering every purchase in the dataset.
    pub fn full_range(&self) -> Option<DateRange> {
        let (start, end) = self.date_bounds()?;
        DateRange::new(start, end).ok()
    }

    /// Order lines whose purchase day falls within `range` (inclusive).
    ///
    /// Lines without a purchase timestamp never match.
    pub fn filter(&self, range: &DateRange) -> Vec<&OrderRecord> {
        let filtered: Vec<&OrderRecord> = self
            .records()
            .iter()
            .filter(|r| r.purchase_date().is_some_and(|d| range.contains(d)))
            .collect();

        debug!(
            "Date filter {} kept {} of {} lines",
            range,
            filtered.len(),
            self.len()
        );
        filtered
    }
}

fn convert_row(row: RawOrderRow, stats: &mut LoadStats) -> OrderRecord {
    let purchase_timestamp = match non_empty(row.order_purchase_timestamp_x) {
        Some(raw) => {
            let parsed = parse_timestamp(&raw);
            if parsed.is_none() {
                stats.bad_timestamps += 1;
            }
            parsed
        }
        None => None,
    };

    let payment_value = match non_empty(row.payment_value_x) {
        Some(raw) => {
            let parsed = raw.parse::<f64>().ok().filter(|v| v.is_finite());
            if parsed.is_none() {
                stats.bad_payments += 1;
            }
            parsed
        }
        None => None,
    };

    OrderRecord {
        order_id: row.order_id,
        purchase_timestamp,
        estimated_delivery: non_empty(row.order_estimated_delivery_date_y)
            .and_then(|raw| parse_timestamp(&raw)),
        payment_value,
        customer_id: non_empty(row.customer_id_x),
        customer_state: non_empty(row.customer_state_x),
        product_category: non_empty(row.product_category_name_english),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parse a timestamp cell; a bare date means midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
