//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation. Most options fall back to `.ecomdash.toml`.

use chrono::NaiveDate;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ecomdash - e-commerce order analytics dashboard
///
/// Loads a pre-joined order CSV, filters it to a date range and renders
/// order volume, revenue, customer geography, category popularity and
/// RFM customer segmentation as a Markdown or JSON report.
///
/// Examples:
///   ecomdash --data all_data.csv
///   ecomdash --data all_data.csv --start 2017-11-01 --end 2017-11-30
///   ecomdash --data all_data.csv --format json --output dashboard.json
///   ecomdash --data all_data.csv --export-dir tables/
///   ecomdash --data all_data.csv --show-range
///   ecomdash --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the pre-joined order CSV
    ///
    /// Can also be set via ECOMDASH_DATA env var or .ecomdash.toml config.
    #[arg(short, long, value_name = "FILE", env = "ECOMDASH_DATA")]
    pub data: Option<PathBuf>,

    /// First day of the range (YYYY-MM-DD, inclusive)
    ///
    /// Defaults to the earliest purchase in the dataset.
    #[arg(short, long, value_name = "DATE")]
    pub start: Option<NaiveDate>,

    /// Last day of the range (YYYY-MM-DD, inclusive)
    ///
    /// Defaults to the latest purchase in the dataset.
    #[arg(short, long, value_name = "DATE")]
    pub end: Option<NaiveDate>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .ecomdash.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Rows shown in each ranking (states, best customers)
    #[arg(long, value_name = "COUNT")]
    pub top_n: Option<usize>,

    /// Share of customers below which a category is merged into "Others"
    ///
    /// Example: --others-threshold 0.015 merges categories under 1.5%
    #[arg(long, value_name = "RATIO")]
    pub others_threshold: Option<f64>,

    /// Also write every summary table as CSV into this directory
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    /// Print the selectable date range of the dataset and exit
    #[arg(long)]
    pub show_range: bool,

    /// Exit with code 2 when no orders fall within the range
    #[arg(long)]
    pub fail_on_empty: bool,

    /// Generate a default .ecomdash.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(format!("Start date {} is after end date {}", start, end));
            }
        }

        if self.top_n == Some(0) {
            return Err("Top N must be at least 1".to_string());
        }

        if let Some(threshold) = self.others_threshold {
            if !(0.0..1.0).contains(&threshold) {
                return Err("Others threshold must be between 0.0 and 1.0".to_string());
            }
        }

        // Validate dataset path if provided
        if let Some(ref data) = self.data {
            if !data.is_file() {
                return Err(format!("Dataset file does not exist: {}", data.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
