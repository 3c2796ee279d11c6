//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.ecomdash.toml` files.

use crate::analysis::{DashboardSettings, DEFAULT_OTHERS_THRESHOLD};
use crate::cli::OutputFormat;
use crate::report::ReportOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".ecomdash.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Dataset settings.
    #[serde(default)]
    pub dataset: DatasetConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
        }
    }
}

fn default_output() -> PathBuf {
    PathBuf::from("dashboard.md")
}

/// Input dataset settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Path to the pre-joined order CSV.
    #[serde(default = "default_dataset_path")]
    pub path: PathBuf,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
        }
    }
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("all_data.csv")
}

/// Report rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Report title.
    #[serde(default = "default_title")]
    pub title: String,

    /// Currency code shown before monetary values.
    #[serde(default = "default_currency_code")]
    pub currency_code: String,

    /// Rows shown in each ranking.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Share below which a category is merged into "Others".
    #[serde(default = "default_others_threshold")]
    pub others_threshold: f64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            title: default_title(),
            currency_code: default_currency_code(),
            top_n: default_top_n(),
            others_threshold: default_others_threshold(),
        }
    }
}

fn default_title() -> String {
    "Brazilian E-Commerce Dashboard".to_string()
}

fn default_currency_code() -> String {
    "BRL".to_string()
}

fn default_top_n() -> usize {
    5
}

fn default_others_threshold() -> f64 {
    DEFAULT_OTHERS_THRESHOLD
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.ecomdash.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref data) = args.data {
            self.dataset.path = data.clone();
        }
        if let Some(ref output) = args.output {
            self.general.output = output.clone();
        }
        if let Some(format) = args.format {
            self.report.format = format;
        }
        if let Some(top_n) = args.top_n {
            self.report.top_n = top_n;
        }
        if let Some(threshold) = args.others_threshold {
            self.report.others_threshold = threshold;
        }
    }

    /// Settings for the chart views.
    pub fn dashboard_settings(&self) -> DashboardSettings {
        DashboardSettings {
            top_n: self.report.top_n.max(1),
            others_threshold: self.report.others_threshold,
        }
    }

    /// Options for the Markdown renderer.
    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            currency_code: self.report.currency_code.clone(),
            title: self.report.title.clone(),
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
