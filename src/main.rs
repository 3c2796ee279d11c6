//! Ecomdash - E-Commerce Order Analytics Dashboard
//!
//! A CLI tool that loads a pre-joined order dataset, filters it to a
//! date range and renders order, revenue, geography, category and RFM
//! summaries as a Markdown or JSON report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (missing dataset, bad config, invalid range, etc.)
//!   2 - No orders in range and --fail-on-empty was set

mod analysis;
mod cli;
mod config;
mod dataset;
mod models;
mod report;

use analysis::recompute;
use anyhow::{bail, Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use dataset::{Dataset, LoadOptions};
use models::DateRange;
use report::format_currency;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        if let Err(e) = handle_init_config() {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
        return;
    }

    // Initialize logging
    if let Err(e) = init_logging(&args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    info!("Ecomdash v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run_dashboard(args) {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            error!("Dashboard failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .ecomdash.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        bail!(
            "{} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize the dataset path, rankings and currency.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) -> Result<()> {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Run the complete dashboard workflow. Returns exit code (0 or 2).
fn run_dashboard(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    // Step 1: Load the dataset once
    let load_options = LoadOptions {
        show_progress: !args.quiet,
    };
    let dataset = Dataset::load(&config.dataset.path, &load_options)
        .with_context(|| format!("Failed to load {}", config.dataset.path.display()))?;

    if dataset.is_empty() {
        bail!("Dataset {} has no order lines", config.dataset.path.display());
    }

    let Some(full_range) = dataset.full_range() else {
        bail!(
            "Dataset {} contains no dated purchases",
            config.dataset.path.display()
        );
    };
    let (min_date, max_date) = (full_range.start(), full_range.end());

    // Handle --show-range: print picker bounds and exit
    if args.show_range {
        println!("{} {}", min_date, max_date);
        return Ok(0);
    }

    // Step 2: Resolve the date range, defaulting to the full dataset
    let range = DateRange::new(
        args.start.unwrap_or(min_date),
        args.end.unwrap_or(max_date),
    )?;
    if range.end() < min_date || range.start() > max_date {
        warn!(
            "Range {} lies outside the data ({} to {})",
            range, min_date, max_date
        );
    }

    // Step 3: Recompute every summary table
    let dashboard = recompute(&dataset, range, &config.dashboard_settings());

    // Step 4: Render and save the report
    let output = match config.report.format {
        OutputFormat::Json => report::generate_json_report(&dashboard)?,
        OutputFormat::Markdown => {
            report::generate_markdown_report(&dashboard, &config.report_options())
        }
    };

    std::fs::write(&config.general.output, &output).with_context(|| {
        format!(
            "Failed to write report to {}",
            config.general.output.display()
        )
    })?;

    if let Some(ref dir) = args.export_dir {
        let written = report::export_tables(&dashboard, dir)?;
        info!("Exported {} tables to {}", written.len(), dir.display());
    }

    // Print summary
    if !args.quiet {
        let currency = &config.report.currency_code;
        let duration = start_time.elapsed().as_secs_f64();

        println!("\n📊 Dashboard Summary ({}):", range);
        println!("   Order lines in range: {}", dashboard.filtered_rows);
        println!("   Total orders: {}", dashboard.metrics.total_orders);
        println!(
            "   Total revenue: {}",
            format_currency(dashboard.metrics.total_revenue, currency)
        );
        println!(
            "   Avg recency: {:.1} days | Avg frequency: {:.2} | Avg monetary: {}",
            dashboard.metrics.rfm.recency,
            dashboard.metrics.rfm.frequency,
            format_currency(dashboard.metrics.rfm.monetary, currency)
        );
        println!("   Duration: {:.2}s", duration);
        println!(
            "\n✅ Dashboard complete! Report saved to: {}",
            config.general.output.display()
        );
    }

    if args.fail_on_empty && dashboard.is_empty() {
        eprintln!("\n⛔ No orders in {}. Failing (exit code 2).", range);
        return Ok(2);
    }

    Ok(0)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
