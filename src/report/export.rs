//! CSV export of the summary tables.

use crate::models::Dashboard;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Write each summary table of `dashboard` as its own CSV file in `dir`.
///
/// Returns the paths written, in a fixed order.
pub fn export_tables(dashboard: &Dashboard, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory {}", dir.display()))?;

    Ok(vec![
        write_table(dir, "daily_orders.csv", &dashboard.daily_orders)?,
        write_table(dir, "category_popularity.csv", &dashboard.category_popularity)?,
        write_table(dir, "customers_by_state.csv", &dashboard.customers_by_state)?,
        write_table(dir, "customers_by_category.csv", &dashboard.customers_by_category)?,
        write_table(dir, "rfm.csv", &dashboard.rfm)?,
    ])
}

fn write_table<T: Serialize>(dir: &Path, name: &str, rows: &[T]) -> Result<PathBuf> {
    let path = dir.join(name);
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("Failed to write row to {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;

    debug!("Exported {} rows to {}", rows.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{recompute, DashboardSettings};
    use crate::dataset::Dataset;
    use tempfile::TempDir;

    const SAMPLE: &str = include_str!("../../fixtures/sample_orders.csv");

    #[test]
    fn test_export_tables() {
        let dataset = Dataset::from_reader(SAMPLE.as_bytes()).unwrap();
        let range = dataset.full_range().unwrap();
        let dashboard = recompute(&dataset, range, &DashboardSettings::default());

        let temp = TempDir::new().unwrap();
        let out_dir = temp.path().join("tables");
        let written = export_tables(&dashboard, &out_dir).unwrap();

        assert_eq!(written.len(), 5);
        assert!(written.iter().all(|p| p.exists()));

        let daily = fs::read_to_string(out_dir.join("daily_orders.csv")).unwrap();
        let mut lines = daily.lines();
        assert_eq!(lines.next(), Some("date,order_count,revenue"));
        assert_eq!(lines.count(), dashboard.daily_orders.len());

        let rfm = fs::read_to_string(out_dir.join("rfm.csv")).unwrap();
        assert!(rfm.starts_with("customer_id,recency,frequency,monetary"));
    }

    #[test]
    fn test_export_empty_tables() {
        let dataset = Dataset::from_reader(SAMPLE.as_bytes()).unwrap();
        let range = crate::models::DateRange::new(
            chrono::NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2030, 1, 2).unwrap(),
        )
        .unwrap();
        let dashboard = recompute(&dataset, range, &DashboardSettings::default());

        let temp = TempDir::new().unwrap();
        let written = export_tables(&dashboard, temp.path()).unwrap();
        assert_eq!(written.len(), 5);
    }
}
