//! Dashboard analysis.
//!
//! [`recompute`] filters the dataset by date and runs every aggregator,
//! returning one [`Dashboard`] ready for rendering.

pub mod aggregator;
pub mod views;

pub use aggregator::*;
pub use views::*;

use crate::dataset::Dataset;
use crate::models::{Dashboard, DateRange};
use tracing::{debug, info};

/// Knobs for the chart views.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashboardSettings {
    /// Rows shown in each ranking (top/bottom states, best customers).
    pub top_n: usize,
    /// Share of the total below which a category joins "Others".
    pub others_threshold: f64,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            top_n: 5,
            others_threshold: DEFAULT_OTHERS_THRESHOLD,
        }
    }
}

/// Filter `dataset` to `range` and build every summary table.
pub fn recompute(dataset: &Dataset, range: DateRange, settings: &DashboardSettings) -> Dashboard {
    info!("Recomputing dashboard for {}", range);

    let orders = dataset.filter(&range);

    let daily_orders = daily_orders(&orders);
    let category_popularity = category_popularity(&orders);
    let customers_by_state = customers_by_state(&orders);
    let customers_by_category = customers_by_category(&orders);
    let rfm = rfm(&orders);

    debug!(
        "{} distinct orders over {} days, {} categories, {} states, {} customers",
        distinct_orders(&orders),
        daily_orders.len(),
        category_popularity.len(),
        customers_by_state.len(),
        rfm.len()
    );

    Dashboard {
        range,
        filtered_rows: orders.len(),
        metrics: dashboard_metrics(&daily_orders, &rfm),
        top_states: top_states(&customers_by_state, settings.top_n),
        bottom_states: bottom_states(&customers_by_state, settings.top_n),
        category_distribution: bucket_others(&customers_by_category, settings.others_threshold),
        top_customers: top_rfm(&rfm, settings.top_n),
        daily_orders,
        category_popularity,
        customers_by_state,
        customers_by_category,
        rfm,
    }
}
