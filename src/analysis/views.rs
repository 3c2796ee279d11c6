//! Chart-ready views over the summary tables.
//!
//! Ranking, "Others" bucketing for the category pie, and the headline
//! metrics. All sorts are stable so ties keep their input order.

use crate::models::{
    CategoryCustomers, CategoryShare, DailySummary, DashboardMetrics, RfmAverages, RfmRecord,
    StateCustomers, TopCustomers,
};

/// Label of the merged slice in the category pie.
pub const OTHERS_LABEL: &str = "Others";

/// Default share below which a category is merged into "Others".
pub const DEFAULT_OTHERS_THRESHOLD: f64 = 0.015;

/// States with the most customers.
pub fn top_states(rows: &[StateCustomers], n: usize) -> Vec<StateCustomers> {
    let mut sorted = rows.to_vec();
    sorted.sort_by_key(|r| std::cmp::Reverse(r.customer_count));
    sorted.truncate(n);
    sorted
}

/// States with the fewest customers.
pub fn bottom_states(rows: &[StateCustomers], n: usize) -> Vec<StateCustomers> {
    let mut sorted = rows.to_vec();
    sorted.sort_by_key(|r| r.customer_count);
    sorted.truncate(n);
    sorted
}

/// Merge small categories into a trailing "Others" slice.
///
/// A category stays on its own when its count is at least
/// `threshold_ratio * total`; everything strictly below is summed into
/// "Others". The "Others" slice is only emitted when something was merged.
pub fn bucket_others(rows: &[CategoryCustomers], threshold_ratio: f64) -> Vec<CategoryShare> {
    let total: u64 = rows.iter().map(|r| r.customer_count).sum();
    let threshold = threshold_ratio * total as f64;

    let mut slices: Vec<CategoryShare> = Vec::new();
    let mut others = 0u64;
    let mut merged = 0usize;

    for row in rows {
        if (row.customer_count as f64) < threshold {
            others += row.customer_count;
            merged += 1;
        } else {
            slices.push(CategoryShare {
                category: row.category.clone(),
                customer_count: row.customer_count,
                percent: percent_of(row.customer_count, total),
            });
        }
    }

    if merged > 0 {
        slices.push(CategoryShare {
            category: OTHERS_LABEL.to_string(),
            customer_count: others,
            percent: percent_of(others, total),
        });
    }

    slices
}

fn percent_of(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

/// Best customers by each RFM parameter: most recent, most frequent and
/// highest spending.
pub fn top_rfm(rows: &[RfmRecord], n: usize) -> TopCustomers {
    let mut by_recency = rows.to_vec();
    by_recency.sort_by_key(|r| r.recency);
    by_recency.truncate(n);

    let mut by_frequency = rows.to_vec();
    by_frequency.sort_by_key(|r| std::cmp::Reverse(r.frequency));
    by_frequency.truncate(n);

    let mut by_monetary = rows.to_vec();
    by_monetary.sort_by(|a, b| b.monetary.total_cmp(&a.monetary));
    by_monetary.truncate(n);

    TopCustomers {
        by_recency,
        by_frequency,
        by_monetary,
    }
}

/// Mean recency, frequency and monetary value; zero when there are no
/// customers.
pub fn rfm_averages(rows: &[RfmRecord]) -> RfmAverages {
    if rows.is_empty() {
        return RfmAverages::default();
    }

    let n = rows.len() as f64;
    RfmAverages {
        recency: rows.iter().map(|r| r.recency as f64).sum::<f64>() / n,
        frequency: rows.iter().map(|r| r.frequency as f64).sum::<f64>() / n,
        monetary: rows.iter().map(|r| r.monetary).sum::<f64>() / n,
    }
}

/// Total orders and revenue over the daily table, plus RFM averages.
pub fn dashboard_metrics(daily: &[DailySummary], rfm: &[RfmRecord]) -> DashboardMetrics {
    DashboardMetrics {
        total_orders: daily.iter().map(|d| d.order_count).sum(),
        total_revenue: daily.iter().map(|d| d.revenue).sum(),
        rfm: rfm_averages(rfm),
    }
}
