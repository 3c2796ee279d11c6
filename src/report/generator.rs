//! Markdown dashboard generation.
//!
//! Renders one [`Dashboard`] as a Markdown document: headline metrics,
//! the daily trend, state rankings, the category pie and the RFM panels.
//! Charts become tables with a text bar column.

use crate::models::{
    CategoryPopularity, CategoryShare, DailySummary, Dashboard, DashboardMetrics, RfmRecord,
    StateCustomers,
};
use crate::report::currency::format_currency;
use anyhow::Result;

const BAR_WIDTH: usize = 30;

/// Rendering options.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Currency code shown before monetary values.
    pub currency_code: String,
    /// Document title.
    pub title: String,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            currency_code: "BRL".to_string(),
            title: "Brazilian E-Commerce Dashboard".to_string(),
        }
    }
}

/// Generate the complete Markdown dashboard.
pub fn generate_markdown_report(dashboard: &Dashboard, options: &ReportOptions) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", options.title));
    output.push_str(&format!(
        "*Date range: {} ({} days, {} order lines)*\n\n",
        dashboard.range,
        dashboard.range.days(),
        dashboard.filtered_rows
    ));

    output.push_str(&generate_orders_section(dashboard, options));
    output.push_str(&generate_states_section(
        &dashboard.top_states,
        &dashboard.bottom_states,
    ));
    output.push_str(&generate_products_section(
        &dashboard.category_distribution,
        &dashboard.category_popularity,
    ));
    output.push_str(&generate_rfm_section(dashboard, options));
    output.push_str(&generate_footer());

    output
}

/// Generate a JSON dashboard.
pub fn generate_json_report(dashboard: &Dashboard) -> Result<String> {
    serde_json::to_string_pretty(dashboard).map_err(Into::into)
}

fn generate_metrics_table(metrics: &DashboardMetrics, options: &ReportOptions) -> String {
    let mut table = String::new();

    table.push_str("| Total orders | Total Revenue |\n");
    table.push_str("|:---:|:---:|\n");
    table.push_str(&format!(
        "| {} | {} |\n\n",
        metrics.total_orders,
        format_currency(metrics.total_revenue, &options.currency_code)
    ));

    table
}

fn generate_orders_section(dashboard: &Dashboard, options: &ReportOptions) -> String {
    let mut section = String::new();

    section.push_str("## Orders\n\n");
    section.push_str(&generate_metrics_table(&dashboard.metrics, options));
    section.push_str(&generate_daily_table(&dashboard.daily_orders, options));

    section
}

fn generate_daily_table(daily: &[DailySummary], options: &ReportOptions) -> String {
    if daily.is_empty() {
        return "No orders in the selected range.\n\n".to_string();
    }

    let mut table = String::new();
    let max = daily.iter().map(|d| d.order_count).max().unwrap_or(0);

    table.push_str("### Daily Orders\n\n");
    table.push_str("| Date | Orders | Revenue | |\n");
    table.push_str("|:---|---:|---:|:---|\n");

    for day in daily {
        table.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            day.date,
            day.order_count,
            format_currency(day.revenue, &options.currency_code),
            bar(day.order_count, max)
        ));
    }
    table.push('\n');

    table
}

fn generate_states_section(top: &[StateCustomers], bottom: &[StateCustomers]) -> String {
    let mut section = String::new();

    section.push_str("## Highest and Lowest State with Total Customer\n\n");

    if top.is_empty() {
        section.push_str("No customers in the selected range.\n\n");
        return section;
    }

    section.push_str("### Highest State with Total Customer\n\n");
    section.push_str(&generate_state_table(top));
    section.push_str("### Lowest State with Total Customer\n\n");
    section.push_str(&generate_state_table(bottom));

    section
}

fn generate_state_table(rows: &[StateCustomers]) -> String {
    let mut table = String::new();
    let max = rows.iter().map(|r| r.customer_count).max().unwrap_or(0);

    table.push_str("| State | Customers | |\n");
    table.push_str("|:---|---:|:---|\n");
    for row in rows {
        table.push_str(&format!(
            "| {} | {} | {} |\n",
            row.state,
            row.customer_count,
            bar(row.customer_count, max)
        ));
    }
    table.push('\n');

    table
}

fn generate_products_section(
    distribution: &[CategoryShare],
    popularity: &[CategoryPopularity],
) -> String {
    let mut section = String::new();

    section.push_str("## Product Buying\n\n");

    if distribution.is_empty() {
        section.push_str("No product purchases in the selected range.\n\n");
        return section;
    }

    section.push_str("### Customer Distribution by Product Category\n\n");
    section.push_str("| Category | Customers | Share |\n");
    section.push_str("|:---|---:|---:|\n");
    for slice in distribution {
        section.push_str(&format!(
            "| {} | {} | {:.1}% |\n",
            slice.category, slice.customer_count, slice.percent
        ));
    }
    section.push('\n');

    section.push_str("### Order Volume by Product Category\n\n");
    section.push_str("| Category | Order Volume |\n");
    section.push_str("|:---|---:|\n");
    for row in popularity {
        section.push_str(&format!("| {} | {} |\n", row.category, row.order_volume));
    }
    section.push('\n');

    section
}

fn generate_rfm_section(dashboard: &Dashboard, options: &ReportOptions) -> String {
    let mut section = String::new();
    let averages = &dashboard.metrics.rfm;

    section.push_str("## Best Customer Based on RFM Parameters\n\n");
    section.push_str("| Average Recency (days) | Average Frequency | Average Monetary |\n");
    section.push_str("|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {:.1} | {:.2} | {} |\n\n",
        averages.recency,
        averages.frequency,
        format_currency(averages.monetary, &options.currency_code)
    ));

    if dashboard.rfm.is_empty() {
        section.push_str("No customers in the selected range.\n\n");
        return section;
    }

    let top = &dashboard.top_customers;
    section.push_str("### By Recency (days)\n\n");
    section.push_str(&generate_rfm_table(&top.by_recency, |r| r.recency.to_string()));
    section.push_str("### By Frequency\n\n");
    section.push_str(&generate_rfm_table(&top.by_frequency, |r| {
        r.frequency.to_string()
    }));
    section.push_str("### By Monetary\n\n");
    section.push_str(&generate_rfm_table(&top.by_monetary, |r| {
        format_currency(r.monetary, &options.currency_code)
    }));

    section
}

fn generate_rfm_table<F>(rows: &[RfmRecord], value: F) -> String
where
    F: Fn(&RfmRecord) -> String,
{
    let mut table = String::new();

    table.push_str("| Customer | Value |\n");
    table.push_str("|:---|---:|\n");
    for row in rows {
        table.push_str(&format!("| `{}` | {} |\n", row.customer_id, value(row)));
    }
    table.push('\n');

    table
}

/// Horizontal text bar scaled against `max`.
fn bar(value: u64, max: u64) -> String {
    if max == 0 {
        return String::new();
    }
    let len = ((value as f64 / max as f64) * BAR_WIDTH as f64).round() as usize;
    "█".repeat(len)
}

fn generate_footer() -> String {
    "---\n\n*Report generated by ecomdash*\n".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DateRange, RfmAverages, TopCustomers};
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn create_test_dashboard() -> Dashboard {
        let customer = RfmRecord {
            customer_id: "9ef432eb".to_string(),
            recency: 0,
            frequency: 2,
            monetary: 1376.45,
        };
        let state = |code: &str, count: u64| StateCustomers {
            state: code.to_string(),
            customer_count: count,
        };

        Dashboard {
            range: DateRange::new(date("2021-01-01"), date("2021-01-02")).unwrap(),
            filtered_rows: 3,
            metrics: DashboardMetrics {
                total_orders: 3,
                total_revenue: 1350.0,
                rfm: RfmAverages {
                    recency: 0.5,
                    frequency: 1.5,
                    monetary: 675.0,
                },
            },
            daily_orders: vec![
                DailySummary {
                    date: date("2021-01-01"),
                    order_count: 2,
                    revenue: 150.0,
                },
                DailySummary {
                    date: date("2021-01-02"),
                    order_count: 1,
                    revenue: 1200.0,
                },
            ],
            category_popularity: vec![CategoryPopularity {
                category: "toys".to_string(),
                order_volume: 3,
            }],
            customers_by_state: vec![state("RJ", 1), state("SP", 2)],
            customers_by_category: Vec::new(),
            rfm: vec![customer.clone()],
            top_states: vec![state("SP", 2), state("RJ", 1)],
            bottom_states: vec![state("RJ", 1), state("SP", 2)],
            category_distribution: vec![
                CategoryShare {
                    category: "toys".to_string(),
                    customer_count: 2,
                    percent: 66.666,
                },
                CategoryShare {
                    category: "Others".to_string(),
                    customer_count: 1,
                    percent: 33.333,
                },
            ],
            top_customers: TopCustomers {
                by_recency: vec![customer.clone()],
                by_frequency: vec![customer.clone()],
                by_monetary: vec![customer],
            },
        }
    }

    fn empty_dashboard() -> Dashboard {
        Dashboard {
            range: DateRange::new(date("2030-01-01"), date("2030-01-31")).unwrap(),
            filtered_rows: 0,
            metrics: DashboardMetrics::default(),
            daily_orders: Vec::new(),
            category_popularity: Vec::new(),
            customers_by_state: Vec::new(),
            customers_by_category: Vec::new(),
            rfm: Vec::new(),
            top_states: Vec::new(),
            bottom_states: Vec::new(),
            category_distribution: Vec::new(),
            top_customers: TopCustomers::default(),
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let markdown = generate_markdown_report(&create_test_dashboard(), &ReportOptions::default());

        assert!(markdown.contains("# Brazilian E-Commerce Dashboard"));
        assert!(markdown.contains("2021-01-01 to 2021-01-02"));
        assert!(markdown.contains("## Orders"));
        assert!(markdown.contains("BRL 1.350,00"));
        assert!(markdown.contains("### Highest State with Total Customer"));
        assert!(markdown.contains("| toys | 2 | 66.7% |"));
        assert!(markdown.contains("| Others | 1 | 33.3% |"));
        assert!(markdown.contains("| 0.5 | 1.50 | BRL 675,00 |"));
        assert!(markdown.contains("`9ef432eb`"));
    }

    #[test]
    fn test_generate_markdown_report_empty() {
        let markdown = generate_markdown_report(&empty_dashboard(), &ReportOptions::default());

        assert!(markdown.contains("| 0 | BRL 0,00 |"));
        assert!(markdown.contains("No orders in the selected range."));
        assert!(markdown.contains("No product purchases in the selected range."));
        assert!(markdown.contains("| 0.0 | 0.00 | BRL 0,00 |"));
    }

    #[test]
    fn test_daily_table_bars() {
        let dashboard = create_test_dashboard();
        let table = generate_daily_table(&dashboard.daily_orders, &ReportOptions::default());

        assert!(table.contains(&"█".repeat(BAR_WIDTH)));
        assert!(table.contains("BRL 150,00"));
    }

    #[test]
    fn test_bar() {
        assert_eq!(bar(0, 0), "");
        assert_eq!(bar(5, 10).chars().count(), BAR_WIDTH / 2);
        assert_eq!(bar(10, 10).chars().count(), BAR_WIDTH);
    }

    #[test]
    fn test_generate_json_report() {
        let json = generate_json_report(&create_test_dashboard()).unwrap();

        assert!(json.contains("\"daily_orders\""));
        assert!(json.contains("\"2021-01-01\""));
        assert!(json.contains("\"category_distribution\""));
        assert!(json.contains("\"top_customers\""));
    }
}
