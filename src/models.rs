//! Data models for the dashboard.
//!
//! This module contains the order record loaded from the dataset and
//! every summary table derived from it.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single order line from the pre-joined dataset.
///
/// Empty or unparseable cells are carried as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Order identifier (several lines may share one order).
    pub order_id: String,
    /// When the order was placed.
    pub purchase_timestamp: Option<NaiveDateTime>,
    /// Estimated delivery date.
    pub estimated_delivery: Option<NaiveDateTime>,
    /// Payment value of the line.
    pub payment_value: Option<f64>,
    /// Customer identifier.
    pub customer_id: Option<String>,
    /// Customer state code (e.g. "SP").
    pub customer_state: Option<String>,
    /// Product category, English label.
    pub product_category: Option<String>,
}

impl OrderRecord {
    /// Calendar day of the purchase, if the timestamp is known.
    pub fn purchase_date(&self) -> Option<NaiveDate> {
        self.purchase_timestamp.map(|ts| ts.date())
    }

    /// Whether this line refers to an order at all.
    pub fn has_order_id(&self) -> bool {
        !self.order_id.trim().is_empty()
    }
}

/// Errors raised when building a date range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateRangeError {
    #[error("start date {start} is after end date {end}")]
    Inverted { start: NaiveDate, end: NaiveDate },
}

/// Inclusive calendar-day range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a range; both bounds are inclusive.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateRangeError> {
        if start > end {
            return Err(DateRangeError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether a day falls within the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days covered.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Orders and revenue for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    /// Distinct orders placed that day.
    pub order_count: u64,
    /// Summed payment value.
    pub revenue: f64,
}

/// Order volume per product category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPopularity {
    pub category: String,
    pub order_volume: u64,
}

/// Distinct customers per state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateCustomers {
    pub state: String,
    pub customer_count: u64,
}

/// Order lines with a customer, per product category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCustomers {
    pub category: String,
    pub customer_count: u64,
}

/// One slice of the category distribution pie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: String,
    pub customer_count: u64,
    /// Share of the total, in percent.
    pub percent: f64,
}

/// Recency / frequency / monetary scores of one customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RfmRecord {
    pub customer_id: String,
    /// Days between the customer's last order and the latest order in range.
    pub recency: i64,
    /// Distinct orders.
    pub frequency: u64,
    /// Summed payment value.
    pub monetary: f64,
}

/// Mean RFM scores across customers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RfmAverages {
    pub recency: f64,
    pub frequency: f64,
    pub monetary: f64,
}

/// Headline numbers shown above the charts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub total_orders: u64,
    pub total_revenue: f64,
    pub rfm: RfmAverages,
}

/// Best customers by each RFM parameter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopCustomers {
    pub by_recency: Vec<RfmRecord>,
    pub by_frequency: Vec<RfmRecord>,
    pub by_monetary: Vec<RfmRecord>,
}

/// Everything one recompute produces for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub range: DateRange,
    /// Order lines that passed the date filter.
    pub filtered_rows: usize,
    pub metrics: DashboardMetrics,
    pub daily_orders: Vec<DailySummary>,
    pub category_popularity: Vec<CategoryPopularity>,
    pub customers_by_state: Vec<StateCustomers>,
    pub customers_by_category: Vec<CategoryCustomers>,
    pub rfm: Vec<RfmRecord>,
    pub top_states: Vec<StateCustomers>,
    pub bottom_states: Vec<StateCustomers>,
    pub category_distribution: Vec<CategoryShare>,
    pub top_customers: TopCustomers,
}

impl Dashboard {
    /// True when the date filter matched nothing.
    pub fn is_empty(&self) -> bool {
        self.filtered_rows == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_date_range_inclusive() {
        let range = DateRange::new(date("2021-01-01"), date("2021-01-03")).unwrap();
        assert!(range.contains(date("2021-01-01")));
        assert!(range.contains(date("2021-01-03")));
        assert!(!range.contains(date("2021-01-04")));
        assert!(!range.contains(date("2020-12-31")));
        assert_eq!(range.days(), 3);
    }

    #[test]
    fn test_date_range_single_day() {
        let range = DateRange::new(date("2021-01-01"), date("2021-01-01")).unwrap();
        assert!(range.contains(date("2021-01-01")));
        assert_eq!(range.days(), 1);
    }

    #[test]
    fn test_date_range_inverted() {
        let err = DateRange::new(date("2021-02-01"), date("2021-01-01")).unwrap_err();
        assert!(matches!(err, DateRangeError::Inverted { .. }));
        assert!(err.to_string().contains("after"));
    }

    #[test]
    fn test_order_record_helpers() {
        let record = OrderRecord {
            order_id: "  ".to_string(),
            purchase_timestamp: NaiveDate::from_ymd_opt(2021, 1, 1)
                .and_then(|d| d.and_hms_opt(13, 45, 0)),
            estimated_delivery: None,
            payment_value: None,
            customer_id: None,
            customer_state: None,
            product_category: None,
        };
        assert!(!record.has_order_id());
        assert_eq!(record.purchase_date(), Some(date("2021-01-01")));
    }
}
