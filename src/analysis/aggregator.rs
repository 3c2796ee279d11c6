//! Order aggregation.
//!
//! Each aggregator is a pure function from the date-filtered order lines
//! to a freshly built summary table. Missing cells are skipped the same way
//! a dataframe reduction skips nulls.

use crate::models::{
    CategoryCustomers, CategoryPopularity, DailySummary, OrderRecord, RfmRecord, StateCustomers,
};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Distinct orders and revenue per calendar day.
///
/// Days are laid out contiguously from the first to the last purchase day,
/// so days without orders appear with zero totals.
pub fn daily_orders(orders: &[&OrderRecord]) -> Vec<DailySummary> {
    let mut by_day: BTreeMap<NaiveDate, (HashSet<&str>, f64)> = BTreeMap::new();

    for order in orders {
        let Some(day) = order.purchase_date() else {
            continue;
        };
        let (ids, revenue) = by_day.entry(day).or_default();
        if order.has_order_id() {
            ids.insert(order.order_id.as_str());
        }
        *revenue += order.payment_value.unwrap_or(0.0);
    }

    let (Some(&first), Some(&last)) = (by_day.keys().next(), by_day.keys().next_back()) else {
        return Vec::new();
    };

    first
        .iter_days()
        .take_while(|day| *day <= last)
        .map(|date| match by_day.get(&date) {
            Some((ids, revenue)) => DailySummary {
                date,
                order_count: ids.len() as u64,
                revenue: *revenue,
            },
            None => DailySummary {
                date,
                order_count: 0,
                revenue: 0.0,
            },
        })
        .collect()
}

/// Order volume per product category, highest first.
///
/// Ties keep ascending category order.
pub fn category_popularity(orders: &[&OrderRecord]) -> Vec<CategoryPopularity> {
    let mut volume: BTreeMap<&str, u64> = BTreeMap::new();

    for order in orders {
        if let Some(category) = order.product_category.as_deref() {
            *volume.entry(category).or_default() += u64::from(order.has_order_id());
        }
    }

    let mut rows: Vec<CategoryPopularity> = volume
        .into_iter()
        .map(|(category, order_volume)| CategoryPopularity {
            category: category.to_string(),
            order_volume,
        })
        .collect();

    rows.sort_by_key(|r| std::cmp::Reverse(r.order_volume));
    rows
}

/// Distinct customers per state, in state-code order.
///
/// Callers pick the ranking direction with `top_states` / `bottom_states`.
pub fn customers_by_state(orders: &[&OrderRecord]) -> Vec<StateCustomers> {
    let mut customers: BTreeMap<&str, HashSet<&str>> = BTreeMap::new();

    for order in orders {
        if let Some(state) = order.customer_state.as_deref() {
            let ids = customers.entry(state).or_default();
            if let Some(customer) = order.customer_id.as_deref() {
                ids.insert(customer);
            }
        }
    }

    customers
        .into_iter()
        .map(|(state, ids)| StateCustomers {
            state: state.to_string(),
            customer_count: ids.len() as u64,
        })
        .collect()
}

/// Order lines carrying a customer, per product category, highest first.
///
/// This counts lines, not distinct customers: a customer buying twice in a
/// category is counted twice.
pub fn customers_by_category(orders: &[&OrderRecord]) -> Vec<CategoryCustomers> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();

    for order in orders {
        if let Some(category) = order.product_category.as_deref() {
            *counts.entry(category).or_default() += u64::from(order.customer_id.is_some());
        }
    }

    let mut rows: Vec<CategoryCustomers> = counts
        .into_iter()
        .map(|(category, customer_count)| CategoryCustomers {
            category: category.to_string(),
            customer_count,
        })
        .collect();

    rows.sort_by_key(|r| std::cmp::Reverse(r.customer_count));
    rows
}

#[derive(Default)]
struct CustomerActivity<'a> {
    last_purchase: Option<NaiveDate>,
    orders: HashSet<&'a str>,
    spent: f64,
}

/// Recency, frequency and monetary value per customer, in customer-id order.
///
/// Recency is measured against the latest purchase day among `orders`, not
/// against today.
pub fn rfm(orders: &[&OrderRecord]) -> Vec<RfmRecord> {
    let recent_date = orders.iter().filter_map(|o| o.purchase_date()).max();
    let mut activity: BTreeMap<&str, CustomerActivity<'_>> = BTreeMap::new();

    for order in orders {
        let Some(customer) = order.customer_id.as_deref() else {
            continue;
        };
        let entry = activity.entry(customer).or_default();
        entry.last_purchase = entry.last_purchase.max(order.purchase_date());
        if order.has_order_id() {
            entry.orders.insert(order.order_id.as_str());
        }
        entry.spent += order.payment_value.unwrap_or(0.0);
    }

    let mut rows = Vec::with_capacity(activity.len());
    for (customer, act) in activity {
        let (Some(recent), Some(last)) = (recent_date, act.last_purchase) else {
            debug!("Skipping customer {} with no dated purchase", customer);
            continue;
        };
        rows.push(RfmRecord {
            customer_id: customer.to_string(),
            recency: (recent - last).num_days(),
            frequency: act.orders.len() as u64,
            monetary: act.spent,
        });
    }

    rows
}

/// Distinct orders across the given lines.
pub fn distinct_orders(orders: &[&OrderRecord]) -> usize {
    orders
        .iter()
        .filter(|o| o.has_order_id())
        .map(|o| o.order_id.as_str())
        .collect::<HashSet<_>>()
        .len()
}
