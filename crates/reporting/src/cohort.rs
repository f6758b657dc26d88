//! Cohort analysis — per-customer value of each monthly acquisition cohort.

use crate::aggregate::{group_business, Period};
use crate::derive::{ratio, round2, DerivedBusiness};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortRow {
    /// First day of the acquisition month.
    pub cohort_month: NaiveDate,
    pub new_customers: u64,
    pub total_revenue: f64,
    pub orders: u64,
    /// `None` when the month acquired no customers.
    pub revenue_per_customer: Option<f64>,
    pub orders_per_customer: Option<f64>,
}

/// One row per calendar month present in the business log, ascending.
pub fn cohort_analysis(records: &[DerivedBusiness]) -> Vec<CohortRow> {
    group_business(records, Period::YearMonth)
        .into_iter()
        .filter_map(|g| {
            let customers = g.new_customers as f64;
            Some(CohortRow {
                cohort_month: g.key.month_start()?,
                new_customers: g.new_customers,
                total_revenue: g.total_revenue,
                orders: g.orders,
                revenue_per_customer: ratio(g.total_revenue, customers).map(round2),
                orders_per_customer: ratio(g.orders as f64, customers).map(round2),
            })
        })
        .collect()
}
