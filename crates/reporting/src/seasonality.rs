//! Marketing and business performance by month of year.
//!
//! The two tables are computed independently and can be consumed apart.

use crate::aggregate::{group_business, group_marketing, Dimension, Period};
use crate::derive::{DerivedBusiness, DerivedMarketing};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyMarketing {
    /// 1–12
    pub month: u32,
    pub spend: f64,
    pub attributed_revenue: f64,
    pub mean_roas: Option<f64>,
    pub mean_ctr: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyBusiness {
    /// 1–12
    pub month: u32,
    pub total_revenue: f64,
    pub orders: u64,
    pub new_customers: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Seasonality {
    pub marketing: Vec<MonthlyMarketing>,
    pub business: Vec<MonthlyBusiness>,
}

pub fn monthly_marketing(records: &[DerivedMarketing]) -> Vec<MonthlyMarketing> {
    group_marketing(records, &[Dimension::Month])
        .into_iter()
        .filter_map(|g| {
            Some(MonthlyMarketing {
                month: g.key.first()?.as_month()?,
                spend: g.totals.spend,
                attributed_revenue: g.totals.attributed_revenue,
                mean_roas: g.means.roas,
                mean_ctr: g.means.ctr,
            })
        })
        .collect()
}

pub fn monthly_business(records: &[DerivedBusiness]) -> Vec<MonthlyBusiness> {
    group_business(records, Period::MonthOfYear)
        .into_iter()
        .filter_map(|g| {
            Some(MonthlyBusiness {
                month: g.key.as_month()?,
                total_revenue: g.total_revenue,
                orders: g.orders,
                new_customers: g.new_customers,
            })
        })
        .collect()
}

pub fn seasonality(marketing: &[DerivedMarketing], business: &[DerivedBusiness]) -> Seasonality {
    Seasonality {
        marketing: monthly_marketing(marketing),
        business: monthly_business(business),
    }
}
