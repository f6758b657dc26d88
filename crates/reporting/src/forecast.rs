//! Forecast-input assembly. Builds the daily feature table handed to a
//! downstream forecaster; no model lives here.

use crate::derive::{ratio, DerivedBusiness, DerivedMarketing};
use crate::join::{join_daily, JoinMode};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastInputRow {
    pub date: NaiveDate,
    pub total_revenue: f64,
    pub orders: u64,
    pub new_customers: u64,
    pub gross_profit: f64,
    pub spend: f64,
    pub attributed_revenue: f64,
    pub clicks: u64,
    pub impressions: u64,
    /// Daily attributed revenue over spend; 0 when spend is 0.
    pub roas: f64,
}

/// One zero-filled row for every date in either table, ascending.
pub fn forecast_input(
    marketing: &[DerivedMarketing],
    business: &[DerivedBusiness],
) -> Vec<ForecastInputRow> {
    let rows: Vec<ForecastInputRow> = join_daily(marketing, business, JoinMode::Outer)
        .into_iter()
        .map(|day| ForecastInputRow {
            date: day.date,
            total_revenue: day.business.total_revenue,
            orders: day.business.orders,
            new_customers: day.business.new_customers,
            gross_profit: day.business.gross_profit,
            spend: day.marketing.spend,
            attributed_revenue: day.marketing.attributed_revenue,
            clicks: day.marketing.clicks,
            impressions: day.marketing.impressions,
            roas: ratio(day.marketing.attributed_revenue, day.marketing.spend).unwrap_or(0.0),
        })
        .collect();
    debug!(days = rows.len(), "Assembled forecast input");
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_intel_core::{BusinessRecord, MarketingRecord, Platform};
    use std::collections::BTreeSet;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn mkt(d: u32, spend: f64, revenue: f64) -> DerivedMarketing {
        DerivedMarketing::from(MarketingRecord {
            date: day(d),
            platform: Platform::TikTok,
            tactic: "Spark".to_string(),
            campaign: "c".to_string(),
            state: "FL".to_string(),
            impressions: 10,
            clicks: 1,
            spend,
            attributed_revenue: revenue,
        })
    }

    fn biz(d: u32) -> DerivedBusiness {
        DerivedBusiness::from(BusinessRecord {
            date: day(d),
            orders: 4,
            new_orders: 2,
            new_customers: 1,
            total_revenue: 90.0,
            gross_profit: 30.0,
            cogs: 60.0,
        })
    }

    #[test]
    fn test_one_row_per_date_in_union() {
        let m = [mkt(1, 10.0, 20.0), mkt(1, 5.0, 10.0), mkt(3, 1.0, 1.0)];
        let b = [biz(2), biz(3)];
        let rows = forecast_input(&m, &b);

        let expected: BTreeSet<NaiveDate> = [day(1), day(2), day(3)].into_iter().collect();
        let got: Vec<NaiveDate> = rows.iter().map(|r| r.date).collect();
        assert_eq!(got, expected.into_iter().collect::<Vec<_>>());

        assert_eq!(rows[0].spend, 15.0);
        assert_eq!(rows[0].roas, 2.0);
        assert_eq!(rows[0].orders, 0);
        assert_eq!(rows[1].spend, 0.0);
        assert_eq!(rows[1].total_revenue, 90.0);
    }

    #[test]
    fn test_zero_spend_roas_collapses_to_zero() {
        let rows = forecast_input(&[mkt(1, 0.0, 50.0)], &[biz(2)]);
        assert!(rows.iter().all(|r| r.roas.is_finite()));
        assert_eq!(rows[0].roas, 0.0);
        assert_eq!(rows[1].roas, 0.0);
    }
}
