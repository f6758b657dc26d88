//! Aligns marketing and business activity by calendar date.

use crate::derive::{DerivedBusiness, DerivedMarketing};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Marketing activity rolled up across platforms and tactics for one date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyMarketing {
    pub spend: f64,
    pub attributed_revenue: f64,
    pub clicks: u64,
    pub impressions: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyBusiness {
    pub total_revenue: f64,
    pub orders: u64,
    pub new_orders: u64,
    pub new_customers: u64,
    pub gross_profit: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinMode {
    /// Only dates present in both tables.
    Inner,
    /// Every date in either table, zero-filling the missing side.
    Outer,
}

/// One joined calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JoinedDay {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub marketing: DailyMarketing,
    #[serde(flatten)]
    pub business: DailyBusiness,
}

/// Sum marketing rows per date, ascending by date.
pub fn daily_marketing(records: &[DerivedMarketing]) -> BTreeMap<NaiveDate, DailyMarketing> {
    let mut days: BTreeMap<NaiveDate, DailyMarketing> = BTreeMap::new();
    for row in records {
        let day = days.entry(row.record.date).or_default();
        day.spend += row.record.spend;
        day.attributed_revenue += row.record.attributed_revenue;
        day.clicks += row.record.clicks;
        day.impressions += row.record.impressions;
    }
    days
}

/// Business rows per date. Dates are unique after normalization; summing
/// keeps the one-row-per-date guarantee regardless.
pub fn daily_business(records: &[DerivedBusiness]) -> BTreeMap<NaiveDate, DailyBusiness> {
    let mut days: BTreeMap<NaiveDate, DailyBusiness> = BTreeMap::new();
    for row in records {
        let day = days.entry(row.record.date).or_default();
        day.total_revenue += row.record.total_revenue;
        day.orders += row.record.orders;
        day.new_orders += row.record.new_orders;
        day.new_customers += row.record.new_customers;
        day.gross_profit += row.record.gross_profit;
    }
    days
}

/// Join the two tables by exact date. At most one row per date, ascending.
pub fn join_daily(
    marketing: &[DerivedMarketing],
    business: &[DerivedBusiness],
    mode: JoinMode,
) -> Vec<JoinedDay> {
    let mkt = daily_marketing(marketing);
    let biz = daily_business(business);

    match mode {
        JoinMode::Inner => mkt
            .iter()
            .filter_map(|(date, m)| {
                biz.get(date).map(|b| JoinedDay {
                    date: *date,
                    marketing: *m,
                    business: *b,
                })
            })
            .collect(),
        JoinMode::Outer => {
            let mut dates: Vec<NaiveDate> = mkt.keys().chain(biz.keys()).copied().collect();
            dates.sort_unstable();
            dates.dedup();
            dates
                .into_iter()
                .map(|date| JoinedDay {
                    date,
                    marketing: mkt.get(&date).copied().unwrap_or_default(),
                    business: biz.get(&date).copied().unwrap_or_default(),
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_intel_core::{BusinessRecord, MarketingRecord, Platform};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn mkt(d: u32, platform: Platform, spend: f64) -> DerivedMarketing {
        DerivedMarketing::from(MarketingRecord {
            date: day(d),
            platform,
            tactic: "t".to_string(),
            campaign: "c".to_string(),
            state: "NY".to_string(),
            impressions: 100,
            clicks: 5,
            spend,
            attributed_revenue: spend * 2.0,
        })
    }

    fn biz(d: u32, revenue: f64) -> DerivedBusiness {
        DerivedBusiness::from(BusinessRecord {
            date: day(d),
            orders: 3,
            new_orders: 1,
            new_customers: 1,
            total_revenue: revenue,
            gross_profit: revenue / 2.0,
            cogs: revenue / 2.0,
        })
    }

    #[test]
    fn test_daily_marketing_sums_across_platforms() {
        let days = daily_marketing(&[mkt(1, Platform::Facebook, 10.0), mkt(1, Platform::TikTok, 5.0)]);
        assert_eq!(days.len(), 1);
        let d = days[&day(1)];
        assert_eq!(d.spend, 15.0);
        assert_eq!(d.attributed_revenue, 30.0);
        assert_eq!(d.clicks, 10);
        assert_eq!(d.impressions, 200);
    }

    #[test]
    fn test_inner_join_is_intersection() {
        let m = [mkt(1, Platform::Google, 1.0), mkt(2, Platform::Google, 1.0), mkt(4, Platform::Google, 1.0)];
        let b = [biz(2, 10.0), biz(3, 10.0), biz(4, 10.0)];
        let joined = join_daily(&m, &b, JoinMode::Inner);
        let dates: Vec<_> = joined.iter().map(|j| j.date).collect();
        assert_eq!(dates, vec![day(2), day(4)]);
    }

    #[test]
    fn test_outer_join_is_union_with_zero_fill() {
        let m = [mkt(1, Platform::Google, 7.0), mkt(2, Platform::Google, 1.0)];
        let b = [biz(2, 10.0), biz(3, 20.0)];
        let joined = join_daily(&m, &b, JoinMode::Outer);
        let dates: Vec<_> = joined.iter().map(|j| j.date).collect();
        assert_eq!(dates, vec![day(1), day(2), day(3)]);

        assert_eq!(joined[0].marketing.spend, 7.0);
        assert_eq!(joined[0].business, DailyBusiness::default());
        assert_eq!(joined[2].marketing, DailyMarketing::default());
        assert_eq!(joined[2].business.total_revenue, 20.0);
    }

    #[test]
    fn test_join_of_empty_tables() {
        assert!(join_daily(&[], &[], JoinMode::Outer).is_empty());
        assert!(join_daily(&[mkt(1, Platform::Google, 1.0)], &[], JoinMode::Inner).is_empty());
    }
}
