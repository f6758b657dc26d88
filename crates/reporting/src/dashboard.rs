//! Dashboard views — filtered KPI overview and the platform, campaign,
//! tactic and geography breakdowns the reporting surface renders.

use crate::aggregate::{group_marketing, rank_descending, AggregatedGroup, Dimension};
use crate::derive::{mean_defined, ratio, round2};
use crate::insights::best_by_mean_roas;
use crate::join::{daily_business, daily_marketing};
use crate::pipeline::PreparedData;
use campaign_intel_core::Platform;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Inclusive date window plus a platform allow-list. An empty list admits
/// every platform; platforms only narrow the marketing table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportFilter {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    #[serde(default)]
    pub platforms: Vec<Platform>,
}

impl ReportFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn accepts_date(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }

    pub fn accepts_platform(&self, platform: Platform) -> bool {
        self.platforms.is_empty() || self.platforms.contains(&platform)
    }

    /// A filtered copy; the input is left untouched.
    pub fn apply(&self, data: &PreparedData) -> PreparedData {
        PreparedData {
            marketing: data
                .marketing
                .iter()
                .filter(|r| self.accepts_date(r.record.date) && self.accepts_platform(r.record.platform))
                .cloned()
                .collect(),
            business: data
                .business
                .iter()
                .filter(|r| self.accepts_date(r.record.date))
                .cloned()
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiOverview {
    pub total_revenue: f64,
    pub total_spend: f64,
    /// Summed attributed revenue over summed spend.
    pub overall_roas: Option<f64>,
    /// Mean of per-record ROAS.
    pub mean_roas: Option<f64>,
    pub total_orders: u64,
    /// Mean day-over-day % change of daily business revenue.
    pub revenue_delta_pct: Option<f64>,
    /// Mean day-over-day % change of daily spend across platforms.
    pub spend_delta_pct: Option<f64>,
    pub orders_delta_pct: Option<f64>,
}

/// Daily business revenue and gross profit, for the trend chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RevenueTrendPoint {
    pub date: NaiveDate,
    pub total_revenue: f64,
    pub gross_profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformPerformance {
    pub platform: Platform,
    pub spend: f64,
    pub attributed_revenue: f64,
    pub clicks: u64,
    pub impressions: u64,
    /// From the platform's sums, not averaged.
    pub roas: Option<f64>,
    pub ctr: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignPerformance {
    pub platform: Platform,
    pub campaign: String,
    pub spend: f64,
    pub attributed_revenue: f64,
    pub clicks: u64,
    pub impressions: u64,
    pub mean_roas: Option<f64>,
    pub roi: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TacticPerformance {
    pub platform: Platform,
    pub tactic: String,
    pub spend: f64,
    pub attributed_revenue: f64,
    pub mean_roas: Option<f64>,
    pub mean_ctr: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoPerformance {
    pub state: String,
    pub spend: f64,
    pub attributed_revenue: f64,
    pub clicks: u64,
    pub mean_roas: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub filter: ReportFilter,
    pub kpis: KpiOverview,
    pub revenue_trend: Vec<RevenueTrendPoint>,
    pub platforms: Vec<PlatformPerformance>,
    pub campaigns: Vec<CampaignPerformance>,
    pub tactics: Vec<TacticPerformance>,
    pub geography: Vec<GeoPerformance>,
    pub recommendations: Vec<String>,
}

/// Mean of the step-to-step % changes of a date-ordered series, rounded to
/// two decimals. A step from zero is undefined and skipped.
pub fn mean_pct_change<I>(series: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let values: Vec<f64> = series.into_iter().collect();
    let steps = values
        .windows(2)
        .map(|w| ratio(w[1] - w[0], w[0]).map(|v| v * 100.0));
    mean_defined(steps).map(round2)
}

pub fn kpi_overview(data: &PreparedData) -> KpiOverview {
    let total_spend: f64 = data.marketing.iter().map(|r| r.record.spend).sum();
    let attributed: f64 = data.marketing.iter().map(|r| r.record.attributed_revenue).sum();
    let business_days = daily_business(&data.business);
    let marketing_days = daily_marketing(&data.marketing);
    KpiOverview {
        total_revenue: data.business.iter().map(|r| r.record.total_revenue).sum(),
        total_spend,
        overall_roas: ratio(attributed, total_spend),
        mean_roas: mean_defined(data.marketing.iter().map(|r| r.metrics.roas)),
        total_orders: data.business.iter().map(|r| r.record.orders).sum(),
        revenue_delta_pct: mean_pct_change(business_days.values().map(|d| d.total_revenue)),
        spend_delta_pct: mean_pct_change(marketing_days.values().map(|d| d.spend)),
        orders_delta_pct: mean_pct_change(business_days.values().map(|d| d.orders as f64)),
    }
}

pub fn revenue_trend(data: &PreparedData) -> Vec<RevenueTrendPoint> {
    daily_business(&data.business)
        .into_iter()
        .map(|(date, day)| RevenueTrendPoint {
            date,
            total_revenue: day.total_revenue,
            gross_profit: day.gross_profit,
        })
        .collect()
}

pub fn platform_performance(data: &PreparedData) -> Vec<PlatformPerformance> {
    group_marketing(&data.marketing, &[Dimension::Platform])
        .into_iter()
        .filter_map(|g| {
            Some(PlatformPerformance {
                platform: g.platform()?,
                spend: g.totals.spend,
                attributed_revenue: g.totals.attributed_revenue,
                clicks: g.totals.clicks,
                impressions: g.totals.impressions,
                roas: g.totals.roas(),
                ctr: g.totals.ctr(),
            })
        })
        .collect()
}

/// Campaigns by ROI, highest first.
pub fn campaign_performance(data: &PreparedData) -> Vec<CampaignPerformance> {
    let mut rows: Vec<CampaignPerformance> =
        group_marketing(&data.marketing, &[Dimension::Platform, Dimension::Campaign])
            .into_iter()
            .filter_map(|g| {
                Some(CampaignPerformance {
                    platform: g.platform()?,
                    campaign: g.key_text(1),
                    spend: g.totals.spend,
                    attributed_revenue: g.totals.attributed_revenue,
                    clicks: g.totals.clicks,
                    impressions: g.totals.impressions,
                    mean_roas: g.means.roas,
                    roi: g.totals.roi(),
                })
            })
            .collect();
    rank_descending(&mut rows, |r| r.roi);
    rows
}

pub fn tactic_performance(data: &PreparedData) -> Vec<TacticPerformance> {
    group_marketing(&data.marketing, &[Dimension::Platform, Dimension::Tactic])
        .into_iter()
        .filter_map(|g| {
            Some(TacticPerformance {
                platform: g.platform()?,
                tactic: g.key_text(1),
                spend: g.totals.spend,
                attributed_revenue: g.totals.attributed_revenue,
                mean_roas: g.means.roas,
                mean_ctr: g.means.ctr,
            })
        })
        .collect()
}

pub fn geographic_performance(data: &PreparedData) -> Vec<GeoPerformance> {
    group_marketing(&data.marketing, &[Dimension::State])
        .into_iter()
        .map(|g| GeoPerformance {
            state: g.key_text(0),
            spend: g.totals.spend,
            attributed_revenue: g.totals.attributed_revenue,
            clicks: g.totals.clicks,
            mean_roas: g.means.roas,
        })
        .collect()
}

fn best_label(groups: &[AggregatedGroup]) -> Option<String> {
    best_by_mean_roas(groups).map(|(g, _)| g.label())
}

/// Budget recommendations naming the best platform and tactic by mean ROAS.
pub fn recommendations(data: &PreparedData) -> Vec<String> {
    let platform = best_label(&group_marketing(&data.marketing, &[Dimension::Platform]));
    let tactic = best_label(&group_marketing(&data.marketing, &[Dimension::Tactic]));

    let mut out = vec!["Scale high-ROI campaigns: focus budget on the top of the campaign ROI table".to_string()];
    if let Some(p) = platform {
        out.push(format!("Platform optimization: allocate more budget to {p}"));
    }
    if let Some(t) = tactic {
        out.push(format!("Tactic refinement: increase investment in {t} tactics"));
    }
    out.push("Geographic expansion: extend strategies from the strongest states".to_string());
    out.push("Performance monitoring: track ROAS trends and adjust accordingly".to_string());
    out
}

/// Build every dashboard table over the filtered data.
pub fn build_dashboard(data: &PreparedData, filter: &ReportFilter, top_campaigns: usize) -> DashboardView {
    let filtered = filter.apply(data);
    debug!(
        marketing_rows = filtered.marketing.len(),
        business_rows = filtered.business.len(),
        "Building dashboard view"
    );

    let mut campaigns = campaign_performance(&filtered);
    campaigns.truncate(top_campaigns);

    DashboardView {
        filter: filter.clone(),
        kpis: kpi_overview(&filtered),
        revenue_trend: revenue_trend(&filtered),
        platforms: platform_performance(&filtered),
        campaigns,
        tactics: tactic_performance(&filtered),
        geography: geographic_performance(&filtered),
        recommendations: recommendations(&filtered),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::{DerivedBusiness, DerivedMarketing};
    use campaign_intel_core::{BusinessRecord, MarketingRecord};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn mkt(d: u32, platform: Platform, campaign: &str, state: &str, spend: f64, revenue: f64) -> DerivedMarketing {
        DerivedMarketing::from(MarketingRecord {
            date: day(d),
            platform,
            tactic: format!("{platform}-tactic"),
            campaign: campaign.to_string(),
            state: state.to_string(),
            impressions: 1000,
            clicks: 50,
            spend,
            attributed_revenue: revenue,
        })
    }

    fn biz(d: u32, revenue: f64, orders: u64) -> DerivedBusiness {
        DerivedBusiness::from(BusinessRecord {
            date: day(d),
            orders,
            new_orders: 1,
            new_customers: 1,
            total_revenue: revenue,
            gross_profit: 0.0,
            cogs: 0.0,
        })
    }

    fn sample() -> PreparedData {
        PreparedData {
            marketing: vec![
                mkt(1, Platform::Facebook, "fb-a", "CA", 100.0, 150.0),
                mkt(2, Platform::Google, "g-a", "NY", 100.0, 400.0),
                mkt(3, Platform::TikTok, "tt-a", "CA", 50.0, 25.0),
                mkt(4, Platform::Google, "g-b", "TX", 0.0, 10.0),
            ],
            business: vec![biz(1, 1000.0, 10), biz(2, 800.0, 8), biz(4, 600.0, 6)],
        }
    }

    #[test]
    fn test_filter_by_date_and_platform() {
        let filter = ReportFilter {
            start: Some(day(2)),
            end: Some(day(3)),
            platforms: vec![Platform::Google],
        };
        let out = filter.apply(&sample());
        assert_eq!(out.marketing.len(), 1);
        assert_eq!(out.marketing[0].record.campaign, "g-a");
        assert_eq!(out.business.len(), 1);
    }

    #[test]
    fn test_kpis() {
        let kpis = kpi_overview(&sample());
        assert_eq!(kpis.total_revenue, 2400.0);
        assert_eq!(kpis.total_spend, 250.0);
        assert_eq!(kpis.overall_roas, Some(2.34));
        assert_eq!(kpis.total_orders, 24);
        // 1.5, 4.0, 0.5 (zero-spend row skipped)
        assert_eq!(kpis.mean_roas, Some(2.0));
        // revenue 1000 -> 800 -> 600: -20%, -25%
        assert_eq!(kpis.revenue_delta_pct, Some(-22.5));
        assert_eq!(kpis.orders_delta_pct, Some(-22.5));
        // spend 100 -> 100 -> 50 -> 0: 0%, -50%, -100%
        assert_eq!(kpis.spend_delta_pct, Some(-50.0));
    }

    #[test]
    fn test_delta_skips_step_from_zero_day() {
        assert_eq!(mean_pct_change([0.0, 100.0, 150.0]), Some(50.0));
        assert_eq!(mean_pct_change([0.0, 100.0]), None);
        assert_eq!(mean_pct_change([250.0]), None);
        assert_eq!(mean_pct_change(Vec::new()), None);

        let data = PreparedData {
            marketing: Vec::new(),
            business: vec![biz(1, 0.0, 0), biz(2, 400.0, 4), biz(3, 500.0, 5)],
        };
        let kpis = kpi_overview(&data);
        assert_eq!(kpis.revenue_delta_pct, Some(25.0));
        assert_eq!(kpis.orders_delta_pct, Some(25.0));
        assert_eq!(kpis.spend_delta_pct, None);
        assert!(kpis.overall_roas.is_none());
    }

    #[test]
    fn test_revenue_trend_is_date_ordered() {
        let mut data = sample();
        data.business.reverse();
        data.business[0].record.gross_profit = 120.0;
        let trend = revenue_trend(&data);
        let dates: Vec<_> = trend.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![day(1), day(2), day(4)]);
        assert_eq!(trend[0].total_revenue, 1000.0);
        assert_eq!(trend[2].total_revenue, 600.0);
        assert_eq!(trend[2].gross_profit, 120.0);

        let filter = ReportFilter {
            start: Some(day(2)),
            end: None,
            platforms: Vec::new(),
        };
        let view = build_dashboard(&sample(), &filter, 10);
        assert_eq!(view.revenue_trend.len(), 2);
        assert_eq!(view.revenue_trend[0].date, day(2));
    }

    #[test]
    fn test_platform_roas_from_sums() {
        let rows = platform_performance(&sample());
        let google = rows.iter().find(|r| r.platform == Platform::Google).unwrap();
        assert_eq!(google.roas, Some(4.1));
        assert_eq!(google.ctr, Some(5.0));
    }

    #[test]
    fn test_campaigns_sorted_by_roi_and_truncated() {
        let view = build_dashboard(&sample(), &ReportFilter::all(), 2);
        assert_eq!(view.campaigns.len(), 2);
        assert_eq!(view.campaigns[0].campaign, "g-a");
        assert_eq!(view.campaigns[0].roi, Some(300.0));
        assert_eq!(view.campaigns[1].campaign, "fb-a");

        let all = campaign_performance(&sample());
        assert!(all.last().unwrap().roi.is_none());
    }

    #[test]
    fn test_geography_and_recommendations() {
        let view = build_dashboard(&sample(), &ReportFilter::all(), 10);
        let states: Vec<_> = view.geography.iter().map(|g| g.state.as_str()).collect();
        assert_eq!(states, vec!["CA", "NY", "TX"]);
        assert_eq!(view.geography[0].spend, 150.0);
        assert!(view
            .recommendations
            .iter()
            .any(|r| r == "Platform optimization: allocate more budget to Google"));
        assert!(view
            .recommendations
            .iter()
            .any(|r| r == "Tactic refinement: increase investment in Google-tactic tactics"));
        assert_eq!(view.recommendations.len(), 5);
        assert_eq!(
            view.recommendations.last().map(String::as_str),
            Some("Performance monitoring: track ROAS trends and adjust accordingly")
        );
    }
}
