//! ROI optimization — per-platform ROI, efficiency scoring, and the budget
//! allocation it recommends.

use crate::aggregate::{group_marketing, rank_descending, shares, Dimension};
use crate::derive::{round2, DerivedMarketing};
use campaign_intel_core::Platform;
use serde::Serialize;
use tracing::debug;

/// Return-on-investment and allocation report for one platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformRoi {
    pub platform: Platform,
    pub spend: f64,
    pub attributed_revenue: f64,
    pub mean_roas: Option<f64>,
    /// `(revenue - spend) / spend * 100` (`None` when spend is zero).
    pub roi: Option<f64>,
    /// `mean_roas * revenue`; an undefined mean ROAS scores zero.
    pub efficiency_score: f64,
    /// Percent of total spend the platform receives today.
    pub current_allocation: f64,
    /// Percent of total efficiency score the platform earns.
    pub recommended_allocation: f64,
    /// `recommended_allocation - current_allocation`.
    pub allocation_gap: f64,
}

/// ROI table sorted by ROI, highest first.
pub fn roi_optimization(records: &[DerivedMarketing]) -> Vec<PlatformRoi> {
    let groups = group_marketing(records, &[Dimension::Platform]);

    let efficiency: Vec<f64> = groups
        .iter()
        .map(|g| round2(g.means.roas.unwrap_or(0.0) * g.totals.attributed_revenue))
        .collect();
    let spend: Vec<f64> = groups.iter().map(|g| g.totals.spend).collect();
    let current = shares(&spend);
    let recommended = shares(&efficiency);

    let mut rows: Vec<PlatformRoi> = groups
        .iter()
        .enumerate()
        .filter_map(|(i, g)| {
            Some(PlatformRoi {
                platform: g.platform()?,
                spend: g.totals.spend,
                attributed_revenue: g.totals.attributed_revenue,
                mean_roas: g.means.roas,
                roi: g.totals.roi(),
                efficiency_score: efficiency[i],
                current_allocation: current[i],
                recommended_allocation: recommended[i],
                allocation_gap: round2(recommended[i] - current[i]),
            })
        })
        .collect();

    rank_descending(&mut rows, |r| r.roi);
    debug!(platforms = rows.len(), "Computed ROI optimization");
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_intel_core::MarketingRecord;
    use chrono::NaiveDate;

    fn row(platform: Platform, spend: f64, revenue: f64) -> DerivedMarketing {
        DerivedMarketing::from(MarketingRecord {
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            platform,
            tactic: "t".to_string(),
            campaign: "c".to_string(),
            state: "TX".to_string(),
            impressions: 500,
            clicks: 25,
            spend,
            attributed_revenue: revenue,
        })
    }

    #[test]
    fn test_single_platform_roas_and_roi() {
        let rows = roi_optimization(&[row(Platform::Facebook, 100.0, 250.0)]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].mean_roas, Some(2.5));
        assert_eq!(rows[0].roi, Some(150.0));
        assert_eq!(rows[0].efficiency_score, 625.0);
        assert_eq!(rows[0].current_allocation, 100.0);
        assert_eq!(rows[0].recommended_allocation, 100.0);
        assert_eq!(rows[0].allocation_gap, 0.0);
    }

    #[test]
    fn test_sorted_by_roi_and_allocations() {
        let rows = roi_optimization(&[
            row(Platform::Facebook, 100.0, 100.0),
            row(Platform::Google, 100.0, 300.0),
        ]);
        assert_eq!(rows[0].platform, Platform::Google);
        assert_eq!(rows[0].roi, Some(200.0));
        assert_eq!(rows[1].roi, Some(0.0));
        // efficiency: google 3 * 300 = 900, facebook 1 * 100 = 100
        assert_eq!(rows[0].recommended_allocation, 90.0);
        assert_eq!(rows[0].current_allocation, 50.0);
        assert_eq!(rows[0].allocation_gap, 40.0);
        assert_eq!(rows[1].allocation_gap, -40.0);
    }

    #[test]
    fn test_zero_spend_platform_has_undefined_roi() {
        let rows = roi_optimization(&[
            row(Platform::TikTok, 0.0, 40.0),
            row(Platform::Google, 10.0, 20.0),
        ]);
        assert_eq!(rows[0].platform, Platform::Google);
        let tiktok = &rows[1];
        assert!(tiktok.roi.is_none());
        assert!(tiktok.mean_roas.is_none());
        assert_eq!(tiktok.efficiency_score, 0.0);
        assert_eq!(tiktok.current_allocation, 0.0);
    }
}
