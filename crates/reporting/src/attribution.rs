//! Revenue attribution — how attributed revenue and spend split across
//! platform/tactic combinations.

use crate::aggregate::{group_marketing, rank_descending, shares, Dimension};
use crate::derive::DerivedMarketing;
use campaign_intel_core::Platform;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributionRow {
    pub platform: Platform,
    pub tactic: String,
    pub spend: f64,
    pub attributed_revenue: f64,
    pub clicks: u64,
    pub impressions: u64,
    pub mean_roas: Option<f64>,
    /// Percent of all attributed revenue.
    pub revenue_share: f64,
    /// Percent of all spend.
    pub spend_share: f64,
}

impl AttributionRow {
    /// Revenue share minus spend share. Positive means the combination
    /// returns more than its slice of the budget.
    pub fn share_gap(&self) -> f64 {
        self.revenue_share - self.spend_share
    }
}

/// Attribution table sorted by revenue share, highest first.
pub fn attribution(records: &[DerivedMarketing]) -> Vec<AttributionRow> {
    let groups = group_marketing(records, &[Dimension::Platform, Dimension::Tactic]);

    let revenue: Vec<f64> = groups.iter().map(|g| g.totals.attributed_revenue).collect();
    let spend: Vec<f64> = groups.iter().map(|g| g.totals.spend).collect();
    let revenue_shares = shares(&revenue);
    let spend_shares = shares(&spend);

    let mut rows: Vec<AttributionRow> = groups
        .into_iter()
        .zip(revenue_shares.into_iter().zip(spend_shares))
        .filter_map(|(g, (revenue_share, spend_share))| {
            Some(AttributionRow {
                platform: g.platform()?,
                tactic: g.key_text(1),
                spend: g.totals.spend,
                attributed_revenue: g.totals.attributed_revenue,
                clicks: g.totals.clicks,
                impressions: g.totals.impressions,
                mean_roas: g.means.roas,
                revenue_share,
                spend_share,
            })
        })
        .collect();

    rank_descending(&mut rows, |r| Some(r.revenue_share));
    debug!(groups = rows.len(), "Computed attribution");
    rows
}
