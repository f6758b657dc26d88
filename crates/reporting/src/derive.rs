//! Per-record derived metrics for marketing and business rows.
//!
//! A ratio whose denominator is zero is `None`. That is the only sentinel;
//! it never enters a sum, and means skip it.

use campaign_intel_core::{BusinessRecord, MarketingRecord};
use serde::{Deserialize, Serialize};

/// Round half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `numerator / denominator`, or `None` when the denominator is zero or the
/// result is not finite.
pub fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    let value = numerator / denominator;
    value.is_finite().then_some(value)
}

/// Mean of the defined values; `None` when nothing is defined.
pub fn mean_defined<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values.into_iter().flatten() {
        sum += v;
        count += 1;
    }
    (count > 0).then(|| sum / count as f64)
}

// ─── Marketing ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketingMetrics {
    /// clicks / impressions × 100
    pub ctr: Option<f64>,
    /// spend / clicks
    pub cpc: Option<f64>,
    /// attributed_revenue / spend
    pub roas: Option<f64>,
    /// spend / impressions × 1000
    pub cpm: Option<f64>,
}

impl MarketingMetrics {
    pub fn derive(record: &MarketingRecord) -> Self {
        let impressions = record.impressions as f64;
        let clicks = record.clicks as f64;
        Self {
            ctr: ratio(clicks, impressions).map(|v| round2(v * 100.0)),
            cpc: ratio(record.spend, clicks).map(round2),
            roas: ratio(record.attributed_revenue, record.spend).map(round2),
            cpm: ratio(record.spend, impressions).map(|v| round2(v * 1000.0)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMarketing {
    #[serde(flatten)]
    pub record: MarketingRecord,
    #[serde(flatten)]
    pub metrics: MarketingMetrics,
}

impl From<MarketingRecord> for DerivedMarketing {
    fn from(record: MarketingRecord) -> Self {
        let metrics = MarketingMetrics::derive(&record);
        Self { record, metrics }
    }
}

pub fn derive_marketing(records: Vec<MarketingRecord>) -> Vec<DerivedMarketing> {
    records.into_iter().map(DerivedMarketing::from).collect()
}

// ─── Business ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessMetrics {
    /// total_revenue / orders
    pub aov: Option<f64>,
    /// new_orders / orders × 100
    pub conversion_rate: Option<f64>,
    /// gross_profit / total_revenue × 100
    pub profit_margin: Option<f64>,
}

impl BusinessMetrics {
    pub fn derive(record: &BusinessRecord) -> Self {
        let orders = record.orders as f64;
        Self {
            aov: ratio(record.total_revenue, orders).map(round2),
            conversion_rate: ratio(record.new_orders as f64, orders).map(|v| round2(v * 100.0)),
            profit_margin: ratio(record.gross_profit, record.total_revenue)
                .map(|v| round2(v * 100.0)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedBusiness {
    #[serde(flatten)]
    pub record: BusinessRecord,
    #[serde(flatten)]
    pub metrics: BusinessMetrics,
}

impl From<BusinessRecord> for DerivedBusiness {
    fn from(record: BusinessRecord) -> Self {
        let metrics = BusinessMetrics::derive(&record);
        Self { record, metrics }
    }
}

pub fn derive_business(records: Vec<BusinessRecord>) -> Vec<DerivedBusiness> {
    records.into_iter().map(DerivedBusiness::from).collect()
}
