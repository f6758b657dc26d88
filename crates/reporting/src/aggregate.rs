//! Groups record tables along ordered dimension keys.
//!
//! Volume metrics (spend, revenue, clicks, impressions) are summed into
//! [`VolumeTotals`]; ratio metrics are averaged into [`RatioMeans`]. The two
//! are separate types and only the former can be added.

use crate::derive::{mean_defined, ratio, round2, DerivedBusiness, DerivedMarketing};
use campaign_intel_core::{MarketingRecord, Platform};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, AddAssign};

// ─── Dimensions ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Platform,
    Tactic,
    Campaign,
    State,
    /// Month of year, 1–12.
    Month,
    /// Calendar month, e.g. 2024-05.
    YearMonth,
}

/// Time bucket used when grouping business records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    MonthOfYear,
    YearMonth,
}

impl Period {
    pub fn value_of(&self, date: NaiveDate) -> DimensionValue {
        match self {
            Self::MonthOfYear => DimensionValue::Month(date.month()),
            Self::YearMonth => DimensionValue::YearMonth {
                year: date.year(),
                month: date.month(),
            },
        }
    }
}

impl Dimension {
    pub fn value_of(&self, record: &MarketingRecord) -> DimensionValue {
        match self {
            Self::Platform => DimensionValue::Platform(record.platform),
            Self::Tactic => DimensionValue::Text(record.tactic.clone()),
            Self::Campaign => DimensionValue::Text(record.campaign.clone()),
            Self::State => DimensionValue::Text(record.state.clone()),
            Self::Month => Period::MonthOfYear.value_of(record.date),
            Self::YearMonth => Period::YearMonth.value_of(record.date),
        }
    }
}

/// One component of a group key. Ordering is the grouping order: platforms
/// in source order, text lexically, months numerically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DimensionValue {
    Platform(Platform),
    Text(String),
    Month(u32),
    YearMonth { year: i32, month: u32 },
}

impl DimensionValue {
    pub fn as_platform(&self) -> Option<Platform> {
        match self {
            Self::Platform(p) => Some(*p),
            _ => None,
        }
    }

    pub fn as_month(&self) -> Option<u32> {
        match self {
            Self::Month(m) | Self::YearMonth { month: m, .. } => Some(*m),
            _ => None,
        }
    }

    /// First day of the bucket, for `YearMonth` values.
    pub fn month_start(&self) -> Option<NaiveDate> {
        match self {
            Self::YearMonth { year, month } => NaiveDate::from_ymd_opt(*year, *month, 1),
            _ => None,
        }
    }
}

impl fmt::Display for DimensionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Platform(p) => write!(f, "{p}"),
            Self::Text(t) => f.write_str(t),
            Self::Month(m) => write!(f, "{m}"),
            Self::YearMonth { year, month } => write!(f, "{year:04}-{month:02}"),
        }
    }
}

impl Serialize for DimensionValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub type GroupKey = Vec<DimensionValue>;

// ─── Group values ───────────────────────────────────────────────────────────

/// Summed volume metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct VolumeTotals {
    pub spend: f64,
    pub attributed_revenue: f64,
    pub clicks: u64,
    pub impressions: u64,
}

impl AddAssign<&MarketingRecord> for VolumeTotals {
    fn add_assign(&mut self, record: &MarketingRecord) {
        self.spend += record.spend;
        self.attributed_revenue += record.attributed_revenue;
        self.clicks += record.clicks;
        self.impressions += record.impressions;
    }
}

impl Add for VolumeTotals {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            spend: self.spend + other.spend,
            attributed_revenue: self.attributed_revenue + other.attributed_revenue,
            clicks: self.clicks + other.clicks,
            impressions: self.impressions + other.impressions,
        }
    }
}

impl VolumeTotals {
    /// Revenue over spend computed from the sums, not averaged.
    pub fn roas(&self) -> Option<f64> {
        ratio(self.attributed_revenue, self.spend)
    }

    pub fn ctr(&self) -> Option<f64> {
        ratio(self.clicks as f64 * 100.0, self.impressions as f64)
    }

    /// `(revenue - spend) / spend × 100`, rounded to two decimals.
    pub fn roi(&self) -> Option<f64> {
        ratio(self.attributed_revenue - self.spend, self.spend).map(|v| round2(v * 100.0))
    }
}

/// Averaged per-record ratio metrics. Not summable across groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RatioMeans {
    pub roas: Option<f64>,
    pub ctr: Option<f64>,
    pub cpc: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedGroup {
    pub key: GroupKey,
    pub record_count: usize,
    pub totals: VolumeTotals,
    pub means: RatioMeans,
}

impl AggregatedGroup {
    pub fn platform(&self) -> Option<Platform> {
        self.key.iter().find_map(DimensionValue::as_platform)
    }

    /// Display text of the key component at `idx`.
    pub fn key_text(&self, idx: usize) -> String {
        self.key.get(idx).map(ToString::to_string).unwrap_or_default()
    }

    pub fn label(&self) -> String {
        self.key
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

/// Group derived marketing rows by `dimensions`, in ascending key order.
pub fn group_marketing(records: &[DerivedMarketing], dimensions: &[Dimension]) -> Vec<AggregatedGroup> {
    let mut buckets: BTreeMap<GroupKey, Vec<&DerivedMarketing>> = BTreeMap::new();
    for row in records {
        let key: GroupKey = dimensions.iter().map(|d| d.value_of(&row.record)).collect();
        buckets.entry(key).or_default().push(row);
    }

    buckets
        .into_iter()
        .map(|(key, rows)| {
            let mut totals = VolumeTotals::default();
            for row in &rows {
                totals += &row.record;
            }
            let means = RatioMeans {
                roas: mean_defined(rows.iter().map(|r| r.metrics.roas)),
                ctr: mean_defined(rows.iter().map(|r| r.metrics.ctr)),
                cpc: mean_defined(rows.iter().map(|r| r.metrics.cpc)),
            };
            AggregatedGroup {
                key,
                record_count: rows.len(),
                totals,
                means,
            }
        })
        .collect()
}

/// Column totals across every group.
pub fn grand_totals(groups: &[AggregatedGroup]) -> VolumeTotals {
    groups
        .iter()
        .fold(VolumeTotals::default(), |acc, g| acc + g.totals)
}

// ─── Business groups ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusinessGroup {
    pub key: DimensionValue,
    pub days: usize,
    pub orders: u64,
    pub new_orders: u64,
    pub new_customers: u64,
    pub total_revenue: f64,
    pub gross_profit: f64,
    pub cogs: f64,
    pub mean_aov: Option<f64>,
    pub mean_conversion_rate: Option<f64>,
}

pub fn group_business(records: &[DerivedBusiness], period: Period) -> Vec<BusinessGroup> {
    let mut buckets: BTreeMap<DimensionValue, Vec<&DerivedBusiness>> = BTreeMap::new();
    for row in records {
        buckets
            .entry(period.value_of(row.record.date))
            .or_default()
            .push(row);
    }

    buckets
        .into_iter()
        .map(|(key, rows)| BusinessGroup {
            key,
            days: rows.len(),
            orders: rows.iter().map(|r| r.record.orders).sum(),
            new_orders: rows.iter().map(|r| r.record.new_orders).sum(),
            new_customers: rows.iter().map(|r| r.record.new_customers).sum(),
            total_revenue: rows.iter().map(|r| r.record.total_revenue).sum(),
            gross_profit: rows.iter().map(|r| r.record.gross_profit).sum(),
            cogs: rows.iter().map(|r| r.record.cogs).sum(),
            mean_aov: mean_defined(rows.iter().map(|r| r.metrics.aov)),
            mean_conversion_rate: mean_defined(rows.iter().map(|r| r.metrics.conversion_rate)),
        })
        .collect()
}

// ─── Shares & ranking ───────────────────────────────────────────────────────

/// Each value as a percentage of the column total, rounded to two decimals.
/// A zero total yields all-zero shares.
pub fn shares(values: &[f64]) -> Vec<f64> {
    let total: f64 = values.iter().sum();
    values
        .iter()
        .map(|v| ratio(*v, total).map(|s| round2(s * 100.0)).unwrap_or(0.0))
        .collect()
}

/// Stable sort by `metric` descending. Rows whose metric is undefined go last.
pub fn rank_descending<T, F>(items: &mut [T], metric: F)
where
    F: Fn(&T) -> Option<f64>,
{
    items.sort_by(|a, b| match (metric(a), metric(b)) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}
