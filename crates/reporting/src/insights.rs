//! Presentation-ready headline strings.
//!
//! Callers needing the numbers themselves should use the aggregations.

use crate::aggregate::{group_marketing, AggregatedGroup, Dimension};
use crate::derive::{mean_defined, ratio, DerivedBusiness, DerivedMarketing};

const UNDEFINED: &str = "n/a";

/// Group with the highest mean ROAS. Ties go to the group met first in key
/// order.
pub fn best_by_mean_roas(groups: &[AggregatedGroup]) -> Option<(&AggregatedGroup, f64)> {
    let mut best: Option<(&AggregatedGroup, f64)> = None;
    for group in groups {
        if let Some(roas) = group.means.roas {
            if best.map_or(true, |(_, top)| roas > top) {
                best = Some((group, roas));
            }
        }
    }
    best
}

fn fmt_value(value: Option<f64>, render: impl Fn(f64) -> String) -> String {
    value.map(render).unwrap_or_else(|| UNDEFINED.to_string())
}

fn best_line(kind: &str, groups: &[AggregatedGroup]) -> String {
    match best_by_mean_roas(groups) {
        Some((group, roas)) => format!(
            "Best performing {kind}: {} with {roas:.2}x ROAS",
            group.label()
        ),
        None => format!("Best performing {kind}: {UNDEFINED}"),
    }
}

pub fn generate_insights(marketing: &[DerivedMarketing], business: &[DerivedBusiness]) -> Vec<String> {
    let mean_roas = mean_defined(marketing.iter().map(|r| r.metrics.roas));
    let mean_ctr = mean_defined(marketing.iter().map(|r| r.metrics.ctr));
    let mean_cpc = mean_defined(marketing.iter().map(|r| r.metrics.cpc));

    let total_revenue: f64 = business.iter().map(|r| r.record.total_revenue).sum();
    let total_spend: f64 = marketing.iter().map(|r| r.record.spend).sum();
    let overall_roi = ratio(total_revenue - total_spend, total_spend).map(|v| v * 100.0);
    let revenue_per_dollar = ratio(total_revenue, total_spend);

    let by_platform = group_marketing(marketing, &[Dimension::Platform]);
    let by_tactic = group_marketing(marketing, &[Dimension::Tactic]);

    vec![
        format!(
            "Average ROAS across all campaigns: {}",
            fmt_value(mean_roas, |v| format!("{v:.2}x"))
        ),
        best_line("platform", &by_platform),
        best_line("tactic", &by_tactic),
        format!(
            "Overall marketing ROI: {}",
            fmt_value(overall_roi, |v| format!("{v:.1}%"))
        ),
        format!(
            "Revenue per marketing dollar: {}",
            fmt_value(revenue_per_dollar, |v| format!("${v:.2}"))
        ),
        format!("Average CTR: {}", fmt_value(mean_ctr, |v| format!("{v:.2}%"))),
        format!("Average CPC: {}", fmt_value(mean_cpc, |v| format!("${v:.2}"))),
    ]
}
