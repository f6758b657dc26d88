//! Correlation analysis — linear correlation between daily marketing and
//! business metrics on dates both tables cover.

use crate::derive::{DerivedBusiness, DerivedMarketing};
use crate::join::{join_daily, JoinMode, JoinedDay};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationMetric {
    Spend,
    AttributedRevenue,
    TotalRevenue,
    Orders,
    NewCustomers,
}

impl CorrelationMetric {
    pub const ALL: [CorrelationMetric; 5] = [
        CorrelationMetric::Spend,
        CorrelationMetric::AttributedRevenue,
        CorrelationMetric::TotalRevenue,
        CorrelationMetric::Orders,
        CorrelationMetric::NewCustomers,
    ];

    pub fn value(&self, day: &JoinedDay) -> f64 {
        match self {
            Self::Spend => day.marketing.spend,
            Self::AttributedRevenue => day.marketing.attributed_revenue,
            Self::TotalRevenue => day.business.total_revenue,
            Self::Orders => day.business.orders as f64,
            Self::NewCustomers => day.business.new_customers as f64,
        }
    }
}

/// Symmetric matrix; `values[i][j]` pairs `metrics[i]` with `metrics[j]`.
/// A pair is `None` when fewer than two days joined or either series is
/// constant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub metrics: Vec<CorrelationMetric>,
    pub values: Vec<Vec<Option<f64>>>,
    pub observations: usize,
}

impl CorrelationMatrix {
    pub fn get(&self, a: CorrelationMetric, b: CorrelationMetric) -> Option<f64> {
        let i = self.metrics.iter().position(|m| *m == a)?;
        let j = self.metrics.iter().position(|m| *m == b)?;
        self.values[i][j]
    }
}

/// Exact comparison; rounding in the mean can leave a constant series with a
/// tiny non-zero variance.
fn is_constant(values: &[f64]) -> bool {
    values.iter().all(|v| *v == values[0])
}

/// Pearson correlation coefficient, clamped to [-1, 1].
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 || is_constant(&xs[..n]) || is_constant(&ys[..n]) {
        return None;
    }
    let mean_x = xs[..n].iter().sum::<f64>() / n as f64;
    let mean_y = ys[..n].iter().sum::<f64>() / n as f64;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in xs[..n].iter().zip(&ys[..n]) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    let r = cov / (var_x.sqrt() * var_y.sqrt());
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// Correlation matrix over already-joined days.
pub fn correlation_matrix(days: &[JoinedDay]) -> CorrelationMatrix {
    let metrics = CorrelationMetric::ALL.to_vec();
    let series: Vec<Vec<f64>> = metrics
        .iter()
        .map(|m| days.iter().map(|d| m.value(d)).collect())
        .collect();

    let k = metrics.len();
    let mut values = vec![vec![None; k]; k];
    for i in 0..k {
        // Unit diagonal wherever the series varies.
        values[i][i] = pearson(&series[i], &series[i]).map(|_| 1.0);
        for j in (i + 1)..k {
            let r = pearson(&series[i], &series[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        metrics,
        values,
        observations: days.len(),
    }
}

/// Inner-join the tables by date and correlate the daily series.
pub fn correlation_analysis(
    marketing: &[DerivedMarketing],
    business: &[DerivedBusiness],
) -> CorrelationMatrix {
    let days = join_daily(marketing, business, JoinMode::Inner);
    debug!(joined_days = days.len(), "Computed correlation input");
    correlation_matrix(&days)
}
