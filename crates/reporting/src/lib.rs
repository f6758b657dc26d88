//! Campaign analytics core — normalization, derived metrics, temporal joins,
//! aggregation, and the attribution, ROI, cohort, seasonality, correlation,
//! forecast-input and insight analyses built on them.

pub mod aggregate;
pub mod attribution;
pub mod budget;
pub mod cache;
pub mod cohort;
pub mod correlation;
pub mod dashboard;
pub mod derive;
pub mod forecast;
pub mod insights;
pub mod join;
pub mod normalize;
pub mod pipeline;
pub mod seasonality;

pub use cache::SnapshotCache;
pub use dashboard::{DashboardView, ReportFilter};
pub use join::JoinMode;
pub use pipeline::{prepare, AnalysisReport, MarketingAnalyzer, PreparedData};
