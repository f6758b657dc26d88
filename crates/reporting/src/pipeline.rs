//! Data preparation and the analyzer facade over the analysis modules.

use crate::attribution::{attribution, AttributionRow};
use crate::budget::{roi_optimization, PlatformRoi};
use crate::cohort::{cohort_analysis, CohortRow};
use crate::correlation::{correlation_analysis, CorrelationMatrix};
use crate::dashboard::{build_dashboard, DashboardView, ReportFilter};
use crate::derive::{derive_business, derive_marketing, DerivedBusiness, DerivedMarketing};
use crate::forecast::{forecast_input, ForecastInputRow};
use crate::insights::generate_insights;
use crate::normalize::{normalize_business, normalize_marketing};
use crate::seasonality::{seasonality, Seasonality};
use campaign_intel_core::{IntelResult, SourceTables};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Normalized and derived tables. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PreparedData {
    pub marketing: Vec<DerivedMarketing>,
    pub business: Vec<DerivedBusiness>,
}

/// Normalize the four source tables and derive per-record metrics.
pub fn prepare(tables: &SourceTables) -> IntelResult<PreparedData> {
    let marketing = derive_marketing(normalize_marketing(tables)?);
    let business = derive_business(normalize_business(&tables.business)?);
    info!(
        marketing_rows = marketing.len(),
        business_rows = business.len(),
        "Prepared source data"
    );
    Ok(PreparedData {
        marketing,
        business,
    })
}

/// Every analysis output of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub attribution: Vec<AttributionRow>,
    pub roi_optimization: Vec<PlatformRoi>,
    pub cohort: Vec<CohortRow>,
    pub seasonality: Seasonality,
    pub correlation: CorrelationMatrix,
    pub forecast_input: Vec<ForecastInputRow>,
    pub insights: Vec<String>,
}

impl AnalysisReport {
    pub fn to_json(&self, pretty: bool) -> IntelResult<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

/// Runs analyses over one prepared snapshot. Each method is independent and
/// pure; `run` simply calls them all.
#[derive(Debug, Clone)]
pub struct MarketingAnalyzer {
    data: Arc<PreparedData>,
}

impl MarketingAnalyzer {
    pub fn new(data: Arc<PreparedData>) -> Self {
        Self { data }
    }

    pub fn from_tables(tables: &SourceTables) -> IntelResult<Self> {
        Ok(Self::new(Arc::new(prepare(tables)?)))
    }

    pub fn data(&self) -> &PreparedData {
        &self.data
    }

    pub fn attribution(&self) -> Vec<AttributionRow> {
        attribution(&self.data.marketing)
    }

    pub fn roi_optimization(&self) -> Vec<PlatformRoi> {
        roi_optimization(&self.data.marketing)
    }

    pub fn cohort(&self) -> Vec<CohortRow> {
        cohort_analysis(&self.data.business)
    }

    pub fn seasonality(&self) -> Seasonality {
        seasonality(&self.data.marketing, &self.data.business)
    }

    pub fn correlation(&self) -> CorrelationMatrix {
        correlation_analysis(&self.data.marketing, &self.data.business)
    }

    pub fn forecast_input(&self) -> Vec<ForecastInputRow> {
        forecast_input(&self.data.marketing, &self.data.business)
    }

    pub fn insights(&self) -> Vec<String> {
        generate_insights(&self.data.marketing, &self.data.business)
    }

    pub fn dashboard(&self, filter: &ReportFilter, top_campaigns: usize) -> DashboardView {
        build_dashboard(&self.data, filter, top_campaigns)
    }

    pub fn run(&self) -> AnalysisReport {
        let report = AnalysisReport {
            attribution: self.attribution(),
            roi_optimization: self.roi_optimization(),
            cohort: self.cohort(),
            seasonality: self.seasonality(),
            correlation: self.correlation(),
            forecast_input: self.forecast_input(),
            insights: self.insights(),
        };
        info!(
            attribution_groups = report.attribution.len(),
            cohorts = report.cohort.len(),
            forecast_days = report.forecast_input.len(),
            "Analysis run complete"
        );
        report
    }
}
