use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Advertising platform a marketing row was exported from.
///
/// Declaration order is the source order used when concatenating the logs
/// and the ordering used when grouping by platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Platform {
    Facebook,
    Google,
    TikTok,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Facebook, Platform::Google, Platform::TikTok];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Facebook => "Facebook",
            Self::Google => "Google",
            Self::TikTok => "TikTok",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "facebook" => Ok(Self::Facebook),
            "google" => Ok(Self::Google),
            "tiktok" => Ok(Self::TikTok),
            other => Err(format!("unknown platform '{other}'")),
        }
    }
}

/// One campaign row of a platform log, typed and tagged with its platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketingRecord {
    pub date: NaiveDate,
    pub platform: Platform,
    pub tactic: String,
    pub campaign: String,
    pub state: String,
    pub impressions: u64,
    pub clicks: u64,
    pub spend: f64,
    pub attributed_revenue: f64,
}

/// One day of business performance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessRecord {
    pub date: NaiveDate,
    pub orders: u64,
    pub new_orders: u64,
    pub new_customers: u64,
    pub total_revenue: f64,
    pub gross_profit: f64,
    pub cogs: f64,
}

/// A parsed-but-untyped table as handed over by the data source.
///
/// Cells are kept as strings; typing and validation happen when the table
/// is normalized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows: Vec::new(),
        }
    }

    /// Build a table from string slices. Mostly handy in tests.
    pub fn from_rows(name: &str, headers: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            name: name.to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The four datasets a single analysis run consumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceTables {
    pub facebook: RawTable,
    pub google: RawTable,
    pub tiktok: RawTable,
    pub business: RawTable,
}

impl SourceTables {
    /// Marketing tables in source order, each paired with its platform.
    pub fn marketing(&self) -> [(Platform, &RawTable); 3] {
        [
            (Platform::Facebook, &self.facebook),
            (Platform::Google, &self.google),
            (Platform::TikTok, &self.tiktok),
        ]
    }
}
