use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root application configuration. Loaded from environment variables
/// with the prefix `CAMPAIGN_INTEL__` and an optional TOML config file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Where the four source logs live.
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_facebook_file")]
    pub facebook_file: String,
    #[serde(default = "default_google_file")]
    pub google_file: String,
    #[serde(default = "default_tiktok_file")]
    pub tiktok_file: String,
    #[serde(default = "default_business_file")]
    pub business_file: String,
}

/// How repeated analysis requests treat the loaded source tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Re-read the source on every request.
    Reload,
    /// Load once and reuse the immutable snapshot until invalidated.
    Snapshot,
}

#[allow(clippy::derivable_impls)]
impl Default for CachePolicy {
    fn default() -> Self {
        Self::Snapshot
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub policy: CachePolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Rows kept in the campaign ROI table of the dashboard view.
    #[serde(default = "default_top_campaigns")]
    pub top_campaigns: usize,
    #[serde(default = "default_pretty_json")]
    pub pretty_json: bool,
}

// Default functions
fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_facebook_file() -> String {
    "Facebook.csv".to_string()
}
fn default_google_file() -> String {
    "Google.csv".to_string()
}
fn default_tiktok_file() -> String {
    "TikTok.csv".to_string()
}
fn default_business_file() -> String {
    "business.csv".to_string()
}
fn default_top_campaigns() -> usize {
    10
}
fn default_pretty_json() -> bool {
    true
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
            facebook_file: default_facebook_file(),
            google_file: default_google_file(),
            tiktok_file: default_tiktok_file(),
            business_file: default_business_file(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            policy: CachePolicy::default(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_campaigns: default_top_campaigns(),
            pretty_json: default_pretty_json(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            cache: CacheConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables only.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from an optional TOML file, then environment
    /// variables. Environment values win.
    pub fn load_from(file: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = file {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(true),
            );
        }

        let builder = builder.add_source(
            config::Environment::with_prefix("CAMPAIGN_INTEL")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
