//! Runs the marketing/business analytics over a directory of
//! platform and business exports and prints the results.

use anyhow::Context;
use campaign_intel_core::config::AppConfig;
use campaign_intel_core::{CsvDirectorySource, Platform};
use campaign_intel_reporting::{ReportFilter, SnapshotCache};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "campaign-intel")]
#[command(about = "Marketing and business performance analytics")]
#[command(version)]
struct Cli {
    /// Optional TOML config file
    #[arg(long, env = "CAMPAIGN_INTEL_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the CSV exports (overrides config)
    #[arg(long, env = "CAMPAIGN_INTEL__DATA__DIR")]
    data_dir: Option<PathBuf>,

    /// Human-readable logs instead of JSON
    #[arg(long, default_value_t = false)]
    pretty_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Verify that every source loads and normalizes
    Check,
    /// Run every analysis and print the report as JSON
    Report,
    /// Print the headline insights
    Insights,
    /// Print the filtered dashboard tables as JSON
    Dashboard {
        /// First date to include (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last date to include (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Platforms to include; repeat or comma-separate. Defaults to all.
        #[arg(long, value_delimiter = ',')]
        platform: Vec<Platform>,
        /// Rows in the campaign ROI table (overrides config)
        #[arg(long)]
        top: Option<usize>,
    },
}

fn init_tracing(pretty: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "campaign_intel=info,campaign_intel_reporting=info".into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if pretty {
        builder.init();
    } else {
        builder.json().init();
    }
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.pretty_logs);

    // Load configuration
    let mut config = match AppConfig::load_from(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) if cli.config.is_some() => {
            return Err(e).context("failed to load config file");
        }
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            AppConfig::default()
        }
    };

    // Apply CLI overrides
    if let Some(dir) = cli.data_dir {
        config.data.dir = dir;
    }

    info!(
        data_dir = %config.data.dir.display(),
        cache_policy = ?config.cache.policy,
        "Configuration loaded"
    );

    let cache = SnapshotCache::new(CsvDirectorySource::new(config.data.clone()), config.cache.policy);
    let analyzer = cache
        .analyzer()
        .with_context(|| format!("failed to prepare data from {}", config.data.dir.display()))?;

    match cli.command {
        Commands::Check => {
            let data = analyzer.data();
            println!(
                "Sources OK: {} marketing rows, {} business rows.",
                data.marketing.len(),
                data.business.len()
            );
        }
        Commands::Report => {
            let report = analyzer.run();
            println!("{}", report.to_json(config.report.pretty_json)?);
        }
        Commands::Insights => {
            for line in analyzer.insights() {
                println!("- {line}");
            }
        }
        Commands::Dashboard {
            start,
            end,
            platform,
            top,
        } => {
            let filter = ReportFilter {
                start,
                end,
                platforms: platform,
            };
            let top = top.unwrap_or(config.report.top_campaigns);
            let view = analyzer.dashboard(&filter, top);
            print_json(&view, config.report.pretty_json)?;
        }
    }

    Ok(())
}
