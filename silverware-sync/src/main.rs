//! silverware-sync: weekly override job
//!
//! # Usage
//!
//! ```bash
//! # Current week, every configured location
//! silverware-sync
//!
//! # A specific week, local midnight at UTC-4, one location, no writes
//! silverware-sync --week 2025-10-06 --tz-offset-minutes=-240 --location uptown --dry-run
//! ```

use anyhow::{Context, Result};
use clap::Parser;

use silverware_sync::config::{Config, ConfigError};
use silverware_sync::silverware::SilverwareClient;
use silverware_sync::store::{DryRunStore, FirestoreStore, OverrideStore};
use silverware_sync::utils::logger::init_logger;
use silverware_sync::utils::{current_week_start, parse_week_start};
use silverware_sync::SyncJob;

/// Aggregate a week of Silverware orders into per-location override documents
#[derive(Parser, Debug)]
#[command(name = "silverware-sync")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Week to sync, given by its Monday (YYYY-MM-DD); defaults to the current week
    #[arg(long, env = "TARGET_WEEK")]
    week: Option<String>,

    /// Offset of local time from UTC in minutes (e.g. -240 for UTC-4)
    #[arg(long, env = "TZ_OFFSET_MINUTES", default_value_t = 0, allow_hyphen_values = true)]
    tz_offset_minutes: i32,

    /// Only sync these location keys (repeatable)
    #[arg(long = "location", value_name = "KEY")]
    locations: Vec<String>,

    /// Aggregate and log, but do not write overrides
    #[arg(long)]
    dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Directory for daily-rolling log files
    #[arg(long, env = "LOG_DIR")]
    log_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logger(&cli.log_level, cli.log_dir.as_deref());

    let mut config = Config::from_env().context("Failed to load configuration")?;
    for key in &cli.locations {
        if !config.locations.iter().any(|l| &l.key == key) {
            tracing::warn!(location = %key, "Requested location is not configured");
        }
    }
    config.restrict_to(&cli.locations);

    let week_start = match cli.week.as_deref() {
        Some(week) => parse_week_start(week)?,
        None => current_week_start(),
    };

    let source = SilverwareClient::new().context("Failed to build Silverware client")?;
    let store: Box<dyn OverrideStore> = if cli.dry_run {
        Box::new(DryRunStore)
    } else {
        let firestore = config
            .firestore
            .as_ref()
            .ok_or(ConfigError::Missing("FIRESTORE_PROJECT_ID"))?;
        Box::new(FirestoreStore::new(firestore).context("Failed to build Firestore client")?)
    };

    let job = SyncJob::new(&source, &*store, &config.food_hints, cli.dry_run);
    let summary = job
        .run(&config.locations, week_start, cli.tz_offset_minutes)
        .await;
    summary.log();

    Ok(())
}
