//! Sync run over all configured locations
//!
//! Locations are processed one at a time in configured order. A location that
//! fails is reported and left without output; the rest still run.

use chrono::NaiveDate;
use shared::models::{OverrideDocument, WeeklyTotals};
use shared::util::now;

use crate::aggregate::WeeklyAggregator;
use crate::config::{LocationConfig, LocationSetting};
use crate::error::SyncResult;
use crate::silverware::{FoodHints, OrderSource};
use crate::store::OverrideStore;
use crate::utils::{WeekWindow, week_id, week_window};

/// Result of one location's run
#[derive(Debug)]
pub enum LocationOutcome {
    Written(WeeklyTotals),
    /// Aggregated but not persisted (dry run)
    Reported(WeeklyTotals),
    /// Missing connection settings
    Skipped { missing: Vec<String> },
    Failed { error: String },
}

#[derive(Debug)]
pub struct LocationReport {
    pub key: String,
    pub outcome: LocationOutcome,
}

#[derive(Debug)]
pub struct RunSummary {
    pub week: String,
    pub reports: Vec<LocationReport>,
}

impl RunSummary {
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, LocationOutcome::Failed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, LocationOutcome::Skipped { .. }))
    }

    pub fn completed(&self) -> usize {
        self.count(|o| {
            matches!(
                o,
                LocationOutcome::Written(_) | LocationOutcome::Reported(_)
            )
        })
    }

    fn count(&self, pred: impl Fn(&LocationOutcome) -> bool) -> usize {
        self.reports.iter().filter(|r| pred(&r.outcome)).count()
    }

    /// One line per location, then the totals
    pub fn log(&self) {
        for report in &self.reports {
            match &report.outcome {
                LocationOutcome::Written(t) | LocationOutcome::Reported(t) => tracing::info!(
                    location = %report.key,
                    week = %self.week,
                    orders = t.orders,
                    food_sales = %t.food_sales,
                    voids = %t.voids,
                    comps = %t.promotions,
                    written = matches!(report.outcome, LocationOutcome::Written(_)),
                    "Location synced"
                ),
                LocationOutcome::Skipped { missing } => tracing::warn!(
                    location = %report.key,
                    missing = %missing.join(","),
                    "Location skipped"
                ),
                LocationOutcome::Failed { error } => tracing::error!(
                    location = %report.key,
                    week = %self.week,
                    error = %error,
                    "Location failed"
                ),
            }
        }
        tracing::info!(
            week = %self.week,
            completed = self.completed(),
            skipped = self.skipped(),
            failed = self.failed(),
            "Sync run finished"
        );
    }
}

pub struct SyncJob<'a> {
    source: &'a dyn OrderSource,
    store: &'a dyn OverrideStore,
    hints: &'a FoodHints,
    dry_run: bool,
}

impl<'a> SyncJob<'a> {
    pub fn new(
        source: &'a dyn OrderSource,
        store: &'a dyn OverrideStore,
        hints: &'a FoodHints,
        dry_run: bool,
    ) -> Self {
        Self {
            source,
            store,
            hints,
            dry_run,
        }
    }

    /// Sync every location for the week starting at `week_start`
    pub async fn run(
        &self,
        locations: &[LocationSetting],
        week_start: NaiveDate,
        tz_offset_minutes: i32,
    ) -> RunSummary {
        let week = week_id(week_start);
        let window = week_window(week_start, tz_offset_minutes);
        tracing::info!(
            week = %week,
            start = %window.start,
            end = %window.end,
            locations = locations.len(),
            "Starting sync run"
        );

        let mut reports = Vec::with_capacity(locations.len());
        for setting in locations {
            let outcome = match setting.resolve() {
                None => {
                    let missing = setting.missing();
                    tracing::debug!(location = %setting.key, "Missing connection settings, skipping location");
                    LocationOutcome::Skipped { missing }
                }
                Some(location) => match self.sync_location(&location, &window, &week).await {
                    Ok(totals) if self.dry_run => LocationOutcome::Reported(totals),
                    Ok(totals) => LocationOutcome::Written(totals),
                    Err(e) => {
                        tracing::debug!(location = %location.key, error = %e, "Location sync failed");
                        LocationOutcome::Failed {
                            error: e.to_string(),
                        }
                    }
                },
            };
            reports.push(LocationReport {
                key: setting.key.clone(),
                outcome,
            });
        }

        RunSummary { week, reports }
    }

    /// Aggregate one location's week and merge-write the override
    pub async fn sync_location(
        &self,
        location: &LocationConfig,
        window: &WeekWindow,
        week: &str,
    ) -> SyncResult<WeeklyTotals> {
        let totals = WeeklyAggregator::new(self.source, self.hints)
            .aggregate(location, window)
            .await?;
        let document = OverrideDocument::from_totals(&totals, now());
        self.store
            .write_override(&location.key, week, &document)
            .await?;
        Ok(totals)
    }
}
