// src/sync.rs
//! Batch driver: walk the trailing window oldest first, fetch three scores per
//! day and upsert days that have at least one.

use chrono::NaiveDate;

use crate::config::SyncConfig;
use crate::date_key::{trailing_window, DateKey};
use crate::error::SyncError;
use crate::model::{DailyScores, MetricValue};
use crate::notion::{NotionClient, RecordStore};
use crate::oura::{first_score, DailyMetric, MetricCategory, MetricSource, OuraClient};
use crate::reconcile::{upsert, UpsertOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub date: DateKey,
    pub category: &'static str,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFailure {
    pub date: DateKey,
    pub error: String,
}

/// What one run did, per date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub created: Vec<DateKey>,
    pub updated: Vec<DateKey>,
    /// Days the provider answered for, with no score in any category.
    pub skipped: Vec<DateKey>,
    /// Days with no score where at least one category failed to fetch.
    pub unretrieved: Vec<DateKey>,
    pub fetch_errors: Vec<FetchFailure>,
    pub failures: Vec<DateFailure>,
}

impl BatchReport {
    /// A category that could not be fetched fails the run too: a token the
    /// provider rejects would otherwise look like a week without data.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.fetch_errors.is_empty()
    }

    pub fn upserts(&self) -> usize {
        self.created.len() + self.updated.len()
    }
}

/// Fetch all three categories for `date` concurrently. A failing category is
/// logged, recorded in `report` and marked `Unavailable`.
pub async fn collect_scores<S>(source: &S, date: DateKey, report: &mut BatchReport) -> DailyScores
where
    S: MetricSource + ?Sized,
{
    let (readiness, sleep, activity) = tokio::join!(
        source.fetch(MetricCategory::Readiness, date),
        source.fetch(MetricCategory::Sleep, date),
        source.fetch(MetricCategory::Activity, date),
    );

    type Fetched = Result<Vec<DailyMetric>, SyncError>;
    let mut resolve = |category: MetricCategory, res: Fetched| match res {
        Ok(records) => MetricValue::from(first_score(category, date, &records)),
        Err(e) => {
            tracing::error!(%date, %category, error = %e, "fetch failed; category skipped");
            report.fetch_errors.push(FetchFailure {
                date,
                category: category.endpoint(),
                error: e.to_string(),
            });
            MetricValue::Unavailable
        }
    };

    DailyScores {
        date,
        readiness: resolve(MetricCategory::Readiness, readiness),
        sleep: resolve(MetricCategory::Sleep, sleep),
        activity: resolve(MetricCategory::Activity, activity),
    }
}

/// Process every date in order. Dates are independent: a failure is recorded
/// and the loop moves on, so one bad day never hides the rest of the window.
pub async fn run_batch<S, R>(source: &S, store: &R, dates: &[DateKey]) -> BatchReport
where
    S: MetricSource + ?Sized,
    R: RecordStore + ?Sized,
{
    let mut report = BatchReport::default();

    for &date in dates {
        tracing::info!(%date, "fetching metrics");
        let scores = collect_scores(source, date, &mut report).await;

        if !scores.has_any_score() {
            if scores.any_unavailable() {
                tracing::warn!(%date, "no scores retrieved (fetch errors); skipping");
                report.unretrieved.push(date);
            } else {
                tracing::info!(%date, "no data found; skipping");
                report.skipped.push(date);
            }
            continue;
        }

        match upsert(store, &scores).await {
            Ok(UpsertOutcome::Created { .. }) => report.created.push(date),
            Ok(UpsertOutcome::Updated { .. }) => report.updated.push(date),
            Err(e) => {
                tracing::error!(%date, error = %e, "upsert failed; continuing with next date");
                report.failures.push(DateFailure {
                    date,
                    error: e.to_string(),
                });
            }
        }
    }

    report
}

/// Build the real clients and sync the window ending the day before `today`.
pub async fn run(cfg: &SyncConfig, today: NaiveDate) -> Result<BatchReport, SyncError> {
    let source = OuraClient::new(cfg)?;
    let store = NotionClient::new(cfg)?;
    let dates = trailing_window(today, cfg.window_days);

    tracing::info!(
        window_days = cfg.window_days,
        first = ?dates.first().map(ToString::to_string),
        last = ?dates.last().map(ToString::to_string),
        "starting sync"
    );

    let report = run_batch(&source, &store, &dates).await;

    tracing::info!(
        created = report.created.len(),
        updated = report.updated.len(),
        skipped = report.skipped.len(),
        unretrieved = report.unretrieved.len(),
        fetch_errors = report.fetch_errors.len(),
        failures = report.failures.len(),
        "sync finished"
    );
    Ok(report)
}
