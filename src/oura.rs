// src/oura.rs
//! Metric fetcher: Oura API v2 daily collections.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::{HttpPolicy, SyncConfig};
use crate::date_key::DateKey;
use crate::error::SyncError;
use crate::http::{self, Retry};

const SERVICE: &str = "oura";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricCategory {
    Readiness,
    Sleep,
    Activity,
}

impl MetricCategory {
    pub const ALL: [MetricCategory; 3] = [
        MetricCategory::Readiness,
        MetricCategory::Sleep,
        MetricCategory::Activity,
    ];

    /// Path segment under `/v2/usercollection/`.
    pub fn endpoint(self) -> &'static str {
        match self {
            MetricCategory::Readiness => "daily_readiness",
            MetricCategory::Sleep => "daily_sleep",
            MetricCategory::Activity => "daily_activity",
        }
    }

    /// Column name in the destination database.
    pub fn property(self) -> &'static str {
        match self {
            MetricCategory::Readiness => "Readiness",
            MetricCategory::Sleep => "Sleep",
            MetricCategory::Activity => "Activity",
        }
    }
}

impl std::fmt::Display for MetricCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.endpoint())
    }
}

/// One entry of a daily collection. `score` is `null` for days Oura could not
/// score; `day` is only checked against the requested date.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DailyMetric {
    #[serde(default)]
    pub day: Option<String>,
    #[serde(default)]
    pub score: Option<i64>,
}

impl DailyMetric {
    /// True when the record carries a `day` other than `date`.
    pub fn is_for_other_day(&self, date: DateKey) -> bool {
        self.day
            .as_deref()
            .is_some_and(|d| DateKey::parse(d) != Some(date))
    }
}

#[derive(Debug, Deserialize)]
struct CollectionResponse {
    #[serde(default)]
    data: Vec<DailyMetric>,
}

#[async_trait]
pub trait MetricSource: Send + Sync {
    /// Records for `category` on exactly `date`; empty when there is no data.
    async fn fetch(
        &self,
        category: MetricCategory,
        date: DateKey,
    ) -> Result<Vec<DailyMetric>, SyncError>;
}

/// Score of the first record. Oura returns at most one record per category and
/// day for a single-day window, so more than one is logged as an anomaly.
pub fn first_score(
    category: MetricCategory,
    date: DateKey,
    records: &[DailyMetric],
) -> Option<i64> {
    if records.len() > 1 {
        tracing::warn!(
            %category,
            %date,
            count = records.len(),
            "provider returned more than one record for a single day; using the first"
        );
    }
    let first = records.first()?;
    if first.is_for_other_day(date) {
        tracing::warn!(
            %category,
            %date,
            day = first.day.as_deref().unwrap_or_default(),
            "provider record is labelled with a different day"
        );
    }
    first.score
}

pub struct OuraClient {
    http: Client,
    policy: HttpPolicy,
    base: String,
    token: String,
}

impl OuraClient {
    pub fn new(cfg: &SyncConfig) -> Result<Self, SyncError> {
        Ok(Self {
            http: http::build_client(&cfg.http)?,
            policy: cfg.http,
            base: cfg.oura_api_base.clone(),
            token: cfg.oura_token.clone(),
        })
    }

    fn url(&self, category: MetricCategory) -> String {
        format!("{}/v2/usercollection/{}", self.base, category.endpoint())
    }
}

#[async_trait]
impl MetricSource for OuraClient {
    async fn fetch(
        &self,
        category: MetricCategory,
        date: DateKey,
    ) -> Result<Vec<DailyMetric>, SyncError> {
        let url = self.url(category);
        let day = date.to_string();
        let operation = format!("fetch {category} {day}");

        let body: CollectionResponse =
            http::send_json(&self.policy, Retry::Transient, SERVICE, &operation, || {
                self.http
                    .get(&url)
                    .bearer_auth(&self.token)
                    .query(&[("start_date", day.as_str()), ("end_date", day.as_str())])
            })
            .await?;

        tracing::debug!(%category, %date, records = body.data.len(), "oura response");
        Ok(body.data)
    }
}
