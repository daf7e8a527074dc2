// src/notion.rs
//! Destination store: one Notion database page per day.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::config::{HttpPolicy, SyncConfig};
use crate::date_key::DateKey;
use crate::error::SyncError;
use crate::http::{self, Retry};
use crate::model::{DailyScores, MetricValue};
use crate::oura::MetricCategory;

const SERVICE: &str = "notion";
pub const DATE_PROPERTY: &str = "Date";
pub const TITLE_PROPERTY: &str = "Name";

/// Existing page as returned by a database query.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PageRef {
    pub id: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<PageRef>,
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Pages whose Date equals `date`, in the order the store returns them.
    async fn query_by_date(&self, date: DateKey) -> Result<Vec<PageRef>, SyncError>;

    /// Insert a page and return its id.
    async fn create_page(&self, scores: &DailyScores) -> Result<String, SyncError>;

    async fn update_page(&self, page_id: &str, scores: &DailyScores) -> Result<(), SyncError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Create,
    Update,
}

/// Property set for a page write. `NoData` is sent as `null` (clears the
/// cell); `Unavailable` is `null` on create and left out on update.
pub fn page_properties(scores: &DailyScores, mode: WriteMode) -> Map<String, Value> {
    let mut props = Map::new();
    props.insert(
        TITLE_PROPERTY.to_string(),
        json!({ "title": [{ "text": { "content": scores.title() } }] }),
    );
    props.insert(
        DATE_PROPERTY.to_string(),
        json!({ "date": { "start": scores.date.to_string() } }),
    );
    for category in MetricCategory::ALL {
        let number = match (scores.get(category), mode) {
            (MetricValue::Score(s), _) => json!(s),
            (MetricValue::NoData, _) => Value::Null,
            (MetricValue::Unavailable, WriteMode::Create) => Value::Null,
            (MetricValue::Unavailable, WriteMode::Update) => continue,
        };
        props.insert(category.property().to_string(), json!({ "number": number }));
    }
    props
}

pub fn date_filter(date: DateKey) -> Value {
    json!({
        "filter": {
            "property": DATE_PROPERTY,
            "date": { "equals": date.to_string() }
        }
    })
}

pub struct NotionClient {
    http: Client,
    policy: HttpPolicy,
    base: String,
    token: String,
    version: String,
    database_id: String,
}

impl NotionClient {
    pub fn new(cfg: &SyncConfig) -> Result<Self, SyncError> {
        Ok(Self {
            http: http::build_client(&cfg.http)?,
            policy: cfg.http,
            base: cfg.notion_api_base.clone(),
            token: cfg.notion_token.clone(),
            version: cfg.notion_version.clone(),
            database_id: cfg.notion_database_id.clone(),
        })
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(&self.token)
            .header("Notion-Version", &self.version)
    }
}

#[async_trait]
impl RecordStore for NotionClient {
    async fn query_by_date(&self, date: DateKey) -> Result<Vec<PageRef>, SyncError> {
        let url = format!("{}/v1/databases/{}/query", self.base, self.database_id);
        let body = date_filter(date);
        let operation = format!("query {date}");

        // Queries have no side effects, so they are safe to retry.
        let rsp: QueryResponse =
            http::send_json(&self.policy, Retry::Transient, SERVICE, &operation, || {
                self.request(reqwest::Method::POST, &url).json(&body)
            })
            .await?;
        Ok(rsp.results)
    }

    async fn create_page(&self, scores: &DailyScores) -> Result<String, SyncError> {
        let url = format!("{}/v1/pages", self.base);
        let body = json!({
            "parent": { "database_id": self.database_id },
            "properties": page_properties(scores, WriteMode::Create),
        });
        let operation = format!("create page {}", scores.date);

        // A lost response may still have created the page; never resend.
        let page: PageRef = http::send_json(&self.policy, Retry::Never, SERVICE, &operation, || {
            self.request(reqwest::Method::POST, &url).json(&body)
        })
        .await?;
        Ok(page.id)
    }

    async fn update_page(&self, page_id: &str, scores: &DailyScores) -> Result<(), SyncError> {
        let url = format!("{}/v1/pages/{}", self.base, page_id);
        let body = json!({ "properties": page_properties(scores, WriteMode::Update) });
        let operation = format!("update page {} ({})", scores.date, page_id);

        http::send(&self.policy, Retry::Transient, SERVICE, &operation, || {
            self.request(reqwest::Method::PATCH, &url).json(&body)
        })
        .await?;
        Ok(())
    }
}
