// tests/common/mod.rs
// In-memory collaborators shared by the integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use oura_notion_sync::notion::{page_properties, WriteMode};
use oura_notion_sync::{
    DailyMetric, DailyScores, DateKey, MetricCategory, MetricSource, PageRef, RecordStore,
    SyncError,
};
use parking_lot::Mutex;
use serde_json::{Map, Value};

pub fn day(s: &str) -> DateKey {
    DateKey::parse(s).expect("valid test date")
}

pub fn status_error(service: &'static str, operation: &str, status: u16) -> SyncError {
    SyncError::Status {
        service,
        operation: operation.to_string(),
        status,
        body: "boom".to_string(),
    }
}

/// Provider double: scores keyed by (category, date), plus categories that fail.
#[derive(Default)]
pub struct FakeSource {
    records: HashMap<(MetricCategory, DateKey), Vec<DailyMetric>>,
    failing: HashSet<(MetricCategory, DateKey)>,
    pub calls: Mutex<Vec<(MetricCategory, DateKey)>>,
}

impl FakeSource {
    pub fn with_score(mut self, category: MetricCategory, date: &str, score: i64) -> Self {
        self.records
            .entry((category, day(date)))
            .or_default()
            .push(DailyMetric {
                day: Some(date.to_string()),
                score: Some(score),
            });
        self
    }

    pub fn failing(mut self, category: MetricCategory, date: &str) -> Self {
        self.failing.insert((category, day(date)));
        self
    }
}

#[async_trait]
impl MetricSource for FakeSource {
    async fn fetch(
        &self,
        category: MetricCategory,
        date: DateKey,
    ) -> Result<Vec<DailyMetric>, SyncError> {
        self.calls.lock().push((category, date));
        if self.failing.contains(&(category, date)) {
            return Err(status_error("oura", &format!("fetch {category} {date}"), 401));
        }
        Ok(self.records.get(&(category, date)).cloned().unwrap_or_default())
    }
}

#[derive(Debug, Clone)]
pub struct FakePage {
    pub id: String,
    pub date: DateKey,
    pub properties: Map<String, Value>,
}

impl FakePage {
    pub fn number(&self, property: &str) -> Option<i64> {
        self.properties
            .get(property)
            .and_then(|p| p.get("number"))
            .and_then(Value::as_i64)
    }

    pub fn title(&self) -> Option<&str> {
        self.properties
            .get("Name")?
            .get("title")?
            .get(0)?
            .get("text")?
            .get("content")?
            .as_str()
    }
}

/// Destination double that applies writes the way Notion does: create stores
/// every property, update overwrites only the properties it is given.
#[derive(Default)]
pub struct FakeStore {
    pub pages: Mutex<Vec<FakePage>>,
    next_id: Mutex<u32>,
    pub queries: Mutex<u32>,
    pub creates: Mutex<u32>,
    pub updates: Mutex<Vec<String>>,
    query_fails: HashSet<DateKey>,
    write_fails: HashSet<DateKey>,
}

impl FakeStore {
    pub fn failing_query(mut self, date: &str) -> Self {
        self.query_fails.insert(day(date));
        self
    }

    pub fn failing_write(mut self, date: &str) -> Self {
        self.write_fails.insert(day(date));
        self
    }

    /// Seed a page directly, bypassing the write counters.
    pub fn seed(&self, scores: &DailyScores) -> String {
        let id = self.alloc_id();
        self.pages.lock().push(FakePage {
            id: id.clone(),
            date: scores.date,
            properties: page_properties(scores, WriteMode::Create),
        });
        id
    }

    pub fn pages_for(&self, date: &str) -> Vec<FakePage> {
        let d = day(date);
        self.pages.lock().iter().filter(|p| p.date == d).cloned().collect()
    }

    pub fn create_count(&self) -> u32 {
        *self.creates.lock()
    }

    pub fn query_count(&self) -> u32 {
        *self.queries.lock()
    }

    fn alloc_id(&self) -> String {
        let mut n = self.next_id.lock();
        *n += 1;
        format!("page-{}", *n)
    }
}

#[async_trait]
impl RecordStore for FakeStore {
    async fn query_by_date(&self, date: DateKey) -> Result<Vec<PageRef>, SyncError> {
        *self.queries.lock() += 1;
        if self.query_fails.contains(&date) {
            return Err(status_error("notion", &format!("query {date}"), 502));
        }
        Ok(self
            .pages
            .lock()
            .iter()
            .filter(|p| p.date == date)
            .map(|p| PageRef { id: p.id.clone() })
            .collect())
    }

    async fn create_page(&self, scores: &DailyScores) -> Result<String, SyncError> {
        *self.creates.lock() += 1;
        if self.write_fails.contains(&scores.date) {
            return Err(status_error("notion", &format!("create page {}", scores.date), 400));
        }
        Ok(self.seed(scores))
    }

    async fn update_page(&self, page_id: &str, scores: &DailyScores) -> Result<(), SyncError> {
        self.updates.lock().push(page_id.to_string());
        if self.write_fails.contains(&scores.date) {
            return Err(status_error("notion", &format!("update page {}", scores.date), 400));
        }
        let mut pages = self.pages.lock();
        let page = pages
            .iter_mut()
            .find(|p| p.id == page_id)
            .ok_or_else(|| status_error("notion", "update page", 404))?;
        for (k, v) in page_properties(scores, WriteMode::Update) {
            page.properties.insert(k, v);
        }
        Ok(())
    }
}
