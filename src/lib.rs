// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod date_key;
pub mod error;
pub mod http;
pub mod model;
pub mod notion;
pub mod oura;
pub mod reconcile;
pub mod sync;

// ---- Re-exports for stable public API ----
pub use crate::config::{HttpPolicy, SyncConfig};
pub use crate::date_key::{trailing_window, DateKey};
pub use crate::error::SyncError;
pub use crate::model::{DailyScores, MetricValue};
pub use crate::notion::{NotionClient, PageRef, RecordStore};
pub use crate::oura::{DailyMetric, MetricCategory, MetricSource, OuraClient};
pub use crate::reconcile::{upsert, UpsertOutcome};
pub use crate::sync::{run, run_batch, BatchReport};
