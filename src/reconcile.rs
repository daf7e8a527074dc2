// src/reconcile.rs
//! Idempotent upsert keyed by date: query first, then patch or insert.

use crate::error::SyncError;
use crate::model::DailyScores;
use crate::notion::RecordStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created { page_id: String },
    Updated { page_id: String },
}

impl UpsertOutcome {
    pub fn page_id(&self) -> &str {
        match self {
            UpsertOutcome::Created { page_id } | UpsertOutcome::Updated { page_id } => page_id,
        }
    }
}

/// Create the page for `scores.date` or update the existing one.
///
/// A failed query aborts before any write, so a lookup error can never turn
/// into a duplicate insert. With several matches the first one returned is
/// updated and nothing new is created.
pub async fn upsert<S>(store: &S, scores: &DailyScores) -> Result<UpsertOutcome, SyncError>
where
    S: RecordStore + ?Sized,
{
    let date = scores.date;
    let existing = store.query_by_date(date).await?;

    if existing.len() > 1 {
        tracing::warn!(
            %date,
            matches = existing.len(),
            "more than one record for date; updating the first"
        );
    }

    let outcome = match existing.into_iter().next() {
        Some(page) => {
            store.update_page(&page.id, scores).await?;
            UpsertOutcome::Updated { page_id: page.id }
        }
        None => {
            let page_id = store.create_page(scores).await?;
            UpsertOutcome::Created { page_id }
        }
    };

    match &outcome {
        UpsertOutcome::Created { page_id } => tracing::info!(%date, page_id = %page_id, "created"),
        UpsertOutcome::Updated { page_id } => tracing::info!(%date, page_id = %page_id, "updated"),
    }
    Ok(outcome)
}
