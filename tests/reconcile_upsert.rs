// tests/reconcile_upsert.rs
mod common;

use common::{day, FakeStore};
use oura_notion_sync::{upsert, DailyScores, MetricValue, UpsertOutcome};

#[tokio::test]
async fn creates_when_no_record_exists() {
    let store = FakeStore::default();
    let scores = DailyScores::new(day("2024-06-09"), Some(80), Some(75), None);

    let out = upsert(&store, &scores).await.expect("upsert ok");

    assert!(matches!(out, UpsertOutcome::Created { .. }));
    let pages = store.pages_for("2024-06-09");
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].title(), Some("Oura Score 2024-06-09"));
    assert_eq!(pages[0].number("Readiness"), Some(80));
    assert_eq!(pages[0].number("Sleep"), Some(75));
    assert_eq!(pages[0].number("Activity"), None);
    assert_eq!(out.page_id(), pages[0].id);
}

#[tokio::test]
async fn existing_record_is_updated_not_duplicated() {
    let store = FakeStore::default();
    let id = store.seed(&DailyScores::new(day("2024-06-09"), Some(60), None, None));

    let scores = DailyScores::new(day("2024-06-09"), Some(81), Some(77), Some(90));
    let out = upsert(&store, &scores).await.expect("upsert ok");

    assert_eq!(out, UpsertOutcome::Updated { page_id: id });
    assert_eq!(store.create_count(), 0);
    let pages = store.pages_for("2024-06-09");
    assert_eq!(pages.len(), 1, "exactly one record per date");
    assert_eq!(pages[0].number("Readiness"), Some(81));
    assert_eq!(pages[0].number("Activity"), Some(90));
}

#[tokio::test]
async fn duplicate_matches_update_first_only() {
    let store = FakeStore::default();
    let first = store.seed(&DailyScores::new(day("2024-06-09"), Some(1), None, None));
    let second = store.seed(&DailyScores::new(day("2024-06-09"), Some(2), None, None));

    let scores = DailyScores::new(day("2024-06-09"), Some(70), None, None);
    let out = upsert(&store, &scores).await.expect("upsert ok");

    assert_eq!(out, UpsertOutcome::Updated { page_id: first.clone() });
    assert_eq!(*store.updates.lock(), vec![first]);
    assert_eq!(store.create_count(), 0);

    let pages = store.pages_for("2024-06-09");
    assert_eq!(pages.len(), 2, "no third record");
    let untouched = pages.iter().find(|p| p.id == second).unwrap();
    assert_eq!(untouched.number("Readiness"), Some(2));
}

#[tokio::test]
async fn failed_query_never_falls_through_to_insert() {
    let store = FakeStore::default().failing_query("2024-06-09");
    let scores = DailyScores::new(day("2024-06-09"), Some(80), None, None);

    let err = upsert(&store, &scores).await.unwrap_err();

    assert_eq!(err.status(), Some(502));
    assert_eq!(store.create_count(), 0);
    assert!(store.pages_for("2024-06-09").is_empty());
}

#[tokio::test]
async fn write_failure_is_reported_with_date() {
    let store = FakeStore::default().failing_write("2024-06-09");
    let scores = DailyScores::new(day("2024-06-09"), Some(80), None, None);

    let err = upsert(&store, &scores).await.unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("2024-06-09"), "{msg}");
    assert!(msg.contains("400"), "{msg}");
}

#[tokio::test]
async fn missing_score_clears_but_unavailable_keeps_previous_value() {
    let store = FakeStore::default();
    store.seed(&DailyScores::new(day("2024-06-09"), Some(60), Some(70), Some(80)));

    let scores = DailyScores {
        readiness: MetricValue::Score(65),
        sleep: MetricValue::NoData,
        activity: MetricValue::Unavailable,
        date: day("2024-06-09"),
    };
    upsert(&store, &scores).await.expect("upsert ok");

    let page = &store.pages_for("2024-06-09")[0];
    assert_eq!(page.number("Readiness"), Some(65));
    assert_eq!(page.number("Sleep"), None, "no data clears the cell");
    assert_eq!(page.number("Activity"), Some(80), "failed fetch keeps the cell");
}
