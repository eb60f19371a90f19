//! Integration tests for the SQLite persistence engine.
//!
//! Each test opens a fresh store in a temp directory and drives the
//! storage layer directly, building entries by hand so timestamps are
//! fully controlled.

use tempfile::TempDir;
use worklog_core::{LogEntry, LogFilters, LogStore, SearchField, WorklogError};

async fn open_store() -> (TempDir, LogStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = LogStore::open(dir.path().join("worklog.db")).await.unwrap();
    (dir, store)
}

/// Entry number `n` gets a distinct, monotonically increasing timestamp.
fn entry(n: u32, project: &str, session: &str) -> LogEntry {
    let timestamp = format!("2026-01-01T{:02}:{:02}:{:02}.000Z", n / 3600, (n / 60) % 60, n % 60);
    LogEntry {
        log_id: format!("LOG{n:04}"),
        timestamp: timestamp.clone(),
        session_id: session.to_string(),
        project_name: project.to_string(),
        work_content: format!("work item {n}"),
        successes: None,
        failures: None,
        blockers: None,
        thoughts: None,
        created_at: timestamp,
    }
}

// ============================================================================
// Create + read back
// ============================================================================

#[tokio::test]
async fn create_then_read_back_all_fields() {
    let (_dir, store) = open_store().await;
    let mut e = entry(1, "demo", "s1");
    e.successes = Some("it built".into());
    e.failures = Some("flaky test".into());
    e.blockers = Some("waiting on review".into());
    e.thoughts = Some("refactor later".into());

    let receipt = store.create(e.clone()).await.unwrap();
    assert_eq!(receipt.log_id, e.log_id);
    assert_eq!(receipt.session_id, "s1");
    assert_eq!(receipt.timestamp, e.timestamp);

    let session = store.get_session_logs("s1".into()).await.unwrap();
    assert_eq!(session.logs, vec![e]);
}

#[tokio::test]
async fn duplicate_log_id_is_a_non_retryable_storage_error() {
    let (_dir, store) = open_store().await;
    store.create(entry(1, "demo", "s1")).await.unwrap();
    let err = store.create(entry(1, "demo", "s1")).await.unwrap_err();
    assert!(matches!(err, WorklogError::Storage { .. }));
    assert!(!err.is_retryable());
}

// ============================================================================
// Filtered reads and pagination
// ============================================================================

#[tokio::test]
async fn filters_are_anded_together() {
    let (_dir, store) = open_store().await;
    store.create(entry(1, "alpha", "s1")).await.unwrap();
    store.create(entry(2, "alpha", "s2")).await.unwrap();
    store.create(entry(3, "beta", "s1")).await.unwrap();

    let page = store
        .get_logs(LogFilters {
            project_name: Some("alpha".into()),
            session_id: Some("s1".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.logs[0].log_id, "LOG0001");
}

#[tokio::test]
async fn date_range_is_inclusive() {
    let (_dir, store) = open_store().await;
    for n in 1..=5 {
        store.create(entry(n, "demo", "s1")).await.unwrap();
    }
    let page = store
        .get_logs(LogFilters {
            start_date: Some("2026-01-01T00:00:02.000Z".into()),
            end_date: Some("2026-01-01T00:00:04.000Z".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    let mut ids: Vec<_> = page.logs.iter().map(|e| e.log_id.clone()).collect();
    ids.sort();
    assert_eq!(ids, vec!["LOG0002", "LOG0003", "LOG0004"]);
    assert_eq!(page.total_count, 3);
}

#[tokio::test]
async fn pagination_pages_are_disjoint_and_total_is_stable() {
    let (_dir, store) = open_store().await;
    for n in 1..=12 {
        store.create(entry(n, "demo", "s1")).await.unwrap();
    }

    let first = store
        .get_logs(LogFilters {
            limit: Some(5),
            offset: Some(0),
            ..Default::default()
        })
        .await
        .unwrap();
    let second = store
        .get_logs(LogFilters {
            limit: Some(5),
            offset: Some(5),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(first.total_count, 12);
    assert_eq!(second.total_count, 12);
    assert!(first.has_more);
    assert!(second.has_more);

    let first_ids: Vec<_> = first.logs.iter().map(|e| &e.log_id).collect();
    let second_ids: Vec<_> = second.logs.iter().map(|e| &e.log_id).collect();
    assert_eq!(first_ids.len(), 5);
    assert_eq!(second_ids.len(), 5);
    assert!(first_ids.iter().all(|id| !second_ids.contains(id)));

    let last = store
        .get_logs(LogFilters {
            limit: Some(5),
            offset: Some(10),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(last.logs.len(), 2);
    assert!(!last.has_more);
}

#[tokio::test]
async fn limit_zero_returns_no_rows_but_succeeds() {
    let (_dir, store) = open_store().await;
    for n in 1..=3 {
        store.create(entry(n, "demo", "s1")).await.unwrap();
    }
    let page = store
        .get_logs(LogFilters {
            limit: Some(0),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(page.logs.is_empty());
    assert_eq!(page.total_count, 3);
    assert!(page.has_more);
}

#[tokio::test]
async fn get_logs_is_newest_first_and_session_logs_oldest_first() {
    let (_dir, store) = open_store().await;
    for n in 1..=6 {
        store.create(entry(n, "demo", "s1")).await.unwrap();
    }

    let page = store.get_logs(LogFilters::default()).await.unwrap();
    let stamps: Vec<_> = page.logs.iter().map(|e| e.timestamp.clone()).collect();
    let mut sorted = stamps.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(stamps, sorted, "get_logs must be non-increasing by timestamp");

    let session = store.get_session_logs("s1".into()).await.unwrap();
    let stamps: Vec<_> = session.logs.iter().map(|e| e.timestamp.clone()).collect();
    let mut sorted = stamps.clone();
    sorted.sort();
    assert_eq!(stamps, sorted, "get_session_logs must be non-decreasing by timestamp");
}

#[tokio::test]
async fn idempotent_reads_with_no_intervening_writes() {
    let (_dir, store) = open_store().await;
    for n in 1..=4 {
        store.create(entry(n, "demo", "s1")).await.unwrap();
    }
    let filters = LogFilters {
        project_name: Some("demo".into()),
        limit: Some(10),
        ..Default::default()
    };
    let a = store.get_logs(filters.clone()).await.unwrap();
    let b = store.get_logs(filters).await.unwrap();
    assert_eq!(a.logs, b.logs);
    assert_eq!(a.total_count, b.total_count);
    assert_eq!(a.has_more, b.has_more);
}

// ============================================================================
// Session summaries
// ============================================================================

#[tokio::test]
async fn session_summary_covers_date_range_and_count() {
    let (_dir, store) = open_store().await;
    for n in 1..=3 {
        store.create(entry(n, "demo", "s1")).await.unwrap();
    }
    let session = store.get_session_logs("s1".into()).await.unwrap();
    let summary = session.session_summary;
    assert_eq!(summary.session_id, "s1");
    assert_eq!(summary.project_name, "demo");
    assert_eq!(summary.log_count, 3);
    assert_eq!(summary.date_range.start, "2026-01-01T00:00:01.000Z");
    assert_eq!(summary.date_range.end, "2026-01-01T00:00:03.000Z");
}

#[tokio::test]
async fn empty_session_summary_has_empty_date_range() {
    let (_dir, store) = open_store().await;
    let session = store.get_session_logs("ghost".into()).await.unwrap();
    assert!(session.logs.is_empty());
    assert_eq!(session.session_summary.log_count, 0);
    assert_eq!(session.session_summary.date_range.start, "");
    assert_eq!(session.session_summary.date_range.end, "");
}

// ============================================================================
// Search
// ============================================================================

#[tokio::test]
async fn search_matches_any_requested_field() {
    let (_dir, store) = open_store().await;
    let mut a = entry(1, "demo", "s1");
    a.work_content = "contains UNIQUEMARKER here".into();
    let mut b = entry(2, "demo", "s1");
    b.successes = Some("UNIQUEMARKER in successes".into());
    store.create(a).await.unwrap();
    store.create(b).await.unwrap();

    let all = store
        .search_logs("UNIQUEMARKER".into(), SearchField::all().to_vec(), 50)
        .await
        .unwrap();
    assert_eq!(all.total_matches, 2);

    // Scoped to a field the marker is absent from in entry 1.
    let scoped = store
        .search_logs("UNIQUEMARKER".into(), vec![SearchField::Successes], 50)
        .await
        .unwrap();
    assert_eq!(scoped.total_matches, 1);
    assert_eq!(scoped.logs[0].log_id, "LOG0002");
}

#[tokio::test]
async fn search_is_ascii_case_insensitive() {
    // SQLite LIKE folds ASCII case; this behavior is part of the contract.
    let (_dir, store) = open_store().await;
    let mut e = entry(1, "demo", "s1");
    e.work_content = "Deployed the Ingest Pipeline".into();
    store.create(e).await.unwrap();

    let hits = store
        .search_logs("ingest pipeline".into(), SearchField::all().to_vec(), 50)
        .await
        .unwrap();
    assert_eq!(hits.total_matches, 1);
}

#[tokio::test]
async fn search_total_ignores_limit_and_orders_newest_first() {
    let (_dir, store) = open_store().await;
    for n in 1..=7 {
        let mut e = entry(n, "demo", "s1");
        e.work_content = format!("tagged NEEDLE {n}");
        store.create(e).await.unwrap();
    }
    let hits = store
        .search_logs("NEEDLE".into(), SearchField::all().to_vec(), 3)
        .await
        .unwrap();
    assert_eq!(hits.total_matches, 7);
    assert_eq!(hits.logs.len(), 3);
    assert_eq!(hits.logs[0].log_id, "LOG0007");
}

#[tokio::test]
async fn search_treats_like_metacharacters_literally() {
    let (_dir, store) = open_store().await;
    let mut a = entry(1, "demo", "s1");
    a.work_content = "progress at 100% done".into();
    let mut b = entry(2, "demo", "s1");
    b.work_content = "progress at 100x done".into();
    store.create(a).await.unwrap();
    store.create(b).await.unwrap();

    let hits = store
        .search_logs("100%".into(), SearchField::all().to_vec(), 50)
        .await
        .unwrap();
    assert_eq!(hits.total_matches, 1);
    assert_eq!(hits.logs[0].log_id, "LOG0001");
}

// ============================================================================
// Project summary
// ============================================================================

#[tokio::test]
async fn project_summary_aggregates_counts_and_recency() {
    let (_dir, store) = open_store().await;
    for n in 1..=8 {
        let session = if n % 2 == 0 { "even" } else { "odd" };
        store.create(entry(n, "demo", session)).await.unwrap();
    }
    store.create(entry(9, "other", "s9")).await.unwrap();

    let summary = store
        .get_project_summary("demo".into(), None, None)
        .await
        .unwrap();
    assert_eq!(summary.log_count, 8);
    assert_eq!(summary.session_count, 2);
    assert_eq!(summary.date_range.start, "2026-01-01T00:00:01.000Z");
    assert_eq!(summary.date_range.end, "2026-01-01T00:00:08.000Z");
    assert_eq!(summary.recent_entries.len(), 5);
    assert_eq!(summary.recent_entries[0].log_id, "LOG0008");
}

#[tokio::test]
async fn project_summary_honors_date_window() {
    let (_dir, store) = open_store().await;
    for n in 1..=6 {
        store.create(entry(n, "demo", "s1")).await.unwrap();
    }
    let summary = store
        .get_project_summary(
            "demo".into(),
            Some("2026-01-01T00:00:02.000Z".into()),
            Some("2026-01-01T00:00:05.000Z".into()),
        )
        .await
        .unwrap();
    assert_eq!(summary.log_count, 4);
    assert_eq!(summary.date_range.start, "2026-01-01T00:00:02.000Z");
    assert_eq!(summary.date_range.end, "2026-01-01T00:00:05.000Z");
}

// ============================================================================
// Close semantics
// ============================================================================

#[tokio::test]
async fn close_is_idempotent_and_fails_later_operations() {
    let (_dir, store) = open_store().await;
    store.create(entry(1, "demo", "s1")).await.unwrap();

    store.close().await.unwrap();
    store.close().await.unwrap();

    let err = store.get_logs(LogFilters::default()).await.unwrap_err();
    assert!(matches!(err, WorklogError::Storage { .. }));
    assert!(!err.is_retryable());

    let err = store.create(entry(2, "demo", "s1")).await.unwrap_err();
    assert!(matches!(err, WorklogError::Storage { .. }));
}

#[tokio::test]
async fn reopening_an_existing_store_preserves_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("worklog.db");

    let store = LogStore::open(&path).await.unwrap();
    store.create(entry(1, "demo", "s1")).await.unwrap();
    store.close().await.unwrap();

    let store = LogStore::open(&path).await.unwrap();
    let page = store.get_logs(LogFilters::default()).await.unwrap();
    assert_eq!(page.total_count, 1);
}
