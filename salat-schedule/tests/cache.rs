mod common;

use chrono::{DateTime, Local, TimeZone};
use common::{NAJAF_PAGE, ScriptedFetcher, init_test_tracing, page_with_items, source_url, unavailable};
use salat_schedule::{
    FetchError, ParseError, RefreshStatus, ScheduleCache, ScheduleError, ScheduleParser,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

fn at(day: u32, hour: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 6, day, hour, 0, 0).unwrap()
}

fn cache_with(fetcher: &Arc<ScriptedFetcher>) -> ScheduleCache {
    ScheduleCache::new(source_url(), fetcher.clone(), ScheduleParser::standard().unwrap())
}

#[tokio::test]
async fn same_day_fetches_once() {
    init_test_tracing();
    let fetcher = Arc::new(ScriptedFetcher::always(NAJAF_PAGE));
    let cache = cache_with(&fetcher);

    let first = cache.get_schedule(at(15, 6)).await;
    let second = cache.get_schedule(at(15, 22)).await;

    assert!(matches!(first.status, RefreshStatus::Fresh));
    assert!(matches!(second.status, RefreshStatus::Cached));
    assert_eq!(first.schedule, second.schedule);
    assert_eq!(first.schedule.len(), 7);
    assert_eq!(second.fetched_at, Some(at(15, 6)));
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn one_fetch_per_day_over_several_days() {
    init_test_tracing();
    let fetcher = Arc::new(ScriptedFetcher::always(NAJAF_PAGE));
    let cache = cache_with(&fetcher);

    for day in 10..15 {
        for hour in [1, 9, 17, 23] {
            let snap = cache.get_schedule(at(day, hour)).await;
            assert!(!snap.is_degraded());
        }
    }

    assert_eq!(fetcher.calls(), 5);
}

#[tokio::test]
async fn fresh_schedule_is_dated_on_the_fetch_day() {
    init_test_tracing();
    let fetcher = Arc::new(ScriptedFetcher::always(NAJAF_PAGE));
    let cache = cache_with(&fetcher);

    let snap = cache.get_schedule(at(20, 8)).await;
    let maghrib = snap.schedule.get("Maghrib").unwrap().time.unwrap();
    assert_eq!(maghrib.date_naive(), at(20, 8).date_naive());
    assert_eq!(maghrib.format("%H:%M").to_string(), "21:35");
}

#[tokio::test]
async fn failed_refresh_serves_previous_day() {
    init_test_tracing();
    let url = source_url();
    let fetcher = Arc::new(ScriptedFetcher::scripted(
        vec![Ok(NAJAF_PAGE.to_string())],
        Err(unavailable(&url)),
    ));
    let cache = cache_with(&fetcher);

    let yesterday = cache.get_schedule(at(15, 8)).await;
    let today = cache.get_schedule(at(16, 8)).await;

    assert_eq!(fetcher.calls(), 2);
    assert_eq!(today.schedule, yesterday.schedule);
    assert_eq!(today.fetched_at, Some(at(15, 8)));
    match &today.status {
        RefreshStatus::Stale(err) => assert!(matches!(
            err.as_ref(),
            ScheduleError::Fetch(FetchError::Status { status: 503, .. })
        )),
        other => panic!("expected stale, got {other:?}"),
    }
    assert_eq!(cache.cached().await.unwrap().fetched_at, at(15, 8));
}

#[tokio::test]
async fn failure_without_cache_is_an_empty_schedule() {
    init_test_tracing();
    let url = source_url();
    let fetcher = Arc::new(ScriptedFetcher::failing(FetchError::Transport {
        url: url.to_string(),
        cause: "connect: connection refused".into(),
    }));
    let cache = cache_with(&fetcher);

    let snap = cache.get_schedule(at(15, 8)).await;

    assert!(snap.schedule.is_empty());
    assert!(snap.fetched_at.is_none());
    assert!(matches!(snap.status, RefreshStatus::Unavailable(_)));
    assert!(cache.cached().await.is_none());
}

#[tokio::test]
async fn failed_attempts_are_retried_on_the_next_call() {
    init_test_tracing();
    let url = source_url();
    let fetcher = Arc::new(ScriptedFetcher::scripted(
        vec![Err(unavailable(&url))],
        Ok(NAJAF_PAGE.to_string()),
    ));
    let cache = cache_with(&fetcher);

    assert!(cache.get_schedule(at(15, 8)).await.is_degraded());
    let snap = cache.get_schedule(at(15, 9)).await;

    assert!(matches!(snap.status, RefreshStatus::Fresh));
    assert_eq!(fetcher.calls(), 2);
}

#[tokio::test]
async fn missing_container_is_reported_not_raised() {
    init_test_tracing();
    let fetcher = Arc::new(ScriptedFetcher::always("<html><body>maintenance</body></html>"));
    let cache = cache_with(&fetcher);

    let snap = cache.get_schedule(at(15, 8)).await;

    assert!(snap.schedule.is_empty());
    assert!(matches!(
        snap.error(),
        Some(ScheduleError::Parse(ParseError::StructureNotFound { .. }))
    ));
}

#[tokio::test]
async fn empty_list_is_a_fresh_empty_schedule() {
    init_test_tracing();
    let fetcher = Arc::new(ScriptedFetcher::always(&page_with_items("")));
    let cache = cache_with(&fetcher);

    let snap = cache.get_schedule(at(15, 8)).await;

    assert!(snap.schedule.is_empty());
    assert!(matches!(snap.status, RefreshStatus::Fresh));
    assert!(cache.cached().await.is_some());
}

#[tokio::test]
async fn manual_refresh_fetches_even_when_fresh() {
    init_test_tracing();
    let fetcher = Arc::new(ScriptedFetcher::scripted(
        vec![Ok(page_with_items("<li>Dawn<span>02:21</span></li>"))],
        Ok(page_with_items("<li>Dawn<span>02:25</span></li>")),
    ));
    let cache = cache_with(&fetcher);

    cache.get_schedule(at(15, 8)).await;
    let refreshed = cache.refresh(at(15, 9)).await;

    assert_eq!(fetcher.calls(), 2);
    assert_eq!(refreshed.schedule.get("Dawn").unwrap().raw, "02:25");
    assert_eq!(refreshed.fetched_at, Some(at(15, 9)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_callers_share_one_fetch() {
    init_test_tracing();
    let gate = Arc::new(Notify::new());
    let fetcher = Arc::new(ScriptedFetcher::always(NAJAF_PAGE).gated(gate.clone()));
    let cache = cache_with(&fetcher);

    let mut callers = Vec::new();
    for _ in 0..8 {
        let cache = cache.clone();
        callers.push(tokio::spawn(async move { cache.get_schedule(at(15, 8)).await }));
    }
    tokio::time::sleep(Duration::from_millis(50)).await;
    gate.notify_one();

    for caller in callers {
        let snap = caller.await.unwrap();
        assert!(!snap.is_degraded());
        assert_eq!(snap.schedule.len(), 7);
    }
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn dropped_caller_still_populates_cache() {
    init_test_tracing();
    let gate = Arc::new(Notify::new());
    let fetcher = Arc::new(ScriptedFetcher::always(NAJAF_PAGE).gated(gate.clone()));
    let cache = cache_with(&fetcher);

    let abandoned = tokio::time::timeout(Duration::from_millis(20), cache.get_schedule(at(15, 8))).await;
    assert!(abandoned.is_err());
    assert!(cache.cached().await.is_none());

    gate.notify_one();
    for _ in 0..100 {
        if cache.cached().await.is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let snap = cache.get_schedule(at(15, 9)).await;
    assert!(matches!(snap.status, RefreshStatus::Cached));
    assert_eq!(snap.schedule.len(), 7);
    assert_eq!(fetcher.calls(), 1);
}
