//! Orchestration tests for `InsightsFetcher` against an in-memory platform.

mod support;

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use pageinsights_core::{DateRange, Metric};
use pageinsights_graph::{
    FetchOutcome, FetchStatus, InsightsError, InsightsFetcher, MetricValue,
};
use support::MockPlatform;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn empty_page_id_or_token_is_a_no_op() {
    let platform = MockPlatform::granted("user");
    let fetcher = InsightsFetcher::new(Arc::clone(&platform));
    let range = DateRange::default();

    assert_eq!(
        fetcher.fetch_insights("", "t1", &range).await.unwrap(),
        FetchOutcome::Skipped
    );
    assert_eq!(
        fetcher.fetch_insights("p1", "", &range).await.unwrap(),
        FetchOutcome::Skipped
    );

    assert!(platform.requests().is_empty(), "no request may be issued");
    let snapshot = fetcher.snapshot();
    assert_eq!(snapshot.ticket, 0);
    assert_eq!(snapshot.status, FetchStatus::Idle);
    assert!(snapshot.result.is_none());
    assert_eq!(fetcher.latest_ticket(), 0);
}

#[tokio::test]
async fn explicit_dates_are_sent_as_epoch_seconds() {
    let platform = MockPlatform::granted("user");
    let fetcher = InsightsFetcher::new(Arc::clone(&platform));
    let range = DateRange::new(Some(date(2024, 1, 1)), Some(date(2024, 1, 31)));

    fetcher.fetch_insights("p1", "t1", &range).await.unwrap();

    let requests = platform.requests();
    assert_eq!(requests.len(), 4);
    for request in &requests {
        assert_eq!(request.params["since"], "1704067200");
        assert_eq!(request.params["until"], "1706659200");
    }

    let key = fetcher.snapshot().key.unwrap();
    assert_eq!(key.range, range);
    assert_eq!(key.window.since, 1_704_067_200);
    assert_eq!(key.window.until, 1_706_659_200);
}

#[tokio::test]
async fn missing_dates_default_to_now_and_one_day_later() {
    let platform = MockPlatform::granted("user");
    let fetcher = InsightsFetcher::new(Arc::clone(&platform));

    let before = Utc::now().timestamp();
    fetcher
        .fetch_insights("p1", "t1", &DateRange::default())
        .await
        .unwrap();
    let after = Utc::now().timestamp();

    for request in platform.requests() {
        let since: i64 = request.params["since"].parse().unwrap();
        let until: i64 = request.params["until"].parse().unwrap();
        assert!(
            since >= before - 1 && since <= after + 1,
            "since {since} not within [{before}, {after}] +/- 1s"
        );
        assert_eq!(until - since, 86_400);
    }
}

#[tokio::test]
async fn four_requests_go_out_with_token_and_period() {
    let platform = MockPlatform::granted("user");
    let fetcher = InsightsFetcher::new(Arc::clone(&platform));

    let outcome = fetcher
        .fetch_insights("p1", "t1", &DateRange::default())
        .await
        .unwrap();

    let mut paths: Vec<String> = platform.requests().into_iter().map(|r| r.path).collect();
    paths.sort();
    assert_eq!(
        paths,
        vec![
            "p1/insights/page_engaged_users",
            "p1/insights/page_fans",
            "p1/insights/page_impressions_unique",
            "p1/insights/page_reactions_by_type_total",
        ]
    );
    for request in platform.requests() {
        assert_eq!(request.params["access_token"], "t1");
        assert_eq!(request.params["period"], "total_over_range");
    }

    let FetchOutcome::Loaded(result) = outcome else {
        panic!("expected Loaded, got {outcome:?}");
    };
    for metric in Metric::ALL {
        assert_eq!(result.value(metric).to_string(), "42");
    }
}

#[tokio::test]
async fn one_failing_metric_fails_the_whole_fetch() {
    let platform = MockPlatform::granted("user");
    let fetcher = InsightsFetcher::new(Arc::clone(&platform));
    let range = DateRange::default();

    // A good result first, so we can see it being cleared.
    fetcher.fetch_insights("p1", "t1", &range).await.unwrap();
    assert!(fetcher.current().is_some());

    platform.fail("p1/insights/page_reactions_by_type_total", 500);
    let err = fetcher.fetch_insights("p1", "t1", &range).await.unwrap_err();

    assert!(matches!(
        err,
        InsightsError::MetricFetchFailed {
            metric: Metric::PageReactionsByTypeTotal,
            ..
        }
    ));
    assert_eq!(platform.requests().len(), 8, "all four were issued again");

    let snapshot = fetcher.snapshot();
    assert!(snapshot.result.is_none(), "no partial map may be stored");
    assert!(snapshot.key.is_none());
    assert_eq!(snapshot.status, FetchStatus::Failed(err));
    assert_eq!(snapshot.ticket, 2);
}

#[tokio::test]
async fn body_without_data_array_is_a_metric_failure() {
    let platform = MockPlatform::granted("user");
    platform.respond(
        "p1/insights/page_fans",
        serde_json::json!({ "paging": {} }),
    );
    let fetcher = InsightsFetcher::new(Arc::clone(&platform));

    let err = fetcher
        .fetch_insights("p1", "t1", &DateRange::default())
        .await
        .unwrap_err();

    let InsightsError::MetricFetchFailed { metric, reason } = err;
    assert_eq!(metric, Metric::PageFans);
    assert!(reason.contains("data"), "reason was: {reason}");
}

#[tokio::test]
async fn zero_activity_page_reports_not_available() {
    let platform = MockPlatform::granted("user");
    for metric in Metric::ALL {
        platform.respond(
            &format!("p1/insights/{}", metric.as_str()),
            serde_json::json!({ "data": [] }),
        );
    }
    let fetcher = InsightsFetcher::new(Arc::clone(&platform));

    let outcome = fetcher
        .fetch_insights("p1", "t1", &DateRange::default())
        .await
        .unwrap();

    let FetchOutcome::Loaded(result) = outcome else {
        panic!("expected Loaded");
    };
    for (_, value) in result.tiles() {
        assert_eq!(value, MetricValue::NotAvailable);
        assert_eq!(value.to_string(), "N/A");
    }
}

#[tokio::test]
async fn stale_response_cannot_overwrite_newer_result() {
    let platform = MockPlatform::granted("user");
    platform.set_metric_value("p1", 1);
    platform.set_metric_value("p2", 2);
    let gate = platform.gate("p1");
    let fetcher = InsightsFetcher::new(Arc::clone(&platform));
    let range = DateRange::default();

    let slow = fetcher.fetch_insights("p1", "t1", &range);
    let fast = async {
        platform.wait_for_requests("p1/", 4).await;
        let outcome = fetcher.fetch_insights("p2", "t2", &range).await;
        gate.add_permits(4);
        outcome
    };
    let (slow, fast) = tokio::join!(slow, fast);

    assert_eq!(slow.unwrap(), FetchOutcome::Superseded);
    assert!(matches!(fast.unwrap(), FetchOutcome::Loaded(_)));

    let snapshot = fetcher.snapshot();
    assert_eq!(snapshot.ticket, 2);
    assert_eq!(snapshot.key.as_ref().unwrap().page_id, "p2");
    let result = snapshot.result.unwrap();
    assert_eq!(result.value(Metric::PageFans).to_string(), "2");
}

#[tokio::test]
async fn stale_failure_does_not_clear_newer_result() {
    let platform = MockPlatform::granted("user");
    platform.fail("p1/insights/page_fans", 500);
    let gate = platform.gate("p1");
    let fetcher = InsightsFetcher::new(Arc::clone(&platform));
    let range = DateRange::default();

    let slow = fetcher.fetch_insights("p1", "t1", &range);
    let fast = async {
        platform.wait_for_requests("p1/", 4).await;
        let outcome = fetcher.fetch_insights("p2", "t2", &range).await;
        gate.add_permits(4);
        outcome
    };
    let (slow, fast) = tokio::join!(slow, fast);

    assert_eq!(slow.unwrap(), FetchOutcome::Superseded);
    assert!(fast.is_ok());
    let snapshot = fetcher.snapshot();
    assert_eq!(snapshot.status, FetchStatus::Loaded);
    assert!(snapshot.result.is_some());
}
