//! Page insights: per-metric fan-out, all-or-nothing join, and the ticket
//! guard that keeps superseded fetches from overwriting newer results.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use futures::future::try_join_all;
use pageinsights_core::{DateRange, Metric};
use serde_json::{Number, Value};

use crate::error::InsightsError;
use crate::platform::GraphPlatform;

/// Aggregation mode requested for every metric.
pub const PERIOD_TOTAL_OVER_RANGE: &str = "total_over_range";

/// Display text for a missing value.
pub const NOT_AVAILABLE: &str = "N/A";

/// Unix-second bounds sent to the insights endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedWindow {
    pub since: i64,
    pub until: i64,
}

/// Resolves optional calendar bounds against `now`.
///
/// A set date maps to 00:00:00 UTC of that day. An unset `since` is `now`,
/// an unset `until` is `now` plus one day.
#[must_use]
pub fn resolve_window(range: &DateRange, now: DateTime<Utc>) -> ResolvedWindow {
    let midnight = |d: chrono::NaiveDate| d.and_time(NaiveTime::MIN).and_utc().timestamp();
    ResolvedWindow {
        since: range.since.map_or_else(|| now.timestamp(), midnight),
        until: range
            .until
            .map_or_else(|| (now + TimeDelta::days(1)).timestamp(), midnight),
    }
}

/// Raw `data` arrays keyed by metric, from one complete fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsightsResult {
    data: BTreeMap<Metric, Value>,
}

impl InsightsResult {
    #[must_use]
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Metric, Value)>) -> Self {
        Self {
            data: pairs.into_iter().collect(),
        }
    }

    /// The raw `data` payload for `metric`, if it was fetched.
    #[must_use]
    pub fn raw(&self, metric: Metric) -> Option<&Value> {
        self.data.get(&metric)
    }

    #[must_use]
    pub fn value(&self, metric: Metric) -> MetricValue {
        get_insight_value(Some(self), metric)
    }

    /// All four metrics in display order with their extracted values.
    #[must_use]
    pub fn tiles(&self) -> Vec<(Metric, MetricValue)> {
        Metric::ALL.into_iter().map(|m| (m, self.value(m))).collect()
    }
}

/// A display-ready metric value.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Count(Number),
    /// Per-type counts, e.g. `{"like": 10, "love": 2}` for reactions.
    Breakdown(BTreeMap<String, Number>),
    NotAvailable,
}

impl MetricValue {
    fn from_json(value: &Value) -> Self {
        match value {
            Value::Number(n) => MetricValue::Count(n.clone()),
            Value::Object(map) => {
                let counts: Option<BTreeMap<String, Number>> = map
                    .iter()
                    .map(|(k, v)| match v {
                        Value::Number(n) => Some((k.clone(), n.clone())),
                        _ => None,
                    })
                    .collect();
                counts.map_or(MetricValue::NotAvailable, MetricValue::Breakdown)
            }
            _ => MetricValue::NotAvailable,
        }
    }

    /// Single number for the tile; breakdowns are summed.
    #[must_use]
    pub fn total(&self) -> Option<Number> {
        match self {
            MetricValue::Count(n) => Some(n.clone()),
            MetricValue::Breakdown(map) => Some(sum_numbers(map.values())),
            MetricValue::NotAvailable => None,
        }
    }
}

fn sum_numbers<'a>(values: impl Iterator<Item = &'a Number> + Clone) -> Number {
    let ints: Option<i64> = values
        .clone()
        .try_fold(0i64, |acc, n| n.as_i64().and_then(|v| acc.checked_add(v)));
    if let Some(total) = ints {
        return Number::from(total);
    }
    let total: f64 = values.filter_map(Number::as_f64).sum();
    Number::from_f64(total).unwrap_or_else(|| Number::from(0))
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.total() {
            Some(n) => write!(f, "{n}"),
            None => f.write_str(NOT_AVAILABLE),
        }
    }
}

/// Returns `data[0].values[0].value` for `metric`, or
/// [`MetricValue::NotAvailable`] when any level is missing.
#[must_use]
pub fn get_insight_value(result: Option<&InsightsResult>, metric: Metric) -> MetricValue {
    result
        .and_then(|r| r.raw(metric))
        .and_then(|data| data.get(0))
        .and_then(|record| record.get("values"))
        .and_then(|values| values.get(0))
        .and_then(|entry| entry.get("value"))
        .map_or(MetricValue::NotAvailable, MetricValue::from_json)
}

/// Inputs a stored result was produced from.
#[derive(Clone, PartialEq, Eq)]
pub struct FetchKey {
    pub page_id: String,
    pub access_token: String,
    pub range: DateRange,
    pub window: ResolvedWindow,
}

impl std::fmt::Debug for FetchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchKey")
            .field("page_id", &self.page_id)
            .field("access_token", &"[redacted]")
            .field("range", &self.range)
            .field("window", &self.window)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(InsightsError),
}

/// Point-in-time copy of the fetcher's state.
#[derive(Debug, Clone, Default)]
pub struct InsightsSnapshot {
    /// Ticket of the fetch that last wrote this state; `0` before any fetch.
    pub ticket: u64,
    pub status: FetchStatus,
    pub key: Option<FetchKey>,
    pub result: Option<InsightsResult>,
}

/// What a `fetch_insights` call did.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Page id or token was empty; nothing was requested.
    Skipped,
    Loaded(InsightsResult),
    /// A newer fetch was issued while this one was in flight; its result
    /// (success or failure) was discarded.
    Superseded,
}

pub struct InsightsFetcher<P: ?Sized> {
    platform: Arc<P>,
    latest_ticket: AtomicU64,
    state: Mutex<InsightsSnapshot>,
}

impl<P: GraphPlatform + ?Sized> InsightsFetcher<P> {
    pub fn new(platform: Arc<P>) -> Self {
        Self {
            platform,
            latest_ticket: AtomicU64::new(0),
            state: Mutex::new(InsightsSnapshot::default()),
        }
    }

    /// Fetches all four metrics for `page_id` over `range`.
    ///
    /// The four requests run concurrently. The stored result is replaced
    /// only if every request succeeds and no newer fetch was issued in the
    /// meantime. A failed fetch clears the stored result and records the
    /// error in [`FetchStatus::Failed`].
    ///
    /// # Errors
    ///
    /// Returns [`InsightsError::MetricFetchFailed`] for the first failing
    /// metric, unless the fetch was superseded.
    pub async fn fetch_insights(
        &self,
        page_id: &str,
        page_access_token: &str,
        range: &DateRange,
    ) -> Result<FetchOutcome, InsightsError> {
        if page_id.is_empty() || page_access_token.is_empty() {
            tracing::debug!("insights fetch skipped: no page selected");
            return Ok(FetchOutcome::Skipped);
        }

        let ticket = self.latest_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        let window = resolve_window(range, Utc::now());
        {
            let mut state = self.lock_state();
            if self.is_latest(ticket) {
                state.ticket = ticket;
                state.status = FetchStatus::Loading;
            }
        }

        let since = window.since.to_string();
        let until = window.until.to_string();
        let params = [
            ("access_token", page_access_token),
            ("period", PERIOD_TOTAL_OVER_RANGE),
            ("since", since.as_str()),
            ("until", until.as_str()),
        ];

        let joined = try_join_all(
            Metric::ALL.map(|metric| self.fetch_metric(page_id, metric, &params)),
        )
        .await;

        let mut state = self.lock_state();
        if !self.is_latest(ticket) {
            tracing::warn!(
                page_id,
                ticket,
                latest = self.latest_ticket.load(Ordering::SeqCst),
                "discarding superseded insights response"
            );
            return Ok(FetchOutcome::Superseded);
        }

        state.ticket = ticket;
        match joined {
            Ok(pairs) => {
                let result = InsightsResult::from_pairs(pairs);
                state.status = FetchStatus::Loaded;
                state.key = Some(FetchKey {
                    page_id: page_id.to_string(),
                    access_token: page_access_token.to_string(),
                    range: *range,
                    window,
                });
                state.result = Some(result.clone());
                tracing::info!(page_id, ticket, "page insights loaded");
                Ok(FetchOutcome::Loaded(result))
            }
            Err(err) => {
                tracing::warn!(page_id, ticket, error = %err, "error fetching page insights");
                state.status = FetchStatus::Failed(err.clone());
                state.key = None;
                state.result = None;
                Err(err)
            }
        }
    }

    async fn fetch_metric(
        &self,
        page_id: &str,
        metric: Metric,
        params: &[(&str, &str)],
    ) -> Result<(Metric, Value), InsightsError> {
        let path = format!("{page_id}/insights/{}", metric.as_str());
        let mut body = self
            .platform
            .call_graph_api(&path, params)
            .await
            .map_err(|e| InsightsError::MetricFetchFailed {
                metric,
                reason: e.to_string(),
            })?;

        match body.get_mut("data").map(Value::take) {
            Some(data @ Value::Array(_)) => Ok((metric, data)),
            _ => Err(InsightsError::MetricFetchFailed {
                metric,
                reason: "response has no data array".to_string(),
            }),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> InsightsSnapshot {
        self.lock_state().clone()
    }

    /// The last successfully loaded result, if it is still current.
    #[must_use]
    pub fn current(&self) -> Option<InsightsResult> {
        self.lock_state().result.clone()
    }

    #[must_use]
    pub fn latest_ticket(&self) -> u64 {
        self.latest_ticket.load(Ordering::SeqCst)
    }

    fn is_latest(&self, ticket: u64) -> bool {
        self.latest_ticket.load(Ordering::SeqCst) == ticket
    }

    fn lock_state(&self) -> MutexGuard<'_, InsightsSnapshot> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
