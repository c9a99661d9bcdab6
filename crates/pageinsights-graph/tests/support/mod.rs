//! In-memory `GraphPlatform` that records requests and can hold responses.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pageinsights_core::Metric;
use pageinsights_graph::{AuthResult, GraphError, GraphPlatform};
use serde_json::{json, Value};
use tokio::sync::Semaphore;

#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub params: HashMap<String, String>,
}

#[derive(Default)]
pub struct MockPlatform {
    user_token: Mutex<Option<String>>,
    requests: Mutex<Vec<Recorded>>,
    responses: Mutex<HashMap<String, Result<Value, u16>>>,
    gates: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl MockPlatform {
    pub fn granted(token: &str) -> Arc<Self> {
        let platform = Self::default();
        *platform.user_token.lock().unwrap() = Some(token.to_string());
        Arc::new(platform)
    }

    pub fn declined() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, path: &str, body: Value) {
        self.responses
            .lock()
            .unwrap()
            .insert(path.to_string(), Ok(body));
    }

    pub fn fail(&self, path: &str, status: u16) {
        self.responses
            .lock()
            .unwrap()
            .insert(path.to_string(), Err(status));
    }

    /// Every metric for `page_id` answers with `value`.
    pub fn set_metric_value(&self, page_id: &str, value: i64) {
        for metric in Metric::ALL {
            self.respond(
                &format!("{page_id}/insights/{}", metric.as_str()),
                json!({ "data": [{ "name": metric.as_str(), "values": [{ "value": value }] }] }),
            );
        }
    }

    /// Holds every request for `page_id` until permits are added.
    pub fn gate(&self, page_id: &str) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.gates
            .lock()
            .unwrap()
            .insert(page_id.to_string(), Arc::clone(&gate));
        gate
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_with_prefix(&self, prefix: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.path.starts_with(prefix))
            .collect()
    }

    pub async fn wait_for_requests(&self, prefix: &str, n: usize) {
        while self.requests_with_prefix(prefix).len() < n {
            tokio::task::yield_now().await;
        }
    }

    fn default_response(path: &str) -> Value {
        match path {
            "me/accounts" => json!({
                "data": [
                    { "id": "p1", "name": "Corner Bakery", "access_token": "t1", "category": "Bakery" },
                    { "id": "p2", "name": "Night Market", "access_token": "t2", "category": "Market" }
                ],
                "paging": { "cursors": { "before": "a", "after": "b" } }
            }),
            "me" => json!({
                "id": "u1",
                "name": "Avery Quinn",
                "picture": { "data": { "url": "https://cdn.example/avery.jpg", "height": 50, "width": 50 } },
                "link": "https://facebook.example/avery"
            }),
            _ => json!({ "data": [{ "values": [{ "value": 42 }] }] }),
        }
    }
}

#[async_trait]
impl GraphPlatform for MockPlatform {
    async fn authenticate(&self) -> Result<AuthResult, GraphError> {
        Ok(match self.user_token.lock().unwrap().clone() {
            Some(access_token) => AuthResult::Granted { access_token },
            None => AuthResult::Declined,
        })
    }

    async fn call_graph_api(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Value, GraphError> {
        self.requests.lock().unwrap().push(Recorded {
            path: path.to_string(),
            params: params
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        });

        let page = path.split('/').next().unwrap_or_default().to_string();
        let gate = self.gates.lock().unwrap().get(&page).cloned();
        if let Some(gate) = gate {
            gate.acquire()
                .await
                .map_err(|e| GraphError::Api {
                    status: 503,
                    message: e.to_string(),
                })?
                .forget();
        }

        let canned = self.responses.lock().unwrap().get(path).cloned();
        match canned {
            Some(Ok(body)) => Ok(body),
            Some(Err(status)) => Err(GraphError::Api {
                status,
                message: format!("mock failure for {path}"),
            }),
            None => Ok(Self::default_response(path)),
        }
    }
}
