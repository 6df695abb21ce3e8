//! Scripted in-memory transport for tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Notify;

use super::{ApiError, ApiRequest, ApiResponse, Method, Transport};

#[derive(Clone)]
enum Scripted {
    Respond(StatusCode, Value),
    Fail(ApiError),
}

fn key(method: Method, path: &str) -> String {
    format!("{} {}", method, path)
}

/// Answers requests from per-route scripts and records every call.
///
/// Queued answers are consumed in order; once a route's queue is empty its
/// `always` answer is used, and unscripted routes answer 404.
#[derive(Default)]
pub struct ScriptedTransport {
    queued: Mutex<HashMap<String, VecDeque<Scripted>>>,
    fallback: Mutex<HashMap<String, Scripted>>,
    holds: Mutex<HashMap<String, Arc<Notify>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue one answer for the route.
    pub fn once(&self, method: Method, path: &str, status: StatusCode, body: Value) -> &Self {
        self.queued
            .lock()
            .entry(key(method, path))
            .or_default()
            .push_back(Scripted::Respond(status, body));
        self
    }

    /// Answer every otherwise unscripted call to the route.
    pub fn always(&self, method: Method, path: &str, status: StatusCode, body: Value) -> &Self {
        self.fallback
            .lock()
            .insert(key(method, path), Scripted::Respond(status, body));
        self
    }

    /// Queue one transport-level failure for the route.
    pub fn fail_once(&self, method: Method, path: &str, err: ApiError) -> &Self {
        self.queued
            .lock()
            .entry(key(method, path))
            .or_default()
            .push_back(Scripted::Fail(err));
        self
    }

    /// Make the next call to the route wait until the returned handle is notified.
    pub fn hold(&self, method: Method, path: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.holds.lock().insert(key(method, path), notify.clone());
        notify
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn calls_to(&self, method: Method, path: &str) -> usize {
        let wanted = key(method, path);
        self.calls.lock().iter().filter(|c| **c == wanted).count()
    }

    fn next_answer(&self, route: &str) -> Scripted {
        if let Some(answer) = self.queued.lock().get_mut(route).and_then(|q| q.pop_front()) {
            return answer;
        }
        self.fallback
            .lock()
            .get(route)
            .cloned()
            .unwrap_or_else(|| {
                Scripted::Respond(StatusCode::NOT_FOUND, json!({"detail": "Not Found"}))
            })
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let route = key(request.method, &request.path);
        self.calls.lock().push(route.clone());

        let hold = self.holds.lock().remove(&route);
        if let Some(notify) = hold {
            notify.notified().await;
        }

        match self.next_answer(&route) {
            Scripted::Respond(status, body) => Ok(ApiResponse::new(status, body.to_string())),
            Scripted::Fail(err) => Err(err),
        }
    }
}

pub fn company_user() -> Value {
    json!({
        "id": 1,
        "email": "acme@example.com",
        "full_name": "Acme SA",
        "role": "EMPRESA",
        "is_active": true,
        "is_approved": true,
        "has_active_subscription": false,
        "trial_start_time": "2025-03-01T10:00:00",
        "trial_profile_viewed_id": null,
        "created_at": "2025-03-01T10:00:00",
        "updated_at": "2025-03-01T10:00:00"
    })
}

pub fn influencer_user() -> Value {
    json!({
        "id": 2,
        "email": "ana@example.com",
        "full_name": "Ana",
        "role": "INFLUENCER",
        "is_active": true,
        "is_approved": true,
        "has_active_subscription": false,
        "created_at": "2025-03-01T10:00:00"
    })
}

pub fn active_trial() -> Value {
    json!({
        "has_trial": true,
        "is_active": true,
        "trial_start": "2025-03-01T10:00:00+00:00",
        "trial_end": "2025-03-02T10:00:00+00:00",
        "hours_remaining": 20.5,
        "has_viewed_free_profile": false,
        "viewed_profile_id": null,
        "can_view_more_profiles": true
    })
}

pub fn consumed_trial() -> Value {
    json!({
        "has_trial": true,
        "is_active": true,
        "trial_start": "2025-03-01T10:00:00+00:00",
        "trial_end": "2025-03-02T10:00:00+00:00",
        "hours_remaining": 18.0,
        "has_viewed_free_profile": true,
        "viewed_profile_id": 9,
        "can_view_more_profiles": false
    })
}
