//! API client with the refresh-and-retry interceptor.
//!
//! On a 401 the client renews the session through the refresh endpoint and
//! replays the original request once. Concurrent 401s share a single
//! in-flight refresh. If the refresh fails, the session-lost hook runs and
//! the navigator is sent to the login route.

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::{Mutex, RwLock};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::{endpoints, ApiError, ApiRequest, ApiResponse, Transport};
use crate::navigation::{redirect_unless_at, Navigator};

type RefreshFuture = Shared<BoxFuture<'static, Result<(), ApiError>>>;

/// Called when the session cannot be renewed.
pub type SessionLostHook = Arc<dyn Fn() + Send + Sync>;

pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(5);

pub struct ApiClient {
    transport: Arc<dyn Transport>,
    navigator: Arc<dyn Navigator>,
    login_path: String,
    refresh_timeout: Duration,
    refresh_in_flight: Mutex<Option<RefreshFuture>>,
    session_lost: RwLock<Option<SessionLostHook>>,
}

impl ApiClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        navigator: Arc<dyn Navigator>,
        login_path: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            navigator,
            login_path: login_path.into(),
            refresh_timeout: DEFAULT_REFRESH_TIMEOUT,
            refresh_in_flight: Mutex::new(None),
            session_lost: RwLock::new(None),
        }
    }

    pub fn with_refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// Install the callback run before the login redirect when a refresh
    /// fails. Replaces any previous hook.
    pub fn on_session_lost(&self, hook: SessionLostHook) {
        *self.session_lost.write() = Some(hook);
    }

    /// Send a request, renewing the session at most once on 401.
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let mut retried = false;

        loop {
            let response = self.transport.send(&request).await?;
            if response.status != StatusCode::UNAUTHORIZED {
                return response.error_for_status();
            }

            let is_refresh = request.path == endpoints::REFRESH;
            if is_refresh || retried || !request.retry_on_unauthorized {
                return response.error_for_status();
            }
            retried = true;

            if let Err(err) = self.refresh_session().await {
                warn!(path = %request.path, error = %err, "Session refresh failed");
                let hook = self.session_lost.read().clone();
                if let Some(hook) = hook {
                    hook();
                }
                redirect_unless_at(self.navigator.as_ref(), &self.login_path);
                return Err(err);
            }
            debug!(
                method = %request.method,
                path = %request.path,
                "Session renewed, replaying request"
            );
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(ApiRequest::get(path)).await?.json()
    }

    /// Join the in-flight refresh or start one.
    async fn refresh_session(&self) -> Result<(), ApiError> {
        let refresh = {
            let mut slot = self.refresh_in_flight.lock();
            match slot.as_ref() {
                Some(existing) => existing.clone(),
                None => {
                    let fresh = refresh_call(self.transport.clone(), self.refresh_timeout)
                        .boxed()
                        .shared();
                    *slot = Some(fresh.clone());
                    fresh
                }
            }
        };

        let result = refresh.clone().await;

        let mut slot = self.refresh_in_flight.lock();
        if slot.as_ref().is_some_and(|current| current.ptr_eq(&refresh)) {
            *slot = None;
        }
        result
    }
}

async fn refresh_call(transport: Arc<dyn Transport>, timeout: Duration) -> Result<(), ApiError> {
    debug!("Refreshing session");
    let request = ApiRequest::post(endpoints::REFRESH).without_retry();
    match tokio::time::timeout(timeout, transport.send(&request)).await {
        Ok(response) => response?.error_for_status().map(|_| ()),
        Err(_) => Err(ApiError::Timeout(timeout)),
    }
}
