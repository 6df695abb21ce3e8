//! Session manager: who is logged in, kept consistent with the server.
//!
//! Identity and the trial snapshot are always fetched in sequence and stored
//! together. Login, registration and logout are intentional changes: each
//! claims a new generation so that slower operations started earlier cannot
//! overwrite it when they finally resolve. Calls of the same kind are
//! serialized.

mod error;
mod store;

pub use error::SessionError;
pub use store::SessionSnapshot;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::{endpoints, ApiClient, ApiError, ApiRequest, LoginDenial};
use crate::config::RoutesConfig;
use crate::models::{LoginRequest, RegisterRequest, TrialStatus, User};
use crate::navigation::{guard_route, redirect_unless_at, Navigator, RouteDecision};
use store::{Identity, SessionStore, Ticket};

pub struct SessionManager {
    client: Arc<ApiClient>,
    routes: RoutesConfig,
    store: Arc<SessionStore>,
    initialized: AtomicBool,
    sign_in_flight: tokio::sync::Mutex<()>,
    sign_out_flight: tokio::sync::Mutex<()>,
}

impl SessionManager {
    /// Build the manager and register it with `client`, so that a failed
    /// session renewal on any request signs the session out.
    pub fn new(client: Arc<ApiClient>, routes: RoutesConfig) -> Self {
        let store = Arc::new(SessionStore::new());
        let lost = store.clone();
        client.on_session_lost(Arc::new(move || {
            info!("Session could not be renewed, signing out");
            lost.clear();
        }));

        Self {
            client,
            routes,
            store,
            initialized: AtomicBool::new(false),
            sign_in_flight: tokio::sync::Mutex::new(()),
            sign_out_flight: tokio::sync::Mutex::new(()),
        }
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    pub fn routes(&self) -> &RoutesConfig {
        &self.routes
    }

    fn navigator(&self) -> &dyn Navigator {
        self.client.navigator().as_ref()
    }

    pub fn snapshot(&self) -> Arc<SessionSnapshot> {
        self.store.load()
    }

    pub fn is_authenticated(&self) -> bool {
        self.snapshot().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.snapshot().is_loading
    }

    /// Resolve the startup identity. Only the first call does anything.
    pub async fn initialize(&self) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            debug!("Session already initialized");
            return;
        }

        let ticket = self.store.ticket();
        match self.fetch_identity().await {
            Ok(identity) => {
                info!(
                    user_id = identity.user.id,
                    role = %identity.user.role,
                    "Session restored"
                );
                if !self.store.commit_identity(ticket, identity) {
                    debug!("Startup identity superseded by a newer session change");
                }
            }
            Err(err) => {
                info!(error = %err, "No active session");
                self.store.clear_if_current(ticket);
            }
        }

        self.store.finish_loading();
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, SessionError> {
        let _flight = self.sign_in_flight.lock().await;
        let ticket = self.store.claim();
        let credentials = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.sign_in(ticket, credentials).await
    }

    /// Create the account, then log in with the same credentials.
    pub async fn register(&self, registration: RegisterRequest) -> Result<User, SessionError> {
        let _flight = self.sign_in_flight.lock().await;
        let ticket = self.store.claim();

        info!(email = %registration.email, role = %registration.role, "Registering account");
        let request = ApiRequest::post(endpoints::REGISTER)
            .with_json(&registration)?
            .without_retry();
        self.client.execute(request).await?;

        self.sign_in(ticket, registration.credentials()).await
    }

    async fn sign_in(
        &self,
        ticket: Ticket,
        credentials: LoginRequest,
    ) -> Result<User, SessionError> {
        info!(email = %credentials.email, "Logging in");

        let request = ApiRequest::post(endpoints::LOGIN)
            .with_json(&credentials)?
            .without_retry();
        self.client.execute(request).await?;

        let identity = self.fetch_identity().await?;
        let user = identity.user.clone();
        if !self.store.commit_identity(ticket, identity) {
            warn!(
                email = %credentials.email,
                "Login resolved after a newer session change, discarding"
            );
            return Err(SessionError::Superseded);
        }

        info!(user_id = user.id, role = %user.role, "Logged in");
        if let Some(target) = self.routes.landing_path(user.role) {
            redirect_unless_at(self.navigator(), target);
        }
        Ok(user)
    }

    /// End the session. Local state is cleared whatever the server answers,
    /// unless a login or registration started after this call.
    pub async fn logout(&self) {
        let ticket = self.store.clear();
        let _flight = self.sign_out_flight.lock().await;

        let request = ApiRequest::post(endpoints::LOGOUT).without_retry();
        if let Err(err) = self.client.execute(request).await {
            warn!(error = %err, "Logout request failed, local session cleared anyway");
        }

        // refreshes that landed while the request was out are stale too
        if !self.store.clear_if_current(ticket) {
            info!("Logged out, a newer sign-in already took over");
            return;
        }
        info!("Logged out");
        redirect_unless_at(self.navigator(), &self.routes.login);
    }

    /// Re-fetch identity and trial status, keeping the current state until
    /// the answer arrives. A failed fetch signs the session out.
    pub async fn refresh_user(&self) -> Result<(), SessionError> {
        let ticket = self.store.ticket();
        match self.fetch_identity().await {
            Ok(identity) => {
                if !self.store.commit_identity(ticket, identity) {
                    debug!("User refresh superseded by a newer session change");
                }
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "User refresh failed, clearing session");
                self.store.clear_if_current(ticket);
                Err(err.into())
            }
        }
    }

    /// Replace the trial snapshot. No-op unless the user has the gated role.
    pub async fn refresh_trial_status(&self) {
        let snapshot = self.store.load();
        let Some(user) = snapshot.user.as_ref().filter(|u| u.role.is_gated()) else {
            return;
        };

        let ticket = self.store.ticket();
        let trial_status = self.fetch_trial_status().await;
        if !self.store.replace_trial(ticket, user.id, trial_status) {
            debug!(user_id = user.id, "Trial refresh superseded by a newer session change");
        }
    }

    /// Classify a failed login or registration and follow the
    /// pending-approval redirect when that is the reason.
    pub fn route_login_denial(&self, err: &SessionError) -> LoginDenial {
        let denial = err
            .api()
            .map(LoginDenial::classify)
            .unwrap_or(LoginDenial::Other);
        if denial == LoginDenial::PendingApproval {
            redirect_unless_at(self.navigator(), &self.routes.pending_approval);
        }
        denial
    }

    pub fn guard(&self, path: &str) -> RouteDecision {
        guard_route(&self.snapshot(), path, &self.routes)
    }

    async fn fetch_identity(&self) -> Result<Identity, ApiError> {
        let user: User = self.client.get_json(endpoints::IDENTITY).await?;
        let trial_status = if user.role.is_gated() {
            self.fetch_trial_status().await
        } else {
            None
        };
        Ok(Identity { user, trial_status })
    }

    async fn fetch_trial_status(&self) -> Option<TrialStatus> {
        match self.client.get_json(endpoints::TRIAL_STATUS).await {
            Ok(status) => Some(status),
            Err(err) => {
                warn!(error = %err, "Failed to fetch trial status, treating as absent");
                None
            }
        }
    }
}
