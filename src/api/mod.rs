//! Marketplace API access: transport, retry interceptor and error mapping.

mod client;
pub mod denial;
mod error;
mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{ApiClient, SessionLostHook, DEFAULT_REFRESH_TIMEOUT};
pub use denial::{trial_block, LoginDenial};
pub use error::ApiError;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, Transport};

/// Backend routes consumed by this crate.
pub mod endpoints {
    pub const IDENTITY: &str = "/users/me";
    pub const TRIAL_STATUS: &str = "/users/trial-status";
    pub const LOGIN: &str = "/auth/login";
    pub const REGISTER: &str = "/auth/register";
    pub const LOGOUT: &str = "/auth/logout";
    pub const REFRESH: &str = "/auth/refresh";

    pub fn profile(id: i64) -> String {
        format!("/profiles/{}", id)
    }
}
