use thiserror::Error;

use crate::api::ApiError;

#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),
    /// A newer login, registration or logout happened while this operation
    /// was in flight, so its result was discarded
    #[error("session changed while the operation was in flight")]
    Superseded,
}

impl SessionError {
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            SessionError::Api(err) => Some(err),
            SessionError::Superseded => None,
        }
    }
}
