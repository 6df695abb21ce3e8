//! Client-side API error type.
//!
//! The backend answers failures with `{"detail": ...}` where `detail` is
//! either a message or a list of field errors. An optional `code` carries a
//! machine-readable reason when the server provides one.

use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Error raised by the transport or the interceptor.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The server answered with a non-success status
    #[error("server returned {status}: {detail}")]
    Status {
        status: StatusCode,
        detail: String,
        code: Option<String>,
    },
    /// No response was received
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    /// A success response whose body did not match the expected shape
    #[error("failed to decode response: {0}")]
    Decode(String),
}

/// Error envelope as produced by the backend
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<ErrorDetail>,
    #[serde(default)]
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Message(String),
    Fields(Vec<FieldError>),
    Other(serde_json::Value),
}

/// Field-level validation error
#[derive(Debug, Deserialize)]
struct FieldError {
    #[serde(default)]
    loc: Vec<serde_json::Value>,
    msg: String,
}

impl FieldError {
    fn render(&self) -> String {
        // loc is ["body", "email"]; the leading segment is the request part
        let field = self
            .loc
            .iter()
            .skip(1)
            .map(|segment| match segment {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".");
        if field.is_empty() {
            self.msg.clone()
        } else {
            format!("{}: {}", field, self.msg)
        }
    }
}

const MAX_RAW_DETAIL: usize = 200;

impl ApiError {
    /// Build an error from a non-success response.
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let parsed = serde_json::from_slice::<ErrorBody>(body).ok();
        let code = parsed.as_ref().and_then(|b| b.code.clone());

        let detail = match parsed.and_then(|b| b.detail) {
            Some(ErrorDetail::Message(message)) => message,
            Some(ErrorDetail::Fields(fields)) => fields
                .iter()
                .map(FieldError::render)
                .collect::<Vec<_>>()
                .join("; "),
            Some(ErrorDetail::Other(value)) => value.to_string(),
            None => {
                let raw = String::from_utf8_lossy(body);
                let raw = raw.trim();
                if raw.is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("unknown error")
                        .to_string()
                } else {
                    raw.chars().take(MAX_RAW_DETAIL).collect()
                }
            }
        };

        ApiError::Status {
            status,
            detail,
            code,
        }
    }

    /// HTTP status, when the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => Some(detail),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            ApiError::Status { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}
