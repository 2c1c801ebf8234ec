//! Error types
//!
//! Every failure surfaced by the resource services. Precondition failures are
//! raised before any network I/O; HTTP failures carry the response metadata
//! of the exchange that produced them.

use crate::resource::{RawResponse, ResponseHeaders};
use thiserror::Error;

/// Errors that can occur while talking to Azure Resource Manager.
#[derive(Debug, Error)]
pub enum ArmError {
    /// A required argument or setting is missing or invalid.
    #[error("{0}")]
    Configuration(String),

    /// The backend reported that the addressed resource does not exist.
    #[error("{message}")]
    NotFound {
        status: u16,
        message: String,
        response: RawResponse,
    },

    /// The backend answered with a non-success status.
    #[error("API request failed: {status} - {message}")]
    Http {
        status: u16,
        code: Option<String>,
        message: String,
        headers: ResponseHeaders,
        body: String,
    },

    /// The request never produced a response.
    #[error("Failed to send request: {0}")]
    Request(#[from] reqwest::Error),

    /// A body could not be serialized or parsed as JSON.
    #[error("Failed to parse response JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A body parsed but did not have the expected shape.
    #[error("Unexpected response body: {0}")]
    Decode(String),

    /// An access token could not be obtained.
    #[error("Authentication failed: {0}")]
    Auth(String),
}

impl ArmError {
    /// HTTP status attached to this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ArmError::NotFound { status, .. } | ArmError::Http { status, .. } => Some(*status),
            ArmError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Response headers of the failed exchange, if one happened
    pub fn headers(&self) -> Option<&ResponseHeaders> {
        match self {
            ArmError::Http { headers, .. } => Some(headers),
            ArmError::NotFound { response, .. } => Some(&response.headers),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ArmError::NotFound { .. }) || self.status() == Some(404)
    }
}

/// Convenience alias used across the crate
pub type Result<T, E = ArmError> = std::result::Result<T, E>;
