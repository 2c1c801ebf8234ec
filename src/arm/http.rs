//! HTTP utilities for ARM REST API calls

use crate::error::{ArmError, Result};
use crate::resource::RawResponse;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::collections::BTreeMap;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

const CLIENT_REQUEST_ID_HEADER: &str = "x-ms-client-request-id";

/// The three verbs the resource services need. Implementations return
/// `ArmError::Http` for non-success statuses.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<RawResponse>;

    async fn put(&self, url: &str, body: &Value) -> Result<RawResponse>;

    async fn delete(&self, url: &str) -> Result<RawResponse>;
}

/// Sanitize response body for logging
/// Truncates long responses and drops control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut = (0..=MAX_LOG_BODY_LENGTH)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Pull `code` and `message` out of an ARM error envelope:
/// `{"error": {"code": "...", "message": "..."}}`
pub fn parse_error_body(body: &str) -> (Option<String>, Option<String>) {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return (None, None);
    };
    let error = value.get("error").unwrap_or(&value);
    let code = error
        .get("code")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());
    let message = error
        .get("message")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());
    (code, message)
}

/// HTTP client wrapper for ARM API calls
#[derive(Clone)]
pub struct ArmHttpClient {
    client: Client,
}

impl ArmHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("azrest/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    pub async fn get(&self, url: &str, token: &str) -> Result<RawResponse> {
        tracing::debug!("GET {}", url);
        self.send(self.client.get(url), token).await
    }

    pub async fn put(&self, url: &str, token: &str, body: &Value) -> Result<RawResponse> {
        tracing::debug!("PUT {}", url);
        self.send(self.client.put(url).json(body), token).await
    }

    pub async fn delete(&self, url: &str, token: &str) -> Result<RawResponse> {
        tracing::debug!("DELETE {}", url);
        self.send(self.client.delete(url), token).await
    }

    async fn send(&self, request: RequestBuilder, token: &str) -> Result<RawResponse> {
        let response = request
            .bearer_auth(token)
            .header(CLIENT_REQUEST_ID_HEADER, uuid::Uuid::new_v4().to_string())
            .send()
            .await?;

        let status = response.status();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await?;

        let raw = RawResponse::new(status.as_u16(), headers, body);

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&raw.body));
            let (code, message) = parse_error_body(&raw.body);
            return Err(ArmError::Http {
                status: status.as_u16(),
                code,
                message: message.unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("unexpected status")
                        .to_string()
                }),
                headers: raw.headers,
                body: raw.body,
            });
        }

        Ok(raw)
    }
}

/// Format an ARM error for display
/// Security: Sanitizes error messages to avoid leaking sensitive API details
pub fn format_arm_error(error: &anyhow::Error) -> String {
    if let Some(arm) = error.downcast_ref::<ArmError>() {
        match arm {
            ArmError::Configuration(msg) => return msg.clone(),
            ArmError::NotFound { message, .. } => return message.clone(),
            ArmError::Auth(_) => {
                return "Authentication failed. Check AZURE_TENANT_ID, AZURE_CLIENT_ID and AZURE_CLIENT_SECRET."
                    .to_string()
            },
            ArmError::Http { status, .. } => {
                if let Some(msg) = status_message(*status) {
                    return msg.to_string();
                }
            },
            _ => {},
        }
    }

    let error_str = error.to_string();
    let sanitized = error_str
        .chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .take(80)
        .collect::<String>();

    if sanitized.len() < error_str.len() {
        format!("{}...", sanitized)
    } else {
        sanitized
    }
}

fn status_message(status: u16) -> Option<&'static str> {
    match status {
        400 => Some("Invalid request. Check your parameters."),
        401 => Some("Authentication failed. The access token was rejected."),
        403 => Some("Permission denied. Check your role assignments."),
        404 => Some("Resource not found."),
        409 => Some("Resource conflict. The resource may already exist or be in use."),
        429 => Some("Rate limit exceeded. Please try again later."),
        500 | 502 | 503 => Some("Azure service temporarily unavailable. Please try again."),
        _ => None,
    }
}
