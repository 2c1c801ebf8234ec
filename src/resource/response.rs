//! Response envelopes
//!
//! Transport metadata captured alongside decoded payloads.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// Status code and headers of one HTTP exchange
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResponseHeaders {
    status: u16,
    headers: BTreeMap<String, String>,
}

impl ResponseHeaders {
    /// Header names are stored lower-cased so lookups are case-insensitive
    pub fn new(status: u16, headers: BTreeMap<String, String>) -> Self {
        let headers = headers
            .into_iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v))
            .collect();
        Self { status, headers }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn request_id(&self) -> Option<&str> {
        self.get("x-ms-request-id")
    }

    pub fn correlation_request_id(&self) -> Option<&str> {
        self.get("x-ms-correlation-request-id")
    }

    /// URL to poll for the state of a long-running operation
    pub fn async_operation_url(&self) -> Option<&str> {
        self.get("azure-asyncoperation")
    }

    pub fn location(&self) -> Option<&str> {
        self.get("location")
    }

    /// Where the caller should look to track an accepted operation, if anywhere
    pub fn tracking_url(&self) -> Option<&str> {
        self.async_operation_url().or_else(|| self.location())
    }

    /// Only the delta-seconds form is understood
    pub fn retry_after(&self) -> Option<Duration> {
        self.get("retry-after")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
    }

    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.get("date")
            .and_then(|v| DateTime::parse_from_rfc2822(v).ok())
            .map(|d| d.with_timezone(&Utc))
    }
}

/// Everything the core looks at from a transport call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    pub headers: ResponseHeaders,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, headers: BTreeMap<String, String>, body: impl Into<String>) -> Self {
        Self {
            headers: ResponseHeaders::new(status, headers),
            body: body.into(),
        }
    }

    pub fn status(&self) -> u16 {
        self.headers.status()
    }

    pub fn has_body(&self) -> bool {
        !self.body.trim().is_empty()
    }
}

/// One page (or a merged set) of decoded resources
#[derive(Debug, Clone, Default)]
pub struct ArmCollection<M> {
    items: Vec<M>,
    headers: ResponseHeaders,
    next_link: Option<String>,
    skip_token: Option<String>,
}

impl<M> ArmCollection<M> {
    pub fn new(items: Vec<M>, headers: ResponseHeaders) -> Self {
        Self {
            items,
            headers,
            next_link: None,
            skip_token: None,
        }
    }

    /// Set the continuation link; the `$skiptoken` query value is extracted from it
    pub fn with_next_link(mut self, next_link: Option<String>) -> Self {
        self.skip_token = next_link.as_deref().and_then(skip_token_from_link);
        self.next_link = next_link;
        self
    }

    pub fn items(&self) -> &[M] {
        &self.items
    }

    pub fn into_items(self) -> Vec<M> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, M> {
        self.items.iter()
    }

    pub fn response_headers(&self) -> &ResponseHeaders {
        &self.headers
    }

    pub fn next_link(&self) -> Option<&str> {
        self.next_link.as_deref()
    }

    pub fn skip_token(&self) -> Option<&str> {
        self.skip_token.as_deref()
    }

    pub fn has_next_page(&self) -> bool {
        self.next_link.is_some()
    }

    /// Keep only the items matching `keep`; headers and continuation are preserved
    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&M) -> bool,
    {
        self.items.retain(keep);
    }
}

impl<M> IntoIterator for ArmCollection<M> {
    type Item = M;
    type IntoIter = std::vec::IntoIter<M>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, M> IntoIterator for &'a ArmCollection<M> {
    type Item = &'a M;
    type IntoIter = std::slice::Iter<'a, M>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Outcome of a PUT. An accepted long-running operation has no resource yet;
/// its progress is tracked through the headers.
#[derive(Debug, Clone)]
pub struct CreateResponse<M> {
    pub resource: Option<M>,
    pub headers: ResponseHeaders,
}

impl<M> CreateResponse<M> {
    /// True when the backend accepted the request without returning the resource
    pub fn is_pending(&self) -> bool {
        self.resource.is_none()
    }

    pub fn tracking_url(&self) -> Option<&str> {
        self.headers.tracking_url()
    }

    pub fn into_resource(self) -> Option<M> {
        self.resource
    }
}

fn skip_token_from_link(link: &str) -> Option<String> {
    let url = Url::parse(link).ok()?;
    url.query_pairs()
        .find(|(k, _)| k.eq_ignore_ascii_case("$skiptoken"))
        .map(|(_, v)| v.into_owned())
}
