//! Azure Authentication
//!
//! Access tokens for the resource manager, either supplied directly or
//! obtained with the Azure AD client-credentials flow.

use crate::config::Configuration;
use crate::error::{ArmError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Token expiry buffer - refresh tokens this much before they actually expire
/// This prevents using tokens that are about to expire during a request
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Default token TTL if we can't determine expiry (conservative: 30 minutes)
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

/// A freshly issued token and how long it stays valid
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_in: Duration,
}

/// Anything that can mint resource manager tokens
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch_token(&self) -> Result<AccessToken>;
}

/// A pre-issued token, e.g. from `az account get-access-token`
pub struct StaticToken(pub String);

#[async_trait]
impl TokenSource for StaticToken {
    async fn fetch_token(&self) -> Result<AccessToken> {
        Ok(AccessToken {
            token: self.0.clone(),
            expires_in: DEFAULT_TOKEN_TTL,
        })
    }
}

/// Service principal authenticating with a client secret
pub struct ClientSecretCredential {
    http: reqwest::Client,
    authority_url: String,
    tenant_id: String,
    client_id: String,
    client_secret: String,
    resource: String,
}

impl ClientSecretCredential {
    pub fn new(
        authority_url: &str,
        tenant_id: &str,
        client_id: &str,
        client_secret: &str,
        resource: &str,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("azrest/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            authority_url: authority_url.trim_end_matches('/').to_string(),
            tenant_id: tenant_id.to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            resource: resource.to_string(),
        })
    }

    fn token_url(&self) -> String {
        format!("{}/{}/oauth2/token", self.authority_url, self.tenant_id)
    }
}

#[async_trait]
impl TokenSource for ClientSecretCredential {
    async fn fetch_token(&self) -> Result<AccessToken> {
        tracing::debug!("Requesting token for client {}", self.client_id);

        let response = self
            .http
            .post(self.token_url())
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("resource", self.resource.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let (code, message) = super::http::parse_error_body(&body);
            let detail = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| {
                    v.get("error_description")
                        .and_then(|d| d.as_str())
                        .map(|s| s.to_string())
                })
                .or(message)
                .or(code)
                .unwrap_or_else(|| status.to_string());
            return Err(ArmError::Auth(detail));
        }

        parse_token_response(&body)
    }
}

/// Azure AD v1 returns `expires_in` as a string, v2 as a number
fn parse_token_response(body: &str) -> Result<AccessToken> {
    let value: Value = serde_json::from_str(body)?;
    let token = value
        .get("access_token")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ArmError::Auth("token response has no access_token".to_string()))?
        .to_string();

    let expires_in = value
        .get("expires_in")
        .and_then(|v| match v {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        })
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TOKEN_TTL);

    Ok(AccessToken { token, expires_in })
}

/// Credentials holder with token caching
#[derive(Clone)]
pub struct ArmCredentials {
    provider: Arc<dyn TokenSource>,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    /// When this token expires (with buffer applied)
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

impl ArmCredentials {
    pub fn new(provider: Arc<dyn TokenSource>) -> Self {
        Self {
            provider,
            token_cache: Arc::new(RwLock::new(None)),
        }
    }

    pub fn from_token(token: &str) -> Self {
        Self::new(Arc::new(StaticToken(token.to_string())))
    }

    /// Pick a token source from configuration: an explicit access token wins,
    /// otherwise a service principal is required
    pub fn from_config(config: &Configuration) -> Result<Self> {
        if let Some(token) = config.access_token.as_deref().filter(|t| !t.is_empty()) {
            return Ok(Self::from_token(token));
        }

        match (
            config.tenant_id.as_deref(),
            config.client_id.as_deref(),
            config.client_secret.as_deref(),
        ) {
            (Some(tenant), Some(client), Some(secret)) => {
                let credential = ClientSecretCredential::new(
                    &config.authority_url,
                    tenant,
                    client,
                    secret,
                    &config.resource_manager_url,
                )?;
                Ok(Self::new(Arc::new(credential)))
            },
            _ => Err(ArmError::Configuration(
                "no credentials configured: set AZURE_ACCESS_TOKEN or AZURE_TENANT_ID, AZURE_CLIENT_ID and AZURE_CLIENT_SECRET"
                    .to_string(),
            )),
        }
    }

    /// Get an access token for API calls
    /// Security: Checks token expiry before returning cached token
    pub async fn get_token(&self) -> Result<String> {
        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.token.clone());
                }
                tracing::debug!("Cached token expired, fetching new token");
            }
        }

        let issued = self.provider.fetch_token().await?;
        let ttl = issued.expires_in.saturating_sub(TOKEN_EXPIRY_BUFFER);
        let expires_at = Instant::now() + ttl;

        {
            let mut cache = self.token_cache.write().await;
            *cache = Some(CachedToken {
                token: issued.token.clone(),
                expires_at,
            });
        }

        tracing::debug!("New token cached, expires in ~{} minutes", ttl.as_secs() / 60);

        Ok(issued.token)
    }

    /// Force refresh the token
    pub async fn refresh_token(&self) -> Result<String> {
        {
            let mut cache = self.token_cache.write().await;
            *cache = None;
        }

        self.get_token().await
    }
}
