//! ARM Client
//!
//! Main transport for the resource manager, combining authentication and
//! HTTP functionality.

use super::auth::ArmCredentials;
use super::http::{ArmHttpClient, Transport};
use crate::config::Configuration;
use crate::error::Result;
use crate::resource::RawResponse;
use async_trait::async_trait;
use serde_json::Value;

/// Authenticated ARM transport
#[derive(Clone)]
pub struct ArmClient {
    pub credentials: ArmCredentials,
    pub http: ArmHttpClient,
}

impl ArmClient {
    pub fn new(credentials: ArmCredentials) -> Result<Self> {
        Ok(Self {
            credentials,
            http: ArmHttpClient::new()?,
        })
    }

    /// Build a client with the credentials named by the configuration
    pub fn from_config(config: &Configuration) -> Result<Self> {
        Self::new(ArmCredentials::from_config(config)?)
    }

    pub async fn get_token(&self) -> Result<String> {
        self.credentials.get_token().await
    }
}

#[async_trait]
impl Transport for ArmClient {
    async fn get(&self, url: &str) -> Result<RawResponse> {
        let token = self.get_token().await?;
        self.http.get(url, &token).await
    }

    async fn put(&self, url: &str, body: &Value) -> Result<RawResponse> {
        let token = self.get_token().await?;
        self.http.put(url, &token, body).await
    }

    async fn delete(&self, url: &str) -> Result<RawResponse> {
        let token = self.get_token().await?;
        self.http.delete(url, &token).await
    }
}
