//! Configuration Management
//!
//! Subscription, default resource group, concurrency and credentials shared
//! by every resource service. Values come from the config file, then the
//! environment, then command line flags.

use crate::error::{ArmError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

pub const DEFAULT_RESOURCE_MANAGER_URL: &str = "https://management.azure.com";
pub const DEFAULT_AUTHORITY_URL: &str = "https://login.microsoftonline.com";
pub const DEFAULT_MAX_THREADS: usize = 10;

/// Client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub subscription_id: Option<String>,
    /// Used when an operation is called without an explicit group
    #[serde(default)]
    pub resource_group: Option<String>,
    /// Upper bound on concurrent calls when listing across resource groups
    #[serde(default = "default_max_threads")]
    pub max_threads: usize,
    #[serde(default = "default_resource_manager_url")]
    pub resource_manager_url: String,
    #[serde(default = "default_authority_url")]
    pub authority_url: String,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
}

fn default_max_threads() -> usize {
    DEFAULT_MAX_THREADS
}

fn default_resource_manager_url() -> String {
    DEFAULT_RESOURCE_MANAGER_URL.to_string()
}

fn default_authority_url() -> String {
    DEFAULT_AUTHORITY_URL.to_string()
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            subscription_id: None,
            resource_group: None,
            max_threads: DEFAULT_MAX_THREADS,
            resource_manager_url: default_resource_manager_url(),
            authority_url: default_authority_url(),
            tenant_id: None,
            client_id: None,
            client_secret: None,
            access_token: None,
        }
    }
}

impl Configuration {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("azrest").join("config.json"))
    }

    /// Load from the default location with environment overrides applied
    pub fn load() -> Self {
        let mut config = Self::config_path()
            .and_then(|path| match Self::load_from(&path) {
                Ok(config) => Some(config),
                Err(e) => {
                    tracing::warn!("Ignoring config file {:?}: {}", path, e);
                    None
                },
            })
            .unwrap_or_default();
        config.apply_env();
        config
    }

    /// Load a config file; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            ArmError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Override fields from `AZURE_*` environment variables
    pub fn apply_env(&mut self) {
        self.apply_vars(|name| std::env::var(name).ok());
    }

    fn apply_vars<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |slot: &mut Option<String>, name: &str| {
            if let Some(value) = var(name).filter(|v| !v.is_empty()) {
                *slot = Some(value);
            }
        };
        set(&mut self.subscription_id, "AZURE_SUBSCRIPTION_ID");
        set(&mut self.resource_group, "AZURE_RESOURCE_GROUP");
        set(&mut self.tenant_id, "AZURE_TENANT_ID");
        set(&mut self.client_id, "AZURE_CLIENT_ID");
        set(&mut self.client_secret, "AZURE_CLIENT_SECRET");
        set(&mut self.access_token, "AZURE_ACCESS_TOKEN");

        if let Some(url) = var("AZURE_RESOURCE_MANAGER_URL").filter(|v| !v.is_empty()) {
            self.resource_manager_url = url;
        }
        if let Some(threads) = var("AZURE_MAX_THREADS") {
            match threads.parse::<usize>() {
                Ok(n) => self.max_threads = n,
                Err(_) => tracing::warn!("Invalid AZURE_MAX_THREADS value: {}", threads),
            }
        }
    }

    /// The subscription id, which every URL needs
    pub fn subscription(&self) -> Result<&str> {
        self.subscription_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ArmError::Configuration("subscription id must be specified".into()))
    }

    /// Concurrency bound, never below one
    pub fn concurrency(&self) -> usize {
        self.max_threads.max(1)
    }

    /// Check the fields every service depends on
    pub fn validate(&self) -> Result<()> {
        let subscription = self.subscription()?;
        if uuid::Uuid::parse_str(subscription).is_err() {
            return Err(ArmError::Configuration(format!(
                "invalid subscription id: {}",
                subscription
            )));
        }
        for (name, value) in [
            ("resource_manager_url", &self.resource_manager_url),
            ("authority_url", &self.authority_url),
        ] {
            Url::parse(value).map_err(|e| {
                ArmError::Configuration(format!("invalid {} {:?}: {}", name, value, e))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SUB: &str = "00000000-1111-2222-3333-444444444444";

    #[test]
    fn test_defaults() {
        let config = Configuration::default();
        assert_eq!(config.max_threads, DEFAULT_MAX_THREADS);
        assert_eq!(config.resource_manager_url, DEFAULT_RESOURCE_MANAGER_URL);
        assert!(config.subscription().is_err());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: Configuration =
            serde_json::from_str(r#"{"subscription_id": "abc", "resource_group": "rg1"}"#)
                .unwrap();
        assert_eq!(config.subscription().unwrap(), "abc");
        assert_eq!(config.resource_group.as_deref(), Some("rg1"));
        assert_eq!(config.max_threads, DEFAULT_MAX_THREADS);
        assert_eq!(config.authority_url, DEFAULT_AUTHORITY_URL);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("AZURE_SUBSCRIPTION_ID", SUB),
            ("AZURE_RESOURCE_GROUP", "rg-env"),
            ("AZURE_MAX_THREADS", "4"),
            ("AZURE_CLIENT_ID", ""),
        ]
        .into_iter()
        .collect();

        let mut config = Configuration {
            client_id: Some("from-file".into()),
            ..Configuration::default()
        };
        config.apply_vars(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.subscription_id.as_deref(), Some(SUB));
        assert_eq!(config.resource_group.as_deref(), Some("rg-env"));
        assert_eq!(config.max_threads, 4);
        assert_eq!(config.client_id.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_validate() {
        let mut config = Configuration {
            subscription_id: Some(SUB.into()),
            ..Configuration::default()
        };
        assert!(config.validate().is_ok());

        config.subscription_id = Some("not-a-guid".into());
        assert!(config.validate().is_err());

        config.subscription_id = Some(SUB.into());
        config.resource_manager_url = "not a url".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_concurrency_never_zero() {
        let config = Configuration {
            max_threads: 0,
            ..Configuration::default()
        };
        assert_eq!(config.concurrency(), 1);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            format!(r#"{{"subscription_id": "{}", "resource_group": "rg1", "max_threads": 4}}"#, SUB),
        )
        .unwrap();

        let loaded = Configuration::load_from(&path).unwrap();
        assert_eq!(loaded.subscription_id.as_deref(), Some(SUB));
        assert_eq!(loaded.resource_group.as_deref(), Some("rg1"));
        assert_eq!(loaded.max_threads, 4);
        assert_eq!(loaded.resource_manager_url, DEFAULT_RESOURCE_MANAGER_URL);
        assert!(loaded.client_secret.is_none());
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Configuration::load_from(&dir.path().join("absent.json")).unwrap();
        assert!(loaded.subscription_id.is_none());
    }
}
