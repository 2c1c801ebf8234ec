//! Resource Groups
//!
//! Enumerates the resource groups of a subscription for cross-group listing.

use super::http::Transport;
use crate::config::Configuration;
use crate::error::{ArmError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

pub const RESOURCE_GROUPS_API_VERSION: &str = "2017-05-10";

/// Resource group information
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceGroup {
    pub id: String,
    pub name: String,
    pub location: String,
    pub provisioning_state: String,
}

impl From<&Value> for ResourceGroup {
    fn from(value: &Value) -> Self {
        let text = |v: Option<&Value>, default: &str| {
            v.and_then(|v| v.as_str()).unwrap_or(default).to_string()
        };
        Self {
            id: text(value.get("id"), "-"),
            name: text(value.get("name"), "-"),
            location: text(value.get("location"), "-"),
            provisioning_state: text(
                value.get("properties").and_then(|p| p.get("provisioningState")),
                "Unknown",
            ),
        }
    }
}

/// Produces the names of every resource group to fan out over
#[async_trait]
pub trait ResourceGroupSource: Send + Sync {
    async fn resource_group_names(&self) -> Result<Vec<String>>;
}

/// Lists groups through `/subscriptions/<sub>/resourcegroups`
#[derive(Clone)]
pub struct ResourceGroupService {
    config: Arc<Configuration>,
    transport: Arc<dyn Transport>,
}

impl ResourceGroupService {
    pub fn new(config: Arc<Configuration>, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    fn url(&self) -> Result<String> {
        Ok(format!(
            "{}/subscriptions/{}/resourcegroups?api-version={}",
            self.config.resource_manager_url.trim_end_matches('/'),
            self.config.subscription()?,
            RESOURCE_GROUPS_API_VERSION
        ))
    }

    /// List all resource groups, following `nextLink` until exhausted
    pub async fn list(&self) -> Result<Vec<ResourceGroup>> {
        let mut groups = Vec::new();
        let mut next = Some(self.url()?);

        while let Some(url) = next.take() {
            let response = self.transport.get(&url).await?;
            let body: Value = serde_json::from_str(&response.body)?;

            let page = body
                .get("value")
                .and_then(|v| v.as_array())
                .ok_or_else(|| ArmError::Decode("resource group list has no `value`".into()))?;
            groups.extend(page.iter().map(ResourceGroup::from));

            next = body
                .get("nextLink")
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string());
        }

        Ok(groups)
    }
}

#[async_trait]
impl ResourceGroupSource for ResourceGroupService {
    async fn resource_group_names(&self) -> Result<Vec<String>> {
        let groups = self.list().await?;
        Ok(groups.into_iter().map(|g| g.name).collect())
    }
}

/// A fixed set of groups, for callers that already know them
#[async_trait]
impl ResourceGroupSource for Vec<String> {
    async fn resource_group_names(&self) -> Result<Vec<String>> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resource_group_from_value() {
        let group = ResourceGroup::from(&json!({
            "id": "/subscriptions/s/resourceGroups/rg1",
            "name": "rg1",
            "location": "eastus",
            "properties": {"provisioningState": "Succeeded"}
        }));
        assert_eq!(group.name, "rg1");
        assert_eq!(group.location, "eastus");
        assert_eq!(group.provisioning_state, "Succeeded");
    }

    #[test]
    fn test_resource_group_defaults() {
        let group = ResourceGroup::from(&json!({}));
        assert_eq!(group.name, "-");
        assert_eq!(group.provisioning_state, "Unknown");
    }

    #[tokio::test]
    async fn test_static_group_list() {
        let groups = vec!["rg1".to_string(), "rg2".to_string()];
        assert_eq!(groups.resource_group_names().await.unwrap(), groups);
    }
}
