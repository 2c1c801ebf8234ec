//! Resource Service
//!
//! CRUD façade for one resource type. Every call runs
//! `validate → build URL → rewrite → one transport call → decode`.

use super::aggregator;
use super::filter::{matches_all, ResourceFilter};
use super::model::{decode_one, decode_page, Model, Resource};
use super::registry::ServiceDef;
use super::response::{ArmCollection, CreateResponse, ResponseHeaders};
use super::url::UrlBuilder;
use super::validate::{require_resource_group, require_resource_name};
use crate::arm::http::Transport;
use crate::arm::resource_groups::{ResourceGroupService, ResourceGroupSource};
use crate::config::Configuration;
use crate::error::{ArmError, Result};
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;

/// Caller hook that may replace a built URL before it is requested.
/// Returning `None` keeps the URL as built.
pub type UrlRewrite<'a> = dyn Fn(&str) -> Option<String> + Send + Sync + 'a;

/// Uniform create/read/update/delete/list over one ARM resource type
pub struct ResourceService<M: Model = Resource> {
    config: Arc<Configuration>,
    transport: Arc<dyn Transport>,
    groups: Arc<dyn ResourceGroupSource>,
    def: ServiceDef,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model> Clone for ResourceService<M> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            transport: self.transport.clone(),
            groups: self.groups.clone(),
            def: self.def.clone(),
            _model: PhantomData,
        }
    }
}

impl<M: Model> ResourceService<M> {
    /// Resource groups are enumerated through the same transport unless
    /// replaced with [`with_group_source`](Self::with_group_source)
    pub fn new(config: Arc<Configuration>, transport: Arc<dyn Transport>, def: ServiceDef) -> Self {
        let groups = Arc::new(ResourceGroupService::new(config.clone(), transport.clone()));
        Self {
            config,
            transport,
            groups,
            def,
            _model: PhantomData,
        }
    }

    pub fn with_group_source(mut self, groups: Arc<dyn ResourceGroupSource>) -> Self {
        self.groups = groups;
        self
    }

    pub fn service_def(&self) -> &ServiceDef {
        &self.def
    }

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    /// Fully qualified, version-stamped URL for this resource type
    pub fn build_url(&self, resource_group: Option<&str>, segments: &[&str]) -> Result<String> {
        let builder = UrlBuilder {
            endpoint: &self.config.resource_manager_url,
            subscription_id: self.config.subscription()?,
            provider: &self.def.provider,
            resource_type: &self.def.resource_type,
            api_version: &self.def.api_version,
        };
        Ok(builder.build_url(resource_group, segments))
    }

    /// An explicit group wins over the configured default
    fn resolve_group<'a>(&'a self, resource_group: Option<&'a str>) -> Option<&'a str> {
        resource_group.or(self.config.resource_group.as_deref())
    }

    fn rewrite(url: String, rewrite: Option<&UrlRewrite<'_>>) -> String {
        match rewrite.and_then(|f| f(&url)) {
            Some(replacement) => {
                tracing::debug!("URL rewritten: {} -> {}", url, replacement);
                replacement
            },
            None => url,
        }
    }

    /// Create a resource with a PUT. An empty response body means the backend
    /// accepted a long-running operation; the returned headers carry its
    /// tracking URL. This never waits for the operation to finish.
    pub async fn create<B>(
        &self,
        name: &str,
        resource_group: Option<&str>,
        options: &B,
        rewrite: Option<&UrlRewrite<'_>>,
    ) -> Result<CreateResponse<M>>
    where
        B: Serialize + ?Sized,
    {
        self.put_resource(name, resource_group, options, rewrite).await
    }

    /// Update a resource. Same wire call as [`create`](Self::create).
    pub async fn update<B>(
        &self,
        name: &str,
        resource_group: Option<&str>,
        options: &B,
        rewrite: Option<&UrlRewrite<'_>>,
    ) -> Result<CreateResponse<M>>
    where
        B: Serialize + ?Sized,
    {
        self.put_resource(name, resource_group, options, rewrite).await
    }

    async fn put_resource<B>(
        &self,
        name: &str,
        resource_group: Option<&str>,
        options: &B,
        rewrite: Option<&UrlRewrite<'_>>,
    ) -> Result<CreateResponse<M>>
    where
        B: Serialize + ?Sized,
    {
        let group = require_resource_group(self.resolve_group(resource_group))?;
        let name = require_resource_name(name)?;

        let url = Self::rewrite(self.build_url(Some(group), &[name])?, rewrite);
        let body = serde_json::to_value(options)?;

        let response = self.transport.put(&url, &body).await?;

        let resource = if response.has_body() {
            Some(decode_one(&response.body, &response.headers)?)
        } else {
            tracing::debug!(
                "{} {}/{} accepted, tracking at {:?}",
                self.def.service_name,
                group,
                name,
                response.headers.tracking_url()
            );
            None
        };

        Ok(CreateResponse {
            resource,
            headers: response.headers,
        })
    }

    /// Fetch one resource
    pub async fn get(
        &self,
        name: &str,
        resource_group: Option<&str>,
        rewrite: Option<&UrlRewrite<'_>>,
    ) -> Result<M> {
        let group = require_resource_group(self.resolve_group(resource_group))?;
        let name = require_resource_name(name)?;

        let url = Self::rewrite(self.build_url(Some(group), &[name])?, rewrite);
        let response = self.transport.get(&url).await?;

        decode_one(&response.body, &response.headers)
    }

    /// List the resources of one group (one page)
    pub async fn list(
        &self,
        resource_group: Option<&str>,
        rewrite: Option<&UrlRewrite<'_>>,
    ) -> Result<ArmCollection<M>> {
        let group = require_resource_group(self.resolve_group(resource_group))?;

        let url = Self::rewrite(self.build_url(Some(group), &[])?, rewrite);
        self.fetch_page(&url).await
    }

    /// List across the subscription (one page), keeping only resources for
    /// which every filter holds. Filtering is done locally after decoding.
    pub async fn list_all(
        &self,
        filters: &[ResourceFilter],
        rewrite: Option<&UrlRewrite<'_>>,
    ) -> Result<ArmCollection<M>> {
        let url = Self::rewrite(self.build_url(None, &[])?, rewrite);
        let mut collection = self.fetch_page(&url).await?;

        if !filters.is_empty() {
            collection.retain(|model| matches_all(model, filters));
        }

        Ok(collection)
    }

    /// Delete a resource.
    ///
    /// A 204 from this endpoint means there was nothing to delete and is
    /// reported as [`ArmError::NotFound`]. Any other success returns the
    /// response headers.
    pub async fn delete(
        &self,
        name: &str,
        resource_group: Option<&str>,
        rewrite: Option<&UrlRewrite<'_>>,
    ) -> Result<ResponseHeaders> {
        let group = require_resource_group(self.resolve_group(resource_group))?;
        let name = require_resource_name(name)?;

        let url = Self::rewrite(self.build_url(Some(group), &[name])?, rewrite);
        let response = self.transport.delete(&url).await?;

        if response.status() == 204 {
            return Err(ArmError::NotFound {
                status: 204,
                message: format!(
                    "{} resource {}/{} not found",
                    self.def.service_name, group, name
                ),
                response,
            });
        }

        Ok(response.headers)
    }

    /// List across every resource group of the subscription, for resource
    /// types without a subscription-wide endpoint. The rewrite hook is
    /// applied to each group's URL.
    pub async fn list_in_all_groups(
        &self,
        rewrite: Option<&UrlRewrite<'_>>,
    ) -> Result<ArmCollection<M>> {
        let groups = self.groups.resource_group_names().await?;

        tracing::info!(
            "Listing {} across {} resource groups ({} at a time)",
            self.def.service_name,
            groups.len(),
            self.config.concurrency()
        );

        aggregator::fan_out(groups, self.config.concurrency(), |group| async move {
            let url = Self::rewrite(self.build_url(Some(&group), &[])?, rewrite);
            let response = self.transport.get(&url).await?;
            let (items, _) = decode_page::<M>(&response.body, &response.headers)?;
            Ok((items, response.headers))
        })
        .await
    }

    /// Fetch the page after `collection`, if it has a continuation
    pub async fn next_page(&self, collection: &ArmCollection<M>) -> Result<Option<ArmCollection<M>>> {
        match collection.next_link() {
            Some(link) => self.fetch_page(link).await.map(Some),
            None => Ok(None),
        }
    }

    async fn fetch_page(&self, url: &str) -> Result<ArmCollection<M>> {
        let response = self.transport.get(url).await?;
        let (items, next_link) = decode_page(&response.body, &response.headers)?;
        Ok(ArmCollection::new(items, response.headers).with_next_link(next_link))
    }
}
