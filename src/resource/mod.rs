//! Resource abstraction layer
//!
//! Generic CRUD over resource-group scoped ARM entities. A resource type is
//! described by a [`ServiceDef`] (provider namespace, type name, API
//! version); URLs, request bodies and decoded models all follow from it.
//!
//! # Architecture
//!
//! - [`url`] - Builds subscription-scoped, version-stamped URLs
//! - [`validate`] - Resource group and name guards
//! - [`response`] - Response headers and collection envelopes
//! - [`model`] - The [`Model`] decoding seam and the generic [`Resource`]
//! - [`filter`] - Local exact-match filtering
//! - [`registry`] - Well-known service definitions loaded from embedded JSON
//! - [`service`] - The [`ResourceService`] façade
//! - [`aggregator`] - Bounded fan-out across resource groups
//!
//! # Example
//!
//! ```ignore
//! use azrest::resource::{get_service, ResourceFilter, ResourceService};
//!
//! async fn eastus_vms(svc: &ResourceService) -> azrest::Result<usize> {
//!     let vms = svc.list_all(&[ResourceFilter::new("location", "eastus")], None).await?;
//!     Ok(vms.len())
//! }
//! ```

pub mod aggregator;
pub mod filter;
pub mod model;
mod registry;
pub mod response;
pub mod service;
pub mod url;
pub mod validate;

pub use filter::ResourceFilter;
pub use model::{Model, Resource};
pub use registry::*;
pub use response::{ArmCollection, CreateResponse, RawResponse, ResponseHeaders};
pub use service::{ResourceService, UrlRewrite};
pub use url::UrlBuilder;
