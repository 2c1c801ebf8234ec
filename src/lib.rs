//! # azrest
//!
//! Generic CRUD client for resource-group scoped Azure Resource Manager
//! entities.
//!
//! - [`resource`] - URL building, validation, envelopes and the resource service
//! - [`arm`] - Authentication, HTTP transport and resource group enumeration
//! - [`config`] - Subscription, default group, concurrency and credentials
//! - [`error`] - The [`ArmError`] taxonomy

pub mod arm;
pub mod config;
pub mod error;
pub mod resource;

pub use config::Configuration;
pub use error::{ArmError, Result};
pub use resource::{ArmCollection, Resource, ResourceService, ServiceDef};
