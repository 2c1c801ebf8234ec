//! ARM API interaction module
//!
//! Authentication, the HTTP transport and resource group enumeration for the
//! Azure Resource Manager.
//!
//! # Module Structure
//!
//! - [`auth`] - Access tokens from a static token or a service principal
//! - [`client`] - Authenticated transport used by the resource services
//! - [`http`] - The [`Transport`](http::Transport) seam and its reqwest implementation
//! - [`resource_groups`] - Resource group listing
//!
//! # Example
//!
//! ```ignore
//! use azrest::arm::client::ArmClient;
//! use azrest::arm::http::Transport;
//!
//! async fn example(config: &azrest::Configuration) -> azrest::Result<()> {
//!     let client = ArmClient::from_config(config)?;
//!     let response = client.get("https://management.azure.com/subscriptions?api-version=2016-06-01").await?;
//!     println!("{}", response.status());
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
pub mod resource_groups;
