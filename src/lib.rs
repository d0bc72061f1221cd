//! Validated client for the Vultr v2 REST API
//!
//! - [`api`] - transport gateway and verb helpers
//! - [`catalog`] - cached per-family listings used for existence checks
//! - [`validate`] - field validators shared by the request builders
//! - [`resources`] - one wrapper per resource family
//! - [`config`] - persisted settings for the `vultr` binary

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod resources;
pub mod validate;

pub use api::client::VultrClient;
pub use catalog::Catalog;
pub use error::{Result, VultrError};
pub use resources::Catalogs;
