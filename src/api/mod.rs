//! Vultr API interaction module
//!
//! # Module Structure
//!
//! - [`client`] - API root, resource paths and verb helpers
//! - [`http`] - the shared request gateway and error translation
//!
//! # Example
//!
//! ```ignore
//! use vultr_client::api::client::{VultrClient, REGIONS};
//!
//! async fn example() -> vultr_client::Result<()> {
//!     let client = VultrClient::new("my-token")?;
//!     let regions = client.get(REGIONS).await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod http;
