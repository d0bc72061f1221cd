//! Private networks

use super::{Catalogs, INVALID_REGION};
use crate::api::client::{segment, VultrClient, PRIVATE_NETWORKS};
use crate::catalog::Catalog;
use crate::error::{Result, VultrError};
use crate::validate;
use serde::Serialize;

pub const LIST_KEY: &str = "networks";

pub async fn load_catalog(client: &VultrClient) -> Result<Catalog<String>> {
    Catalog::load(client, PRIVATE_NETWORKS, LIST_KEY).await
}

/// Options for `POST /private-networks`
#[derive(Debug, Clone, Default)]
pub struct CreatePrivateNetwork {
    pub region: String,
    /// RFC1918 (or loopback) IPv4 network address
    pub subnet: String,
    /// Prefix length, 1 to 31
    pub mask: Option<u8>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatePrivateNetworkBody {
    pub region: String,
    pub v4_subnet: String,
    pub v4_subnet_mask: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CreatePrivateNetwork {
    pub fn build(&self, catalogs: &Catalogs) -> Result<CreatePrivateNetworkBody> {
        catalogs.regions.require(self.region.as_str(), INVALID_REGION)?;

        if !validate::is_private_ipv4(&self.subnet) {
            return Err(VultrError::invalid(
                "Subnet is invalid. Must be an IP address and must meet RFC Standard for Private Networks.",
            ));
        }

        let mask = self
            .mask
            .filter(|mask| (1..32).contains(mask))
            .ok_or_else(|| {
                VultrError::invalid(
                    "Subnet mask must be between 1 and 31 (you can't have a /32 private network)",
                )
            })?;

        Ok(CreatePrivateNetworkBody {
            region: self.region.clone(),
            v4_subnet: self.subnet.clone(),
            v4_subnet_mask: mask,
            description: self.description.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescriptionBody {
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct PrivateNetworks {
    client: VultrClient,
    catalog: Catalog<String>,
}

impl PrivateNetworks {
    pub async fn load(client: VultrClient) -> Result<Self> {
        let catalog = load_catalog(&client).await?;
        Ok(Self::from_catalog(client, catalog))
    }

    pub fn from_catalog(client: VultrClient, catalog: Catalog<String>) -> Self {
        Self { client, catalog }
    }

    pub fn catalog(&self) -> &Catalog<String> {
        &self.catalog
    }

    fn path(id: &str) -> String {
        format!("{PRIVATE_NETWORKS}/{}", segment(id))
    }

    pub async fn list(&self) -> Result<String> {
        self.client.get(PRIVATE_NETWORKS).await
    }

    pub async fn get(&self, id: &str) -> Result<String> {
        self.client.get(&Self::path(id)).await
    }

    pub async fn delete(&self, id: &str) -> Result<String> {
        self.client.delete(&Self::path(id)).await
    }

    pub async fn create(&self, opts: &CreatePrivateNetwork, catalogs: &Catalogs) -> Result<String> {
        let body = opts.build(catalogs)?;
        self.client.post(PRIVATE_NETWORKS, &body).await
    }

    /// Replace the description (empty when `None`)
    pub async fn update(&self, id: &str, description: Option<&str>) -> Result<String> {
        self.catalog.require(
            id,
            "That Private Network ID isn't associated with your account",
        )?;
        let body = DescriptionBody {
            description: description.unwrap_or_default().to_string(),
        };
        self.client.put(&Self::path(id), &body).await
    }
}
