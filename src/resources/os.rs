//! Operating systems

use crate::api::client::{VultrClient, OS};
use crate::catalog::Catalog;
use crate::error::Result;

pub const LIST_KEY: &str = "os";

pub async fn load_catalog(client: &VultrClient) -> Result<Catalog<u64>> {
    Catalog::load(client, OS, LIST_KEY).await
}

#[derive(Debug, Clone)]
pub struct OperatingSystems {
    client: VultrClient,
    catalog: Catalog<u64>,
}

impl OperatingSystems {
    pub async fn load(client: VultrClient) -> Result<Self> {
        let catalog = load_catalog(&client).await?;
        Ok(Self::from_catalog(client, catalog))
    }

    pub fn from_catalog(client: VultrClient, catalog: Catalog<u64>) -> Self {
        Self { client, catalog }
    }

    pub fn catalog(&self) -> &Catalog<u64> {
        &self.catalog
    }

    pub async fn list(&self) -> Result<String> {
        self.client.get(OS).await
    }
}
