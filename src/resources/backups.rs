//! Instance backups

use crate::api::client::{segment, VultrClient, BACKUPS};
use crate::catalog::Catalog;
use crate::error::Result;

pub const LIST_KEY: &str = "backups";

const UNKNOWN_BACKUP: &str = "That Backup ID isn't associated with your account";

pub async fn load_catalog(client: &VultrClient) -> Result<Catalog<String>> {
    Catalog::load(client, BACKUPS, LIST_KEY).await
}

#[derive(Debug, Clone)]
pub struct Backups {
    client: VultrClient,
    catalog: Catalog<String>,
}

impl Backups {
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

    pub async fn list(&self) -> Result<String> {
        self.client.get(BACKUPS).await
    }

    pub async fn get(&self, id: &str) -> Result<String> {
        self.catalog.require(id, UNKNOWN_BACKUP)?;
        self.client.get(&format!("{BACKUPS}/{}", segment(id))).await
    }
}
