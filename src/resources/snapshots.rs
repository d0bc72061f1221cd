//! Snapshots

use super::Catalogs;
use crate::api::client::{segment, VultrClient, SNAPSHOTS};
use crate::catalog::Catalog;
use crate::error::Result;
use serde::Serialize;

pub const LIST_KEY: &str = "snapshots";

pub async fn load_catalog(client: &VultrClient) -> Result<Catalog<String>> {
    Catalog::load(client, SNAPSHOTS, LIST_KEY).await
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateSnapshotBody {
    pub instance_id: String,
    pub description: String,
}

/// Snapshot of an instance belonging to the account
pub fn build_create(
    instance_id: &str,
    description: Option<&str>,
    catalogs: &Catalogs,
) -> Result<CreateSnapshotBody> {
    catalogs.instances.require(
        instance_id,
        "Missing An Instance ID that is part of your account",
    )?;
    Ok(CreateSnapshotBody {
        instance_id: instance_id.to_string(),
        description: description.unwrap_or_default().to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FromUrlBody {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescriptionBody {
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct Snapshots {
    client: VultrClient,
    catalog: Catalog<String>,
}

impl Snapshots {
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
        format!("{SNAPSHOTS}/{}", segment(id))
    }

    pub async fn list(&self) -> Result<String> {
        self.client.get(SNAPSHOTS).await
    }

    pub async fn get(&self, id: &str) -> Result<String> {
        self.client.get(&Self::path(id)).await
    }

    pub async fn delete(&self, id: &str) -> Result<String> {
        self.client.delete(&Self::path(id)).await
    }

    pub async fn create(
        &self,
        instance_id: &str,
        description: Option<&str>,
        catalogs: &Catalogs,
    ) -> Result<String> {
        let body = build_create(instance_id, description, catalogs)?;
        self.client.post(SNAPSHOTS, &body).await
    }

    /// Import a raw disk image; the URL is passed through unchecked
    pub async fn create_from_url(&self, url: &str) -> Result<String> {
        let body = FromUrlBody {
            url: url.to_string(),
        };
        self.client
            .post(&format!("{SNAPSHOTS}/create-from-url"), &body)
            .await
    }

    pub async fn update(&self, id: &str, description: Option<&str>) -> Result<String> {
        self.catalog
            .require(id, "That Snapshot ID isn't associated with your account")?;
        let body = DescriptionBody {
            description: description.unwrap_or_default().to_string(),
        };
        self.client.put(&Self::path(id), &body).await
    }
}
