//! Object storage subscriptions and clusters

use super::Catalogs;
use crate::api::client::{segment, VultrClient, OBJECT_STORAGE, OBJECT_STORAGE_CLUSTERS};
use crate::catalog::Catalog;
use crate::error::{Result, VultrError};
use serde::Serialize;

pub const LIST_KEY: &str = "object_storages";
pub const CLUSTER_LIST_KEY: &str = "clusters";

pub const DEFAULT_CLUSTER_ID: u64 = 2;

const UNKNOWN_STORAGE: &str = "That Storage ID isn't associated with your account";

pub async fn load_catalog(client: &VultrClient) -> Result<Catalog<String>> {
    Catalog::load(client, OBJECT_STORAGE, LIST_KEY).await
}

pub async fn load_cluster_catalog(client: &VultrClient) -> Result<Catalog<u64>> {
    Catalog::load(client, OBJECT_STORAGE_CLUSTERS, CLUSTER_LIST_KEY).await
}

/// Cluster serving `region`, if any; the last one listed wins
pub fn cluster_for_region(clusters: &Catalog<u64>, region: &str) -> Option<u64> {
    clusters
        .ids()
        .iter()
        .rev()
        .find(|id| clusters.attr_str(*id, "region") == Some(region))
        .copied()
}

/// Options for `POST /object-storage`
///
/// An explicit `cluster_id` takes precedence over `region`; with neither the
/// default cluster is used.
#[derive(Debug, Clone, Default)]
pub struct CreateObjectStorage {
    pub cluster_id: Option<u64>,
    pub region: Option<String>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateObjectStorageBody {
    pub cluster_id: u64,
    pub label: String,
}

impl CreateObjectStorage {
    pub fn build(&self, catalogs: &Catalogs) -> Result<CreateObjectStorageBody> {
        let clusters = &catalogs.object_storage_clusters;
        let cluster_id = match (self.cluster_id, self.region.as_deref()) {
            (Some(id), _) => {
                clusters.require(&id, "Bad Cluster ID")?;
                id
            }
            (None, Some(region)) => cluster_for_region(clusters, region)
                .ok_or_else(|| VultrError::invalid("Bad Region"))?,
            (None, None) => DEFAULT_CLUSTER_ID,
        };

        Ok(CreateObjectStorageBody {
            cluster_id,
            label: self.label.clone().unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelBody {
    pub label: String,
}

/// Object storage wrapper, holding both the subscription and cluster catalogs
#[derive(Debug, Clone)]
pub struct ObjectStorage {
    client: VultrClient,
    catalog: Catalog<String>,
    clusters: Catalog<u64>,
}

impl ObjectStorage {
    pub async fn load(client: VultrClient) -> Result<Self> {
        let clusters = load_cluster_catalog(&client).await?;
        let catalog = load_catalog(&client).await?;
        Ok(Self::from_catalogs(client, catalog, clusters))
    }

    pub fn from_catalogs(client: VultrClient, catalog: Catalog<String>, clusters: Catalog<u64>) -> Self {
        Self {
            client,
            catalog,
            clusters,
        }
    }

    pub fn catalog(&self) -> &Catalog<String> {
        &self.catalog
    }

    pub fn clusters(&self) -> &Catalog<u64> {
        &self.clusters
    }

    /// Regions that host a cluster, in server order
    pub fn regions(&self) -> Vec<&str> {
        self.clusters
            .records()
            .filter_map(|r| r.get("region").and_then(|v| v.as_str()))
            .collect()
    }

    fn checked_path(&self, id: &str, suffix: &str) -> Result<String> {
        self.catalog.require(id, UNKNOWN_STORAGE)?;
        Ok(format!("{OBJECT_STORAGE}/{}{suffix}", segment(id)))
    }

    pub async fn list(&self) -> Result<String> {
        self.client.get(OBJECT_STORAGE).await
    }

    pub async fn list_clusters(&self) -> Result<String> {
        self.client.get(OBJECT_STORAGE_CLUSTERS).await
    }

    pub async fn create(&self, opts: &CreateObjectStorage, catalogs: &Catalogs) -> Result<String> {
        let body = opts.build(catalogs)?;
        self.client.post(OBJECT_STORAGE, &body).await
    }

    pub async fn get(&self, id: &str) -> Result<String> {
        self.client.get(&self.checked_path(id, "")?).await
    }

    pub async fn delete(&self, id: &str) -> Result<String> {
        self.client.delete(&self.checked_path(id, "")?).await
    }

    pub async fn regenerate_keys(&self, id: &str) -> Result<String> {
        self.client
            .post_empty(&self.checked_path(id, "/regenerate-keys")?)
            .await
    }

    /// Replace the label (empty when `None`)
    pub async fn update(&self, id: &str, label: Option<&str>) -> Result<String> {
        let path = self.checked_path(id, "")?;
        let body = LabelBody {
            label: label.unwrap_or_default().to_string(),
        };
        self.client.put(&path, &body).await
    }
}
