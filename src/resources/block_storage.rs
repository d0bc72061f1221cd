//! Block storage volumes

use super::{regions, Catalogs, UNKNOWN_INSTANCE};
use crate::api::client::{segment, VultrClient, BLOCKS};
use crate::catalog::Catalog;
use crate::error::{Result, VultrError};
use crate::validate;
use serde::Serialize;
use std::ops::RangeInclusive;

pub const LIST_KEY: &str = "blocks";

pub const DEFAULT_REGION: &str = "ewr";
pub const DEFAULT_SIZE_GB: i64 = 20;
pub const SIZE_RANGE_GB: RangeInclusive<i64> = 10..=10000;

const UNKNOWN_BLOCK: &str = "That Block ID isn't associated with your account";
const MISSING_BLOCK: &str = "That block ID doesn't exist in your account";
const BAD_SIZE: &str = "Size must be a number between 10 and 10000";

pub async fn load_catalog(client: &VultrClient) -> Result<Catalog<String>> {
    Catalog::load(client, BLOCKS, LIST_KEY).await
}

/// Options for `POST /blocks`
#[derive(Debug, Clone, Default)]
pub struct CreateBlock {
    /// Defaults to `ewr`; must advertise block storage when given
    pub region: Option<String>,
    /// Size in GB, defaults to 20
    pub size: Option<i64>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateBlockBody {
    pub region: String,
    pub size_gb: i64,
    pub label: String,
}

impl CreateBlock {
    pub fn build(&self, catalogs: &Catalogs) -> Result<CreateBlockBody> {
        let region = match self.region.as_deref() {
            Some(region) => {
                if !regions::supports(&catalogs.regions, region, regions::BLOCK_STORAGE) {
                    return Err(VultrError::invalid(format!(
                        "Region '{region}' does not offer block storage"
                    )));
                }
                region
            }
            None => DEFAULT_REGION,
        };

        let size_gb = self.size.unwrap_or(DEFAULT_SIZE_GB);
        validate::require_range(size_gb, SIZE_RANGE_GB, BAD_SIZE)?;

        Ok(CreateBlockBody {
            region: region.to_string(),
            size_gb,
            label: self.label.clone().unwrap_or_default(),
        })
    }
}

/// Options for `PATCH /blocks/{id}`
#[derive(Debug, Clone, Default)]
pub struct UpdateBlock {
    pub id: String,
    /// Required
    pub size: Option<i64>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateBlockBody {
    pub size_gb: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl UpdateBlock {
    pub fn build(&self, blocks: &Catalog<String>) -> Result<UpdateBlockBody> {
        blocks.require(self.id.as_str(), MISSING_BLOCK)?;
        let size_gb = self
            .size
            .ok_or_else(|| VultrError::invalid("You must set the size"))?;
        validate::require_range(size_gb, SIZE_RANGE_GB, BAD_SIZE)?;

        Ok(UpdateBlockBody {
            size_gb,
            label: self.label.clone(),
        })
    }
}

/// Options for `POST /blocks/{id}/attach`
#[derive(Debug, Clone, Default)]
pub struct AttachBlock {
    pub id: String,
    pub instance_id: String,
    /// Attach without restarting the instance
    pub live: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachBlockBody {
    pub instance_id: String,
    pub live: bool,
}

impl AttachBlock {
    pub fn build(&self, blocks: &Catalog<String>, catalogs: &Catalogs) -> Result<AttachBlockBody> {
        catalogs
            .instances
            .require(self.instance_id.as_str(), UNKNOWN_INSTANCE)?;
        blocks.require(self.id.as_str(), MISSING_BLOCK)?;

        Ok(AttachBlockBody {
            instance_id: self.instance_id.clone(),
            live: self.live,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetachBlockBody {
    pub live: bool,
}

/// Block storage wrapper
#[derive(Debug, Clone)]
pub struct BlockStorage {
    client: VultrClient,
    catalog: Catalog<String>,
}

impl BlockStorage {
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

    fn path(id: &str, suffix: &str) -> String {
        format!("{BLOCKS}/{}{suffix}", segment(id))
    }

    pub async fn list(&self) -> Result<String> {
        self.client.get(BLOCKS).await
    }

    pub async fn get(&self, id: &str) -> Result<String> {
        self.catalog.require(id, UNKNOWN_BLOCK)?;
        self.client.get(&Self::path(id, "")).await
    }

    pub async fn delete(&self, id: &str) -> Result<String> {
        self.catalog.require(id, UNKNOWN_BLOCK)?;
        self.client.delete(&Self::path(id, "")).await
    }

    pub async fn create(&self, opts: &CreateBlock, catalogs: &Catalogs) -> Result<String> {
        let body = opts.build(catalogs)?;
        self.client.post(BLOCKS, &body).await
    }

    pub async fn update(&self, opts: &UpdateBlock) -> Result<String> {
        let body = opts.build(&self.catalog)?;
        self.client.patch(&Self::path(&opts.id, ""), &body).await
    }

    pub async fn attach(&self, opts: &AttachBlock, catalogs: &Catalogs) -> Result<String> {
        let body = opts.build(&self.catalog, catalogs)?;
        self.client.post(&Self::path(&opts.id, "/attach"), &body).await
    }

    pub async fn detach(&self, id: &str, live: bool) -> Result<String> {
        self.catalog.require(id, MISSING_BLOCK)?;
        self.client
            .post(&Self::path(id, "/detach"), &DetachBlockBody { live })
            .await
    }
}
