//! Compute and bare-metal plans

use crate::api::client::{VultrClient, PLANS, PLANS_METAL};
use crate::catalog::Catalog;
use crate::error::Result;
use serde_json::Value;

pub const LIST_KEY: &str = "plans";
pub const METAL_LIST_KEY: &str = "plans_metal";

pub async fn load_catalog(client: &VultrClient) -> Result<Catalog<String>> {
    Catalog::load(client, PLANS, LIST_KEY).await
}

pub async fn load_metal_catalog(client: &VultrClient) -> Result<Catalog<String>> {
    Catalog::load(client, PLANS_METAL, METAL_LIST_KEY).await
}

/// Plans wrapper holding both plan catalogs
#[derive(Debug, Clone)]
pub struct Plans {
    client: VultrClient,
    plans: Catalog<String>,
    metal: Catalog<String>,
}

impl Plans {
    pub async fn load(client: VultrClient) -> Result<Self> {
        let plans = load_catalog(&client).await?;
        let metal = load_metal_catalog(&client).await?;
        Ok(Self::from_catalogs(client, plans, metal))
    }

    pub fn from_catalogs(client: VultrClient, plans: Catalog<String>, metal: Catalog<String>) -> Self {
        Self {
            client,
            plans,
            metal,
        }
    }

    pub fn catalog(&self) -> &Catalog<String> {
        &self.plans
    }

    pub fn metal_catalog(&self) -> &Catalog<String> {
        &self.metal
    }

    pub async fn list(&self) -> Result<String> {
        self.client.get(PLANS).await
    }

    pub async fn list_metal(&self) -> Result<String> {
        self.client.get(PLANS_METAL).await
    }

    /// Server `meta.total` for compute plans
    pub fn plan_count(&self) -> Option<u64> {
        self.plans.reported_total()
    }

    /// Compute plans followed by bare-metal plans
    pub fn all_plans(&self) -> Vec<&Value> {
        self.plans.records().chain(self.metal.records()).collect()
    }
}
