//! Regions and their capabilities

use crate::api::client::{VultrClient, REGIONS};
use crate::catalog::Catalog;
use crate::error::Result;

pub const LIST_KEY: &str = "regions";

/// Region option advertising block storage
pub const BLOCK_STORAGE: &str = "block_storage";
/// Region option advertising DDoS protection
pub const DDOS_PROTECTION: &str = "ddos_protection";

pub async fn load_catalog(client: &VultrClient) -> Result<Catalog<String>> {
    Catalog::load(client, REGIONS, LIST_KEY).await
}

/// True when region `id` lists `option` in its `options` array
pub fn supports(regions: &Catalog<String>, id: &str, option: &str) -> bool {
    regions
        .get(id)
        .and_then(|r| r.get("options"))
        .and_then(|v| v.as_array())
        .is_some_and(|opts| opts.iter().any(|o| o.as_str() == Some(option)))
}

fn ids_with<'a>(regions: &'a Catalog<String>, option: &str) -> Vec<&'a str> {
    regions
        .ids()
        .iter()
        .filter(|id| supports(regions, id, option))
        .map(String::as_str)
        .collect()
}

fn distinct<'a>(regions: &'a Catalog<String>, field: &str) -> Vec<&'a str> {
    let mut seen: Vec<&str> = Vec::new();
    for value in regions.records().filter_map(|r| r.get(field).and_then(|v| v.as_str())) {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}

#[derive(Debug, Clone)]
pub struct Regions {
    client: VultrClient,
    catalog: Catalog<String>,
}

impl Regions {
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
        self.client.get(REGIONS).await
    }

    /// City of every region, in server order (may repeat)
    pub fn cities(&self) -> Vec<&str> {
        self.catalog
            .records()
            .filter_map(|r| r.get("city").and_then(|v| v.as_str()))
            .collect()
    }

    /// Countries, first occurrence order, no repeats
    pub fn countries(&self) -> Vec<&str> {
        distinct(&self.catalog, "country")
    }

    /// Continents, first occurrence order, no repeats
    pub fn continents(&self) -> Vec<&str> {
        distinct(&self.catalog, "continent")
    }

    /// `"<city> (<id>)"` labels
    pub fn names(&self) -> Vec<String> {
        self.catalog
            .ids()
            .iter()
            .filter_map(|id| {
                self.catalog
                    .attr_str(id, "city")
                    .map(|city| format!("{city} ({id})"))
            })
            .collect()
    }

    pub fn block_storage_ids(&self) -> Vec<&str> {
        ids_with(&self.catalog, BLOCK_STORAGE)
    }

    pub fn ddos_ids(&self) -> Vec<&str> {
        ids_with(&self.catalog, DDOS_PROTECTION)
    }
}
