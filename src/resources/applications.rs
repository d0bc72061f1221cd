//! One-click applications

use crate::api::client::{VultrClient, APPLICATIONS};
use crate::catalog::Catalog;
use crate::error::Result;

pub const LIST_KEY: &str = "applications";

pub async fn load_catalog(client: &VultrClient) -> Result<Catalog<u64>> {
    Catalog::load(client, APPLICATIONS, LIST_KEY).await
}

/// Applications available for deployment
#[derive(Debug, Clone)]
pub struct Applications {
    client: VultrClient,
    catalog: Catalog<u64>,
}

impl Applications {
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
        self.client.get(APPLICATIONS).await
    }

    fn field(&self, field: &str) -> Vec<&str> {
        self.catalog
            .records()
            .filter_map(|r| r.get(field).and_then(|v| v.as_str()))
            .collect()
    }

    /// Display names in server order
    pub fn names(&self) -> Vec<&str> {
        self.field("name")
    }

    pub fn short_names(&self) -> Vec<&str> {
        self.field("short_name")
    }

    /// `(id, deploy_name)` pairs in server order
    pub fn deploy_names(&self) -> Vec<(u64, &str)> {
        self.catalog
            .ids()
            .iter()
            .filter_map(|id| self.catalog.attr_str(id, "deploy_name").map(|name| (*id, name)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::fixtures;
    use serde_json::json;

    fn applications() -> Applications {
        let catalog = fixtures::catalog(vec![
            json!({"id": 1, "name": "LEMP", "short_name": "lemp", "deploy_name": "LEMP on CentOS 7"}),
            json!({"id": 2, "name": "Docker", "short_name": "docker", "deploy_name": "Docker on Ubuntu"}),
        ]);
        let client = VultrClient::new("token").unwrap();
        Applications::from_catalog(client, catalog)
    }

    #[test]
    fn test_derived_name_lists() {
        let apps = applications();
        assert_eq!(apps.names(), vec!["LEMP", "Docker"]);
        assert_eq!(apps.short_names(), vec!["lemp", "docker"]);
        assert_eq!(apps.deploy_names()[1], (2, "Docker on Ubuntu"));
    }
}
