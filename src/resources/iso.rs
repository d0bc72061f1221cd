//! ISO images

use crate::api::client::{segment, VultrClient, ISO, ISO_PUBLIC};
use crate::catalog::Catalog;
use crate::error::{Result, VultrError};
use serde::Serialize;
use url::Url;

pub const LIST_KEY: &str = "isos";

pub async fn load_catalog(client: &VultrClient) -> Result<Catalog<String>> {
    Catalog::load(client, ISO, LIST_KEY).await
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateIsoBody {
    pub url: String,
}

/// Build the body for `POST /iso`
pub fn build_create(url: &str) -> Result<CreateIsoBody> {
    let parsed = Url::parse(url).map_err(|_| VultrError::invalid("ISO URL is not valid"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(VultrError::invalid("ISO URL must be http or https"));
    }
    Ok(CreateIsoBody {
        url: url.to_string(),
    })
}

#[derive(Debug, Clone)]
pub struct Isos {
    client: VultrClient,
    catalog: Catalog<String>,
}

impl Isos {
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
        self.client.get(ISO).await
    }

    pub async fn list_public(&self) -> Result<String> {
        self.client.get(ISO_PUBLIC).await
    }

    pub async fn get(&self, id: &str) -> Result<String> {
        self.client.get(&format!("{ISO}/{}", segment(id))).await
    }

    /// Fetch an ISO from a remote URL into the account
    pub async fn create(&self, url: &str) -> Result<String> {
        let body = build_create(url)?;
        self.client.post(ISO, &body).await
    }

    pub async fn delete(&self, id: &str) -> Result<String> {
        self.client.delete(&format!("{ISO}/{}", segment(id))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_body() {
        let body = build_create("https://example.com/boot.iso").unwrap();
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"url":"https://example.com/boot.iso"}"#
        );
    }

    #[test]
    fn test_create_rejects_bad_url() {
        assert!(build_create("boot.iso").is_err());
        assert!(build_create("ftp://example.com/boot.iso").is_err());
    }
}
