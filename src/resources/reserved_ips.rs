//! Reserved IP addresses

use super::{Catalogs, INVALID_REGION};
use crate::api::client::{segment, VultrClient, RESERVED_IPS};
use crate::catalog::Catalog;
use crate::error::{Result, VultrError};
use crate::validate;
use serde::Serialize;

pub const LIST_KEY: &str = "reserved_ips";

pub const IP_TYPES: &[&str] = &["v4", "v6"];

const UNKNOWN_RESERVED_IP: &str = "IP Not Found";

pub async fn load_catalog(client: &VultrClient) -> Result<Catalog<String>> {
    Catalog::load(client, RESERVED_IPS, LIST_KEY).await
}

/// Options for `POST /reserved-ips`
#[derive(Debug, Clone, Default)]
pub struct CreateReservedIp {
    pub region: String,
    /// `v4` or `v6`
    pub ip_type: String,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateReservedIpBody {
    pub region: String,
    pub ip_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl CreateReservedIp {
    pub fn build(&self, catalogs: &Catalogs) -> Result<CreateReservedIpBody> {
        catalogs.regions.require(self.region.as_str(), INVALID_REGION)?;
        validate::require_one_of(&self.ip_type, IP_TYPES, "Invalid IP Type")?;

        Ok(CreateReservedIpBody {
            region: self.region.clone(),
            ip_type: self.ip_type.clone(),
            label: self.label.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachBody {
    pub instance_id: String,
}

/// Options for `POST /reserved-ips/convert`
#[derive(Debug, Clone, Default)]
pub struct ConvertIp {
    pub ip_address: String,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertIpBody {
    pub ip_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ConvertIp {
    pub fn build(&self) -> Result<ConvertIpBody> {
        if !validate::is_ip(&self.ip_address) {
            return Err(VultrError::invalid("Invalid or Missing IP"));
        }
        Ok(ConvertIpBody {
            ip_address: self.ip_address.clone(),
            label: self.label.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ReservedIps {
    client: VultrClient,
    catalog: Catalog<String>,
}

impl ReservedIps {
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
        format!("{RESERVED_IPS}/{}{suffix}", segment(id))
    }

    pub async fn list(&self) -> Result<String> {
        self.client.get(RESERVED_IPS).await
    }

    pub async fn get(&self, id: &str) -> Result<String> {
        self.client.get(&Self::path(id, "")).await
    }

    pub async fn delete(&self, id: &str) -> Result<String> {
        self.client.delete(&Self::path(id, "")).await
    }

    pub async fn create(&self, opts: &CreateReservedIp, catalogs: &Catalogs) -> Result<String> {
        let body = opts.build(catalogs)?;
        self.client.post(RESERVED_IPS, &body).await
    }

    /// Attach reserved IP `id` to an instance
    pub async fn attach(&self, id: &str, instance_id: &str, catalogs: &Catalogs) -> Result<String> {
        catalogs
            .instances
            .require(instance_id, "Invalid or Missing Instance ID")?;
        self.catalog.require(id, UNKNOWN_RESERVED_IP)?;
        let body = AttachBody {
            instance_id: instance_id.to_string(),
        };
        self.client.post(&Self::path(id, "/attach"), &body).await
    }

    pub async fn detach(&self, id: &str) -> Result<String> {
        self.catalog.require(id, UNKNOWN_RESERVED_IP)?;
        self.client.post_empty(&Self::path(id, "/detach")).await
    }

    /// Turn an instance's existing address into a reserved IP
    pub async fn convert(&self, opts: &ConvertIp) -> Result<String> {
        let body = opts.build()?;
        self.client
            .post(&format!("{RESERVED_IPS}/convert"), &body)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::fixtures;

    #[test]
    fn test_create_ip_type_is_exact() {
        let catalogs = fixtures::catalogs();
        let opts = |ip_type: &str| CreateReservedIp {
            region: "ewr".to_string(),
            ip_type: ip_type.to_string(),
            label: None,
        };
        assert!(opts("v4").build(&catalogs).is_ok());
        assert!(opts("v6").build(&catalogs).is_ok());
        assert!(opts("xv4").build(&catalogs).is_err());
        assert!(opts("").build(&catalogs).is_err());
    }

    #[test]
    fn test_convert_validates_address() {
        let opts = ConvertIp {
            ip_address: "203.0.113.9".to_string(),
            label: Some("web".to_string()),
        };
        assert_eq!(
            serde_json::to_string(&opts.build().unwrap()).unwrap(),
            r#"{"ip_address":"203.0.113.9","label":"web"}"#
        );

        let opts = ConvertIp {
            ip_address: "rip-1".to_string(),
            label: None,
        };
        assert!(opts.build().is_err());
    }

    #[tokio::test]
    async fn test_attach_checks_before_request() {
        let catalogs = fixtures::catalogs();
        let client = VultrClient::with_base_url("token", "http://127.0.0.1:1").unwrap();
        let ips = ReservedIps::from_catalog(client, catalogs.reserved_ips.clone());

        let err = ips.attach("rip-1", "ghost", &catalogs).await.unwrap_err();
        assert_eq!(err.to_string(), "invalid parameter: Invalid or Missing Instance ID");

        let err = ips.attach("rip-9", "inst-1", &catalogs).await.unwrap_err();
        assert_eq!(err.to_string(), "invalid parameter: IP Not Found");
    }
}
