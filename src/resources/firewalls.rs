//! Firewall groups and rules

use crate::api::client::{segment, VultrClient, FIREWALLS};
use crate::catalog::Catalog;
use crate::error::{Result, VultrError};
use crate::validate;
use serde::Serialize;

pub const LIST_KEY: &str = "firewall_groups";

pub const IP_TYPES: &[&str] = &["v4", "v6"];
pub const PROTOCOLS: &[&str] = &["ICMP", "TCP", "UDP", "GRE", "ESP", "AH"];

const UNKNOWN_GROUP: &str = "That Firewall Group ID doesn't exist";
const FOREIGN_GROUP: &str = "That Firewall Group ID isn't associated with your account";

pub async fn load_catalog(client: &VultrClient) -> Result<Catalog<String>> {
    Catalog::load(client, FIREWALLS, LIST_KEY).await
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupBody {
    pub description: String,
}

pub fn build_create_group(description: &str) -> Result<GroupBody> {
    validate::require_min_len(
        description,
        4,
        "Name needs to be a minimum of 4 characters",
    )?;
    Ok(GroupBody {
        description: description.to_string(),
    })
}

/// Options for `POST /firewalls/{id}/rules`
#[derive(Debug, Clone, Default)]
pub struct CreateRule {
    pub group_id: String,
    /// `v4` or `v6`
    pub ip_type: String,
    /// Case-insensitive protocol name
    pub protocol: String,
    pub subnet: String,
    pub subnet_size: Option<i64>,
    /// Port expression (`"80"`, `"8000-"`, `"80:443"`)
    pub port: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateRuleBody {
    pub notes: String,
    pub ip_type: String,
    pub protocol: String,
    pub subnet: String,
    pub port: String,
    pub subnet_size: i64,
}

impl CreateRule {
    pub fn build(&self, groups: &Catalog<String>) -> Result<CreateRuleBody> {
        groups.require(
            self.group_id.as_str(),
            "Firewall Group ID doesn't exist or is not defined",
        )?;
        validate::require_one_of(&self.ip_type, IP_TYPES, "Invalid IP Type. Must be 'v4' or 'v6'")?;

        let protocol = self.protocol.to_uppercase();
        if !PROTOCOLS.contains(&protocol.as_str()) {
            return Err(VultrError::invalid(format!(
                "Invalid protocol. Must be one of these: {}",
                PROTOCOLS.join(", ")
            )));
        }

        if !validate::is_ip(&self.subnet) {
            return Err(VultrError::invalid("Invalid IP address for the subnet key"));
        }

        let port = self
            .port
            .as_deref()
            .ok_or_else(|| VultrError::invalid("Port not set"))?;
        let port = validate::parse_port_expression(port)?;

        let subnet_size = self
            .subnet_size
            .ok_or_else(|| VultrError::invalid("Subnet size is not set"))?;
        validate::require_range(subnet_size, 0..=32, "Subnet size must be between 0 and 32")?;

        Ok(CreateRuleBody {
            notes: self.notes.clone().unwrap_or_default(),
            ip_type: self.ip_type.clone(),
            protocol,
            subnet: self.subnet.clone(),
            port: port.to_string(),
            subnet_size,
        })
    }
}

/// Firewalls wrapper
#[derive(Debug, Clone)]
pub struct Firewalls {
    client: VultrClient,
    catalog: Catalog<String>,
}

impl Firewalls {
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

    fn group_path(&self, id: &str, suffix: &str, message: &str) -> Result<String> {
        self.catalog.require(id, message)?;
        Ok(format!("{FIREWALLS}/{}{suffix}", segment(id)))
    }

    pub async fn list(&self) -> Result<String> {
        self.client.get(FIREWALLS).await
    }

    pub async fn get(&self, id: &str) -> Result<String> {
        self.client.get(&self.group_path(id, "", UNKNOWN_GROUP)?).await
    }

    pub async fn rules(&self, id: &str) -> Result<String> {
        self.client
            .get(&self.group_path(id, "/rules", UNKNOWN_GROUP)?)
            .await
    }

    pub async fn create_group(&self, description: &str) -> Result<String> {
        let body = build_create_group(description)?;
        self.client.post(FIREWALLS, &body).await
    }

    /// Replace a group's description (empty when `None`)
    pub async fn update_group(&self, id: &str, description: Option<&str>) -> Result<String> {
        let path = self.group_path(id, "", FOREIGN_GROUP)?;
        let body = GroupBody {
            description: description.unwrap_or_default().to_string(),
        };
        self.client.put(&path, &body).await
    }

    pub async fn delete_group(&self, id: &str) -> Result<String> {
        self.client
            .delete(&self.group_path(id, "", FOREIGN_GROUP)?)
            .await
    }

    pub async fn create_rule(&self, opts: &CreateRule) -> Result<String> {
        let body = opts.build(&self.catalog)?;
        let path = format!("{FIREWALLS}/{}/rules", segment(&opts.group_id));
        self.client.post(&path, &body).await
    }

    pub async fn delete_rule(&self, id: &str, rule_id: u64) -> Result<String> {
        let path = self.group_path(id, &format!("/rules/{rule_id}"), UNKNOWN_GROUP)?;
        self.client.delete(&path).await
    }

    /// Cached `rule_count` of a group
    pub fn rule_count(&self, id: &str) -> Result<u64> {
        self.cached_count(id, "rule_count")
    }

    /// Cached `instance_count` of a group
    pub fn instance_count(&self, id: &str) -> Result<u64> {
        self.cached_count(id, "instance_count")
    }

    /// Number of groups reported by the server
    pub fn group_count(&self) -> u64 {
        self.catalog
            .reported_total()
            .unwrap_or(self.catalog.len() as u64)
    }

    fn cached_count(&self, id: &str, field: &str) -> Result<u64> {
        self.catalog.require(id, UNKNOWN_GROUP)?;
        self.catalog
            .attr_u64(id, field)
            .ok_or_else(|| VultrError::MalformedResponse(format!("firewall group without `{field}`")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::fixtures;

    fn rule() -> CreateRule {
        CreateRule {
            group_id: "fw-1".to_string(),
            ip_type: "v4".to_string(),
            protocol: "tcp".to_string(),
            subnet: "0.0.0.0".to_string(),
            subnet_size: Some(0),
            port: Some("8000-".to_string()),
            notes: None,
        }
    }

    #[test]
    fn test_rule_body() {
        let catalogs = fixtures::catalogs();
        let body = rule().build(&catalogs.firewall_groups).unwrap();
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"notes":"","ip_type":"v4","protocol":"TCP","subnet":"0.0.0.0","port":"8000:65535","subnet_size":0}"#
        );
    }

    #[test]
    fn test_rule_validation() {
        let groups = fixtures::catalogs().firewall_groups;

        let bad_group = CreateRule {
            group_id: "fw-9".to_string(),
            ..rule()
        };
        assert!(bad_group.build(&groups).is_err());

        let bad_type = CreateRule {
            ip_type: "v5".to_string(),
            ..rule()
        };
        assert!(bad_type.build(&groups).unwrap_err().to_string().contains("IP Type"));

        let bad_proto = CreateRule {
            protocol: "sctp".to_string(),
            ..rule()
        };
        assert!(bad_proto.build(&groups).unwrap_err().to_string().contains("protocol"));

        let bad_subnet = CreateRule {
            subnet: "10.0.0".to_string(),
            ..rule()
        };
        assert!(bad_subnet.build(&groups).is_err());

        let no_port = CreateRule {
            port: None,
            ..rule()
        };
        assert_eq!(
            no_port.build(&groups).unwrap_err().to_string(),
            "invalid parameter: Port not set"
        );

        let bad_size = CreateRule {
            subnet_size: Some(33),
            ..rule()
        };
        assert!(bad_size.build(&groups).is_err());
    }

    #[test]
    fn test_group_description_length() {
        assert!(build_create_group("web").is_err());
        assert!(build_create_group("web servers").is_ok());
    }

    #[test]
    fn test_cached_counts() {
        let client = VultrClient::new("token").unwrap();
        let firewalls = Firewalls::from_catalog(client, fixtures::catalogs().firewall_groups);
        assert_eq!(firewalls.rule_count("fw-1").unwrap(), 3);
        assert_eq!(firewalls.instance_count("fw-1").unwrap(), 1);
        assert!(firewalls.rule_count("fw-2").is_err());
        assert_eq!(firewalls.group_count(), 1);
    }
}
