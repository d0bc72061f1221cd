//! Load balancers and their forwarding rules

use super::{ensure_not_empty, require_all, Catalogs, INVALID_REGION, UNKNOWN_INSTANCE};
use crate::api::client::{segment, VultrClient, LOAD_BALANCERS};
use crate::catalog::Catalog;
use crate::error::{Result, VultrError};
use crate::validate;
use serde::Serialize;

pub const LIST_KEY: &str = "load_balancers";

pub const PROTOCOLS: &[&str] = &["HTTP", "HTTPS", "TCP"];
pub const ALGORITHMS: &[&str] = &["roundrobin", "leastconn"];
pub const DEFAULT_ALGORITHM: &str = "roundrobin";

const UNKNOWN_LOAD_BALANCER: &str = "Load Balancer ID Not Found";

pub async fn load_catalog(client: &VultrClient) -> Result<Catalog<String>> {
    Catalog::load(client, LOAD_BALANCERS, LIST_KEY).await
}

/// One frontend to backend mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForwardingRule {
    pub frontend_protocol: String,
    pub backend_protocol: String,
    pub frontend_port: u32,
    pub backend_port: u32,
}

impl ForwardingRule {
    pub fn new(protocol: &str, frontend_port: u32, backend_port: u32) -> Self {
        Self {
            frontend_protocol: protocol.to_string(),
            backend_protocol: protocol.to_string(),
            frontend_port,
            backend_port,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate::require_one_of(
            &self.frontend_protocol,
            PROTOCOLS,
            "Front End Protocol Missing or Invalid",
        )?;
        validate::require_one_of(
            &self.backend_protocol,
            PROTOCOLS,
            "Back End Protocol Missing or Invalid",
        )?;
        validate::require_range(self.frontend_port.into(), 1..=65535, "Frontend port invalid")?;
        validate::require_range(self.backend_port.into(), 1..=65535, "Backend port invalid")?;
        Ok(())
    }
}

fn check_algorithm(algorithm: &str) -> Result<()> {
    validate::require_one_of(
        algorithm,
        ALGORITHMS,
        "Balancing algorithm must be roundrobin or leastconn",
    )
}

/// Options for `POST /load-balancers`
#[derive(Debug, Clone, Default)]
pub struct CreateLoadBalancer {
    pub region: String,
    pub label: Option<String>,
    /// Defaults to `roundrobin`
    pub balancing_algorithm: Option<String>,
    pub forwarding_rules: Vec<ForwardingRule>,
    /// Instance ids to attach
    pub instances: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateLoadBalancerBody {
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub balancing_algorithm: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub forwarding_rules: Vec<ForwardingRule>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub instances: Vec<String>,
}

impl CreateLoadBalancer {
    pub fn build(&self, catalogs: &Catalogs) -> Result<CreateLoadBalancerBody> {
        catalogs.regions.require(self.region.as_str(), INVALID_REGION)?;
        let algorithm = self
            .balancing_algorithm
            .as_deref()
            .unwrap_or(DEFAULT_ALGORITHM);
        check_algorithm(algorithm)?;
        self.forwarding_rules.iter().try_for_each(ForwardingRule::validate)?;
        require_all(&catalogs.instances, &self.instances, UNKNOWN_INSTANCE)?;

        Ok(CreateLoadBalancerBody {
            region: self.region.clone(),
            label: self.label.clone(),
            balancing_algorithm: algorithm.to_string(),
            forwarding_rules: self.forwarding_rules.clone(),
            instances: self.instances.clone(),
        })
    }
}

/// Options for `PATCH /load-balancers/{id}`
#[derive(Debug, Clone, Default)]
pub struct UpdateLoadBalancer {
    pub id: String,
    pub label: Option<String>,
    pub balancing_algorithm: Option<String>,
    pub forwarding_rules: Vec<ForwardingRule>,
    pub instances: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateLoadBalancerBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balancing_algorithm: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub forwarding_rules: Vec<ForwardingRule>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub instances: Vec<String>,
}

impl UpdateLoadBalancer {
    pub fn build(&self, load_balancers: &Catalog<String>, catalogs: &Catalogs) -> Result<UpdateLoadBalancerBody> {
        load_balancers.require(self.id.as_str(), UNKNOWN_LOAD_BALANCER)?;
        if let Some(algorithm) = self.balancing_algorithm.as_deref() {
            check_algorithm(algorithm)?;
        }
        self.forwarding_rules.iter().try_for_each(ForwardingRule::validate)?;
        require_all(&catalogs.instances, &self.instances, UNKNOWN_INSTANCE)?;

        let body = UpdateLoadBalancerBody {
            label: self.label.clone(),
            balancing_algorithm: self.balancing_algorithm.clone(),
            forwarding_rules: self.forwarding_rules.clone(),
            instances: self.instances.clone(),
        };
        ensure_not_empty(body != UpdateLoadBalancerBody::default(), "load balancer")?;
        Ok(body)
    }
}

/// Load balancers wrapper
#[derive(Debug, Clone)]
pub struct LoadBalancers {
    client: VultrClient,
    catalog: Catalog<String>,
}

impl LoadBalancers {
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
        format!("{LOAD_BALANCERS}/{}{suffix}", segment(id))
    }

    fn rule_path(&self, id: &str, rule_id: &str) -> Result<String> {
        self.catalog.require(id, UNKNOWN_LOAD_BALANCER)?;
        if rule_id.is_empty() {
            return Err(VultrError::invalid("Forwarding rule ID not set"));
        }
        Ok(Self::path(id, &format!("/forwarding-rules/{}", segment(rule_id))))
    }

    pub async fn list(&self) -> Result<String> {
        self.client.get(LOAD_BALANCERS).await
    }

    pub async fn get(&self, id: &str) -> Result<String> {
        self.client.get(&Self::path(id, "")).await
    }

    pub async fn delete(&self, id: &str) -> Result<String> {
        self.client.delete(&Self::path(id, "")).await
    }

    pub async fn create(&self, opts: &CreateLoadBalancer, catalogs: &Catalogs) -> Result<String> {
        let body = opts.build(catalogs)?;
        self.client.post(LOAD_BALANCERS, &body).await
    }

    pub async fn update(&self, opts: &UpdateLoadBalancer, catalogs: &Catalogs) -> Result<String> {
        let body = opts.build(&self.catalog, catalogs)?;
        self.client.patch(&Self::path(&opts.id, ""), &body).await
    }

    pub async fn forwarding_rules(&self, id: &str) -> Result<String> {
        self.client.get(&Self::path(id, "/forwarding-rules")).await
    }

    pub async fn create_forwarding_rule(&self, id: &str, rule: &ForwardingRule) -> Result<String> {
        self.catalog.require(id, UNKNOWN_LOAD_BALANCER)?;
        rule.validate()?;
        self.client
            .post(&Self::path(id, "/forwarding-rules"), rule)
            .await
    }

    pub async fn get_forwarding_rule(&self, id: &str, rule_id: &str) -> Result<String> {
        self.client.get(&self.rule_path(id, rule_id)?).await
    }

    pub async fn delete_forwarding_rule(&self, id: &str, rule_id: &str) -> Result<String> {
        self.client.delete(&self.rule_path(id, rule_id)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::fixtures;
    use serde_json::json;

    #[test]
    fn test_forwarding_rule_validation() {
        assert!(ForwardingRule::new("HTTP", 80, 8080).validate().is_ok());
        assert!(ForwardingRule::new("UDP", 53, 53).validate().is_err());
        assert!(ForwardingRule::new("TCP", 0, 22).validate().is_err());

        let rule = ForwardingRule {
            backend_port: 70000,
            ..ForwardingRule::new("HTTPS", 443, 443)
        };
        assert_eq!(
            rule.validate().unwrap_err().to_string(),
            "invalid parameter: Backend port invalid"
        );
    }

    #[test]
    fn test_create_body() {
        let catalogs = fixtures::catalogs();
        let opts = CreateLoadBalancer {
            region: "ewr".to_string(),
            forwarding_rules: vec![ForwardingRule::new("HTTP", 80, 80)],
            instances: vec!["inst-1".to_string()],
            ..CreateLoadBalancer::default()
        };
        assert_eq!(
            serde_json::to_value(opts.build(&catalogs).unwrap()).unwrap(),
            json!({
                "region": "ewr",
                "balancing_algorithm": "roundrobin",
                "forwarding_rules": [{
                    "frontend_protocol": "HTTP",
                    "backend_protocol": "HTTP",
                    "frontend_port": 80,
                    "backend_port": 80
                }],
                "instances": ["inst-1"]
            })
        );
    }

    #[test]
    fn test_create_validation() {
        let catalogs = fixtures::catalogs();
        let opts = CreateLoadBalancer {
            region: "ewr".to_string(),
            balancing_algorithm: Some("random".to_string()),
            ..CreateLoadBalancer::default()
        };
        assert!(opts.build(&catalogs).is_err());

        let opts = CreateLoadBalancer {
            region: "ewr".to_string(),
            instances: vec!["ghost".to_string()],
            ..CreateLoadBalancer::default()
        };
        assert_eq!(
            opts.build(&catalogs).unwrap_err().to_string(),
            "invalid parameter: Instance Not Found"
        );
    }

    #[test]
    fn test_update() {
        let catalogs = fixtures::catalogs();
        let opts = UpdateLoadBalancer {
            id: "lb-1".to_string(),
            balancing_algorithm: Some("leastconn".to_string()),
            ..UpdateLoadBalancer::default()
        };
        assert_eq!(
            serde_json::to_string(&opts.build(&catalogs.load_balancers, &catalogs).unwrap()).unwrap(),
            r#"{"balancing_algorithm":"leastconn"}"#
        );

        let empty = UpdateLoadBalancer {
            id: "lb-1".to_string(),
            ..UpdateLoadBalancer::default()
        };
        assert!(empty.build(&catalogs.load_balancers, &catalogs).is_err());
    }
}
