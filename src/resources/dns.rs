//! DNS zones and records
//!
//! Zones are addressed by name, so there is no catalog here; every zone name
//! goes through the loose domain check before it is placed in a path.

use super::ensure_not_empty;
use crate::api::client::{segment, VultrClient, DOMAINS};
use crate::error::{Result, VultrError};
use crate::validate;
use serde::Serialize;

pub const DEFAULT_TTL: u32 = 300;
pub const DEFAULT_DNSSEC: &str = "disabled";

pub const DNSSEC_STATES: &[&str] = &["enabled", "disabled"];
pub const RECORD_TYPES: &[&str] = &["A", "AAAA", "CNAME", "NS", "MX", "SRV", "TXT", "CAA", "SSHFP"];
/// Record types that carry a priority
pub const PRIORITY_TYPES: &[&str] = &["MX", "SRV"];

fn zone_path(domain: &str, suffix: &str) -> Result<String> {
    validate::validate_domain(domain)?;
    Ok(format!("{DOMAINS}/{}{suffix}", segment(domain)))
}

fn record_path(domain: &str, id: &str) -> Result<String> {
    if id.is_empty() {
        return Err(VultrError::invalid("ID not set"));
    }
    zone_path(domain, &format!("/records/{}", segment(id)))
}

/// Options for `POST /domains`
#[derive(Debug, Clone, Default)]
pub struct CreateDomain {
    pub domain: String,
    /// Default A record target
    pub ip: Option<String>,
    pub dns_sec: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateDomainBody {
    pub dns_sec: String,
    pub domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

impl CreateDomain {
    pub fn build(&self) -> Result<CreateDomainBody> {
        if self.domain.is_empty() {
            return Err(VultrError::invalid("Domain is not set"));
        }
        validate::validate_domain(&self.domain)?;

        if let Some(ip) = self.ip.as_deref() {
            if !validate::is_ip(ip) {
                return Err(VultrError::invalid("IP is set but is invalid"));
            }
        }

        let dns_sec = self.dns_sec.as_deref().unwrap_or(DEFAULT_DNSSEC);
        validate::require_one_of(
            dns_sec,
            DNSSEC_STATES,
            "DNS SEC is set but is not a valid option (enabled/disabled)",
        )?;

        Ok(CreateDomainBody {
            dns_sec: dns_sec.to_string(),
            domain: self.domain.clone(),
            ip: self.ip.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateDomainBody {
    pub dns_sec: String,
}

pub fn build_update_domain(dns_sec: &str) -> Result<UpdateDomainBody> {
    if dns_sec.is_empty() {
        return Err(VultrError::invalid("dns_sec not set"));
    }
    validate::require_one_of(
        dns_sec,
        DNSSEC_STATES,
        "dns_sec must be enabled/disabled. It's not one of those",
    )?;
    Ok(UpdateDomainBody {
        dns_sec: dns_sec.to_string(),
    })
}

/// Options for `PATCH /domains/{domain}/soa`
#[derive(Debug, Clone, Default)]
pub struct UpdateSoa {
    pub email: Option<String>,
    pub nsprimary: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateSoaBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nsprimary: Option<String>,
}

impl UpdateSoa {
    pub fn build(&self) -> Result<UpdateSoaBody> {
        if let Some(email) = self.email.as_deref() {
            if !validate::is_valid_email(email) {
                return Err(VultrError::invalid("Email is invalid"));
            }
        }
        if let Some(ns) = self.nsprimary.as_deref() {
            if !validate::is_valid_hostname(ns) {
                return Err(VultrError::invalid("NS Primary Is Invalid"));
            }
        }

        let body = UpdateSoaBody {
            email: self.email.clone(),
            nsprimary: self.nsprimary.clone(),
        };
        ensure_not_empty(body != UpdateSoaBody::default(), "SOA")?;
        Ok(body)
    }
}

/// Options for `POST /domains/{domain}/records`
#[derive(Debug, Clone, Default)]
pub struct CreateRecord {
    pub record_type: String,
    /// Record name; `""` addresses the zone apex
    pub name: Option<String>,
    pub data: Option<String>,
    pub ttl: Option<u32>,
    /// Required for MX and SRV
    pub priority: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateRecordBody {
    pub ttl: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub data: String,
}

impl CreateRecord {
    pub fn build(&self) -> Result<CreateRecordBody> {
        if self.record_type.is_empty() {
            return Err(VultrError::invalid("Type is required"));
        }
        validate::require_one_of(&self.record_type, RECORD_TYPES, "Invalid Type")?;

        let priority = if PRIORITY_TYPES.contains(&self.record_type.as_str()) {
            Some(self.priority.ok_or_else(|| {
                VultrError::invalid(format!("Priority must be set for {} records", self.record_type))
            })?)
        } else {
            None
        };

        let data = self
            .data
            .as_deref()
            .ok_or_else(|| VultrError::invalid("Data is required"))?;
        let name = self
            .name
            .as_deref()
            .ok_or_else(|| VultrError::invalid("Name is required"))?;

        if self.record_type == "A" && !validate::is_ip(data) {
            return Err(VultrError::invalid("Type is A but data is not a valid IP"));
        }

        Ok(CreateRecordBody {
            ttl: self.ttl.unwrap_or(DEFAULT_TTL),
            priority,
            name: name.to_string(),
            record_type: self.record_type.clone(),
            data: data.to_string(),
        })
    }
}

/// Options for `PATCH /domains/{domain}/records/{id}`
#[derive(Debug, Clone, Default)]
pub struct UpdateRecord {
    pub data: Option<String>,
    pub name: Option<String>,
    pub ttl: Option<u32>,
    pub priority: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateRecordBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
}

impl UpdateRecord {
    pub fn build(&self) -> Result<UpdateRecordBody> {
        let body = UpdateRecordBody {
            data: self.data.clone(),
            name: self.name.clone(),
            ttl: self.ttl,
            priority: self.priority,
        };
        ensure_not_empty(body != UpdateRecordBody::default(), "DNS record")?;
        Ok(body)
    }
}

/// DNS wrapper
#[derive(Debug, Clone)]
pub struct Dns {
    client: VultrClient,
}

impl Dns {
    pub fn new(client: VultrClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<String> {
        self.client.get(DOMAINS).await
    }

    pub async fn get(&self, domain: &str) -> Result<String> {
        self.client.get(&zone_path(domain, "")?).await
    }

    pub async fn soa(&self, domain: &str) -> Result<String> {
        self.client.get(&zone_path(domain, "/soa")?).await
    }

    pub async fn dnssec(&self, domain: &str) -> Result<String> {
        self.client.get(&zone_path(domain, "/dnssec")?).await
    }

    pub async fn delete(&self, domain: &str) -> Result<String> {
        self.client.delete(&zone_path(domain, "")?).await
    }

    pub async fn records(&self, domain: &str) -> Result<String> {
        self.client.get(&zone_path(domain, "/records")?).await
    }

    pub async fn get_record(&self, domain: &str, id: &str) -> Result<String> {
        self.client.get(&record_path(domain, id)?).await
    }

    pub async fn delete_record(&self, domain: &str, id: &str) -> Result<String> {
        self.client.delete(&record_path(domain, id)?).await
    }

    pub async fn create_domain(&self, opts: &CreateDomain) -> Result<String> {
        let body = opts.build()?;
        self.client.post(DOMAINS, &body).await
    }

    pub async fn update_domain(&self, domain: &str, dns_sec: &str) -> Result<String> {
        let path = zone_path(domain, "")?;
        let body = build_update_domain(dns_sec)?;
        self.client.put(&path, &body).await
    }

    pub async fn update_soa(&self, domain: &str, opts: &UpdateSoa) -> Result<String> {
        let path = zone_path(domain, "/soa")?;
        let body = opts.build()?;
        self.client.patch(&path, &body).await
    }

    pub async fn create_record(&self, domain: &str, opts: &CreateRecord) -> Result<String> {
        let path = zone_path(domain, "/records")?;
        let body = opts.build()?;
        self.client.post(&path, &body).await
    }

    pub async fn update_record(&self, domain: &str, id: &str, opts: &UpdateRecord) -> Result<String> {
        let path = record_path(domain, id)?;
        let body = opts.build()?;
        self.client.patch(&path, &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_domain_defaults() {
        let opts = CreateDomain {
            domain: "example.com".to_string(),
            ..CreateDomain::default()
        };
        assert_eq!(
            serde_json::to_string(&opts.build().unwrap()).unwrap(),
            r#"{"dns_sec":"disabled","domain":"example.com"}"#
        );
    }

    #[test]
    fn test_create_domain_validation() {
        let opts = CreateDomain::default();
        assert_eq!(
            opts.build().unwrap_err().to_string(),
            "invalid parameter: Domain is not set"
        );

        let opts = CreateDomain {
            domain: "example.com".to_string(),
            ip: Some("999.1.1.1".to_string()),
            ..CreateDomain::default()
        };
        assert!(opts.build().is_err());

        let opts = CreateDomain {
            domain: "example.com".to_string(),
            dns_sec: Some("on".to_string()),
            ..CreateDomain::default()
        };
        assert!(opts.build().is_err());
    }

    #[test]
    fn test_update_domain_enum() {
        assert!(build_update_domain("enabled").is_ok());
        assert!(build_update_domain("").is_err());
        assert!(build_update_domain("yes").is_err());
    }

    #[test]
    fn test_soa_requires_a_field() {
        assert!(UpdateSoa::default().build().is_err());

        let opts = UpdateSoa {
            email: Some("not-an-email".to_string()),
            ..UpdateSoa::default()
        };
        assert!(opts.build().is_err());

        let opts = UpdateSoa {
            nsprimary: Some("ns1.example.com".to_string()),
            ..UpdateSoa::default()
        };
        assert_eq!(
            serde_json::to_string(&opts.build().unwrap()).unwrap(),
            r#"{"nsprimary":"ns1.example.com"}"#
        );
    }

    #[test]
    fn test_create_record_body() {
        let opts = CreateRecord {
            record_type: "MX".to_string(),
            name: Some(String::new()),
            data: Some("mail.example.com".to_string()),
            priority: Some(10),
            ..CreateRecord::default()
        };
        assert_eq!(
            serde_json::to_string(&opts.build().unwrap()).unwrap(),
            r#"{"ttl":300,"priority":10,"name":"","type":"MX","data":"mail.example.com"}"#
        );
    }

    #[test]
    fn test_create_record_rules() {
        let record = |record_type: &str, data: &str| CreateRecord {
            record_type: record_type.to_string(),
            name: Some("www".to_string()),
            data: Some(data.to_string()),
            ..CreateRecord::default()
        };

        assert!(record("A", "203.0.113.10").build().is_ok());
        assert!(record("A", "example.com").build().is_err());
        assert!(record("SRV", "0 5060 sip.example.com").build().is_err());
        assert!(record("PTR", "x").build().is_err());
        assert!(record("", "x").build().is_err());

        let missing_name = CreateRecord {
            name: None,
            ..record("TXT", "hello")
        };
        assert_eq!(
            missing_name.build().unwrap_err().to_string(),
            "invalid parameter: Name is required"
        );
    }

    #[test]
    fn test_update_record_requires_a_field() {
        assert!(UpdateRecord::default().build().is_err());
        let opts = UpdateRecord {
            ttl: Some(600),
            ..UpdateRecord::default()
        };
        assert_eq!(serde_json::to_string(&opts.build().unwrap()).unwrap(), r#"{"ttl":600}"#);
    }

    #[test]
    fn test_paths_validate_zone() {
        assert_eq!(zone_path("example.com", "/soa").unwrap(), "/domains/example.com/soa");
        assert!(zone_path("localhost", "").is_err());
        assert!(record_path("example.com", "").is_err());
        assert_eq!(
            record_path("example.com", "rec-1").unwrap(),
            "/domains/example.com/records/rec-1"
        );
    }
}
