//! Bare metal servers

use super::{
    checked, ensure_not_empty, random_hostname, require_all, Catalogs, OsChoice, OsSource,
    INVALID_PLAN, INVALID_REGION, UNKNOWN_RESERVED_IP, UNKNOWN_SCRIPT, UNKNOWN_SSH_KEY,
};
use crate::api::client::{segment, VultrClient, BARE_METALS};
use crate::catalog::Catalog;
use crate::error::{Result, VultrError};
use rand::Rng;
use serde::Serialize;

pub const LIST_KEY: &str = "bare_metals";

const UNKNOWN_BARE_METAL: &str = "Bare Metal Not Found";

pub async fn load_catalog(client: &VultrClient) -> Result<Catalog<String>> {
    Catalog::load(client, BARE_METALS, LIST_KEY).await
}

/// Options for `POST /bare-metals`
#[derive(Debug, Clone, Default)]
pub struct CreateBareMetal {
    pub region: String,
    /// Must be a bare-metal plan
    pub plan: String,
    pub os: OsChoice,
    pub label: Option<String>,
    pub tag: Option<String>,
    pub enable_ipv6: bool,
    /// Defaults to true
    pub activation_email: Option<bool>,
    pub sshkey_id: Option<String>,
    pub script_id: Option<String>,
    pub reserved_ipv4: Option<String>,
    pub user_data: Option<String>,
    pub hostname: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateBareMetalBody {
    pub region: String,
    pub plan: String,
    #[serde(flatten)]
    pub os: OsSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub enable_ipv6: bool,
    pub activation_email: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sshkey_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reserved_ipv4: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
    pub hostname: String,
}

impl CreateBareMetal {
    pub fn build<R: Rng + ?Sized>(&self, catalogs: &Catalogs, rng: &mut R) -> Result<CreateBareMetalBody> {
        catalogs.regions.require(self.region.as_str(), INVALID_REGION)?;
        catalogs.plans_metal.require(self.plan.as_str(), INVALID_PLAN)?;
        let os = self.os.resolve(catalogs)?;

        Ok(CreateBareMetalBody {
            region: self.region.clone(),
            plan: self.plan.clone(),
            os,
            label: self.label.clone(),
            tag: self.tag.clone(),
            enable_ipv6: self.enable_ipv6,
            activation_email: self.activation_email.unwrap_or(true),
            sshkey_id: checked(&catalogs.ssh_keys, self.sshkey_id.as_deref(), UNKNOWN_SSH_KEY)?,
            script_id: checked(
                &catalogs.startup_scripts,
                self.script_id.as_deref(),
                UNKNOWN_SCRIPT,
            )?,
            reserved_ipv4: checked(
                &catalogs.reserved_ips,
                self.reserved_ipv4.as_deref(),
                UNKNOWN_RESERVED_IP,
            )?,
            user_data: self.user_data.clone(),
            hostname: self
                .hostname
                .clone()
                .unwrap_or_else(|| random_hostname(rng)),
        })
    }
}

/// Options for `PATCH /bare-metals/{id}`
#[derive(Debug, Clone, Default)]
pub struct UpdateBareMetal {
    pub id: String,
    pub os_id: Option<u64>,
    pub app_id: Option<u64>,
    pub enable_ipv6: Option<bool>,
    pub user_data: Option<String>,
    pub tag: Option<String>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateBareMetalBody {
    #[serde(flatten)]
    pub os: Option<OsSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_ipv6: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl UpdateBareMetal {
    pub fn build(&self, bare_metals: &Catalog<String>, catalogs: &Catalogs) -> Result<UpdateBareMetalBody> {
        bare_metals.require(self.id.as_str(), UNKNOWN_BARE_METAL)?;

        let body = UpdateBareMetalBody {
            os: OsChoice {
                os_id: self.os_id,
                app_id: self.app_id,
                ..OsChoice::default()
            }
            .first_match(catalogs),
            enable_ipv6: self.enable_ipv6,
            user_data: self.user_data.clone(),
            tag: self.tag.clone(),
            label: self.label.clone(),
        };

        ensure_not_empty(body != UpdateBareMetalBody::default(), "bare metal")?;
        Ok(body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BareMetalIdsBody {
    pub baremetal_ids: Vec<String>,
}

pub fn build_bulk(bare_metals: &Catalog<String>, ids: &[String]) -> Result<BareMetalIdsBody> {
    if ids.is_empty() {
        return Err(VultrError::invalid("At least one bare metal id is required"));
    }
    require_all(bare_metals, ids, UNKNOWN_BARE_METAL)?;
    Ok(BareMetalIdsBody {
        baremetal_ids: ids.to_vec(),
    })
}

/// Bare metal wrapper
#[derive(Debug, Clone)]
pub struct BareMetals {
    client: VultrClient,
    catalog: Catalog<String>,
}

impl BareMetals {
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

    fn checked_path(&self, id: &str, suffix: &str) -> Result<String> {
        self.catalog.require(id, UNKNOWN_BARE_METAL)?;
        Ok(format!("{BARE_METALS}/{}{suffix}", segment(id)))
    }

    pub async fn list(&self) -> Result<String> {
        self.client.get(BARE_METALS).await
    }

    pub async fn get(&self, id: &str) -> Result<String> {
        self.client.get(&self.checked_path(id, "")?).await
    }

    pub async fn create(&self, opts: &CreateBareMetal, catalogs: &Catalogs) -> Result<String> {
        let body = opts.build(catalogs, &mut rand::thread_rng())?;
        self.client.post(BARE_METALS, &body).await
    }

    pub async fn update(&self, opts: &UpdateBareMetal, catalogs: &Catalogs) -> Result<String> {
        let body = opts.build(&self.catalog, catalogs)?;
        self.client.patch(&self.checked_path(&opts.id, "")?, &body).await
    }

    pub async fn delete(&self, id: &str) -> Result<String> {
        self.client.delete(&self.checked_path(id, "")?).await
    }

    pub async fn ipv4(&self, id: &str) -> Result<String> {
        self.client.get(&self.checked_path(id, "/ipv4")?).await
    }

    pub async fn ipv6(&self, id: &str) -> Result<String> {
        self.client.get(&self.checked_path(id, "/ipv6")?).await
    }

    pub async fn start(&self, id: &str) -> Result<String> {
        self.client.post_empty(&self.checked_path(id, "/start")?).await
    }

    pub async fn reboot(&self, id: &str) -> Result<String> {
        self.client.post_empty(&self.checked_path(id, "/reboot")?).await
    }

    pub async fn reinstall(&self, id: &str) -> Result<String> {
        self.client.post_empty(&self.checked_path(id, "/reinstall")?).await
    }

    pub async fn halt(&self, id: &str) -> Result<String> {
        self.client.post_empty(&self.checked_path(id, "/halt")?).await
    }

    pub async fn bandwidth(&self, id: &str) -> Result<String> {
        self.client.get(&self.checked_path(id, "/bandwidth")?).await
    }

    async fn bulk(&self, verb: &str, ids: &[String]) -> Result<String> {
        let body = build_bulk(&self.catalog, ids)?;
        self.client.post(&format!("{BARE_METALS}/{verb}"), &body).await
    }

    pub async fn halt_many(&self, ids: &[String]) -> Result<String> {
        self.bulk("halt", ids).await
    }

    pub async fn reboot_many(&self, ids: &[String]) -> Result<String> {
        self.bulk("reboot", ids).await
    }

    pub async fn start_many(&self, ids: &[String]) -> Result<String> {
        self.bulk("start", ids).await
    }

    pub async fn user_data(&self, id: &str) -> Result<String> {
        self.client.get(&self.checked_path(id, "/user-data")?).await
    }

    pub async fn upgrades(&self, id: &str) -> Result<String> {
        self.client.get(&self.checked_path(id, "/upgrades")?).await
    }

    pub async fn vnc(&self, id: &str) -> Result<String> {
        self.client.get(&self.checked_path(id, "/vnc")?).await
    }
}
