//! Resource families
//!
//! One module per Vultr resource family. Each family exposes a wrapper that
//! owns a [`VultrClient`] handle plus the family's [`Catalog`], option structs
//! for its operations and pure `build` methods producing the request bodies.
//!
//! Cross-family checks (region exists, plan exists, ssh key belongs to the
//! account, ...) read from a [`Catalogs`] snapshot passed in by the caller.

pub mod account;
pub mod applications;
pub mod backups;
pub mod bare_metal;
pub mod block_storage;
pub mod dns;
pub mod firewalls;
pub mod instances;
pub mod iso;
pub mod load_balancers;
pub mod object_storage;
pub mod os;
pub mod plans;
pub mod private_networks;
pub mod registry;
pub mod regions;
pub mod reserved_ips;
pub mod snapshots;
pub mod ssh_keys;
pub mod startup_scripts;
pub mod users;

use crate::api::client::VultrClient;
use crate::catalog::Catalog;
use crate::error::{Result, VultrError};
use rand::Rng;
use serde::Serialize;

/// Length of generated hostnames
pub const HOSTNAME_LENGTH: usize = 10;

const HOSTNAME_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

pub const MISSING_OS_SOURCE: &str =
    "At least one OS parameter (os_id, iso_id, snapshot_id or app_id) is missing";

/// Random lowercase alphanumeric hostname used when the caller supplies none
pub fn random_hostname<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..HOSTNAME_LENGTH)
        .map(|_| char::from(HOSTNAME_CHARSET[rng.gen_range(0..HOSTNAME_CHARSET.len())]))
        .collect()
}

/// Snapshot of every family catalog, used for cross-resource validation
#[derive(Debug, Clone, Default)]
pub struct Catalogs {
    pub regions: Catalog<String>,
    pub plans: Catalog<String>,
    pub plans_metal: Catalog<String>,
    pub os: Catalog<u64>,
    pub applications: Catalog<u64>,
    pub instances: Catalog<String>,
    pub bare_metals: Catalog<String>,
    pub blocks: Catalog<String>,
    pub backups: Catalog<String>,
    pub firewall_groups: Catalog<String>,
    pub ssh_keys: Catalog<String>,
    pub startup_scripts: Catalog<String>,
    pub reserved_ips: Catalog<String>,
    pub private_networks: Catalog<String>,
    pub snapshots: Catalog<String>,
    pub isos: Catalog<String>,
    pub load_balancers: Catalog<String>,
    pub object_storage_clusters: Catalog<u64>,
    pub object_storages: Catalog<String>,
    pub users: Catalog<String>,
}

impl Catalogs {
    /// Load every family, one list request (or page) at a time
    pub async fn load(client: &VultrClient) -> Result<Self> {
        let catalogs = Self {
            regions: regions::load_catalog(client).await?,
            plans: plans::load_catalog(client).await?,
            plans_metal: plans::load_metal_catalog(client).await?,
            os: os::load_catalog(client).await?,
            applications: applications::load_catalog(client).await?,
            instances: instances::load_catalog(client).await?,
            bare_metals: bare_metal::load_catalog(client).await?,
            blocks: block_storage::load_catalog(client).await?,
            backups: backups::load_catalog(client).await?,
            firewall_groups: firewalls::load_catalog(client).await?,
            ssh_keys: ssh_keys::load_catalog(client).await?,
            startup_scripts: startup_scripts::load_catalog(client).await?,
            reserved_ips: reserved_ips::load_catalog(client).await?,
            private_networks: private_networks::load_catalog(client).await?,
            snapshots: snapshots::load_catalog(client).await?,
            isos: iso::load_catalog(client).await?,
            load_balancers: load_balancers::load_catalog(client).await?,
            object_storage_clusters: object_storage::load_cluster_catalog(client).await?,
            object_storages: object_storage::load_catalog(client).await?,
            users: users::load_catalog(client).await?,
        };

        tracing::info!(
            "Loaded catalogs: {} regions, {} plans, {} instances",
            catalogs.regions.len(),
            catalogs.plans.len(),
            catalogs.instances.len()
        );

        Ok(catalogs)
    }
}

/// Boot source of a new server, flattened into the request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OsSource {
    OsId(u64),
    IsoId(String),
    SnapshotId(String),
    AppId(u64),
}

/// Candidate boot sources as supplied by the caller
///
/// More than one may be set; the first one (in field order) that exists in its
/// catalog wins and the rest are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OsChoice {
    pub os_id: Option<u64>,
    pub iso_id: Option<String>,
    pub snapshot_id: Option<String>,
    pub app_id: Option<u64>,
}

impl OsChoice {
    pub fn os(id: u64) -> Self {
        Self {
            os_id: Some(id),
            ..Self::default()
        }
    }

    pub fn app(id: u64) -> Self {
        Self {
            app_id: Some(id),
            ..Self::default()
        }
    }

    /// First candidate present in its catalog, if any
    pub fn first_match(&self, catalogs: &Catalogs) -> Option<OsSource> {
        if let Some(id) = self.os_id.filter(|id| catalogs.os.contains(id)) {
            return Some(OsSource::OsId(id));
        }
        if let Some(id) = self.iso_id.as_deref().filter(|id| catalogs.isos.contains(*id)) {
            return Some(OsSource::IsoId(id.to_string()));
        }
        if let Some(id) = self
            .snapshot_id
            .as_deref()
            .filter(|id| catalogs.snapshots.contains(*id))
        {
            return Some(OsSource::SnapshotId(id.to_string()));
        }
        self.app_id
            .filter(|id| catalogs.applications.contains(id))
            .map(OsSource::AppId)
    }

    /// Like [`first_match`](Self::first_match), but zero winners is an error
    pub fn resolve(&self, catalogs: &Catalogs) -> Result<OsSource> {
        self.first_match(catalogs)
            .ok_or_else(|| VultrError::invalid(MISSING_OS_SOURCE))
    }
}

pub(crate) const INVALID_REGION: &str = "Invalid Region";
pub(crate) const INVALID_PLAN: &str = "Invalid Plan";
pub(crate) const UNKNOWN_SSH_KEY: &str =
    "You provided an SSH Key ID and it's not part of your account";
pub(crate) const UNKNOWN_SCRIPT: &str =
    "You provided a Startup Script and it's not part of your account";
pub(crate) const UNKNOWN_FIREWALL: &str =
    "You provided a Firewall ID that is not part of your account";
pub(crate) const UNKNOWN_RESERVED_IP: &str =
    "You provided a Reserved IP and it's not part of your account";
pub(crate) const UNKNOWN_INSTANCE: &str = "Instance Not Found";
pub(crate) const UNKNOWN_PRIVATE_NETWORK: &str = "Private Network Not Found";

/// Optional reference to another family: absent passes, present must exist
pub(crate) fn checked(
    catalog: &Catalog<String>,
    id: Option<&str>,
    message: &str,
) -> Result<Option<String>> {
    match id {
        Some(id) => {
            catalog.require(id, message)?;
            Ok(Some(id.to_string()))
        }
        None => Ok(None),
    }
}

/// Every id must exist in `catalog`
pub(crate) fn require_all(catalog: &Catalog<String>, ids: &[String], message: &str) -> Result<()> {
    ids.iter()
        .try_for_each(|id| catalog.require(id.as_str(), message))
}

/// Empty-update guard shared by PATCH/PUT builders
pub(crate) fn ensure_not_empty(touched: bool, what: &str) -> Result<()> {
    if touched {
        Ok(())
    } else {
        Err(VultrError::invalid(format!("Nothing to update for {what}")))
    }
}
