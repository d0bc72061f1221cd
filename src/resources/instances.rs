//! Cloud compute instances
//!
//! Creation and update run the longest validation chains in the crate: region
//! and plan membership, boot source precedence, DDoS capability of the region,
//! private network references and optional account-owned references (SSH key,
//! startup script, firewall group, reserved IP).

use super::{
    checked, ensure_not_empty, random_hostname, regions, require_all, Catalogs, OsChoice,
    OsSource, INVALID_PLAN, INVALID_REGION, UNKNOWN_FIREWALL, UNKNOWN_INSTANCE,
    UNKNOWN_PRIVATE_NETWORK, UNKNOWN_RESERVED_IP, UNKNOWN_SCRIPT, UNKNOWN_SSH_KEY,
};
use crate::api::client::{segment, VultrClient, INSTANCES};
use crate::catalog::Catalog;
use crate::error::{Result, VultrError};
use crate::validate;
use rand::Rng;
use serde::Serialize;

pub const LIST_KEY: &str = "instances";

const NO_DDOS: &str = "You chose to set DDOS, but the region is not capable of it";
const NO_PRIVATE_NETWORKS: &str =
    "You chose to enable private networks but you didn't provide one";
const BAD_IP: &str = "IP Address missing or invalid";
const BAD_REVERSE: &str = "Reverse missing or it's not a valid domain";
const MISSING_RESTORE_SOURCE: &str = "A Valid OS (snapshot_id or backup_id) is missing";
const HOUR_INVALID: &str = "Hour is invalid";

/// Backup schedule types
pub const BACKUP_TYPES: &[&str] = &["daily", "weekly", "monthly", "daily_alt_even", "daily_alt_odd"];

pub async fn load_catalog(client: &VultrClient) -> Result<Catalog<String>> {
    Catalog::load(client, INSTANCES, LIST_KEY).await
}

/// `"enabled"` / `"disabled"` on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Toggle {
    Enabled,
    Disabled,
}

impl From<bool> for Toggle {
    fn from(on: bool) -> Self {
        if on {
            Self::Enabled
        } else {
            Self::Disabled
        }
    }
}

/// Options for `POST /instances`
#[derive(Debug, Clone, Default)]
pub struct CreateInstance {
    pub region: String,
    pub plan: String,
    pub os: OsChoice,
    pub ipxe_chain_url: Option<String>,
    pub label: Option<String>,
    pub tag: Option<String>,
    pub enable_ipv6: bool,
    pub backups: bool,
    pub ddos_protection: bool,
    /// Defaults to true
    pub activation_email: Option<bool>,
    pub enable_private_network: bool,
    pub attach_private_network: Vec<String>,
    pub sshkey_id: Option<String>,
    pub script_id: Option<String>,
    pub firewall_group_id: Option<String>,
    pub reserved_ipv4: Option<String>,
    pub user_data: Option<String>,
    pub hostname: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateInstanceBody {
    pub region: String,
    pub plan: String,
    #[serde(flatten)]
    pub os: OsSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipxe_chain_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub enable_ipv6: bool,
    pub backups: Toggle,
    pub ddos_protection: bool,
    pub activation_email: bool,
    pub enable_private_network: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attach_private_network: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sshkey_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firewall_group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reserved_ipv4: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
    pub hostname: String,
}

fn check_ddos(catalogs: &Catalogs, region: &str) -> Result<()> {
    if regions::supports(&catalogs.regions, region, regions::DDOS_PROTECTION) {
        Ok(())
    } else {
        Err(VultrError::invalid(NO_DDOS))
    }
}

fn check_private_networks(catalogs: &Catalogs, ids: &[String]) -> Result<()> {
    if ids.is_empty() {
        return Err(VultrError::invalid(NO_PRIVATE_NETWORKS));
    }
    require_all(&catalogs.private_networks, ids, UNKNOWN_PRIVATE_NETWORK)
}

impl CreateInstance {
    pub fn build<R: Rng + ?Sized>(&self, catalogs: &Catalogs, rng: &mut R) -> Result<CreateInstanceBody> {
        catalogs.regions.require(self.region.as_str(), INVALID_REGION)?;
        catalogs.plans.require(self.plan.as_str(), INVALID_PLAN)?;
        let os = self.os.resolve(catalogs)?;

        if self.ddos_protection {
            check_ddos(catalogs, &self.region)?;
        }

        let attach_private_network = if self.enable_private_network {
            check_private_networks(catalogs, &self.attach_private_network)?;
            self.attach_private_network.clone()
        } else {
            Vec::new()
        };

        let sshkey_id = checked(&catalogs.ssh_keys, self.sshkey_id.as_deref(), UNKNOWN_SSH_KEY)?;
        let script_id = checked(
            &catalogs.startup_scripts,
            self.script_id.as_deref(),
            UNKNOWN_SCRIPT,
        )?;
        let firewall_group_id = checked(
            &catalogs.firewall_groups,
            self.firewall_group_id.as_deref(),
            UNKNOWN_FIREWALL,
        )?;
        let reserved_ipv4 = checked(
            &catalogs.reserved_ips,
            self.reserved_ipv4.as_deref(),
            UNKNOWN_RESERVED_IP,
        )?;

        Ok(CreateInstanceBody {
            region: self.region.clone(),
            plan: self.plan.clone(),
            os,
            ipxe_chain_url: self.ipxe_chain_url.clone(),
            label: self.label.clone(),
            tag: self.tag.clone(),
            enable_ipv6: self.enable_ipv6,
            backups: self.backups.into(),
            ddos_protection: self.ddos_protection,
            activation_email: self.activation_email.unwrap_or(true),
            enable_private_network: self.enable_private_network,
            attach_private_network,
            sshkey_id,
            script_id,
            firewall_group_id,
            reserved_ipv4,
            user_data: self.user_data.clone(),
            hostname: self
                .hostname
                .clone()
                .unwrap_or_else(|| random_hostname(rng)),
        })
    }
}

/// Options for `PATCH /instances/{id}`; unset fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateInstance {
    pub id: String,
    pub os_id: Option<u64>,
    pub app_id: Option<u64>,
    pub backups: Option<bool>,
    pub enable_ipv6: Option<bool>,
    pub firewall_group_id: Option<String>,
    pub user_data: Option<String>,
    pub tag: Option<String>,
    pub plan: Option<String>,
    pub ddos_protection: Option<bool>,
    /// Region used for the DDoS check; defaults to the instance's own region
    pub region: Option<String>,
    pub enable_private_network: bool,
    pub attach_private_network: Vec<String>,
    pub detach_private_network: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateInstanceBody {
    #[serde(flatten)]
    pub os: Option<OsSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backups: Option<Toggle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_ipv6: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firewall_group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ddos_protection: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_private_network: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attach_private_network: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub detach_private_network: Vec<String>,
}

impl UpdateInstance {
    pub fn build(&self, instances: &Catalog<String>, catalogs: &Catalogs) -> Result<UpdateInstanceBody> {
        instances.require(self.id.as_str(), UNKNOWN_INSTANCE)?;

        let mut body = UpdateInstanceBody {
            os: OsChoice {
                os_id: self.os_id,
                app_id: self.app_id,
                ..OsChoice::default()
            }
            .first_match(catalogs),
            backups: self.backups.map(Toggle::from),
            enable_ipv6: self.enable_ipv6,
            firewall_group_id: checked(
                &catalogs.firewall_groups,
                self.firewall_group_id.as_deref(),
                UNKNOWN_FIREWALL,
            )?,
            user_data: self.user_data.clone(),
            tag: self.tag.clone(),
            plan: checked(&catalogs.plans, self.plan.as_deref(), INVALID_PLAN)?,
            ..UpdateInstanceBody::default()
        };

        if let Some(ddos) = self.ddos_protection {
            if ddos {
                let region = self
                    .region
                    .as_deref()
                    .or_else(|| instances.attr_str(self.id.as_str(), "region"))
                    .unwrap_or_default();
                check_ddos(catalogs, region)?;
            }
            body.ddos_protection = Some(ddos);
        }

        if self.enable_private_network {
            check_private_networks(catalogs, &self.attach_private_network)?;
            body.enable_private_network = Some(true);
            body.attach_private_network = self.attach_private_network.clone();
        }
        body.detach_private_network = self.detach_private_network.clone();

        ensure_not_empty(body != UpdateInstanceBody::default(), "instance")?;
        Ok(body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceIdsBody {
    pub instance_ids: Vec<String>,
}

/// Body for the bulk `halt`/`reboot`/`start` endpoints
pub fn build_bulk(instances: &Catalog<String>, ids: &[String]) -> Result<InstanceIdsBody> {
    if ids.is_empty() {
        return Err(VultrError::invalid("At least one instance id is required"));
    }
    require_all(instances, ids, UNKNOWN_INSTANCE)?;
    Ok(InstanceIdsBody {
        instance_ids: ids.to_vec(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReinstallBody {
    pub hostname: String,
}

/// Options for `POST /instances/{id}/backup-schedule`
#[derive(Debug, Clone, Default)]
pub struct BackupSchedule {
    pub id: String,
    pub schedule_type: String,
    pub hour: Option<i64>,
    pub dow: Option<i64>,
    pub dom: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupScheduleBody {
    #[serde(rename = "type")]
    pub schedule_type: String,
    pub hour: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dow: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dom: Option<i64>,
}

fn ranged(value: Option<i64>, range: std::ops::RangeInclusive<i64>, message: &str) -> Result<i64> {
    let value = value.ok_or_else(|| VultrError::invalid(message))?;
    validate::require_range(value, range, message)?;
    Ok(value)
}

impl BackupSchedule {
    pub fn build(&self, instances: &Catalog<String>) -> Result<BackupScheduleBody> {
        instances.require(self.id.as_str(), UNKNOWN_INSTANCE)?;
        if self.schedule_type.is_empty() {
            return Err(VultrError::invalid("Backup Type Missing"));
        }
        validate::require_one_of(&self.schedule_type, BACKUP_TYPES, "Type is invalid")?;

        let hour = ranged(self.hour, 0..=24, HOUR_INVALID)?;
        let (dow, dom) = match self.schedule_type.as_str() {
            "weekly" => (
                Some(ranged(self.dow, 0..=7, "Day of Week (dow) is invalid")?),
                None,
            ),
            "monthly" => (
                None,
                Some(ranged(self.dom, 1..=28, "Day of Month (dom) is invalid")?),
            ),
            _ => (None, None),
        };

        Ok(BackupScheduleBody {
            schedule_type: self.schedule_type.clone(),
            hour,
            dow,
            dom,
        })
    }
}

/// Restore source, flattened into the body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RestoreSource {
    SnapshotId(String),
    BackupId(String),
}

#[derive(Debug, Clone, Default)]
pub struct RestoreInstance {
    pub id: String,
    pub snapshot_id: Option<String>,
    pub backup_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestoreBody {
    #[serde(flatten)]
    pub source: RestoreSource,
}

impl RestoreInstance {
    pub fn build(&self, instances: &Catalog<String>, catalogs: &Catalogs) -> Result<RestoreBody> {
        instances.require(self.id.as_str(), UNKNOWN_INSTANCE)?;

        let snapshot = self
            .snapshot_id
            .as_deref()
            .filter(|id| catalogs.snapshots.contains(*id))
            .map(|id| RestoreSource::SnapshotId(id.to_string()));
        let source = snapshot
            .or_else(|| {
                self.backup_id
                    .as_deref()
                    .filter(|id| catalogs.backups.contains(*id))
                    .map(|id| RestoreSource::BackupId(id.to_string()))
            })
            .ok_or_else(|| VultrError::invalid(MISSING_RESTORE_SOURCE))?;

        Ok(RestoreBody { source })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateIpv4Body {
    pub reboot: bool,
}

/// Reverse DNS entry for one of an instance's addresses
#[derive(Debug, Clone, Default)]
pub struct ReverseDns {
    pub id: String,
    pub ip: String,
    pub reverse: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReverseDnsBody {
    pub ip: String,
    pub reverse: String,
}

impl ReverseDns {
    fn build_with(&self, instances: &Catalog<String>, ip_ok: fn(&str) -> bool) -> Result<ReverseDnsBody> {
        instances.require(self.id.as_str(), UNKNOWN_INSTANCE)?;
        if !ip_ok(&self.ip) {
            return Err(VultrError::invalid(BAD_IP));
        }
        if !validate::is_valid_hostname(&self.reverse) {
            return Err(VultrError::invalid(BAD_REVERSE));
        }
        Ok(ReverseDnsBody {
            ip: self.ip.clone(),
            reverse: self.reverse.clone(),
        })
    }

    pub fn build_ipv4(&self, instances: &Catalog<String>) -> Result<ReverseDnsBody> {
        self.build_with(instances, validate::is_ipv4)
    }

    pub fn build_ipv6(&self, instances: &Catalog<String>) -> Result<ReverseDnsBody> {
        self.build_with(instances, validate::is_ipv6)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IpBody {
    pub ip: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IsoAttachBody {
    pub iso_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkBody {
    pub network_id: String,
}

/// Instances wrapper
#[derive(Debug, Clone)]
pub struct Instances {
    client: VultrClient,
    catalog: Catalog<String>,
}

impl Instances {
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

    fn path(&self, id: &str, suffix: &str) -> String {
        format!("{INSTANCES}/{}{suffix}", segment(id))
    }

    /// Known instance path, or the "not found" validation error
    fn checked_path(&self, id: &str, suffix: &str) -> Result<String> {
        self.catalog.require(id, UNKNOWN_INSTANCE)?;
        Ok(self.path(id, suffix))
    }

    fn check_ipv4(&self, id: &str, ip: &str) -> Result<()> {
        self.catalog.require(id, "Instance ID Not Found")?;
        if validate::is_ipv4(ip) {
            Ok(())
        } else {
            Err(VultrError::invalid(BAD_IP))
        }
    }

    pub async fn list(&self) -> Result<String> {
        self.client.get(INSTANCES).await
    }

    pub async fn get(&self, id: &str) -> Result<String> {
        self.client.get(&self.path(id, "")).await
    }

    pub async fn delete(&self, id: &str) -> Result<String> {
        self.client.delete(&self.path(id, "")).await
    }

    pub async fn create(&self, opts: &CreateInstance, catalogs: &Catalogs) -> Result<String> {
        let body = opts.build(catalogs, &mut rand::thread_rng())?;
        self.client.post(INSTANCES, &body).await
    }

    pub async fn update(&self, opts: &UpdateInstance, catalogs: &Catalogs) -> Result<String> {
        let body = opts.build(&self.catalog, catalogs)?;
        self.client.patch(&self.path(&opts.id, ""), &body).await
    }

    async fn bulk(&self, verb: &str, ids: &[String]) -> Result<String> {
        let body = build_bulk(&self.catalog, ids)?;
        self.client.post(&format!("{INSTANCES}/{verb}"), &body).await
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

    pub async fn start(&self, id: &str) -> Result<String> {
        self.client.post_empty(&self.checked_path(id, "/start")?).await
    }

    pub async fn reboot(&self, id: &str) -> Result<String> {
        self.client.post_empty(&self.checked_path(id, "/reboot")?).await
    }

    pub async fn halt(&self, id: &str) -> Result<String> {
        self.client.post_empty(&self.checked_path(id, "/halt")?).await
    }

    /// Reinstall the current OS; a random hostname is generated when none is given
    pub async fn reinstall(&self, id: &str, hostname: Option<&str>) -> Result<String> {
        let path = self.checked_path(id, "/reinstall")?;
        let body = ReinstallBody {
            hostname: hostname
                .map(str::to_string)
                .unwrap_or_else(|| random_hostname(&mut rand::thread_rng())),
        };
        self.client.post(&path, &body).await
    }

    pub async fn bandwidth(&self, id: &str) -> Result<String> {
        self.client.get(&self.checked_path(id, "/bandwidth")?).await
    }

    pub async fn neighbors(&self, id: &str) -> Result<String> {
        self.client.get(&self.checked_path(id, "/neighbors")?).await
    }

    pub async fn private_networks(&self, id: &str) -> Result<String> {
        self.client.get(&self.checked_path(id, "/private-networks")?).await
    }

    pub async fn iso_status(&self, id: &str) -> Result<String> {
        self.client.get(&self.checked_path(id, "/iso")?).await
    }

    pub async fn attach_iso(&self, id: &str, iso_id: &str, catalogs: &Catalogs) -> Result<String> {
        let path = self.checked_path(id, "/iso/attach")?;
        catalogs.isos.require(iso_id, "ISO Not Found")?;
        let body = IsoAttachBody {
            iso_id: iso_id.to_string(),
        };
        self.client.post(&path, &body).await
    }

    pub async fn detach_iso(&self, id: &str) -> Result<String> {
        self.client.post_empty(&self.checked_path(id, "/iso/detach")?).await
    }

    async fn private_network_action(
        &self,
        id: &str,
        network_id: &str,
        catalogs: &Catalogs,
        suffix: &str,
    ) -> Result<String> {
        let path = self.checked_path(id, suffix)?;
        catalogs
            .private_networks
            .require(network_id, "Network ID Not Found")?;
        let body = NetworkBody {
            network_id: network_id.to_string(),
        };
        self.client.post(&path, &body).await
    }

    pub async fn attach_private_network(
        &self,
        id: &str,
        network_id: &str,
        catalogs: &Catalogs,
    ) -> Result<String> {
        self.private_network_action(id, network_id, catalogs, "/private-networks/attach")
            .await
    }

    pub async fn detach_private_network(
        &self,
        id: &str,
        network_id: &str,
        catalogs: &Catalogs,
    ) -> Result<String> {
        self.private_network_action(id, network_id, catalogs, "/private-networks/detach")
            .await
    }

    pub async fn set_backup_schedule(&self, opts: &BackupSchedule) -> Result<String> {
        let body = opts.build(&self.catalog)?;
        self.client
            .post(&self.path(&opts.id, "/backup-schedule"), &body)
            .await
    }

    pub async fn backup_schedule(&self, id: &str) -> Result<String> {
        self.client.get(&self.checked_path(id, "/backup-schedule")?).await
    }

    pub async fn restore(&self, opts: &RestoreInstance, catalogs: &Catalogs) -> Result<String> {
        let body = opts.build(&self.catalog, catalogs)?;
        self.client.post(&self.path(&opts.id, "/restore"), &body).await
    }

    pub async fn ipv4(&self, id: &str) -> Result<String> {
        self.client.get(&self.checked_path(id, "/ipv4")?).await
    }

    pub async fn create_ipv4(&self, id: &str, reboot: bool) -> Result<String> {
        let path = self.checked_path(id, "/ipv4")?;
        self.client.post(&path, &CreateIpv4Body { reboot }).await
    }

    pub async fn ipv6(&self, id: &str) -> Result<String> {
        self.client.get(&self.checked_path(id, "/ipv6")?).await
    }

    pub async fn create_reverse_ipv6(&self, opts: &ReverseDns) -> Result<String> {
        let body = opts.build_ipv6(&self.catalog)?;
        self.client.post(&self.path(&opts.id, "/ipv6/reverse"), &body).await
    }

    pub async fn ipv6_reverse(&self, id: &str) -> Result<String> {
        self.client.get(&self.checked_path(id, "/ipv6/reverse")?).await
    }

    pub async fn create_reverse_ipv4(&self, opts: &ReverseDns) -> Result<String> {
        let body = opts.build_ipv4(&self.catalog)?;
        self.client.post(&self.path(&opts.id, "/ipv4/reverse"), &body).await
    }

    pub async fn user_data(&self, id: &str) -> Result<String> {
        self.client.get(&self.checked_path(id, "/user-data")?).await
    }

    pub async fn set_default_reverse_ipv4(&self, id: &str, ip: &str) -> Result<String> {
        self.check_ipv4(id, ip)?;
        let body = IpBody { ip: ip.to_string() };
        self.client
            .post(&self.path(id, "/ipv4/reverse/default"), &body)
            .await
    }

    pub async fn delete_ipv4(&self, id: &str, ip: &str) -> Result<String> {
        self.check_ipv4(id, ip)?;
        self.client.delete(&self.path(id, &format!("/ipv4/{ip}"))).await
    }

    pub async fn delete_reverse_ipv6(&self, id: &str, ip: &str) -> Result<String> {
        self.catalog.require(id, "Instance ID Not Found")?;
        if !validate::is_ipv6(ip) {
            return Err(VultrError::invalid(BAD_IP));
        }
        self.client
            .delete(&self.path(id, &format!("/ipv6/reverse/{ip}")))
            .await
    }

    pub async fn upgrades(&self, id: &str) -> Result<String> {
        self.client.get(&self.checked_path(id, "/upgrades")?).await
    }
}
