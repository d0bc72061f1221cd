//! Family Registry - list endpoints by family name
//!
//! Maps the family names accepted on the command line to the list path and
//! the envelope key of each resource family.

use super::{
    applications, backups, bare_metal, block_storage, firewalls, instances, iso, load_balancers,
    object_storage, os, plans, private_networks, regions, reserved_ips, snapshots, ssh_keys,
    startup_scripts, users,
};
use crate::api::client::{self, VultrClient};
use crate::catalog::Catalog;
use crate::error::Result;
use serde_json::Value;

/// Identifier type of a family's records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Text,
    Integer,
}

/// List endpoint definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FamilyDef {
    pub name: &'static str,
    pub path: &'static str,
    pub list_key: &'static str,
    pub id_kind: IdKind,
}

const fn text(name: &'static str, path: &'static str, list_key: &'static str) -> FamilyDef {
    FamilyDef {
        name,
        path,
        list_key,
        id_kind: IdKind::Text,
    }
}

const fn integer(name: &'static str, path: &'static str, list_key: &'static str) -> FamilyDef {
    FamilyDef {
        name,
        path,
        list_key,
        id_kind: IdKind::Integer,
    }
}

/// Every listable family
pub const FAMILIES: &[FamilyDef] = &[
    integer("applications", client::APPLICATIONS, applications::LIST_KEY),
    text("backups", client::BACKUPS, backups::LIST_KEY),
    text("bare-metals", client::BARE_METALS, bare_metal::LIST_KEY),
    text("blocks", client::BLOCKS, block_storage::LIST_KEY),
    text("firewalls", client::FIREWALLS, firewalls::LIST_KEY),
    text("instances", client::INSTANCES, instances::LIST_KEY),
    text("iso", client::ISO, iso::LIST_KEY),
    text("iso-public", client::ISO_PUBLIC, "public_isos"),
    text("load-balancers", client::LOAD_BALANCERS, load_balancers::LIST_KEY),
    text("object-storage", client::OBJECT_STORAGE, object_storage::LIST_KEY),
    integer(
        "object-storage-clusters",
        client::OBJECT_STORAGE_CLUSTERS,
        object_storage::CLUSTER_LIST_KEY,
    ),
    integer("os", client::OS, os::LIST_KEY),
    text("plans", client::PLANS, plans::LIST_KEY),
    text("plans-metal", client::PLANS_METAL, plans::METAL_LIST_KEY),
    text("private-networks", client::PRIVATE_NETWORKS, private_networks::LIST_KEY),
    text("regions", client::REGIONS, regions::LIST_KEY),
    text("reserved-ips", client::RESERVED_IPS, reserved_ips::LIST_KEY),
    text("snapshots", client::SNAPSHOTS, snapshots::LIST_KEY),
    text("ssh-keys", client::SSH_KEYS, ssh_keys::LIST_KEY),
    text("startup-scripts", client::STARTUP_SCRIPTS, startup_scripts::LIST_KEY),
    text("users", client::USERS, users::LIST_KEY),
];

/// Get a family definition by name
pub fn get_family(name: &str) -> Option<&'static FamilyDef> {
    FAMILIES.iter().find(|f| f.name == name)
}

/// Get all family names (for help output)
pub fn all_family_names() -> Vec<&'static str> {
    FAMILIES.iter().map(|f| f.name).collect()
}

impl FamilyDef {
    /// Load this family's catalog and return `(id, record)` pairs in server order
    ///
    /// Integer ids are rendered in decimal.
    pub async fn load_records(&self, client: &VultrClient) -> Result<Vec<(String, Value)>> {
        match self.id_kind {
            IdKind::Text => {
                let catalog: Catalog<String> =
                    Catalog::load(client, self.path, self.list_key).await?;
                Ok(catalog
                    .ids()
                    .iter()
                    .filter_map(|id| catalog.get(id).map(|r| (id.clone(), r.clone())))
                    .collect())
            }
            IdKind::Integer => {
                let catalog: Catalog<u64> = Catalog::load(client, self.path, self.list_key).await?;
                Ok(catalog
                    .ids()
                    .iter()
                    .filter_map(|id| catalog.get(id).map(|r| (id.to_string(), r.clone())))
                    .collect())
            }
        }
    }
}
