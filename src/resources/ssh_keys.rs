//! SSH keys

use super::ensure_not_empty;
use crate::api::client::{segment, VultrClient, SSH_KEYS};
use crate::catalog::Catalog;
use crate::error::{Result, VultrError};
use crate::validate;
use serde::Serialize;

pub const LIST_KEY: &str = "ssh_keys";

pub async fn load_catalog(client: &VultrClient) -> Result<Catalog<String>> {
    Catalog::load(client, SSH_KEYS, LIST_KEY).await
}

/// Options for `POST /ssh-keys`
#[derive(Debug, Clone, Default)]
pub struct CreateSshKey {
    pub name: Option<String>,
    /// Public key line, e.g. `ssh-rsa AAAA... me@host`
    pub ssh_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateSshKeyBody {
    pub ssh_key: String,
    pub name: String,
}

impl CreateSshKey {
    pub fn build(&self) -> Result<CreateSshKeyBody> {
        let name = self
            .name
            .as_deref()
            .ok_or_else(|| VultrError::invalid("Missing a name for your SSH Key"))?;
        let key = self
            .ssh_key
            .as_deref()
            .ok_or_else(|| VultrError::invalid("Missing an SSH Key"))?;
        validate::validate_ssh_key(key)?;

        Ok(CreateSshKeyBody {
            ssh_key: key.to_string(),
            name: name.to_string(),
        })
    }
}

/// Options for `PATCH /ssh-keys/{id}`
#[derive(Debug, Clone, Default)]
pub struct UpdateSshKey {
    pub id: String,
    pub name: Option<String>,
    pub ssh_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateSshKeyBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_key: Option<String>,
}

impl UpdateSshKey {
    pub fn build(&self, keys: &Catalog<String>) -> Result<UpdateSshKeyBody> {
        keys.require(
            self.id.as_str(),
            "That SSH Key ID isn't associated with your account",
        )?;
        if let Some(key) = self.ssh_key.as_deref() {
            validate::validate_ssh_key(key)?;
        }

        let body = UpdateSshKeyBody {
            name: self.name.clone(),
            ssh_key: self.ssh_key.clone(),
        };
        ensure_not_empty(body != UpdateSshKeyBody::default(), "SSH key")?;
        Ok(body)
    }
}

#[derive(Debug, Clone)]
pub struct SshKeys {
    client: VultrClient,
    catalog: Catalog<String>,
}

impl SshKeys {
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

    fn path(id: &str) -> String {
        format!("{SSH_KEYS}/{}", segment(id))
    }

    pub async fn list(&self) -> Result<String> {
        self.client.get(SSH_KEYS).await
    }

    pub async fn get(&self, id: &str) -> Result<String> {
        self.client.get(&Self::path(id)).await
    }

    pub async fn delete(&self, id: &str) -> Result<String> {
        self.client.delete(&Self::path(id)).await
    }

    pub async fn create(&self, opts: &CreateSshKey) -> Result<String> {
        let body = opts.build()?;
        self.client.post(SSH_KEYS, &body).await
    }

    pub async fn update(&self, opts: &UpdateSshKey) -> Result<String> {
        let body = opts.build(&self.catalog)?;
        self.client.patch(&Self::path(&opts.id), &body).await
    }
}
