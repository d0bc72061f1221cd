//! Account sub-users

use super::ensure_not_empty;
use crate::api::client::{segment, VultrClient, USERS};
use crate::catalog::Catalog;
use crate::error::{Result, VultrError};
use crate::validate;
use serde::Serialize;
use std::fmt;

pub const LIST_KEY: &str = "users";

pub const ACLS: &[&str] = &[
    "abuse",
    "alerts",
    "billing",
    "dns",
    "firewall",
    "loadbalancer",
    "manage_users",
    "objstore",
    "provisioning",
    "subscriptions",
    "subscriptions_view",
    "support",
    "upgrade",
];
pub const DEFAULT_ACL: &str = "subscriptions_view";

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MIN_NAME_LEN: usize = 4;

const UNKNOWN_USER: &str = "That User ID isn't associated with your account";

pub async fn load_catalog(client: &VultrClient) -> Result<Catalog<String>> {
    Catalog::load(client, USERS, LIST_KEY).await
}

fn check_acls(acls: &[String]) -> Result<()> {
    acls.iter()
        .try_for_each(|acl| validate::require_one_of(acl, ACLS, "Invalid ACLS"))
}

const REDACTED: &str = "[REDACTED]";

fn redacted(password: &Option<String>) -> Option<&'static str> {
    password.as_ref().map(|_| REDACTED)
}

/// Options for `POST /users`
#[derive(Clone, Default)]
pub struct CreateUser {
    pub email: String,
    pub password: String,
    pub name: String,
    /// Defaults to `subscriptions_view` only
    pub acls: Option<Vec<String>>,
    pub api_enabled: bool,
}

#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct CreateUserBody {
    pub api_enabled: bool,
    pub acls: Vec<String>,
    pub email: String,
    pub password: String,
    pub name: String,
}

impl fmt::Debug for CreateUserBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateUserBody")
            .field("api_enabled", &self.api_enabled)
            .field("acls", &self.acls)
            .field("email", &self.email)
            .field("password", &REDACTED)
            .field("name", &self.name)
            .finish()
    }
}

impl fmt::Debug for CreateUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateUser")
            .field("email", &self.email)
            .field("password", &REDACTED)
            .field("name", &self.name)
            .field("acls", &self.acls)
            .field("api_enabled", &self.api_enabled)
            .finish()
    }
}

impl CreateUser {
    pub fn build(&self) -> Result<CreateUserBody> {
        if !validate::is_valid_email(&self.email) {
            return Err(VultrError::invalid("Email required or is invalid"));
        }
        validate::require_min_len(
            &self.password,
            MIN_PASSWORD_LEN,
            "Password Required or is less than 8 characters",
        )?;
        validate::require_min_len(
            &self.name,
            MIN_NAME_LEN,
            "Name Required or is less than 4 characters",
        )?;

        let acls = match &self.acls {
            Some(acls) => {
                check_acls(acls)?;
                acls.clone()
            }
            None => vec![DEFAULT_ACL.to_string()],
        };

        Ok(CreateUserBody {
            api_enabled: self.api_enabled,
            acls,
            email: self.email.clone(),
            password: self.password.clone(),
            name: self.name.clone(),
        })
    }
}

/// Options for `PATCH /users/{id}`
#[derive(Clone, Default)]
pub struct UpdateUser {
    pub id: String,
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub api_enabled: Option<bool>,
    pub acls: Option<Vec<String>>,
}

#[derive(Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateUserBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acls: Option<Vec<String>>,
}

impl fmt::Debug for UpdateUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateUser")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password", &redacted(&self.password))
            .field("name", &self.name)
            .field("api_enabled", &self.api_enabled)
            .field("acls", &self.acls)
            .finish()
    }
}

impl fmt::Debug for UpdateUserBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateUserBody")
            .field("email", &self.email)
            .field("password", &redacted(&self.password))
            .field("name", &self.name)
            .field("api_enabled", &self.api_enabled)
            .field("acls", &self.acls)
            .finish()
    }
}

impl UpdateUser {
    pub fn build(&self, users: &Catalog<String>) -> Result<UpdateUserBody> {
        users.require(self.id.as_str(), "That User ID doesn't exist")?;

        if let Some(email) = self.email.as_deref() {
            if !validate::is_valid_email(email) {
                return Err(VultrError::invalid("Email included but is invalid"));
            }
        }
        if let Some(password) = self.password.as_deref() {
            validate::require_min_len(
                password,
                MIN_PASSWORD_LEN,
                "Password included but is less than 8 characters",
            )?;
        }
        if let Some(name) = self.name.as_deref() {
            validate::require_min_len(
                name,
                MIN_NAME_LEN,
                "Name included but is less than 4 characters",
            )?;
        }
        if let Some(acls) = &self.acls {
            check_acls(acls)?;
        }

        let body = UpdateUserBody {
            email: self.email.clone(),
            password: self.password.clone(),
            name: self.name.clone(),
            api_enabled: self.api_enabled,
            acls: self.acls.clone(),
        };
        ensure_not_empty(body != UpdateUserBody::default(), "user")?;
        Ok(body)
    }
}

#[derive(Debug, Clone)]
pub struct Users {
    client: VultrClient,
    catalog: Catalog<String>,
}

impl Users {
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
        format!("{USERS}/{}", segment(id))
    }

    pub async fn list(&self) -> Result<String> {
        self.client.get(USERS).await
    }

    pub async fn get(&self, id: &str) -> Result<String> {
        self.catalog.require(id, UNKNOWN_USER)?;
        self.client.get(&Self::path(id)).await
    }

    pub async fn delete(&self, id: &str) -> Result<String> {
        self.catalog.require(id, UNKNOWN_USER)?;
        self.client.delete(&Self::path(id)).await
    }

    pub async fn create(&self, opts: &CreateUser) -> Result<String> {
        let body = opts.build()?;
        self.client.post(USERS, &body).await
    }

    pub async fn update(&self, opts: &UpdateUser) -> Result<String> {
        let body = opts.build(&self.catalog)?;
        self.client.patch(&Self::path(&opts.id), &body).await
    }

    pub fn user_count(&self) -> u64 {
        self.catalog
            .reported_total()
            .unwrap_or(self.catalog.len() as u64)
    }
}
