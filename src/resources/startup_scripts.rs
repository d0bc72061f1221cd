//! Startup scripts

use super::ensure_not_empty;
use crate::api::client::{segment, VultrClient, STARTUP_SCRIPTS};
use crate::catalog::Catalog;
use crate::error::{Result, VultrError};
use crate::validate;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Serialize;

pub const LIST_KEY: &str = "startup_scripts";

pub const SCRIPT_TYPES: &[&str] = &["pxe", "boot"];
pub const DEFAULT_SCRIPT_TYPE: &str = "boot";

const BAD_TYPE: &str = "Startup Script Type is invalid";

pub async fn load_catalog(client: &VultrClient) -> Result<Catalog<String>> {
    Catalog::load(client, STARTUP_SCRIPTS, LIST_KEY).await
}

/// Options for `POST /startup-scripts`
#[derive(Debug, Clone, Default)]
pub struct CreateStartupScript {
    pub name: Option<String>,
    /// Plain script text; encoded before sending
    pub script: Option<String>,
    /// `boot` (default) or `pxe`
    pub script_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateStartupScriptBody {
    #[serde(rename = "type")]
    pub script_type: String,
    pub name: String,
    pub script: String,
}

impl CreateStartupScript {
    pub fn build(&self) -> Result<CreateStartupScriptBody> {
        let script_type = self.script_type.as_deref().unwrap_or(DEFAULT_SCRIPT_TYPE);
        validate::require_one_of(script_type, SCRIPT_TYPES, BAD_TYPE)?;

        let name = self
            .name
            .as_deref()
            .ok_or_else(|| VultrError::invalid("Startup Script Name Required"))?;
        let script = self
            .script
            .as_deref()
            .ok_or_else(|| VultrError::invalid("Startup Script Missing"))?;

        Ok(CreateStartupScriptBody {
            script_type: script_type.to_string(),
            name: name.to_string(),
            script: STANDARD.encode(script),
        })
    }
}

/// Options for `PATCH /startup-scripts/{id}`
#[derive(Debug, Clone, Default)]
pub struct UpdateStartupScript {
    pub id: String,
    pub name: Option<String>,
    pub script: Option<String>,
    pub script_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateStartupScriptBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub script_type: Option<String>,
}

impl UpdateStartupScript {
    pub fn build(&self, scripts: &Catalog<String>) -> Result<UpdateStartupScriptBody> {
        scripts.require(
            self.id.as_str(),
            "That Startup Script ID isn't associated with your account",
        )?;
        if let Some(script_type) = self.script_type.as_deref() {
            validate::require_one_of(script_type, SCRIPT_TYPES, BAD_TYPE)?;
        }

        let body = UpdateStartupScriptBody {
            name: self.name.clone(),
            script: self.script.as_deref().map(|s| STANDARD.encode(s)),
            script_type: self.script_type.clone(),
        };
        ensure_not_empty(body != UpdateStartupScriptBody::default(), "startup script")?;
        Ok(body)
    }
}

#[derive(Debug, Clone)]
pub struct StartupScripts {
    client: VultrClient,
    catalog: Catalog<String>,
}

impl StartupScripts {
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
        format!("{STARTUP_SCRIPTS}/{}", segment(id))
    }

    pub async fn list(&self) -> Result<String> {
        self.client.get(STARTUP_SCRIPTS).await
    }

    pub async fn get(&self, id: &str) -> Result<String> {
        self.client.get(&Self::path(id)).await
    }

    pub async fn delete(&self, id: &str) -> Result<String> {
        self.client.delete(&Self::path(id)).await
    }

    pub async fn create(&self, opts: &CreateStartupScript) -> Result<String> {
        let body = opts.build()?;
        self.client.post(STARTUP_SCRIPTS, &body).await
    }

    pub async fn update(&self, opts: &UpdateStartupScript) -> Result<String> {
        let body = opts.build(&self.catalog)?;
        self.client.patch(&Self::path(&opts.id), &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::fixtures;

    #[test]
    fn test_create_encodes_script() {
        let opts = CreateStartupScript {
            name: Some("hello".to_string()),
            script: Some("#!/bin/sh\necho hi\n".to_string()),
            script_type: None,
        };
        let body = opts.build().unwrap();
        assert_eq!(body.script_type, "boot");
        assert_eq!(STANDARD.decode(&body.script).unwrap(), b"#!/bin/sh\necho hi\n");
        assert!(serde_json::to_string(&body).unwrap().starts_with(r#"{"type":"boot","name":"hello""#));
    }

    #[test]
    fn test_create_validation() {
        let bad_type = CreateStartupScript {
            name: Some("hello".to_string()),
            script: Some("echo".to_string()),
            script_type: Some("cloud-init".to_string()),
        };
        assert_eq!(
            bad_type.build().unwrap_err().to_string(),
            "invalid parameter: Startup Script Type is invalid"
        );

        let no_script = CreateStartupScript {
            name: Some("hello".to_string()),
            ..CreateStartupScript::default()
        };
        assert!(no_script.build().is_err());
    }

    #[test]
    fn test_update() {
        let scripts = fixtures::catalogs().startup_scripts;
        let opts = UpdateStartupScript {
            id: "script-1".to_string(),
            script_type: Some("pxe".to_string()),
            ..UpdateStartupScript::default()
        };
        assert_eq!(
            serde_json::to_string(&opts.build(&scripts).unwrap()).unwrap(),
            r#"{"type":"pxe"}"#
        );

        let foreign = UpdateStartupScript {
            id: "script-9".to_string(),
            ..opts
        };
        assert!(foreign.build(&scripts).is_err());
    }
}
