//! Vultr Client
//!
//! Main client for interacting with the Vultr API, combining the credential,
//! the HTTP gateway and the API root.

use super::http::VultrHttpClient;
use crate::error::{Result, VultrError};
use reqwest::Method;
use serde::Serialize;
use url::Url;

/// Root of the versioned API
pub const API_URL: &str = "https://api.vultr.com/v2";

pub const ACCOUNT: &str = "/account";
pub const APPLICATIONS: &str = "/applications";
pub const BACKUPS: &str = "/backups";
pub const BARE_METALS: &str = "/bare-metals";
pub const BLOCKS: &str = "/blocks";
pub const DOMAINS: &str = "/domains";
pub const FIREWALLS: &str = "/firewalls";
pub const INSTANCES: &str = "/instances";
pub const ISO: &str = "/iso";
pub const ISO_PUBLIC: &str = "/iso-public";
pub const LOAD_BALANCERS: &str = "/load-balancers";
pub const OBJECT_STORAGE: &str = "/object-storage";
pub const OBJECT_STORAGE_CLUSTERS: &str = "/object-storage/clusters";
pub const OS: &str = "/os";
pub const PLANS: &str = "/plans";
pub const PLANS_METAL: &str = "/plans-metal";
pub const PRIVATE_NETWORKS: &str = "/private-networks";
pub const RESERVED_IPS: &str = "/reserved-ips";
pub const REGIONS: &str = "/regions";
pub const SNAPSHOTS: &str = "/snapshots";
pub const SSH_KEYS: &str = "/ssh-keys";
pub const STARTUP_SCRIPTS: &str = "/startup-scripts";
pub const USERS: &str = "/users";

/// Percent-encode one caller-supplied path segment
pub fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Main Vultr client
#[derive(Debug, Clone)]
pub struct VultrClient {
    pub http: VultrHttpClient,
    base_url: String,
}

impl VultrClient {
    /// Create a new client against the public API root
    pub fn new(token: &str) -> Result<Self> {
        Self::with_base_url(token, API_URL)
    }

    /// Create a client against a different API root (staging, mock servers)
    pub fn with_base_url(token: &str, base_url: &str) -> Result<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|e| VultrError::Client(format!("invalid API root '{base_url}': {e}")))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(VultrError::Client(format!(
                "unsupported scheme '{}' in API root",
                parsed.scheme()
            )));
        }

        let http = VultrHttpClient::new(token)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// API root without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build an absolute URL from a resource path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<String> {
        self.http.call(Method::GET, &self.url(path), None).await
    }

    /// Make a GET request for one page of a list endpoint
    pub async fn get_page(&self, path: &str, cursor: Option<&str>) -> Result<String> {
        let url = match cursor {
            Some(cursor) => format!("{}?cursor={}", self.url(path), segment(cursor)),
            None => self.url(path),
        };
        self.http.call(Method::GET, &url, None).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> Result<String> {
        self.http.call(Method::DELETE, &self.url(path), None).await
    }

    /// Make a POST request without a body
    pub async fn post_empty(&self, path: &str) -> Result<String> {
        self.http.call(Method::POST, &self.url(path), None).await
    }

    /// Make a POST request with a JSON body
    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<String> {
        self.send_json(Method::POST, path, body).await
    }

    /// Make a PUT request with a JSON body
    pub async fn put<T: Serialize>(&self, path: &str, body: &T) -> Result<String> {
        self.send_json(Method::PUT, path, body).await
    }

    /// Make a PATCH request with a JSON body
    pub async fn patch<T: Serialize>(&self, path: &str, body: &T) -> Result<String> {
        self.send_json(Method::PATCH, path, body).await
    }

    async fn send_json<T: Serialize>(&self, method: Method, path: &str, body: &T) -> Result<String> {
        let payload = serde_json::to_string(body)?;
        self.http.call(method, &self.url(path), Some(payload)).await
    }
}
