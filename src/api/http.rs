//! HTTP utilities for Vultr REST API calls

use crate::error::{Result, VultrError};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::fmt;

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("vultr-client/", env!("CARGO_PKG_VERSION"));

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips non-printable characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.chars().count() > MAX_LOG_BODY_LENGTH {
        let head: String = body.chars().take(MAX_LOG_BODY_LENGTH).collect();
        format!("{}... [truncated, {} bytes total]", head, body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Extract the message from an error envelope (`{"error": "..."}`)
///
/// Falls back to the raw body when it is not JSON or carries no `error` field.
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => match map.get("error") {
            Some(Value::String(message)) => message.clone(),
            Some(Value::Null) | None => body.to_string(),
            Some(other) => other.to_string(),
        },
        _ => body.to_string(),
    }
}

fn transport_error(url: &str, err: &reqwest::Error) -> VultrError {
    tracing::error!("Transport failure for {}: {}", url, err);
    VultrError::Transport {
        url: url.to_string(),
        message: err.to_string(),
    }
}

/// Error for a body that could not be read after `status` arrived
///
/// A non-success status is still reported as [`VultrError::Request`].
fn body_read_error(status: StatusCode, url: &str, message: String) -> VultrError {
    tracing::error!("Failed to read response body from {} ({}): {}", url, status, message);
    if status.is_success() {
        VultrError::Transport {
            url: url.to_string(),
            message,
        }
    } else {
        VultrError::Request {
            status: status.as_u16(),
            message,
        }
    }
}

/// HTTP client wrapper holding the bearer credential
#[derive(Clone)]
pub struct VultrHttpClient {
    client: Client,
    token: String,
}

impl fmt::Debug for VultrHttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VultrHttpClient")
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl VultrHttpClient {
    /// Create a new HTTP client for the given API token
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| VultrError::Client(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            token: token.into(),
        })
    }

    /// Issue one request and return the response body verbatim
    ///
    /// `body` must already be serialized JSON. A non-success status becomes
    /// [`VultrError::Request`]; a request that never got a response becomes
    /// [`VultrError::Transport`].
    pub async fn call(&self, method: Method, url: &str, body: Option<String>) -> Result<String> {
        tracing::debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method, url)
            .header(CONTENT_TYPE, "application/json")
            .bearer_auth(&self.token);

        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(|e| transport_error(url, &e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| body_read_error(status, url, e.to_string()))?;

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(VultrError::Request {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        Ok(body)
    }
}

/// Format a Vultr API error for display
pub fn format_vultr_error(error: &VultrError) -> String {
    match error {
        VultrError::Request { status: 401, .. } => {
            "Authentication failed. Check your API key.".to_string()
        }
        VultrError::Request { status: 403, .. } => {
            "Permission denied. Check the API key's access control list.".to_string()
        }
        VultrError::Request { status: 404, .. } => "Resource not found.".to_string(),
        VultrError::Request { status: 429, .. } => {
            "Rate limit exceeded. Please try again later.".to_string()
        }
        VultrError::Request { status, .. } if *status >= 500 => {
            "Vultr service temporarily unavailable. Please try again.".to_string()
        }
        VultrError::Request { status, message } => {
            format!("Request rejected ({}): {}", status, sanitize_for_log(message))
        }
        VultrError::Transport { .. } => {
            "Request failed. Check your network connection and try again.".to_string()
        }
        other => other.to_string(),
    }
}
