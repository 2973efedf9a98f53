//! Compute Engine REST client
//!
//! Direct Compute API v1 implementation of [`ComputeService`].
//! Uses Bearer token authentication; obtaining the token is up to the caller.

use crate::compute::{ComputeService, Firewall, Operation};
use crate::error::{ComputeError, GoogleApiError, Result};
use async_trait::async_trait;
use clusterflow_config::ComputeSettings;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://compute.googleapis.com/compute/v1";

const ACCESS_TOKEN_ENV: &str = "GCE_ACCESS_TOKEN";
const ENDPOINT_ENV: &str = "GCE_COMPUTE_ENDPOINT";

const MAX_NAME_LEN: usize = 63;

/// Configuration for [`GceComputeService`]
#[derive(Debug, Clone)]
pub struct ComputeConfig {
    pub endpoint: String,
    pub access_token: String,
    pub user_agent: Option<String>,
    pub timeout: Option<Duration>,
}

impl ComputeConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            access_token: access_token.into(),
            user_agent: None,
            timeout: None,
        }
    }

    /// Create ComputeConfig from environment variables
    pub fn from_env() -> Result<Self> {
        let access_token = std::env::var(ACCESS_TOKEN_ENV)
            .map_err(|_| ComputeError::MissingEnvVar(ACCESS_TOKEN_ENV.to_string()))?;

        let mut config = Self::new(access_token);
        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
            config.endpoint = endpoint;
        }
        Ok(config)
    }

    /// Create ComputeConfig from the config file section
    ///
    /// A token missing from the file is read from `GCE_ACCESS_TOKEN`.
    pub fn from_settings(settings: &ComputeSettings) -> Result<Self> {
        let access_token = match &settings.access_token {
            Some(token) => token.clone(),
            None => std::env::var(ACCESS_TOKEN_ENV)
                .map_err(|_| ComputeError::MissingEnvVar(ACCESS_TOKEN_ENV.to_string()))?,
        };

        Ok(Self {
            endpoint: settings
                .endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            access_token,
            user_agent: settings.user_agent.clone(),
            timeout: settings.timeout_secs.map(Duration::from_secs),
        })
    }
}

/// [`ComputeService`] backed by the Compute Engine REST API
pub struct GceComputeService {
    client: reqwest::Client,
    endpoint: Url,
    access_token: String,
}

impl GceComputeService {
    pub fn new(config: ComputeConfig) -> Result<Self> {
        let endpoint = parse_endpoint(&config.endpoint)?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }

        Ok(Self {
            client: builder.build()?,
            endpoint,
            access_token: config.access_token,
        })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    fn firewalls_url(&self, project: &str) -> Result<Url> {
        self.url(&["projects", project, "global", "firewalls"])
    }

    fn firewall_url(&self, project: &str, name: &str) -> Result<Url> {
        self.url(&["projects", project, "global", "firewalls", name])
    }

    /// Append path segments to the endpoint, percent-encoding each one
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ComputeError::InvalidArgument(format!(
                    "endpoint cannot carry a path: {}",
                    self.endpoint
                ))
            })?
            .pop_if_empty()
            .extend(segments.iter().copied());
        Ok(url)
    }

    /// Turn a non-2xx response into a [`GoogleApiError`]
    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await?;
        Err(parse_api_error(status.as_u16(), &body).into())
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url> {
    let url = Url::parse(endpoint.trim_end_matches('/')).map_err(|e| {
        ComputeError::InvalidArgument(format!("invalid endpoint {}: {}", endpoint, e))
    })?;
    if url.cannot_be_a_base() {
        return Err(ComputeError::InvalidArgument(format!(
            "endpoint cannot carry a path: {}",
            endpoint
        )));
    }
    Ok(url)
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ComputeError::InvalidArgument(format!("{} is empty", field)));
    }
    Ok(())
}

/// Firewall names must match `[a-z]([-a-z0-9]*[a-z0-9])?`, at most 63 chars
fn require_name(name: &str) -> Result<()> {
    require("firewall name", name)?;

    let bytes = name.as_bytes();
    let valid = bytes.len() <= MAX_NAME_LEN
        && bytes[0].is_ascii_lowercase()
        && bytes[bytes.len() - 1] != b'-'
        && bytes
            .iter()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-');

    if !valid {
        return Err(ComputeError::InvalidArgument(format!(
            "invalid firewall name: {:?}",
            name
        )));
    }
    Ok(())
}

/// Decode the operation returned by a mutating call
///
/// An accepted request may come back with no body at all; that is still an
/// accepted request, so it decodes to an empty operation.
pub(crate) fn decode_operation(body: &str) -> Result<Operation> {
    if body.trim().is_empty() {
        return Ok(Operation::default());
    }
    Ok(serde_json::from_str(body)?)
}

#[async_trait]
impl ComputeService for GceComputeService {
    async fn firewalls_delete(&self, project: &str, name: &str) -> Result<Operation> {
        require("project", project)?;
        require_name(name)?;

        tracing::debug!(project, firewall = name, "DELETE firewall");

        let response = self
            .client
            .delete(self.firewall_url(project, name)?)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let response = Self::check(response).await?;
        decode_operation(&response.text().await?)
    }

    async fn firewalls_insert(&self, project: &str, firewall: &Firewall) -> Result<Operation> {
        require("project", project)?;
        require_name(&firewall.name)?;

        tracing::debug!(project, firewall = %firewall.name, "INSERT firewall");

        let response = self
            .client
            .post(self.firewalls_url(project)?)
            .bearer_auth(&self.access_token)
            .json(firewall)
            .send()
            .await?;

        let response = Self::check(response).await?;
        decode_operation(&response.text().await?)
    }

    async fn firewalls_get(&self, project: &str, name: &str) -> Result<Firewall> {
        require("project", project)?;
        require_name(name)?;

        let response = self
            .client
            .get(self.firewall_url(project, name)?)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }
}

// ============ API Types ============

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: Option<u16>,
    #[serde(default)]
    message: String,
}

/// Decode the `{"error": {...}}` envelope Google APIs return on failure
///
/// Bodies that are not an error envelope keep the raw text and no message.
pub(crate) fn parse_api_error(status: u16, body: &str) -> GoogleApiError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => GoogleApiError {
            code: envelope.error.code.unwrap_or(status),
            message: envelope.error.message,
            body: body.to_string(),
        },
        Err(_) => GoogleApiError {
            code: status,
            message: String::new(),
            body: body.to_string(),
        },
    }
}
