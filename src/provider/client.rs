//! HTTP client for the soil property provider.
//!
//! The provider authenticates with a username/password login that returns a
//! bearer token, advertises its properties through a layer listing, and
//! answers one (property, depth) query per request.

use crate::config::ProviderConfig;
use crate::models::{Coordinates, PropertyInfo};
use crate::provider::{catalog, RawReading, SoilDataSource};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("Soil API credentials are not configured: {0}")]
    MissingCredentials(&'static str),
    #[error("{message}")]
    Auth { status: u16, message: String },
    #[error("network error: {0}")]
    Transport(String),
    #[error("http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("json error: {0}")]
    Serde(String),
    #[error("no value returned for {property} at {depth} cm")]
    MissingValue { property: String, depth: String },
}

impl ProviderError {
    fn auth(status: u16, detail: impl std::fmt::Display) -> Self {
        Self::Auth {
            status,
            message: format!("Authentication failed: {}", detail),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LayersResponse {
    #[serde(default)]
    layers: Vec<LayerEntry>,
}

#[derive(Debug, Deserialize)]
struct LayerEntry {
    property: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    unit: String,
    #[serde(default)]
    target_unit: Option<String>,
    #[serde(default)]
    conversion_factor: Option<f64>,
    #[serde(default)]
    method: Option<String>,
}

impl From<LayerEntry> for PropertyInfo {
    /// Layers that omit a conversion factor borrow the catalog's scaling
    /// for properties it knows.
    fn from(entry: LayerEntry) -> Self {
        let known = entry
            .conversion_factor
            .is_none()
            .then(|| catalog::lookup(&entry.property))
            .flatten();

        let (conversion_factor, fallback_target) = match (entry.conversion_factor, known) {
            (Some(factor), _) => (factor, entry.unit.clone()),
            (None, Some(info)) => (info.conversion_factor, info.target_unit),
            (None, None) => (1.0, entry.unit.clone()),
        };

        Self {
            target_unit: entry.target_unit.unwrap_or(fallback_target),
            name: entry.property,
            description: entry.description,
            unit: entry.unit,
            conversion_factor,
            method: entry.method.unwrap_or_else(|| "unknown".to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PropertyResponse {
    #[serde(default)]
    property: HashMap<String, Vec<PropertyEntry>>,
}

#[derive(Debug, Deserialize)]
struct PropertyEntry {
    value: Option<ValueEntry>,
    #[serde(default)]
    uncertainty: Vec<UncertaintyEntry>,
}

#[derive(Debug, Deserialize)]
struct ValueEntry {
    value: Option<f64>,
    unit: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UncertaintyEntry {
    confidence_interval: Option<String>,
}

/// Soil provider API client.
#[derive(Debug, Clone)]
pub struct SoilApiClient {
    http: Client,
    base_url: String,
    username: Option<String>,
    password: Option<String>,
}

impl SoilApiClient {
    /// Create a client from provider settings.
    ///
    /// Missing credentials are not an error here; they surface on the first
    /// authentication attempt so the server can still start and report them.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let mut builder =
            Client::builder().user_agent(concat!("soilscope/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: config.username.clone().filter(|u| !u.is_empty()),
            password: config.password.clone().filter(|p| !p.is_empty()),
        })
    }

    /// Whether both username and password are present.
    pub fn has_credentials(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Http { status, body });
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::Serde(e.to_string()))
    }
}

#[async_trait]
impl SoilDataSource for SoilApiClient {
    async fn authenticate(&self) -> Result<String, ProviderError> {
        let username = self
            .username
            .as_deref()
            .ok_or(ProviderError::MissingCredentials("username is missing"))?;
        let password = self
            .password
            .as_deref()
            .ok_or(ProviderError::MissingCredentials("password is missing"))?;

        debug!("Authenticating with soil provider at {}", self.base_url);

        let response = self
            .http
            .post(self.url("login"))
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .map_err(|e| ProviderError::auth(500, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::auth(
                status.as_u16(),
                format!("provider returned {}: {}", status, body),
            ));
        }

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::auth(500, format!("unreadable login response: {}", e)))?;

        login
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ProviderError::auth(500, "login response did not include a token"))
    }

    async fn list_properties(&self, token: &str) -> Result<Vec<PropertyInfo>, ProviderError> {
        let layers: LayersResponse = self.get_json(token, "layers", &[]).await?;
        Ok(layers.layers.into_iter().map(PropertyInfo::from).collect())
    }

    async fn fetch_reading(
        &self,
        token: &str,
        coords: Coordinates,
        property: &str,
        depth: &str,
    ) -> Result<RawReading, ProviderError> {
        let query = [
            ("lat", coords.lat.to_string()),
            ("lon", coords.lon.to_string()),
            ("property", property.to_string()),
            ("depth", depth.to_string()),
        ];
        let body: PropertyResponse = self.get_json(token, "soilproperty", &query).await?;
        Ok(reading_from_response(body, property))
    }
}

fn reading_from_response(mut body: PropertyResponse, property: &str) -> RawReading {
    let entry = body
        .property
        .remove(property)
        .and_then(|entries| entries.into_iter().next());

    match entry {
        Some(entry) => {
            let (value, unit) = match entry.value {
                Some(v) => (v.value, v.unit),
                None => (None, None),
            };
            RawReading {
                value,
                unit,
                confidence: entry
                    .uncertainty
                    .into_iter()
                    .find_map(|u| u.confidence_interval),
            }
        }
        None => RawReading::default(),
    }
}
