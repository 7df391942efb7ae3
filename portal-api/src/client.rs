//! Data Portal Rust API Client
//!
//! # Creating new api client
//!
//! - [new](PortalClient::new) - create new client
//! - [with_config](PortalClient::with_config) - create client with custom configuration
//! - [with_client](PortalClient::with_client) - create client with configuration and custom reqwest client
//!
//! # Configuration
//!
//! - [get_config](PortalClient::get_config) - returns configuration
//! - [base_url](PortalClient::base_url) - returns the resolved backend url
//!

use std::{str::FromStr, sync::Arc};

use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    PORTAL_DEPLOYED_URL, PORTAL_DEV_URL, Result,
    config::{MAX_RETRIES_DEFAULT, MAX_RETRIES_ENV, PORTAL_ENV_ENV, PORTAL_URL_ENV},
    http_client::{HttpClient, HttpMetricsSnapshot},
};

/// Backend deployment the client talks to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Environment {
    /// Local backend at [`PORTAL_DEV_URL`]
    #[strum(to_string = "development", serialize = "dev")]
    Development,
    /// Hosted backend at [`PORTAL_DEPLOYED_URL`]
    #[strum(to_string = "deployed", serialize = "production", serialize = "prod")]
    Deployed,
}

impl Default for Environment {
    /// Debug builds talk to the local backend, release builds to the deployed one.
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Environment::Development
        } else {
            Environment::Deployed
        }
    }
}

impl Environment {
    pub fn base_url(self) -> &'static str {
        match self {
            Environment::Development => PORTAL_DEV_URL,
            Environment::Deployed => PORTAL_DEPLOYED_URL,
        }
    }
}

/// Configuration for the portal client.
///
/// ```rust,no_run
/// use portal_api::prelude::*;
/// # fn create_client() -> Result<PortalClient, PortalError> {
/// let config = ClientConfig::default().environment(Environment::Deployed);
/// let client = PortalClient::with_config(config)?;
/// # Ok(client)
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base url for all backend requests.
    /// If not provided in config, url is determined by:
    /// * The environment variable PORTAL_URL, if defined, or
    /// * the base url of [`ClientConfig::environment`]
    pub base_url: String,

    /// Deployment selected at startup. Defaults to the PORTAL_ENV variable if it
    /// parses, else [`Environment::default`].
    pub environment: Environment,

    /// Retries for connection errors, timeouts and 408/429/504 responses.
    ///
    /// Defaults to 0 (a failed request is reported immediately), or the env
    /// override if set: PORTAL_MAX_RETRIES.
    pub max_retries: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let environment = match std::env::var(PORTAL_ENV_ENV) {
            Ok(value) => Environment::from_str(&value).unwrap_or_else(|_| {
                warn!(value = %value, "ignoring unknown {PORTAL_ENV_ENV}");
                Environment::default()
            }),
            Err(_) => Environment::default(),
        };
        ClientConfig {
            base_url: std::env::var(PORTAL_URL_ENV)
                .unwrap_or_else(|_| environment.base_url().to_string()),
            environment,
            max_retries: std::env::var(MAX_RETRIES_ENV)
                .ok()
                .and_then(|value| value.parse::<u32>().ok())
                .unwrap_or(MAX_RETRIES_DEFAULT),
        }
    }
}

impl ClientConfig {
    /// Sets the base url explicitly
    pub fn base_url(self, base_url: impl Into<String>) -> Self {
        ClientConfig {
            base_url: base_url.into(),
            ..self
        }
    }

    /// Selects an environment and uses its base url
    pub fn environment(self, environment: Environment) -> Self {
        ClientConfig {
            base_url: environment.base_url().to_string(),
            environment,
            ..self
        }
    }

    pub fn max_retries(self, max_retries: u32) -> Self {
        ClientConfig {
            max_retries,
            ..self
        }
    }
}

/// Client for the Data Portal backend. Cloning is cheap and clones share
/// the connection pool and metrics.
#[derive(Clone)]
pub struct PortalClient {
    pub(crate) client: Arc<HttpClient>,
    pub(crate) config: ClientConfig,
}

impl std::fmt::Debug for PortalClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortalClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PortalClient {
    /// Creates a new client with default configuration.
    ///
    /// # Example
    /// ```rust,no_run
    /// use portal_api::prelude::*;
    /// # fn create_client() -> Result<PortalClient, PortalError> {
    /// let client = PortalClient::new()?;
    /// # Ok(client)
    /// # }
    /// ```
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a new client with the provided configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Self::with_client(reqwest::Client::builder(), config)
    }

    /// Creates a client from a `reqwest::ClientBuilder` and configuration.
    /// ClientBuilder can be customized with timeouts, proxies, user_agent, etc.
    ///
    /// # Example
    /// ```rust,no_run
    /// use portal_api::prelude::*;
    /// # fn create_client() -> Result<PortalClient, PortalError> {
    /// let config = ClientConfig::default().base_url("http://127.0.0.1:9000");
    /// let builder = reqwest::Client::builder().timeout(std::time::Duration::from_secs(10));
    /// let client = PortalClient::with_client(builder, config)?;
    /// # Ok(client)
    /// # }
    /// ```
    pub fn with_client(builder: reqwest::ClientBuilder, config: ClientConfig) -> Result<Self> {
        debug!(url = %config.base_url, environment = %config.environment, "new client");
        let client = HttpClient::new(builder, &config.base_url, config.max_retries)?;
        Ok(Self {
            client: Arc::new(client),
            config,
        })
    }

    /// Returns the configuration.
    pub fn get_config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the parsed backend url
    pub fn base_url(&self) -> &Url {
        &self.client.base_url
    }

    /// Returns a snapshot of current HTTP metrics.
    ///
    /// - `total_requests`: Number of HTTP requests sent, including retries
    /// - `successful_responses`: Number of successful (2xx) responses
    /// - `errors`: Number of failed requests
    /// - `retries`: Number of retry attempts
    /// - `bytes_received`: Total bytes received in response bodies
    pub fn http_metrics(&self) -> HttpMetricsSnapshot {
        self.client.metrics_snapshot()
    }
}
