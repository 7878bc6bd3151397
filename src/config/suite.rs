//! Suite configuration types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::client::TodoClient;
use crate::scenarios::{ScenarioContext, ScenarioOptions};

/// Collection endpoint used when nothing else is configured
pub const DEFAULT_URL: &str = "http://localhost:8000/todos";

/// Title of the items the suite creates
pub const DEFAULT_TITLE: &str = "Walk the dog";

/// `Origin` sent with the CORS preflight
pub const DEFAULT_ORIGIN: &str = "http://someplace.com";

/// Per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur during configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid endpoint URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to create client: {0}")]
    Client(#[from] crate::client::ClientError),
}

/// The backend under test
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Endpoint {
    /// Collection URL (e.g. "http://localhost:8000/todos")
    #[serde(default = "default_url")]
    pub url: String,

    /// Per-request timeout
    #[serde(
        default,
        with = "humantime_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub timeout: Option<Duration>,
}

fn default_url() -> String {
    DEFAULT_URL.to_string()
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout: None,
        }
    }
}

impl Endpoint {
    /// Parse and validate the URL
    pub fn parse_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.url).map_err(|source| ConfigError::InvalidUrl {
            url: self.url.clone(),
            source,
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::Invalid(format!(
                "endpoint scheme must be http or https, got '{other}'"
            ))),
        }
    }

    pub fn timeout_or_default(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT)
    }
}

/// Configuration for a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Whether this scenario is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Upper bound for each hook and expectation
    #[serde(
        default,
        with = "humantime_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub timeout: Option<Duration>,
}

fn default_enabled() -> bool {
    true
}

impl ScenarioConfig {
    /// Convert to ScenarioOptions
    pub fn to_scenario_options(&self, defaults: &ScenarioOptions) -> ScenarioOptions {
        ScenarioOptions {
            timeout: self.timeout.or(defaults.timeout),
        }
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout: None,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend under test
    #[serde(default)]
    pub endpoint: Endpoint,

    /// Title of created items
    #[serde(default = "default_title")]
    pub title: String,

    /// Origin for the CORS preflight
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Scenario configurations (scenario_name -> config)
    #[serde(default)]
    pub scenarios: HashMap<String, ScenarioConfig>,
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn default_origin() -> String {
    DEFAULT_ORIGIN.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::default(),
            title: default_title(),
            origin: default_origin(),
            scenarios: HashMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde can't
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.endpoint.parse_url()?;
        if self.title.trim().is_empty() {
            return Err(ConfigError::Invalid("title must not be empty".to_string()));
        }
        Ok(())
    }

    /// Replace the endpoint URL (CLI flag or `URL` variable)
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint.url = url.into();
        self
    }

    /// Get configuration for a specific scenario
    pub fn scenario_config(&self, name: &str) -> Option<&ScenarioConfig> {
        self.scenarios.get(name)
    }

    /// Check if a specific scenario is enabled; unlisted scenarios are
    /// enabled
    pub fn is_scenario_enabled(&self, name: &str) -> bool {
        self.scenarios.get(name).map(|c| c.enabled).unwrap_or(true)
    }

    /// Build the context scenarios run with
    pub fn to_scenario_context(&self) -> Result<ScenarioContext, ConfigError> {
        let endpoint = self.endpoint.parse_url()?;
        let client = TodoClient::new(self.endpoint.timeout_or_default())?;

        Ok(ScenarioContext::new(client, endpoint)
            .with_title(&self.title)
            .with_origin(&self.origin))
    }

    /// Generate a default configuration with every scenario listed
    pub fn default_config() -> Self {
        let scenarios = crate::scenarios::registry::list_scenarios()
            .into_iter()
            .map(|name| (name.to_string(), ScenarioConfig::default()))
            .collect();

        Config {
            endpoint: Endpoint {
                url: default_url(),
                timeout: Some(DEFAULT_TIMEOUT),
            },
            scenarios,
            ..Default::default()
        }
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}
