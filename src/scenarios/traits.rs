//! Scenario trait and supporting types
//!
//! A `Scenario` is a named group of expectations sharing setup and teardown.
//! Setup produces a [`Fixture`] that is handed to each expectation; there is
//! no state shared between scenarios.

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::assert::Outcome;
use crate::client::{ClientError, ResponseHandle, TodoClient};
use crate::config::{DEFAULT_ORIGIN, DEFAULT_TITLE};

/// Errors raised by setup and teardown hooks
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("{0}")]
    Client(#[from] Arc<ClientError>),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Panicked: {0}")]
    Panic(String),
}

impl From<ClientError> for ScenarioError {
    fn from(error: ClientError) -> Self {
        ScenarioError::Client(Arc::new(error))
    }
}

/// When a scenario's `before` hook runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupMode {
    /// Once, before all expectations
    Once,
    /// Again before every expectation, for a fresh item per check
    Each,
}

/// State produced by a setup hook, scoped to one scenario run
#[derive(Debug, Clone)]
pub struct Fixture {
    response: ResponseHandle,
}

impl Fixture {
    pub fn new(response: ResponseHandle) -> Self {
        Self { response }
    }

    /// Wait for `response`. A response that never arrived fails the setup;
    /// an HTTP error status is left for the expectations to judge.
    pub async fn settle(response: ResponseHandle) -> Result<Self, ScenarioError> {
        if let Err(error) = response.resolve().await {
            if error.status().is_none() {
                return Err(ScenarioError::Client(error));
            }
        }
        Ok(Self::new(response))
    }

    /// The setup exchange
    pub fn response(&self) -> &ResponseHandle {
        &self.response
    }

    /// Wait for the setup exchange and return its `Location` header
    pub async fn location(&self) -> Result<String, ScenarioError> {
        let response = self.response.resolve().await?;
        response
            .location()
            .map(str::to_string)
            .ok_or_else(|| ClientError::MissingHeader("Location").into())
    }
}

/// Signature of a single expectation
pub type ExpectationFn = for<'a> fn(&'a ScenarioContext, &'a Fixture) -> BoxFuture<'a, Outcome>;

/// One named, independently reported check
#[derive(Clone, Copy)]
pub struct Expectation {
    pub name: &'static str,
    pub run: ExpectationFn,
}

impl Expectation {
    pub const fn new(name: &'static str, run: ExpectationFn) -> Self {
        Self { name, run }
    }
}

impl std::fmt::Debug for Expectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Expectation").field("name", &self.name).finish()
    }
}

/// Result of one expectation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectationResult {
    pub name: String,
    pub outcome: Outcome,
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
}

impl ExpectationResult {
    pub fn new(name: impl Into<String>, outcome: Outcome, duration: Duration) -> Self {
        Self {
            name: name.into(),
            outcome,
            duration,
        }
    }

    pub fn passed(&self) -> bool {
        self.outcome.is_passed()
    }
}

/// Result of a whole scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Registry key
    pub name: String,
    /// Report heading
    pub title: String,
    /// Whether every expectation passed and teardown succeeded
    pub passed: bool,
    pub expectations: Vec<ExpectationResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teardown_error: Option<String>,
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
}

impl ScenarioResult {
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        expectations: Vec<ExpectationResult>,
        duration: Duration,
    ) -> Self {
        let passed = expectations.iter().all(|e| e.passed());
        Self {
            name: name.into(),
            title: title.into(),
            passed,
            expectations,
            teardown_error: None,
            duration,
        }
    }

    /// Record a teardown failure, which fails the scenario
    pub fn with_teardown_error(mut self, error: impl Into<String>) -> Self {
        self.teardown_error = Some(error.into());
        self.passed = false;
        self
    }

    pub fn failed_count(&self) -> usize {
        self.expectations.iter().filter(|e| !e.passed()).count()
    }
}

/// Options for a scenario run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioOptions {
    /// Upper bound for each hook and each expectation
    #[serde(
        default,
        with = "humantime_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub timeout: Option<Duration>,
}

impl ScenarioOptions {
    pub fn timeout_or(&self, default: Duration) -> Duration {
        self.timeout.unwrap_or(default)
    }
}

/// Everything a scenario needs to talk to the backend
#[derive(Debug, Clone)]
pub struct ScenarioContext {
    pub client: TodoClient,
    /// Collection endpoint, e.g. `http://localhost:8000/todos`
    pub endpoint: Url,
    /// Title used for created items
    pub title: String,
    /// `Origin` sent with the CORS preflight
    pub origin: String,
}

impl ScenarioContext {
    pub fn new(client: TodoClient, endpoint: Url) -> Self {
        Self {
            client,
            endpoint,
            title: DEFAULT_TITLE.to_string(),
            origin: DEFAULT_ORIGIN.to_string(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn collection_url(&self) -> &str {
        self.endpoint.as_str()
    }

    /// Create a fresh item and wait until its `Location` is known
    pub async fn create_item(&self) -> Result<Fixture, ScenarioError> {
        let fixture = Fixture::new(self.client.create(self.collection_url(), &self.title));
        fixture.location().await?;
        Ok(fixture)
    }

    /// Delete every item in the collection
    pub async fn clear_collection(&self) -> Result<(), ScenarioError> {
        self.client.del(self.collection_url()).resolve().await?;
        Ok(())
    }
}

/// Trait for contract scenarios
///
/// ## Example Implementation
///
/// ```ignore
/// use async_trait::async_trait;
/// use futures::FutureExt;
/// use todocheck::assert::expect;
/// use todocheck::scenarios::*;
///
/// pub struct ListScenario;
///
/// #[async_trait]
/// impl Scenario for ListScenario {
///     fn name(&self) -> &'static str { "list" }
///     fn title(&self) -> &'static str { "List Todo Items" }
///     fn description(&self) -> &'static str { "GET on the collection answers 200" }
///     fn setup_mode(&self) -> SetupMode { SetupMode::Once }
///
///     async fn before(&self, ctx: &ScenarioContext) -> Result<Fixture, ScenarioError> {
///         Ok(Fixture::new(ctx.client.get(ctx.collection_url())))
///     }
///
///     fn expectations(&self) -> Vec<Expectation> {
///         vec![Expectation::new("should return 200", |_, f| {
///             expect(f.response()).status().to_equal(200).boxed()
///         })]
///     }
/// }
/// ```
#[async_trait]
pub trait Scenario: Send + Sync {
    /// Unique key (used in CLI and config)
    fn name(&self) -> &'static str;

    /// Heading the report groups expectations under
    fn title(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// Whether `before` runs once or before every expectation
    fn setup_mode(&self) -> SetupMode;

    /// Build the fixture for the expectations
    async fn before(&self, ctx: &ScenarioContext) -> Result<Fixture, ScenarioError>;

    /// Expectations, in the order they run
    fn expectations(&self) -> Vec<Expectation>;

    /// Clean up after all expectations, whatever their outcome
    async fn after(&self, _ctx: &ScenarioContext) -> Result<(), ScenarioError> {
        Ok(())
    }

    /// Default options for this scenario
    fn default_options(&self) -> ScenarioOptions {
        ScenarioOptions {
            timeout: Some(Duration::from_secs(30)),
        }
    }
}
