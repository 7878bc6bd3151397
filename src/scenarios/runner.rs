//! Scenario runner
//!
//! Executes scenarios one after another. Within a scenario the order is
//! always setup, expectations in declaration order, teardown. Failures,
//! timeouts and panics are contained at the expectation boundary and turned
//! into an [`Outcome`]; teardown runs no matter what happened before it.

use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use super::traits::{
    Expectation, ExpectationResult, Fixture, Scenario, ScenarioContext, ScenarioError,
    ScenarioOptions, ScenarioResult, SetupMode,
};
use crate::assert::Outcome;
use crate::report::SuiteReport;

/// Fallback bound for hooks and expectations when options carry none
pub const DEFAULT_EXPECTATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs a list of scenarios against one backend
pub struct Runner {
    ctx: ScenarioContext,
    plan: Vec<(Arc<dyn Scenario>, ScenarioOptions)>,
}

impl Runner {
    pub fn new(ctx: ScenarioContext) -> Self {
        Self {
            ctx,
            plan: Vec::new(),
        }
    }

    /// Queue a scenario
    pub fn add(&mut self, scenario: Arc<dyn Scenario>, opts: ScenarioOptions) {
        self.plan.push((scenario, opts));
    }

    /// Queue a scenario (builder pattern)
    pub fn with_scenario(mut self, scenario: Arc<dyn Scenario>, opts: ScenarioOptions) -> Self {
        self.add(scenario, opts);
        self
    }

    pub fn len(&self) -> usize {
        self.plan.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plan.is_empty()
    }

    /// Run every queued scenario in order
    pub async fn run(&self) -> SuiteReport {
        let start = Instant::now();
        let mut results = Vec::with_capacity(self.plan.len());

        for (scenario, opts) in &self.plan {
            results.push(run_scenario(scenario.as_ref(), &self.ctx, opts).await);
        }

        SuiteReport::new(self.ctx.collection_url(), results, start.elapsed())
    }
}

/// Run one scenario: setup, each expectation, teardown
pub async fn run_scenario(
    scenario: &dyn Scenario,
    ctx: &ScenarioContext,
    opts: &ScenarioOptions,
) -> ScenarioResult {
    let start = Instant::now();
    let timeout = opts.timeout_or(DEFAULT_EXPECTATION_TIMEOUT);
    let mode = scenario.setup_mode();

    info!(
        scenario = scenario.name(),
        setup = ?mode,
        timeout_ms = timeout.as_millis(),
        "Starting scenario"
    );

    let shared_fixture = match mode {
        SetupMode::Once => Some(guarded(timeout, scenario.before(ctx)).await),
        SetupMode::Each => None,
    };
    if let Some(Err(e)) = &shared_fixture {
        warn!(scenario = scenario.name(), error = %e, "Setup failed");
    }

    let mut results = Vec::new();
    for expectation in scenario.expectations() {
        let started = Instant::now();

        let fixture = match &shared_fixture {
            Some(fixture) => fixture.clone(),
            None => guarded(timeout, scenario.before(ctx)).await,
        };

        let outcome = match fixture {
            Ok(fixture) => run_expectation(&expectation, ctx, &fixture, timeout).await,
            Err(e) => Outcome::errored(format!("setup failed: {e}")),
        };

        if outcome.is_passed() {
            debug!(scenario = scenario.name(), expectation = expectation.name, "Passed");
        } else {
            warn!(
                scenario = scenario.name(),
                expectation = expectation.name,
                outcome = %outcome,
                "Expectation FAILED"
            );
        }

        results.push(ExpectationResult::new(
            expectation.name,
            outcome,
            started.elapsed(),
        ));
    }

    let teardown = guarded(timeout, scenario.after(ctx)).await;
    let result = ScenarioResult::new(scenario.name(), scenario.title(), results, start.elapsed());

    let result = match teardown {
        Ok(()) => result,
        Err(e) => {
            error!(scenario = scenario.name(), error = %e, "Teardown failed");
            result.with_teardown_error(e)
        }
    };

    info!(
        scenario = scenario.name(),
        passed = result.passed,
        failed = result.failed_count(),
        duration_ms = result.duration.as_millis(),
        "Scenario complete"
    );

    result
}

async fn run_expectation(
    expectation: &Expectation,
    ctx: &ScenarioContext,
    fixture: &Fixture,
    timeout: Duration,
) -> Outcome {
    let check = AssertUnwindSafe((expectation.run)(ctx, fixture)).catch_unwind();

    match tokio::time::timeout(timeout, check).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(panic)) => Outcome::errored(ScenarioError::Panic(panic_message(panic)).to_string()),
        Err(_) => Outcome::errored(ScenarioError::Timeout(timeout).to_string()),
    }
}

/// Run a hook with a time bound, containing panics. Errors become strings so
/// a shared fixture result can be cloned into every expectation.
async fn guarded<T, F>(timeout: Duration, hook: F) -> Result<T, String>
where
    F: Future<Output = Result<T, ScenarioError>>,
{
    let hook = AssertUnwindSafe(hook).catch_unwind();

    match tokio::time::timeout(timeout, hook).await {
        Ok(Ok(result)) => result.map_err(|e| e.to_string()),
        Ok(Err(panic)) => Err(ScenarioError::Panic(panic_message(panic)).to_string()),
        Err(_) => Err(ScenarioError::Timeout(timeout).to_string()),
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
