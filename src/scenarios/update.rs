//! Update Todo Item
//!
//! Each expectation gets a freshly created item and updates it with one
//! method. `PUT` and `PATCH` must both reach the same target state.

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;

use super::traits::{Expectation, Fixture, Scenario, ScenarioContext, ScenarioError, SetupMode};
use crate::assert::{Outcome, expect};
use crate::client::{Method, TodoUpdate};

/// Full and partial updates
pub struct UpdateScenario;

#[async_trait]
impl Scenario for UpdateScenario {
    fn name(&self) -> &'static str {
        "update"
    }

    fn title(&self) -> &'static str {
        "Update Todo Item"
    }

    fn description(&self) -> &'static str {
        "PUT and PATCH with {completed: true} are reflected in the response"
    }

    fn setup_mode(&self) -> SetupMode {
        SetupMode::Each
    }

    async fn before(&self, ctx: &ScenarioContext) -> Result<Fixture, ScenarioError> {
        ctx.create_item().await
    }

    fn expectations(&self) -> Vec<Expectation> {
        vec![
            Expectation::new("should have completed set to true after PUT update", put_completes),
            Expectation::new(
                "should have completed set to true after a PATCH update",
                patch_completes,
            ),
        ]
    }

    async fn after(&self, ctx: &ScenarioContext) -> Result<(), ScenarioError> {
        ctx.clear_collection().await
    }
}

fn put_completes<'a>(ctx: &'a ScenarioContext, fixture: &'a Fixture) -> BoxFuture<'a, Outcome> {
    completes_with(ctx, fixture, Method::Put).boxed()
}

fn patch_completes<'a>(ctx: &'a ScenarioContext, fixture: &'a Fixture) -> BoxFuture<'a, Outcome> {
    completes_with(ctx, fixture, Method::Patch).boxed()
}

async fn completes_with(ctx: &ScenarioContext, fixture: &Fixture, method: Method) -> Outcome {
    let location = match fixture.location().await {
        Ok(location) => location,
        Err(e) => return Outcome::errored(e.to_string()),
    };

    let result = ctx
        .client
        .update(&location, method, &TodoUpdate::completed(true));
    expect(&result).body_field("completed").to_equal(true).await
}
