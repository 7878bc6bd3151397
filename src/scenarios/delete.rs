//! Delete Todo Item
//!
//! Each expectation deletes its own freshly created item; deletion is the
//! behaviour under test, so there is no teardown.

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;

use super::traits::{Expectation, Fixture, Scenario, ScenarioContext, ScenarioError, SetupMode};
use crate::assert::{Outcome, expect};

/// Text a follow-up `GET` on a deleted item must be rejected with
pub const NOT_FOUND: &str = "Not Found";

/// Item deletion
pub struct DeleteScenario;

#[async_trait]
impl Scenario for DeleteScenario {
    fn name(&self) -> &'static str {
        "delete"
    }

    fn title(&self) -> &'static str {
        "Delete Todo Item"
    }

    fn description(&self) -> &'static str {
        "DELETE returns 204 and the item is gone afterwards"
    }

    fn setup_mode(&self) -> SetupMode {
        SetupMode::Each
    }

    async fn before(&self, ctx: &ScenarioContext) -> Result<Fixture, ScenarioError> {
        ctx.create_item().await
    }

    fn expectations(&self) -> Vec<Expectation> {
        vec![
            Expectation::new("should return a 204 NO CONTENT response", returns_no_content),
            Expectation::new("should delete the item", deletes_item),
        ]
    }
}

fn returns_no_content<'a>(
    ctx: &'a ScenarioContext,
    fixture: &'a Fixture,
) -> BoxFuture<'a, Outcome> {
    async move {
        let location = match fixture.location().await {
            Ok(location) => location,
            Err(e) => return Outcome::errored(e.to_string()),
        };

        let result = ctx.client.del(&location);
        expect(&result).status().to_equal(204).await
    }
    .boxed()
}

fn deletes_item<'a>(ctx: &'a ScenarioContext, fixture: &'a Fixture) -> BoxFuture<'a, Outcome> {
    async move {
        let location = match fixture.location().await {
            Ok(location) => location,
            Err(e) => return Outcome::errored(e.to_string()),
        };

        let client = ctx.client.clone();
        let result = ctx
            .client
            .del(&location)
            .and_then(move |_| client.get(&location));
        expect(&result).to_be_rejected_with(NOT_FOUND).await
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_metadata() {
        let scenario = DeleteScenario;
        assert_eq!(scenario.name(), "delete");
        assert_eq!(scenario.setup_mode(), SetupMode::Each);
        assert_eq!(scenario.expectations().len(), 2);
    }

    #[tokio::test]
    async fn test_no_teardown() {
        let ctx = ScenarioContext::new(
            crate::client::TodoClient::new(std::time::Duration::from_secs(1)).unwrap(),
            "http://127.0.0.1:9/todos".parse().unwrap(),
        );
        assert!(DeleteScenario.after(&ctx).await.is_ok());
    }
}
