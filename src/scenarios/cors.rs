//! Cross Origin Requests
//!
//! Sends a preflight-style `OPTIONS` to the collection with an `Origin`
//! header and checks the CORS response headers. The policy must be
//! origin-independent: `Access-Control-Allow-Origin` is always `*`.

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;

use super::traits::{Expectation, Fixture, Scenario, ScenarioContext, ScenarioError, SetupMode};
use crate::assert::{Outcome, expect};

/// Headers every CORS response must carry
pub const CORS_HEADERS: [&str; 3] = [
    "access-control-allow-origin",
    "access-control-allow-methods",
    "access-control-allow-headers",
];

/// CORS support on the collection endpoint
pub struct CorsScenario;

#[async_trait]
impl Scenario for CorsScenario {
    fn name(&self) -> &'static str {
        "cors"
    }

    fn title(&self) -> &'static str {
        "Cross Origin Requests"
    }

    fn description(&self) -> &'static str {
        "OPTIONS on the collection returns wildcard CORS headers"
    }

    fn setup_mode(&self) -> SetupMode {
        SetupMode::Once
    }

    async fn before(&self, ctx: &ScenarioContext) -> Result<Fixture, ScenarioError> {
        Fixture::settle(ctx.client.options(ctx.collection_url(), &ctx.origin)).await
    }

    fn expectations(&self) -> Vec<Expectation> {
        vec![
            Expectation::new("should return the correct CORS headers", returns_cors_headers),
            Expectation::new("should allow all origins", allows_all_origins),
        ]
    }
}

fn returns_cors_headers<'a>(
    _ctx: &'a ScenarioContext,
    fixture: &'a Fixture,
) -> BoxFuture<'a, Outcome> {
    expect(fixture.response())
        .headers()
        .to_contain_keys(&CORS_HEADERS)
        .boxed()
}

fn allows_all_origins<'a>(
    _ctx: &'a ScenarioContext,
    fixture: &'a Fixture,
) -> BoxFuture<'a, Outcome> {
    expect(fixture.response())
        .header("access-control-allow-origin")
        .to_equal("*")
        .boxed()
}
