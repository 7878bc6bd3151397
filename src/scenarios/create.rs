//! Create Todo Item
//!
//! POSTs one item and checks the creation response, then follows the
//! returned `Location` to confirm the item round-trips.
//!
//! ## Teardown
//!
//! `DELETE` on the collection, which removes every item.

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;

use super::traits::{Expectation, Fixture, Scenario, ScenarioContext, ScenarioError, SetupMode};
use crate::assert::{LOCATION_RE, Outcome, expect};
use crate::client::{ClientError, ResponseHandle};

/// Item creation and retrieval
pub struct CreateScenario;

#[async_trait]
impl Scenario for CreateScenario {
    fn name(&self) -> &'static str {
        "create"
    }

    fn title(&self) -> &'static str {
        "Create Todo Item"
    }

    fn description(&self) -> &'static str {
        "POST returns 201 with a Location that serves the new item"
    }

    fn setup_mode(&self) -> SetupMode {
        SetupMode::Once
    }

    async fn before(&self, ctx: &ScenarioContext) -> Result<Fixture, ScenarioError> {
        Fixture::settle(ctx.client.create(ctx.collection_url(), &ctx.title)).await
    }

    fn expectations(&self) -> Vec<Expectation> {
        vec![
            Expectation::new("should return a 201 CREATED response", returns_created),
            Expectation::new("should receive a location hyperlink", returns_location),
            Expectation::new("should create the item", creates_item),
        ]
    }

    async fn after(&self, ctx: &ScenarioContext) -> Result<(), ScenarioError> {
        ctx.clear_collection().await
    }
}

fn returns_created<'a>(_ctx: &'a ScenarioContext, fixture: &'a Fixture) -> BoxFuture<'a, Outcome> {
    expect(fixture.response()).status().to_equal(201).boxed()
}

fn returns_location<'a>(_ctx: &'a ScenarioContext, fixture: &'a Fixture) -> BoxFuture<'a, Outcome> {
    expect(fixture.response())
        .header("location")
        .to_match(&LOCATION_RE)
        .boxed()
}

fn creates_item<'a>(ctx: &'a ScenarioContext, fixture: &'a Fixture) -> BoxFuture<'a, Outcome> {
    let client = ctx.client.clone();
    let item = fixture.response().and_then(move |created| match created.location() {
        Some(location) => client.get(location),
        None => ResponseHandle::ready(Err(ClientError::MissingHeader("Location"))),
    });

    async move {
        expect(&item)
            .body_field("title")
            .to_equal(ctx.title.as_str())
            .await
    }
    .boxed()
}
