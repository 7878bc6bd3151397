//! End-to-end runs of the suite against the in-process mock backend.

use std::time::Duration;

use todocheck::assert::Outcome;
use todocheck::config::Config;
use todocheck::report::{JsonReporter, Reporter, SuiteReport, TextReporter};
use todocheck::scenarios::{
    CorsScenario, CreateScenario, Runner, SCENARIOS, ScenarioContext, ScenarioOptions,
    run_scenario,
};
use todocheck_testkit::{MockBackend, MockBehavior, PseudoGenerator};

fn context(url: &str) -> ScenarioContext {
    Config::default()
        .with_url(url)
        .to_scenario_context()
        .unwrap()
}

fn short_timeouts() -> ScenarioOptions {
    ScenarioOptions {
        timeout: Some(Duration::from_secs(5)),
    }
}

async fn run_suite(ctx: ScenarioContext) -> SuiteReport {
    let mut runner = Runner::new(ctx);
    for scenario in SCENARIOS.values() {
        runner.add(scenario.clone(), short_timeouts());
    }
    runner.run().await
}

async fn run_against(behavior: MockBehavior) -> (MockBackend, SuiteReport) {
    let backend = MockBackend::start_with(behavior).await.unwrap();
    let report = run_suite(context(&backend.url())).await;
    (backend, report)
}

fn outcome<'a>(report: &'a SuiteReport, scenario: &str, expectation: &str) -> &'a Outcome {
    report
        .scenarios
        .iter()
        .find(|s| s.name == scenario)
        .and_then(|s| s.expectations.iter().find(|e| e.name == expectation))
        .map(|e| &e.outcome)
        .unwrap_or_else(|| panic!("no result for {scenario} / {expectation}"))
}

fn scenario_passed(report: &SuiteReport, scenario: &str) -> bool {
    report
        .scenarios
        .iter()
        .find(|s| s.name == scenario)
        .map(|s| s.passed)
        .unwrap_or_else(|| panic!("no result for {scenario}"))
}

#[tokio::test]
async fn conformant_backend_passes_everything() {
    let (backend, report) = run_against(MockBehavior::default()).await;

    let failures: Vec<_> = report
        .failures()
        .map(|(s, e)| format!("{} / {}: {}", s.name, e.name, e.outcome))
        .collect();
    assert!(report.passed, "unexpected failures: {failures:#?}");
    assert_eq!(report.passed_count(), 9);
    assert_eq!(report.endpoint, backend.url());

    // Every scenario that creates items cleans them up
    assert_eq!(backend.item_count().await, 0);
}

#[tokio::test]
async fn report_lists_scenarios_in_registry_order() {
    let (_backend, report) = run_against(MockBehavior::default()).await;

    let names: Vec<_> = report.scenarios.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["cors", "create", "update", "delete"]);

    let text = TextReporter.render(&report).unwrap();
    assert!(text.contains("Cross Origin Requests"));
    assert!(text.contains("✓ should allow all origins"));
    assert!(text.contains("9 passing, 0 failing"));

    let json = JsonReporter.render(&report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["passed"], true);
}

#[tokio::test]
async fn missing_cors_fails_only_cors() {
    let (_backend, report) = run_against(MockBehavior::default().with_cors(false)).await;

    assert!(!scenario_passed(&report, "cors"));
    assert!(
        !outcome(&report, "cors", "should return the correct CORS headers").is_passed()
    );
    assert!(!outcome(&report, "cors", "should allow all origins").is_passed());

    assert!(scenario_passed(&report, "create"));
    assert!(scenario_passed(&report, "update"));
    assert!(scenario_passed(&report, "delete"));
}

#[tokio::test]
async fn missing_location_fails_location_check() {
    let (_backend, report) =
        run_against(MockBehavior::default().with_location_header(false)).await;

    assert_eq!(
        outcome(&report, "create", "should return a 201 CREATED response"),
        &Outcome::Passed
    );
    assert!(matches!(
        outcome(&report, "create", "should receive a location hyperlink"),
        Outcome::Failed { actual, .. } if actual == "no header.location"
    ));
    assert!(!outcome(&report, "create", "should create the item").is_passed());

    // Without a Location there is nothing to update or delete
    assert!(!scenario_passed(&report, "update"));
    assert!(!scenario_passed(&report, "delete"));
}

#[tokio::test]
async fn ignored_updates_fail_update_checks() {
    let (_backend, report) = run_against(MockBehavior::default().with_updates(false)).await;

    for name in [
        "should have completed set to true after PUT update",
        "should have completed set to true after a PATCH update",
    ] {
        match outcome(&report, "update", name) {
            Outcome::Failed { expected, actual } => {
                assert_eq!(expected, "body.completed to be true");
                assert_eq!(actual, "false");
            }
            other => panic!("{name}: expected failure, got {other:?}"),
        }
    }
    assert!(scenario_passed(&report, "create"));
    assert!(scenario_passed(&report, "delete"));
}

#[tokio::test]
async fn missing_patch_fails_only_patch() {
    let (_backend, report) = run_against(MockBehavior::default().with_patch(false)).await;

    assert!(
        outcome(&report, "update", "should have completed set to true after PUT update")
            .is_passed()
    );
    assert!(matches!(
        outcome(&report, "update", "should have completed set to true after a PATCH update"),
        Outcome::Failed { expected, actual }
            if expected == "body.completed to be true" && actual == "Method Not Allowed (405)"
    ));
}

#[tokio::test]
async fn kept_items_fail_delete_check() {
    let (_backend, report) = run_against(MockBehavior::default().with_deletes(false)).await;

    assert!(outcome(&report, "delete", "should return a 204 NO CONTENT response").is_passed());
    match outcome(&report, "delete", "should delete the item") {
        Outcome::Failed { expected, actual } => {
            assert_eq!(expected, "rejection containing \"Not Found\"");
            assert_eq!(actual, "response with status 200");
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_backend_reports_errors() {
    // Bind then release a port so nothing is listening on it
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let report = run_suite(context(&format!("http://{addr}/todos"))).await;

    assert!(!report.passed);
    assert_eq!(report.passed_count(), 0);
    for scenario in &report.scenarios {
        for expectation in &scenario.expectations {
            // Attributed to setup whether it runs once or per expectation
            assert!(
                matches!(
                    &expectation.outcome,
                    Outcome::Errored { message } if message.starts_with("setup failed:")
                ),
                "{} / {}: {:?}",
                scenario.name,
                expectation.name,
                expectation.outcome
            );
        }
    }

    // Teardown against a dead backend fails the scenario too
    let create = report.scenarios.iter().find(|s| s.name == "create").unwrap();
    assert!(create.teardown_error.is_some());
}

#[tokio::test]
async fn cors_policy_does_not_depend_on_origin() {
    let backend = MockBackend::start().await.unwrap();

    for origin in ["http://someplace.com", "https://elsewhere.example:8443"] {
        let ctx = context(&backend.url()).with_origin(origin);
        let result = run_scenario(&CorsScenario, &ctx, &short_timeouts()).await;
        assert!(result.passed, "{origin}: {result:?}");
    }
}

#[tokio::test]
async fn create_round_trips_configured_title() {
    let backend = MockBackend::start().await.unwrap();
    let mut rng = PseudoGenerator::new(7);
    let title = rng.random_title();

    let ctx = context(&backend.url()).with_title(title.clone());
    let result = run_scenario(&CreateScenario, &ctx, &short_timeouts()).await;
    assert!(result.passed, "{result:?}");

    let config = Config::from_yaml(&format!(
        "endpoint:\n  url: {}\ntitle: \"{title}\"\n",
        backend.url()
    ))
    .unwrap();
    assert_eq!(config.to_scenario_context().unwrap().title, title);
}

#[tokio::test]
async fn create_checks_its_own_item() {
    let backend = MockBackend::start().await.unwrap();
    let ctx = context(&backend.url());

    // An item the scenario did not create
    ctx.create_item().await.unwrap();
    let result = run_scenario(&CreateScenario, &ctx, &short_timeouts()).await;

    assert!(result.passed, "{result:?}");
    assert_eq!(backend.item_count().await, 0);
}
