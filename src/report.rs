//! Suite reports
//!
//! A [`SuiteReport`] collects every scenario's results. Reporters turn it into
//! the text printed at the end of a run or a JSON document for CI.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::time::Duration;

use crate::assert::Outcome;
use crate::scenarios::{ExpectationResult, ScenarioResult};

/// Results of a whole run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Collection endpoint the suite ran against
    pub endpoint: String,
    /// Whether every scenario passed
    pub passed: bool,
    pub scenarios: Vec<ScenarioResult>,
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
}

impl SuiteReport {
    pub fn new(
        endpoint: impl Into<String>,
        scenarios: Vec<ScenarioResult>,
        duration: Duration,
    ) -> Self {
        let passed = scenarios.iter().all(|s| s.passed);
        Self {
            endpoint: endpoint.into(),
            passed,
            scenarios,
            duration,
        }
    }

    pub fn passed_count(&self) -> usize {
        self.expectations().filter(|(_, e)| e.passed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.expectations().filter(|(_, e)| !e.passed()).count()
    }

    /// Every failing expectation with the scenario it belongs to
    pub fn failures(&self) -> impl Iterator<Item = (&ScenarioResult, &ExpectationResult)> {
        self.expectations().filter(|(_, e)| !e.passed())
    }

    fn expectations(&self) -> impl Iterator<Item = (&ScenarioResult, &ExpectationResult)> {
        self.scenarios
            .iter()
            .flat_map(|s| s.expectations.iter().map(move |e| (s, e)))
    }
}

/// Output format for a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Turns a finished report into output
pub trait Reporter {
    fn render(&self, report: &SuiteReport) -> Result<String, serde_json::Error>;
}

/// Reporter for the given format
pub fn reporter(format: ReportFormat) -> Box<dyn Reporter> {
    match format {
        ReportFormat::Text => Box::new(TextReporter),
        ReportFormat::Json => Box::new(JsonReporter),
    }
}

/// Human-readable tree of scenarios and expectations, followed by the
/// details of every failure
pub struct TextReporter;

impl Reporter for TextReporter {
    fn render(&self, report: &SuiteReport) -> Result<String, serde_json::Error> {
        let mut out = String::new();
        // Writing to a String cannot fail
        let _ = write_text(&mut out, report);
        Ok(out)
    }
}

fn write_text(out: &mut String, report: &SuiteReport) -> std::fmt::Result {
    writeln!(out, "Todo backend conformance: {}", report.endpoint)?;

    let mut failure_no = 0;
    for scenario in &report.scenarios {
        writeln!(out)?;
        writeln!(out, "  {}", scenario.title)?;
        for expectation in &scenario.expectations {
            if expectation.passed() {
                writeln!(
                    out,
                    "    ✓ {} ({}ms)",
                    expectation.name,
                    expectation.duration.as_millis()
                )?;
            } else {
                failure_no += 1;
                writeln!(out, "    {failure_no}) {}", expectation.name)?;
            }
        }
        if let Some(error) = &scenario.teardown_error {
            writeln!(out, "    ✗ teardown: {error}")?;
        }
    }

    writeln!(out)?;
    writeln!(
        out,
        "  {} passing, {} failing ({}ms)",
        report.passed_count(),
        report.failed_count(),
        report.duration.as_millis()
    )?;

    for (i, (scenario, expectation)) in report.failures().enumerate() {
        writeln!(out)?;
        writeln!(out, "  {}) {}", i + 1, scenario.title)?;
        writeln!(out, "       {}:", expectation.name)?;
        match &expectation.outcome {
            Outcome::Failed { expected, actual } => {
                writeln!(out, "     expected: {expected}")?;
                writeln!(out, "       actual: {actual}")?;
            }
            Outcome::Errored { message } => writeln!(out, "     error: {message}")?,
            Outcome::Passed => {}
        }
    }

    Ok(())
}

/// Pretty-printed JSON of the whole report
pub struct JsonReporter;

impl Reporter for JsonReporter {
    fn render(&self, report: &SuiteReport) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> SuiteReport {
        let create = ScenarioResult::new(
            "create",
            "Create Todo Item",
            vec![
                ExpectationResult::new(
                    "should return a 201 CREATED response",
                    Outcome::Passed,
                    Duration::from_millis(3),
                ),
                ExpectationResult::new(
                    "should receive a location hyperlink",
                    Outcome::failed("header.location to be a match", "no header.location"),
                    Duration::from_millis(1),
                ),
            ],
            Duration::from_millis(5),
        );
        let delete = ScenarioResult::new(
            "delete",
            "Delete Todo Item",
            vec![ExpectationResult::new(
                "should delete the item",
                Outcome::errored("HTTP request failed: connection refused"),
                Duration::from_millis(2),
            )],
            Duration::from_millis(2),
        )
        .with_teardown_error("Internal Server Error (500)");

        SuiteReport::new(
            "http://localhost:8000/todos",
            vec![create, delete],
            Duration::from_millis(9),
        )
    }

    #[test]
    fn test_counts() {
        let report = report();
        assert!(!report.passed);
        assert_eq!(report.passed_count(), 1);
        assert_eq!(report.failed_count(), 2);
        assert_eq!(report.failures().count(), 2);
    }

    #[test]
    fn test_empty_report_passes() {
        let report = SuiteReport::new("http://localhost:8000/todos", vec![], Duration::ZERO);
        assert!(report.passed);
        assert_eq!(report.failed_count(), 0);
    }

    #[test]
    fn test_text_report() {
        let text = TextReporter.render(&report()).unwrap();
        assert!(text.contains("Create Todo Item"));
        assert!(text.contains("✓ should return a 201 CREATED response"));
        assert!(text.contains("1) should receive a location hyperlink"));
        assert!(text.contains("expected: header.location to be a match"));
        assert!(text.contains("actual: no header.location"));
        assert!(text.contains("error: HTTP request failed: connection refused"));
        assert!(text.contains("teardown: Internal Server Error (500)"));
        assert!(text.contains("1 passing, 2 failing"));
    }

    #[test]
    fn test_json_report() {
        let json = JsonReporter.render(&report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["passed"], false);
        assert_eq!(value["scenarios"][0]["title"], "Create Todo Item");
        assert_eq!(
            value["scenarios"][0]["expectations"][1]["outcome"]["status"],
            "failed"
        );
        assert_eq!(value["scenarios"][1]["teardown_error"], "Internal Server Error (500)");

        let parsed: SuiteReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.scenarios.len(), 2);
    }
}
