//! todocheck CLI
//!
//! Run the todo backend contract against a running server.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use todocheck::config::Config;
use todocheck::report::{ReportFormat, reporter};
use todocheck::scenarios::{Runner, SCENARIOS, Scenario};

/// todocheck - conformance suite for todo-list backends
#[derive(Debug, Parser)]
#[command(name = "todocheck")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run scenarios against a backend
    Run {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<String>,

        /// Collection endpoint (overrides the config file)
        #[arg(short, long, env = "URL")]
        url: Option<String>,

        /// Specific scenarios to run (comma-separated)
        #[arg(short, long)]
        scenarios: Option<String>,

        /// Per-request timeout (e.g. 10s, 500ms)
        #[arg(short, long)]
        timeout: Option<String>,

        /// Report format
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,

        /// Write the report to this file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Generate a default configuration file
    Init {
        /// Output file path
        #[arg(short, long, default_value = "todocheck.yaml")]
        output: String,
    },

    /// List available scenarios
    List,

    /// Validate a configuration file
    Validate {
        /// Path to configuration file
        #[arg(short, long, default_value = "todocheck.yaml")]
        config: String,
    },
}

fn setup_logging(verbose: bool, json: bool) {
    let env_filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // Logs go to stderr so the report on stdout stays clean
    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.json);

    match cli.command {
        Commands::Run {
            config,
            url,
            scenarios,
            timeout,
            format,
            output,
        } => {
            run_scenarios(
                config.as_deref(),
                url,
                scenarios.as_deref(),
                timeout.as_deref(),
                format,
                output.as_deref(),
            )
            .await
        }

        Commands::Init { output } => init_config(&output),

        Commands::List => {
            list_scenarios();
            Ok(())
        }

        Commands::Validate { config } => validate_config(&config),
    }
}

/// Run scenarios against the configured backend
async fn run_scenarios(
    config_path: Option<&str>,
    url: Option<String>,
    scenario_filter: Option<&str>,
    timeout: Option<&str>,
    format: ReportFormat,
    output: Option<&str>,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => {
            tracing::info!(config = %path, "Loading configuration");
            Config::from_file(path).with_context(|| format!("Failed to load config from {path}"))?
        }
        None => Config::default(),
    };

    if let Some(url) = url {
        config = config.with_url(url);
    }
    if let Some(timeout) = timeout {
        let timeout: Duration = humantime::parse_duration(timeout)
            .with_context(|| format!("Invalid timeout '{timeout}'"))?;
        config.endpoint.timeout = Some(timeout);
    }
    config.validate().context("Invalid configuration")?;

    let ctx = config
        .to_scenario_context()
        .context("Failed to create scenario context")?;

    tracing::info!(
        endpoint = %ctx.collection_url(),
        timeout_ms = ctx.client.timeout().as_millis(),
        "Backend configured"
    );

    // Determine which scenarios to run
    let selected: Vec<Arc<dyn Scenario>> = if let Some(filter) = scenario_filter {
        filter
            .split(',')
            .filter_map(|name| {
                let name = name.trim();
                SCENARIOS.get(name).cloned().or_else(|| {
                    tracing::warn!(scenario = name, "Unknown scenario, skipping");
                    None
                })
            })
            .collect()
    } else {
        SCENARIOS
            .iter()
            .filter(|(name, _)| config.is_scenario_enabled(name))
            .map(|(_, scenario)| scenario.clone())
            .collect()
    };

    if selected.is_empty() {
        tracing::warn!("No scenarios to run");
        return Ok(());
    }

    let mut runner = Runner::new(ctx);
    for scenario in selected {
        let opts = config
            .scenario_config(scenario.name())
            .map(|c| c.to_scenario_options(&scenario.default_options()))
            .unwrap_or_else(|| scenario.default_options());
        runner.add(scenario, opts);
    }

    let report = runner.run().await;
    let rendered = reporter(format)
        .render(&report)
        .context("Failed to render report")?;

    match output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write report to {path}"))?;
            tracing::info!(path = %path, "Report written");
        }
        None => println!("{rendered}"),
    }

    if report.passed {
        Ok(())
    } else {
        anyhow::bail!("{} expectation(s) FAILED", report.failed_count())
    }
}

/// Generate a default configuration file
fn init_config(output: &str) -> Result<()> {
    let config = Config::default_config();
    let yaml = config.to_yaml().context("Failed to serialize config")?;

    std::fs::write(output, &yaml).with_context(|| format!("Failed to write config to {output}"))?;

    tracing::info!(path = %output, "Configuration file created");
    println!("Created {output}");
    println!();
    println!("Point it at your backend, then run:");
    println!("  todocheck run --config {output}");

    Ok(())
}

/// List available scenarios
fn list_scenarios() {
    println!("Available scenarios:");
    println!();

    for (name, scenario) in SCENARIOS.iter() {
        println!("  {name:10} - {} ({})", scenario.title(), scenario.description());
        for expectation in scenario.expectations() {
            println!("  {:10}     * {}", "", expectation.name);
        }
    }

    println!();
    println!("Run specific scenarios with:");
    println!("  todocheck run --scenarios create,delete");
}

/// Validate a configuration file
fn validate_config(config_path: &str) -> Result<()> {
    tracing::info!(config = %config_path, "Validating configuration");

    let config = Config::from_file(config_path)
        .with_context(|| format!("Failed to load config from {config_path}"))?;

    println!("Configuration is valid!");
    println!();
    println!("Endpoint: {}", config.endpoint.url);
    println!(
        "Request timeout: {}",
        humantime::format_duration(config.endpoint.timeout_or_default())
    );
    println!("Title: {}", config.title);
    println!();

    for name in SCENARIOS.keys() {
        let status = if config.is_scenario_enabled(name) {
            "enabled"
        } else {
            "disabled"
        };
        println!("  - {name}: {status}");
    }

    for name in config.scenarios.keys() {
        if !SCENARIOS.contains_key(name.as_str()) {
            println!("  - {name}: unknown scenario (ignored)");
        }
    }

    Ok(())
}
