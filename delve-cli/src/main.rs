//! Delve CLI - instrumented research agent
//!
//! A command-line interface for running research, evaluations and the
//! end-to-end smoke check.

#![allow(clippy::print_stdout)] // CLI program intentionally uses stdout

mod config;
mod error;
mod smoke;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use delve::chat::SharedChatProvider;
use delve::eval::{EvaluationClient, EvaluationExample, ScorerConfig, ScorerKind};
use delve::llms::OpenAI;
use delve::observe::Tracer;
use delve::research::{Depth, ResearchAgent};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::config::{DelveConfig, config_path, load_config_from};
use crate::error::{CliError, Result};

const PREVIEW_CHARS: usize = 500;

/// Delve - research agent with span tracing and online evaluation
#[derive(Parser)]
#[command(name = "delve")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file path
    #[arg(short, long, env = "DELVE_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Research a single topic
    Research(ResearchArgs),

    /// Research several topics in turn
    Batch(BatchArgs),

    /// Score the sample example with every built-in scorer
    Evaluate(EvaluateArgs),

    /// Run the end-to-end smoke checks
    Check,

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for the research command
#[derive(Args)]
struct ResearchArgs {
    /// Topic to research
    topic: String,

    /// Report depth (basic or comprehensive)
    #[arg(short, long)]
    depth: Option<Depth>,

    /// Model to use (overrides config)
    #[arg(short, long)]
    model: Option<String>,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,
}

/// Arguments for the batch command
#[derive(Args)]
struct BatchArgs {
    /// Topics to research (defaults to the configured topics)
    topics: Vec<String>,

    /// Report depth (basic or comprehensive)
    #[arg(short, long, default_value = "comprehensive")]
    depth: Depth,

    /// Model to use (overrides config)
    #[arg(short, long)]
    model: Option<String>,
}

/// Arguments for the evaluate command
#[derive(Args)]
struct EvaluateArgs {
    /// Threshold applied to every scorer
    #[arg(short, long, default_value_t = ScorerKind::DEFAULT_THRESHOLD)]
    threshold: f64,

    /// Judge model (overrides config)
    #[arg(short, long)]
    model: Option<String>,
}

/// Arguments for the config command
#[derive(Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration (secrets masked)
    Show,
    /// Show configuration file path
    Path,
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbose);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("failed to create tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging with the given verbosity level.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "delve={level},delve_cli={level},{}",
            if verbosity >= 2 { "debug" } else { "warn" }
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let path = cli.config.unwrap_or_else(config_path);
    let config = load_config_from(&path).await?;

    match cli.command {
        Commands::Research(args) => cmd_research(args, &config).await,
        Commands::Batch(args) => cmd_batch(args, &config).await,
        Commands::Evaluate(args) => cmd_evaluate(args, &config).await,
        Commands::Check => cmd_check(&config).await,
        Commands::Config(args) => cmd_config(&args, &config, &path),
    }
}

/// Build the traced research agent from configuration.
fn build_agent(config: &DelveConfig, model: Option<String>) -> Result<ResearchAgent> {
    let collector = config.collector.build()?;
    let tracer = Tracer::new(&config.research.project_name, collector)?;
    let provider: SharedChatProvider = Arc::new(OpenAI::new(config.backend.to_openai_config()?)?);
    let model = model.unwrap_or_else(|| config.backend.model.clone());

    tracing::info!(model = %model, project = %config.research.project_name, "Using OpenAI backend");

    Ok(ResearchAgent::new(tracer, provider)
        .with_model(model)
        .with_evaluation_model(&config.evaluation.model)
        .with_scorers(config.report_scorers()))
}

/// Research one topic.
async fn cmd_research(args: ResearchArgs, config: &DelveConfig) -> Result<()> {
    let agent = build_agent(config, args.model)?;
    let depth = args.depth.unwrap_or(config.research.depth);

    let result = agent.research_topic(&args.topic, depth).await;
    agent.tracer().flush().await;
    let report = result?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Research Report: {} ({})\n", report.topic, report.depth);
        println!("Summary:\n{}\n", report.summary);
        println!("{}", report.research_report);
    }
    Ok(())
}

/// Research several topics, printing a preview of each report.
async fn cmd_batch(args: BatchArgs, config: &DelveConfig) -> Result<()> {
    let agent = build_agent(config, args.model)?;
    let topics = if args.topics.is_empty() {
        config.research.topics.clone()
    } else {
        args.topics
    };

    let rule = "=".repeat(50);
    let mut failures = 0_usize;
    for topic in &topics {
        println!("\n{rule}");
        println!("Researching: {topic}");
        println!("{rule}");

        match agent.research_topic(topic, args.depth).await {
            Ok(report) => {
                println!(
                    "Research Report:\n{}...",
                    preview(&report.research_report, PREVIEW_CHARS)
                );
            }
            Err(e) => {
                failures += 1;
                println!("Research failed: {e}");
            }
        }
    }
    agent.tracer().flush().await;

    if failures == topics.len() && !topics.is_empty() {
        return Err(CliError::failed("every topic failed"));
    }
    Ok(())
}

/// Score the sample renewable-energy example.
async fn cmd_evaluate(args: EvaluateArgs, config: &DelveConfig) -> Result<()> {
    let client = EvaluationClient::new(&config.evaluation.project_name, config.collector.build()?);
    let model = args.model.unwrap_or_else(|| config.evaluation.model.clone());

    let example = EvaluationExample::new(
        "What are the benefits of renewable energy?",
        "Renewable energy reduces greenhouse gas emissions, creates jobs, and provides energy independence.",
    )
    .with_expected_output("Benefits include environmental protection and economic advantages.")
    .with_retrieval_context([
        "Renewable energy sources produce minimal emissions compared to fossil fuels.",
    ]);

    let scorers = ScorerKind::ALL
        .into_iter()
        .map(|kind| ScorerConfig::new(kind, args.threshold))
        .collect();

    println!("Running evaluation with {} scorers...", ScorerKind::ALL.len());
    let results = client.run_evaluation(vec![example], scorers, &model).await?;

    println!("\nResults:");
    for result in &results.results {
        println!("  {result}");
    }
    println!(
        "\n{} of {} passed",
        results.len() - results.failures().len(),
        results.len()
    );
    Ok(())
}

/// Run the smoke checks.
async fn cmd_check(config: &DelveConfig) -> Result<()> {
    let agent = build_agent(config, None)?;
    let client = EvaluationClient::new(&config.evaluation.project_name, config.collector.build()?);

    println!("Running delve smoke checks");
    println!("{}", "=".repeat(50));

    let checks = smoke::run_checks(&agent, &client, &config.evaluation.model).await;
    agent.tracer().flush().await;

    println!("\nSummary:");
    for check in &checks {
        println!("  {check}");
    }

    let passed = checks.iter().filter(|c| c.passed()).count();
    println!("\n{passed} of {} checks passed", checks.len());

    if passed == 0 {
        return Err(CliError::failed("every smoke check failed"));
    }
    Ok(())
}

/// Configuration management.
fn cmd_config(args: &ConfigArgs, config: &DelveConfig, path: &std::path::Path) -> Result<()> {
    match args.command {
        ConfigCommands::Path => {
            println!("{}", path.display());
        }
        ConfigCommands::Show => {
            if !path.exists() {
                println!("# {} does not exist, showing defaults", path.display());
            }
            println!("{}", config.to_masked_toml()?);
        }
    }
    Ok(())
}

/// First `max` characters of `text`.
fn preview(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
