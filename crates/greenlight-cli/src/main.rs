//! GreenLight CLI - Baseline compatibility checks for pull requests.

use anyhow::{Context, Result};
use clap::Parser;
use greenlight_cli::cli::analyze::{run_analyze, AnalyzeOptions, DiffInput};
use greenlight_cli::cli::check::{run_check, CheckOptions};
use greenlight_cli::cli::outputs::ActionOutputs;
use greenlight_cli::formatters::OutputFormat;
use greenlight_config::{parse_repository, ActionContext, ActionInputs, ConfigManager, ResolvedConfig};
use greenlight_core::CacheSet;
use greenlight_github::{GitHubClient, GITHUB_API_URL, GITHUB_SERVER_URL};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const DEFAULT_RATE_LIMIT: u32 = 10;

#[derive(Parser, Debug)]
#[command(name = "greenlight")]
#[command(version, about = "Baseline compatibility checks for pull request diffs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose logging (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Check a pull request and report to GitHub (GitHub Action mode)
    Check(CheckArgs),

    /// Analyze a local unified diff
    ///
    /// Examples:
    ///   git diff main | greenlight analyze -
    ///   greenlight analyze pr.diff --output markdown
    Analyze(AnalyzeArgs),
}

/// Settings shared by every command
#[derive(clap::Args, Debug)]
struct ConfigArgs {
    /// Configuration file path (defaults to ./greenlight.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Baseline year to target
    #[arg(long, env = "INPUT_BASELINE-YEAR")]
    baseline_year: Option<String>,

    /// Fail the check on newly available features
    #[arg(long, env = "INPUT_BLOCK-NEWLY-AVAILABLE", value_name = "BOOL")]
    block_newly_available: Option<String>,

    /// Fail the check on features with limited availability
    #[arg(long, env = "INPUT_BLOCK-LIMITED-AVAILABILITY", value_name = "BOOL")]
    block_limited_availability: Option<String>,

    /// Minimum browser versions as JSON, e.g. '{"chrome": "110"}'
    #[arg(long, env = "INPUT_CUSTOM-BROWSER-TARGETS", value_name = "JSON")]
    custom_browser_targets: Option<String>,
}

#[derive(clap::Args, Debug)]
struct CheckArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// GitHub token (falls back to GITHUB_TOKEN)
    #[arg(long, env = "INPUT_GITHUB-TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Repository as owner/name (defaults to GITHUB_REPOSITORY)
    #[arg(long, requires_all = ["pr", "sha"])]
    repo: Option<String>,

    /// Pull request number (defaults to the event payload)
    #[arg(long, requires_all = ["repo", "sha"])]
    pr: Option<u64>,

    /// Head commit SHA (defaults to the event payload)
    #[arg(long, requires_all = ["repo", "pr"])]
    sha: Option<String>,

    /// GitHub REST API root
    #[arg(long, env = "GITHUB_API_URL", default_value = GITHUB_API_URL)]
    api_url: String,

    /// GitHub web host used for status links
    #[arg(long, env = "GITHUB_SERVER_URL", default_value = GITHUB_SERVER_URL)]
    server_url: String,

    /// Maximum GitHub API requests per second
    #[arg(long, default_value_t = DEFAULT_RATE_LIMIT)]
    rate_limit: u32,
}

#[derive(clap::Args, Debug)]
struct AnalyzeArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Diff file to analyze, or - for stdin
    #[arg(value_name = "DIFF")]
    diff: PathBuf,

    /// Output format
    #[arg(short, long = "output", value_enum, default_value = "human")]
    format: OutputFormat,

    /// Exit successfully even when blocking issues are found
    #[arg(long)]
    no_fail: bool,
}

impl ConfigArgs {
    fn inputs(&self) -> ActionInputs {
        ActionInputs {
            baseline_year: self.baseline_year.clone(),
            block_newly_available: self.block_newly_available.clone(),
            block_limited_availability: self.block_limited_availability.clone(),
            custom_browser_targets: self.custom_browser_targets.clone(),
        }
    }

    async fn resolve(&self) -> Result<ResolvedConfig> {
        let working_dir = std::env::current_dir().context("Failed to get current working directory")?;
        let manager = ConfigManager::discover(self.config.as_deref(), &working_dir)
            .await
            .map_err(greenlight_core::Error::from)?;
        if let Some(path) = manager.config_path() {
            tracing::info!(path = %path.display(), "using config file");
        }

        let resolved = manager.resolve(&self.inputs()).map_err(greenlight_core::Error::from)?;
        let baseline = &resolved.baseline;
        tracing::info!(
            target_year = %baseline.target_year,
            block_newly_available = baseline.block_newly_available,
            block_limited_availability = baseline.block_limited_availability,
            custom_targets = baseline.custom_targets.as_ref().map_or(0, |t| t.len()),
            "resolved configuration"
        );
        Ok(resolved)
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn check(args: CheckArgs) -> Result<bool> {
    let config = args.config.resolve().await?;

    let token = args
        .token
        .filter(|t| !t.trim().is_empty())
        .or_else(|| std::env::var("GITHUB_TOKEN").ok())
        .ok_or_else(|| greenlight_core::Error::configuration("Input required and not supplied: github-token"))?;

    let context = match (&args.repo, args.pr, &args.sha) {
        (Some(repo), Some(pr), Some(sha)) => {
            let (owner, name) = parse_repository(repo)?;
            ActionContext::new(&owner, &name, pr, sha.as_str())
        }
        _ => ActionContext::from_env().await?,
    };

    let caches = CacheSet::new();
    let host = GitHubClient::with_api_url(token, &args.api_url)
        .and_then(|client| client.with_rate_limit(args.rate_limit))
        .map_err(greenlight_core::Error::from)?
        .with_server_url(args.server_url)
        .with_comment_cache(caches.api.clone());

    let options = CheckOptions {
        context,
        config: config.baseline.clone(),
        outputs: ActionOutputs::from_env(),
    };
    let report = run_check(&host, Arc::new(config.dataset_loader()), &caches, &options).await?;

    if report.has_blocking() {
        tracing::error!("Found {} blocking compatibility issues", report.blocking_count);
        return Ok(false);
    }
    tracing::info!("All checks passed");
    Ok(true)
}

async fn analyze(args: AnalyzeArgs) -> Result<bool> {
    let config = args.config.resolve().await?;
    let options = AnalyzeOptions {
        input: DiffInput::from_arg(&args.diff),
        config: config.baseline.clone(),
        format: args.format,
    };

    let report = run_analyze(Arc::new(config.dataset_loader()), &options).await?;
    Ok(args.no_fail || !report.has_blocking())
}

/// Print a failed run for the person reading the job log
fn report_error(error: &anyhow::Error) {
    match error.downcast_ref::<greenlight_core::Error>() {
        Some(e) => {
            tracing::error!(record = %e.log_record(), "GreenLight encountered an error");
            eprintln!("Error: {}", e.user_message());
            eprintln!("Hint: {}", e.hint());
        }
        None => eprintln!("Error: {error:#}"),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let outcome = match cli.command {
        Command::Check(args) => check(args).await,
        Command::Analyze(args) => analyze(args).await,
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}
