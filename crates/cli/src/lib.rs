use anyhow::Result;
use clap::Parser;
use skipper_engine::{
    publish_decision, ConfigProvider, Decision, DecisionEngine, Reporter, Settings,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

pub mod actions;
pub mod github;

use actions::{ActionsInputs, ActionsReporter};
use github::{GithubClient, GithubConfig, DEFAULT_API_URL};

#[derive(Parser)]
#[command(name = "skipper")]
#[command(about = "Skip redundant GitHub Actions runs and cancel outdated ones", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long)]
    quiet: bool,

    /// Repository as owner/name
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repository: Option<String>,

    /// Id of the workflow run being decided on
    #[arg(long, env = "GITHUB_RUN_ID")]
    run_id: Option<u64>,

    /// GitHub REST API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// File that receives step outputs (falls back to stdout)
    #[arg(long, env = "GITHUB_OUTPUT")]
    output_file: Option<PathBuf>,

    /// Per-request HTTP timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

/// Where the decision is made: repository coordinates and transport settings.
#[derive(Debug, Clone)]
pub struct ActionTarget {
    pub api_url: String,
    pub repository: String,
    pub run_id: u64,
    pub timeout: Duration,
}

impl ActionTarget {
    fn github_config(&self) -> std::result::Result<GithubConfig, String> {
        let (owner, repo) = self
            .repository
            .split_once('/')
            .filter(|(owner, repo)| !owner.is_empty() && !repo.is_empty() && !repo.contains('/'))
            .ok_or_else(|| format!("repository '{}' is not of the form owner/name", self.repository))?;
        Ok(GithubConfig {
            api_url: self.api_url.clone(),
            owner: owner.to_string(),
            repo: repo.to_string(),
            run_id: self.run_id,
            timeout: self.timeout,
        })
    }
}

/// Result of one invocation; the binary turns it into an exit code.
#[derive(Debug)]
pub enum Outcome {
    Verdict(Decision),
    Fatal(String),
}

impl Outcome {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Verdict(_) => ExitCode::SUCCESS,
            Self::Fatal(_) => ExitCode::FAILURE,
        }
    }
}

pub async fn run_action(
    inputs: &dyn ConfigProvider,
    reporter: &dyn Reporter,
    target: &ActionTarget,
) -> Outcome {
    let settings = match Settings::load(inputs) {
        Ok(settings) => settings,
        Err(err) => return Outcome::Fatal(err.to_string()),
    };
    log::debug!("settings: {settings:?}");

    let config = match target.github_config() {
        Ok(config) => config,
        Err(message) => return Outcome::Fatal(message),
    };
    let client = match GithubClient::new(config, &settings.github_token) {
        Ok(client) => client,
        Err(err) => return Outcome::Fatal(err.to_string()),
    };

    match DecisionEngine::new(&client, reporter, &settings).decide().await {
        Ok(decision) => {
            publish_decision(reporter, &decision);
            Outcome::Verdict(decision)
        }
        Err(err) => Outcome::Fatal(err.to_string()),
    }
}

fn init_logging(cli: &Cli) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

pub async fn main_entry() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(&cli);

    let reporter = ActionsReporter::new(cli.output_file.clone());
    let target = match (cli.repository.clone(), cli.run_id) {
        (Some(repository), Some(run_id)) => ActionTarget {
            api_url: cli.api_url.clone(),
            repository,
            run_id,
            timeout: Duration::from_secs(cli.timeout_secs),
        },
        (None, _) => {
            reporter.fail("GITHUB_REPOSITORY is not set (pass --repository)");
            return Ok(ExitCode::FAILURE);
        }
        (_, None) => {
            reporter.fail("GITHUB_RUN_ID is not set (pass --run-id)");
            return Ok(ExitCode::FAILURE);
        }
    };

    let outcome = run_action(&ActionsInputs, &reporter, &target).await;
    if let Outcome::Fatal(message) = &outcome {
        log::error!("{message}");
        reporter.fail(message);
    }
    Ok(outcome.exit_code())
}
