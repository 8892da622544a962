//! webstats-reporter - Lighthouse CI results for Webstats
//!
//! A CI step that posts the representative Lighthouse run of a build to
//! Webstats and comments a score comparison on pull requests.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Invalid arguments, or any step of the run failed

mod actions;
mod cli;
mod config;
mod github;
mod lighthouse;
mod models;
mod report;
mod runner;
mod webstats;

use actions::{ActionContext, FailureState, Repository};
use anyhow::{Context, Result};
use cli::Args;
use config::{Config, CONFIG_FILE};
use runner::Credentials;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    let mut state = FailureState::new();
    if !validate_args(&args, &mut state) {
        std::process::exit(state.exit_code());
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("webstats-reporter v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    let exit_code = match run_reporter(args).await {
        Ok(code) => code,
        Err(e) => {
            state.set_failed(format!("{:#}", e));
            state.exit_code()
        }
    };

    std::process::exit(exit_code);
}

/// Check the arguments, reporting a failure the same way a failed run does.
fn validate_args(args: &Args, state: &mut FailureState) -> bool {
    match args.validate() {
        Ok(()) => true,
        Err(e) => {
            state.set_failed(format!("Invalid arguments: {}", e));
            false
        }
    }
}

/// Handle --init-config: generate a default .webstats.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    Ok(())
}

/// Log filter from `RUST_LOG` when set, otherwise from the verbosity flags.
fn log_filter(level: tracing::Level, rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::default().add_directive(level.into()))
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = log_filter(args.log_level(), rust_log.as_deref());

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Warning: a tracing subscriber is already installed");
    }
}

/// Resolve configuration and inputs, then run the workflow.
async fn run_reporter(args: Args) -> Result<i32> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let repository = args
        .repository
        .as_deref()
        .map(Repository::parse)
        .transpose()?;

    let context = ActionContext {
        event_name: args.event_name.clone(),
        repository,
        sha: args.sha.clone().unwrap_or_default(),
        pr_number: args.pr_number().and_then(|n| n.parse().ok()),
    };

    if args.dry_run {
        let comment = runner::dry_run(&config, &context)?;
        println!("\n{}", comment);
        println!("✅ Dry run complete. Nothing was posted.");
        return Ok(0);
    }

    let credentials = Credentials {
        api_key: args.api_key.clone().unwrap_or_default(),
        project_id: args.project_id.clone().unwrap_or_default(),
        github_token: args.github_token.clone(),
    };

    Ok(runner::run(&config, &context, &credentials).await)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
