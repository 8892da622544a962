//! The reporting workflow.
//!
//! Load runs, post the representative one to Webstats and, outside of push
//! events, comment a comparison on the pull request. Errors are recorded in
//! the run's [`FailureState`] instead of aborting the process.

use crate::actions::{ActionContext, FailureState, Repository};
use crate::config::Config;
use crate::github::{CommentAction, GithubClient};
use crate::lighthouse::{load_saved_reports, representative_report};
use crate::models::LighthouseReport;
use crate::report::{render_comment, ComparisonTarget, COMMENT_IDENTIFIER};
use crate::webstats::{BaseReport, WebstatsClient, WebstatsConfig};
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use tracing::{debug, info, warn};

/// Credentials for the two remote services.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: String,
    pub project_id: String,
    pub github_token: Option<String>,
}

/// Run the full workflow, returning the process exit code.
pub async fn run(config: &Config, context: &ActionContext, credentials: &Credentials) -> i32 {
    let mut state = FailureState::new();

    if let Err(e) = run_steps(config, context, credentials, &mut state).await {
        state.set_failed(format!("{:#}", e));
    }

    state.exit_code()
}

async fn run_steps(
    config: &Config,
    context: &ActionContext,
    credentials: &Credentials,
    state: &mut FailureState,
) -> Result<()> {
    let report = select_report(config)?;

    let webstats = WebstatsClient::new(WebstatsConfig {
        endpoint: config.webstats.endpoint.clone(),
        api_key: credentials.api_key.clone(),
        timeout_seconds: config.webstats.timeout_seconds,
    })?;

    println!("📤 Posting to Webstats...");
    let statistic_id = webstats
        .create_lighthouse_statistic(&credentials.project_id, &context.sha, &report)
        .await?;
    match statistic_id {
        Some(id) => println!("✅ Posted Lighthouse report to Webstats. Statistic ID: {}", id),
        None => state.set_failed(
            "Could not read the ID of your posted report. The mutation has probably failed",
        ),
    }

    if context.is_push() {
        info!("Push event, skipping pull request comparison");
        return Ok(());
    }

    let repository = context
        .repository
        .as_ref()
        .ok_or_else(|| anyhow!("Repository is required to comment (GITHUB_REPOSITORY)"))?;
    let pr_number = context
        .pr_number
        .ok_or_else(|| anyhow!("Pull request number is required to comment (PR_NUMBER)"))?;
    let token = credentials
        .github_token
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| anyhow!("GitHub token is required to comment (GITHUB_TOKEN)"))?;

    let github = GithubClient::new(&config.github.api_url, token, config.github.timeout_seconds)?;

    let default_branch = github
        .default_branch(repository)
        .await
        .with_context(|| format!("Failed to read default branch of {}", repository))?;
    info!("Default branch: {}", default_branch);

    let base_sha = github
        .branch_head_sha(repository, &default_branch)
        .await
        .with_context(|| format!("Failed to read head of branch {}", default_branch))?;
    debug!("Base commit: {}", base_sha);

    let base = webstats
        .latest_base_report(&credentials.project_id, &base_sha)
        .await?;
    match &base {
        BaseReport::Found(_) => info!("Found base report for {}", base_sha),
        BaseReport::Missing => warn!("No Webstats report stored for {}", base_sha),
        BaseReport::Failed => warn!("Webstats lookup of the base report failed"),
    }

    let target = ComparisonTarget {
        current_sha: &context.sha,
        base_sha: &base_sha,
        default_branch: &default_branch,
    };
    let comment = render_comment(Some(&report), &base, &target, Utc::now());

    post_comment(&github, repository, pr_number, &comment).await
}

/// Load the saved runs and pick the one to report.
pub fn select_report(config: &Config) -> Result<LighthouseReport> {
    let dir = &config.lighthouse.reports_dir;
    info!("Loading Lighthouse runs from {}", dir.display());

    let reports = load_saved_reports(dir)?;
    let report = representative_report(reports)
        .ok_or_else(|| anyhow!("No Lighthouse reports found in {}", dir.display()))?;

    info!("Representative run: {}", report.summary());
    Ok(report)
}

async fn post_comment(
    github: &GithubClient,
    repository: &Repository,
    pr_number: u64,
    comment: &str,
) -> Result<()> {
    let action = github
        .upsert_comment(repository, pr_number, COMMENT_IDENTIFIER, comment)
        .await
        .with_context(|| format!("Failed to comment on {}#{}", repository, pr_number))?;

    match action {
        CommentAction::Created => println!("💬 Created comparison comment on #{}", pr_number),
        CommentAction::Updated(id) => {
            println!("💬 Updated comparison comment {} on #{}", id, pr_number)
        }
    }

    Ok(())
}

/// Select the representative run and render the comment it would produce,
/// without contacting any service.
pub fn dry_run(config: &Config, context: &ActionContext) -> Result<String> {
    let report = select_report(config)?;

    println!("\n🔍 Dry run: no requests will be made\n");
    println!("   Representative run: {}", report.final_url);
    println!("   Scores: {}", report.summary());

    let target = ComparisonTarget {
        current_sha: &context.sha,
        base_sha: "<default branch head>",
        default_branch: "<default branch>",
    };
    Ok(render_comment(
        Some(&report),
        &BaseReport::Found(report.clone()),
        &target,
        Utc::now(),
    ))
}
