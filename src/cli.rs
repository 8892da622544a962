//! Command-line interface argument parsing.
//!
//! Every input can also come from the environment, so the binary runs
//! unchanged as a GitHub Actions step.

use clap::Parser;
use std::path::PathBuf;

/// webstats-reporter - Lighthouse CI results for Webstats
///
/// Posts the representative Lighthouse run of this build to Webstats and,
/// on pull requests, comments a score comparison against the default branch.
///
/// Examples:
///   webstats-reporter
///   webstats-reporter --reports-dir .lighthouseci --dry-run
///   webstats-reporter --event-name push --sha $(git rev-parse HEAD)
///   webstats-reporter --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Directory holding the saved Lighthouse CI runs (lhr-*.json)
    ///
    /// Defaults to .lighthouseci or the value from the config file.
    #[arg(long, value_name = "DIR")]
    pub reports_dir: Option<PathBuf>,

    /// Webstats GraphQL endpoint
    #[arg(long, value_name = "URL", env = "WEBSTATS_URL")]
    pub webstats_url: Option<String>,

    /// Webstats API key
    #[arg(long, value_name = "KEY", env = "WEBSTATS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Webstats project the statistic belongs to
    #[arg(long, value_name = "ID", env = "WEBSTATS_PROJECT_ID")]
    pub project_id: Option<String>,

    /// Commit sha of the current build
    #[arg(long, value_name = "SHA", env = "GITHUB_SHA")]
    pub sha: Option<String>,

    /// Workflow event name; `push` skips the pull request comparison
    #[arg(long, value_name = "EVENT", env = "GITHUB_EVENT_NAME", default_value = "")]
    pub event_name: String,

    /// Repository slug (owner/name)
    #[arg(long, value_name = "OWNER/NAME", env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    /// Pull request number to comment on
    ///
    /// Read as text: workflows pass an empty value on push events.
    #[arg(long, value_name = "NUMBER", env = "PR_NUMBER")]
    pub pr_number: Option<String>,

    /// GitHub token used for the REST API
    #[arg(long, value_name = "TOKEN", env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// GitHub REST API base URL
    #[arg(long, value_name = "URL", env = "GITHUB_API_URL")]
    pub github_api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .webstats.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Select the representative run and print the comment without any
    /// network calls
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .webstats.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        for (name, url) in [
            ("Webstats URL", &self.webstats_url),
            ("GitHub API URL", &self.github_api_url),
        ] {
            if let Some(url) = url {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(format!("{} must start with 'http://' or 'https://'", name));
                }
            }
        }

        if let Some(number) = self.pr_number() {
            if number.parse::<u64>().is_err() {
                return Err(format!("Pull request number must be a number, got '{}'", number));
            }
        }

        if self.dry_run {
            return Ok(());
        }

        if is_blank(&self.api_key) {
            return Err("Webstats API key is required (--api-key or WEBSTATS_API_KEY)".to_string());
        }
        if is_blank(&self.project_id) {
            return Err(
                "Webstats project id is required (--project-id or WEBSTATS_PROJECT_ID)".to_string(),
            );
        }
        if is_blank(&self.sha) {
            return Err("Commit sha is required (--sha or GITHUB_SHA)".to_string());
        }

        Ok(())
    }

    /// The pull request number, if a non-empty one was given.
    pub fn pr_number(&self) -> Option<&str> {
        self.pr_number.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).unwrap_or("").is_empty()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn make_args() -> Args {
        Args {
            reports_dir: None,
            webstats_url: None,
            api_key: Some("key".to_string()),
            project_id: Some("project".to_string()),
            sha: Some("abc123".to_string()),
            event_name: "pull_request".to_string(),
            repository: Some("octo/site".to_string()),
            pr_number: Some("7".to_string()),
            github_token: Some("token".to_string()),
            github_api_url: None,
            timeout: None,
            config: None,
            verbose: false,
            quiet: false,
            dry_run: false,
            init_config: false,
        }
    }

    #[test]
    fn test_valid_args() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_requires_webstats_inputs() {
        let mut args = make_args();
        args.api_key = None;
        assert!(args.validate().unwrap_err().contains("API key"));

        let mut args = make_args();
        args.project_id = Some("  ".to_string());
        assert!(args.validate().unwrap_err().contains("project id"));

        let mut args = make_args();
        args.sha = None;
        assert!(args.validate().unwrap_err().contains("sha"));
    }

    #[test]
    fn test_dry_run_needs_no_credentials() {
        let mut args = make_args();
        args.dry_run = true;
        args.api_key = None;
        args.project_id = None;
        args.sha = None;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_pr_number() {
        let mut args = make_args();
        args.pr_number = Some(String::new());
        assert_eq!(args.pr_number(), None);
        assert!(args.validate().is_ok());

        args.pr_number = Some("abc".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_url() {
        let mut args = make_args();
        args.webstats_url = Some("webstats.example".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = Args::try_parse_from([
            "webstats-reporter",
            "--reports-dir",
            "out",
            "--pr-number",
            "12",
            "--event-name",
            "push",
            "--dry-run",
        ])
        .unwrap();

        assert_eq!(args.reports_dir, Some(PathBuf::from("out")));
        assert_eq!(args.pr_number(), Some("12"));
        assert_eq!(args.event_name, "push");
        assert!(args.dry_run);
    }
}
