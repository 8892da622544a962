//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.webstats.toml` files.

use crate::lighthouse::DEFAULT_REPORTS_DIR;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".webstats.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Webstats API settings.
    #[serde(default)]
    pub webstats: WebstatsSettings,

    /// GitHub API settings.
    #[serde(default)]
    pub github: GithubSettings,

    /// Lighthouse CI settings.
    #[serde(default)]
    pub lighthouse: LighthouseSettings,
}

/// Webstats API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebstatsSettings {
    /// GraphQL endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for WebstatsSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_endpoint() -> String {
    "https://webstats.vercel.app/api/graphql".to_string()
}

fn default_timeout() -> u64 {
    60
}

/// GitHub API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubSettings {
    /// REST API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for GithubSettings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

/// Lighthouse CI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LighthouseSettings {
    /// Directory the saved runs are read from.
    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,
}

impl Default for LighthouseSettings {
    fn default() -> Self {
        Self {
            reports_dir: default_reports_dir(),
        }
    }
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from(DEFAULT_REPORTS_DIR)
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Only values given on the command line or through the environment
    /// override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref dir) = args.reports_dir {
            self.lighthouse.reports_dir = dir.clone();
        }
        if let Some(ref url) = args.webstats_url {
            self.webstats.endpoint = url.clone();
        }
        if let Some(ref url) = args.github_api_url {
            self.github.api_url = url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.webstats.timeout_seconds = timeout;
            self.github.timeout_seconds = timeout;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
