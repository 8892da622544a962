//! Minimal GitHub REST client built on reqwest.

use crate::actions::Repository;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

const PER_PAGE: usize = 100;

/// Errors talking to the GitHub API.
#[derive(Debug, Error)]
pub enum GithubError {
    #[error("Invalid GitHub token")]
    InvalidToken,

    #[error("GitHub request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("GitHub API error {status} for {url}: {body}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
        body: String,
    },
}

/// A comment on an issue or pull request.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueComment {
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
}

/// What `upsert_comment` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentAction {
    Created,
    Updated(u64),
}

#[derive(Debug, Deserialize)]
struct RepoInfo {
    default_branch: String,
}

#[derive(Debug, Deserialize)]
struct BranchInfo {
    commit: BranchCommit,
}

#[derive(Debug, Deserialize)]
struct BranchCommit {
    sha: String,
}

#[derive(Debug, Serialize)]
struct CommentBody<'a> {
    body: &'a str,
}

/// Client for the GitHub REST API.
pub struct GithubClient {
    api_url: String,
    http_client: reqwest::Client,
}

impl GithubClient {
    pub fn new(api_url: &str, token: &str, timeout_seconds: u64) -> Result<Self, GithubError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("webstats-reporter/", env!("CARGO_PKG_VERSION"))),
        );
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| GithubError::InvalidToken)?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    /// Name of the repository's default branch.
    pub async fn default_branch(&self, repo: &Repository) -> Result<String, GithubError> {
        let url = format!("{}/repos/{}/{}", self.api_url, repo.owner, repo.name);
        let info: RepoInfo = self.get(&url).await?;
        Ok(info.default_branch)
    }

    /// Commit sha at the head of `branch`.
    pub async fn branch_head_sha(
        &self,
        repo: &Repository,
        branch: &str,
    ) -> Result<String, GithubError> {
        let url = format!(
            "{}/repos/{}/{}/branches/{}",
            self.api_url, repo.owner, repo.name, branch
        );
        let info: BranchInfo = self.get(&url).await?;
        Ok(info.commit.sha)
    }

    /// All comments on issue or pull request `number`.
    pub async fn list_comments(
        &self,
        repo: &Repository,
        number: u64,
    ) -> Result<Vec<IssueComment>, GithubError> {
        let mut comments = Vec::new();
        let mut page = 1;

        loop {
            let url = format!(
                "{}/repos/{}/{}/issues/{}/comments?per_page={}&page={}",
                self.api_url, repo.owner, repo.name, number, PER_PAGE, page
            );
            let batch: Vec<IssueComment> = self.get(&url).await?;
            let last = batch.len() < PER_PAGE;
            comments.extend(batch);

            if last {
                break;
            }
            page += 1;
        }

        debug!("Found {} comments on #{}", comments.len(), number);
        Ok(comments)
    }

    pub async fn create_comment(
        &self,
        repo: &Repository,
        number: u64,
        body: &str,
    ) -> Result<(), GithubError> {
        let url = format!(
            "{}/repos/{}/{}/issues/{}/comments",
            self.api_url, repo.owner, repo.name, number
        );
        let response = self
            .http_client
            .post(&url)
            .json(&CommentBody { body })
            .send()
            .await?;
        check_status(response, &url).await?;
        Ok(())
    }

    pub async fn update_comment(
        &self,
        repo: &Repository,
        comment_id: u64,
        body: &str,
    ) -> Result<(), GithubError> {
        let url = format!(
            "{}/repos/{}/{}/issues/comments/{}",
            self.api_url, repo.owner, repo.name, comment_id
        );
        let response = self
            .http_client
            .patch(&url)
            .json(&CommentBody { body })
            .send()
            .await?;
        check_status(response, &url).await?;
        Ok(())
    }

    /// Update the comment starting with `identifier`, or create a new one.
    pub async fn upsert_comment(
        &self,
        repo: &Repository,
        number: u64,
        identifier: &str,
        body: &str,
    ) -> Result<CommentAction, GithubError> {
        let comments = self.list_comments(repo, number).await?;

        match find_comment(&comments, identifier) {
            Some(existing) => {
                info!("Updating comment {} on #{}", existing.id, number);
                self.update_comment(repo, existing.id, body).await?;
                Ok(CommentAction::Updated(existing.id))
            }
            None => {
                info!("Creating comment on #{}", number);
                self.create_comment(repo, number, body).await?;
                Ok(CommentAction::Created)
            }
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, GithubError> {
        debug!("GET {}", url);
        let response = self.http_client.get(url).send().await?;
        let response = check_status(response, url).await?;
        Ok(response.json().await?)
    }
}

async fn check_status(
    response: reqwest::Response,
    url: &str,
) -> Result<reqwest::Response, GithubError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(GithubError::Status {
        status,
        url: url.to_string(),
        body,
    })
}

/// First comment whose body starts with `identifier`.
pub fn find_comment<'a>(comments: &'a [IssueComment], identifier: &str) -> Option<&'a IssueComment> {
    comments.iter().find(|c| {
        c.body
            .as_deref()
            .map(|b| b.starts_with(identifier))
            .unwrap_or(false)
    })
}
