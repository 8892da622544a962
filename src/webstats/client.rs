//! GraphQL requests against the Webstats API.

use crate::models::LighthouseReport;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

const CREATE_STATISTIC_MUTATION: &str = r#"
mutation($projectId: String!, $gitCommitSha: String!, $lighthouseReport: JSONObject!) {
  createLighthouseStatistic(
    projectId: $projectId,
    gitCommitSha: $gitCommitSha,
    data: $lighthouseReport
  ) {
    id
  }
}
"#;

const BASE_STATISTIC_QUERY: &str = r#"
query Statistic($id: String!, $gitCommitSha: String) {
  project(id: $id) {
    id
    statistics(
      filter: {type: LIGHTHOUSE, gitCommitSha: {equals: $gitCommitSha}}
      first: 1
    ) {
      __typename
      ... on LighthouseStatistic {
        raw
      }
    }
    __typename
  }
}
"#;

/// Connection settings for Webstats.
#[derive(Debug, Clone)]
pub struct WebstatsConfig {
    pub endpoint: String,
    pub api_key: String,
    pub timeout_seconds: u64,
}

/// Errors talking to Webstats.
#[derive(Debug, Error)]
pub enum WebstatsError {
    #[error("Request to Webstats timed out after {0}s")]
    Timeout(u64),

    #[error("Cannot connect to Webstats at {0}")]
    Connect(String),

    #[error("Webstats request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Webstats API error {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Invalid base report returned by Webstats: {0}")]
    InvalidReport(#[source] serde_json::Error),
}

/// Outcome of looking up the base commit's statistic.
#[derive(Debug, Clone)]
pub enum BaseReport {
    /// A report was stored for the commit.
    Found(LighthouseReport),
    /// The project exists but has no statistic for the commit.
    Missing,
    /// The lookup did not return the project at all.
    Failed,
}

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateStatisticData {
    create_lighthouse_statistic: Option<CreatedStatistic>,
}

#[derive(Debug, Deserialize)]
struct CreatedStatistic {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ProjectData {
    project: Option<Project>,
}

#[derive(Debug, Deserialize)]
struct Project {
    #[serde(default)]
    statistics: Vec<Statistic>,
}

#[derive(Debug, Deserialize)]
struct Statistic {
    #[serde(default)]
    raw: Option<Value>,
}

/// Client for the Webstats GraphQL API.
pub struct WebstatsClient {
    config: WebstatsConfig,
    http_client: reqwest::Client,
}

impl WebstatsClient {
    pub fn new(config: WebstatsConfig) -> Result<Self, WebstatsError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Store `report` as the Lighthouse statistic of `git_commit_sha`.
    ///
    /// Returns the id of the created statistic, or `None` when the mutation
    /// returned no statistic.
    pub async fn create_lighthouse_statistic(
        &self,
        project_id: &str,
        git_commit_sha: &str,
        report: &LighthouseReport,
    ) -> Result<Option<String>, WebstatsError> {
        info!("Posting Lighthouse statistic for commit {}", git_commit_sha);

        let variables = json!({
            "projectId": project_id,
            "gitCommitSha": git_commit_sha,
            "lighthouseReport": report.raw(),
        });
        let response: GraphQlResponse<CreateStatisticData> =
            self.execute(CREATE_STATISTIC_MUTATION, variables).await?;

        Ok(created_statistic_id(response))
    }

    /// Fetch the Lighthouse statistic stored for `git_commit_sha`.
    pub async fn latest_base_report(
        &self,
        project_id: &str,
        git_commit_sha: &str,
    ) -> Result<BaseReport, WebstatsError> {
        info!("Fetching base report for commit {}", git_commit_sha);

        let variables = json!({
            "id": project_id,
            "gitCommitSha": git_commit_sha,
        });
        let response: GraphQlResponse<ProjectData> =
            self.execute(BASE_STATISTIC_QUERY, variables).await?;

        base_report_from_response(response)
    }

    async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<GraphQlResponse<T>, WebstatsError> {
        let request = GraphQlRequest { query, variables };

        let response = self
            .http_client
            .post(&self.config.endpoint)
            .header("x-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    WebstatsError::Timeout(self.config.timeout_seconds)
                } else if e.is_connect() {
                    WebstatsError::Connect(self.config.endpoint.clone())
                } else {
                    WebstatsError::Request(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(WebstatsError::Status { status, body });
        }

        let body: GraphQlResponse<T> = response.json().await?;
        for error in &body.errors {
            warn!("Webstats GraphQL error: {}", error.message);
        }

        Ok(body)
    }
}

fn created_statistic_id(response: GraphQlResponse<CreateStatisticData>) -> Option<String> {
    response
        .data
        .and_then(|d| d.create_lighthouse_statistic)
        .map(|s| s.id)
}

fn base_report_from_response(
    response: GraphQlResponse<ProjectData>,
) -> Result<BaseReport, WebstatsError> {
    let Some(project) = response.data.and_then(|d| d.project) else {
        debug!("Webstats returned no project");
        return Ok(BaseReport::Failed);
    };

    match project.statistics.into_iter().next().and_then(|s| s.raw) {
        Some(raw) => LighthouseReport::from_value(raw)
            .map(BaseReport::Found)
            .map_err(WebstatsError::InvalidReport),
        None => Ok(BaseReport::Missing),
    }
}
