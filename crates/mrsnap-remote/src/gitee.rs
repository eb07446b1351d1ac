//! HTTP client for the Gitee v5 commits API.
//!
//! `GET {base}/repos/{owner}/{repo}/commits?access_token=..&per_page=1[&since=..][&until=..]`
//! answers with a JSON array of commits, newest first, each carrying a `sha`.
//! Anything else (an error object, a non-2xx status, a transport failure)
//! is a soft provider error.

use async_trait::async_trait;
use mrsnap_core::errors::{ExError, ExErrorKind, Result};
use mrsnap_core::{log_op_end, log_op_start, TimeWindow};
use mrsnap_core_types::Sensitive;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::source::{CommitLookup, CommitSource};

/// Public Gitee API root
pub const DEFAULT_API_BASE: &str = "https://gitee.com/api/v5";

/// Organization that owns the manifest and every sub-project
pub const DEFAULT_ORGANIZATION: &str = "openharmony";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(reqwest::Error),

    #[error("Unauthorized: access token missing or invalid")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Server error: {0}")]
    Server(String),
}

// The request URL carries the access token; reqwest prints it in its errors.
impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Http(err.without_url())
    }
}

/// HTTP client for one organization's commit history.
#[derive(Debug, Clone)]
pub struct GiteeClient {
    base_url: String,
    organization: String,
    access_token: Sensitive<String>,
    client: Client,
}

impl GiteeClient {
    /// Create with explicit configuration.
    pub fn new(
        base_url: impl Into<String>,
        organization: impl Into<String>,
        access_token: Sensitive<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            ExError::new(ExErrorKind::Config)
                .with_op("build_http_client")
                .with_message(e.to_string())
        })?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            organization: organization.into(),
            access_token,
            client,
        })
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    fn commits_url(&self, project: &str) -> String {
        format!(
            "{}/repos/{}/{}/commits",
            self.base_url, self.organization, project
        )
    }

    /// Fetch the raw commit listing for `project` within `window`.
    pub async fn list_commits(
        &self,
        project: &str,
        window: &TimeWindow,
    ) -> std::result::Result<Value, ClientError> {
        let mut request = self
            .client
            .get(self.commits_url(project))
            .query(&[
                ("access_token", self.access_token.expose().as_str()),
                ("per_page", "1"),
            ]);
        if let Some(since) = window.since() {
            request = request.query(&[("since", since.format(DATE_FORMAT).to_string())]);
        }
        if let Some(until) = window.until() {
            request = request.query(&[("until", until.format(DATE_FORMAT).to_string())]);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            match status {
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(body)),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ClientError::Unauthorized),
                _ => Err(ClientError::Server(format!("{}: {}", status, body))),
            }
        }
    }
}

/// Interpret a commit listing: take the first (newest) entry's `sha`.
pub fn first_commit(body: &Value) -> CommitLookup {
    match body {
        Value::Array(commits) => match commits.first() {
            None => CommitLookup::Empty,
            Some(commit) => match commit.get("sha").and_then(Value::as_str) {
                Some(sha) if !sha.is_empty() => CommitLookup::Found(sha.to_string()),
                _ => CommitLookup::Unexpected("first commit has no 'sha'".to_string()),
            },
        },
        other => CommitLookup::Unexpected(summarize(other)),
    }
}

fn summarize(body: &Value) -> String {
    let text = body.to_string();
    if text.chars().count() > 200 {
        let cut: String = text.chars().take(200).collect();
        format!("{}...", cut)
    } else {
        text
    }
}

#[async_trait]
impl CommitSource for GiteeClient {
    async fn latest_commit(&self, project: &str, window: &TimeWindow) -> CommitLookup {
        let start = Instant::now();
        log_op_start!("resolve_commit", project, window = %window);

        let lookup = match self.list_commits(project, window).await {
            Ok(body) => first_commit(&body),
            Err(e) => CommitLookup::Unexpected(e.to_string()),
        };

        match &lookup {
            CommitLookup::Found(sha) => {
                log_op_end!(
                    "resolve_commit",
                    duration_ms = start.elapsed().as_millis() as u64,
                    project,
                    commit = sha.as_str()
                );
            }
            CommitLookup::Empty => {
                tracing::warn!(project, window = %window, "no commit in window");
            }
            CommitLookup::Unexpected(detail) => {
                tracing::warn!(project, detail = detail.as_str(), "unexpected provider response");
            }
        }
        lookup
    }
}
