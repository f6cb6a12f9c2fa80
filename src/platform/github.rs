//! GitHub hosting service implementation

use crate::error::{Error, Result};
use crate::platform::{HostingService, parse_repo_info, request_body, request_title};
use crate::types::{Platform, PullRequest};
use async_trait::async_trait;
use octocrab::Octocrab;
use serde::Deserialize;
use tracing::{debug, info};

// GraphQL response types for the enablePullRequestAutoMerge mutation

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnableAutoMergeData {
    enable_pull_request_auto_merge: EnableAutoMergePayload,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnableAutoMergePayload {
    pull_request: AutoMergePullRequest,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AutoMergePullRequest {
    number: u64,
    auto_merge_request: Option<AutoMergeRequest>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AutoMergeRequest {
    merge_method: String,
}

/// GitHub service using octocrab
///
/// Opens (or reuses) a pull request for the integration branch and enables
/// auto-merge on it, so GitHub merges it once required checks pass.
pub struct GitHubService {
    client: Octocrab,
    host: Option<String>,
}

impl GitHubService {
    /// Create a new GitHub service
    ///
    /// `host` is a GitHub Enterprise host; `None` talks to github.com.
    pub fn new(token: &str, host: Option<String>) -> Result<Self> {
        let base_uri = host.as_ref().map(|h| format!("https://{h}/api/v3"));
        Self::build(token, base_uri.as_deref(), host)
    }

    /// Create a service against an explicit API root
    ///
    /// Pull requests live under `{base_uri}/repos/...` and GraphQL is
    /// posted to `{base_uri}/graphql`.
    pub fn with_base_uri(token: &str, base_uri: &str) -> Result<Self> {
        Self::build(token, Some(base_uri), None)
    }

    fn build(token: &str, base_uri: Option<&str>, host: Option<String>) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());

        if let Some(base_uri) = base_uri {
            builder = builder
                .base_uri(base_uri)
                .map_err(|e| Error::GitHubApi(e.to_string()))?;
        }

        let client = builder
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;

        Ok(Self { client, host })
    }

    /// Find an existing open PR for a head branch
    async fn find_existing_pr(
        &self,
        owner: &str,
        repo: &str,
        head_branch: &str,
    ) -> Result<Option<PullRequest>> {
        debug!(head_branch, "finding existing PR");
        let head = format!("{owner}:{head_branch}");

        let prs = self
            .client
            .pulls(owner, repo)
            .list()
            .head(head)
            .state(octocrab::params::State::Open)
            .send()
            .await?;

        let result = prs.items.first().map(pr_from_octocrab);
        if let Some(ref pr) = result {
            debug!(pr_number = pr.number, "found existing PR");
        } else {
            debug!("no existing PR found");
        }
        Ok(result)
    }

    async fn create_pr(
        &self,
        owner: &str,
        repo: &str,
        head: &str,
        base: &str,
    ) -> Result<PullRequest> {
        debug!(head, base, "creating PR");
        let pr = self
            .client
            .pulls(owner, repo)
            .create(request_title(head, base), head, base)
            .body(request_body(head))
            .send()
            .await?;

        let result = pr_from_octocrab(&pr);
        debug!(pr_number = result.number, "created PR");
        Ok(result)
    }

    async fn enable_auto_merge(&self, pr: &PullRequest) -> Result<()> {
        debug!(pr_number = pr.number, "enabling auto-merge");
        let node_id = pr.node_id.as_ref().ok_or_else(|| {
            Error::GitHubApi("PR missing node_id for GraphQL mutation".to_string())
        })?;

        let response: GraphQlResponse<EnableAutoMergeData> = self
            .client
            .graphql(&serde_json::json!({
                "query": r"
                    mutation EnablePullRequestAutoMerge($pullRequestId: ID!) {
                        enablePullRequestAutoMerge(input: { pullRequestId: $pullRequestId, mergeMethod: MERGE }) {
                            pullRequest {
                                number
                                autoMergeRequest {
                                    mergeMethod
                                }
                            }
                        }
                    }
                ",
                "variables": {
                    "pullRequestId": node_id
                }
            }))
            .await
            .map_err(|e| Error::GitHubApi(format!("GraphQL mutation failed: {e}")))?;

        // Check for GraphQL errors
        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            let messages: Vec<_> = errors.into_iter().map(|e| e.message).collect();
            return Err(Error::GitHubApi(format!(
                "GraphQL error: {}",
                messages.join(", ")
            )));
        }

        let data = response
            .data
            .ok_or_else(|| Error::GitHubApi("No data in GraphQL response".to_string()))?;
        let merged = data.enable_pull_request_auto_merge.pull_request;

        match merged.auto_merge_request {
            Some(request) => {
                debug!(pr_number = merged.number, method = %request.merge_method, "auto-merge enabled");
                Ok(())
            }
            None => Err(Error::GitHubApi(format!(
                "auto-merge was not enabled on PR #{}",
                merged.number
            ))),
        }
    }
}

/// Helper to convert octocrab PR to our `PullRequest` type
fn pr_from_octocrab(pr: &octocrab::models::pulls::PullRequest) -> PullRequest {
    PullRequest {
        number: pr.number,
        html_url: pr
            .html_url
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        base_ref: pr.base.ref_field.clone(),
        head_ref: pr.head.ref_field.clone(),
        title: pr.title.as_deref().unwrap_or_default().to_string(),
        node_id: pr.node_id.clone(),
    }
}

#[async_trait]
impl HostingService for GitHubService {
    async fn trigger_merge_on_green(
        &self,
        repo_url: &str,
        source_branch: &str,
        target_branch: &str,
    ) -> Result<()> {
        let config = parse_repo_info(repo_url)?;
        if config.platform != Platform::GitHub {
            return Err(Error::UnsupportedPlatform(repo_url.to_string()));
        }
        if config.host != self.host {
            debug!(
                url_host = ?config.host,
                service_host = ?self.host,
                "repository host differs from configured GitHub host"
            );
        }

        let pr = match self
            .find_existing_pr(&config.owner, &config.repo, source_branch)
            .await?
        {
            Some(pr) => pr,
            None => {
                self.create_pr(&config.owner, &config.repo, source_branch, target_branch)
                    .await?
            }
        };

        self.enable_auto_merge(&pr).await?;
        info!(pr_number = pr.number, url = %pr.html_url, "requested merge-on-green");
        Ok(())
    }
}
