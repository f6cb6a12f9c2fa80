//! GitLab hosting service implementation

use crate::error::{Error, Result};
use crate::platform::{HostingService, request_body, request_title, split_repo_url};
use crate::types::PullRequest;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// GitLab service using reqwest
///
/// Opens (or reuses) a merge request for the integration branch and sets it
/// to merge when its pipeline succeeds.
pub struct GitLabService {
    client: Client,
    token: String,
    api_base: String,
}

#[derive(Deserialize)]
struct MergeRequest {
    iid: u64,
    web_url: String,
    source_branch: String,
    target_branch: String,
    title: String,
}

/// Merge response
#[derive(Deserialize)]
struct MergeResponse {
    #[serde(default)]
    merge_when_pipeline_succeeds: bool,
    state: String,
}

impl From<MergeRequest> for PullRequest {
    fn from(mr: MergeRequest) -> Self {
        Self {
            number: mr.iid,
            html_url: mr.web_url,
            base_ref: mr.target_branch,
            head_ref: mr.source_branch,
            title: mr.title,
            node_id: None, // GitLab doesn't use GraphQL node IDs
        }
    }
}

#[derive(Serialize)]
struct CreateMrPayload {
    source_branch: String,
    target_branch: String,
    title: String,
    description: String,
}

#[derive(Serialize)]
struct MergePayload {
    merge_when_pipeline_succeeds: bool,
}

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

impl GitLabService {
    /// Create a new GitLab service
    ///
    /// `host` is a self-hosted GitLab; `None` talks to gitlab.com.
    pub fn new(token: String, host: Option<String>) -> Result<Self> {
        let host = host.unwrap_or_else(|| "gitlab.com".to_string());
        Self::with_api_base(token, format!("https://{host}/api/v4"))
    }

    /// Create a service against an explicit API base URL (e.g. `http://localhost:8080/api/v4`)
    pub fn with_api_base(token: String, api_base: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::GitLabApi(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            token,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    async fn find_existing_mr(&self, project: &str, source_branch: &str) -> Result<Option<PullRequest>> {
        debug!(source_branch, "finding existing MR");
        let url = self.api_url(&format!("/projects/{project}/merge_requests"));

        let mrs: Vec<MergeRequest> = self
            .client
            .get(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .query(&[("source_branch", source_branch), ("state", "opened")])
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::GitLabApi(e.to_string()))?
            .json()
            .await?;

        let result: Option<PullRequest> = mrs.into_iter().next().map(Into::into);
        if let Some(ref mr) = result {
            debug!(mr_iid = mr.number, "found existing MR");
        } else {
            debug!("no existing MR found");
        }
        Ok(result)
    }

    async fn create_mr(&self, project: &str, source: &str, target: &str) -> Result<PullRequest> {
        debug!(source, target, "creating MR");
        let url = self.api_url(&format!("/projects/{project}/merge_requests"));

        let payload = CreateMrPayload {
            source_branch: source.to_string(),
            target_branch: target.to_string(),
            title: request_title(source, target),
            description: request_body(source),
        };

        let mr: MergeRequest = self
            .client
            .post(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .json(&payload)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::GitLabApi(e.to_string()))?
            .json()
            .await?;

        let mr: PullRequest = mr.into();
        debug!(mr_iid = mr.number, "created MR");
        Ok(mr)
    }

    async fn merge_when_pipeline_succeeds(&self, project: &str, mr_iid: u64) -> Result<()> {
        debug!(mr_iid, "setting merge when pipeline succeeds");
        let url = self.api_url(&format!("/projects/{project}/merge_requests/{mr_iid}/merge"));

        let response: MergeResponse = self
            .client
            .put(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .json(&MergePayload {
                merge_when_pipeline_succeeds: true,
            })
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::GitLabApi(format!("merge request failed: {e}")))?
            .json()
            .await?;

        // No pipeline configured: GitLab merges immediately
        if response.merge_when_pipeline_succeeds || response.state == "merged" {
            debug!(mr_iid, state = %response.state, "merge-on-green accepted");
            Ok(())
        } else {
            Err(Error::GitLabApi(format!(
                "MR !{mr_iid} was not set to merge (state: {})",
                response.state
            )))
        }
    }
}

#[async_trait]
impl HostingService for GitLabService {
    async fn trigger_merge_on_green(
        &self,
        repo_url: &str,
        source_branch: &str,
        target_branch: &str,
    ) -> Result<()> {
        let (_, owner, repo) = split_repo_url(repo_url).ok_or(Error::NoSupportedRemotes)?;
        let project = urlencoding::encode(&format!("{owner}/{repo}")).into_owned();

        let mr = match self.find_existing_mr(&project, source_branch).await? {
            Some(mr) => mr,
            None => self.create_mr(&project, source_branch, target_branch).await?,
        };

        self.merge_when_pipeline_succeeds(&project, mr.number).await?;
        info!(mr_iid = mr.number, url = %mr.html_url, "requested merge-on-green");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_base_trailing_slash_trimmed() {
        let service =
            GitLabService::with_api_base("t".to_string(), "http://localhost:1/api/v4/".to_string())
                .unwrap();
        assert_eq!(
            service.api_url("/projects/x"),
            "http://localhost:1/api/v4/projects/x"
        );
    }

    #[test]
    fn test_default_host_is_gitlab_com() {
        let service = GitLabService::new("t".to_string(), None).unwrap();
        assert_eq!(service.api_url(""), "https://gitlab.com/api/v4");
    }
}
