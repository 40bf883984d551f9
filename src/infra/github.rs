use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client,
    header::{ACCEPT, AUTHORIZATION, USER_AGENT},
};
use serde::{Deserialize, Serialize};

use crate::domain::classify::Priority;
use crate::domain::ticket::IssuePayload;
use crate::error::{AppError, AppResult};
use crate::services::IssueTrackerService;

pub const GITHUB_API: &str = "https://api.github.com";
pub const TRACKER_KIND: &str = "GitHubTracker";
const GENERATED_LABEL: &str = "generated-by-terry";

pub struct GitHubClient {
    http: Client,
    api_base: String,
    repo: String,
    token: String,
}

impl GitHubClient {
    pub fn new(token: Option<String>, repo: Option<String>) -> AppResult<Self> {
        let token = token.filter(|t| !t.trim().is_empty()).ok_or_else(|| {
            AppError::Configuration(
                "GitHub token not found. Set GITHUB_TOKEN environment variable.".to_string(),
            )
        })?;
        let repo = repo.filter(|r| !r.trim().is_empty()).ok_or_else(|| {
            AppError::Configuration(
                "GitHub repository not specified. Set GITHUB_REPO environment variable."
                    .to_string(),
            )
        })?;
        if !repo.contains('/') {
            return Err(AppError::Configuration(format!(
                "GitHub repository must look like owner/name, got '{repo}'"
            )));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|err| AppError::Configuration(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            api_base: GITHUB_API.to_string(),
            repo: repo.trim().to_string(),
            token,
        })
    }

    fn repo_endpoint(&self) -> String {
        format!("{}/repos/{}", self.api_base.trim_end_matches('/'), self.repo)
    }

    fn issues_endpoint(&self) -> String {
        format!("{}/issues", self.repo_endpoint())
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, "terry-cli")
    }
}

#[async_trait]
impl IssueTrackerService for GitHubClient {
    fn kind(&self) -> &'static str {
        TRACKER_KIND
    }

    async fn create_issue(&self, payload: &IssuePayload) -> AppResult<String> {
        let labels = issue_labels(payload);
        let request_body = CreateIssueRequest {
            title: payload.title.trim(),
            body: issue_body(&payload.description),
            labels: labels.clone(),
        };

        let failure = |detail: String| {
            AppError::IssueTracker(format!(
                "Failed to create GitHub issue: {detail}\nLabels: {labels:?}"
            ))
        };

        let response = self
            .request(self.http.post(self.issues_endpoint()))
            .json(&request_body)
            .send()
            .await
            .map_err(|err| failure(format!("failed to call GitHub: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(failure(format!("GitHub responded with {status}: {body}")));
        }

        let created: CreateIssueResponse = response
            .json()
            .await
            .map_err(|err| failure(format!("failed to parse GitHub response: {err}")))?;
        Ok(created.html_url)
    }

    async fn get_status(&self) -> bool {
        match self
            .request(self.http.get(self.repo_endpoint()))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                tracing::debug!("GitHub status check failed: {err}");
                false
            }
        }
    }
}

pub fn issue_labels(payload: &IssuePayload) -> Vec<String> {
    let priority = match Priority::from_code(&payload.priority) {
        Some(Priority::P0) => "priority:critical",
        Some(Priority::P1) => "priority:high",
        Some(Priority::P3) => "priority:low",
        Some(Priority::P2) | None => "priority:medium",
    };
    vec![
        priority.to_string(),
        format!("area:{}", area_slug(&payload.impact_area)),
        GENERATED_LABEL.to_string(),
    ]
}

/// "Core Product (you know...)" -> "core-product".
fn area_slug(impact_area: &str) -> String {
    impact_area
        .split('(')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
        .replace(' ', "-")
}

fn issue_body(description: &str) -> String {
    format!("{description}\n\n---\n> Generated by Terry 🤖")
}

#[derive(Serialize)]
struct CreateIssueRequest<'a> {
    title: &'a str,
    body: String,
    labels: Vec<String>,
}

#[derive(Deserialize)]
struct CreateIssueResponse {
    html_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::classify::ImpactArea;
    use crate::domain::scores::ScoreSet;

    fn payload(priority: &str, area: ImpactArea) -> IssuePayload {
        IssuePayload {
            title: "Bulk export".to_string(),
            description: "body".to_string(),
            priority: priority.to_string(),
            impact_area: area.label().to_string(),
            scores: ScoreSet::default(),
        }
    }

    #[test]
    fn maps_priority_and_area_to_labels() {
        assert_eq!(
            issue_labels(&payload("P0", ImpactArea::CoreProduct)),
            vec!["priority:critical", "area:core-product", "generated-by-terry"]
        );
        assert_eq!(
            issue_labels(&payload(Priority::P3.label(), ImpactArea::TechnicalDebt)),
            vec!["priority:low", "area:technical-debt", "generated-by-terry"]
        );
    }

    #[test]
    fn unknown_priority_is_medium() {
        let labels = issue_labels(&payload("urgent!!", ImpactArea::Analytics));
        assert_eq!(labels[0], "priority:medium");
        assert_eq!(labels[1], "area:analytics");
    }

    #[test]
    fn body_carries_footer() {
        assert_eq!(issue_body("Do it"), "Do it\n\n---\n> Generated by Terry 🤖");
    }

    #[test]
    fn requires_token_and_repo() {
        assert!(matches!(
            GitHubClient::new(None, Some("acme/widgets".to_string())),
            Err(AppError::Configuration(_))
        ));
        assert!(matches!(
            GitHubClient::new(Some("ghp".to_string()), None),
            Err(AppError::Configuration(_))
        ));
        assert!(matches!(
            GitHubClient::new(Some("ghp".to_string()), Some("widgets".to_string())),
            Err(AppError::Configuration(_))
        ));
    }

    #[test]
    fn builds_repo_endpoints() {
        let client =
            GitHubClient::new(Some("ghp".to_string()), Some("acme/widgets".to_string())).unwrap();
        assert_eq!(client.kind(), TRACKER_KIND);
        assert_eq!(
            client.issues_endpoint(),
            "https://api.github.com/repos/acme/widgets/issues"
        );
    }
}
