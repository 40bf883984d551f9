use async_trait::async_trait;

use crate::domain::ticket::IssuePayload;
use crate::error::AppResult;

#[async_trait]
pub trait IssueTrackerService: Send + Sync {
    /// Identity recorded in cache entries; retries only replay entries whose
    /// tracker type matches.
    fn kind(&self) -> &'static str;

    /// Files the issue and returns its URL.
    async fn create_issue(&self, payload: &IssuePayload) -> AppResult<String>;

    async fn get_status(&self) -> bool;
}
