use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::cache::{CacheHandle, FailureCache};
use crate::context::AppContext;
use crate::domain::scores::ScoreSet;
use crate::domain::ticket::{IssuePayload, Ticket};
use crate::error::{AppError, AppResult};
use crate::services::IssueTrackerService;

#[derive(Debug)]
pub enum Submission {
    Created { url: String },
    Cached { error: String, handle: CacheHandle },
}

/// Asks the language model to structure `request`, then builds the ticket.
pub async fn create_ticket_from_text(ctx: &AppContext, request: &str) -> AppResult<Ticket> {
    let language_model = ctx
        .language_model
        .as_ref()
        .ok_or_else(|| AppError::Configuration("LLM processor not configured".to_string()))?;

    let response = language_model.process(request).await?;
    let description = if response.description.trim().is_empty() {
        request
    } else {
        response.description.as_str()
    };

    Ok(ctx
        .tickets
        .create(&response.title, description, response.scores))
}

pub fn create_ticket_from_scores(
    ctx: &AppContext,
    title: &str,
    description: &str,
    scores: ScoreSet,
) -> Ticket {
    ctx.tickets.create(title, description, scores)
}

/// Files the ticket. A tracker error is not fatal: the payload goes to the
/// failure cache and the caller gets the handle back.
pub async fn submit_with_cache(
    tracker: &dyn IssueTrackerService,
    cache: &FailureCache,
    payload: &IssuePayload,
) -> AppResult<Submission> {
    match tracker.create_issue(payload).await {
        Ok(url) => {
            info!("created {} issue {url}", tracker.kind());
            Ok(Submission::Created { url })
        }
        Err(err) => {
            let error = err.detail();
            warn!("{} submission failed: {error}", tracker.kind());
            let ticket_data = serde_json::to_value(payload)?;
            let handle = cache.store(tracker.kind(), &ticket_data).map_err(|cache_err| {
                AppError::Cache(format!(
                    "failed to cache issue after tracker error ({error}): {cache_err}"
                ))
            })?;
            Ok(Submission::Cached { error, handle })
        }
    }
}

/// Writes `<ticket-id>.yaml` into `dir`.
pub fn save_ticket(ticket: &Ticket, dir: &Path) -> AppResult<PathBuf> {
    let path = dir.join(format!("{}.yaml", ticket.id));
    let data = serde_yaml::to_string(&ticket.export())?;
    fs::write(&path, data)?;
    Ok(path)
}
