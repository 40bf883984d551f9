use std::sync::Arc;

use tracing::warn;

use crate::cache::FailureCache;
use crate::config::AppConfig;
use crate::domain::ticket::TicketFactory;
use crate::infra::issue_tracker_from_config;
use crate::services::{IssueTrackerService, LanguageModelService};

#[derive(Clone)]
pub struct AppContext {
    pub tickets: TicketFactory,
    pub cache: FailureCache,
    pub issue_tracker: Option<Arc<dyn IssueTrackerService>>,
    pub language_model: Option<Arc<dyn LanguageModelService>>,
}

impl AppContext {
    pub fn new(
        tickets: TicketFactory,
        cache: FailureCache,
        issue_tracker: Option<Arc<dyn IssueTrackerService>>,
        language_model: Option<Arc<dyn LanguageModelService>>,
    ) -> Self {
        Self {
            tickets,
            cache,
            issue_tracker,
            language_model,
        }
    }

    /// Builds the context for a command. A tracker that cannot be set up is
    /// reported and left out rather than failing the command.
    pub fn from_config(
        config: &AppConfig,
        language_model: Option<Arc<dyn LanguageModelService>>,
    ) -> Self {
        let issue_tracker = match issue_tracker_from_config(config) {
            Ok(tracker) => tracker,
            Err(err) => {
                warn!("failed to initialize issue tracker: {err}");
                None
            }
        };
        Self::new(
            TicketFactory::default(),
            FailureCache::new(config.cache_dir.clone()),
            issue_tracker,
            language_model,
        )
    }
}
