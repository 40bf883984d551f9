pub mod github;
pub mod llama;
pub mod openai;
pub mod prompt;

use std::sync::Arc;

use tracing::warn;

use crate::config::{AppConfig, LlmProvider, TrackerProvider};
use crate::error::{AppError, AppResult};
use crate::services::{IssueTrackerService, LanguageModelService};

use self::github::GitHubClient;
use self::llama::LlamaClient;
use self::openai::OpenAiClient;

pub fn language_model_from_config(config: &AppConfig) -> AppResult<Arc<dyn LanguageModelService>> {
    let openai = || -> AppResult<Arc<dyn LanguageModelService>> {
        Ok(Arc::new(OpenAiClient::new(
            config.openai_api_key.clone(),
            config.llm_model.clone(),
            config.llm_endpoint.clone(),
            config.team_context.clone(),
        )?))
    };

    match &config.llm_provider {
        LlmProvider::OpenAi => openai(),
        LlmProvider::Llama => Ok(Arc::new(LlamaClient::new(
            config.llm_endpoint.clone(),
            config.team_context.clone(),
        )?)),
        LlmProvider::Custom(provider) => {
            warn!("unknown LLM provider '{provider}', using OpenAI");
            openai()
        }
    }
}

/// `Ok(None)` when no tracker is configured.
pub fn issue_tracker_from_config(
    config: &AppConfig,
) -> AppResult<Option<Arc<dyn IssueTrackerService>>> {
    match &config.tracker_provider {
        None => Ok(None),
        Some(TrackerProvider::GitHub) => Ok(Some(Arc::new(GitHubClient::new(
            config.github_token.clone(),
            config.github_repo.clone(),
        )?))),
        Some(TrackerProvider::Custom(provider)) => Err(AppError::Configuration(format!(
            "unsupported issue tracker type: {provider}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoredConfig;

    fn config_with(edit: impl FnOnce(&mut StoredConfig)) -> AppConfig {
        let mut stored = StoredConfig::default();
        edit(&mut stored);
        AppConfig::resolve_with(&stored, None, |_| None)
    }

    #[test]
    fn openai_without_key_is_configuration_error() {
        let config = config_with(|_| {});
        assert!(matches!(
            language_model_from_config(&config),
            Err(AppError::Configuration(_))
        ));
    }

    #[test]
    fn llama_needs_no_credentials() {
        let config = config_with(|c| c.llm_config.provider = Some("llama".to_string()));
        assert!(language_model_from_config(&config).is_ok());
    }

    #[test]
    fn unknown_llm_provider_falls_back_to_openai() {
        let config = config_with(|c| {
            c.llm_config.provider = Some("gemini".to_string());
            c.llm_config.api_key = Some("sk-test".to_string());
        });
        assert!(language_model_from_config(&config).is_ok());
    }

    #[test]
    fn tracker_is_optional() {
        let config = config_with(|_| {});
        assert!(issue_tracker_from_config(&config).unwrap().is_none());

        let config = config_with(|c| {
            c.issue_tracker.provider = Some("github".to_string());
            c.issue_tracker.repo = Some("acme/widgets".to_string());
            c.issue_tracker.token = Some("ghp-test".to_string());
        });
        let tracker = issue_tracker_from_config(&config).unwrap().unwrap();
        assert_eq!(tracker.kind(), github::TRACKER_KIND);

        let config = config_with(|c| c.issue_tracker.provider = Some("jira".to_string()));
        assert!(issue_tracker_from_config(&config).is_err());
    }
}
