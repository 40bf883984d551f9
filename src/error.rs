use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("issue tracker error: {0}")]
    IssueTracker(String),
    #[error("language model error: {0}")]
    LanguageModel(String),
    #[error("cache error: {0}")]
    Cache(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl AppError {
    /// The message as the failing component reported it, without the
    /// category prefix used by `Display`.
    pub fn detail(&self) -> String {
        match self {
            AppError::Configuration(message)
            | AppError::IssueTracker(message)
            | AppError::LanguageModel(message)
            | AppError::Cache(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_drops_the_category_prefix() {
        let err = AppError::IssueTracker("Failed to create GitHub issue: 502".to_string());
        assert_eq!(err.to_string(), "issue tracker error: Failed to create GitHub issue: 502");
        assert_eq!(err.detail(), "Failed to create GitHub issue: 502");

        let err = AppError::Io(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.detail(), "gone");
    }
}
