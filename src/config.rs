use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const CONFIG_FILE_NAME: &str = ".terry_config.yaml";
pub const DEFAULT_CACHE_DIR: &str = "/var/tmp/terry_cache";

/// The YAML document kept in the user's home directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredConfig {
    pub team_context: TeamContext,
    pub llm_config: LlmSettings,
    pub issue_tracker: TrackerSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamContext {
    pub current_sprint_focus: String,
    pub quarter_objectives: String,
}

impl Default for TeamContext {
    fn default() -> Self {
        Self {
            current_sprint_focus: "General Development".to_string(),
            quarter_objectives: "Improve Product Quality".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: Some("openai".to_string()),
            model: None,
            endpoint: None,
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerSettings {
    pub provider: Option<String>,
    pub repo: Option<String>,
    pub token: Option<String>,
}

pub fn config_file_path(override_path: Option<&Path>) -> AppResult<PathBuf> {
    if let Some(path) = override_path {
        return Ok(path.to_path_buf());
    }
    let home = home::home_dir().ok_or_else(|| {
        AppError::Configuration("home directory not found; set HOME or --config".to_string())
    })?;
    Ok(home.join(CONFIG_FILE_NAME))
}

impl StoredConfig {
    /// Reads the config, writing defaults on first use and filling any missing
    /// sections back into the file.
    pub fn load_or_init(path: &Path) -> AppResult<Self> {
        let config = match fs::read_to_string(path) {
            Ok(contents) if contents.trim().is_empty() => Self::default(),
            Ok(contents) => serde_yaml::from_str::<Self>(&contents).map_err(|err| {
                AppError::Configuration(format!("invalid config file {}: {err}", path.display()))
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("writing default configuration to {}", path.display());
                Self::default()
            }
            Err(err) => return Err(AppError::Io(err)),
        };

        config.save(path)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let data = serde_yaml::to_string(self)?;
        fs::write(path, data)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmProvider {
    OpenAi,
    Llama,
    Custom(String),
}

impl LlmProvider {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            None | Some("") | Some("openai") => LlmProvider::OpenAi,
            Some("llama") => LlmProvider::Llama,
            Some(other) => LlmProvider::Custom(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerProvider {
    GitHub,
    Custom(String),
}

impl TrackerProvider {
    pub fn parse(value: Option<&str>) -> Option<Self> {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            None | Some("") => None,
            Some("github") => Some(TrackerProvider::GitHub),
            Some(other) => Some(TrackerProvider::Custom(other.to_string())),
        }
    }
}

/// Effective settings for one invocation: stored values, then environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub team_context: TeamContext,
    pub llm_provider: LlmProvider,
    pub llm_model: Option<String>,
    pub llm_endpoint: Option<String>,
    pub openai_api_key: Option<String>,
    pub tracker_provider: Option<TrackerProvider>,
    pub github_repo: Option<String>,
    pub github_token: Option<String>,
    pub cache_dir: PathBuf,
}

impl AppConfig {
    pub fn resolve(stored: &StoredConfig, cache_dir_override: Option<PathBuf>) -> Self {
        Self::resolve_with(stored, cache_dir_override, |key| env::var(key).ok())
    }

    pub fn resolve_with(
        stored: &StoredConfig,
        cache_dir_override: Option<PathBuf>,
        lookup_env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let from_env = |key: &str| lookup_env(key).filter(|value| !value.trim().is_empty());

        Self {
            team_context: stored.team_context.clone(),
            llm_provider: LlmProvider::parse(stored.llm_config.provider.as_deref()),
            llm_model: stored.llm_config.model.clone(),
            llm_endpoint: stored.llm_config.endpoint.clone(),
            openai_api_key: non_empty(&stored.llm_config.api_key)
                .or_else(|| from_env("OPENAI_API_KEY")),
            tracker_provider: TrackerProvider::parse(stored.issue_tracker.provider.as_deref()),
            github_repo: non_empty(&stored.issue_tracker.repo).or_else(|| from_env("GITHUB_REPO")),
            github_token: non_empty(&stored.issue_tracker.token)
                .or_else(|| from_env("GITHUB_TOKEN")),
            cache_dir: cache_dir_override
                .or_else(|| stored.cache_dir.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR)),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.trim().is_empty())
}
