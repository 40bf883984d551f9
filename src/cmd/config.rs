use std::path::Path;

use clap::Args;

use crate::config::StoredConfig;
use crate::error::AppResult;

#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Update current sprint focus.
    #[arg(long)]
    pub sprint_focus: Option<String>,
    /// Update quarter objectives.
    #[arg(long)]
    pub quarter_objectives: Option<String>,
    /// Set LLM provider.
    #[arg(long, value_parser = ["openai", "llama"])]
    pub llm_provider: Option<String>,
    /// Set the model name sent to the LLM provider.
    #[arg(long)]
    pub llm_model: Option<String>,
    /// Set the LLM endpoint (OpenAI-compatible base URL or llama.cpp server).
    #[arg(long)]
    pub llm_endpoint: Option<String>,
    /// Set OpenAI API key.
    #[arg(long)]
    pub openai_api_key: Option<String>,
    /// Set issue tracker provider.
    #[arg(long, value_parser = ["github"])]
    pub tracker_provider: Option<String>,
    /// Set GitHub repository (org/repo).
    #[arg(long)]
    pub github_repo: Option<String>,
    /// Set GitHub token.
    #[arg(long)]
    pub github_token: Option<String>,
}

impl ConfigArgs {
    fn is_empty(&self) -> bool {
        self.sprint_focus.is_none()
            && self.quarter_objectives.is_none()
            && self.llm_provider.is_none()
            && self.llm_model.is_none()
            && self.llm_endpoint.is_none()
            && self.openai_api_key.is_none()
            && self.tracker_provider.is_none()
            && self.github_repo.is_none()
            && self.github_token.is_none()
    }

    fn apply(self, cfg: &mut StoredConfig) {
        if let Some(focus) = self.sprint_focus {
            cfg.team_context.current_sprint_focus = focus;
        }
        if let Some(objectives) = self.quarter_objectives {
            cfg.team_context.quarter_objectives = objectives;
        }
        set(&mut cfg.llm_config.provider, self.llm_provider);
        set(&mut cfg.llm_config.model, self.llm_model);
        set(&mut cfg.llm_config.endpoint, self.llm_endpoint);
        set(&mut cfg.llm_config.api_key, self.openai_api_key);
        set(&mut cfg.issue_tracker.provider, self.tracker_provider);
        set(&mut cfg.issue_tracker.repo, self.github_repo);
        set(&mut cfg.issue_tracker.token, self.github_token);
    }
}

/// `-` clears a value.
fn set(target: &mut Option<String>, value: Option<String>) {
    match value.as_deref().map(str::trim) {
        None => {}
        Some("-") => *target = None,
        Some(v) => *target = Some(v.to_string()),
    }
}

pub fn run(path: &Path, args: ConfigArgs) -> AppResult<()> {
    let mut cfg = StoredConfig::load_or_init(path)?;

    if !args.is_empty() {
        args.apply(&mut cfg);
        cfg.save(path)?;
        println!("✅ Configuration updated successfully!");
    }

    show(path, &cfg);
    Ok(())
}

fn show(path: &Path, cfg: &StoredConfig) {
    println!("\nConfiguration file: {}", path.display());
    println!("Sprint focus: {}", cfg.team_context.current_sprint_focus);
    println!("Quarter objectives: {}", cfg.team_context.quarter_objectives);
    println!("LLM provider: {}", display_value(&cfg.llm_config.provider));
    println!("LLM model: {}", display_value(&cfg.llm_config.model));
    println!("LLM endpoint: {}", display_value(&cfg.llm_config.endpoint));
    println!("OpenAI API key: {}", mask_secret(&cfg.llm_config.api_key));
    println!("Tracker provider: {}", display_value(&cfg.issue_tracker.provider));
    println!("GitHub repo: {}", display_value(&cfg.issue_tracker.repo));
    println!("GitHub token: {}", mask_secret(&cfg.issue_tracker.token));
    if let Some(dir) = &cfg.cache_dir {
        println!("Cache directory: {}", dir.display());
    }
}

fn display_value(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<not set>".to_string())
}

fn mask_secret(value: &Option<String>) -> String {
    match value {
        Some(token) if token.chars().count() > 6 => {
            let chars: Vec<char> = token.chars().collect();
            let prefix: String = chars[..3].iter().collect();
            let suffix: String = chars[chars.len() - 3..].iter().collect();
            format!("{prefix}***{suffix}")
        }
        Some(token) if !token.is_empty() => "***".to_string(),
        _ => "<not set>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn masks_secrets() {
        assert_eq!(mask_secret(&Some("sk-abcdef123".to_string())), "sk-***123");
        assert_eq!(mask_secret(&Some("short".to_string())), "***");
        assert_eq!(mask_secret(&None), "<not set>");
    }

    #[test]
    fn updates_and_persists_selected_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("terry.yaml");

        run(
            &path,
            ConfigArgs {
                sprint_focus: Some("Payments".to_string()),
                tracker_provider: Some("github".to_string()),
                github_repo: Some("acme/widgets".to_string()),
                ..ConfigArgs::default()
            },
        )
        .unwrap();

        let saved: StoredConfig =
            serde_yaml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved.team_context.current_sprint_focus, "Payments");
        assert_eq!(saved.team_context.quarter_objectives, "Improve Product Quality");
        assert_eq!(saved.issue_tracker.provider.as_deref(), Some("github"));
        assert_eq!(saved.issue_tracker.repo.as_deref(), Some("acme/widgets"));
        assert_eq!(saved.llm_config.provider.as_deref(), Some("openai"));
    }

    #[test]
    fn dash_clears_a_value() {
        let mut cfg = StoredConfig::default();
        cfg.llm_config.api_key = Some("sk-old".to_string());
        ConfigArgs {
            openai_api_key: Some("-".to_string()),
            ..ConfigArgs::default()
        }
        .apply(&mut cfg);
        assert_eq!(cfg.llm_config.api_key, None);
    }

    #[test]
    fn empty_update_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("terry.yaml");
        run(&path, ConfigArgs::default()).unwrap();

        let saved: StoredConfig =
            serde_yaml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved, StoredConfig::default());
    }
}
