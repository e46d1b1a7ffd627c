//! Configuration system (layered: defaults < TOML file < env < CLI flags).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ToolchatError;
use crate::memory::MemoryConfig;

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "toolchat.toml";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant working in the user's project. \
Use the available tools to inspect files when that helps you answer accurately. \
Keep answers concise.";

/// Layered configuration for toolchat.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToolchatConfig {
    pub ai: AiConfig,
    pub memory: MemoryConfig,
    pub context: ContextConfig,
}

#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AiConfig {
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
    /// Only ever read from the environment.
    #[serde(skip)]
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub system_prompt: String,
    pub tool_timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: "anthropic".into(),
            model: "claude-sonnet-4-5".into(),
            base_url: None,
            api_key: None,
            max_tokens: 4096,
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            tool_timeout_secs: 30,
        }
    }
}

impl std::fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| ".."))
            .field("max_tokens", &self.max_tokens)
            .field("tool_timeout_secs", &self.tool_timeout_secs)
            .finish()
    }
}

/// Files gathered into the prompt prefix when `--context` is given.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ContextConfig {
    pub files: Vec<PathBuf>,
    pub max_bytes: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            files: vec![PathBuf::from("README.md")],
            max_bytes: 65_536,
        }
    }
}

impl ToolchatConfig {
    /// Resolve configuration from file and environment.
    ///
    /// An explicit path must exist. Without one, `./toolchat.toml` is tried,
    /// then the platform config directory; a missing default file is fine.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ToolchatError> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error

        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ToolchatError> {
        debug!(path = %path.display(), "loading config file");
        let text = std::fs::read_to_string(path).map_err(|e| {
            ToolchatError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ToolchatError> {
        Ok(toml::from_str(text)?)
    }

    /// Overlay environment variables read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(key) = non_empty("ANTHROPIC_API_KEY") {
            self.ai.api_key = Some(key);
        }
        if let Some(url) = non_empty("ANTHROPIC_BASE_URL") {
            self.ai.base_url = Some(url);
        }
        if let Some(provider) = non_empty("TOOLCHAT_PROVIDER") {
            self.ai.provider = provider;
        }
        if let Some(model) = non_empty("TOOLCHAT_MODEL") {
            self.ai.model = model;
        }
    }

    /// Overlay command-line flags, the highest-precedence layer.
    pub fn apply_overrides(&mut self, provider: Option<String>, model: Option<String>) {
        if let Some(provider) = provider {
            self.ai.provider = provider;
        }
        if let Some(model) = model {
            self.ai.model = model;
        }
    }

    /// Provider name reported in execution metadata.
    pub fn provider_name(&self) -> &str {
        if self.ai.provider.is_empty() {
            "unknown"
        } else {
            &self.ai.provider
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }
    directories::ProjectDirs::from("", "", "toolchat")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .filter(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_anthropic() {
        let config = ToolchatConfig::default();
        assert_eq!(config.ai.provider, "anthropic");
        assert_eq!(config.ai.max_tokens, 4096);
        assert_eq!(config.ai.tool_timeout_secs, 30);
        assert!(!config.memory.enabled);
        assert_eq!(config.context.max_bytes, 65_536);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = ToolchatConfig::from_toml_str(
            r#"
            [ai]
            model = "claude-haiku"

            [memory]
            enabled = true
            "#,
        )
        .unwrap();
        assert_eq!(config.ai.model, "claude-haiku");
        assert_eq!(config.ai.provider, "anthropic");
        assert!(config.memory.enabled);
        assert_eq!(config.memory.file, "MEMORY.md");
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = ToolchatConfig::from_toml_str("[ai\nmodel = ").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ConfigError);
    }

    #[test]
    fn env_overrides_file_and_flags_override_env() {
        let mut config = ToolchatConfig::from_toml_str("[ai]\nmodel = \"from-file\"").unwrap();
        config.apply_env(|key| match key {
            "TOOLCHAT_MODEL" => Some("from-env".into()),
            "ANTHROPIC_API_KEY" => Some("sk-env".into()),
            "TOOLCHAT_PROVIDER" => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.ai.model, "from-env");
        assert_eq!(config.ai.api_key.as_deref(), Some("sk-env"));
        assert_eq!(config.ai.provider, "anthropic");

        config.apply_overrides(None, Some("from-flag".into()));
        assert_eq!(config.ai.model, "from-flag");
    }

    #[test]
    fn api_key_is_never_serialized() {
        let mut config = ToolchatConfig::default();
        config.ai.api_key = Some("sk-secret".into());
        let text = toml::to_string(&config).unwrap();
        assert!(!text.contains("sk-secret"));
        assert!(!format!("{config:?}").contains("sk-secret"));
    }

    #[test]
    fn empty_provider_reports_unknown() {
        let mut config = ToolchatConfig::default();
        config.ai.provider.clear();
        assert_eq!(config.provider_name(), "unknown");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ToolchatConfig::load(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(matches!(err, ToolchatError::Configuration(_)));
    }
}
