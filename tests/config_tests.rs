//! Tests for configuration loading.

use std::io::Write;

use toolchat::config::ToolchatConfig;
use toolchat::error::ToolchatError;

#[test]
fn explicit_file_is_loaded() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[ai]
model = "claude-from-file"
max_tokens = 1024
tool_timeout_secs = 5

[memory]
enabled = true
file = "NOTES.md"
sections = ["project_context"]

[context]
files = ["README.md", "Cargo.toml"]
max_bytes = 2048
"#
    )
    .unwrap();

    let config = ToolchatConfig::from_file(file.path()).unwrap();
    assert_eq!(config.ai.model, "claude-from-file");
    assert_eq!(config.ai.max_tokens, 1024);
    assert_eq!(config.ai.tool_timeout_secs, 5);
    assert!(config.memory.enabled);
    assert_eq!(config.memory.file, "NOTES.md");
    assert!(config.memory.create_if_missing);
    assert_eq!(config.context.files.len(), 2);
    assert_eq!(config.context.max_bytes, 2048);
}

#[test]
fn api_key_in_file_is_ignored() {
    let config = ToolchatConfig::from_toml_str("[ai]\napi_key = \"sk-file\"\n").unwrap();
    assert_eq!(config.ai.api_key, None);
}

#[test]
fn malformed_file_is_a_parse_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[ai]\nmax_tokens = \"many\"").unwrap();
    let err = ToolchatConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, ToolchatError::ConfigParse(_)));
}

#[test]
fn env_layer_sets_key_and_base_url() {
    let mut config = ToolchatConfig::default();
    config.apply_env(|key| match key {
        "ANTHROPIC_API_KEY" => Some("sk-env".into()),
        "ANTHROPIC_BASE_URL" => Some("http://localhost:9999".into()),
        _ => None,
    });
    assert_eq!(config.ai.api_key.as_deref(), Some("sk-env"));
    assert_eq!(config.ai.base_url.as_deref(), Some("http://localhost:9999"));
}
