//! Tests for the tool system.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use toolchat::error::ToolchatError;
use toolchat::tools::builtin::all_tools;
use toolchat::tools::*;

#[test]
fn parameter_builder_constructs_schema() {
    let params = ToolParameters::object()
        .string("query", "Search query", true)
        .integer("limit", "Max results", false)
        .boolean("verbose", "Enable verbose output", false)
        .build();

    let schema = &params.schema;
    assert_eq!(schema["type"], "object");
    assert_eq!(schema["properties"]["query"]["type"], "string");
    assert_eq!(schema["properties"]["limit"]["type"], "integer");
    assert_eq!(schema["required"], serde_json::json!(["query"]));
}

#[test]
fn empty_parameters() {
    let params = ToolParameters::empty();
    assert_eq!(params.schema["type"], "object");
    assert_eq!(params.schema["properties"], serde_json::json!({}));
}

#[test]
fn tool_arguments_accessors() {
    let args = ToolArguments::new(serde_json::json!({"name": "Alice", "limit": 5, "deep": true}));
    assert_eq!(args.get_str("name").unwrap(), "Alice");
    assert!(matches!(args.get_str("missing"), Err(ToolchatError::InvalidArgument(_))));
    assert_eq!(args.get_str_opt("missing"), None);
    assert_eq!(args.get_u64_opt("limit"), Some(5));
    assert!(args.get_bool_or("deep", false));
    assert!(args.get_bool_or("absent", true));
}

#[test]
fn tool_arguments_deserialize() {
    #[derive(serde::Deserialize)]
    struct Params {
        path: String,
        max_results: Option<u32>,
    }

    let mut input = serde_json::Map::new();
    input.insert("path".into(), serde_json::json!("src"));
    let args = ToolArguments::from_map(&input);
    let params: Params = args.deserialize().unwrap();
    assert_eq!(params.path, "src");
    assert_eq!(params.max_results, None);
}

#[test]
fn tool_result_payload_prefers_data() {
    assert_eq!(ToolResult::ok("text").payload(), serde_json::json!("text"));
    assert_eq!(
        ToolResult::ok_with_data("text", serde_json::json!({"n": 1})).payload(),
        serde_json::json!({"n": 1})
    );
    assert_eq!(
        ToolResult::ok_with_data("text", serde_json::Value::Null).payload(),
        serde_json::json!("text")
    );
    let failed = ToolResult::failed("nope");
    assert!(!failed.success);
    assert_eq!(failed.error.as_deref(), Some("nope"));
}

#[test]
fn builtin_tools_register_without_conflict() {
    let registry = ToolRegistry::from_tools(all_tools()).unwrap();
    assert_eq!(registry.len(), 3);
    let names: Vec<String> = registry.definitions().into_iter().map(|d| d.name).collect();
    assert_eq!(names, vec!["read_file", "list_directory", "search_files"]);
}

#[tokio::test]
async fn executor_runs_builtin_read_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("notes.txt");
    std::fs::write(&file, "remember the milk").unwrap();

    let registry = ToolRegistry::from_tools(all_tools()).unwrap();
    let executor = ToolExecutor::new(Arc::new(registry), Duration::from_secs(5));
    let mut input = serde_json::Map::new();
    input.insert("path".into(), serde_json::json!(file.to_str().unwrap()));

    let result = executor
        .invoke(&CancellationToken::new(), "read_file", &input)
        .await
        .unwrap();
    assert!(result.success);
    assert_eq!(result.output, "remember the milk");
}

#[tokio::test]
async fn executor_lists_registry_definitions() {
    let registry = ToolRegistry::from_tools(all_tools()).unwrap();
    let executor = ToolExecutor::new(Arc::new(registry), DEFAULT_TOOL_TIMEOUT);
    let defs = executor.list_available();
    assert_eq!(defs.len(), 3);
    assert!(defs.iter().all(|d| d.input_schema["type"] == "object"));
}
