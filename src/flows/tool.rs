//! Tool flow - the mention loader exposed as a callable tool capability
//!
//! Input is `{"mentions": ["@README", "docs/"]}`; output is
//! `{"loaded_files": [...], "content": "..." | null, "message"?: "..."}`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::core::render::RenderConfig;
use crate::engine::MentionEngine;
use crate::flows::prompt::loaded_message;
use crate::mentions::scan::from_list;

pub const TOOL_NAME: &str = "mention_loader";

pub const TOOL_DESCRIPTION: &str =
    "Load file or directory content when @mentions are used in prompts";

/// Name, description and JSON input schema of the tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

pub fn input_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "mentions": {
                "type": "array",
                "items": {"type": "string"},
                "description": "List of @mentioned file or directory paths"
            }
        },
        "required": ["mentions"]
    })
}

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: TOOL_NAME.to_string(),
        description: TOOL_DESCRIPTION.to_string(),
        input_schema: input_schema(),
    }
}

/// Result of one tool call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub loaded_files: Vec<String>,
    /// `null` when nothing loaded
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// String items of `input.mentions`; anything else is ignored
fn mention_items(input: &Value) -> Vec<&str> {
    input
        .get("mentions")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

/// Execute a tool call. Malformed input degrades to an empty mention list.
pub async fn execute(engine: &MentionEngine, input: &Value) -> ToolOutput {
    let mentions = from_list(&mention_items(input));
    let aggregation = engine.process_mentions(&mentions).await;

    let message = if engine.config().show_loaded_files {
        loaded_message(&aggregation.manifest)
    } else {
        None
    };

    ToolOutput {
        loaded_files: aggregation.manifest.loaded_paths(),
        content: if aggregation.context_text.is_empty() {
            None
        } else {
            Some(aggregation.context_text)
        },
        message,
    }
}

fn to_json<T: Serialize>(value: &T, config: RenderConfig) -> Result<String> {
    let text = if config.pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    text.context("Failed to serialize tool output")
}

/// Run the `tool` command on a JSON input document
pub async fn run_tool(engine: &MentionEngine, input: &str, config: RenderConfig) -> Result<()> {
    let value: Value = serde_json::from_str(input).context("Tool input is not valid JSON")?;
    let output = execute(engine, &value).await;
    println!("{}", to_json(&output, config)?);
    Ok(())
}

/// Run the `schema` command
pub fn run_schema(config: RenderConfig) -> Result<()> {
    println!("{}", to_json(&descriptor(), config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoaderConfig;
    use std::fs;
    use tempfile::TempDir;

    fn engine_in(dir: &std::path::Path, show: bool) -> MentionEngine {
        MentionEngine::new(LoaderConfig {
            base_dir: Some(dir.to_path_buf()),
            show_loaded_files: show,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_descriptor() {
        let d = descriptor();
        assert_eq!(d.name, "mention_loader");
        assert_eq!(d.input_schema["type"], "object");
        assert_eq!(d.input_schema["required"], json!(["mentions"]));
        assert_eq!(
            d.input_schema["properties"]["mentions"]["items"]["type"],
            "string"
        );
    }

    #[tokio::test]
    async fn test_execute_loads_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("README.md"), "# Hello").unwrap();
        let engine = engine_in(dir.path(), true);

        let output = execute(&engine, &json!({"mentions": ["@README"]})).await;

        assert_eq!(output.loaded_files.len(), 1);
        assert!(output.loaded_files[0].ends_with("README.md"));
        assert!(output.content.as_deref().unwrap().contains("# Hello"));
        assert!(output.message.unwrap().starts_with("Loaded 1 file(s)"));
    }

    #[tokio::test]
    async fn test_execute_nothing_loaded() {
        let dir = TempDir::new().unwrap();
        let engine = engine_in(dir.path(), true);

        let output = execute(&engine, &json!({"mentions": ["@nope", "@", "   "]})).await;

        assert!(output.loaded_files.is_empty());
        assert!(output.content.is_none());
        assert!(output.message.is_none());

        let serialized = serde_json::to_value(&output).unwrap();
        assert_eq!(serialized["content"], Value::Null);
        assert!(serialized.get("message").is_none());
    }

    #[tokio::test]
    async fn test_execute_malformed_input() {
        let dir = TempDir::new().unwrap();
        let engine = engine_in(dir.path(), true);

        for input in [json!({}), json!({"mentions": "README"}), json!([1, 2])] {
            let output = execute(&engine, &input).await;
            assert_eq!(output, ToolOutput::default());
        }
    }

    #[tokio::test]
    async fn test_execute_ignores_non_string_items() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        let engine = engine_in(dir.path(), false);

        let output = execute(&engine, &json!({"mentions": [1, null, "a", {"x": 1}]})).await;
        assert_eq!(output.loaded_files.len(), 1);
        assert!(output.message.is_none());
    }

    #[tokio::test]
    async fn test_execute_item_with_spaces() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("my dir");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("config file.txt"), "cfg").unwrap();
        let engine = engine_in(dir.path(), true);

        let output = execute(&engine, &json!({"mentions": ["@my dir/config file.txt"]})).await;
        assert_eq!(output.loaded_files.len(), 1);
    }
}
