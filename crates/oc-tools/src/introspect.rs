//! Annotator introspection tools
//!
//! Read-only lookups against the local module registry; no network calls.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

use oc_core::{Error, Result, Tool, ToolResult};

use crate::modules::ModuleRegistry;

/// List the installed annotator modules
pub struct ListAnnotatorsTool {
    registry: ModuleRegistry,
}

impl ListAnnotatorsTool {
    pub fn new(registry: ModuleRegistry) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl Tool for ListAnnotatorsTool {
    fn name(&self) -> &str {
        "list_annotators"
    }

    fn description(&self) -> &str {
        "List the names of the annotator modules installed on this server."
    }

    fn input_schema(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _input: JsonValue) -> Result<ToolResult> {
        let names = self.registry.list()?;
        Ok(ToolResult::success(names.join("\n")))
    }
}

#[derive(Debug, Deserialize)]
struct DescribeAnnotatorInput {
    annotator: String,
}

/// Describe one installed annotator module
pub struct DescribeAnnotatorTool {
    registry: ModuleRegistry,
}

impl DescribeAnnotatorTool {
    pub fn new(registry: ModuleRegistry) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl Tool for DescribeAnnotatorTool {
    fn name(&self) -> &str {
        "describe_annotator"
    }

    fn description(&self) -> &str {
        "Get the description text of one installed annotator module."
    }

    fn input_schema(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "annotator": {"type": "string", "description": "Annotator module name, e.g. clinvar"}
            },
            "required": ["annotator"]
        })
    }

    async fn execute(&self, input: JsonValue) -> Result<ToolResult> {
        let input: DescribeAnnotatorInput = serde_json::from_value(input)
            .map_err(|e| Error::tool(self.name(), format!("invalid input: {}", e)))?;
        let description = self.registry.describe(&input.annotator)?;
        Ok(ToolResult::success(description))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_registry() -> (tempfile::TempDir, ModuleRegistry) {
        let dir = tempfile::tempdir().unwrap();
        let clinvar = dir.path().join("clinvar");
        std::fs::create_dir_all(&clinvar).unwrap();
        std::fs::write(
            clinvar.join("clinvar.yml"),
            "description: Clinical significance of variants\n",
        )
        .unwrap();
        let registry = ModuleRegistry::new(dir.path());
        (dir, registry)
    }

    #[tokio::test]
    async fn test_list_annotators_output() {
        let (_dir, registry) = fixture_registry();
        let tool = ListAnnotatorsTool::new(registry);

        let result = tool.execute(json!({})).await.unwrap();
        assert_eq!(result.output, "clinvar");
    }

    #[tokio::test]
    async fn test_describe_annotator_output() {
        let (_dir, registry) = fixture_registry();
        let tool = DescribeAnnotatorTool::new(registry);

        let result = tool
            .execute(json!({"annotator": "clinvar"}))
            .await
            .unwrap();
        assert_eq!(result.output, "Clinical significance of variants");
    }

    #[tokio::test]
    async fn test_describe_annotator_missing_module() {
        let (_dir, registry) = fixture_registry();
        let tool = DescribeAnnotatorTool::new(registry);

        let err = tool
            .execute(json!({"annotator": "missing"}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ToolExecution { .. }));
    }
}
