use crate::{Result, Tool, ToolError, ToolResult};
use serde_json::Value;
use std::sync::Arc;

/// Registry for the tools available to the agent.
///
/// The registry is responsible for:
/// - Registering tools, rejecting duplicate names
/// - Looking up tools by name
/// - Executing tools
/// - Providing tool specifications for display
///
/// Registration order is preserved and is the order in which the agent runs
/// candidate tools.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool. Returns false if a tool with the same name exists.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> bool {
        if self.get(tool.name()).is_some() {
            return false;
        }

        self.tools.push(tool);
        true
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|tool| tool.name() == name)
    }

    /// All registered tools, in registration order.
    pub fn all(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a tool by name.
    pub fn execute(&self, name: &str, input: Value) -> Result<ToolResult> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        tool.execute(input)
    }

    /// Tool specifications as JSON objects.
    pub fn tool_specs(&self) -> Vec<Value> {
        self.tools
            .iter()
            .map(|tool| {
                serde_json::json!({
                    "name": tool.name(),
                    "description": tool.description(),
                    "keywords": tool.keywords(),
                    "parameters": tool.parameter_schema(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{SettlementInputs, SettlementResult};
    use crate::tool::parse_input;

    struct TestTool(&'static str);

    impl Tool for TestTool {
        fn name(&self) -> &str {
            self.0
        }

        fn label(&self) -> &str {
            "test"
        }

        fn description(&self) -> &str {
            "A test tool"
        }

        fn trace_step(&self) -> &str {
            "test_tool"
        }

        fn keywords(&self) -> &[&str] {
            &["test"]
        }

        fn parameter_schema(&self) -> Value {
            serde_json::json!({})
        }

        fn usage_hint(&self) -> &str {
            "Provide test values."
        }

        fn extract(&self, _question: &str, _context: &str) -> Option<Value> {
            None
        }

        fn execute(&self, input: Value) -> Result<ToolResult> {
            let inputs: SettlementInputs = parse_input(input)?;
            Ok(ToolResult::Settlement(SettlementResult {
                settlement: inputs.load / inputs.youngs_modulus,
                units: "",
                formula: "",
                inputs,
            }))
        }
    }

    #[test]
    fn test_registry_preserves_order() {
        let mut registry = ToolRegistry::new();
        assert!(registry.register(Arc::new(TestTool("first"))));
        assert!(registry.register(Arc::new(TestTool("second"))));

        let names: Vec<&str> = registry.all().iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let mut registry = ToolRegistry::new();
        assert!(registry.register(Arc::new(TestTool("test"))));
        assert!(!registry.register(Arc::new(TestTool("test"))));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_execute_unknown_tool() {
        let registry = ToolRegistry::new();
        let err = registry.execute("missing", Value::Null).unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(name) if name == "missing"));
    }

    #[test]
    fn test_execute_by_name() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(TestTool("test")));

        let input = serde_json::json!({"load": 10.0, "youngs_modulus": 5.0});
        let result = registry.execute("test", input).unwrap();
        assert_eq!(result.value(), 2.0);
    }

    #[test]
    fn test_tool_specs() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(TestTool("test")));

        let specs = registry.tool_specs();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0]["name"], "test");
        assert_eq!(specs[0]["keywords"][0], "test");
    }
}
