//! Tool System
//!
//! Free-text tool framework for solver capabilities. A tool is a name, a
//! description shown to the LLM, and a callable that maps free text to free
//! text. The registry preserves registration order so the tool lineup is
//! deterministic.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AgentError, Result};

/// Tool trait - implement to add new capabilities
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool identifier
    fn name(&self) -> &str;

    /// Human-readable description (shown to the LLM)
    fn description(&self) -> &str;

    /// Run the tool on free-text input, returning free-text output
    async fn invoke(&self, input: &str) -> Result<String>;
}

/// Name + description pair, the externally visible shape of a tool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
}

/// Ordered registry of available tools
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a new tool. Order of registration is preserved.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.push(Arc::new(tool));
    }

    /// Register an already-shared tool
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) {
        self.tools.push(tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    /// Invoke a tool by name
    pub async fn invoke(&self, name: &str, input: &str) -> Result<String> {
        let tool = self
            .get(name)
            .ok_or_else(|| AgentError::ToolNotFound(name.to_string()))?;
        tool.invoke(input).await
    }

    /// Descriptors for all tools, in registration order
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools
            .iter()
            .map(|t| ToolDescriptor {
                name: t.name().to_string(),
                description: t.description().to_string(),
            })
            .collect()
    }

    /// Tool names, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Generate the system prompt section describing available tools
    pub fn prompt_section(&self) -> String {
        let mut prompt = String::from("## Available Tools\n\n");
        prompt.push_str("You can use one tool at a time by responding with a JSON block:\n\n");
        prompt.push_str("```tool\n{\"tool\": \"tool_name\", \"input\": \"free text for the tool\"}\n```\n\n");

        for tool in &self.tools {
            prompt.push_str(&format!("### {}\n{}\n\n", tool.name(), tool.description()));
        }

        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UpperTool;

    #[async_trait]
    impl Tool for UpperTool {
        fn name(&self) -> &str {
            "upper"
        }

        fn description(&self) -> &str {
            "Uppercase the input."
        }

        async fn invoke(&self, input: &str) -> Result<String> {
            Ok(input.to_uppercase())
        }
    }

    struct ReverseTool;

    #[async_trait]
    impl Tool for ReverseTool {
        fn name(&self) -> &str {
            "reverse"
        }

        fn description(&self) -> &str {
            "Reverse the input."
        }

        async fn invoke(&self, input: &str) -> Result<String> {
            Ok(input.chars().rev().collect())
        }
    }

    #[tokio::test]
    async fn test_registry_preserves_order() {
        let mut registry = ToolRegistry::new();
        registry.register(UpperTool);
        registry.register(ReverseTool);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["upper", "reverse"]);
        assert_eq!(registry.invoke("upper", "abc").await.unwrap(), "ABC");
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let registry = ToolRegistry::new();
        let err = registry.invoke("missing", "x").await.unwrap_err();
        assert!(matches!(err, AgentError::ToolNotFound(_)));
    }

    #[test]
    fn test_prompt_section_lists_tools() {
        let mut registry = ToolRegistry::new();
        registry.register(UpperTool);

        let section = registry.prompt_section();
        assert!(section.contains("### upper"));
        assert!(section.contains("Uppercase the input."));
    }
}
