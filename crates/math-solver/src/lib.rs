//! # math-solver
//!
//! Math problem solving toolkit for the agent: read-only lookup tools over
//! free public APIs plus two thin LLM-backed wrappers, and the fixed prompts
//! that shape the tutor's behavior.
//!
//! ## Tool lineup
//!
//! `solver_toolset` always yields exactly five tools, in this order:
//!
//! 1. `wikipedia` — encyclopedia lookup (top 2 results)
//! 2. `arxiv` — academic-paper lookup (top 1 result)
//! 3. `web_search` — general web search
//! 4. `calculator` — model-backed arithmetic
//! 5. `math_reasoning` — model-backed step-by-step explanations

pub mod error;
pub mod prompt;
pub mod toolkit;

pub use error::{Result, SolverError};
pub use prompt::{EXAMPLE_PROBLEMS, GREETING, MATH_TUTOR_PROMPT};

use std::sync::Arc;

use agent_core::{LlmProvider, ToolRegistry, provider::GenerationOptions};

use crate::toolkit::{ArxivTool, CalculatorTool, MathReasoningTool, WebSearchTool, WikipediaTool};

/// Build the full tool lineup. Deterministic given a provider; the
/// model-backed tools share the viewer's generation settings.
pub fn solver_toolset(
    provider: Arc<dyn LlmProvider>,
    generation: &GenerationOptions,
) -> ToolRegistry {
    let mut tools = ToolRegistry::new();

    tools.register(WikipediaTool::new());
    tools.register(ArxivTool::new());
    tools.register(WebSearchTool::new());
    tools.register(CalculatorTool::new(provider.clone(), generation.clone()));
    tools.register(MathReasoningTool::new(provider, generation.clone()));

    tools
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::{
        AgentError, Message,
        provider::{Completion, CompletionStream},
    };
    use async_trait::async_trait;

    struct StubProvider;

    #[async_trait]
    impl LlmProvider for StubProvider {
        async fn health_check(&self) -> agent_core::Result<bool> {
            Ok(true)
        }

        async fn complete(
            &self,
            messages: &[Message],
            options: &GenerationOptions,
        ) -> agent_core::Result<Completion> {
            Ok(Completion {
                content: format!("stub: {}", messages.last().map_or("", |m| &m.content)),
                model: options.model.clone(),
                usage: None,
                finish_reason: None,
            })
        }

        async fn complete_stream(
            &self,
            _messages: &[Message],
            _options: &GenerationOptions,
        ) -> agent_core::Result<CompletionStream> {
            Err(AgentError::Provider("not streamed in tests".into()))
        }
    }

    #[test]
    fn test_toolset_fixed_lineup() {
        let tools = solver_toolset(Arc::new(StubProvider), &GenerationOptions::default());

        assert_eq!(tools.len(), 5);
        assert_eq!(
            tools.names(),
            vec!["wikipedia", "arxiv", "web_search", "calculator", "math_reasoning"]
        );
    }

    #[test]
    fn test_toolset_ignores_generation_values() {
        // Same lineup no matter what the viewer configured
        let generation = GenerationOptions {
            model: "llama3-70b-8192".into(),
            temperature: 0.9,
            ..Default::default()
        };
        let tools = solver_toolset(Arc::new(StubProvider), &generation);
        assert_eq!(tools.len(), 5);
        assert_eq!(tools.names()[0], "wikipedia");
    }

    #[tokio::test]
    async fn test_calculator_returns_raw_model_text() {
        let tools = solver_toolset(Arc::new(StubProvider), &GenerationOptions::default());

        let output = tools.invoke("calculator", "2 + 2").await.unwrap();
        assert!(output.starts_with("stub:"));
        assert!(output.contains("2 + 2"));
    }
}
