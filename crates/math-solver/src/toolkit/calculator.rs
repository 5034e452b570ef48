//! Calculator Tool
//!
//! Thin wrapper that sends a fixed prompt plus the expression to the model
//! and returns its raw text output. No arithmetic happens here; correctness
//! is the remote model's responsibility.

use std::sync::Arc;

use async_trait::async_trait;

use agent_core::{
    LlmProvider, Message, Result as CoreResult, Tool, provider::GenerationOptions,
};

use crate::prompt::CALCULATOR_TEMPLATE;

pub struct CalculatorTool {
    provider: Arc<dyn LlmProvider>,
    generation: GenerationOptions,
}

impl CalculatorTool {
    pub fn new(provider: Arc<dyn LlmProvider>, generation: GenerationOptions) -> Self {
        Self {
            provider,
            generation,
        }
    }
}

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "A tool for performing mathematical calculations. Input only mathematical expressions."
    }

    async fn invoke(&self, input: &str) -> CoreResult<String> {
        let prompt = CALCULATOR_TEMPLATE.render(input);
        let completion = self
            .provider
            .complete(&[Message::user(prompt)], &self.generation)
            .await?;

        Ok(completion.content.trim().to_string())
    }
}
