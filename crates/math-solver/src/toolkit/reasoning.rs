//! Step-by-Step Reasoning Tool
//!
//! Wraps the model in the tutor prompt and returns its raw text output,
//! same shape as the calculator wrapper.

use std::sync::Arc;

use async_trait::async_trait;

use agent_core::{
    LlmProvider, Message, Result as CoreResult, Tool, provider::GenerationOptions,
};

use crate::prompt::REASONING_TEMPLATE;

pub struct MathReasoningTool {
    provider: Arc<dyn LlmProvider>,
    generation: GenerationOptions,
}

impl MathReasoningTool {
    pub fn new(provider: Arc<dyn LlmProvider>, generation: GenerationOptions) -> Self {
        Self {
            provider,
            generation,
        }
    }
}

#[async_trait]
impl Tool for MathReasoningTool {
    fn name(&self) -> &str {
        "math_reasoning"
    }

    fn description(&self) -> &str {
        "A tool for solving math problems step-by-step with detailed explanations."
    }

    async fn invoke(&self, input: &str) -> CoreResult<String> {
        let prompt = REASONING_TEMPLATE.render(input);
        let completion = self
            .provider
            .complete(&[Message::user(prompt)], &self.generation)
            .await?;

        Ok(completion.content.trim().to_string())
    }
}
