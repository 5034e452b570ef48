//! Reasoning Loop
//!
//! Implements the ReAct (Reason + Act) pattern: the solver thinks, picks a
//! tool, observes its output, and repeats until it judges it has enough
//! information to answer. The loop is hidden behind the `Solver` trait so
//! callers see a single `solve` operation plus a stream of events.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{AgentError, Result};
use crate::event::{AgentEvent, EventSink};
use crate::message::{ChatTurn, Conversation, Message};
use crate::provider::{GenerationOptions, LlmProvider};
use crate::tool::ToolRegistry;

/// Outcome of one solve call: the final answer plus every intermediate step.
#[derive(Clone, Debug)]
pub struct Solution {
    pub answer: String,
    pub events: Vec<AgentEvent>,
}

/// Opaque solving capability: one question in, one answer out, events along
/// the way. The reasoning strategy behind it is an implementation detail.
#[async_trait]
pub trait Solver: Send + Sync {
    async fn solve(
        &self,
        question: &str,
        history: &[ChatTurn],
        sink: &dyn EventSink,
    ) -> Result<Solution>;
}

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// System prompt (the natural-language policy)
    pub system_prompt: String,

    /// Maximum reasoning iterations before giving up
    pub max_iterations: usize,

    /// Generation options
    pub generation: GenerationOptions,

    /// Whether to append tool descriptions to the system prompt
    pub inject_tool_descriptions: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            max_iterations: 15,
            generation: GenerationOptions::default(),
            inject_tool_descriptions: true,
        }
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = r#"You are a helpful AI assistant.

When you need to use a tool, respond with a JSON block in this exact format:
```tool
{"tool": "tool_name", "input": "free text for the tool"}
```

After receiving tool results, synthesize them into a helpful response.
If you can answer directly without tools, do so.
Be concise and accurate."#;

/// A tool invocation requested by the LLM
#[derive(Clone, Debug, Deserialize)]
struct ToolInvocation {
    tool: String,
    #[serde(default)]
    input: String,
}

/// The ReAct agent
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
}

impl Agent {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Self {
        Self {
            provider,
            tools,
            config,
        }
    }

    /// Create with default configuration
    pub fn with_defaults(provider: Arc<dyn LlmProvider>, tools: Arc<ToolRegistry>) -> Self {
        Self::new(provider, tools, AgentConfig::default())
    }

    /// Build the full system prompt including tool descriptions
    fn build_system_prompt(&self) -> String {
        let mut prompt = self.config.system_prompt.clone();

        if self.config.inject_tool_descriptions && !self.tools.is_empty() {
            prompt.push_str("\n\n");
            prompt.push_str(&self.tools.prompt_section());
        }

        prompt
    }

    fn emit(events: &mut Vec<AgentEvent>, sink: &dyn EventSink, event: AgentEvent) {
        events.push(event.clone());
        sink.on_event(event);
    }

    /// Parse a tool call from an LLM response
    fn parse_tool_call(content: &str) -> Option<ToolInvocation> {
        // Look for ```tool ... ``` blocks
        let tool_start = "```tool";
        let tool_end = "```";

        if let Some(start_idx) = content.find(tool_start) {
            let after_marker = &content[start_idx + tool_start.len()..];
            if let Some(end_idx) = after_marker.find(tool_end) {
                let json_str = after_marker[..end_idx].trim();
                if let Ok(call) = serde_json::from_str::<ToolInvocation>(json_str) {
                    return Some(call);
                }
            }
        }

        Self::parse_inline_tool_call(content)
    }

    /// Fallback: raw JSON object with a "tool" key, no code fence
    fn parse_inline_tool_call(content: &str) -> Option<ToolInvocation> {
        if !content.contains(r#""tool""#) {
            return None;
        }

        let start = content.find('{')?;
        let end = content.rfind('}')?;

        if end <= start {
            return None;
        }

        serde_json::from_str::<ToolInvocation>(&content[start..=end]).ok()
    }

    /// Everything around the tool block, which reads as the model's thought
    fn strip_tool_block(content: &str) -> String {
        if let Some(start_idx) = content.find("```tool") {
            let after = &content[start_idx + "```tool".len()..];
            if let Some(end_idx) = after.find("```") {
                let mut text = String::new();
                text.push_str(&content[..start_idx]);
                text.push_str(&after[end_idx + 3..]);
                return text.trim().to_string();
            }
        }
        content.trim().to_string()
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }
}

#[async_trait]
impl Solver for Agent {
    async fn solve(
        &self,
        question: &str,
        history: &[ChatTurn],
        sink: &dyn EventSink,
    ) -> Result<Solution> {
        let mut conversation = Conversation::with_system_prompt(self.build_system_prompt());
        conversation.extend_from_transcript(history);
        conversation.push(Message::user(question));

        let mut events = Vec::new();
        let mut iterations = 0;

        loop {
            iterations += 1;

            if iterations > self.config.max_iterations {
                return Err(AgentError::MaxIterations(self.config.max_iterations));
            }

            let completion = self
                .provider
                .complete(conversation.messages(), &self.config.generation)
                .await?;

            let content = completion.content;

            if let Some(call) = Self::parse_tool_call(&content) {
                tracing::debug!(tool = %call.tool, iteration = iterations, "Executing tool");

                let thought = Self::strip_tool_block(&content);
                if !thought.is_empty() {
                    Self::emit(&mut events, sink, AgentEvent::Thought { text: thought });
                }
                Self::emit(
                    &mut events,
                    sink,
                    AgentEvent::Action {
                        tool: call.tool.clone(),
                        input: call.input.clone(),
                    },
                );

                conversation.push(Message::assistant(&content));

                // Lookup failures surface here; they become failed
                // observations rather than aborting the loop.
                let (output, success, note) = match self.tools.invoke(&call.tool, &call.input).await
                {
                    Ok(output) => {
                        let note = format!("[Tool '{}' returned]\n{}", call.tool, output);
                        (output, true, note)
                    }
                    Err(e) => {
                        let message = e.to_string();
                        let note = format!("[Tool '{}' failed]\n{}", call.tool, message);
                        (message, false, note)
                    }
                };

                Self::emit(
                    &mut events,
                    sink,
                    AgentEvent::Observation {
                        tool: call.tool,
                        output,
                        success,
                    },
                );

                conversation.push(Message::tool(note));
                continue;
            }

            // No tool call: this is the final answer
            Self::emit(
                &mut events,
                sink,
                AgentEvent::FinalAnswer {
                    text: content.clone(),
                },
            );

            return Ok(Solution {
                answer: content,
                events,
            });
        }
    }
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: ToolRegistry,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: ToolRegistry::new(),
            config: AgentConfig::default(),
        }
    }

    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn tool<T: crate::tool::Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.register(tool);
        self
    }

    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.config.generation.temperature = temp;
        self
    }

    pub fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        Ok(Agent::new(provider, Arc::new(self.tools), self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{CollectSink, NullSink};
    use crate::provider::{Completion, CompletionStream};
    use crate::tool::Tool;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Provider that replays a fixed script of responses.
    struct ScriptedProvider {
        replies: Mutex<VecDeque<String>>,
    }

    impl ScriptedProvider {
        fn new(replies: &[&str]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().map(|s| (*s).to_string()).collect()),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        async fn complete(
            &self,
            _messages: &[Message],
            options: &GenerationOptions,
        ) -> Result<Completion> {
            let content = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| AgentError::Provider("script exhausted".into()))?;

            Ok(Completion {
                content,
                model: options.model.clone(),
                usage: None,
                finish_reason: None,
            })
        }

        async fn complete_stream(
            &self,
            _messages: &[Message],
            _options: &GenerationOptions,
        ) -> Result<CompletionStream> {
            Err(AgentError::Provider("streaming not scripted".into()))
        }
    }

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo the input back."
        }

        async fn invoke(&self, input: &str) -> Result<String> {
            Ok(format!("echo: {input}"))
        }
    }

    struct BrokenTool;

    #[async_trait]
    impl Tool for BrokenTool {
        fn name(&self) -> &str {
            "broken"
        }

        fn description(&self) -> &str {
            "Always fails."
        }

        async fn invoke(&self, _input: &str) -> Result<String> {
            Err(AgentError::ToolFailed {
                tool: "broken".into(),
                message: "remote service down".into(),
            })
        }
    }

    fn agent_with(replies: &[&str], tools: ToolRegistry, max_iterations: usize) -> Agent {
        let config = AgentConfig {
            max_iterations,
            ..Default::default()
        };
        Agent::new(
            Arc::new(ScriptedProvider::new(replies)),
            Arc::new(tools),
            config,
        )
    }

    #[tokio::test]
    async fn test_direct_answer() {
        let agent = agent_with(&["x = 5"], ToolRegistry::new(), 5);
        let sink = CollectSink::new();

        let solution = agent.solve("Solve 2x + 5 = 15", &[], &sink).await.unwrap();

        assert_eq!(solution.answer, "x = 5");
        assert_eq!(solution.events.len(), 1);
        assert!(matches!(
            solution.events[0],
            AgentEvent::FinalAnswer { .. }
        ));
    }

    #[tokio::test]
    async fn test_tool_round_trip() {
        let mut tools = ToolRegistry::new();
        tools.register(EchoTool);

        let agent = agent_with(
            &[
                "Let me check.\n```tool\n{\"tool\": \"echo\", \"input\": \"2 + 2\"}\n```",
                "The answer is 4.",
            ],
            tools,
            5,
        );
        let sink = CollectSink::new();

        let solution = agent.solve("What is 2 + 2?", &[], &sink).await.unwrap();

        assert_eq!(solution.answer, "The answer is 4.");

        let kinds: Vec<&str> = solution
            .events
            .iter()
            .map(|e| match e {
                AgentEvent::Thought { .. } => "thought",
                AgentEvent::Action { .. } => "action",
                AgentEvent::Observation { .. } => "observation",
                AgentEvent::FinalAnswer { .. } => "final",
            })
            .collect();
        assert_eq!(kinds, vec!["thought", "action", "observation", "final"]);

        // Sink saw the same stream
        assert_eq!(sink.take().len(), 4);
    }

    #[tokio::test]
    async fn test_tool_failure_becomes_observation() {
        let mut tools = ToolRegistry::new();
        tools.register(BrokenTool);

        let agent = agent_with(
            &[
                "```tool\n{\"tool\": \"broken\", \"input\": \"anything\"}\n```",
                "I could not look that up, but here is what I know.",
            ],
            tools,
            5,
        );

        let solution = agent.solve("question", &[], &NullSink).await.unwrap();

        let observation = solution
            .events
            .iter()
            .find(|e| matches!(e, AgentEvent::Observation { .. }))
            .unwrap();
        if let AgentEvent::Observation { success, output, .. } = observation {
            assert!(!success);
            assert!(output.contains("remote service down"));
        }
    }

    #[tokio::test]
    async fn test_max_iterations() {
        let mut tools = ToolRegistry::new();
        tools.register(EchoTool);

        let call = "```tool\n{\"tool\": \"echo\", \"input\": \"again\"}\n```";
        let agent = agent_with(&[call, call, call], tools, 2);

        let err = agent
            .solve("loop forever", &[], &NullSink)
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::MaxIterations(2)));
    }

    #[test]
    fn test_parse_fenced_tool_call() {
        let content = "Working on it.\n```tool\n{\"tool\": \"calculator\", \"input\": \"3 * 7\"}\n```";
        let call = Agent::parse_tool_call(content).unwrap();
        assert_eq!(call.tool, "calculator");
        assert_eq!(call.input, "3 * 7");
    }

    #[test]
    fn test_parse_inline_tool_call() {
        let content = r#"{"tool": "wikipedia", "input": "Pythagorean theorem"}"#;
        let call = Agent::parse_tool_call(content).unwrap();
        assert_eq!(call.tool, "wikipedia");
    }

    #[test]
    fn test_no_tool_call() {
        assert!(Agent::parse_tool_call("The answer is 42.").is_none());
    }

    #[test]
    fn test_strip_tool_block() {
        let content = "Thinking first.\n```tool\n{\"tool\": \"echo\", \"input\": \"x\"}\n```";
        assert_eq!(Agent::strip_tool_block(content), "Thinking first.");
    }
}
