//! # agent-core
//!
//! Core logic for the math problem solver: provider-agnostic LLM abstraction,
//! free-text tools, and the reasoning loop that ties them together.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Agent (Solver)                        │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │  Reasoning  │  │    Tool     │  │   LlmProvider       │  │
//! │  │    Loop     │──│   Registry  │──│   (Strategy)        │  │
//! │  └──────┬──────┘  └─────────────┘  └─────────────────────┘  │
//! │         │ AgentEvent                                        │
//! │         ▼                                                   │
//! │     EventSink (streaming callback into the UI)              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait enables swapping between Groq, OpenAI, or any
//! other chat-completion backend without changing solver logic, and the
//! `Solver` trait hides the loop itself behind a single `solve` operation.

pub mod error;
pub mod event;
pub mod message;
pub mod provider;
pub mod session;
pub mod solver;
pub mod tool;

pub use error::{AgentError, Result};
pub use event::{AgentEvent, ChannelSink, CollectSink, EventSink, NullSink};
pub use message::{ChatRole, ChatTurn, Conversation, Message, Role};
pub use provider::LlmProvider;
pub use session::{MemorySessionStore, Session, SessionId, SessionPhase, SessionStore};
pub use solver::{Agent, AgentBuilder, AgentConfig, Solution, Solver};
pub use tool::{Tool, ToolDescriptor, ToolRegistry};
