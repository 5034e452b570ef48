//! # agent-runtime
//!
//! Runtime providers for the math solver.
//!
//! ## Providers
//!
//! - **Groq** (default): hosted inference over Groq's OpenAI-compatible
//!   chat-completions API, with SSE streaming
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::GroqProvider;
//!
//! let provider = GroqProvider::new(api_key)?;
//! let agent = AgentBuilder::new()
//!     .provider(Arc::new(provider))
//!     .build()?;
//! ```

pub mod groq;

pub use groq::{GroqModel, GroqProvider};
