//! Error Types for the Math Solver Tools

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SolverError>;

#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Lookup failed: {0}")]
    Lookup(String),

    #[error("No results found for '{0}'")]
    NoResults(String),

    #[error("Malformed response from {service}: {message}")]
    Malformed { service: String, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SolverError {
    /// Convert into the core error type at the tool boundary
    pub fn into_tool_error(self, tool: &str) -> agent_core::AgentError {
        agent_core::AgentError::ToolFailed {
            tool: tool.to_string(),
            message: self.to_string(),
        }
    }
}
