//! Application State

use std::sync::Arc;

use agent_core::MemorySessionStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// All live sessions, in memory only
    pub sessions: Arc<MemorySessionStore>,

    /// Process-wide default API key, read once from the environment.
    /// Never sent to the client; requests that omit a key fall back to it.
    pub default_api_key: Option<String>,
}

impl AppState {
    pub fn new(default_api_key: Option<String>) -> Self {
        Self {
            sessions: Arc::new(MemorySessionStore::new()),
            default_api_key,
        }
    }
}
