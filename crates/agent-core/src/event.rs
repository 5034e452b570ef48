//! Solver Events
//!
//! The reasoning loop reports its intermediate steps through an `EventSink`,
//! invoked zero or more times before `solve` returns. The sink is how the UI
//! watches the agent think; whether those events are shown is the caller's
//! concern, they are always emitted.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tokio::sync::mpsc;

/// A single step the solver took while working on a question.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// Free-form reasoning text produced before acting
    Thought { text: String },

    /// The solver decided to invoke a tool
    Action { tool: String, input: String },

    /// What the tool returned
    Observation {
        tool: String,
        output: String,
        success: bool,
    },

    /// The final answer was produced
    FinalAnswer { text: String },
}

/// Streaming callback interface for solver progress.
pub trait EventSink: Send + Sync {
    fn on_event(&self, event: AgentEvent);
}

/// Sink that discards everything.
pub struct NullSink;

impl EventSink for NullSink {
    fn on_event(&self, _event: AgentEvent) {}
}

/// Sink that accumulates events in memory.
#[derive(Default)]
pub struct CollectSink {
    events: Mutex<Vec<AgentEvent>>,
}

impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain collected events
    pub fn take(&self) -> Vec<AgentEvent> {
        std::mem::take(&mut self.events.lock().unwrap())
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().unwrap().is_empty()
    }
}

impl EventSink for CollectSink {
    fn on_event(&self, event: AgentEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Sink that forwards events over a tokio channel, for live streaming.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<AgentEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<AgentEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelSink {
    fn on_event(&self, event: AgentEvent) {
        // Receiver may have hung up; the solve itself is unaffected.
        let _ = self.tx.send(event);
    }
}
