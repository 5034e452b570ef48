//! Session Management
//!
//! One session per viewer: an append-only transcript plus a small state
//! machine (awaiting-input → solving → displaying-result → awaiting-input).
//! Nothing here survives a process restart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AgentError, Result};
use crate::message::{ChatRole, ChatTurn};

/// Unique session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where the session sits in its interaction cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Ready for the next question
    AwaitingInput,
    /// A solve is in flight; no second solve may start
    Solving,
    /// A result was just appended; equivalent to ready
    DisplayingResult,
}

/// A single viewer's conversation state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,

    /// Append-only, chronological transcript
    pub transcript: Vec<ChatTurn>,

    pub phase: SessionPhase,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a session seeded with the canned assistant greeting.
    pub fn new(greeting: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            transcript: vec![ChatTurn::assistant(greeting)],
            phase: SessionPhase::AwaitingInput,
            created_at: now,
            updated_at: now,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Whether a new solve may start.
    pub fn is_ready(&self) -> bool {
        matches!(
            self.phase,
            SessionPhase::AwaitingInput | SessionPhase::DisplayingResult
        )
    }

    /// Enter the solving phase, appending the user turn. Rejects a second
    /// concurrent solve on the same session.
    pub fn begin_solve(&mut self, question: impl Into<String>) -> Result<()> {
        if !self.is_ready() {
            return Err(AgentError::Session(
                "a solve is already in progress for this session".into(),
            ));
        }
        self.transcript.push(ChatTurn::user(question));
        self.phase = SessionPhase::Solving;
        self.touch();
        Ok(())
    }

    /// Record the outcome (answer or error text) as the assistant turn.
    /// Success and failure both land here so the transcript stays readable.
    pub fn complete_solve(&mut self, outcome: impl Into<String>) {
        self.transcript.push(ChatTurn::assistant(outcome));
        self.phase = SessionPhase::DisplayingResult;
        self.touch();
    }

    /// Number of transcript records
    pub fn turn_count(&self) -> usize {
        self.transcript.len()
    }

    /// The most recent user question, if any
    pub fn last_question(&self) -> Option<&ChatTurn> {
        self.transcript.iter().rev().find(|t| t.role == ChatRole::User)
    }
}

/// Session store trait
pub trait SessionStore: Send + Sync {
    fn save(&self, session: &Session) -> Result<()>;

    fn load(&self, id: &SessionId) -> Result<Option<Session>>;

    fn delete(&self, id: &SessionId) -> Result<()>;
}

/// In-memory session store. The only store this application has; transcripts
/// are scoped to the process lifetime by design.
pub struct MemorySessionStore {
    sessions: std::sync::RwLock<std::collections::HashMap<SessionId, Session>>,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: std::sync::RwLock::new(std::collections::HashMap::new()),
        }
    }

    /// Mutate a session atomically under the write lock.
    pub fn update<F, R>(&self, id: &SessionId, f: F) -> Result<R>
    where
        F: FnOnce(&mut Session) -> R,
    {
        let mut sessions = self.sessions.write().unwrap();
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| AgentError::Session(format!("unknown session: {id}")))?;
        Ok(f(session))
    }
}

impl SessionStore for MemorySessionStore {
    fn save(&self, session: &Session) -> Result<()> {
        let mut sessions = self.sessions.write().unwrap();
        sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    fn load(&self, id: &SessionId) -> Result<Option<Session>> {
        let sessions = self.sessions.read().unwrap();
        Ok(sessions.get(id).cloned())
    }

    fn delete(&self, id: &SessionId) -> Result<()> {
        let mut sessions = self.sessions.write().unwrap();
        sessions.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_seeds_greeting() {
        let session = Session::new("Hi, I'm your Math Problem Solver!");
        assert_eq!(session.turn_count(), 1);
        assert_eq!(session.transcript[0].role, ChatRole::Assistant);
        assert_eq!(session.phase, SessionPhase::AwaitingInput);
    }

    #[test]
    fn test_solve_cycle_appends_one_pair() {
        let mut session = Session::new("greeting");

        session.begin_solve("What is 2 + 2?").unwrap();
        assert_eq!(session.phase, SessionPhase::Solving);

        session.complete_solve("4");
        assert_eq!(session.phase, SessionPhase::DisplayingResult);
        assert!(session.is_ready());

        assert_eq!(session.turn_count(), 3);
        assert_eq!(session.transcript[1].role, ChatRole::User);
        assert_eq!(session.transcript[2].role, ChatRole::Assistant);
        assert_eq!(session.transcript[2].content, "4");
    }

    #[test]
    fn test_no_concurrent_solves() {
        let mut session = Session::new("greeting");
        session.begin_solve("first").unwrap();

        let err = session.begin_solve("second").unwrap_err();
        assert!(matches!(err, AgentError::Session(_)));
        // The rejected attempt left no record behind
        assert_eq!(session.turn_count(), 2);
    }

    #[test]
    fn test_ready_again_after_result() {
        let mut session = Session::new("greeting");
        session.begin_solve("q1").unwrap();
        session.complete_solve("a1");
        session.begin_solve("q2").unwrap();
        assert_eq!(session.phase, SessionPhase::Solving);
    }

    #[test]
    fn test_memory_store() {
        let store = MemorySessionStore::new();
        let session = Session::new("greeting");
        let id = session.id.clone();

        store.save(&session).unwrap();

        let loaded = store.load(&id).unwrap();
        assert!(loaded.is_some());
        assert_eq!(loaded.unwrap().id, id);

        store.update(&id, |s| s.complete_solve("done")).unwrap();
        assert_eq!(store.load(&id).unwrap().unwrap().turn_count(), 2);
    }

    #[test]
    fn test_update_unknown_session() {
        let store = MemorySessionStore::new();
        let err = store.update(&SessionId::new(), |_| ()).unwrap_err();
        assert!(matches!(err, AgentError::Session(_)));
    }
}
