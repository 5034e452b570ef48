//! HTTP/WebSocket Handlers

use axum::{
    Json,
    extract::{
        Path, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    http::StatusCode,
    response::Response,
};
use futures::{SinkExt, StreamExt, stream::SplitSink};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;

use agent_core::{
    Agent, AgentEvent, ChannelSink, ChatTurn, CollectSink, LlmProvider, Session, SessionId,
    SessionPhase, SessionStore,
    provider::GenerationOptions,
    solver::{AgentConfig, Solver},
};
use agent_runtime::{GroqModel, GroqProvider};
use math_solver::{EXAMPLE_PROBLEMS, GREETING, MATH_TUTOR_PROMPT, solver_toolset};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub default_key_configured: bool,
}

#[derive(Serialize)]
pub struct ConfigResponse {
    pub has_default_key: bool,
}

#[derive(Serialize)]
pub struct ModelEntry {
    pub id: &'static str,
    pub label: &'static str,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub transcript: Vec<ChatTurn>,
    pub phase: SessionPhase,
}

#[derive(Debug, Deserialize)]
pub struct SolveRequest {
    pub session_id: String,
    pub question: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default = "default_show_reasoning")]
    pub show_reasoning: bool,
}

fn default_show_reasoning() -> bool {
    true
}

#[derive(Serialize)]
pub struct SolveResponse {
    pub answer: String,
    pub session_id: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<AgentEvent>>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

// ============================================================================
// Info Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        default_key_configured: state.default_api_key.is_some(),
    })
}

/// Report whether the process has a default API key. The key itself never
/// leaves the server.
pub async fn get_config(State(state): State<AppState>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        has_default_key: state.default_api_key.is_some(),
    })
}

/// The fixed four-model catalog
pub async fn list_models() -> Json<Vec<ModelEntry>> {
    Json(
        GroqModel::ALL
            .iter()
            .map(|m| ModelEntry {
                id: m.id(),
                label: m.label(),
            })
            .collect(),
    )
}

/// Canned example problems
pub async fn list_examples() -> Json<Vec<&'static str>> {
    Json(EXAMPLE_PROBLEMS.to_vec())
}

// ============================================================================
// Session Handlers
// ============================================================================

/// Create a session, seeded with the assistant greeting
pub async fn create_session(
    State(state): State<AppState>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = Session::new(GREETING);

    state.sessions.save(&session).map_err(|e| {
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "SESSION_ERROR",
            e.to_string(),
        )
    })?;

    Ok(Json(session_response(session)))
}

/// Fetch a session transcript
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = state
        .sessions
        .load(&SessionId::from_string(&id))
        .map_err(|e| {
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "SESSION_ERROR",
                e.to_string(),
            )
        })?
        .ok_or_else(|| {
            api_error(StatusCode::NOT_FOUND, "UNKNOWN_SESSION", "Session not found")
        })?;

    Ok(Json(session_response(session)))
}

fn session_response(session: Session) -> SessionResponse {
    SessionResponse {
        session_id: session.id.to_string(),
        transcript: session.transcript,
        phase: session.phase,
    }
}

// ============================================================================
// Solve Pipeline
// ============================================================================

/// Everything a solve run needs, built fresh per request
struct PreparedSolve {
    agent: Agent,
    model: GroqModel,
    question: String,
    show_reasoning: bool,
    session_id: SessionId,
}

impl std::fmt::Debug for PreparedSolve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedSolve")
            .field("model", &self.model)
            .field("question", &self.question)
            .field("show_reasoning", &self.show_reasoning)
            .field("session_id", &self.session_id)
            .finish_non_exhaustive()
    }
}

/// Validate the request and construct provider, tools, and agent. The model
/// client is the first guarded failure point: a missing key halts here,
/// before any network traffic.
fn prepare_solve(state: &AppState, request: &SolveRequest) -> Result<PreparedSolve, ApiError> {
    let question = request.question.trim().to_string();
    if question.is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "EMPTY_QUESTION",
            "Please enter a question",
        ));
    }

    let api_key = request
        .api_key
        .as_deref()
        .filter(|k| !k.trim().is_empty())
        .map(str::to_string)
        .or_else(|| state.default_api_key.clone())
        .ok_or_else(|| {
            api_error(
                StatusCode::UNAUTHORIZED,
                "MISSING_API_KEY",
                "Please add your Groq API key to continue",
            )
        })?;

    let model = request
        .model
        .as_deref()
        .and_then(GroqModel::from_id)
        .unwrap_or_default();

    let generation = GenerationOptions {
        model: model.id().into(),
        temperature: request.temperature.unwrap_or(0.2),
        ..Default::default()
    };

    let provider: Arc<dyn LlmProvider> = Arc::new(GroqProvider::new(api_key).map_err(|e| {
        tracing::error!("Provider construction failed: {}", e);
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "MODEL_INIT_ERROR",
            e.user_message(),
        )
    })?);

    let tools = solver_toolset(provider.clone(), &generation);

    let config = AgentConfig {
        system_prompt: MATH_TUTOR_PROMPT.into(),
        generation,
        ..Default::default()
    };

    Ok(PreparedSolve {
        agent: Agent::new(provider, Arc::new(tools), config),
        model,
        question,
        show_reasoning: request.show_reasoning,
        session_id: SessionId::from_string(&request.session_id),
    })
}

/// Enter the solving phase: snapshot the prior transcript and append the
/// user turn, atomically. A second in-flight solve is rejected.
fn begin_solve(
    state: &AppState,
    session_id: &SessionId,
    question: &str,
) -> Result<Vec<ChatTurn>, ApiError> {
    let outcome = state.sessions.update(session_id, |session| {
        let history = session.transcript.clone();
        session.begin_solve(question).map(|()| history)
    });

    match outcome {
        Err(_) => Err(api_error(
            StatusCode::NOT_FOUND,
            "UNKNOWN_SESSION",
            "Session not found",
        )),
        Ok(Err(_)) => Err(api_error(
            StatusCode::CONFLICT,
            "SOLVE_IN_PROGRESS",
            "A solve is already in progress for this session",
        )),
        Ok(Ok(history)) => Ok(history),
    }
}

/// Record the outcome (answer or error text) as the assistant turn
fn finish_solve(state: &AppState, session_id: &SessionId, outcome: &str) {
    if let Err(e) = state
        .sessions
        .update(session_id, |session| session.complete_solve(outcome))
    {
        tracing::warn!("Failed to record solve outcome: {}", e);
    }
}

/// Main solve endpoint (non-streaming)
pub async fn solve_handler(
    State(state): State<AppState>,
    Json(payload): Json<SolveRequest>,
) -> Result<Json<SolveResponse>, ApiError> {
    let prepared = prepare_solve(&state, &payload)?;
    let history = begin_solve(&state, &prepared.session_id, &prepared.question)?;

    // Events are always computed; visibility is decided below.
    let sink = CollectSink::new();

    let answer = match prepared
        .agent
        .solve(&prepared.question, &history, &sink)
        .await
    {
        Ok(solution) => solution.answer,
        Err(e) => {
            tracing::error!("Solver error: {}", e);
            format!("Error generating response: {e}")
        }
    };

    finish_solve(&state, &prepared.session_id, &answer);

    let events = prepared.show_reasoning.then(|| sink.take());

    Ok(Json(SolveResponse {
        answer,
        session_id: prepared.session_id.to_string(),
        model: prepared.model.id().to_string(),
        events,
    }))
}

// ============================================================================
// WebSocket Streaming
// ============================================================================

/// WebSocket streaming solve
pub async fn solve_stream_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_stream(socket, state))
}

async fn handle_stream(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    while let Some(msg) = receiver.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Err(e) => {
                tracing::error!("WebSocket error: {}", e);
                break;
            }
            _ => continue,
        };

        let request: SolveRequest = match serde_json::from_str(&text) {
            Ok(r) => r,
            Err(e) => {
                if send_error(&mut sender, "BAD_REQUEST", &e.to_string())
                    .await
                    .is_err()
                {
                    return;
                }
                continue;
            }
        };

        if let Err((_, Json(err))) = run_stream_solve(&state, request, &mut sender).await {
            if send_error(&mut sender, &err.code, &err.error).await.is_err() {
                return;
            }
        }
    }
}

async fn send_error(
    sender: &mut SplitSink<WebSocket, Message>,
    code: &str,
    error: &str,
) -> Result<(), axum::Error> {
    let payload = serde_json::json!({"type": "error", "code": code, "error": error});
    sender.send(Message::Text(payload.to_string().into())).await
}

async fn run_stream_solve(
    state: &AppState,
    request: SolveRequest,
    sender: &mut SplitSink<WebSocket, Message>,
) -> Result<(), ApiError> {
    let prepared = prepare_solve(state, &request)?;
    let history = begin_solve(state, &prepared.session_id, &prepared.question)?;

    let (tx, mut rx) = mpsc::unbounded_channel();

    let agent = prepared.agent;
    let question = prepared.question.clone();
    let solve_task = tokio::spawn(async move {
        let sink = ChannelSink::new(tx);
        agent.solve(&question, &history, &sink).await
    });

    // Forward intermediate events. They arrive regardless of the flag;
    // suppression only affects what goes over the wire.
    while let Some(event) = rx.recv().await {
        if !prepared.show_reasoning || matches!(event, AgentEvent::FinalAnswer { .. }) {
            continue;
        }
        let payload = serde_json::to_string(&event).unwrap_or_default();
        if sender.send(Message::Text(payload.into())).await.is_err() {
            // Viewer left mid-solve; the solve still runs to completion so
            // the transcript stays consistent.
            break;
        }
    }

    match solve_task.await {
        Ok(Ok(solution)) => {
            finish_solve(state, &prepared.session_id, &solution.answer);
            let payload = serde_json::json!({
                "type": "final",
                "content": solution.answer,
                "session_id": prepared.session_id.to_string(),
                "model": prepared.model.id(),
            });
            let _ = sender.send(Message::Text(payload.to_string().into())).await;
        }
        Ok(Err(e)) => {
            tracing::error!("Solver error: {}", e);
            let message = format!("Error generating response: {e}");
            finish_solve(state, &prepared.session_id, &message);
            let payload = serde_json::json!({"type": "error", "error": message});
            let _ = sender.send(Message::Text(payload.to_string().into())).await;
        }
        Err(e) => {
            tracing::error!("Solve task failed: {}", e);
            let message = "Error generating response: internal failure".to_string();
            finish_solve(state, &prepared.session_id, &message);
            let payload = serde_json::json!({"type": "error", "error": message});
            let _ = sender.send(Message::Text(payload.to_string().into())).await;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solve_request(question: &str, api_key: Option<&str>) -> SolveRequest {
        SolveRequest {
            session_id: "test-session".into(),
            question: question.into(),
            api_key: api_key.map(String::from),
            model: None,
            temperature: None,
            show_reasoning: true,
        }
    }

    #[test]
    fn test_missing_key_halts_before_provider() {
        let state = AppState::new(None);
        let request = solve_request("2 + 2", None);

        let (status, Json(err)) = prepare_solve(&state, &request).unwrap_err();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.code, "MISSING_API_KEY");
    }

    #[test]
    fn test_blank_request_key_falls_back_to_default() {
        let state = AppState::new(Some("gsk_default".into()));
        let request = solve_request("2 + 2", Some("   "));

        // Session doesn't exist, but preparation succeeds past the key check
        assert!(prepare_solve(&state, &request).is_ok());
    }

    #[test]
    fn test_empty_question_rejected() {
        let state = AppState::new(Some("gsk_default".into()));
        let request = solve_request("   ", None);

        let (status, Json(err)) = prepare_solve(&state, &request).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, "EMPTY_QUESTION");
    }

    #[test]
    fn test_unknown_model_falls_back_to_default() {
        let state = AppState::new(Some("gsk_default".into()));
        let mut request = solve_request("2 + 2", None);
        request.model = Some("gpt-4".into());

        let prepared = prepare_solve(&state, &request).unwrap();
        assert_eq!(prepared.model, GroqModel::Gemma2_9bIt);
    }

    #[test]
    fn test_prepare_builds_five_tools() {
        let state = AppState::new(Some("gsk_default".into()));
        let request = solve_request("2 + 2", None);

        let prepared = prepare_solve(&state, &request).unwrap();
        assert_eq!(prepared.agent.tools().len(), 5);
        assert_eq!(
            prepared.agent.tools().names(),
            vec!["wikipedia", "arxiv", "web_search", "calculator", "math_reasoning"]
        );
    }

    #[test]
    fn test_begin_solve_unknown_session() {
        let state = AppState::new(None);
        let err = begin_solve(&state, &SessionId::new(), "q").unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_solve_bookkeeping_appends_one_pair() {
        let state = AppState::new(None);
        let session = Session::new(GREETING);
        let id = session.id.clone();
        state.sessions.save(&session).unwrap();

        let history = begin_solve(&state, &id, "What is 2 + 2?").unwrap();
        // History snapshot excludes the question being asked
        assert_eq!(history.len(), 1);

        finish_solve(&state, &id, "4");

        let session = state.sessions.load(&id).unwrap().unwrap();
        assert_eq!(session.turn_count(), 3);
        assert_eq!(session.transcript[1].content, "What is 2 + 2?");
        assert_eq!(session.transcript[2].content, "4");
    }

    #[test]
    fn test_error_text_recorded_as_assistant_turn() {
        let state = AppState::new(None);
        let session = Session::new(GREETING);
        let id = session.id.clone();
        state.sessions.save(&session).unwrap();

        begin_solve(&state, &id, "question").unwrap();
        let message = "Error generating response: Provider error: boom";
        finish_solve(&state, &id, message);

        let session = state.sessions.load(&id).unwrap().unwrap();
        assert_eq!(session.transcript.last().unwrap().content, message);
        assert!(session.is_ready());
    }

    #[test]
    fn test_example_problem_and_typed_text_leave_identical_transcripts() {
        let state = AppState::new(None);

        // One session gets a canned example, the other the same text typed
        // out; the transcript effects must not differ.
        let canned = EXAMPLE_PROBLEMS[0];
        let typed = canned.to_string();

        let first = Session::new(GREETING);
        let second = Session::new(GREETING);
        let (first_id, second_id) = (first.id.clone(), second.id.clone());
        state.sessions.save(&first).unwrap();
        state.sessions.save(&second).unwrap();

        begin_solve(&state, &first_id, canned).unwrap();
        finish_solve(&state, &first_id, "The answer is 12.");

        begin_solve(&state, &second_id, &typed).unwrap();
        finish_solve(&state, &second_id, "The answer is 12.");

        let first = state.sessions.load(&first_id).unwrap().unwrap();
        let second = state.sessions.load(&second_id).unwrap().unwrap();

        assert_eq!(first.turn_count(), second.turn_count());
        for (a, b) in first.transcript.iter().zip(&second.transcript) {
            assert_eq!(a.role, b.role);
            assert_eq!(a.content, b.content);
        }
        assert_eq!(first.phase, second.phase);
    }

    #[test]
    fn test_second_solve_rejected_while_solving() {
        let state = AppState::new(None);
        let session = Session::new(GREETING);
        let id = session.id.clone();
        state.sessions.save(&session).unwrap();

        begin_solve(&state, &id, "first").unwrap();
        let err = begin_solve(&state, &id, "second").unwrap_err();
        assert_eq!(err.0, StatusCode::CONFLICT);

        // The rejected attempt left no turn behind
        let session = state.sessions.load(&id).unwrap().unwrap();
        assert_eq!(session.turn_count(), 2);
    }
}
