//! API Client

use serde::{Deserialize, Serialize};

/// Chat message for display
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Transcript entry carrying a stable id for keyed rendering. Role and
/// content can repeat (re-asking a question after an error is normal),
/// so the id is what keeps list keys unique.
#[derive(Clone, Debug)]
pub struct LogEntry {
    pub id: usize,
    pub message: ChatMessage,
}

/// Append a message to the log under the next id
pub fn append_entry(log: &mut Vec<LogEntry>, message: ChatMessage) {
    let id = log.last().map_or(0, |entry| entry.id + 1);
    log.push(LogEntry { id, message });
}

/// Turn a fetched transcript into a log, ids assigned in order
pub fn seed_entries(messages: Vec<ChatMessage>) -> Vec<LogEntry> {
    messages
        .into_iter()
        .enumerate()
        .map(|(id, message)| LogEntry { id, message })
        .collect()
}

/// One intermediate agent step, for the reasoning feed
#[derive(Clone, Debug)]
pub struct ReasoningStep {
    pub kind: String,
    pub text: String,
}

/// Model catalog entry
#[derive(Clone, Debug, Deserialize)]
pub struct ModelEntry {
    pub id: String,
    pub label: String,
}

/// Whether the server carries a default API key
pub async fn fetch_config() -> Result<bool, String> {
    let response = reqwest::Client::new()
        .get("/api/config")
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let data: serde_json::Value = response.json().await.map_err(|e| e.to_string())?;
    Ok(data["has_default_key"].as_bool().unwrap_or(false))
}

/// The fixed model catalog
pub async fn fetch_models() -> Result<Vec<ModelEntry>, String> {
    reqwest::Client::new()
        .get("/api/models")
        .send()
        .await
        .map_err(|e| e.to_string())?
        .json()
        .await
        .map_err(|e| e.to_string())
}

/// Canned example problems
pub async fn fetch_examples() -> Result<Vec<String>, String> {
    reqwest::Client::new()
        .get("/api/examples")
        .send()
        .await
        .map_err(|e| e.to_string())?
        .json()
        .await
        .map_err(|e| e.to_string())
}

/// Create a session; returns its id and the seeded transcript
pub async fn create_session() -> Result<(String, Vec<ChatMessage>), String> {
    let response = reqwest::Client::new()
        .post("/api/session")
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if !response.status().is_success() {
        return Err("Failed to create session".into());
    }

    let data: serde_json::Value = response.json().await.map_err(|e| e.to_string())?;

    let session_id = data["session_id"].as_str().unwrap_or_default().to_string();
    let transcript = data["transcript"]
        .as_array()
        .map(|turns| {
            turns
                .iter()
                .map(|t| ChatMessage {
                    role: t["role"].as_str().unwrap_or("assistant").to_string(),
                    content: t["content"].as_str().unwrap_or_default().to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    Ok((session_id, transcript))
}

/// WebSocket endpoint derived from the page origin
pub fn ws_url() -> String {
    let (protocol, host) = web_sys::window()
        .map(|w| {
            let location = w.location();
            (
                location.protocol().unwrap_or_else(|_| "http:".into()),
                location.host().unwrap_or_else(|_| "localhost:3000".into()),
            )
        })
        .unwrap_or_else(|| ("http:".into(), "localhost:3000".into()));

    let scheme = if protocol == "https:" { "wss" } else { "ws" };
    format!("{scheme}://{host}/api/solve/stream")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(role: &str, content: &str) -> ChatMessage {
        ChatMessage {
            role: role.into(),
            content: content.into(),
        }
    }

    #[test]
    fn test_identical_messages_get_distinct_ids() {
        let mut log = Vec::new();
        append_entry(&mut log, message("user", "What is 2 + 2?"));
        append_entry(&mut log, message("assistant", "Error generating response"));
        append_entry(&mut log, message("user", "What is 2 + 2?"));

        assert_eq!(log.len(), 3);
        assert_eq!(log[0].id, 0);
        assert_eq!(log[2].id, 2);
        assert_ne!(log[0].id, log[2].id);
    }

    #[test]
    fn test_seeded_log_continues_id_sequence() {
        let mut log = seed_entries(vec![
            message("assistant", "Hi!"),
            message("user", "hello"),
        ]);
        append_entry(&mut log, message("assistant", "hello"));

        let ids: Vec<usize> = log.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }
}
