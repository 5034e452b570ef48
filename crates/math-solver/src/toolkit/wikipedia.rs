//! Wikipedia Lookup Tool
//!
//! Queries the MediaWiki API: one generator=search request that returns the
//! top matches together with their plain-text intro extracts.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use agent_core::{Result as CoreResult, Tool};

use crate::error::SolverError;

const API_BASE: &str = "https://en.wikipedia.org/w/api.php";
const TOOL_NAME: &str = "wikipedia";

/// Encyclopedia lookup, top 2 results.
pub struct WikipediaTool {
    client: Client,
    top_k: usize,
}

impl WikipediaTool {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            top_k: 2,
        }
    }

    async fn lookup(&self, query: &str) -> Result<String, SolverError> {
        tracing::debug!(query, "wikipedia lookup");
        let url = format!(
            "{}?action=query&format=json&redirects=1&generator=search&gsrsearch={}&gsrlimit={}&prop=extracts&exintro&explaintext",
            API_BASE,
            urlencoding::encode(query),
            self.top_k
        );

        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(30))
            .header("User-Agent", "math-solver/0.1 (math problem solver)")
            .send()
            .await?;

        let data: serde_json::Value = response.json().await?;

        format_pages(&data).ok_or_else(|| SolverError::NoResults(query.to_string()))
    }
}

impl Default for WikipediaTool {
    fn default() -> Self {
        Self::new()
    }
}

/// Render the `query.pages` map into "Page: / Summary:" blocks, ordered by
/// search rank (the `index` field).
fn format_pages(data: &serde_json::Value) -> Option<String> {
    let pages = data["query"]["pages"].as_object()?;

    let mut ranked: Vec<(u64, &serde_json::Value)> = pages
        .values()
        .map(|page| (page["index"].as_u64().unwrap_or(u64::MAX), page))
        .collect();
    ranked.sort_by_key(|(index, _)| *index);

    let mut sections = Vec::new();
    for (_, page) in ranked {
        let title = page["title"].as_str().unwrap_or("");
        let extract = page["extract"].as_str().unwrap_or("").trim();
        if title.is_empty() && extract.is_empty() {
            continue;
        }
        sections.push(format!("Page: {title}\nSummary: {extract}"));
    }

    if sections.is_empty() {
        None
    } else {
        Some(sections.join("\n\n"))
    }
}

#[async_trait]
impl Tool for WikipediaTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Look up encyclopedia articles on Wikipedia. Input a topic or concept; returns the top matching pages with summaries."
    }

    async fn invoke(&self, input: &str) -> CoreResult<String> {
        self.lookup(input)
            .await
            .map_err(|e| e.into_tool_error(TOOL_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_pages_ordered_by_rank() {
        let data = json!({
            "query": {
                "pages": {
                    "200": {"title": "Circle", "extract": "A circle is a shape.", "index": 2},
                    "100": {"title": "Pi", "extract": "Pi is a constant.", "index": 1},
                }
            }
        });

        let text = format_pages(&data).unwrap();
        let pi_pos = text.find("Page: Pi").unwrap();
        let circle_pos = text.find("Page: Circle").unwrap();
        assert!(pi_pos < circle_pos);
        assert!(text.contains("Summary: Pi is a constant."));
    }

    #[test]
    fn test_format_pages_empty() {
        assert!(format_pages(&json!({"query": {"pages": {}}})).is_none());
        assert!(format_pages(&json!({})).is_none());
    }
}
