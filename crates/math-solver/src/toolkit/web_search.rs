//! Web Search Tool
//!
//! General web search over the DuckDuckGo HTML endpoint, which needs no API
//! key. Results are scraped out of the markup with plain string splitting.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use agent_core::{Result as CoreResult, Tool};

use crate::error::SolverError;

const SEARCH_URL: &str = "https://html.duckduckgo.com/html/";
const TOOL_NAME: &str = "web_search";
const MAX_RESULTS: usize = 5;

/// General web search.
pub struct WebSearchTool {
    client: Client,
}

impl WebSearchTool {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    async fn search(&self, query: &str) -> Result<String, SolverError> {
        tracing::debug!(query, "web search");
        let url = format!("{}?q={}", SEARCH_URL, urlencoding::encode(query));

        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(30))
            .header("User-Agent", "Mozilla/5.0 (compatible; math-solver/0.1)")
            .send()
            .await?;

        let html = response.text().await?;
        let results = extract_results(&html);

        if results.is_empty() {
            return Err(SolverError::NoResults(query.to_string()));
        }

        Ok(results.join("\n\n"))
    }
}

impl Default for WebSearchTool {
    fn default() -> Self {
        Self::new()
    }
}

/// Scrape result blocks out of the DuckDuckGo HTML page.
fn extract_results(html: &str) -> Vec<String> {
    let mut results = Vec::new();

    for chunk in html.split("class=\"result__body\"").skip(1) {
        if results.len() >= MAX_RESULTS {
            break;
        }

        let title = chunk
            .split("class=\"result__a\"")
            .nth(1)
            .and_then(|s| s.split('>').nth(1))
            .and_then(|s| s.split('<').next())
            .unwrap_or("");

        let snippet = chunk
            .split("class=\"result__snippet\"")
            .nth(1)
            .and_then(|s| s.split('>').nth(1))
            .and_then(|s| s.split('<').next())
            .unwrap_or("");

        let url = chunk
            .split("class=\"result__url\"")
            .nth(1)
            .and_then(|s| s.split('>').nth(1))
            .and_then(|s| s.split('<').next())
            .map(str::trim)
            .unwrap_or("");

        if !title.is_empty() {
            results.push(format!(
                "{}\n{}\nURL: {}",
                html_decode(title),
                html_decode(snippet),
                url
            ));
        }
    }

    results
}

/// Basic HTML entity decoding
fn html_decode(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Search the web for current information. Input a search query; returns result titles, snippets, and URLs."
    }

    async fn invoke(&self, input: &str) -> CoreResult<String> {
        self.search(input)
            .await
            .map_err(|e| e.into_tool_error(TOOL_NAME))
    }
}
