//! arXiv Lookup Tool
//!
//! Queries the free arXiv Atom API and flattens the top entry into a short
//! text summary. The Atom payload is simple enough that tag splitting beats
//! pulling in an XML parser.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use agent_core::{Result as CoreResult, Tool};

use crate::error::SolverError;

const API_BASE: &str = "https://export.arxiv.org/api/query";
const TOOL_NAME: &str = "arxiv";

/// Academic-paper lookup, top 1 result.
pub struct ArxivTool {
    client: Client,
    max_results: usize,
}

impl ArxivTool {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            max_results: 1,
        }
    }

    async fn lookup(&self, query: &str) -> Result<String, SolverError> {
        tracing::debug!(query, "arxiv lookup");
        let url = format!(
            "{}?search_query=all:{}&start=0&max_results={}",
            API_BASE,
            urlencoding::encode(query),
            self.max_results
        );

        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(30))
            .send()
            .await?;

        let body = response.text().await?;

        let entries = parse_atom(&body);
        if entries.is_empty() {
            return Err(SolverError::NoResults(query.to_string()));
        }

        Ok(entries
            .iter()
            .map(ArxivEntry::render)
            .collect::<Vec<_>>()
            .join("\n\n"))
    }
}

impl Default for ArxivTool {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug)]
struct ArxivEntry {
    title: String,
    authors: Vec<String>,
    published: String,
    summary: String,
}

impl ArxivEntry {
    fn render(&self) -> String {
        format!(
            "Published: {}\nTitle: {}\nAuthors: {}\nSummary: {}",
            self.published,
            self.title,
            self.authors.join(", "),
            self.summary
        )
    }
}

/// Flatten Atom `<entry>` blocks into structured entries.
fn parse_atom(xml: &str) -> Vec<ArxivEntry> {
    let mut entries = Vec::new();

    for entry in xml.split("<entry>").skip(1) {
        let title = extract_tag(entry, "title")
            .map(|t| t.replace('\n', " ").trim().to_string())
            .unwrap_or_default();
        let summary = extract_tag(entry, "summary")
            .map(|s| s.replace('\n', " ").trim().to_string())
            .unwrap_or_default();
        let published = extract_tag(entry, "published").unwrap_or_default();

        let authors: Vec<String> = entry
            .split("<author>")
            .skip(1)
            .filter_map(|a| extract_tag(a, "name"))
            .collect();

        if !title.is_empty() {
            entries.push(ArxivEntry {
                title,
                authors,
                published,
                summary,
            });
        }
    }

    entries
}

/// Extract the text between `<tag ...>` and `</tag>`
fn extract_tag(fragment: &str, tag: &str) -> Option<String> {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");

    let start = fragment.find(&open)?;
    let content_start = fragment[start..].find('>')? + start + 1;
    let end = fragment[content_start..].find(&close)? + content_start;

    Some(fragment[content_start..end].to_string())
}

#[async_trait]
impl Tool for ArxivTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Search arXiv for academic papers. Input a topic or paper title; returns the top match with title, authors, and abstract."
    }

    async fn invoke(&self, input: &str) -> CoreResult<String> {
        self.lookup(input)
            .await
            .map_err(|e| e.into_tool_error(TOOL_NAME))
    }
}
