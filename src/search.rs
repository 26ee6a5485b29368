//! # Search Pipeline Module
//!
//! ## Purpose
//! Simulated web search with an AI-enhanced summary. One invocation runs two
//! strictly sequential delay-gated stages: retrieval publishes exactly four
//! templated results, then summarization publishes one paragraph with the
//! query substituted throughout. No index is consulted; the query text is
//! the only input.
//!
//! ## Input/Output Specification
//! - **Input**: Non-empty query string within the configured length bound
//! - **Output**: Four [`SearchResult`]s, then one summary string
//! - **Ordering**: Stage 1 state is fully published before stage 2 begins
//!
//! ## Key Features
//! - Single `searching` flag covering both stages
//! - Generation-numbered invocations; a superseded run checks the
//!   generation before every publish, so the last call always wins
//! - `reset()` for teardown, suppressing any in-flight callbacks

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::config::SearchConfig;
use crate::errors::{NexusError, Result};

/// One mock web search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Observable pipeline state; results and summary stay `None` until their
/// stage completes
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub searching: bool,
    pub results: Option<Vec<SearchResult>>,
    pub summary: Option<String>,
}

/// Simulated search pipeline
pub struct SearchPipeline {
    config: SearchConfig,
    state: Arc<RwLock<SearchState>>,
    generation: Arc<AtomicU64>,
}

/// The four fixed result templates, parameterized by the literal query text
fn mock_results(query: &str) -> Vec<SearchResult> {
    vec![
        SearchResult {
            id: "1".to_string(),
            title: format!("Results for: {query} - Official Documentation"),
            url: "https://example.com/docs".to_string(),
            snippet: format!(
                "Comprehensive information about {query} including usage guidelines, examples \
                 and best practices for implementation in various scenarios."
            ),
        },
        SearchResult {
            id: "2".to_string(),
            title: format!("Understanding {query} - A Complete Guide"),
            url: "https://example.com/guide".to_string(),
            snippet: format!(
                "This guide explains the core concepts of {query} with practical examples and \
                 step-by-step tutorials for beginners and advanced users."
            ),
        },
        SearchResult {
            id: "3".to_string(),
            title: format!("Latest Research on {query} - Journal Publication"),
            url: "https://example.com/research".to_string(),
            snippet: format!(
                "Recent academic research and findings related to {query}, including \
                 methodologies, experimental results and conclusions from leading experts."
            ),
        },
        SearchResult {
            id: "4".to_string(),
            title: format!("{query} vs. Alternatives - Comparison Analysis"),
            url: "https://example.com/comparison".to_string(),
            snippet: format!(
                "A detailed comparison between {query} and similar alternatives, highlighting \
                 strengths, weaknesses and ideal use cases for each option."
            ),
        },
    ]
}

/// The summary skeleton with the query substituted at five insertion points
fn mock_summary(query: &str) -> String {
    format!(
        "Based on the search results, I can provide you with the following information about \
         \"{query}\":\n\n1. {query} appears to be well-documented with official guidelines and \
         best practices available.\n\n2. There are comprehensive guides explaining core \
         concepts with practical examples suitable for both beginners and advanced users.\n\n3. \
         Recent academic research has been conducted on {query}, suggesting it's a topic of \
         current interest in the scientific community.\n\n4. There are alternatives to {query} \
         with different strengths and weaknesses depending on the specific use \
         case.\n\nWould you like me to elaborate on any particular aspect of {query}?"
    )
}

impl SearchPipeline {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(SearchState::default())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Start a search invocation.
    ///
    /// Resets any previous results immediately and restarts both stages;
    /// callbacks from a superseded invocation are ignored. The returned
    /// handle completes when this invocation finishes or detects it was
    /// superseded; callers that only render snapshots can drop it.
    pub async fn search(&self, query: &str) -> Result<JoinHandle<()>> {
        if query.trim().is_empty() {
            return Err(NexusError::EmptyInput {
                field: "query".to_string(),
            });
        }
        if query.len() > self.config.max_query_length {
            return Err(NexusError::QueryTooLong {
                length: query.len(),
                limit: self.config.max_query_length,
            });
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state.write().await;
            state.searching = true;
            state.results = None;
            state.summary = None;
        }
        tracing::debug!(%query, generation, "search started");

        let query = query.to_string();
        let state = Arc::clone(&self.state);
        let generation_counter = Arc::clone(&self.generation);
        let retrieval_delay = self.config.retrieval_delay();
        let summary_delay = self.config.summary_delay();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(retrieval_delay).await;
            {
                let mut state = state.write().await;
                if generation_counter.load(Ordering::SeqCst) != generation {
                    return;
                }
                state.results = Some(mock_results(&query));
            }

            tokio::time::sleep(summary_delay).await;
            {
                let mut state = state.write().await;
                if generation_counter.load(Ordering::SeqCst) != generation {
                    return;
                }
                state.summary = Some(mock_summary(&query));
                state.searching = false;
            }
            tracing::debug!(%query, generation, "search complete");
        });

        Ok(handle)
    }

    /// Clear all state and suppress any in-flight invocation
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        *state = SearchState::default();
    }

    /// Snapshot of the current state for rendering
    pub async fn snapshot(&self) -> SearchState {
        self.state.read().await.clone()
    }
}
