//! # Chat Simulator Module
//!
//! ## Purpose
//! Mock conversational assistant for the chat tab. User messages append to
//! the transcript immediately; after a fixed delay an assistant reply is
//! drawn uniformly from a small canned set. No model is ever invoked; the
//! selected "model" is a label from a fixed catalog.
//!
//! ## Input/Output Specification
//! - **Input**: Non-empty message text, model selections, copy requests
//! - **Output**: Append-only [`ChatMessage`] transcript, loading flag
//! - **Identity**: Message ids come from the injected [`IdGenerator`]
//!
//! ## Key Features
//! - Transcript seeded with the assistant greeting
//! - Send rejected while a reply is pending, mirroring the disabled input
//! - Generation-guarded `clear()` so a stale reply never lands after reset
//! - Per-message copy-to-clipboard with a transient copied flag

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::config::ChatConfig;
use crate::errors::{NexusError, Result};
use crate::notify::Clipboard;
use crate::sampling::{IdGenerator, RandomSource};

/// Opening assistant message seeded into every fresh transcript
pub const GREETING: &str =
    "Hello! I'm D-Lite Nexus, your AI assistant. How can I help you today?";

/// The fixed assistant reply set; one entry is drawn uniformly per send
pub const REPLIES: [&str; 5] = [
    "I understand what you're asking about. Let me help you with that.",
    "That's an interesting question. Here's what I found.",
    "I can certainly help with that. Here's what you need to know.",
    "Based on my knowledge, here's what I can tell you.",
    "I've analyzed your question and here's my response.",
];

/// One selectable model label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

/// The fixed model catalog
pub const MODEL_CATALOG: [ModelEntry; 6] = [
    ModelEntry {
        id: "gpt-4o",
        name: "GPT-4o",
        description: "Most capable model for complex tasks",
    },
    ModelEntry {
        id: "gpt-4o-mini",
        name: "GPT-4o Mini",
        description: "Balanced performance and speed",
    },
    ModelEntry {
        id: "gpt-3.5-turbo",
        name: "GPT-3.5 Turbo",
        description: "Fast responses for simple tasks",
    },
    ModelEntry {
        id: "claude-3-opus",
        name: "Claude 3 Opus",
        description: "Advanced reasoning and comprehension",
    },
    ModelEntry {
        id: "claude-3-sonnet",
        name: "Claude 3 Sonnet",
        description: "Balanced performance model",
    },
    ModelEntry {
        id: "llama-3",
        name: "Llama 3",
        description: "Open-source alternative model",
    },
];

/// Message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One transcript entry; transient, never persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub copied: bool,
}

#[derive(Debug)]
struct ChatState {
    messages: Vec<ChatMessage>,
    loading: bool,
    model: String,
}

/// Simulated chat assistant
pub struct ChatSimulator {
    config: ChatConfig,
    sampler: Arc<dyn RandomSource>,
    ids: Arc<dyn IdGenerator>,
    state: Arc<RwLock<ChatState>>,
    generation: Arc<AtomicU64>,
}

impl ChatSimulator {
    /// Create a simulator with a greeted transcript. An unknown default
    /// model in the config falls back to the first catalog entry.
    pub fn new(
        config: ChatConfig,
        sampler: Arc<dyn RandomSource>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        let model = if MODEL_CATALOG.iter().any(|m| m.id == config.default_model) {
            config.default_model.clone()
        } else {
            tracing::warn!(
                model = %config.default_model,
                "unknown default model, falling back to catalog head"
            );
            MODEL_CATALOG[0].id.to_string()
        };

        let greeting = ChatMessage {
            id: ids.next_id(),
            role: Role::Assistant,
            content: GREETING.to_string(),
            timestamp: Utc::now(),
            copied: false,
        };

        Self {
            config,
            sampler,
            ids,
            state: Arc::new(RwLock::new(ChatState {
                messages: vec![greeting],
                loading: false,
                model,
            })),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Send a user message.
    ///
    /// The user message appends immediately; after the reply delay one
    /// assistant message appends, drawn uniformly from [`REPLIES`].
    /// Rejects empty/whitespace input and rejects while a reply is pending.
    pub async fn send(&self, content: &str) -> Result<JoinHandle<()>> {
        if content.trim().is_empty() {
            return Err(NexusError::EmptyInput {
                field: "message".to_string(),
            });
        }

        let generation;
        {
            let mut state = self.state.write().await;
            if state.loading {
                return Err(NexusError::ReplyPending);
            }
            state.messages.push(ChatMessage {
                id: self.ids.next_id(),
                role: Role::User,
                content: content.to_string(),
                timestamp: Utc::now(),
                copied: false,
            });
            state.loading = true;
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        }

        let reply_delay = self.config.reply_delay();
        let sampler = Arc::clone(&self.sampler);
        let ids = Arc::clone(&self.ids);
        let state = Arc::clone(&self.state);
        let generation_counter = Arc::clone(&self.generation);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(reply_delay).await;

            let mut state = state.write().await;
            if generation_counter.load(Ordering::SeqCst) != generation {
                // Transcript was cleared while the reply was pending
                return;
            }
            let reply = REPLIES[sampler.pick_index(REPLIES.len())];
            state.messages.push(ChatMessage {
                id: ids.next_id(),
                role: Role::Assistant,
                content: reply.to_string(),
                timestamp: Utc::now(),
                copied: false,
            });
            state.loading = false;
        });

        Ok(handle)
    }

    /// Snapshot of the transcript in display order
    pub async fn transcript(&self) -> Vec<ChatMessage> {
        self.state.read().await.messages.clone()
    }

    /// True while an assistant reply is pending
    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    /// Reset the transcript to the greeting, suppressing any pending reply
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        state.messages = vec![ChatMessage {
            id: self.ids.next_id(),
            role: Role::Assistant,
            content: GREETING.to_string(),
            timestamp: Utc::now(),
            copied: false,
        }];
        state.loading = false;
    }

    /// Copy a message's content to the clipboard and flag it as copied;
    /// the flag clears itself after the configured reset delay
    pub async fn copy_message(&self, message_id: &str, clipboard: &dyn Clipboard) -> Result<()> {
        let content = {
            let state = self.state.read().await;
            state
                .messages
                .iter()
                .find(|m| m.id == message_id)
                .map(|m| m.content.clone())
                .ok_or_else(|| NexusError::Internal {
                    message: format!("no such message: {message_id}"),
                })?
        };

        clipboard.write_text(&content).await?;

        {
            let mut state = self.state.write().await;
            if let Some(message) = state.messages.iter_mut().find(|m| m.id == message_id) {
                message.copied = true;
            }
        }

        let reset_delay = self.config.copied_reset();
        let state = Arc::clone(&self.state);
        let message_id = message_id.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(reset_delay).await;
            let mut state = state.write().await;
            // The transcript may have been cleared in the meantime
            if let Some(message) = state.messages.iter_mut().find(|m| m.id == message_id) {
                message.copied = false;
            }
        });

        Ok(())
    }

    /// The fixed model catalog
    pub fn models(&self) -> &'static [ModelEntry] {
        &MODEL_CATALOG
    }

    /// Currently selected model id
    pub async fn active_model(&self) -> String {
        self.state.read().await.model.clone()
    }

    /// Select a model by catalog id
    pub async fn set_model(&self, id: &str) -> Result<()> {
        if !MODEL_CATALOG.iter().any(|m| m.id == id) {
            return Err(NexusError::UnknownModel { id: id.to_string() });
        }
        self.state.write().await.model = id.to_string();
        Ok(())
    }
}
