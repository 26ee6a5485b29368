//! # Notification and Clipboard Module
//!
//! ## Purpose
//! Injected side channels for the engine: a [`Notifier`] the pipelines call
//! with toast-style messages, and an async [`Clipboard`] for copy actions.
//! Both are seams rather than process-wide singletons so a host UI can plug
//! in its own surfaces and headless runs still observe every event through
//! structured logs.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::{NexusError, Result};

/// Severity of a user-facing notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Toast-style notification sink invoked by the engine
pub trait Notifier: Send + Sync {
    fn notify(&self, severity: Severity, title: &str, message: &str);
}

/// Default notifier that routes notifications to structured logs
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, severity: Severity, title: &str, message: &str) {
        match severity {
            Severity::Info => tracing::info!(title, "{}", message),
            Severity::Warning => tracing::warn!(title, "{}", message),
            Severity::Error => tracing::error!(title, "{}", message),
        }
    }
}

/// Platform clipboard seam; the write is async because host clipboards
/// (browser, desktop toolkit) expose it that way
#[async_trait]
pub trait Clipboard: Send + Sync {
    /// Write `text` to the clipboard, reporting rejection as
    /// [`NexusError::ClipboardWriteFailed`]
    async fn write_text(&self, text: &str) -> Result<()>;
}

/// In-memory clipboard used by the demo binary and tests
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    last: RwLock<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last text written, if any
    pub async fn last_text(&self) -> Option<String> {
        self.last.read().await.clone()
    }
}

#[async_trait]
impl Clipboard for MemoryClipboard {
    async fn write_text(&self, text: &str) -> Result<()> {
        *self.last.write().await = Some(text.to_string());
        Ok(())
    }
}

/// Clipboard that rejects every write, for exercising the failure path
#[derive(Debug, Default)]
pub struct DeniedClipboard;

#[async_trait]
impl Clipboard for DeniedClipboard {
    async fn write_text(&self, _text: &str) -> Result<()> {
        Err(NexusError::ClipboardWriteFailed {
            details: "clipboard access denied".to_string(),
        })
    }
}
