//! # D-Lite Nexus Workspace Engine
//!
//! ## Overview
//! This library implements the in-process engine behind a three-tab AI
//! workspace (chat, file analysis, and web search) backed entirely by
//! mock data and simulated timers. There is no server, no file parsing, and
//! no model inference; the engine's substance is its asynchronous pipeline
//! state machine: delay-gated stages, progress ticking, busy/loading flags,
//! and generation-numbered stale-result suppression.
//!
//! ## Architecture
//! The system is composed of several key modules:
//! - `upload`: extension validation, staged-file list, simulated progress
//! - `analysis`: delay-gated mock document analysis
//! - `search`: two-stage mock retrieval and AI summary
//! - `chat`: transcript simulator with canned replies and model catalog
//! - `session`: composition root wiring the pipelines to shared capabilities
//! - `sampling`: injectable randomness and message identity
//! - `notify`: injected notification and clipboard seams
//! - `config`: configuration management and timing settings
//! - `errors`: centralized error handling and types
//!
//! ## Usage
//! ```rust,no_run
//! use std::sync::Arc;
//! use dlite_nexus::{Config, NexusSession};
//!
//! #[tokio::main]
//! async fn main() -> dlite_nexus::Result<()> {
//!     let config = Arc::new(Config::load()?);
//!     let session = NexusSession::new(config);
//!     session.search.search("rust").await?.await.ok();
//!     println!("{:?}", session.search.snapshot().await.summary);
//!     Ok(())
//! }
//! ```

// Core modules
pub mod analysis;
pub mod chat;
pub mod config;
pub mod errors;
pub mod notify;
pub mod sampling;
pub mod search;
pub mod session;
pub mod upload;

// Re-exports for convenience
pub use analysis::{AnalysisPipeline, AnalysisRecord, EntityGroup, EntityType};
pub use chat::{ChatMessage, ChatSimulator, ModelEntry, Role};
pub use config::Config;
pub use errors::{NexusError, Result};
pub use notify::{Clipboard, Notifier, Severity};
pub use search::{SearchPipeline, SearchResult, SearchState};
pub use session::NexusSession;
pub use upload::{FileDescriptor, FileStager, ProgressSimulator, UploadedFile};
