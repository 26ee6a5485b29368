//! # Session Module
//!
//! ## Purpose
//! Composition root for one workspace session: owns a chat simulator, an
//! analysis pipeline, a search pipeline, and the upload stager/progress
//! pair, wired to shared notifier and clipboard capabilities. Drives the
//! upload → progress → analysis flow end to end. Nothing here survives the
//! session; there is no persistence.

use std::sync::Arc;

use crate::analysis::{AnalysisPipeline, AnalysisRecord};
use crate::chat::ChatSimulator;
use crate::config::Config;
use crate::errors::{NexusError, Result};
use crate::notify::{Clipboard, MemoryClipboard, Notifier, Severity, TracingNotifier};
use crate::sampling::{IdGenerator, RandomSource, ThreadRngSource, UuidGenerator};
use crate::search::SearchPipeline;
use crate::upload::{FileDescriptor, FileStager, ProgressSimulator, ValidationOutcome, REJECT_WARNING};

/// One in-memory workspace session
pub struct NexusSession {
    pub config: Arc<Config>,
    pub chat: ChatSimulator,
    pub analysis: AnalysisPipeline,
    pub search: SearchPipeline,
    pub stager: FileStager,
    pub progress: ProgressSimulator,
    notifier: Arc<dyn Notifier>,
    clipboard: Arc<dyn Clipboard>,
}

impl NexusSession {
    /// Create a session with production capabilities: thread RNG, UUID ids,
    /// tracing-backed notifications, in-memory clipboard
    pub fn new(config: Arc<Config>) -> Self {
        Self::with_capabilities(
            config,
            Arc::new(ThreadRngSource),
            Arc::new(UuidGenerator),
            Arc::new(TracingNotifier),
            Arc::new(MemoryClipboard::new()),
        )
    }

    /// Create a session with injected capabilities
    pub fn with_capabilities(
        config: Arc<Config>,
        sampler: Arc<dyn RandomSource>,
        ids: Arc<dyn IdGenerator>,
        notifier: Arc<dyn Notifier>,
        clipboard: Arc<dyn Clipboard>,
    ) -> Self {
        let chat = ChatSimulator::new(config.chat.clone(), Arc::clone(&sampler), ids);
        let analysis = AnalysisPipeline::new(config.analysis.clone(), sampler);
        let search = SearchPipeline::new(config.search.clone());
        let stager = FileStager::new();
        let progress = ProgressSimulator::new(&config.upload);

        tracing::info!("workspace session initialized");

        Self {
            config,
            chat,
            analysis,
            search,
            stager,
            progress,
            notifier,
            clipboard,
        }
    }

    /// Validate and stage a candidate batch, surfacing a non-blocking
    /// warning when any file was rejected
    pub async fn stage_files(&self, candidates: &[FileDescriptor]) -> ValidationOutcome {
        let outcome = self.stager.add(candidates).await;
        if outcome.rejected > 0 {
            self.notifier
                .notify(Severity::Warning, "Invalid file(s)", REJECT_WARNING);
        }
        outcome
    }

    /// Run the staged batch through simulated upload then analysis.
    ///
    /// No-op on an empty stage. The progress bar runs to 100 before the
    /// analysis delay starts; the record batch lands atomically.
    pub async fn upload_and_analyze(&self) -> Result<Vec<AnalysisRecord>> {
        let files = self.stager.files().await;
        if files.is_empty() {
            return Ok(Vec::new());
        }

        self.progress.run_to_completion().await?;
        tracing::info!(file_count = files.len(), "upload complete, analyzing");

        Ok(self.analysis.analyze(&files).await)
    }

    /// Copy a chat message to the clipboard, reporting the outcome as a
    /// notification either way
    pub async fn copy_message(&self, message_id: &str) -> Result<()> {
        match self.chat.copy_message(message_id, self.clipboard.as_ref()).await {
            Ok(()) => {
                self.notifier.notify(
                    Severity::Info,
                    "Copied to clipboard",
                    "Message content copied successfully",
                );
                Ok(())
            }
            Err(err) => {
                self.notifier
                    .notify(Severity::Error, "Failed to copy", "Couldn't copy to clipboard");
                Err(err)
            }
        }
    }

    /// Copy the AI search summary to the clipboard, if one is available
    pub async fn copy_search_summary(&self) -> Result<()> {
        let summary = self
            .search
            .snapshot()
            .await
            .summary
            .ok_or_else(|| NexusError::Internal {
                message: "no AI response available to copy".to_string(),
            })?;

        match self.clipboard.write_text(&summary).await {
            Ok(()) => {
                self.notifier.notify(
                    Severity::Info,
                    "Copied to clipboard",
                    "AI response copied successfully",
                );
                Ok(())
            }
            Err(err) => {
                self.notifier
                    .notify(Severity::Error, "Failed to copy", "Couldn't copy to clipboard");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::{FixedSequenceSource, SequentialIdGenerator};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        events: Mutex<Vec<(Severity, String)>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, severity: Severity, title: &str, _message: &str) {
            self.events
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push((severity, title.to_string()));
        }
    }

    fn session(notifier: Arc<RecordingNotifier>) -> NexusSession {
        NexusSession::with_capabilities(
            Arc::new(Config::default()),
            Arc::new(FixedSequenceSource::new(vec![0.0])),
            Arc::new(SequentialIdGenerator::default()),
            notifier,
            Arc::new(MemoryClipboard::new()),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_stage_files_warns_on_reject() {
        let notifier = Arc::new(RecordingNotifier::default());
        let session = session(Arc::clone(&notifier));

        let outcome = session
            .stage_files(&[
                FileDescriptor::new("report.pdf", 1000),
                FileDescriptor::new("virus.exe", 1000),
            ])
            .await;

        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.rejected, 1);
        let events = notifier.events.lock().unwrap().clone();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, Severity::Warning);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stage_files_quiet_when_all_accepted() {
        let notifier = Arc::new(RecordingNotifier::default());
        let session = session(Arc::clone(&notifier));

        session
            .stage_files(&[FileDescriptor::new("data.csv", 1000)])
            .await;
        assert!(notifier.events.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_upload_and_analyze_end_to_end() {
        let notifier = Arc::new(RecordingNotifier::default());
        let session = session(notifier);

        session
            .stage_files(&[
                FileDescriptor::new("report.pdf", 1000),
                FileDescriptor::new("data.csv", 2000),
            ])
            .await;

        let started = tokio::time::Instant::now();
        let records = session.upload_and_analyze().await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(session.progress.percent(), 100);
        // Upload ticks (20 x 100ms) plus the 2000ms analysis delay
        assert!(started.elapsed() >= std::time::Duration::from_millis(4000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_upload_and_analyze_empty_stage_is_noop() {
        let notifier = Arc::new(RecordingNotifier::default());
        let session = session(notifier);

        let started = tokio::time::Instant::now();
        let records = session.upload_and_analyze().await.unwrap();
        assert!(records.is_empty());
        assert_eq!(started.elapsed(), std::time::Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_copy_search_summary_requires_results() {
        let notifier = Arc::new(RecordingNotifier::default());
        let session = session(Arc::clone(&notifier));

        assert!(session.copy_search_summary().await.is_err());

        session.search.search("rust").await.unwrap().await.unwrap();
        session.copy_search_summary().await.unwrap();

        let events = notifier.events.lock().unwrap().clone();
        assert_eq!(events.last().unwrap().0, Severity::Info);
    }

    #[tokio::test(start_paused = true)]
    async fn test_copy_message_notifies() {
        let notifier = Arc::new(RecordingNotifier::default());
        let session = session(Arc::clone(&notifier));

        let greeting_id = session.chat.transcript().await[0].id.clone();
        session.copy_message(&greeting_id).await.unwrap();

        let events = notifier.events.lock().unwrap().clone();
        assert_eq!(events.last().unwrap().1, "Copied to clipboard");
    }
}
