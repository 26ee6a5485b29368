//! # Upload Module
//!
//! ## Purpose
//! File-upload handling for the analysis tab: extension-based batch
//! validation, the staged-file list, and the simulated upload progress bar.
//! No bytes are ever read; an "upload" is a timer that walks a percentage
//! from 0 to 100.
//!
//! ## Input/Output Specification
//! - **Input**: File descriptors (name + byte size) from a picker or drop event
//! - **Output**: Accepted [`UploadedFile`]s, reject counts, progress updates
//! - **State machine**: Idle → Running → Complete, cancellable
//!
//! ## Key Features
//! - Fixed allow-set validation, case-insensitive on the final extension
//! - Staged list with add/remove/clear mirroring the selection UI
//! - Repeating-tick progress with a single completion callback per run
//! - Generation-guarded cancellation so stale ticks never mutate state

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};

use crate::errors::{NexusError, Result};

/// Extensions accepted for analysis
pub const ALLOWED_EXTENSIONS: [&str; 8] =
    ["pdf", "doc", "docx", "txt", "csv", "xls", "xlsx", "json"];

/// Warning surfaced when a batch contains rejected files
pub const REJECT_WARNING: &str =
    "Some files were rejected. Please upload PDF, DOC, TXT, CSV, XLS, or JSON files.";

/// Opaque file descriptor from the platform file picker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// File name as reported by the platform
    pub name: String,
    /// Size in bytes
    pub size_bytes: u64,
}

impl FileDescriptor {
    pub fn new(name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            size_bytes,
        }
    }
}

/// A file that passed validation; immutable once accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Original file name
    pub name: String,
    /// Size in bytes
    pub size_bytes: u64,
    /// Lowercase extension (text after the final `.`)
    pub extension: String,
}

/// Outcome of validating one candidate batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub accepted: Vec<UploadedFile>,
    pub rejected: usize,
}

/// Lowercase text after the final `.`; the whole name when there is no dot
fn extension_of(name: &str) -> String {
    name.rsplit('.')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// Filter a candidate batch by the fixed allow-set.
///
/// Pure: no side effects beyond the returned outcome. The invariant
/// `accepted.len() + rejected == candidates.len()` always holds.
pub fn validate(candidates: &[FileDescriptor]) -> ValidationOutcome {
    let mut accepted = Vec::new();
    let mut rejected = 0;

    for candidate in candidates {
        let extension = extension_of(&candidate.name);
        if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            accepted.push(UploadedFile {
                name: candidate.name.clone(),
                size_bytes: candidate.size_bytes,
                extension,
            });
        } else {
            rejected += 1;
        }
    }

    ValidationOutcome { accepted, rejected }
}

/// Staged-file list backing the upload panel
#[derive(Debug, Default)]
pub struct FileStager {
    files: RwLock<Vec<UploadedFile>>,
}

impl FileStager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `candidates` and append the accepted subset.
    ///
    /// Returns the outcome so the caller can surface a non-blocking warning
    /// when `rejected > 0`; accepted files still proceed.
    pub async fn add(&self, candidates: &[FileDescriptor]) -> ValidationOutcome {
        let outcome = validate(candidates);
        if !outcome.accepted.is_empty() {
            self.files.write().await.extend(outcome.accepted.clone());
        }
        outcome
    }

    /// Remove the staged file at `index`, if present
    pub async fn remove(&self, index: usize) -> Option<UploadedFile> {
        let mut files = self.files.write().await;
        if index < files.len() {
            Some(files.remove(index))
        } else {
            None
        }
    }

    /// Drop every staged file
    pub async fn clear(&self) {
        self.files.write().await.clear();
    }

    /// Snapshot of the staged list in insertion order
    pub async fn files(&self) -> Vec<UploadedFile> {
        self.files.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.files.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.files.read().await.is_empty()
    }
}

/// Phase of the simulated upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressPhase {
    Idle,
    Running,
    Complete,
}

/// Simulated upload progress bar.
///
/// `start()` begins a repeating tick that adds a fixed increment to the
/// percentage, clamped at 100. On reaching 100 the tick stops, the phase
/// moves to `Complete`, and the completion callback fires exactly once, on
/// the final tick. Starting while already `Running` is rejected;
/// `cancel()` aborts the run without firing the callback.
pub struct ProgressSimulator {
    tick_interval: std::time::Duration,
    increment: u8,
    phase: Arc<RwLock<ProgressPhase>>,
    generation: Arc<AtomicU64>,
    percent: watch::Sender<u8>,
}

impl ProgressSimulator {
    pub fn new(config: &crate::config::UploadConfig) -> Self {
        let (percent, _) = watch::channel(0);
        Self {
            tick_interval: config.tick_interval(),
            increment: config.tick_increment,
            phase: Arc::new(RwLock::new(ProgressPhase::Idle)),
            generation: Arc::new(AtomicU64::new(0)),
            percent,
        }
    }

    /// Begin a run, invoking `on_complete` once the percentage reaches 100.
    ///
    /// Returns [`NexusError::UploadInProgress`] while a previous run is
    /// still ticking. A completed or cancelled simulator can be started
    /// again; the percentage resets to 0.
    pub async fn start<F>(&self, on_complete: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut phase = self.phase.write().await;
        if *phase == ProgressPhase::Running {
            return Err(NexusError::UploadInProgress);
        }
        *phase = ProgressPhase::Running;

        // Claim the generation under the phase lock so a concurrent
        // cancel() cannot interleave between reset and spawn
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.percent.send_replace(0);
        drop(phase);

        let tick_interval = self.tick_interval;
        let increment = self.increment;
        let phase = Arc::clone(&self.phase);
        let generation_counter = Arc::clone(&self.generation);
        let percent = self.percent.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(tick_interval);
            // First tick completes immediately; consume it so increments
            // land one interval apart
            ticker.tick().await;

            loop {
                ticker.tick().await;

                let mut phase = phase.write().await;
                if generation_counter.load(Ordering::SeqCst) != generation {
                    // Superseded by cancel() or a later run
                    return;
                }

                let next = percent.borrow().saturating_add(increment).min(100);
                percent.send_replace(next);

                if next >= 100 {
                    *phase = ProgressPhase::Complete;
                    drop(phase);
                    tracing::debug!("upload progress complete");
                    on_complete();
                    return;
                }
            }
        });

        Ok(())
    }

    /// Start a run and wait for it to finish
    pub async fn run_to_completion(&self) -> Result<()> {
        let (done_tx, done_rx) = tokio::sync::oneshot::channel();
        self.start(move || {
            let _ = done_tx.send(());
        })
        .await?;

        done_rx.await.map_err(|_| NexusError::Internal {
            message: "upload cancelled before completion".to_string(),
        })
    }

    /// Abort the current run; no callback fires and the percentage resets
    pub async fn cancel(&self) {
        let mut phase = self.phase.write().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        *phase = ProgressPhase::Idle;
        self.percent.send_replace(0);
    }

    /// Current percentage in `[0, 100]`
    pub fn percent(&self) -> u8 {
        *self.percent.borrow()
    }

    /// Subscribe to percentage updates
    pub fn subscribe(&self) -> watch::Receiver<u8> {
        self.percent.subscribe()
    }

    /// Current phase
    pub async fn phase(&self) -> ProgressPhase {
        *self.phase.read().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::sync::atomic::AtomicUsize;

    fn descriptors(names: &[&str]) -> Vec<FileDescriptor> {
        names
            .iter()
            .map(|name| FileDescriptor::new(*name, 1024))
            .collect()
    }

    #[test]
    fn test_validate_partitions_batch() {
        let candidates = descriptors(&["report.pdf", "notes.TXT", "image.png", "data.csv"]);
        let outcome = validate(&candidates);

        assert_eq!(outcome.accepted.len() + outcome.rejected, candidates.len());
        assert_eq!(outcome.rejected, 1);
        assert_eq!(outcome.accepted[1].extension, "txt");
        for file in &outcome.accepted {
            assert!(ALLOWED_EXTENSIONS.contains(&file.extension.as_str()));
        }
    }

    #[test]
    fn test_validate_empty_batch() {
        let outcome = validate(&[]);
        assert!(outcome.accepted.is_empty());
        assert_eq!(outcome.rejected, 0);
    }

    #[test]
    fn test_validate_no_dot_uses_whole_name() {
        // "pdf" with no dot resolves to extension "pdf"
        let outcome = validate(&descriptors(&["pdf", "archive"]));
        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.rejected, 1);
    }

    #[tokio::test]
    async fn test_stager_add_remove_clear() {
        let stager = FileStager::new();
        let outcome = stager
            .add(&descriptors(&["a.pdf", "b.exe", "c.json"]))
            .await;
        assert_eq!(outcome.rejected, 1);
        assert_eq!(stager.len().await, 2);

        let removed = stager.remove(0).await.unwrap();
        assert_eq!(removed.name, "a.pdf");
        assert_eq!(stager.len().await, 1);
        assert!(stager.remove(5).await.is_none());

        stager.clear().await;
        assert!(stager.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_reaches_100_and_fires_once() {
        let config = Config::default();
        let progress = ProgressSimulator::new(&config.upload);
        let fired = Arc::new(AtomicUsize::new(0));

        let mut updates = progress.subscribe();
        let observed = Arc::new(RwLock::new(Vec::new()));
        let observed_task = Arc::clone(&observed);
        tokio::spawn(async move {
            while updates.changed().await.is_ok() {
                observed_task.write().await.push(*updates.borrow());
            }
        });

        let started = tokio::time::Instant::now();
        let fired_cb = Arc::clone(&fired);
        progress
            .start(move || {
                fired_cb.fetch_add(1, Ordering::SeqCst);
            })
            .await
            .unwrap();

        progress.run_to_completion().await.unwrap_err(); // still running
        // Wait out the full run: 20 ticks of 100ms
        tokio::time::sleep(std::time::Duration::from_millis(2500)).await;

        assert_eq!(progress.percent(), 100);
        assert_eq!(progress.phase().await, ProgressPhase::Complete);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() >= std::time::Duration::from_millis(2000));

        let observed = observed.read().await.clone();
        assert!(observed.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(observed.last().copied(), Some(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_rejects_reentrant_start() {
        let config = Config::default();
        let progress = ProgressSimulator::new(&config.upload);

        progress.start(|| {}).await.unwrap();
        let err = progress.start(|| {}).await.unwrap_err();
        assert!(matches!(err, NexusError::UploadInProgress));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_suppresses_callback() {
        let config = Config::default();
        let progress = ProgressSimulator::new(&config.upload);
        let fired = Arc::new(AtomicUsize::new(0));

        let fired_cb = Arc::clone(&fired);
        progress
            .start(move || {
                fired_cb.fetch_add(1, Ordering::SeqCst);
            })
            .await
            .unwrap();
        progress.cancel().await;

        tokio::time::sleep(std::time::Duration::from_millis(5000)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(progress.percent(), 0);
        assert_eq!(progress.phase().await, ProgressPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_completion() {
        let config = Config::default();
        let progress = ProgressSimulator::new(&config.upload);

        progress.run_to_completion().await.unwrap();
        assert_eq!(progress.percent(), 100);

        // A completed run can be started again from zero
        progress.run_to_completion().await.unwrap();
        assert_eq!(progress.percent(), 100);
        assert_eq!(progress.phase().await, ProgressPhase::Complete);
    }
}
