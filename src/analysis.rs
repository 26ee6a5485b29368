//! # Analysis Pipeline Module
//!
//! ## Purpose
//! Simulated document analysis for validated upload batches. The pipeline
//! waits out a configured processing delay, then emits one mock record per
//! file: a summary chosen by extension and a randomly sampled subset of
//! entity groups. No file content is ever inspected.
//!
//! ## Input/Output Specification
//! - **Input**: Validated [`UploadedFile`] batch (the pipeline does not re-validate)
//! - **Output**: One atomic `Vec<AnalysisRecord>`; never partial or streamed
//! - **Timing**: Single delay gate; empty input returns immediately
//!
//! ## Key Features
//! - Per-extension summary lookup with a generic fallback
//! - Entity groups included independently with configured probability,
//!   emitted in declaration order
//! - Busy flag observable while the delay is in flight
//! - JSON export of a completed batch

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::AnalysisConfig;
use crate::errors::Result;
use crate::sampling::RandomSource;
use crate::upload::UploadedFile;

const PDF_SUMMARY: &str = "This PDF document appears to be a detailed report containing financial data, charts, and textual analysis. The document is structured with an executive summary, methodology section, findings, and recommendations.";
const DOC_SUMMARY: &str = "This document contains formatted text with headings, paragraphs, and possibly tables or images. The content appears to be a business proposal or technical documentation.";
const TXT_SUMMARY: &str = "This text file contains plain text without formatting. It appears to be a log file or note with structured content organized in paragraphs.";
const SHEET_SUMMARY: &str = "This spreadsheet contains tabular data with multiple columns and rows. The data appears to be structured as a dataset with numerical values and possibly headers and labels.";
const JSON_SUMMARY: &str = "This JSON file contains structured data in a key-value format. The structure includes nested objects and arrays with various data types.";
const FALLBACK_SUMMARY: &str = "This file has been analyzed but the structure is unclear. Further processing may be needed for detailed insights.";

const PERSON_NAMES: [&str; 3] = ["John Smith", "Jane Doe", "Michael Brown"];
const ORGANIZATION_NAMES: [&str; 3] = ["Acme Corp", "Global Enterprises", "Tech Solutions"];
const LOCATION_NAMES: [&str; 3] = ["New York", "London", "Tokyo"];
const DATE_NAMES: [&str; 3] = ["January 15, 2025", "March 3, 2025", "December 10, 2024"];

/// Entity categories, in the fixed order they appear in records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityType {
    Person,
    Organization,
    Location,
    Date,
}

impl EntityType {
    /// All entity types in declaration order
    pub const ALL: [EntityType; 4] = [
        EntityType::Person,
        EntityType::Organization,
        EntityType::Location,
        EntityType::Date,
    ];

    fn names(&self) -> &'static [&'static str; 3] {
        match self {
            EntityType::Person => &PERSON_NAMES,
            EntityType::Organization => &ORGANIZATION_NAMES,
            EntityType::Location => &LOCATION_NAMES,
            EntityType::Date => &DATE_NAMES,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityType::Person => "Person",
            EntityType::Organization => "Organization",
            EntityType::Location => "Location",
            EntityType::Date => "Date",
        };
        f.write_str(label)
    }
}

/// One entity group within a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityGroup {
    pub entity_type: EntityType,
    pub names: Vec<String>,
}

/// Mock analysis output for a single file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub file: UploadedFile,
    pub summary: String,
    pub entities: Vec<EntityGroup>,
}

/// Summary text for a file extension; unknown extensions fall back to a
/// generic string
pub fn summary_for_extension(extension: &str) -> &'static str {
    match extension {
        "pdf" => PDF_SUMMARY,
        "doc" | "docx" => DOC_SUMMARY,
        "txt" => TXT_SUMMARY,
        "csv" | "xls" | "xlsx" => SHEET_SUMMARY,
        "json" => JSON_SUMMARY,
        _ => FALLBACK_SUMMARY,
    }
}

/// Simulated analysis pipeline
pub struct AnalysisPipeline {
    config: AnalysisConfig,
    sampler: Arc<dyn RandomSource>,
    busy: Arc<RwLock<bool>>,
}

impl AnalysisPipeline {
    pub fn new(config: AnalysisConfig, sampler: Arc<dyn RandomSource>) -> Self {
        Self {
            config,
            sampler,
            busy: Arc::new(RwLock::new(false)),
        }
    }

    /// Analyze a validated batch.
    ///
    /// Enters the busy state, waits out the processing delay, then returns
    /// the full record batch as one atomic value. Empty input short-circuits
    /// with no delay and no busy transition. Duplicate filenames yield
    /// distinct records, keyed by position.
    pub async fn analyze(&self, files: &[UploadedFile]) -> Vec<AnalysisRecord> {
        if files.is_empty() {
            return Vec::new();
        }

        *self.busy.write().await = true;
        tracing::debug!(file_count = files.len(), "analysis started");

        tokio::time::sleep(self.config.processing_delay()).await;

        let records: Vec<AnalysisRecord> =
            files.iter().map(|file| self.record_for(file)).collect();

        *self.busy.write().await = false;
        tracing::info!(record_count = records.len(), "analysis complete");

        records
    }

    /// True while a batch is inside the delay gate
    pub async fn is_busy(&self) -> bool {
        *self.busy.read().await
    }

    fn record_for(&self, file: &UploadedFile) -> AnalysisRecord {
        let entities = EntityType::ALL
            .iter()
            .filter(|_| self.sampler.next_f64() < self.config.entity_inclusion_probability)
            .map(|entity_type| EntityGroup {
                entity_type: *entity_type,
                names: entity_type.names().iter().map(|s| s.to_string()).collect(),
            })
            .collect();

        AnalysisRecord {
            file: file.clone(),
            summary: summary_for_extension(&file.extension).to_string(),
            entities,
        }
    }
}

/// Serialize a completed batch to pretty JSON, the downloadable form of a
/// full analysis
pub fn export_json(records: &[AnalysisRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::sampling::FixedSequenceSource;

    fn uploaded(name: &str, extension: &str) -> UploadedFile {
        UploadedFile {
            name: name.to_string(),
            size_bytes: 2048,
            extension: extension.to_string(),
        }
    }

    fn pipeline_with(draws: Vec<f64>) -> AnalysisPipeline {
        let config = Config::default();
        AnalysisPipeline::new(config.analysis, Arc::new(FixedSequenceSource::new(draws)))
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_input_returns_immediately() {
        let pipeline = pipeline_with(vec![0.0]);
        let started = tokio::time::Instant::now();
        let records = pipeline.analyze(&[]).await;
        assert!(records.is_empty());
        assert_eq!(started.elapsed(), std::time::Duration::ZERO);
        assert!(!pipeline.is_busy().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_pdf_record() {
        // All draws below the threshold: every entity group included
        let pipeline = pipeline_with(vec![0.0]);
        let records = pipeline.analyze(&[uploaded("report.pdf", "pdf")]).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].summary, PDF_SUMMARY);
        assert_eq!(records[0].entities.len(), 4);
        let order: Vec<EntityType> = records[0]
            .entities
            .iter()
            .map(|g| g.entity_type)
            .collect();
        assert_eq!(order, EntityType::ALL.to_vec());
    }

    #[tokio::test(start_paused = true)]
    async fn test_entity_sampling_follows_draws() {
        // Person in, Organization out, Location in, Date out
        let pipeline = pipeline_with(vec![0.1, 0.9, 0.1, 0.9]);
        let records = pipeline.analyze(&[uploaded("data.csv", "csv")]).await;

        let included: Vec<EntityType> = records[0]
            .entities
            .iter()
            .map(|g| g.entity_type)
            .collect();
        assert_eq!(included, vec![EntityType::Person, EntityType::Location]);
        assert_eq!(records[0].entities[0].names, PERSON_NAMES.to_vec());
    }

    #[tokio::test(start_paused = true)]
    async fn test_summary_table_and_fallback() {
        let pipeline = pipeline_with(vec![0.9]);
        let files = vec![
            uploaded("a.docx", "docx"),
            uploaded("b.xls", "xls"),
            uploaded("c.json", "json"),
            uploaded("d.zip", "zip"),
        ];
        let records = pipeline.analyze(&files).await;

        assert_eq!(records[0].summary, DOC_SUMMARY);
        assert_eq!(records[1].summary, SHEET_SUMMARY);
        assert_eq!(records[2].summary, JSON_SUMMARY);
        assert_eq!(records[3].summary, FALLBACK_SUMMARY);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_filenames_distinct_records() {
        let pipeline = pipeline_with(vec![0.9]);
        let files = vec![uploaded("log.txt", "txt"), uploaded("log.txt", "txt")];
        let records = pipeline.analyze(&files).await;
        assert_eq!(records.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_busy_flag_covers_delay() {
        let pipeline = Arc::new(pipeline_with(vec![0.0]));
        let worker = Arc::clone(&pipeline);
        let handle =
            tokio::spawn(async move { worker.analyze(&[uploaded("a.pdf", "pdf")]).await });

        // Let the spawned batch enter the delay gate
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        assert!(pipeline.is_busy().await);

        let records = handle.await.unwrap();
        assert_eq!(records.len(), 1);
        assert!(!pipeline.is_busy().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_export_json_round_trips() {
        let pipeline = pipeline_with(vec![0.0]);
        let records = pipeline.analyze(&[uploaded("report.pdf", "pdf")]).await;
        let json = export_json(&records).unwrap();
        assert!(json.contains("report.pdf"));
        assert!(json.contains("Person"));
    }
}
