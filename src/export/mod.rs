//! Export module for multi-format report generation
//!
//! This module turns a hydrated [`ExportData`](crate::model::ExportData) into
//! one of four downloadable files:
//! - CSV: one quoted row per case
//! - HTML: standalone styled document
//! - Word: `.docx` document with headings and bold labels
//! - PDF: paginated fixed-layout document
//!
//! # Architecture
//!
//! 1. **ReportWriter**: per-format encoder with `begin` / `write_case` / `finish` phases
//! 2. **ExportCoordinator**: drives a writer through its phases, reporting progress
//!    and checking the cancellation token at fixed checkpoints
//! 3. **ProgressReporter**: forwards progress snapshots to the caller's observer
//! 4. **FileSink**: persists the finished bytes (directory, memory, ...)
//!
//! The **ExportManager** owns one export attempt and ties these together.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use eulaw_report::export::{DirectorySink, ExportManager};
//! use eulaw_report::model::ExportData;
//!
//! # async fn run(data: ExportData) -> eulaw_report::Result<()> {
//! let sink = Arc::new(DirectorySink::new("reports")?);
//! let manager = ExportManager::new(sink)
//!     .with_observer(|p| println!("{:>3.0}% {}", p.progress, p.message));
//! manager.export_to_pdf(&data).await?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod coordinator;
pub mod manager;
pub mod progress;
pub mod sink;
pub mod writers;

pub use coordinator::{ExportCoordinator, PhaseOutcome};
pub use manager::{CancelHandle, ExportManager, ExportOutcome, ExportResult};
pub use progress::{ProgressCallback, ProgressReporter, ProgressTracker, progress_channel};
pub use sink::{DirectorySink, FileSink, MemorySink, SavedFile};
pub use writers::{CsvWriter, DocxWriter, HtmlWriter, PdfWriter, ReportWriter};

/// Prefix of every exported filename
pub const FILENAME_PREFIX: &str = "eu-law-report";

/// Output format of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Html,
    Word,
    Pdf,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Csv,
        ExportFormat::Html,
        ExportFormat::Word,
        ExportFormat::Pdf,
    ];

    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Html => "html",
            ExportFormat::Word => "docx",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// MIME type handed to the file sink
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv;charset=utf-8;",
            ExportFormat::Html => "text/html;charset=utf-8;",
            ExportFormat::Word => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ExportFormat::Pdf => "application/pdf",
        }
    }

    /// Human readable name used in progress messages
    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Html => "HTML",
            ExportFormat::Word => "Word",
            ExportFormat::Pdf => "PDF",
        }
    }

    /// Build `eu-law-report-<unix-millis>.<ext>`
    pub fn filename(&self, timestamp_ms: i64) -> String {
        format!("{}-{}.{}", FILENAME_PREFIX, timestamp_ms, self.extension())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "html" | "htm" => Ok(ExportFormat::Html),
            "word" | "docx" => Ok(ExportFormat::Word),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(format!(
                "Unknown export format '{other}' (expected csv, html, word or pdf)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_pattern() {
        assert_eq!(
            ExportFormat::Word.filename(1700000000000),
            "eu-law-report-1700000000000.docx"
        );
    }

    #[test]
    fn test_parse_format_aliases() {
        assert_eq!("DOCX".parse::<ExportFormat>(), Ok(ExportFormat::Word));
        assert_eq!("htm".parse::<ExportFormat>(), Ok(ExportFormat::Html));
        assert!("xlsx".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(ExportFormat::Csv.mime_type(), "text/csv;charset=utf-8;");
        assert_eq!(ExportFormat::Html.mime_type(), "text/html;charset=utf-8;");
        assert!(ExportFormat::Word.mime_type().ends_with("wordprocessingml.document"));
    }
}
