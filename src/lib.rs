//! EU Law Report Export Library
//!
//! This library turns a report of EU court cases and their operative parts
//! into a downloadable CSV, HTML, Word (`.docx`) or PDF file, with progress
//! reporting and cooperative cancellation.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `config`: Configuration management
//! - `error`: Error types and handling
//! - `export`: Export manager, format writers and file sinks
//! - `model`: Report data and progress types
//! - `report`: Export options, filter presets and report templates
//! - `utils`: Utility functions and helpers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use eulaw_report::export::{ExportOutcome, MemorySink};
//! use eulaw_report::{ExportData, ExportManager};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let data: ExportData = serde_json::from_str(&std::fs::read_to_string("report.json")?)?;
//!     let manager = ExportManager::new(Arc::new(MemorySink::new()));
//!
//!     if let ExportOutcome::Completed(result) = manager.export_to_html(&data).await? {
//!         println!("Exported {} cases to {}", result.cases_exported, result.location);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod report;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{ReportError, Result};
pub use export::{ExportFormat, ExportManager, ExportOutcome, ExportResult};
pub use model::{ExportData, ExportProgress, ExportStage, OperativePart, ReportCase};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
pub fn version() -> &'static str {
    VERSION
}
