//! Format writers for report export
//!
//! Every format implements [`ReportWriter`], a three-phase encoder:
//! `begin` renders everything that precedes the first case, `write_case`
//! renders one case block, `finish` packs the accumulated representation
//! into the final byte payload. The coordinator owns the progress
//! arithmetic, so writers only deal with content.

use crate::error::Result;
use crate::model::{ExportData, ReportCase};

use super::ExportFormat;

pub mod csv;
pub mod docx;
pub mod html;
pub mod metrics;
pub mod pdf;

pub use csv::CsvWriter;
pub use docx::DocxWriter;
pub use html::HtmlWriter;
pub use pdf::PdfWriter;

/// Trait for encoding export data into one output format
pub trait ReportWriter: Send {
    /// Format produced by this writer
    fn format(&self) -> ExportFormat;

    /// Render the document preamble (title, metadata, headers)
    ///
    /// # Arguments
    /// * `data` - Export input
    fn begin(&mut self, data: &ExportData) -> Result<()>;

    /// Render a single case
    ///
    /// # Arguments
    /// * `case` - Case to render
    /// * `data` - Export input, for export-wide settings
    fn write_case(&mut self, case: &ReportCase, data: &ExportData) -> Result<()>;

    /// Finalize the output (footers, packing) and hand back the bytes
    ///
    /// # Returns
    /// * `Result<Vec<u8>>` - Encoded file content
    fn finish(&mut self, data: &ExportData) -> Result<Vec<u8>>;
}

/// Create the default writer for a format
pub fn writer_for(format: ExportFormat) -> Box<dyn ReportWriter> {
    match format {
        ExportFormat::Csv => Box::new(CsvWriter::new()),
        ExportFormat::Html => Box::new(HtmlWriter::new()),
        ExportFormat::Word => Box::new(DocxWriter::new()),
        ExportFormat::Pdf => Box::new(PdfWriter::new()),
    }
}
