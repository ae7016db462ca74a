//! Export manager owning one export attempt
//!
//! The manager picks the writer for the requested format, runs it through
//! the [`ExportCoordinator`], hands the bytes to a [`FileSink`] and reports
//! the terminal stage. A manager is meant for a single export: create one,
//! call one `export_to_*` method, discard it. Independent managers share
//! no state and can run in parallel.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::error::Result;
use crate::model::{ExportData, ExportProgress, ExportStage};

use super::ExportFormat;
use super::coordinator::{ExportCoordinator, PhaseOutcome};
use super::progress::{ProgressCallback, ProgressReporter};
use super::sink::{FileSink, SavedFile};
use super::writers::{self, ReportWriter};

/// Statistics of a completed export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResult {
    /// Format that was produced
    pub format: ExportFormat,
    /// `eu-law-report-<unix-millis>.<ext>`
    pub filename: String,
    /// Location reported by the sink
    pub location: String,
    /// Size of the encoded file
    pub file_size_bytes: u64,
    /// Number of cases in the report
    pub cases_exported: usize,
    /// Time taken for export
    pub elapsed_ms: u64,
}

/// How an export call ended when it did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// File saved and `complete` reported
    Completed(ExportResult),
    /// Cancelled at a checkpoint; no file saved, no terminal stage reported
    Cancelled,
}

impl ExportOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExportOutcome::Cancelled)
    }

    pub fn result(&self) -> Option<&ExportResult> {
        match self {
            ExportOutcome::Completed(result) => Some(result),
            ExportOutcome::Cancelled => None,
        }
    }
}

const RUNNING: u8 = 0;
const CANCELLED: u8 = 1;
const SETTLED: u8 = 2;

/// Lifecycle of one export, shared with its cancel handles
///
/// Leaves `RUNNING` exactly once: either a cancel request wins, or the
/// export commits to saving its file (or fails).
#[derive(Debug, Clone, Default)]
struct ExportState(Arc<AtomicU8>);

impl ExportState {
    fn transition(&self, to: u8) -> bool {
        self.0
            .compare_exchange(RUNNING, to, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

/// Orchestrates a single export operation
pub struct ExportManager {
    /// Progress forwarding to the caller's observer
    reporter: ProgressReporter,
    /// Cooperative cancellation flag
    cancel_token: CancellationToken,
    /// Destination of finished files
    sink: Arc<dyn FileSink>,
    /// Running, cancelled or settled
    state: ExportState,
}

impl ExportManager {
    /// Create a manager without a progress observer
    ///
    /// # Arguments
    /// * `sink` - Where finished files are saved
    pub fn new(sink: Arc<dyn FileSink>) -> Self {
        let cancel_token = CancellationToken::new();
        Self {
            reporter: ProgressReporter::new(None, cancel_token.clone()),
            cancel_token,
            sink,
            state: ExportState::default(),
        }
    }

    /// Attach a progress observer
    pub fn with_observer<F>(self, observer: F) -> Self
    where
        F: Fn(ExportProgress) + Send + Sync + 'static,
    {
        self.with_callback(Arc::new(observer))
    }

    /// Attach an already shared progress observer
    pub fn with_callback(mut self, callback: ProgressCallback) -> Self {
        self.reporter = ProgressReporter::new(Some(callback), self.cancel_token.clone());
        self
    }

    /// Handle that cancels this export from another task
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            cancel_token: self.cancel_token.clone(),
            state: self.state.clone(),
        }
    }

    /// Request cancellation
    ///
    /// Idempotent. Has no effect once the export completed or failed.
    pub fn cancel(&self) {
        self.cancel_handle().cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    pub async fn export_to_csv(&self, data: &ExportData) -> Result<ExportOutcome> {
        self.export(ExportFormat::Csv, data).await
    }

    pub async fn export_to_html(&self, data: &ExportData) -> Result<ExportOutcome> {
        self.export(ExportFormat::Html, data).await
    }

    pub async fn export_to_word(&self, data: &ExportData) -> Result<ExportOutcome> {
        self.export(ExportFormat::Word, data).await
    }

    pub async fn export_to_pdf(&self, data: &ExportData) -> Result<ExportOutcome> {
        self.export(ExportFormat::Pdf, data).await
    }

    /// Export with the default writer for a format
    pub async fn export(&self, format: ExportFormat, data: &ExportData) -> Result<ExportOutcome> {
        self.export_with(writers::writer_for(format), data).await
    }

    /// Export with a caller supplied writer
    ///
    /// Encoder and sink failures are logged, reported as a terminal
    /// `error` stage at 100%, then returned to the caller.
    pub async fn export_with(
        &self,
        writer: Box<dyn ReportWriter>,
        data: &ExportData,
    ) -> Result<ExportOutcome> {
        let format = writer.format();
        info!("Starting {} export of {} cases", format, data.cases.len());

        match self.run(writer, data).await {
            Ok(ExportOutcome::Cancelled) => {
                info!("{} export cancelled, no file produced", format);
                Ok(ExportOutcome::Cancelled)
            }
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!("{} export error: {}", format, e);
                // Settled before the error stage is reported
                self.state.transition(SETTLED);
                self.reporter.update(100.0, "Export failed", ExportStage::Error);
                Err(e)
            }
        }
    }

    async fn run(&self, writer: Box<dyn ReportWriter>, data: &ExportData) -> Result<ExportOutcome> {
        let start_time = Instant::now();
        let format = writer.format();

        let mut coordinator =
            ExportCoordinator::new(writer, &self.reporter, self.cancel_token.clone());
        let bytes = match coordinator.execute(data).await? {
            PhaseOutcome::Finished(bytes) => bytes,
            PhaseOutcome::Cancelled => return Ok(ExportOutcome::Cancelled),
        };

        self.reporter
            .update(90.0, "Saving file...", ExportStage::Generating);

        // Commit point: after this, cancel() no longer has any effect
        if self.cancel_token.is_cancelled() || !self.state.transition(SETTLED) {
            debug!("Cancelled before saving, file discarded");
            return Ok(ExportOutcome::Cancelled);
        }

        let filename = format.filename(chrono::Utc::now().timestamp_millis());
        let file_size_bytes = bytes.len() as u64;
        let location = self
            .sink
            .save(SavedFile {
                filename: filename.clone(),
                mime_type: format.mime_type().to_string(),
                bytes,
            })
            .await?;

        self.reporter
            .update(100.0, "Export complete!", ExportStage::Complete);

        let elapsed_ms = start_time.elapsed().as_millis() as u64;
        info!(
            "Export completed: {} cases, {} bytes, {} ms -> {}",
            data.cases.len(),
            file_size_bytes,
            elapsed_ms,
            location
        );

        Ok(ExportOutcome::Completed(ExportResult {
            format,
            filename,
            location,
            file_size_bytes,
            cases_exported: data.cases.len(),
            elapsed_ms,
        }))
    }
}

/// Cloneable handle cancelling a running export
#[derive(Clone)]
pub struct CancelHandle {
    cancel_token: CancellationToken,
    state: ExportState,
}

impl CancelHandle {
    /// Request cancellation unless the export already committed its file
    /// or failed
    pub fn cancel(&self) {
        if self.state.transition(CANCELLED) {
            self.cancel_token.cancel();
        }
    }
}
