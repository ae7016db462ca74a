//! Export coordinator for driving a writer through its phases
//!
//! Every format shares the same phased transformation:
//! prepare → iterate cases with progress → finalize. The coordinator owns
//! that loop, the progress arithmetic and the cancellation checkpoints so
//! writers stay focused on content.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::Result;
use crate::model::{ExportData, ExportStage};

use super::progress::ProgressReporter;
use super::writers::ReportWriter;

/// Progress reported once preparation is done
pub const PROCESSING_START: f64 = 20.0;
/// Progress reported when case iteration ends
pub const GENERATING_START: f64 = 80.0;

/// Number of progress checkpoints spread across case iteration
const CHECKPOINTS: usize = 20;

/// Result of running the phases
#[derive(Debug)]
pub enum PhaseOutcome {
    /// Encoded bytes ready to be saved
    Finished(Vec<u8>),
    /// Cancellation observed at a checkpoint; nothing was produced
    Cancelled,
}

/// Coordinator for one export operation
pub struct ExportCoordinator<'a> {
    /// Format encoder
    writer: Box<dyn ReportWriter>,
    /// Progress sink for user feedback
    reporter: &'a ProgressReporter,
    /// Cancellation token for aborting export
    cancel_token: CancellationToken,
}

impl<'a> ExportCoordinator<'a> {
    /// Create a new export coordinator
    pub fn new(
        writer: Box<dyn ReportWriter>,
        reporter: &'a ProgressReporter,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            writer,
            reporter,
            cancel_token,
        }
    }

    /// Execute the phases
    ///
    /// 1. Report preparation and render the preamble
    /// 2. Render cases, reporting at evenly spaced checkpoints
    /// 3. Finalize the writer
    ///
    /// Cancellation is checked after preparation, at every checkpoint and
    /// before handing back the bytes. Writers never see a partial case.
    ///
    /// # Returns
    /// * `Result<PhaseOutcome>` - Encoded bytes, cancellation, or encoder error
    pub async fn execute(&mut self, data: &ExportData) -> Result<PhaseOutcome> {
        let format = self.writer.format();
        let total = data.cases.len();

        self.reporter.update(
            0.0,
            format!("Preparing {} export...", format.label()),
            ExportStage::Preparing,
        );
        tokio::task::yield_now().await;
        if self.is_cancelled() {
            return Ok(PhaseOutcome::Cancelled);
        }

        self.writer.begin(data)?;
        debug!("Rendered {} preamble", format);
        self.reporter
            .update(PROCESSING_START, "Processing case data...", ExportStage::Processing);

        let interval = checkpoint_interval(total);
        for (index, case) in data.cases.iter().enumerate() {
            if index % interval == 0 {
                tokio::task::yield_now().await;
                if self.is_cancelled() {
                    return Ok(PhaseOutcome::Cancelled);
                }
                self.reporter.update(
                    case_progress(index, total),
                    format!("Processing case {} of {}...", index + 1, total),
                    ExportStage::Processing,
                );
            }
            self.writer.write_case(case, data)?;
        }

        if self.is_cancelled() {
            return Ok(PhaseOutcome::Cancelled);
        }

        self.reporter.update(
            GENERATING_START,
            format!("Generating {} file...", format.label()),
            ExportStage::Generating,
        );
        let bytes = self.writer.finish(data)?;
        tokio::task::yield_now().await;

        if self.is_cancelled() {
            return Ok(PhaseOutcome::Cancelled);
        }

        info!("Encoded {} cases as {} ({} bytes)", total, format, bytes.len());
        Ok(PhaseOutcome::Finished(bytes))
    }

    fn is_cancelled(&self) -> bool {
        if self.cancel_token.is_cancelled() {
            info!("Export operation cancelled by user");
            true
        } else {
            false
        }
    }
}

/// Cases between two progress checkpoints, about 5% of the work
pub fn checkpoint_interval(total: usize) -> usize {
    total.div_ceil(CHECKPOINTS).max(1)
}

/// Linear progress across case iteration, 20% → 80%
pub fn case_progress(index: usize, total: usize) -> f64 {
    if total == 0 {
        return PROCESSING_START;
    }
    PROCESSING_START + (index as f64 / total as f64) * (GENERATING_START - PROCESSING_START)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExportError;
    use crate::export::ExportFormat;
    use crate::export::progress::progress_channel;
    use crate::model::{ReportCase, fixtures};

    // Mock writer recording which phases ran
    struct MockWriter {
        cases: Vec<String>,
        fail_on: Option<String>,
    }

    impl MockWriter {
        fn new() -> Self {
            Self {
                cases: Vec::new(),
                fail_on: None,
            }
        }
    }

    impl ReportWriter for MockWriter {
        fn format(&self) -> ExportFormat {
            ExportFormat::Csv
        }

        fn begin(&mut self, _data: &ExportData) -> Result<()> {
            Ok(())
        }

        fn write_case(&mut self, case: &ReportCase, _data: &ExportData) -> Result<()> {
            if self.fail_on.as_deref() == Some(case.case_id_text.as_str()) {
                return Err(ExportError::Encoding {
                    format: "CSV".to_string(),
                    message: "boom".to_string(),
                }
                .into());
            }
            self.cases.push(case.case_id_text.clone());
            Ok(())
        }

        fn finish(&mut self, _data: &ExportData) -> Result<Vec<u8>> {
            Ok(self.cases.join(",").into_bytes())
        }
    }

    fn cases(n: usize) -> Vec<ReportCase> {
        (0..n).map(|i| fixtures::case(&format!("C-{i}/21"), vec![])).collect()
    }

    #[tokio::test]
    async fn test_coordinator_basic() {
        let (callback, mut rx) = progress_channel();
        let reporter = ProgressReporter::new(Some(callback), CancellationToken::new());
        let data = fixtures::data(cases(3), true);

        let mut coordinator =
            ExportCoordinator::new(Box::new(MockWriter::new()), &reporter, CancellationToken::new());
        let outcome = coordinator.execute(&data).await.unwrap();

        match outcome {
            PhaseOutcome::Finished(bytes) => {
                assert_eq!(String::from_utf8(bytes).unwrap(), "C-0/21,C-1/21,C-2/21")
            }
            PhaseOutcome::Cancelled => panic!("unexpected cancellation"),
        }

        let mut last = -1.0;
        while let Ok(p) = rx.try_recv() {
            assert!(p.progress >= last);
            last = p.progress;
        }
        assert_eq!(last, GENERATING_START);
    }

    #[tokio::test]
    async fn test_coordinator_cancelled_before_start() {
        let token = CancellationToken::new();
        let reporter = ProgressReporter::new(None, token.clone());
        token.cancel();

        let data = fixtures::data(cases(5), false);
        let mut coordinator = ExportCoordinator::new(Box::new(MockWriter::new()), &reporter, token);
        assert!(matches!(
            coordinator.execute(&data).await.unwrap(),
            PhaseOutcome::Cancelled
        ));
    }

    #[tokio::test]
    async fn test_coordinator_propagates_writer_error() {
        let reporter = ProgressReporter::new(None, CancellationToken::new());
        let mut writer = MockWriter::new();
        writer.fail_on = Some("C-1/21".to_string());

        let data = fixtures::data(cases(3), false);
        let mut coordinator =
            ExportCoordinator::new(Box::new(writer), &reporter, CancellationToken::new());
        assert!(coordinator.execute(&data).await.is_err());
    }

    #[test]
    fn test_checkpoint_interval() {
        assert_eq!(checkpoint_interval(0), 1);
        assert_eq!(checkpoint_interval(7), 1);
        assert_eq!(checkpoint_interval(20), 1);
        assert_eq!(checkpoint_interval(21), 2);
        assert_eq!(checkpoint_interval(1000), 50);
    }

    #[test]
    fn test_case_progress_range() {
        assert_eq!(case_progress(0, 10), 20.0);
        assert_eq!(case_progress(5, 10), 50.0);
        assert!(case_progress(9, 10) < GENERATING_START);
        assert_eq!(case_progress(0, 0), PROCESSING_START);
    }
}
