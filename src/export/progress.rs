//! Progress reporting for export operations
//!
//! Progress flows one way: the coordinator and manager call
//! [`ProgressReporter::update`], which hands an immutable
//! [`ExportProgress`] snapshot to the caller's observer. Observers can be a
//! plain closure, a channel ([`progress_channel`]) or a terminal progress
//! bar ([`ProgressTracker`]).

use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::model::{ExportProgress, ExportStage};

/// Observer invoked synchronously for every progress snapshot
pub type ProgressCallback = Arc<dyn Fn(ExportProgress) + Send + Sync>;

/// Forwards progress snapshots to an optional observer
///
/// Once the attached cancellation token fires, updates are dropped so a
/// cancelled export never reports a terminal stage.
#[derive(Clone)]
pub struct ProgressReporter {
    observer: Option<ProgressCallback>,
    cancel_token: CancellationToken,
}

impl ProgressReporter {
    pub fn new(observer: Option<ProgressCallback>, cancel_token: CancellationToken) -> Self {
        Self {
            observer,
            cancel_token,
        }
    }

    /// Report progress
    ///
    /// # Arguments
    /// * `progress` - Percentage in `[0, 100]`
    /// * `message` - Human readable status
    /// * `stage` - Current stage
    pub fn update(&self, progress: f64, message: impl Into<String>, stage: ExportStage) {
        if self.cancel_token.is_cancelled() {
            return;
        }
        let snapshot = ExportProgress::new(progress, message, stage);
        trace!(
            "progress {:.1}% [{}] {}",
            snapshot.progress, snapshot.stage, snapshot.message
        );
        if let Some(ref observer) = self.observer {
            observer(snapshot);
        }
    }
}

/// Observer backed by an unbounded channel
///
/// # Returns
/// * `(ProgressCallback, UnboundedReceiver)` - Callback to pass to the manager and
///   the receiving end of the stream
pub fn progress_channel() -> (ProgressCallback, mpsc::UnboundedReceiver<ExportProgress>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let callback: ProgressCallback = Arc::new(move |progress| {
        // Receiver dropped means nobody is listening any more
        let _ = tx.send(progress);
    });
    (callback, rx)
}

/// Terminal progress bar for export operations
///
/// Displays percentage and the latest status message. Disabled trackers
/// accept updates silently, which keeps quiet mode and tests simple.
#[derive(Clone)]
pub struct ProgressTracker {
    bar: Option<ProgressBar>,
}

impl ProgressTracker {
    /// Create a new progress tracker
    ///
    /// # Arguments
    /// * `enable_bar` - Whether to display a progress bar
    ///
    /// # Returns
    /// * `Self` - New progress tracker instance
    pub fn new(enable_bar: bool) -> Self {
        let bar = if enable_bar {
            let bar = ProgressBar::new(100);
            let style = ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-");
            bar.set_style(style);
            Some(bar)
        } else {
            None
        };

        Self { bar }
    }

    /// Apply a progress snapshot to the bar
    pub fn update(&self, progress: &ExportProgress) {
        if let Some(ref bar) = self.bar {
            bar.set_position(progress.progress.round() as u64);
            bar.set_message(progress.message.clone());
        }
    }

    /// Observer that drives this tracker
    pub fn observer(&self) -> ProgressCallback {
        let tracker = self.clone();
        Arc::new(move |progress| tracker.update(&progress))
    }

    /// Finish and clear the progress bar
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_reporter_forwards_snapshots() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let reporter = ProgressReporter::new(
            Some(Arc::new(move |p| sink.lock().unwrap().push(p))),
            CancellationToken::new(),
        );

        reporter.update(20.0, "Processing case data...", ExportStage::Processing);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].progress, 20.0);
        assert_eq!(seen[0].stage, ExportStage::Processing);
    }

    #[test]
    fn test_reporter_silent_after_cancel() {
        let (callback, mut rx) = progress_channel();
        let token = CancellationToken::new();
        let reporter = ProgressReporter::new(Some(callback), token.clone());

        reporter.update(0.0, "start", ExportStage::Preparing);
        token.cancel();
        reporter.update(100.0, "done", ExportStage::Complete);

        assert_eq!(rx.try_recv().unwrap().stage, ExportStage::Preparing);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_reporter_without_observer() {
        let reporter = ProgressReporter::new(None, CancellationToken::new());
        reporter.update(50.0, "halfway", ExportStage::Processing);
    }

    #[test]
    fn test_progress_tracker_disabled() {
        let tracker = ProgressTracker::new(false);
        let observer = tracker.observer();
        observer(ExportProgress::new(40.0, "Adding case data...", ExportStage::Processing));
        tracker.finish();
        // Disabled tracker accepts updates (no panic means success)
    }
}
