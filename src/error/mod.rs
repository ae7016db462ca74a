//! Error handling module for report export.
//!
//! This module provides the error types used across the crate:
//! - Export pipeline failures (encoding, rendering, packing, saving)
//! - Configuration and filter preset errors
//! - Conversions from I/O, JSON, PDF and archive library errors
//!
//! Cancellation of an export is not an error and never surfaces here.

pub mod kinds;

// Re-export commonly used types
pub use kinds::{ConfigError, ExportError, PresetError, ReportError, Result};
