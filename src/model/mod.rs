//! Data model shared by the export pipeline
//!
//! The report pages hand the pipeline a fully hydrated [`ExportData`]: cases
//! already fetched, operative parts already nested under each case in
//! presentation order. Nothing here re-sorts or re-filters that data.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Input for a single export call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    /// Report title
    pub title: String,

    /// Optional report subtitle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,

    /// Cases in presentation order
    #[serde(default)]
    pub cases: Vec<ReportCase>,

    /// Render simplified operative part text instead of verbatim text
    #[serde(default)]
    pub show_simplified: bool,

    /// Filters the report was generated with (display only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<ExportFilters>,
}

/// Export-ready projection of a case-law record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportCase {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub case_id_text: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub court: String,
    /// ISO date string
    #[serde(default)]
    pub date_of_judgment: String,
    #[serde(default)]
    pub parties: String,
    /// Ordered by ascending part number by the caller
    #[serde(default)]
    pub operative_parts: Vec<OperativePart>,
}

/// A numbered dispositive clause of a decision
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperativePart {
    #[serde(default)]
    pub id: String,
    pub part_number: u32,
    #[serde(default)]
    pub verbatim_text: String,
    #[serde(default)]
    pub simplified_text: String,
}

/// Filters shown in the report header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub court: Option<String>,
}

/// Stage of an export operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportStage {
    Preparing,
    Processing,
    Generating,
    Complete,
    Error,
}

/// Snapshot of export progress delivered to observers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportProgress {
    /// Percentage in `[0, 100]`
    pub progress: f64,
    pub message: String,
    pub stage: ExportStage,
}

impl ExportData {
    /// Label for the text variant used in this export
    pub fn text_variant_label(&self) -> &'static str {
        if self.show_simplified {
            "Simplified"
        } else {
            "Full verbatim"
        }
    }

    /// Filters that carry at least one value, if any
    pub fn active_filters(&self) -> Option<&ExportFilters> {
        self.filters.as_ref().filter(|f| f.is_active())
    }

    /// Subtitle if present and not blank
    pub fn subtitle_text(&self) -> Option<&str> {
        self.subtitle.as_deref().filter(|s| !s.trim().is_empty())
    }
}

impl ReportCase {
    /// Parties if present and not blank
    pub fn parties_text(&self) -> Option<&str> {
        Some(self.parties.as_str()).filter(|p| !p.trim().is_empty())
    }

    pub fn has_operative_parts(&self) -> bool {
        !self.operative_parts.is_empty()
    }
}

impl OperativePart {
    /// Text variant selected by the export-wide toggle
    pub fn text(&self, show_simplified: bool) -> &str {
        if show_simplified {
            &self.simplified_text
        } else {
            &self.verbatim_text
        }
    }
}

impl ExportFilters {
    /// True when any filter carries a non-blank value
    pub fn is_active(&self) -> bool {
        [&self.date_from, &self.date_to, &self.court]
            .iter()
            .any(|v| v.as_deref().is_some_and(|s| !s.trim().is_empty()))
    }
}

impl ExportStage {
    /// Whether this stage ends the progress stream
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExportStage::Complete | ExportStage::Error)
    }
}

impl fmt::Display for ExportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExportStage::Preparing => "preparing",
            ExportStage::Processing => "processing",
            ExportStage::Generating => "generating",
            ExportStage::Complete => "complete",
            ExportStage::Error => "error",
        };
        f.write_str(s)
    }
}

impl ExportProgress {
    pub fn new(progress: f64, message: impl Into<String>, stage: ExportStage) -> Self {
        Self {
            progress: progress.clamp(0.0, 100.0),
            message: message.into(),
            stage,
        }
    }
}
