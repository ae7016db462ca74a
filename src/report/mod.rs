//! Report preparation ahead of an export
//!
//! - [`options`]: export dialog settings (custom title, included sections)
//! - [`presets`]: saved filter presets persisted as JSON
//! - [`templates`]: static catalog of report templates
//!
//! The binary applies them in the order template, preset, options. Each
//! step returns a new [`ExportData`](crate::model::ExportData) and leaves
//! its input untouched.

pub mod options;
pub mod presets;
pub mod templates;

pub use options::ExportOptions;
pub use presets::{FilterPreset, PresetFilters, PresetStore};
pub use templates::{GroupBy, ReportField, ReportTemplate, TemplateCategory};
