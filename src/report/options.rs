//! Export dialog options

use crate::model::ExportData;

/// User-chosen adjustments applied to the data before export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Replaces the report title when non-empty
    pub custom_title: String,
    /// Replaces the report subtitle when non-empty
    pub custom_subtitle: String,
    pub include_operative_parts: bool,
    pub include_parties: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            custom_title: String::new(),
            custom_subtitle: String::new(),
            include_operative_parts: true,
            include_parties: true,
        }
    }
}

impl ExportOptions {
    /// Return a copy of `data` with these options applied
    pub fn apply(&self, data: &ExportData) -> ExportData {
        let mut out = data.clone();

        let title = self.custom_title.trim();
        if !title.is_empty() {
            out.title = title.to_string();
        }
        let subtitle = self.custom_subtitle.trim();
        if !subtitle.is_empty() {
            out.subtitle = Some(subtitle.to_string());
        }

        for case in &mut out.cases {
            if !self.include_operative_parts {
                case.operative_parts.clear();
            }
            if !self.include_parties {
                case.parties.clear();
            }
        }
        out
    }
}
