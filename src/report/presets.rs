//! Saved filter presets
//!
//! Presets are kept as a JSON array in a single file. The store is loaded
//! whole, edited in memory and written back on every change.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{PresetError, Result};
use crate::model::ExportFilters;
use crate::utils::fs::ensure_dir_exists;

/// Filter values captured by a preset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub court: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legislation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article: Option<String>,
}

impl PresetFilters {
    fn values(&self) -> [&Option<String>; 5] {
        [
            &self.date_from,
            &self.date_to,
            &self.court,
            &self.legislation,
            &self.article,
        ]
    }

    /// True when any filter has a non-blank value
    pub fn has_active_filters(&self) -> bool {
        self.values()
            .iter()
            .any(|v| v.as_deref().is_some_and(|v| !v.trim().is_empty()))
    }

    /// Filters shown in the report header (date range and court)
    pub fn to_export_filters(&self) -> ExportFilters {
        let keep = |v: &Option<String>| v.clone().filter(|v| !v.trim().is_empty());
        ExportFilters {
            date_from: keep(&self.date_from),
            date_to: keep(&self.date_to),
            court: keep(&self.court),
        }
    }

    /// `label: value` pairs of the non-blank filters, for display
    pub fn summary(&self) -> Vec<(&'static str, &str)> {
        const LABELS: [&str; 5] = ["From", "To", "Court", "Legislation", "Article"];
        LABELS
            .into_iter()
            .zip(self.values())
            .filter_map(|(label, v)| {
                v.as_deref()
                    .filter(|v| !v.trim().is_empty())
                    .map(|v| (label, v))
            })
            .collect()
    }
}

/// A named set of filters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterPreset {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub filters: PresetFilters,
    /// RFC 3339 creation time
    pub created_at: String,
}

/// Preset collection backed by a JSON file
#[derive(Debug)]
pub struct PresetStore {
    path: PathBuf,
    presets: Vec<FilterPreset>,
}

impl PresetStore {
    /// Load presets from `path`; a missing file gives an empty store
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let presets = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| PresetError::Storage(format!("{}: {}", path.display(), e)))?;
            if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&content)
                    .map_err(|e| PresetError::Storage(format!("{}: {}", path.display(), e)))?
            }
        } else {
            Vec::new()
        };
        debug!("Loaded {} preset(s) from {}", presets.len(), path.display());
        Ok(Self { path, presets })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All presets in insertion order
    pub fn list(&self) -> &[FilterPreset] {
        &self.presets
    }

    pub fn get(&self, id: &str) -> Option<&FilterPreset> {
        self.presets.iter().find(|p| p.id == id)
    }

    /// Add a preset and persist the store
    ///
    /// # Arguments
    /// * `name` - Preset name, trimmed; must not be blank
    /// * `description` - Optional description, blank becomes none
    /// * `filters` - Filter values to store
    pub fn save_preset(
        &mut self,
        name: &str,
        description: Option<&str>,
        filters: PresetFilters,
    ) -> Result<FilterPreset> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PresetError::InvalidName.into());
        }

        let preset = FilterPreset {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(String::from),
            filters,
            created_at: Utc::now().to_rfc3339(),
        };
        self.presets.push(preset.clone());
        self.persist()?;
        info!("Saved preset '{}' ({})", preset.name, preset.id);
        Ok(preset)
    }

    /// Remove a preset by id and persist the store
    pub fn delete(&mut self, id: &str) -> Result<FilterPreset> {
        let index = self
            .presets
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| PresetError::NotFound(id.to_string()))?;
        let removed = self.presets.remove(index);
        self.persist()?;
        info!("Deleted preset '{}' ({})", removed.name, removed.id);
        Ok(removed)
    }

    /// Write the store back to its file
    pub fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir_exists(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.presets)?;
        std::fs::write(&self.path, json)
            .map_err(|e| PresetError::Storage(format!("{}: {}", self.path.display(), e)))?;
        Ok(())
    }
}
