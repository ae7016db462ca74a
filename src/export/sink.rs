//! File sinks for finished exports
//!
//! A sink is the last stop of the pipeline: it receives the encoded bytes
//! together with the filename and MIME type and persists them wherever the
//! host environment keeps downloads.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::debug;

use crate::error::{ExportError, Result};

/// A finished export ready to be saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Trait for persisting finished export files
#[async_trait]
pub trait FileSink: Send + Sync {
    /// Save a file
    ///
    /// # Arguments
    /// * `file` - Encoded file with name and MIME type
    ///
    /// # Returns
    /// * `Result<String>` - Location the file was saved to
    async fn save(&self, file: SavedFile) -> Result<String>;
}

/// Sink writing files into a directory on disk
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Create a sink for an existing directory
    ///
    /// # Arguments
    /// * `dir` - Target directory
    ///
    /// # Returns
    /// * `Result<Self>` - New sink or error if the directory does not exist
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        validate_dir(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl FileSink for DirectorySink {
    async fn save(&self, file: SavedFile) -> Result<String> {
        let path = self.dir.join(&file.filename);
        let handle = File::create(&path).await.map_err(|e| {
            ExportError::Sink(format!("Failed to create {}: {}", path.display(), e))
        })?;
        let mut writer = BufWriter::new(handle);
        writer
            .write_all(&file.bytes)
            .await
            .map_err(|e| ExportError::Sink(format!("Failed to write file: {}", e)))?;
        writer
            .flush()
            .await
            .map_err(|e| ExportError::Sink(format!("Failed to flush file: {}", e)))?;

        debug!(
            "Saved {} ({}, {} bytes)",
            path.display(),
            file.mime_type,
            file.bytes.len()
        );
        Ok(path.display().to_string())
    }
}

/// Sink keeping files in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    files: Mutex<Vec<SavedFile>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything saved so far
    pub fn files(&self) -> Vec<SavedFile> {
        self.files
            .lock()
            .map(|files| files.clone())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.files().is_empty()
    }
}

#[async_trait]
impl FileSink for MemorySink {
    async fn save(&self, file: SavedFile) -> Result<String> {
        let location = format!("memory://{}", file.filename);
        self.files
            .lock()
            .map_err(|_| ExportError::Sink("memory sink poisoned".to_string()))?
            .push(file);
        Ok(location)
    }
}

/// Check that a target directory exists and is a directory
fn validate_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        return Err(ExportError::Sink(format!("Directory does not exist: {}", dir.display())).into());
    }
    if !dir.is_dir() {
        return Err(ExportError::Sink(format!("Not a directory: {}", dir.display())).into());
    }
    Ok(())
}
