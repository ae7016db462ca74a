use std::{fmt, io};

/// Crate-wide `Result` type using [`ReportError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Top-level error type for report operations.
///
/// This type wraps more specific error kinds and provides a single
/// error type that can be used throughout the crate.
#[derive(Debug)]
pub enum ReportError {
    /// Export pipeline errors.
    Export(ExportError),

    /// Configuration errors.
    Config(ConfigError),

    /// Filter preset errors.
    Preset(PresetError),

    /// Unknown report template.
    Template(String),

    /// I/O errors.
    Io(io::Error),

    /// JSON (de)serialization errors.
    Json(serde_json::Error),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Errors raised while turning export data into an output file.
#[derive(Debug)]
pub enum ExportError {
    /// Building the intermediate representation failed.
    Encoding { format: String, message: String },

    /// The PDF renderer failed.
    Pdf(String),

    /// Packing the Word document container failed.
    Archive(String),

    /// Persisting the finished file failed.
    Sink(String),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },
}

/// Filter preset errors.
#[derive(Debug)]
pub enum PresetError {
    /// No preset with the given id.
    NotFound(String),

    /// Preset name is empty after trimming.
    InvalidName,

    /// Reading or writing the preset file failed.
    Storage(String),
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::Export(e) => write!(f, "Export error: {e}"),
            ReportError::Config(e) => write!(f, "Configuration error: {e}"),
            ReportError::Preset(e) => write!(f, "Preset error: {e}"),
            ReportError::Template(id) => write!(f, "Unknown report template: {id}"),
            ReportError::Io(e) => write!(f, "I/O error: {e}"),
            ReportError::Json(e) => write!(f, "JSON error: {e}"),
            ReportError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Encoding { format, message } => {
                write!(f, "Failed to encode {format} report: {message}")
            }
            ExportError::Pdf(msg) => write!(f, "PDF rendering failed: {msg}"),
            ExportError::Archive(msg) => write!(f, "Document packing failed: {msg}"),
            ExportError::Sink(msg) => write!(f, "Failed to save file: {msg}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
        }
    }
}

impl fmt::Display for PresetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresetError::NotFound(id) => write!(f, "Preset not found: {id}"),
            PresetError::InvalidName => write!(f, "Preset name must not be empty"),
            PresetError::Storage(msg) => write!(f, "Preset storage failed: {msg}"),
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReportError::Io(e) => Some(e),
            ReportError::Json(e) => Some(e),
            _ => None,
        }
    }
}
impl std::error::Error for ExportError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for PresetError {}

/* ========================= Conversions to ReportError ========================= */

impl From<io::Error> for ReportError {
    fn from(err: io::Error) -> Self {
        ReportError::Io(err)
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        ReportError::Json(err)
    }
}

impl From<ExportError> for ReportError {
    fn from(err: ExportError) -> Self {
        ReportError::Export(err)
    }
}

impl From<ConfigError> for ReportError {
    fn from(err: ConfigError) -> Self {
        ReportError::Config(err)
    }
}

impl From<PresetError> for ReportError {
    fn from(err: PresetError) -> Self {
        ReportError::Preset(err)
    }
}

impl From<lopdf::Error> for ReportError {
    fn from(err: lopdf::Error) -> Self {
        ReportError::Export(ExportError::Pdf(err.to_string()))
    }
}

impl From<zip::result::ZipError> for ReportError {
    fn from(err: zip::result::ZipError) -> Self {
        ReportError::Export(ExportError::Archive(err.to_string()))
    }
}

impl From<String> for ReportError {
    fn from(msg: String) -> Self {
        ReportError::Generic(msg)
    }
}

impl From<&str> for ReportError {
    fn from(msg: &str) -> Self {
        ReportError::Generic(msg.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_error_display() {
        let err: ReportError = ExportError::Encoding {
            format: "CSV".to_string(),
            message: "bad row".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Export error: Failed to encode CSV report: bad row");
    }

    #[test]
    fn test_preset_error_display() {
        let err: ReportError = PresetError::NotFound("42".to_string()).into();
        assert_eq!(err.to_string(), "Preset error: Preset not found: 42");
    }

    #[test]
    fn test_io_error_has_source() {
        use std::error::Error;
        let err: ReportError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(err.source().is_some());
    }
}
