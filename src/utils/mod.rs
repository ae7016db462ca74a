//! Utility functions and helpers
//!
//! This module provides common utility functions used throughout the crate:
//! - Markup escaping for HTML and WordprocessingML
//! - Byte size formatting for CLI output
//! - File system helpers

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Markup utilities
pub mod markup {
    /// Escape text for use as HTML/XML text content or attribute value
    ///
    /// # Arguments
    /// * `s` - Raw text
    ///
    /// # Returns
    /// * `String` - Text with `& < > " '` replaced by entities
    pub fn escape(s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        for c in s.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#39;"),
                _ => out.push(c),
            }
        }
        out
    }

    /// Drop characters that are not allowed in XML 1.0 documents
    pub fn strip_invalid_xml_chars(s: &str) -> String {
        s.chars()
            .filter(|&c| matches!(c, '\t' | '\n' | '\r') || c >= ' ')
            .collect()
    }
}

/// Conversion utilities
pub mod convert {
    /// Format bytes as human-readable string
    ///
    /// # Arguments
    /// * `bytes` - Number of bytes
    ///
    /// # Returns
    /// * `String` - Formatted string (e.g., "1.5 KB")
    pub fn format_bytes(bytes: u64) -> String {
        const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
        let mut size = bytes as f64;
        let mut unit = 0;
        while size >= 1024.0 && unit < UNITS.len() - 1 {
            size /= 1024.0;
            unit += 1;
        }
        if unit == 0 {
            format!("{} {}", bytes, UNITS[0])
        } else {
            format!("{:.1} {}", size, UNITS[unit])
        }
    }
}

/// File system utilities
pub mod fs {
    use super::*;

    /// Ensure directory exists, create if not
    ///
    /// # Arguments
    /// * `path` - Directory path
    ///
    /// # Returns
    /// * `Result<()>` - Success or error
    pub fn ensure_dir_exists<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            std::fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// Expand home directory in path
    ///
    /// # Arguments
    /// * `path` - Path potentially starting with ~
    ///
    /// # Returns
    /// * `PathBuf` - Expanded path
    pub fn expand_home(path: &Path) -> PathBuf {
        if let Ok(rest) = path.strip_prefix("~")
            && let Some(home) = dirs::home_dir()
        {
            return home.join(rest);
        }
        path.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_markup() {
        assert_eq!(
            markup::escape(r#"<b>"A" & 'B'</b>"#),
            "&lt;b&gt;&quot;A&quot; &amp; &#39;B&#39;&lt;/b&gt;"
        );
        assert_eq!(markup::escape("plain"), "plain");
    }

    #[test]
    fn test_strip_invalid_xml_chars() {
        assert_eq!(markup::strip_invalid_xml_chars("a\u{0}b\tc\u{1b}"), "ab\tc");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(convert::format_bytes(512), "512 B");
        assert_eq!(convert::format_bytes(1536), "1.5 KB");
        assert_eq!(convert::format_bytes(1024 * 1024), "1.0 MB");
    }

    #[test]
    fn test_ensure_dir_exists() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        fs::ensure_dir_exists(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn test_expand_home_leaves_plain_paths() {
        assert_eq!(fs::expand_home(Path::new("reports/out")), PathBuf::from("reports/out"));
    }
}
