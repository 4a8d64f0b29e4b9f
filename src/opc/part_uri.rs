//! Part URI handling for OPC packages

use crate::error::{Error, Result};
use std::fmt;

/// Represents a URI to a part within an OPC package.
///
/// Part URIs are always absolute paths starting with '/'.
/// Example: `/word/document.xml`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PartUri {
    path: String,
}

impl PartUri {
    /// Create a new PartUri from a string.
    ///
    /// The path will be normalized (leading '/' ensured, no trailing '/').
    pub fn new(path: &str) -> Result<Self> {
        let path = path.trim();

        if path.is_empty() {
            return Err(Error::InvalidPartUri("empty path".into()));
        }

        let normalized = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };

        let normalized = normalized.trim_end_matches('/').to_string();

        if normalized.is_empty() || normalized.contains("//") {
            return Err(Error::InvalidPartUri(format!(
                "invalid path '{}': empty segment",
                path
            )));
        }

        Ok(Self { path: normalized })
    }

    /// Create PartUri without validation (for internal use)
    pub(crate) fn from_string_unchecked(path: String) -> Self {
        Self { path }
    }

    /// Get the path as a string slice
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Name of the entry inside the ZIP archive (no leading '/')
    pub fn zip_name(&self) -> &str {
        &self.path[1..]
    }

    /// Get the file name portion
    pub fn file_name(&self) -> Option<&str> {
        self.path.rsplit('/').next()
    }

    /// Get the file extension
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name()?;
        let dot = name.rfind('.')?;
        Some(&name[dot + 1..]).filter(|ext| !ext.is_empty())
    }
}

impl fmt::Display for PartUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

/// Well-known part URIs
pub mod well_known {
    use super::PartUri;

    pub fn content_types() -> PartUri {
        PartUri::from_string_unchecked("/[Content_Types].xml".into())
    }

    pub fn package_rels() -> PartUri {
        PartUri::from_string_unchecked("/_rels/.rels".into())
    }

    pub fn document() -> PartUri {
        PartUri::from_string_unchecked("/word/document.xml".into())
    }
}
