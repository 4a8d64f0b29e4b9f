//! Error types for docx-bundler

use std::path::PathBuf;
use thiserror::Error;

/// Main error type
#[derive(Debug, Error)]
pub enum Error {
    /// The scan root or a selected file could not be read
    #[error("cannot read '{}': {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output file could not be created, written or moved into place
    #[error("cannot write '{}': {source}", path.display())]
    Destination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Text that cannot be carried by an XML document
    #[error("entry '{identifier}' is not representable as text: {detail}")]
    Encoding { identifier: String, detail: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML encoding error: {0}")]
    XmlEncoding(#[from] quick_xml::encoding::EncodingError),

    #[error("XML attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Missing required part: {0}")]
    MissingPart(String),

    #[error("Invalid part URI: {0}")]
    InvalidPartUri(String),

    #[error("Missing attribute '{attr}' on element '{element}'")]
    MissingAttribute { element: String, attr: String },

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Coarse classification of an [`Error`], stable enough for callers to branch on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unreadable root directory or source file
    Input,
    /// Output file could not be produced
    Destination,
    /// Content that cannot be represented as XML text
    Encoding,
    /// Bad configuration or filter pattern
    Config,
    /// A package that does not look like a document on read-back
    Package,
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Input { .. } => ErrorKind::Input,
            Error::Destination { .. } => ErrorKind::Destination,
            Error::Encoding { .. } => ErrorKind::Encoding,
            Error::Pattern { .. } | Error::Config(_) | Error::Toml(_) => ErrorKind::Config,
            Error::Io(_) => ErrorKind::Destination,
            Error::Zip(zip::result::ZipError::Io(_)) => ErrorKind::Destination,
            Error::Zip(_)
            | Error::Xml(_)
            | Error::XmlEncoding(_)
            | Error::XmlAttr(_)
            | Error::Utf8(_)
            | Error::MissingPart(_)
            | Error::InvalidPartUri(_)
            | Error::MissingAttribute { .. }
            | Error::InvalidDocument(_) => ErrorKind::Package,
        }
    }

    /// Attach a destination path to a low-level write failure
    pub(crate) fn at_destination(self, path: &std::path::Path) -> Self {
        match self {
            Error::Io(source) | Error::Zip(zip::result::ZipError::Io(source)) => {
                Error::Destination {
                    path: path.to_path_buf(),
                    source,
                }
            }
            other => other,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::Path;

    #[test]
    fn test_io_becomes_destination() {
        let err = Error::Io(io::Error::new(io::ErrorKind::Other, "disk full"));
        let err = err.at_destination(Path::new("out.docx"));
        assert!(matches!(err, Error::Destination { .. }));
        assert_eq!(err.kind(), ErrorKind::Destination);
        assert!(err.to_string().contains("out.docx"));
    }

    #[test]
    fn test_zip_io_becomes_destination() {
        let err = Error::Zip(zip::result::ZipError::Io(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "denied",
        )));
        let err = err.at_destination(Path::new("x.docx"));
        assert_eq!(err.kind(), ErrorKind::Destination);
    }

    #[test]
    fn test_other_errors_untouched() {
        let err = Error::Encoding {
            identifier: "a.cs".into(),
            detail: "NUL".into(),
        }
        .at_destination(Path::new("x.docx"));
        assert_eq!(err.kind(), ErrorKind::Encoding);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(Error::Config("x".into()).kind(), ErrorKind::Config);
        assert_eq!(Error::MissingPart("x".into()).kind(), ErrorKind::Package);
        let input = Error::Input {
            path: "root".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(input.kind(), ErrorKind::Input);
    }
}
