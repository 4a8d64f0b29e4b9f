//! Bundle configuration loaded from TOML
//!
//! Every field is optional; a missing file section falls back to
//! [`BundleConfig::default`]. Relative paths are taken as given, i.e.
//! relative to the working directory.

use crate::error::{Error, Result};
use crate::select::{HeaderStyle, SelectionOptions};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default output file name
pub const DEFAULT_FILE_NAME: &str = "ScriptsBundle.docx";

/// Extension every generated document carries
pub const DOCX_EXTENSION: &str = ".docx";

/// Everything needed for one generation run
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BundleConfig {
    /// Folder that is scanned
    pub root: PathBuf,
    /// Folder the document is written to
    pub output_dir: PathBuf,
    /// Output file name; `.docx` is appended when missing
    pub file_name: String,
    /// What each entry's header paragraph shows
    pub header: HeaderStyle,
    pub selection: SelectionOptions,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            file_name: DEFAULT_FILE_NAME.to_string(),
            header: HeaderStyle::default(),
            selection: SelectionOptions::default(),
        }
    }
}

impl BundleConfig {
    /// Load and validate a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| Error::Input {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_toml_str(&contents)?;
        info!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values the type system does not
    pub fn validate(&self) -> Result<()> {
        let name = self.file_name.trim();
        if name.is_empty() {
            return Err(Error::Config("file_name must not be empty".into()));
        }
        if name.contains(['/', '\\']) {
            return Err(Error::Config(format!(
                "file_name '{}' must not contain a path separator; use output_dir",
                self.file_name
            )));
        }
        if !self.selection.include_all_subfolders && self.selection.subfolders.is_empty() {
            return Err(Error::Config(
                "include_all_subfolders is false but no subfolders are listed".into(),
            ));
        }
        Ok(())
    }

    /// Full path of the document to write
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(docx_file_name(self.file_name.trim()))
    }
}

/// `name` with `.docx` appended unless it already ends in it (ignoring case)
pub fn docx_file_name(name: &str) -> String {
    let has_extension = name.len() >= DOCX_EXTENSION.len()
        && name.is_char_boundary(name.len() - DOCX_EXTENSION.len())
        && name[name.len() - DOCX_EXTENSION.len()..].eq_ignore_ascii_case(DOCX_EXTENSION);

    if has_extension {
        name.to_string()
    } else {
        format!("{name}{DOCX_EXTENSION}")
    }
}
