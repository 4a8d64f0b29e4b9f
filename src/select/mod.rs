//! Selecting which files under a root folder go into the document
//!
//! [`resolve`] is a pure function of the folder contents and the options:
//! calling it again after the options change gives the new selection.

mod filter;

use crate::document::SourceEntry;
use crate::error::{Error, Result};
use filter::Filter;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

pub use filter::normalize as normalize_path;

/// Which files under the root are collected
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectionOptions {
    /// File extensions to collect, without the dot; empty means every file
    pub extensions: Vec<String>,
    /// When false, only files below one of `subfolders` are collected
    pub include_all_subfolders: bool,
    /// Top-level folder names allowed when `include_all_subfolders` is false
    pub subfolders: Vec<String>,
    /// Folder names skipped at any depth, e.g. `Editor`
    pub exclude_dir_names: Vec<String>,
    /// Glob patterns on the relative path
    pub exclude: Vec<String>,
    /// Explicit per-file selection of relative paths, matched case-insensitively
    pub files: Option<Vec<String>>,
}

impl Default for SelectionOptions {
    fn default() -> Self {
        Self {
            extensions: vec!["cs".to_string()],
            include_all_subfolders: true,
            subfolders: Vec::new(),
            exclude_dir_names: Vec::new(),
            exclude: Vec::new(),
            files: None,
        }
    }
}

/// What the header paragraph of each entry shows
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeaderStyle {
    /// Just the file name, e.g. `Player.cs`
    #[default]
    FileName,
    /// The path relative to the root, e.g. `Scripts/Player.cs`
    RelativePath,
}

impl HeaderStyle {
    /// Header text for the relative path `rel`
    pub fn identifier_for<'a>(&self, rel: &'a str) -> &'a str {
        match self {
            HeaderStyle::FileName => rel.rsplit('/').next().unwrap_or(rel),
            HeaderStyle::RelativePath => rel,
        }
    }
}

impl FromStr for HeaderStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "file-name" => Ok(HeaderStyle::FileName),
            "relative-path" => Ok(HeaderStyle::RelativePath),
            other => Err(format!(
                "unknown header style '{other}' (expected 'file-name' or 'relative-path')"
            )),
        }
    }
}

impl fmt::Display for HeaderStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderStyle::FileName => write!(f, "file-name"),
            HeaderStyle::RelativePath => write!(f, "relative-path"),
        }
    }
}

/// Top-level folder names under `root`, sorted case-insensitively
pub fn subfolders(root: &Path) -> Result<Vec<String>> {
    ensure_root(root)?;

    let mut names = Vec::new();
    for entry in fs::read_dir(root).map_err(input(root))? {
        let entry = entry.map_err(input(root))?;
        if !entry.file_type().map_err(input(&entry.path()))?.is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(name) => warn!("skipping non UTF-8 folder name {:?}", name),
        }
    }

    sort_paths(&mut names);
    Ok(names)
}

/// Resolve the ordered list of `/`-separated paths, relative to `root`, selected by `options`.
///
/// Paths are sorted case-insensitively (ties broken by exact comparison) and
/// deduplicated. Symlinked folders are not followed.
pub fn resolve(root: &Path, options: &SelectionOptions) -> Result<Vec<String>> {
    ensure_root(root)?;
    let filter = Filter::new(options)?;

    let mut files = Vec::new();
    walk(root, "", &filter, &mut files)?;

    sort_paths(&mut files);
    files.dedup();

    info!("selected {} file(s) under {}", files.len(), root.display());
    Ok(files)
}

/// Read the selected files into document entries, in the given order.
///
/// A leading byte-order mark is dropped. Content that is not UTF-8 fails
/// with [`Error::Encoding`].
pub fn load_entries(root: &Path, paths: &[String], header: HeaderStyle) -> Result<Vec<SourceEntry>> {
    paths
        .iter()
        .map(|rel| -> Result<SourceEntry> {
            let path = root.join(rel);
            let bytes = fs::read(&path).map_err(input(&path))?;
            let content = String::from_utf8(bytes).map_err(|e| Error::Encoding {
                identifier: rel.clone(),
                detail: e.utf8_error().to_string(),
            })?;
            let content = match content.strip_prefix('\u{FEFF}') {
                Some(stripped) => stripped.to_string(),
                None => content,
            };
            debug!("loaded {} ({} bytes)", rel, content.len());
            Ok(SourceEntry::new(header.identifier_for(rel), content))
        })
        .collect()
}

fn walk(dir: &Path, prefix: &str, filter: &Filter, files: &mut Vec<String>) -> Result<()> {
    for entry in fs::read_dir(dir).map_err(input(dir))? {
        let entry = entry.map_err(input(dir))?;
        let path = entry.path();

        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(name) => {
                warn!("skipping non UTF-8 path {:?}", name);
                continue;
            }
        };
        let rel = if prefix.is_empty() {
            name
        } else {
            format!("{prefix}/{name}")
        };

        let file_type = entry.file_type().map_err(input(&path))?;
        if file_type.is_dir() {
            if filter.enters_dir(&rel) {
                walk(&path, &rel, filter, files)?;
            } else {
                debug!("skipping folder {}", rel);
            }
        } else if (file_type.is_file() || (file_type.is_symlink() && path.is_file()))
            && filter.matches(&rel)
        {
            files.push(rel);
        }
    }

    Ok(())
}

fn ensure_root(root: &Path) -> Result<()> {
    let metadata = fs::metadata(root).map_err(input(root))?;
    if !metadata.is_dir() {
        return Err(Error::Input {
            path: root.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
        });
    }
    Ok(())
}

fn sort_paths(paths: &mut [String]) {
    paths.sort_by_cached_key(|p| (p.to_lowercase(), p.clone()));
}

fn input(path: &Path) -> impl Fn(io::Error) -> Error + '_ {
    move |source| Error::Input {
        path: path.to_path_buf(),
        source,
    }
}
