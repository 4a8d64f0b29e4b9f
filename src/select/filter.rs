//! Inclusion rules compiled from [`SelectionOptions`]

use crate::error::{Error, Result};
use crate::select::SelectionOptions;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::HashSet;

/// Compiled form of [`SelectionOptions`], matched against `/`-separated relative paths
#[derive(Debug)]
pub(crate) struct Filter {
    extensions: Vec<String>,
    allowed_subfolders: Option<HashSet<String>>,
    excluded_dirs: HashSet<String>,
    exclude: GlobSet,
    chosen: Option<HashSet<String>>,
}

impl Filter {
    pub(crate) fn new(options: &SelectionOptions) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &options.exclude {
            let glob = Glob::new(pattern).map_err(|source| Error::Pattern {
                pattern: pattern.clone(),
                source,
            })?;
            builder.add(glob);
        }
        let exclude = builder.build().map_err(|source| Error::Pattern {
            pattern: options.exclude.join(", "),
            source,
        })?;

        Ok(Self {
            extensions: options
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            allowed_subfolders: (!options.include_all_subfolders)
                .then(|| options.subfolders.iter().cloned().collect()),
            excluded_dirs: options.exclude_dir_names.iter().cloned().collect(),
            exclude,
            chosen: options
                .files
                .as_ref()
                .map(|files| files.iter().map(|f| normalize(f).to_lowercase()).collect()),
        })
    }

    /// Whether the walk should descend into the directory `rel_dir`
    pub(crate) fn enters_dir(&self, rel_dir: &str) -> bool {
        let mut components = rel_dir.split('/');
        if let (Some(allowed), Some(first)) = (&self.allowed_subfolders, components.next()) {
            if !allowed.contains(first) {
                return false;
            }
        }
        !rel_dir.split('/').any(|c| self.excluded_dirs.contains(c))
    }

    /// Whether the file at `rel` is selected
    pub(crate) fn matches(&self, rel: &str) -> bool {
        let (dirs, file_name) = match rel.rsplit_once('/') {
            Some((dirs, name)) => (Some(dirs), name),
            None => (None, rel),
        };

        if !self.extensions.is_empty() {
            let ext = file_name
                .rsplit_once('.')
                .map(|(_, ext)| ext.to_lowercase());
            match ext {
                Some(ext) if self.extensions.contains(&ext) => {}
                _ => return false,
            }
        }

        if let Some(allowed) = &self.allowed_subfolders {
            // a file directly under the root has no subfolder to be allowed by
            let first = rel.split('/').next().unwrap_or(rel);
            if dirs.is_none() || !allowed.contains(first) {
                return false;
            }
        }

        if let Some(dirs) = dirs {
            if dirs.split('/').any(|c| self.excluded_dirs.contains(c)) {
                return false;
            }
        }

        if self.exclude.is_match(rel) {
            return false;
        }

        match &self.chosen {
            Some(chosen) => chosen.contains(&rel.to_lowercase()),
            None => true,
        }
    }
}

/// Use `/` as the only separator and drop leading `./` or `/`
pub fn normalize(path: &str) -> String {
    let path = path.replace('\\', "/");
    let mut rest = path.as_str();
    loop {
        if let Some(stripped) = rest.strip_prefix("./") {
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix('/') {
            rest = stripped;
        } else {
            break;
        }
    }
    rest.to_string()
}
