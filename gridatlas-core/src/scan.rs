//! Input enumeration: which files in a directory feed the atlas, and in what order.

use std::path::{Path, PathBuf};

use crate::error::{AtlasError, Result};

pub const DEFAULT_EXTENSIONS: &[&str] = &["png"];
pub const DEFAULT_EXCLUDE_SUFFIX: &str = "_atlas.png";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eligibility {
    pub extensions: Vec<String>,
    pub exclude_suffixes: Vec<String>,
    /// Whole file names to skip, compared exactly.
    pub exclude_names: Vec<String>,
}

impl Default for Eligibility {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            exclude_suffixes: vec![DEFAULT_EXCLUDE_SUFFIX.to_string()],
            exclude_names: Vec::new(),
        }
    }
}

fn ends_with_ignore_case(name: &str, suffix: &str) -> bool {
    let (name, suffix) = (name.as_bytes(), suffix.as_bytes());
    name.len() >= suffix.len() && name[name.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
}

impl Eligibility {
    /// Rejects one exact file name, e.g. the atlas being written into the input folder.
    pub fn excluding(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.is_empty() && !self.exclude_names.contains(&name) {
            self.exclude_names.push(name);
        }
        self
    }

    /// Extensions and excluded suffixes both match ASCII case-insensitively.
    pub fn accepts(&self, file_name: &str) -> bool {
        let has_ext = self.extensions.iter().any(|ext| {
            let ext = ext.trim_start_matches('.');
            file_name.len() > ext.len() + 1 && ends_with_ignore_case(file_name, &format!(".{ext}"))
        });
        has_ext
            && !self.exclude_suffixes.iter().any(|s| ends_with_ignore_case(file_name, s))
            && !self.exclude_names.iter().any(|n| n == file_name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Ordering {
    /// Whatever order the directory listing yields.
    #[default]
    Listing,
    Lexicographic,
}

/// Lists eligible regular files in `dir`.
pub fn list_inputs<P: AsRef<Path>>(dir: P, filter: &Eligibility, ordering: Ordering) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let not_found = |source| AtlasError::InputNotFound { path: dir.to_path_buf(), source };
    let mut out = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(not_found)? {
        let entry = entry.map_err(not_found)?;
        let os_name = entry.file_name();
        let name = os_name.to_string_lossy();
        if os_name.to_str().is_none() {
            tracing::warn!(path = %entry.path().display(), "file name is not valid UTF-8, matching its lossy form");
        }
        if !filter.accepts(&name) {
            continue;
        }
        // follows symlinks, so a link to a png still counts
        if !entry.path().is_file() {
            tracing::debug!(path = %entry.path().display(), "skipping non-file entry");
            continue;
        }
        out.push(entry.path());
    }
    if ordering == Ordering::Lexicographic {
        out.sort();
    }
    Ok(out)
}
