use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};
use walkdir::{DirEntry, WalkDir};

use super::extract::Format;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A glob pattern, relative to the project root, mapped to the format of the
/// files it selects.
#[derive(Debug, Clone)]
pub struct Method {
    pub pattern: String,
    pub format: Format,
    compiled: Pattern,
}

impl Method {
    pub fn new(pattern: impl Into<String>, format: Format) -> Result<Self> {
        let pattern = pattern.into();
        let compiled = Pattern::new(&pattern)
            .with_context(|| format!("Invalid glob pattern: \"{}\"", pattern))?;
        Ok(Self {
            pattern,
            format,
            compiled,
        })
    }

    pub fn matches(&self, relative_path: &str) -> bool {
        self.compiled.matches_with(relative_path, MATCH_OPTIONS)
    }
}

/// A file selected by one of the job's methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedFile {
    /// Project-relative path with `/` separators.
    pub relative_path: String,
    pub path: PathBuf,
    /// Pattern of the method that selected the file.
    pub pattern: String,
    pub format: Format,
}

/// Directories starting with `.` or `_` hold editor caches and private data.
fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.') || name.starts_with('_'))
}

fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Walk `root` in file-name order and return every file matched by a method.
///
/// Methods are tried in declaration order and the first match wins. Any
/// unreadable directory aborts the scan.
pub fn scan_files(root: &Path, methods: &[Method]) -> Result<Vec<MatchedFile>> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_skipped_dir(entry));

    for entry in walker {
        let entry = entry.with_context(|| format!("Cannot access path under {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative_path = relative_path(root, entry.path());
        if let Some(method) = methods.iter().find(|m| m.matches(&relative_path)) {
            files.push(MatchedFile {
                relative_path,
                path: entry.path().to_path_buf(),
                pattern: method.pattern.clone(),
                format: method.format,
            });
        }
    }

    Ok(files)
}
