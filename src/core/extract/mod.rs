//! Format-specific message extraction.
//!
//! Each supported file format implements [`Extractor`]; [`Format`] picks the
//! implementation for a file matched by an extraction job.
//!
//! ## Module Structure
//!
//! - `script`: GDScript marker calls (`tr("...")`)
//! - `godot`: Godot text resources, shared by scenes (`.tscn`) and resources (`.tres`)

pub mod godot;
pub mod script;

use std::{collections::HashMap, fmt, fs, path::Path};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use super::error::SyntaxError;
use godot::{ResourceExtractor, SceneExtractor};
use script::ScriptExtractor;

/// A message found in a source file, before it is added to a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedMessage {
    /// Project-relative path with `/` separators.
    pub file_path: String,
    /// 1-based line.
    pub line: usize,
    pub text: String,
    pub comments: Vec<String>,
    pub context: Option<String>,
}

/// Recognized marker calls or `Type/property` paths, with their default context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keywords(HashMap<String, Option<String>>);

impl Keywords {
    pub fn new<'a>(entries: impl IntoIterator<Item = (&'a str, Option<&'a str>)>) -> Self {
        Self(
            entries
                .into_iter()
                .map(|(name, context)| (name.to_string(), context.map(str::to_string)))
                .collect(),
        )
    }

    /// Keywords that carry no context.
    pub fn from_names(names: &[&str]) -> Self {
        Self::new(names.iter().map(|name| (*name, None)))
    }

    /// `Some(context)` if `name` is recognized.
    pub fn lookup(&self, name: &str) -> Option<Option<&str>> {
        self.0.get(name).map(|context| context.as_deref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Extract translatable strings from the text of one file.
pub trait Extractor {
    fn extract(
        &self,
        path: &str,
        source: &str,
        keywords: &Keywords,
        comment_tags: &[String],
    ) -> Result<Vec<ExtractedMessage>, SyntaxError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// GDScript source (`.gd`).
    Script,
    /// Godot scene (`.tscn`).
    Scene,
    /// Godot resource (`.tres`).
    Resource,
}

impl Format {
    fn extractor(self) -> &'static dyn Extractor {
        match self {
            Format::Script => &ScriptExtractor,
            Format::Scene => &SceneExtractor,
            Format::Resource => &ResourceExtractor,
        }
    }

    pub fn extract(
        self,
        path: &str,
        source: &str,
        keywords: &Keywords,
        comment_tags: &[String],
    ) -> Result<Vec<ExtractedMessage>, SyntaxError> {
        self.extractor().extract(path, source, keywords, comment_tags)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Script => write!(f, "gdscript"),
            Format::Scene => write!(f, "godot_scene"),
            Format::Resource => write!(f, "godot_resource"),
        }
    }
}

/// Per-pattern options of an extraction job.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FileOptions {
    #[serde(default = "default_encoding")]
    pub encoding: String,
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

impl Default for FileOptions {
    fn default() -> Self {
        Self {
            encoding: default_encoding(),
        }
    }
}

/// Read a source file honoring the job's encoding option.
///
/// Only UTF-8 is supported; any other encoding is rejected rather than
/// silently misread.
pub fn read_source(path: &Path, options: &FileOptions) -> Result<String> {
    let encoding = options.encoding.to_ascii_lowercase();
    if !matches!(encoding.as_str(), "utf-8" | "utf8") {
        bail!(
            "Unsupported encoding '{}' for file: {}",
            options.encoding,
            path.display()
        );
    }

    let bytes = fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    String::from_utf8(bytes).with_context(|| format!("File is not valid UTF-8: {}", path.display()))
}
