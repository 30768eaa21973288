use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::core::catalog::CatalogMetadata;

pub const CONFIG_FILE_NAME: &str = ".gdextractrc.json";

/// Project layout and template metadata.
///
/// Every field has a default matching the course project layout, so a
/// missing config file and an empty one behave the same.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_ui_dir")]
    pub ui_dir: String,
    #[serde(default = "default_course_dir")]
    pub course_dir: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_lesson_prefix")]
    pub lesson_prefix: String,
    #[serde(default = "default_lesson_file")]
    pub lesson_file: String,
    /// Script comments starting with one of these are copied into the template.
    #[serde(default)]
    pub comment_tags: Vec<String>,
    /// Written as `POT-Creation-Date` when set. Left out by default so that
    /// repeated runs produce identical files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
    #[serde(default)]
    pub metadata: CatalogMetadata,
}

fn default_ui_dir() -> String {
    "ui".to_string()
}

fn default_course_dir() -> String {
    "course".to_string()
}

fn default_output_dir() -> String {
    "i18n".to_string()
}

fn default_lesson_prefix() -> String {
    "lesson-".to_string()
}

fn default_lesson_file() -> String {
    "lesson.tres".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ui_dir: default_ui_dir(),
            course_dir: default_course_dir(),
            output_dir: default_output_dir(),
            lesson_prefix: default_lesson_prefix(),
            lesson_file: default_lesson_file(),
            comment_tags: Vec::new(),
            creation_date: None,
            metadata: CatalogMetadata::default(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Directory names end up inside glob patterns, so they must be non-empty
    /// and free of wildcards.
    pub fn validate(&self) -> Result<()> {
        let dirs = [
            ("uiDir", &self.ui_dir),
            ("courseDir", &self.course_dir),
            ("outputDir", &self.output_dir),
            ("lessonFile", &self.lesson_file),
        ];
        for (name, value) in dirs {
            if value.trim().is_empty() {
                bail!("'{}' must not be empty", name);
            }
            if Pattern::escape(value) != *value {
                bail!(
                    "'{}' must be a plain path without glob characters: \"{}\"",
                    name,
                    value
                );
            }
        }

        if self.lesson_prefix.is_empty() {
            bail!("'lessonPrefix' must not be empty");
        }
        if self.comment_tags.iter().any(|tag| tag.trim().is_empty()) {
            bail!("'commentTags' must not contain empty tags");
        }

        Ok(())
    }
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            config
                .validate()
                .with_context(|| format!("Invalid config file: {}", path.display()))?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}
