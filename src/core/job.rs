//! Extraction jobs: which files to read, with which format, which keywords
//! to look for, and where to write the resulting template.

use std::{collections::HashMap, path::PathBuf};

use anyhow::Result;
use glob::Pattern;

use super::{
    extract::{FileOptions, Format, Keywords},
    file_scanner::Method,
};
use crate::config::Config;

/// Node properties translated in UI scenes.
pub const SCENE_PROPERTIES: &[&str] = &[
    "Label/text",
    "Button/text",
    "RichTextLabel/bbcode_text",
    "LineEdit/placeholder_text",
];

/// Marker functions in UI scripts.
pub const SCRIPT_MARKERS: &[&str] = &["tr"];

/// Fields of lesson resources: content blocks, quizzes and practices.
pub const LESSON_FIELDS: &[&str] = &[
    "Resource/title",
    "Resource/text",
    "Resource/question",
    "Resource/hint",
    "Resource/content_bbcode",
    "Resource/explanation_bbcode",
    "Resource/valid_answer",
    "Resource/answer_options",
    "Resource/valid_answers",
    "Resource/goal",
    "Resource/description",
    "Resource/hints",
];

/// One scan-and-serialize operation producing exactly one template.
#[derive(Debug, Clone)]
pub struct ExtractionJob {
    pub methods: Vec<Method>,
    /// Options per method pattern. Patterns without an entry use the defaults.
    pub options: HashMap<String, FileOptions>,
    pub keywords: Keywords,
    pub comment_tags: Vec<String>,
    /// Output path relative to the project root.
    pub output: PathBuf,
}

impl ExtractionJob {
    pub fn options_for(&self, pattern: &str) -> FileOptions {
        self.options.get(pattern).cloned().unwrap_or_default()
    }
}

/// Job reading UI scripts and scenes into `<output_dir>/application.pot`.
pub fn application_job(config: &Config) -> Result<ExtractionJob> {
    let ui = Pattern::escape(&config.ui_dir);
    let methods = vec![
        Method::new(format!("{}/**/*.gd", ui), Format::Script)?,
        Method::new(format!("{}/**/*.tscn", ui), Format::Scene)?,
    ];
    let keywords = Keywords::from_names(&[SCENE_PROPERTIES, SCRIPT_MARKERS].concat());

    Ok(ExtractionJob {
        options: utf8_options(&methods),
        methods,
        keywords,
        comment_tags: config.comment_tags.clone(),
        output: PathBuf::from(&config.output_dir).join("application.pot"),
    })
}

/// Job reading one lesson resource into `<output_dir>/<lesson>.pot`.
pub fn lesson_job(config: &Config, lesson: &str) -> Result<ExtractionJob> {
    let methods = vec![Method::new(
        format!(
            "{}/{}/{}",
            Pattern::escape(&config.course_dir),
            Pattern::escape(lesson),
            Pattern::escape(&config.lesson_file)
        ),
        Format::Resource,
    )?];

    Ok(ExtractionJob {
        options: utf8_options(&methods),
        methods,
        keywords: Keywords::from_names(LESSON_FIELDS),
        comment_tags: config.comment_tags.clone(),
        output: PathBuf::from(&config.output_dir).join(format!("{}.pot", lesson)),
    })
}

/// Path of a lesson's resource file relative to the project root.
pub fn lesson_file_path(config: &Config, lesson: &str) -> PathBuf {
    PathBuf::from(&config.course_dir)
        .join(lesson)
        .join(&config.lesson_file)
}

fn utf8_options(methods: &[Method]) -> HashMap<String, FileOptions> {
    methods
        .iter()
        .map(|m| (m.pattern.clone(), FileOptions::default()))
        .collect()
}
