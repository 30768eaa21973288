//! The extraction pipeline: scan → extract → normalize → accumulate → write.
//!
//! Every job builds its own [`Catalog`]; nothing is shared between jobs, which
//! lets lesson catalogs be built in parallel. Templates are written only
//! after a job's whole scan succeeded.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use rayon::prelude::*;

use super::{
    catalog::{Catalog, Location},
    extract::read_source,
    file_scanner::scan_files,
    job::{ExtractionJob, application_job, lesson_file_path, lesson_job},
    pofile::write_pot,
};
use crate::config::Config;

/// Progress notifications, reported in the order the work happens.
#[derive(Debug, Clone, Copy)]
pub enum Progress<'a> {
    ApplicationStarted,
    LessonStarted { lesson: &'a str },
    FileExtracted { path: &'a str },
    Written(&'a ExtractionSummary),
}

/// Callback receiving [`Progress`] events, always on the calling thread.
pub type ProgressFn<'a> = &'a (dyn for<'e> Fn(Progress<'e>) + Sync);

/// A no-op progress callback.
pub fn silent(_: Progress<'_>) {}

/// What one job produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionSummary {
    /// Output path relative to the project root.
    pub output: PathBuf,
    pub files_scanned: usize,
    pub message_count: usize,
}

/// A finished in-memory catalog waiting to be written.
#[derive(Debug)]
pub struct JobCatalog {
    pub output: PathBuf,
    pub catalog: Catalog,
    /// Root-relative paths of the scanned files, in scan order.
    pub files: Vec<String>,
}

/// Text of a message as stored in the catalog.
pub fn normalize_message_id(text: &str) -> String {
    text.replace("\r\n", "\n")
}

/// Scan the project for the job's files and accumulate their messages.
pub fn build_catalog(
    root: &Path,
    job: &ExtractionJob,
    config: &Config,
    progress: ProgressFn<'_>,
) -> Result<JobCatalog> {
    let files = scan_files(root, &job.methods)?;
    let mut catalog = Catalog::new(config.metadata.clone());

    for file in &files {
        progress(Progress::FileExtracted {
            path: &file.relative_path,
        });

        let source = read_source(&file.path, &job.options_for(&file.pattern))?;
        let messages = file
            .format
            .extract(&file.relative_path, &source, &job.keywords, &job.comment_tags)
            .with_context(|| {
                format!(
                    "Failed to extract {} messages from {}",
                    file.format, file.relative_path
                )
            })?;

        for message in messages {
            catalog.add(
                normalize_message_id(&message.text),
                Location::new(message.file_path, message.line),
                &message.comments,
                message.context.as_deref(),
            );
        }
    }

    Ok(JobCatalog {
        output: job.output.clone(),
        catalog,
        files: files.into_iter().map(|file| file.relative_path).collect(),
    })
}

impl JobCatalog {
    /// Serialize to `<root>/<output>`, replacing any previous template.
    pub fn write(&self, root: &Path, config: &Config) -> Result<ExtractionSummary> {
        write_pot(
            &self.catalog,
            &root.join(&self.output),
            config.creation_date.as_deref(),
        )?;
        Ok(ExtractionSummary {
            output: self.output.clone(),
            files_scanned: self.files.len(),
            message_count: self.catalog.len(),
        })
    }
}

/// Build the job's catalog and write it.
pub fn extract_and_write(
    root: &Path,
    job: &ExtractionJob,
    config: &Config,
    progress: ProgressFn<'_>,
) -> Result<ExtractionSummary> {
    let summary = build_catalog(root, job, config, progress)?.write(root, config)?;
    progress(Progress::Written(&summary));
    Ok(summary)
}

/// Extract UI scripts and scenes into the application template.
pub fn extract_application_messages(
    root: &Path,
    config: &Config,
    progress: ProgressFn<'_>,
) -> Result<ExtractionSummary> {
    progress(Progress::ApplicationStarted);

    let ui_dir = root.join(&config.ui_dir);
    if !ui_dir.is_dir() {
        bail!("UI directory not found: {}", ui_dir.display());
    }

    let job = application_job(config)?;
    extract_and_write(root, &job, config, progress)
}

/// Names of the lesson directories under the course directory, sorted.
///
/// Only directories whose name starts with the lesson prefix are returned;
/// files and other directories are skipped.
pub fn find_lessons(root: &Path, config: &Config) -> Result<Vec<String>> {
    let course_dir = root.join(&config.course_dir);
    let entries = fs::read_dir(&course_dir)
        .with_context(|| format!("Failed to read course directory: {}", course_dir.display()))?;

    let mut lessons = Vec::new();
    for entry in entries {
        let entry = entry
            .with_context(|| format!("Failed to read course directory: {}", course_dir.display()))?;
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if name.starts_with(&config.lesson_prefix) && entry.path().is_dir() {
            lessons.push(name);
        }
    }
    lessons.sort();

    Ok(lessons)
}

fn build_lesson_catalog(
    root: &Path,
    config: &Config,
    lesson: &str,
    progress: ProgressFn<'_>,
) -> Result<JobCatalog> {
    let lesson_file = lesson_file_path(config, lesson);
    if !root.join(&lesson_file).is_file() {
        bail!("Lesson file not found: {}", lesson_file.display());
    }

    let job = lesson_job(config, lesson)?;
    build_catalog(root, &job, config, progress)
        .with_context(|| format!("Failed to extract lesson '{}'", lesson))
}

/// Extract a single lesson into `<output_dir>/<lesson>.pot`.
pub fn extract_lesson_messages(
    root: &Path,
    config: &Config,
    lesson: &str,
    progress: ProgressFn<'_>,
) -> Result<ExtractionSummary> {
    progress(Progress::LessonStarted { lesson });
    let summary = build_lesson_catalog(root, config, lesson, progress)?.write(root, config)?;
    progress(Progress::Written(&summary));
    Ok(summary)
}

/// Extract every lesson of the course, one template per lesson.
///
/// Catalogs are built in parallel without reporting; progress is then
/// replayed and templates written in lesson order. A failing lesson aborts
/// the run before any lesson template is written, after reporting the
/// lessons up to and including the failing one.
pub fn extract_course_messages(
    root: &Path,
    config: &Config,
    progress: ProgressFn<'_>,
) -> Result<Vec<ExtractionSummary>> {
    let lessons = find_lessons(root, config)?;

    let built: Vec<Result<JobCatalog>> = lessons
        .par_iter()
        .map(|lesson| build_lesson_catalog(root, config, lesson, &silent))
        .collect();
    let complete = built.iter().all(|result| result.is_ok());

    let mut summaries = Vec::with_capacity(built.len());
    for (lesson, result) in lessons.iter().zip(built) {
        progress(Progress::LessonStarted { lesson });
        let catalog = result?;
        for path in &catalog.files {
            progress(Progress::FileExtracted { path });
        }
        if complete {
            let summary = catalog.write(root, config)?;
            progress(Progress::Written(&summary));
            summaries.push(summary);
        }
    }

    Ok(summaries)
}

/// Everything one invocation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub application: ExtractionSummary,
    pub lessons: Vec<ExtractionSummary>,
}

/// Application extraction followed by the lesson walk.
pub fn run(root: &Path, config: &Config, progress: ProgressFn<'_>) -> Result<RunSummary> {
    let application = extract_application_messages(root, config, progress)?;
    let lessons = extract_course_messages(root, config, progress)?;
    Ok(RunSummary {
        application,
        lessons,
    })
}
