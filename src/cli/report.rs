//! Console output for the extraction run.
//!
//! Kept apart from the pipeline so the engine can be used as a library.

use std::io::{self, Write};

use colored::Colorize;

use crate::config::CONFIG_FILE_NAME;
use crate::core::{ExtractionSummary, Progress, RunSummary};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Print one progress event to stdout. File-level events only in verbose mode.
pub fn print_progress(event: Progress<'_>, verbose: bool) {
    print_progress_to(event, verbose, &mut io::stdout().lock());
}

pub fn print_progress_to<W: Write>(event: Progress<'_>, verbose: bool, writer: &mut W) {
    match event {
        Progress::ApplicationStarted => {
            writeln!(writer, "Reading application messages...").ok();
        }
        Progress::LessonStarted { lesson } => {
            writeln!(writer, "Reading lesson messages from '{}'...", lesson).ok();
        }
        Progress::FileExtracted { path } => {
            if verbose {
                writeln!(writer, "  Extracting from file '{}'", path).ok();
            }
        }
        Progress::Written(summary) => {
            writeln!(writer, "  {} {}", SUCCESS_MARK.green(), describe(summary)).ok();
        }
    }
}

fn describe(summary: &ExtractionSummary) -> String {
    format!(
        "Wrote {} ({} {} from {} {})",
        summary.output.display().to_string().bold(),
        summary.message_count,
        plural(summary.message_count, "message", "messages"),
        summary.files_scanned,
        plural(summary.files_scanned, "file", "files"),
    )
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}

/// Print the closing line of a successful run.
pub fn print_summary(summary: &RunSummary) {
    print_summary_to(summary, &mut io::stdout().lock());
}

pub fn print_summary_to<W: Write>(summary: &RunSummary, writer: &mut W) {
    let templates = 1 + summary.lessons.len();
    let messages: usize = summary.application.message_count
        + summary
            .lessons
            .iter()
            .map(|lesson| lesson.message_count)
            .sum::<usize>();

    writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Finished extraction: {} {} with {} {} ({} {})",
            templates,
            plural(templates, "template", "templates"),
            messages,
            plural(messages, "message", "messages"),
            summary.lessons.len(),
            plural(summary.lessons.len(), "lesson", "lessons"),
        )
        .green()
    )
    .ok();
}

pub fn print_config_notice() {
    println!("Using configuration from {}", CONFIG_FILE_NAME.bold());
}
