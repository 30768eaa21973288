//! Serialization of a [`Catalog`] to the portable-object template format.
//!
//! Output is fully deterministic: entries keep catalog order, locations are
//! sorted and deduplicated, and no timestamp is written unless the caller
//! passes a creation date.

use std::{fs, path::Path, sync::LazyLock};

use anyhow::{Context, Result};
use regex::Regex;

use super::catalog::{Catalog, CatalogEntry};

/// Maximum line width for wrapped strings and comments.
pub const WRAP_WIDTH: usize = 76;

/// Alternating runs of whitespace and non-whitespace, used as wrap points.
static WORD_CHUNK_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+|\S+").unwrap());

/// Render the catalog and write it to `path`, replacing any existing file.
pub fn write_pot(catalog: &Catalog, path: &Path, creation_date: Option<&str>) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }

    let content = render_pot(catalog, creation_date);
    fs::write(path, content).with_context(|| format!("Failed to write file: {}", path.display()))
}

/// Render the catalog as POT text.
pub fn render_pot(catalog: &Catalog, creation_date: Option<&str>) -> String {
    let mut out = String::new();
    write_header(&mut out, catalog, creation_date);
    for entry in catalog.entries() {
        write_entry(&mut out, entry);
    }
    out
}

fn write_header(out: &mut String, catalog: &Catalog, creation_date: Option<&str>) {
    let meta = &catalog.metadata;
    let comment = [
        format!("# Translations template for {}.", meta.project),
        format!("# Copyright (C) YEAR {}", meta.copyright_holder),
        format!(
            "# This file is distributed under the same license as the {} project.",
            meta.project
        ),
        "# FIRST AUTHOR <EMAIL@ADDRESS>, YEAR.".to_string(),
        "#".to_string(),
    ];
    for line in &comment {
        for wrapped in wrap_words(line, WRAP_WIDTH, "# ") {
            out.push_str(&wrapped);
            out.push('\n');
        }
    }

    let mut fields = vec![
        format!("Project-Id-Version: {} {}", meta.project, meta.version),
        format!("Report-Msgid-Bugs-To: {}", meta.bugs_address),
    ];
    if let Some(date) = creation_date {
        fields.push(format!("POT-Creation-Date: {}", date));
    }
    fields.extend(
        [
            "PO-Revision-Date: YEAR-MO-DA HO:MI+ZONE",
            "Last-Translator: FULL NAME <EMAIL@ADDRESS>",
            "Language-Team: LANGUAGE <LL@li.org>",
            "MIME-Version: 1.0",
            "Content-Type: text/plain; charset=utf-8",
            "Content-Transfer-Encoding: 8bit",
        ]
        .map(String::from),
    );
    fields.push(format!("Generated-By: gdextract {}", env!("CARGO_PKG_VERSION")));

    let header: String = fields.iter().map(|f| format!("{}\n", f)).collect();

    out.push_str("#, fuzzy\n");
    out.push_str("msgid \"\"\n");
    out.push_str(&format!("msgstr {}\n", normalize(&header, WRAP_WIDTH)));
    out.push('\n');
}

fn write_entry(out: &mut String, entry: &CatalogEntry) {
    for comment in &entry.auto_comments {
        write_comment(out, '.', comment);
    }

    let mut locations = entry.locations.clone();
    locations.sort();
    let mut rendered: Vec<String> = Vec::with_capacity(locations.len());
    for location in &locations {
        let loc = format!("{}:{}", location.file_path.replace('\\', "/"), location.line);
        if !rendered.contains(&loc) {
            rendered.push(loc);
        }
    }
    if !rendered.is_empty() {
        write_comment(out, ':', &rendered.join(" "));
    }

    let flags = entry.flags();
    if !flags.is_empty() {
        out.push_str(&format!("#, {}\n", flags.join(", ")));
    }

    if let Some(context) = &entry.context {
        out.push_str(&format!("msgctxt {}\n", normalize(context, WRAP_WIDTH)));
    }
    out.push_str(&format!("msgid {}\n", normalize(&entry.id, WRAP_WIDTH)));
    out.push_str(&format!("msgstr {}\n", normalize(&entry.translation, WRAP_WIDTH)));
    out.push('\n');
}

fn write_comment(out: &mut String, prefix: char, comment: &str) {
    for line in wrap_words(comment, WRAP_WIDTH, "") {
        out.push_str(&format!("#{} {}\n", prefix, line.trim()));
    }
}

/// Greedy word wrap. Words longer than `width` are kept whole on their own line.
fn wrap_words(text: &str, width: usize, subsequent_indent: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current_len == 0 {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(subsequent_indent);
            current.push_str(word);
            current_len = subsequent_indent.chars().count() + word_len;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Quote and escape a string for PO output.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Render a string as a PO value, splitting it over several quoted lines when
/// it contains newlines or is wider than `width`.
pub fn normalize(text: &str, width: usize) -> String {
    let mut lines: Vec<String> = Vec::new();

    for line in text.split_inclusive('\n') {
        if escaped_len(line) + 2 <= width {
            lines.push(line.to_string());
            continue;
        }

        let mut chunks: Vec<&str> = WORD_CHUNK_REGEX
            .find_iter(line)
            .map(|m| m.as_str())
            .collect();
        chunks.reverse();

        while !chunks.is_empty() {
            let mut buf = String::new();
            let mut size = 2;
            while let Some(chunk) = chunks.last() {
                let length = escaped_len(chunk);
                if size + length < width {
                    buf.push_str(chunk);
                    size += length;
                    chunks.pop();
                } else {
                    if buf.is_empty() {
                        buf.push_str(chunk);
                        chunks.pop();
                    }
                    break;
                }
            }
            lines.push(buf);
        }
    }

    if lines.len() <= 1 {
        return escape(text);
    }

    let mut out = String::from("\"\"");
    for line in &lines {
        out.push('\n');
        out.push_str(&escape(line));
    }
    out
}

/// Length of the escaped form of `text`, without surrounding quotes.
fn escaped_len(text: &str) -> usize {
    text.chars()
        .map(|c| match c {
            '\\' | '\t' | '\r' | '\n' | '"' => 2,
            _ => 1,
        })
        .sum()
}
