//! Core extraction engine.
//!
//! ## Module Structure
//!
//! - `catalog`: Deduplicating message catalog and project metadata
//! - `error`: Syntax errors raised by the format readers
//! - `extract`: Format-specific extractors (GDScript, scenes, resources)
//! - `file_scanner`: Project walk with glob-to-format method matching
//! - `job`: Extraction job definitions for the application and lessons
//! - `pipeline`: Scan, accumulate and write; the lesson-directory walk
//! - `pofile`: POT serialization

pub mod catalog;
pub mod error;
pub mod extract;
pub mod file_scanner;
pub mod job;
pub mod pipeline;
pub mod pofile;

pub use catalog::{Catalog, CatalogEntry, CatalogMetadata, Location};
pub use error::{SyntaxError, SyntaxErrorKind};
pub use extract::{ExtractedMessage, Extractor, FileOptions, Format, Keywords};
pub use job::ExtractionJob;
pub use pipeline::{ExtractionSummary, Progress, RunSummary};
