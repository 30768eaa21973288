//! gdextract - translation template extractor for a Godot course project
//!
//! Scans UI scripts (`.gd`), UI scenes (`.tscn`) and lesson resources
//! (`.tres`) for translatable strings and writes one portable-object
//! template (`.pot`) for the application and one per lesson.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface (arguments, progress output, exit status)
//! - `config`: Configuration file loading and parsing
//! - `core`: Extraction engine (scanning, format readers, catalog, POT writer)

pub mod cli;
pub mod config;
pub mod core;
