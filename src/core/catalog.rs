use std::{collections::HashMap, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

/// `%`-style placeholders: `%s`, `%5.2f`, `%(name)d`, `%%`.
static PERCENT_FORMAT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%(?:\(\w*\))?[-#0 +]?(?:\*|\d+)?(?:\.(?:\*|\d+))?[hlL]?[diouxXeEfFgGcrs%]")
        .unwrap()
});

/// Project metadata written into the template header.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogMetadata {
    #[serde(default = "default_project")]
    pub project: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_copyright_holder")]
    pub copyright_holder: String,
    #[serde(default = "default_bugs_address")]
    pub bugs_address: String,
}

fn default_project() -> String {
    "Learn GDScript From Zero".to_string()
}

fn default_version() -> String {
    " ".to_string()
}

fn default_copyright_holder() -> String {
    "GDQuest".to_string()
}

fn default_bugs_address() -> String {
    "https://github.com/GDQuest/learn-gdscript".to_string()
}

impl Default for CatalogMetadata {
    fn default() -> Self {
        Self {
            project: default_project(),
            version: default_version(),
            copyright_holder: default_copyright_holder(),
            bugs_address: default_bugs_address(),
        }
    }
}

/// Where a message was found: project-relative path and 1-based line.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    pub file_path: String,
    pub line: usize,
}

impl Location {
    pub fn new(file_path: impl Into<String>, line: usize) -> Self {
        Self {
            file_path: file_path.into(),
            line,
        }
    }
}

/// One unique message of a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: String,
    /// Always empty for templates.
    pub translation: String,
    pub locations: Vec<Location>,
    pub auto_comments: Vec<String>,
    pub context: Option<String>,
}

impl CatalogEntry {
    /// Flags for the `#,` line. Ids using `%` placeholders, GDScript's
    /// string formatting operator, are marked `python-format`.
    pub fn flags(&self) -> Vec<&'static str> {
        if PERCENT_FORMAT_REGEX.is_match(&self.id) {
            vec!["python-format"]
        } else {
            Vec::new()
        }
    }
}

type EntryKey = (Option<String>, String);

/// Insertion-ordered set of messages keyed by (context, id).
///
/// Adding a message that is already present accumulates its locations and
/// comments on the existing entry.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub metadata: CatalogMetadata,
    entries: Vec<CatalogEntry>,
    index: HashMap<EntryKey, usize>,
}

impl Catalog {
    pub fn new(metadata: CatalogMetadata) -> Self {
        Self {
            metadata,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Insert a message or merge it into the entry with the same id and context.
    pub fn add(
        &mut self,
        id: impl Into<String>,
        location: Location,
        auto_comments: &[String],
        context: Option<&str>,
    ) {
        let id = id.into();
        let key = (context.map(str::to_string), id);

        let pos = match self.index.get(&key).copied() {
            Some(pos) => pos,
            None => {
                let pos = self.entries.len();
                self.entries.push(CatalogEntry {
                    id: key.1.clone(),
                    translation: String::new(),
                    locations: Vec::new(),
                    auto_comments: Vec::new(),
                    context: key.0.clone(),
                });
                self.index.insert(key, pos);
                pos
            }
        };
        let entry = &mut self.entries[pos];

        if !entry.locations.contains(&location) {
            entry.locations.push(location);
        }
        for comment in auto_comments {
            if !entry.auto_comments.contains(comment) {
                entry.auto_comments.push(comment.clone());
            }
        }
    }

    pub fn get(&self, id: &str, context: Option<&str>) -> Option<&CatalogEntry> {
        let key = (context.map(str::to_string), id.to_string());
        self.index.get(&key).map(|&pos| &self.entries[pos])
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_duplicate_text_accumulates_locations() {
        let mut catalog = Catalog::default();
        catalog.add("Start", Location::new("ui/Menu.gd", 3), &[], None);
        catalog.add("Start", Location::new("ui/Menu.gd", 9), &[], None);

        assert_eq!(catalog.len(), 1);
        let entry = catalog.get("Start", None).unwrap();
        assert_eq!(
            entry.locations,
            vec![Location::new("ui/Menu.gd", 3), Location::new("ui/Menu.gd", 9)]
        );
        assert!(entry.translation.is_empty());
    }

    #[test]
    fn test_same_location_recorded_once() {
        let mut catalog = Catalog::default();
        catalog.add("Quit", Location::new("ui/Menu.gd", 3), &[], None);
        catalog.add("Quit", Location::new("ui/Menu.gd", 3), &[], None);

        assert_eq!(catalog.entries()[0].locations.len(), 1);
    }

    #[test]
    fn test_context_separates_entries() {
        let mut catalog = Catalog::default();
        catalog.add("Open", Location::new("a.gd", 1), &[], None);
        catalog.add("Open", Location::new("a.gd", 2), &[], Some("menu"));

        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.get("Open", Some("menu")).unwrap().context.as_deref(),
            Some("menu")
        );
    }

    #[test]
    fn test_insertion_order_and_comment_merge() {
        let mut catalog = Catalog::default();
        catalog.add("B", Location::new("x.gd", 1), &["first".to_string()], None);
        catalog.add("A", Location::new("x.gd", 2), &[], None);
        catalog.add(
            "B",
            Location::new("x.gd", 3),
            &["first".to_string(), "second".to_string()],
            None,
        );

        let ids: Vec<&str> = catalog.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["B", "A"]);
        assert_eq!(catalog.entries()[0].auto_comments, vec!["first", "second"]);
    }

    #[test]
    fn test_percent_placeholders_flag_entry() {
        let mut catalog = Catalog::default();
        for id in ["Score: %d", "%(name)s joined", "%5.2f%%", "Plain text", "100%"] {
            catalog.add(id, Location::new("ui/Hud.gd", 1), &[], None);
        }

        let flags: Vec<Vec<&str>> = catalog.entries().iter().map(CatalogEntry::flags).collect();
        assert_eq!(
            flags,
            vec![
                vec!["python-format"],
                vec!["python-format"],
                vec!["python-format"],
                vec![],
                vec![],
            ]
        );
    }

    #[test]
    fn test_default_metadata() {
        let metadata = CatalogMetadata::default();
        assert_eq!(metadata.project, "Learn GDScript From Zero");
        assert_eq!(metadata.version, " ");
        assert_eq!(metadata.copyright_holder, "GDQuest");
    }
}
