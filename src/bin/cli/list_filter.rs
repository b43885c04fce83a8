//! Entry selection from exclude/keep list files.
//!
//! A list file holds one entry name per line. Lines are trimmed, `/` is
//! read as `\` and case is ignored. A line ending in `\` names a directory
//! and matches everything below it; a line starting with `#` is a comment.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use pck::{Entry, EntrySelector};

/// Files and directory prefixes loaded from one list file.
#[derive(Debug, Default)]
pub struct NameList {
    files: HashSet<String>,
    dirs: Vec<String>,
}

impl NameList {
    /// Loads a list file.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        Ok(Self::parse(&fs::read_to_string(path)?))
    }

    /// Parses list file contents.
    pub fn parse(text: &str) -> Self {
        let mut list = Self::default();
        for line in text.lines() {
            let line = line.trim().replace('/', "\\").to_lowercase();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line.ends_with('\\') {
                list.dirs.push(line);
            } else {
                list.files.insert(line);
            }
        }
        list
    }

    /// Returns `true` if `name` (already lowercased) is listed or lies in a listed directory.
    pub fn contains(&self, name: &str) -> bool {
        self.files.contains(name) || self.dirs.iter().any(|d| name.starts_with(d.as_str()))
    }
}

/// Selects entries that are kept, or else not excluded.
#[derive(Debug, Default)]
pub struct ListFilter {
    exclude: NameList,
    keep: NameList,
}

impl ListFilter {
    /// Creates a filter from the two lists.
    pub fn new(exclude: NameList, keep: NameList) -> Self {
        Self { exclude, keep }
    }

    /// Checks if an entry name passes the filter
    pub fn matches(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.keep.contains(&name) || !self.exclude.contains(&name)
    }
}

impl EntrySelector for ListFilter {
    fn select(&self, entry: &Entry) -> bool {
        self.matches(entry.name())
    }
}

impl EntrySelector for &ListFilter {
    fn select(&self, entry: &Entry) -> bool {
        self.matches(entry.name())
    }
}
