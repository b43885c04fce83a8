//! Directory-like view over entry names.

use std::collections::BTreeMap;

use crate::name::{self, SEPARATOR};

use super::Entry;

/// A node of an [`EntryTree`].
///
/// A node is a directory when some entry lives below it and a file when an
/// entry has exactly its name; a malformed package can make it both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeNode {
    /// Display name of this component, as spelled by the entry.
    pub name: String,
    /// Full entry-style path of this node.
    pub full_path: String,
    /// Whether entries live below this node.
    pub is_dir: bool,
    /// Index of the entry with exactly this name, if any.
    pub entry: Option<usize>,
    /// Children keyed by lowercased component name.
    pub children: BTreeMap<String, TreeNode>,
}

impl TreeNode {
    /// Returns `true` if an entry has exactly this node's name.
    pub fn is_file(&self) -> bool {
        self.entry.is_some()
    }
}

/// A tree of entry names, with case-folded keys and sorted children.
///
/// # Example
///
/// ```rust
/// use pck::EntryTree;
///
/// let tree = EntryTree::from_names(["Gfx\\Sky.dds", "gfx\\ui\\icon.dds", "readme.txt"]);
/// let gfx = tree.get("GFX").unwrap();
/// assert!(gfx.is_dir);
/// assert_eq!(gfx.children.len(), 2);
/// assert!(tree.get("gfx/ui/ICON.dds").unwrap().is_file());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryTree {
    roots: BTreeMap<String, TreeNode>,
}

impl EntryTree {
    /// Builds a tree over archive entries; node indices refer to `entries`.
    pub fn build(entries: &[Entry]) -> Self {
        Self::from_names(entries.iter().map(Entry::name))
    }

    /// Builds a tree over plain names; node indices are positions in the iterator.
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut tree = Self::default();
        for (index, name) in names.into_iter().enumerate() {
            tree.insert(name, index);
        }
        tree
    }

    fn insert(&mut self, name: &str, index: usize) {
        let name = name::normalize(name);
        if name.is_empty() {
            return;
        }
        let parts: Vec<&str> = name.split(SEPARATOR).collect();
        let mut level = &mut self.roots;
        let mut path = String::new();
        for (depth, part) in parts.iter().enumerate() {
            if depth > 0 {
                path.push(SEPARATOR);
            }
            path.push_str(part);

            let node = level.entry(part.to_ascii_lowercase()).or_default();
            if node.name.is_empty() {
                node.name = (*part).to_string();
                node.full_path = path.clone();
            }
            if depth + 1 == parts.len() {
                node.entry = Some(index);
                node.name = (*part).to_string();
                node.full_path = path.clone();
            } else {
                node.is_dir = true;
            }
            level = &mut node.children;
        }
    }

    /// Returns the top-level nodes.
    pub fn roots(&self) -> &BTreeMap<String, TreeNode> {
        &self.roots
    }

    /// Looks up a node by path, ignoring case and separator style.
    pub fn get(&self, path: &str) -> Option<&TreeNode> {
        let path = name::normalize(path);
        let mut level = &self.roots;
        let mut found = None;
        for part in path.split(SEPARATOR) {
            let node = level.get(&part.to_ascii_lowercase())?;
            level = &node.children;
            found = Some(node);
        }
        found
    }

    /// Returns `true` if the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Visits every node depth-first in sorted order, with its depth.
    pub fn walk(&self) -> Vec<(usize, &TreeNode)> {
        fn visit<'a>(
            level: &'a BTreeMap<String, TreeNode>,
            depth: usize,
            out: &mut Vec<(usize, &'a TreeNode)>,
        ) {
            for node in level.values() {
                out.push((depth, node));
                visit(&node.children, depth + 1, out);
            }
        }
        let mut out = Vec::new();
        visit(&self.roots, 0, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_folded_merge() {
        let tree = EntryTree::from_names(["Data\\a.txt", "DATA\\b.txt", "data\\Sub\\c.txt"]);
        assert_eq!(tree.roots().len(), 1);
        let data = tree.get("data").unwrap();
        assert!(data.is_dir);
        assert!(!data.is_file());
        assert_eq!(data.name, "Data");
        assert_eq!(data.children.len(), 3);
        assert_eq!(tree.get("data\\sub\\C.TXT").unwrap().entry, Some(2));
        assert_eq!(tree.get("data\\sub\\c.txt").unwrap().full_path, "data\\Sub\\c.txt");
    }

    #[test]
    fn test_walk_order() {
        let tree = EntryTree::from_names(["b.txt", "a\\z.txt", "a\\y.txt"]);
        let walked: Vec<_> = tree
            .walk()
            .into_iter()
            .map(|(d, n)| (d, n.name.as_str()))
            .collect();
        assert_eq!(
            walked,
            vec![(0, "a"), (1, "y.txt"), (1, "z.txt"), (0, "b.txt")]
        );
    }

    #[test]
    fn test_missing_path() {
        let tree = EntryTree::from_names(["a\\b.txt"]);
        assert!(tree.get("a\\c.txt").is_none());
        assert!(tree.get("").is_none());
    }

    #[test]
    fn test_file_and_directory_with_same_name() {
        let tree = EntryTree::from_names(["x", "x\\y"]);
        let x = tree.get("x").unwrap();
        assert!(x.is_dir);
        assert!(x.is_file());
    }
}
