//! Result shapes produced by directory operations.
//!
//! These are transient values: built per request, serialized into the
//! response, and dropped. Nothing here is cached or persisted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Regular file (or anything that is not a directory)
    File,
    /// Directory
    Directory,
}

impl EntryKind {
    /// Returns the lowercase name of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immediate child of a listed directory.
///
/// # Examples
///
/// ```
/// use fsbox_core::{DirectoryEntry, EntryKind};
///
/// let entry = DirectoryEntry::new("todo.txt", EntryKind::File);
/// assert_eq!(entry.name, "todo.txt");
/// assert!(!entry.is_dir());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Entry name (a single path component)
    pub name: String,
    /// Entry kind
    pub kind: EntryKind,
}

impl DirectoryEntry {
    /// Creates a new directory entry.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Returns `true` if the entry is a directory.
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        matches!(self.kind, EntryKind::Directory)
    }
}

/// Recursive directory tree.
///
/// Serializes as `{"type": "file"}` or
/// `{"type": "directory", "children": {...}}`. Children are kept in a
/// `BTreeMap` so output order is by name and reproducible across runs.
///
/// # Examples
///
/// ```
/// use fsbox_core::TreeNode;
/// use std::collections::BTreeMap;
///
/// let mut children = BTreeMap::new();
/// children.insert("todo.txt".to_string(), TreeNode::File);
/// let tree = TreeNode::Directory { children };
///
/// assert_eq!(tree.file_count(), 1);
/// assert!(tree.child("todo.txt").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    /// A file leaf
    File,
    /// A directory and its children, keyed by entry name
    Directory {
        /// Child nodes ordered by name
        children: BTreeMap<String, TreeNode>,
    },
}

impl TreeNode {
    /// Creates an empty directory node.
    #[must_use]
    pub const fn empty_dir() -> Self {
        Self::Directory {
            children: BTreeMap::new(),
        }
    }

    /// Returns the node kind.
    #[must_use]
    pub const fn kind(&self) -> EntryKind {
        match self {
            Self::File => EntryKind::File,
            Self::Directory { .. } => EntryKind::Directory,
        }
    }

    /// Returns the children of a directory node, or `None` for a file.
    #[must_use]
    pub const fn children(&self) -> Option<&BTreeMap<String, Self>> {
        match self {
            Self::File => None,
            Self::Directory { children } => Some(children),
        }
    }

    /// Looks up an immediate child by name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children().and_then(|c| c.get(name))
    }

    /// Counts file leaves in the whole subtree.
    #[must_use]
    pub fn file_count(&self) -> usize {
        match self {
            Self::File => 1,
            Self::Directory { children } => children.values().map(Self::file_count).sum(),
        }
    }

    /// Consumes a directory node and returns its children.
    ///
    /// A file node yields an empty map.
    #[must_use]
    pub fn into_children(self) -> BTreeMap<String, Self> {
        match self {
            Self::File => BTreeMap::new(),
            Self::Directory { children } => children,
        }
    }
}
