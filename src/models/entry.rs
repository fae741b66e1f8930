use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Scan-session-unique node identifier. Two scans of the same path produce
/// fresh ids, so view state keyed by id can never leak across scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub u64);

/// Hands out ids for one scan session. Draws from a process-wide counter so
/// ids from an old scan can never alias ids in a new one.
pub struct IdAllocator {
    _private: (),
}

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

impl IdAllocator {
    pub fn new() -> Self {
        Self { _private: () }
    }

    pub fn next(&self) -> EntryId {
        EntryId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    File,
    Directory,
    /// A directory the OS treats as a single logical file (e.g. an
    /// application bundle). Sized recursively but exposed as a leaf.
    Bundle,
}

/// One file or directory in the measured tree. Immutable once the scan
/// completes; only `percent_of_total` is stamped by a later pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub path: PathBuf,
    pub name: String,
    pub kind: EntryKind,
    pub size_bytes: u64,
    /// Empty for leaves. For directories: all immediate children, sorted
    /// descending by size with ties in enumeration order.
    pub children: Vec<Entry>,
    /// Fraction (0-100) of the scan root's total size; 0 until annotated.
    pub percent_of_total: f64,
}

impl Entry {
    pub fn file(id: EntryId, path: PathBuf, name: String, size_bytes: u64) -> Self {
        Self {
            id,
            path,
            name,
            kind: EntryKind::File,
            size_bytes,
            children: Vec::new(),
            percent_of_total: 0.0,
        }
    }

    pub fn bundle(id: EntryId, path: PathBuf, name: String, size_bytes: u64) -> Self {
        Self {
            id,
            path,
            name,
            kind: EntryKind::Bundle,
            size_bytes,
            children: Vec::new(),
            percent_of_total: 0.0,
        }
    }

    /// Builds a directory node from its finished children: sums their sizes
    /// and sorts them descending (stable, so equal sizes keep enumeration
    /// order).
    pub fn directory(id: EntryId, path: PathBuf, name: String, mut children: Vec<Entry>) -> Self {
        children.sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes));
        let size_bytes = children.iter().map(|c| c.size_bytes).sum();
        Self {
            id,
            path,
            name,
            kind: EntryKind::Directory,
            size_bytes,
            children,
            percent_of_total: 0.0,
        }
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Depth-first id lookup within this subtree.
    pub fn find(&self, id: EntryId) -> Option<&Entry> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    pub fn human_readable_size(&self) -> String {
        human_readable_size(self.size_bytes)
    }
}

pub fn human_readable_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;
    const TB: u64 = 1024 * GB;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
