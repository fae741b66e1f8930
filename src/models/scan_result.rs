use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entry::Entry;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub root: Entry,
    pub total_size: u64,
    pub scan_path: PathBuf,
    pub scan_duration: Duration,
    /// Entries that could not be measured and were recorded as zero/empty.
    pub warnings: Vec<ScanWarning>,
}

/// A recovered per-entry failure. The affected entry is sized as zero/empty
/// rather than aborting its ancestors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanWarning {
    pub path: PathBuf,
    pub kind: WarningKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    PermissionDenied,
    NotFound,
    Io,
    Other,
}

impl WarningKind {
    pub fn from_io(e: &std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::PermissionDenied => WarningKind::PermissionDenied,
            std::io::ErrorKind::NotFound => WarningKind::NotFound,
            _ => WarningKind::Io,
        }
    }
}

/// The only scan failures that cross the core boundary: the root itself could
/// not be scanned. Everything below the root degrades to warnings.
#[derive(Debug, Error)]
pub enum ScanRootError {
    #[error("scan root not found: {0}")]
    NotFound(PathBuf),
    #[error("scan root not accessible: {path}: {source}")]
    NotAccessible {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
