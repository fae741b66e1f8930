use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::entry::Entry;

/// External "move item to trash" capability. The core never deletes anything
/// itself; on success the caller is expected to rescan, since the in-memory
/// tree is not patched.
pub trait TrashProvider {
    fn move_to_trash(&self, path: &Path) -> Result<(), TrashError>;
}

#[derive(Debug, Error)]
#[error("could not move {path} to trash: {reason}")]
pub struct TrashError {
    pub path: PathBuf,
    pub reason: String,
}

/// Delegates an entry's path to the provider. A failure is reported to the
/// caller and leaves the tree untouched.
pub fn request_trash(provider: &dyn TrashProvider, entry: &Entry) -> Result<(), TrashError> {
    provider.move_to_trash(&entry.path)
}
