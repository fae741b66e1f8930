use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::settings::Settings;
use crate::models::entry::{Entry, IdAllocator};
use crate::models::scan_result::{ScanResult, ScanRootError, ScanWarning, WarningKind};

use super::events::{Event, EventSender};
use super::progress::TopLevelProgress;

/// Cooperative cancellation signal shared across the scan fan-out. Writable
/// by the caller, read-only from every unit of work.
#[derive(Clone)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl Default for CancelFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// State shared by every unit of one scan. Apart from the cancel flag, the
/// warnings list and the top-level progress counter, all computation is
/// branch-local: each unit builds and returns its own subtree.
struct Shared {
    cancel: CancelFlag,
    ids: IdAllocator,
    settings: Settings,
    warnings: Mutex<Vec<ScanWarning>>,
    event_tx: EventSender,
}

impl Shared {
    fn warn(&self, path: PathBuf, kind: WarningKind, message: String) {
        tracing::warn!(path = %path.display(), %message, "entry skipped");
        let _ = self.event_tx.send(Event::ScanWarning {
            path: path.clone(),
            message: message.clone(),
        });
        self.warnings.lock().unwrap().push(ScanWarning {
            path,
            kind,
            message,
        });
    }
}

pub struct Scanner {
    shared: Arc<Shared>,
    progress: Arc<TopLevelProgress>,
}

impl Scanner {
    pub fn new(settings: Settings, event_tx: EventSender) -> Self {
        Self {
            shared: Arc::new(Shared {
                cancel: CancelFlag::new(),
                ids: IdAllocator::new(),
                settings,
                warnings: Mutex::new(Vec::new()),
                event_tx,
            }),
            progress: Arc::new(TopLevelProgress::new()),
        }
    }

    /// Handle for requesting cancellation; clone before awaiting `scan`.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.shared.cancel.clone()
    }

    pub fn progress(&self) -> &Arc<TopLevelProgress> {
        &self.progress
    }

    /// Measures the tree rooted at `root`. Resolves to `Ok(None)` when
    /// cancelled; a partial tree is never surfaced. Only a missing or
    /// unreadable root is an error.
    pub async fn scan(&self, root: PathBuf) -> Result<Option<ScanResult>, ScanRootError> {
        if self.shared.cancel.is_cancelled() {
            return Ok(None);
        }

        let meta = tokio::fs::symlink_metadata(&root).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ScanRootError::NotFound(root.clone())
            } else {
                ScanRootError::NotAccessible {
                    path: root.clone(),
                    source: e,
                }
            }
        })?;

        let _ = self.shared.event_tx.send(Event::ScanStarted { path: root.clone() });
        tracing::debug!(path = %root.display(), "scan started");

        let root_node = if meta.is_dir() {
            match self.scan_root_directory(root.clone()).await? {
                Some(node) => node,
                None => return Ok(None),
            }
        } else {
            let size = file_size(&meta, self.shared.settings.use_apparent_size);
            Entry::file(self.shared.ids.next(), root.clone(), display_name(&root), size)
        };

        let duration = self.progress.elapsed();
        let _ = self.shared.event_tx.send(Event::Progress {
            fraction: 1.0,
            current_name: root_node.name.clone(),
        });
        let _ = self.shared.event_tx.send(Event::ScanCompleted {
            total_size: root_node.size_bytes,
            duration_ms: duration.as_millis() as u64,
        });

        Ok(Some(ScanResult {
            total_size: root_node.size_bytes,
            scan_path: root,
            scan_duration: duration,
            warnings: self.shared.warnings.lock().unwrap().clone(),
            root: root_node,
        }))
    }

    /// The top directory level. Unlike deeper levels, enumeration failure
    /// here is fatal, and each immediate child reports progress when its
    /// whole subtree completes.
    async fn scan_root_directory(&self, root: PathBuf) -> Result<Option<Entry>, ScanRootError> {
        let io_result = {
            let path = root.clone();
            match tokio::task::spawn_blocking(move || read_dir_batch(&path)).await {
                Ok(res) => res,
                Err(e) => Err(std::io::Error::other(e)),
            }
        };
        let (entries, entry_errors) = match io_result {
            Ok(ok) => ok,
            Err(e) => {
                return Err(ScanRootError::NotAccessible {
                    path: root,
                    source: e,
                })
            }
        };
        for (path, message) in entry_errors {
            self.shared.warn(path, WarningKind::Io, message);
        }

        self.progress.set_total(entries.len());

        let mut handles = Vec::with_capacity(entries.len());
        for entry in entries {
            let shared = Arc::clone(&self.shared);
            let progress = Arc::clone(&self.progress);
            let name = entry.name.clone();
            handles.push(tokio::spawn(async move {
                let node = scan_entry(entry, Arc::clone(&shared)).await;
                if node.is_some() {
                    progress.complete_one(&name, &shared.event_tx);
                }
                node
            }));
        }

        let (children, interrupted) = self.join_children(&root, handles).await;
        if interrupted || self.shared.cancel.is_cancelled() {
            return Ok(None);
        }
        Ok(Some(Entry::directory(
            self.shared.ids.next(),
            root.clone(),
            display_name(&root),
            children,
        )))
    }

    async fn join_children(
        &self,
        parent: &Path,
        handles: Vec<tokio::task::JoinHandle<Option<Entry>>>,
    ) -> (Vec<Entry>, bool) {
        let mut children = Vec::with_capacity(handles.len());
        let mut interrupted = false;
        for handle in handles {
            match handle.await {
                Ok(Some(node)) => children.push(node),
                Ok(None) => interrupted = true,
                Err(e) => self.shared.warn(
                    parent.to_path_buf(),
                    WarningKind::Other,
                    format!("task join error: {e}"),
                ),
            }
        }
        (children, interrupted)
    }
}

/// Collected directory entry from batch I/O.
struct DirEntryData {
    path: PathBuf,
    name: String,
    metadata: std::fs::Metadata,
}

/// Read all entries and their metadata from a directory in one blocking call.
/// Returns (entries, entry_errors) or an error if the directory itself can't
/// be read. Entries come back in enumeration order, which is what breaks size
/// ties after the descending sort.
fn read_dir_batch(
    dir_path: &Path,
) -> std::io::Result<(Vec<DirEntryData>, Vec<(PathBuf, String)>)> {
    let mut entries = Vec::new();
    let mut errors = Vec::new();

    for entry_result in std::fs::read_dir(dir_path)? {
        match entry_result {
            Ok(entry) => {
                let entry_path = entry.path();
                let entry_name = entry.file_name().to_string_lossy().to_string();
                match std::fs::symlink_metadata(&entry_path) {
                    Ok(meta) => entries.push(DirEntryData {
                        path: entry_path,
                        name: entry_name,
                        metadata: meta,
                    }),
                    Err(e) => errors.push((entry_path, e.to_string())),
                }
            }
            Err(e) => errors.push((dir_path.to_path_buf(), e.to_string())),
        }
    }

    Ok((entries, errors))
}

/// One concurrent unit of work: turns a single enumerated child into its
/// finished subtree, or `None` once cancellation is observed.
async fn scan_entry(data: DirEntryData, shared: Arc<Shared>) -> Option<Entry> {
    if shared.cancel.is_cancelled() {
        return None;
    }

    if data.metadata.file_type().is_dir() {
        if shared.settings.is_bundle_name(&data.name) {
            return scan_bundle(data, shared).await;
        }
        return scan_directory(data.path, data.name, shared).await;
    }

    // Files, symlinks and special nodes are leaves, sized from the lstat
    // metadata already in hand. Symlinks are never followed.
    let size = file_size(&data.metadata, shared.settings.use_apparent_size);
    Some(Entry::file(shared.ids.next(), data.path, data.name, size))
}

/// A bundle is measured as one atomic unit: a synchronous recursive byte sum
/// on the blocking pool, no further concurrent fan-out, surfaced as a leaf.
async fn scan_bundle(data: DirEntryData, shared: Arc<Shared>) -> Option<Entry> {
    let path = data.path.clone();
    let cancel = shared.cancel.clone();
    let apparent = shared.settings.use_apparent_size;
    let size = match tokio::task::spawn_blocking(move || bundle_size(&path, &cancel, apparent)).await
    {
        Ok(Some(size)) => size,
        Ok(None) => return None,
        Err(e) => {
            shared.warn(
                data.path.clone(),
                WarningKind::Other,
                format!("task join error: {e}"),
            );
            0
        }
    };
    Some(Entry::bundle(shared.ids.next(), data.path, data.name, size))
}

fn scan_directory(
    path: PathBuf,
    name: String,
    shared: Arc<Shared>,
) -> Pin<Box<dyn Future<Output = Option<Entry>> + Send>> {
    Box::pin(async move {
        if shared.cancel.is_cancelled() {
            return None;
        }

        let io_result = {
            let path = path.clone();
            match tokio::task::spawn_blocking(move || read_dir_batch(&path)).await {
                Ok(res) => res,
                Err(e) => Err(std::io::Error::other(e)),
            }
        };
        let (entries, entry_errors) = match io_result {
            Ok(ok) => ok,
            Err(e) => {
                // Unreadable directory degrades to a zero-size empty node
                // instead of aborting its ancestors.
                shared.warn(path.clone(), WarningKind::from_io(&e), e.to_string());
                return Some(Entry::directory(shared.ids.next(), path, name, Vec::new()));
            }
        };
        for (err_path, message) in entry_errors {
            shared.warn(err_path, WarningKind::Io, message);
        }

        if shared.cancel.is_cancelled() {
            return None;
        }

        let mut handles = Vec::with_capacity(entries.len());
        for entry in entries {
            handles.push(tokio::spawn(scan_entry(entry, Arc::clone(&shared))));
        }

        // Structured join: this node is finalized only after every spawned
        // child resolves, and the reduction is single-threaded right here.
        let mut children = Vec::with_capacity(handles.len());
        let mut interrupted = false;
        for handle in handles {
            match handle.await {
                Ok(Some(node)) => children.push(node),
                Ok(None) => interrupted = true,
                Err(e) => shared.warn(
                    path.clone(),
                    WarningKind::Other,
                    format!("task join error: {e}"),
                ),
            }
        }
        if interrupted || shared.cancel.is_cancelled() {
            return None;
        }

        Some(Entry::directory(shared.ids.next(), path, name, children))
    })
}

/// Recursive synchronous byte sum for bundle contents. Checks the cancel
/// flag per directory level; unreadable pieces count as zero.
fn bundle_size(path: &Path, cancel: &CancelFlag, apparent: bool) -> Option<u64> {
    if cancel.is_cancelled() {
        return None;
    }
    let entries = match std::fs::read_dir(path) {
        Ok(entries) => entries,
        Err(_) => return Some(0),
    };
    let mut total = 0u64;
    for entry in entries.flatten() {
        let entry_path = entry.path();
        let meta = match std::fs::symlink_metadata(&entry_path) {
            Ok(meta) => meta,
            Err(_) => continue,
        };
        if meta.file_type().is_dir() {
            total += bundle_size(&entry_path, cancel, apparent)?;
        } else {
            total += file_size(&meta, apparent);
        }
    }
    Some(total)
}

/// Allocated on-disk size, falling back to logical length where block counts
/// are unavailable (or when apparent sizing is requested).
fn file_size(meta: &std::fs::Metadata, apparent: bool) -> u64 {
    if apparent {
        return meta.len();
    }
    #[cfg(unix)]
    {
        std::os::unix::fs::MetadataExt::blocks(meta) * 512
    }
    #[cfg(not(unix))]
    {
        meta.len()
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}
