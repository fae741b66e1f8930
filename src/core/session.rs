use std::path::PathBuf;

use tokio::task::JoinHandle;

use crate::config::settings::Settings;
use crate::models::scan_result::{ScanResult, ScanRootError};

use super::events::EventSender;
use super::scanner::{CancelFlag, Scanner};

type ScanTask = JoinHandle<Result<Option<ScanResult>, ScanRootError>>;

/// Owns at most one in-flight scan. Starting a new scan supersedes the
/// previous one: its cancellation is requested and its task awaited to
/// termination before any new filesystem work begins.
pub struct ScanSession {
    settings: Settings,
    event_tx: EventSender,
    current: Option<ActiveScan>,
}

struct ActiveScan {
    cancel: CancelFlag,
    task: ScanTask,
}

impl ScanSession {
    pub fn new(settings: Settings, event_tx: EventSender) -> Self {
        Self {
            settings,
            event_tx,
            current: None,
        }
    }

    pub async fn start(&mut self, path: PathBuf) {
        if let Some(prev) = self.current.take() {
            prev.cancel.request();
            if let Err(e) = prev.task.await {
                tracing::error!("superseded scan task panicked: {e}");
            }
        }
        // Fresh scanner per scan: fresh ids, fresh progress, fresh warnings.
        let scanner = Scanner::new(self.settings.clone(), self.event_tx.clone());
        let cancel = scanner.cancel_flag();
        let task = tokio::spawn(async move { scanner.scan(path).await });
        self.current = Some(ActiveScan { cancel, task });
    }

    pub fn cancel(&self) {
        if let Some(active) = &self.current {
            active.cancel.request();
        }
    }

    pub fn is_scanning(&self) -> bool {
        self.current.is_some()
    }

    /// Resolves the current scan: the completed result, `Ok(None)` if it was
    /// cancelled, or `None` when no scan is in flight.
    pub async fn wait(&mut self) -> Option<Result<Option<ScanResult>, ScanRootError>> {
        let active = self.current.take()?;
        match active.task.await {
            Ok(res) => Some(res),
            Err(e) => {
                tracing::error!("scan task panicked: {e}");
                Some(Ok(None))
            }
        }
    }
}
