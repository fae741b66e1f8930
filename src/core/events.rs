use std::path::PathBuf;
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub enum Event {
    ScanStarted {
        path: PathBuf,
    },
    /// Emitted when a top-level child finishes; `fraction` is strictly
    /// increasing within one scan and reaches 1.0 only on completion.
    Progress {
        fraction: f64,
        current_name: String,
    },
    ScanWarning {
        path: PathBuf,
        message: String,
    },
    ScanCompleted {
        total_size: u64,
        duration_ms: u64,
    },
}

pub type EventSender = mpsc::UnboundedSender<Event>;
pub type EventReceiver = mpsc::UnboundedReceiver<Event>;

pub fn create_event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
