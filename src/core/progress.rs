use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::events::{Event, EventSender};

/// Progress for one scan, counted over the root's immediate children only:
/// each child contributes exactly one increment when its whole subtree
/// finishes, no matter how deep it was.
pub struct TopLevelProgress {
    total: AtomicUsize,
    completed: AtomicUsize,
    /// High-water mark of emitted counts. Checked and advanced under the
    /// same lock as the channel send, so concurrent completions can neither
    /// regress the emitted fraction nor reorder events on the stream.
    last_emitted: Mutex<usize>,
    start_time: Instant,
}

impl TopLevelProgress {
    pub fn new() -> Self {
        Self {
            total: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            last_emitted: Mutex::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn set_total(&self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    pub fn fraction(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.completed() as f64 / total as f64
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Records one finished top-level child and emits a progress event if the
    /// fraction strictly increased. The terminal 1.0 event is the scanner's
    /// to send, after the full tree is assembled, so a fraction of 1.0 is
    /// never emitted from here.
    pub fn complete_one(&self, name: &str, event_tx: &EventSender) {
        let done = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        let total = self.total.load(Ordering::Relaxed);
        if total == 0 || done >= total {
            return;
        }
        let mut last = self.last_emitted.lock().unwrap();
        if done > *last {
            *last = done;
            let _ = event_tx.send(Event::Progress {
                fraction: done as f64 / total as f64,
                current_name: name.to_string(),
            });
        }
    }
}

impl Default for TopLevelProgress {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::events::create_event_channel;

    #[test]
    fn emits_strictly_increasing_counts_below_total() {
        let (tx, mut rx) = create_event_channel();
        let progress = TopLevelProgress::new();
        progress.set_total(3);
        progress.complete_one("a", &tx);
        progress.complete_one("b", &tx);
        // The final count is the scanner's terminal event, not ours.
        progress.complete_one("c", &tx);
        drop(tx);

        let mut fractions = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let Event::Progress { fraction, .. } = event {
                fractions.push(fraction);
            }
        }
        assert_eq!(fractions.len(), 2);
        assert!(fractions[0] < fractions[1]);
        assert!(fractions.iter().all(|f| *f < 1.0));
        assert_eq!(progress.completed(), 3);
        assert!((progress.fraction() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn zero_total_emits_nothing() {
        let (tx, mut rx) = create_event_channel();
        let progress = TopLevelProgress::new();
        progress.complete_one("a", &tx);
        drop(tx);
        assert!(rx.try_recv().is_err());
        assert_eq!(progress.fraction(), 0.0);
    }
}
