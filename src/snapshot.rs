//! Latest tracking snapshot shared between the poller and the renderer.
//!
//! Snapshots are immutable and swapped whole behind an `Arc`, so a reader
//! holds either the previous value or the new one, never a mix.

use crate::model::TrackingSnapshot;
use std::sync::Arc;
use tokio::sync::watch;

/// Write side, owned by the poller.
#[derive(Debug)]
pub struct SnapshotPublisher {
    tx: watch::Sender<Arc<TrackingSnapshot>>,
}

/// Read side, cheap to clone.
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    rx: watch::Receiver<Arc<TrackingSnapshot>>,
}

pub fn channel(initial: TrackingSnapshot) -> (SnapshotPublisher, SnapshotReader) {
    let (tx, rx) = watch::channel(Arc::new(initial));
    (SnapshotPublisher { tx }, SnapshotReader { rx })
}

impl SnapshotPublisher {
    /// Replace the shared snapshot. Succeeds even with no readers left.
    pub fn publish(&self, snapshot: TrackingSnapshot) {
        self.tx.send_replace(Arc::new(snapshot));
    }
}

impl SnapshotReader {
    pub fn current(&self) -> Arc<TrackingSnapshot> {
        self.rx.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(i: i64) -> TrackingSnapshot {
        // Every field derives from `i` so a torn read would be detectable.
        TrackingSnapshot::new(format!("step {i}"), i % 101, i.to_string(), format!("unit{i}"))
    }

    fn is_consistent(s: &TrackingSnapshot) -> Option<i64> {
        let i: i64 = s.title.strip_prefix("step ")?.parse().ok()?;
        let ok = s.progress_percent as i64 == i % 101
            && s.eta_text == i.to_string()
            && s.eta_unit == format!("unit{i}");
        ok.then_some(i)
    }

    #[test]
    fn reader_sees_latest_publish() {
        let (tx, rx) = channel(snap(0));
        assert_eq!(rx.current().title, "step 0");
        tx.publish(snap(7));
        assert_eq!(rx.current().title, "step 7");
        assert_eq!(rx.clone().current().title, "step 7");
    }

    #[test]
    fn publish_without_readers_does_not_fail() {
        let (tx, rx) = channel(snap(0));
        drop(rx);
        tx.publish(snap(1));
    }

    #[test]
    fn concurrent_reads_only_observe_whole_snapshots_in_order() {
        const WRITES: i64 = 5_000;
        let (tx, rx) = channel(snap(0));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let rx = rx.clone();
                std::thread::spawn(move || {
                    let mut last = 0;
                    loop {
                        let current = rx.current();
                        let i = is_consistent(&current).expect("torn snapshot");
                        assert!(i >= last, "went backwards: {i} < {last}");
                        last = i;
                        if i == WRITES {
                            break;
                        }
                    }
                })
            })
            .collect();

        for i in 1..=WRITES {
            tx.publish(snap(i));
        }
        for r in readers {
            r.join().unwrap();
        }
    }
}
