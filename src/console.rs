//! Ownership of the operator's terminal.
//!
//! The progress line and the cookie prompt both write to the same terminal.
//! The prompt holds the console for as long as the operator is typing; the
//! renderer only draws a frame when it can take the console without waiting.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};

#[derive(Debug, Clone, Default)]
pub struct ConsoleLock(Arc<Mutex<()>>);

impl ConsoleLock {
    /// Run `f` with the console to itself, waiting for any frame being drawn.
    pub fn exclusive<R>(&self, f: impl FnOnce() -> R) -> R {
        let _held = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }

    /// Claim the console for one frame, or `None` while a prompt holds it.
    pub fn try_frame(&self) -> Option<MutexGuard<'_, ()>> {
        match self.0.try_lock() {
            Ok(guard) => Some(guard),
            Err(TryLockError::Poisoned(p)) => Some(p.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn frames_are_refused_while_held() {
        let console = ConsoleLock::default();
        assert!(console.try_frame().is_some());

        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let held = console.clone();
        let worker = std::thread::spawn(move || {
            held.exclusive(|| {
                entered_tx.send(()).unwrap();
                release_rx.recv().unwrap();
            })
        });

        entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(console.try_frame().is_none());

        release_tx.send(()).unwrap();
        worker.join().unwrap();
        assert!(console.try_frame().is_some());
    }

    #[test]
    fn exclusive_returns_closure_value() {
        let console = ConsoleLock::default();
        assert_eq!(console.exclusive(|| 7), 7);
    }
}
