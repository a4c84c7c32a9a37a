//! Cursor hiding and interrupt handling.
//!
//! The cursor is hidden for the lifetime of a run and must be shown again
//! exactly once, whichever path ends the process.

use crossterm::{cursor, execute};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// How long the interrupt handler waits for the main task to wind down
/// before restoring the terminal itself.
pub(crate) const INTERRUPT_GRACE: Duration = Duration::from_millis(500);

pub(crate) struct CursorGuard {
    out: Mutex<Box<dyn Write + Send>>,
    restored: AtomicBool,
}

impl CursorGuard {
    /// Hide the cursor on stdout.
    pub fn hide() -> Arc<Self> {
        Self::hide_on(Box::new(io::stdout()))
    }

    pub fn hide_on(mut out: Box<dyn Write + Send>) -> Arc<Self> {
        execute!(out, cursor::Hide).ok();
        Arc::new(Self {
            out: Mutex::new(out),
            restored: AtomicBool::new(false),
        })
    }

    /// Show the cursor again. Later calls are no-ops.
    pub fn restore(&self) {
        if self.restored.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Ok(mut out) = self.out.lock() {
            execute!(out, cursor::Show).ok();
        }
    }
}

impl Drop for CursorGuard {
    fn drop(&mut self) {
        self.restore();
    }
}

/// Turn Ctrl-C into a shutdown request.
///
/// If the main task is stuck on something that cannot observe `shutdown`
/// (the blocking cookie prompt), the handler restores the cursor and exits
/// after `grace`.
pub(crate) fn spawn_interrupt_handler(
    shutdown: CancellationToken,
    cursor: Arc<CursorGuard>,
    grace: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = shutdown.cancelled() => return,
            res = tokio::signal::ctrl_c() => {
                if let Err(e) = res {
                    tracing::warn!(event = "shutdown.signal_unavailable", error = %e);
                    return;
                }
            }
        }
        tracing::info!(event = "shutdown.interrupted");
        shutdown.cancel();

        tokio::time::sleep(grace).await;
        cursor.restore();
        println!();
        std::process::exit(0);
    })
}
