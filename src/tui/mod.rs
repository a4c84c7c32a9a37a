mod bar;

use bar::{render_line, Spinner};

use crate::console::ConsoleLock;
use crate::error::TrackerResult;
use crate::model::{TerminalState, TrackingSnapshot};
use crate::snapshot::SnapshotReader;
use crossterm::{
    queue,
    terminal::{Clear, ClearType},
};
use std::io::Write;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

const FALLBACK_WIDTH: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Delivered,
    Interrupted,
}

/// Current terminal width in columns.
pub fn terminal_width() -> usize {
    match crossterm::terminal::size() {
        Ok((cols, _)) => cols as usize,
        Err(e) => {
            tracing::debug!(event = "tui.size_unavailable", error = %e);
            FALLBACK_WIDTH
        }
    }
}

/// Redraws the progress line in place until the order is delivered.
pub struct ProgressRenderer<W, F> {
    out: W,
    width: F,
    spinner: Spinner,
    console: ConsoleLock,
}

impl<W, F> ProgressRenderer<W, F>
where
    W: Write,
    F: FnMut() -> usize,
{
    pub fn new(out: W, width: F) -> Self {
        Self {
            out,
            width,
            spinner: Spinner::default(),
            console: ConsoleLock::default(),
        }
    }

    /// Skip frames while `console` is held by someone else.
    pub fn with_console_lock(mut self, console: ConsoleLock) -> Self {
        self.console = console;
        self
    }

    /// Draw one frame for `snapshot`, or the completion message once delivered.
    pub fn draw(&mut self, snapshot: &TrackingSnapshot) -> TrackerResult<TerminalState> {
        let state = snapshot.terminal_state();
        match state {
            TerminalState::Delivered => {
                queue!(self.out, Clear(ClearType::CurrentLine))?;
                writeln!(self.out, "\rYour order has been delivered. Enjoy your meal!")?;
            }
            TerminalState::Ongoing => {
                let glyph = self.spinner.next_frame();
                let line = render_line(glyph, snapshot, (self.width)());
                write!(self.out, "{line}")?;
            }
        }
        self.out.flush()?;
        Ok(state)
    }

    /// Draw a frame unless the console is taken; `None` means the tick was skipped.
    fn tick(
        &mut self,
        console: &ConsoleLock,
        reader: &SnapshotReader,
    ) -> TrackerResult<Option<TerminalState>> {
        let Some(_frame) = console.try_frame() else {
            return Ok(None);
        };
        let snapshot = reader.current();
        self.draw(&snapshot).map(Some)
    }

    /// Render every `interval` until delivery or shutdown.
    ///
    /// Ticks that land while a prompt owns the console are dropped; drawing
    /// resumes on the first tick after it is released.
    pub async fn run(
        mut self,
        reader: SnapshotReader,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> TrackerResult<RenderOutcome> {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let console = self.console.clone();

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    // Leave the last frame visible above the shell prompt.
                    writeln!(self.out).ok();
                    return Ok(RenderOutcome::Interrupted);
                }
                _ = ticker.tick() => {
                    if self.tick(&console, &reader)? == Some(TerminalState::Delivered) {
                        tracing::info!(event = "tui.delivered");
                        return Ok(RenderOutcome::Delivered);
                    }
                }
            }
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}
