//! Progress line layout.
//!
//! ```text
//! ⣷ [Preparing your order][====================>..........][10mins]
//! ```

use crate::model::TrackingSnapshot;

/// Brackets, spaces and the spinner glyph around the bar.
const CHROME_WIDTH: usize = 8;

pub const SPINNER_FRAMES: [&str; 8] = ["⣷", "⣯", "⣟", "⡿", "⢿", "⣻", "⣽", "⣾"];

/// Cycles through the first six frames only; the index wraps at `len - 2`.
#[derive(Debug, Default)]
pub struct Spinner {
    index: usize,
}

impl Spinner {
    pub fn next_frame(&mut self) -> &'static str {
        let frame = SPINNER_FRAMES[self.index];
        self.index += 1;
        if self.index == SPINNER_FRAMES.len() - 2 {
            self.index = 0;
        }
        frame
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarLayout {
    /// Columns between the bar's brackets. Zero when the terminal is too narrow.
    pub width: usize,
    /// Columns drawn as `=`; the `>` head sits at this index.
    pub filled: usize,
}

impl BarLayout {
    pub fn compute(term_width: usize, title: &str, eta: &str, progress_percent: u8) -> Self {
        let reserved = title.chars().count() + eta.chars().count() + CHROME_WIDTH;
        let width = term_width.saturating_sub(reserved);
        let filled = width * usize::from(progress_percent.min(100)) / 100;
        Self { width, filled }
    }

    pub fn render(&self) -> String {
        (0..self.width)
            .map(|i| {
                if i < self.filled {
                    '='
                } else if i == self.filled {
                    '>'
                } else {
                    '.'
                }
            })
            .collect()
    }
}

/// One full frame, ending in a carriage return so the next frame overwrites it.
pub fn render_line(glyph: &str, snapshot: &TrackingSnapshot, term_width: usize) -> String {
    let eta = snapshot.eta();
    let layout = BarLayout::compute(term_width, &snapshot.title, &eta, snapshot.progress_percent);
    format!(
        "{glyph} [{}][{}][{eta}]\r",
        snapshot.title,
        layout.render()
    )
}
