//! The animation sequence: an ordered, cyclically indexed list of frames.

use rgb::RGB8;

use crate::konst::LED_COUNT;

/// How a frame's colors are reached from the previous state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Switch to the colors at once, then hold for the delay.
    Immediate,
    /// Crossfade towards the *next* frame's colors over the delay.
    Interpolated,
}

/// One step of the roll. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub colors: [RGB8; LED_COUNT],
    pub delay_ms: u32,
    pub transition: Transition,
}

/// The parsed roll plus its replay cursor. Owned exclusively by the
/// animation thread.
#[derive(Debug)]
pub struct Roll {
    frames: Vec<Frame>,
    cursor: usize,
}

impl Roll {
    /// The config loader guarantees at least one frame.
    pub fn new(frames: Vec<Frame>) -> Self {
        assert!(!frames.is_empty());
        Self { frames, cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Yields the current frame and its successor, then moves the cursor
    /// forward one step (wrapping).
    pub fn advance(&mut self) -> (&Frame, &Frame) {
        let current = self.cursor;
        self.cursor = (self.cursor + 1) % self.frames.len();
        (&self.frames[current], &self.frames[self.cursor])
    }
}
