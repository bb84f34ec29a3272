//! Per-instance playback over a shared [`SpriteSheet`].
//!
//! The cursor keeps a fractional frame position that advances by `fps * dt`
//! each tick. All visual indexing uses `floor(frame)`, so sub-frame deltas
//! accumulate without marking the cursor dirty; only a change of the floored
//! index does.
//!
//! State machine: {playing, paused} x {running, finished}. `play` / `pause`
//! flip the first axis only. `advance` on a non-looping cursor can move
//! running -> finished, never back. `set_state` rewinds to the state's first
//! frame but leaves `finished` alone.
//!
//! Like the sheet itself, the cursor never stores a reference to its sheet;
//! callers pass it in, which keeps the cursor `Copy` and borrow-free.

use glam::Vec2;

use crate::sheet::SpriteSheet;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackCursor {
    state: u32,
    frame: f32,
    fps: f32,
    looping: bool,
    playing: bool,
    finished: bool,
    dirty: bool,
    offset: Vec2,
}

impl PlaybackCursor {
    /// Starts at frame 0 of state 0, playing, and dirty so the first draw
    /// pushes the initial frame.
    pub fn new(sheet: &SpriteSheet) -> Self {
        Self {
            state: 0,
            frame: 0.0,
            fps: sheet.fps(),
            looping: sheet.looping(),
            playing: true,
            finished: false,
            dirty: true,
            offset: Vec2::ZERO,
        }
    }

    /// Advance by `dt` seconds.
    pub fn advance(&mut self, dt: f32, sheet: &SpriteSheet) {
        if self.finished || self.fps == 0.0 || !self.playing {
            return;
        }

        let old_index = self.frame.floor();
        let (start, end) = sheet.state_range(self.state);
        self.frame += self.fps * dt;

        if self.frame.floor() >= end {
            if self.looping {
                // Keep the overshoot so uneven frame times still loop smoothly.
                self.frame = start + (self.frame - start) % (end - start);
            } else {
                self.finished = true;
                self.frame = end - 1.0;
            }
        }

        if self.frame.floor() != old_index {
            if let Some(offset) = sheet.frame_offset(self.frame) {
                self.offset = offset;
            }
            self.dirty = true;
        }
    }

    pub fn set_frame(&mut self, frame: f32) {
        if frame != self.frame {
            self.frame = frame;
            self.dirty = true;
        }
    }

    /// Jump to the first frame of `state`. Out-of-range states are ignored.
    pub fn set_state(&mut self, state: u32, sheet: &SpriteSheet) {
        if state == self.state {
            return;
        }
        if state >= sheet.state_count() {
            log::warn!(
                "Ignoring state {} for sprite '{}' ({} states)",
                state,
                sheet.sprite_type(),
                sheet.state_count()
            );
            return;
        }
        self.state = state;
        self.frame = sheet.state_range(state).0;
        self.dirty = true;
    }

    pub fn set_fps(&mut self, fps: f32) {
        self.fps = fps;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    /// Recompute the pixel offset from `floor(frame)`. Returns the offset when
    /// the sheet is loaded.
    pub fn refresh_offset(&mut self, sheet: &SpriteSheet) -> Option<Vec2> {
        let offset = sheet.frame_offset(self.frame)?;
        self.offset = offset;
        Some(offset)
    }

    /// Force the next draw to push the sprite offset again.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    pub fn frame(&self) -> f32 {
        self.frame
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }
}
