//! Spritesheet resources: one uniform-grid image shared by every instance of a
//! sprite type.
//!
//! A sheet is split into `states` equal runs of frames (e.g. idle / run), laid
//! out row-major across the image. Everything that depends on the image's pixel
//! size (frames per row, background size) is unknown until the image finishes
//! loading, so those values live in an `Option<SheetGeometry>` that flips to
//! `Some` exactly once via [`SpriteSheet::mark_loaded`].

use glam::Vec2;
use serde::Deserialize;

/// Registration data for one sprite type. The image locator and tile size are
/// resolved outside the engine (usually from the asset manifest).
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SpriteSheetDef {
    #[serde(rename = "type")]
    pub sprite_type: String,
    pub image: String,
    pub tile_width: u32,
    pub tile_height: u32,
    pub frames: u32,
    pub fps: f32,
    #[serde(default)]
    pub looping: bool,
    #[serde(default = "default_states")]
    pub states: u32,
}

impl SpriteSheetDef {
    pub fn new(
        sprite_type: &str,
        image: &str,
        tile_size: (u32, u32),
        frames: u32,
        fps: f32,
        looping: bool,
    ) -> Self {
        Self {
            sprite_type: sprite_type.to_string(),
            image: image.to_string(),
            tile_width: tile_size.0,
            tile_height: tile_size.1,
            frames,
            fps,
            looping,
            states: 1,
        }
    }

    pub fn with_states(mut self, states: u32) -> Self {
        self.states = states;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.sprite_type.is_empty() {
            return Err("Sprite validation failed: type is empty".to_string());
        }
        if self.tile_width == 0 || self.tile_height == 0 {
            return Err(format!(
                "Sprite validation failed: '{}' tile width/height must be > 0",
                self.sprite_type
            ));
        }
        if self.frames == 0 {
            return Err(format!(
                "Sprite validation failed: '{}' has no frames",
                self.sprite_type
            ));
        }
        if self.states == 0 {
            return Err(format!(
                "Sprite validation failed: '{}' has zero states",
                self.sprite_type
            ));
        }
        if self.frames % self.states != 0 {
            return Err(format!(
                "Sprite validation failed: '{}' has {} frames which do not split evenly into {} states",
                self.sprite_type, self.frames, self.states
            ));
        }
        if !self.fps.is_finite() || self.fps < 0.0 {
            return Err(format!(
                "Sprite validation failed: '{}' fps must be a finite value >= 0",
                self.sprite_type
            ));
        }
        Ok(())
    }
}

/// Pixel geometry of a loaded sheet image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetGeometry {
    pub width: u32,
    pub height: u32,
    pub frames_per_row: u32,
}

#[derive(Debug, Clone)]
pub struct SpriteSheet {
    def: SpriteSheetDef,
    frames_per_state: u32,
    geometry: Option<SheetGeometry>,
}

impl SpriteSheet {
    pub fn new(def: SpriteSheetDef) -> Result<Self, String> {
        def.validate()?;
        let frames_per_state = def.frames / def.states;
        Ok(Self {
            def,
            frames_per_state,
            geometry: None,
        })
    }

    pub fn sprite_type(&self) -> &str {
        &self.def.sprite_type
    }

    pub fn image(&self) -> &str {
        &self.def.image
    }

    pub fn tile_size(&self) -> Vec2 {
        Vec2::new(self.def.tile_width as f32, self.def.tile_height as f32)
    }

    pub fn frame_count(&self) -> u32 {
        self.def.frames
    }

    pub fn state_count(&self) -> u32 {
        self.def.states
    }

    pub fn frames_per_state(&self) -> u32 {
        self.frames_per_state
    }

    pub fn fps(&self) -> f32 {
        self.def.fps
    }

    pub fn looping(&self) -> bool {
        self.def.looping
    }

    pub fn is_loaded(&self) -> bool {
        self.geometry.is_some()
    }

    pub fn geometry(&self) -> Option<SheetGeometry> {
        self.geometry
    }

    /// Full image size in pixels, once loaded.
    pub fn sheet_size(&self) -> Option<Vec2> {
        self.geometry.map(|g| Vec2::new(g.width as f32, g.height as f32))
    }

    /// First frame index of `state` and the exclusive end of its range.
    pub fn state_range(&self, state: u32) -> (f32, f32) {
        let start = (state * self.frames_per_state) as f32;
        (start, start + self.frames_per_state as f32)
    }

    /// Record the decoded image size. Returns `Ok(true)` on the single
    /// unloaded -> loaded transition and `Ok(false)` if already loaded.
    pub fn mark_loaded(&mut self, width: u32, height: u32) -> Result<bool, String> {
        if self.geometry.is_some() {
            return Ok(false);
        }
        let frames_per_row = width / self.def.tile_width;
        let rows = height / self.def.tile_height;
        if frames_per_row == 0 || rows == 0 {
            return Err(format!(
                "Sprite '{}' image {}x{} is smaller than one {}x{} tile",
                self.def.sprite_type, width, height, self.def.tile_width, self.def.tile_height
            ));
        }
        if frames_per_row * rows < self.def.frames {
            log::warn!(
                "Sprite '{}' image holds {} tiles but {} frames were declared",
                self.def.sprite_type,
                frames_per_row * rows,
                self.def.frames
            );
        }
        self.geometry = Some(SheetGeometry {
            width,
            height,
            frames_per_row,
        });
        Ok(true)
    }

    /// Negative top-left pixel offset of `floor(frame)` within the sheet.
    /// `None` until the image has loaded.
    pub fn frame_offset(&self, frame: f32) -> Option<Vec2> {
        let geometry = self.geometry?;
        let per_row = geometry.frames_per_row as f32;
        let index = frame.max(0.0).floor();
        let column = index % per_row;
        let row = (index / per_row).floor();
        Some(-Vec2::new(column, row) * self.tile_size())
    }
}

const fn default_states() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walker() -> SpriteSheet {
        SpriteSheet::new(
            SpriteSheetDef::new("walker", "walker.png", (16, 24), 8, 10.0, true).with_states(2),
        )
        .expect("valid sheet")
    }

    #[test]
    fn frames_per_state_is_known_before_load() {
        let sheet = walker();
        assert!(!sheet.is_loaded());
        assert_eq!(sheet.frames_per_state(), 4);
        assert_eq!(sheet.state_range(1), (4.0, 8.0));
        assert!(sheet.geometry().is_none());
        assert!(sheet.frame_offset(3.0).is_none());
    }

    #[test]
    fn mark_loaded_transitions_once() {
        let mut sheet = walker();
        assert_eq!(sheet.mark_loaded(64, 48), Ok(true));
        assert_eq!(sheet.mark_loaded(128, 128), Ok(false));

        let geometry = sheet.geometry().expect("loaded");
        assert_eq!(geometry.width, 64);
        assert_eq!(geometry.frames_per_row, 4);
        assert_eq!(sheet.sheet_size(), Some(Vec2::new(64.0, 48.0)));
    }

    #[test]
    fn mark_loaded_rejects_image_smaller_than_tile() {
        let mut sheet = walker();
        let err = sheet.mark_loaded(8, 48).expect_err("too narrow");
        assert!(err.contains("smaller than one"));
        assert!(!sheet.is_loaded());
    }

    #[test]
    fn frame_offset_walks_rows() {
        let mut sheet = walker();
        sheet.mark_loaded(64, 48).expect("load");

        assert_eq!(sheet.frame_offset(0.0), Some(Vec2::new(0.0, 0.0)));
        assert_eq!(sheet.frame_offset(2.7), Some(Vec2::new(-32.0, 0.0)));
        assert_eq!(sheet.frame_offset(5.0), Some(Vec2::new(-16.0, -24.0)));
    }

    #[test]
    fn frame_offset_handles_huge_frames() {
        let mut sheet = SpriteSheet::new(SpriteSheetDef::new(
            "strip",
            "strip.png",
            (16, 16),
            4,
            8.0,
            true,
        ))
        .expect("valid sheet");
        sheet.mark_loaded(64, 16).expect("load");

        let offset = sheet.frame_offset(3.0e9).expect("loaded");
        assert_eq!(offset, Vec2::new(0.0, -7.5e8 * 16.0));
        assert!(offset.is_finite());
    }

    #[test]
    fn validate_rejects_uneven_states() {
        let def = SpriteSheetDef::new("bad", "bad.png", (8, 8), 5, 4.0, false).with_states(2);
        let err = SpriteSheet::new(def).expect_err("uneven split");
        assert!(err.contains("do not split evenly"));
    }

    #[test]
    fn validate_rejects_zero_tile() {
        let def = SpriteSheetDef::new("bad", "bad.png", (0, 8), 4, 4.0, false);
        let err = def.validate().expect_err("zero tile");
        assert!(err.contains("tile width/height"));
    }

    #[test]
    fn def_deserializes_with_defaults() {
        let def: SpriteSheetDef = serde_json::from_str(
            r#"{ "type": "coin", "image": "coin.png", "tile_width": 16, "tile_height": 16, "frames": 4, "fps": 8.0 }"#,
        )
        .expect("parse");
        assert_eq!(def.sprite_type, "coin");
        assert_eq!(def.states, 1);
        assert!(!def.looping);
    }
}
