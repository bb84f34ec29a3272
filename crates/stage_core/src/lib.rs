//! Engine-agnostic building blocks: spritesheet resources, per-instance
//! playback cursors and the frame clock that feeds them variable deltas.

pub mod cursor;
pub mod sheet;
pub mod time;

pub use cursor::PlaybackCursor;
pub use sheet::{SheetGeometry, SpriteSheet, SpriteSheetDef};
pub use time::FrameClock;
