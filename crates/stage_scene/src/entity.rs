//! Game objects: a transform, a velocity and one playback cursor.
//!
//! Each visual property carries its own dirty flag. Mutators only raise a flag
//! when the value actually changes, and `draw` clears exactly the flags it
//! pushed to the sink. The presented position is the top-left corner of a
//! center-anchored node and the presented sprite offset is scaled, so a scale
//! change also re-dirties position and sprite offset.
//!
//! Entities never hold a reference back to their scene. Lifecycle requests
//! (`kill`, `set_group`) are recorded on the entity and picked up by the scene
//! at the next tick boundary.

use glam::Vec2;
use stage_core::{PlaybackCursor, SpriteSheet};

use crate::sink::VisualSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Alive,
    /// `kill()` was called; the scene has not queued the entity yet.
    KillRequested,
    /// Sitting in the scene's kill queue, removed at the next tick.
    Queued,
}

#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    sprite_type: String,
    container: String,
    tile_size: Vec2,

    position: Vec2,
    position_dirty: bool,
    velocity: Vec2,
    scale: Vec2,
    size: Vec2,
    size_dirty: bool,
    rotation: f32,
    rotation_dirty: bool,

    cursor: PlaybackCursor,
    group: Option<String>,
    pending_group: Option<String>,
    liveness: Liveness,
}

impl Entity {
    pub fn new(id: EntityId, sheet: &SpriteSheet, container: &str) -> Self {
        let tile_size = sheet.tile_size();
        Self {
            id,
            sprite_type: sheet.sprite_type().to_string(),
            container: container.to_string(),
            tile_size,
            position: Vec2::ZERO,
            position_dirty: true,
            velocity: Vec2::ZERO,
            scale: Vec2::ONE,
            size: tile_size,
            size_dirty: true,
            rotation: 0.0,
            rotation_dirty: true,
            cursor: PlaybackCursor::new(sheet),
            group: None,
            pending_group: None,
            liveness: Liveness::Alive,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn sprite_type(&self) -> &str {
        &self.sprite_type
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn tile_size(&self) -> Vec2 {
        self.tile_size
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    /// Tile size times scale.
    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn cursor(&self) -> &PlaybackCursor {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut PlaybackCursor {
        &mut self.cursor
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn liveness(&self) -> Liveness {
        self.liveness
    }

    pub fn is_killed(&self) -> bool {
        self.liveness != Liveness::Alive
    }

    pub fn is_finished(&self) -> bool {
        self.cursor.is_finished()
    }

    pub fn position_dirty(&self) -> bool {
        self.position_dirty
    }

    pub fn size_dirty(&self) -> bool {
        self.size_dirty
    }

    pub fn rotation_dirty(&self) -> bool {
        self.rotation_dirty
    }

    pub fn set_position(&mut self, x: f32, y: f32) -> &mut Self {
        let position = Vec2::new(x, y);
        if position != self.position {
            self.position = position;
            self.position_dirty = true;
        }
        self
    }

    pub fn set_velocity(&mut self, x: f32, y: f32) -> &mut Self {
        self.velocity = Vec2::new(x, y);
        self
    }

    pub fn set_scale(&mut self, x: f32, y: f32) -> &mut Self {
        let scale = Vec2::new(x, y);
        if scale != self.scale {
            self.scale = scale;
            self.size = self.tile_size * scale;
            self.size_dirty = true;
            self.position_dirty = true;
            self.cursor.mark_dirty();
        }
        self
    }

    pub fn set_uniform_scale(&mut self, scale: f32) -> &mut Self {
        self.set_scale(scale, scale)
    }

    /// Scale so the node ends up `width` x `height` pixels.
    pub fn set_size(&mut self, width: f32, height: f32) -> &mut Self {
        self.set_scale(width / self.tile_size.x, height / self.tile_size.y)
    }

    pub fn set_rotation(&mut self, degrees: f32) -> &mut Self {
        if degrees != self.rotation {
            self.rotation = degrees;
            self.rotation_dirty = true;
        }
        self
    }

    /// Move to `group` at the next tick boundary.
    pub fn set_group(&mut self, group: &str) -> &mut Self {
        self.pending_group = Some(group.to_string());
        self
    }

    pub fn set_frame(&mut self, frame: f32) -> &mut Self {
        self.cursor.set_frame(frame);
        self
    }

    pub fn pause(&mut self) -> &mut Self {
        self.cursor.pause();
        self
    }

    pub fn play(&mut self) -> &mut Self {
        self.cursor.play();
        self
    }

    /// Ask the scene to remove this entity. Repeated calls are ignored.
    pub fn kill(&mut self) {
        if self.liveness == Liveness::Alive {
            self.liveness = Liveness::KillRequested;
        }
    }

    /// Collision is not implemented; this always reports no overlap.
    pub fn overlap(&self, _other: &Entity) -> bool {
        false
    }

    pub fn update(&mut self, dt: f32, sheet: &SpriteSheet) {
        self.cursor.advance(dt, sheet);

        if self.velocity != Vec2::ZERO {
            let next = self.position + self.velocity * dt;
            self.set_position(next.x, next.y);
        }

        // One-shot animations remove their entity once they run out.
        if self.cursor.is_finished() {
            self.kill();
        }
    }

    /// Push dirty visual state to `sink`. Does nothing until the sheet image
    /// has loaded.
    pub fn draw(&mut self, sheet: &SpriteSheet, sink: &mut dyn VisualSink) {
        let Some(sheet_size) = sheet.sheet_size() else {
            return;
        };

        if self.size_dirty {
            sink.set_size(self.id, self.size, sheet_size * self.scale);
            self.size_dirty = false;
        }

        if self.position_dirty {
            sink.set_position(self.id, self.position - self.size / 2.0);
            self.position_dirty = false;
        }

        if self.rotation_dirty {
            sink.set_rotation(self.id, self.rotation);
            self.rotation_dirty = false;
        }

        if self.cursor.is_dirty() {
            if let Some(offset) = self.cursor.refresh_offset(sheet) {
                sink.set_sprite_offset(self.id, offset * self.scale);
            }
            self.cursor.clear_dirty();
        }
    }

    pub(crate) fn assign_group(&mut self, group: Option<String>) {
        self.group = group;
    }

    pub(crate) fn take_pending_group(&mut self) -> Option<String> {
        self.pending_group.take()
    }

    pub(crate) fn mark_queued(&mut self) {
        self.liveness = Liveness::Queued;
    }
}
