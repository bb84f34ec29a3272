//! Presentation boundary.
//!
//! The engine never talks to a concrete renderer. Each entity owns one node in
//! the sink, and draw calls push only the visual properties whose dirty flag is
//! set: size, position, rotation and sprite-sheet offset.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

use crate::entity::EntityId;

pub trait VisualSink {
    /// A new entity was spawned into `container`.
    fn create_node(&mut self, id: EntityId, sprite_type: &str, container: &str);

    fn remove_node(&mut self, id: EntityId);

    /// Node size in pixels plus the scaled size of the whole sheet image
    /// (the background size).
    fn set_size(&mut self, id: EntityId, size: Vec2, sheet_size: Vec2);

    /// Top-left corner of the node.
    fn set_position(&mut self, id: EntityId, top_left: Vec2);

    fn set_rotation(&mut self, id: EntityId, degrees: f32);

    /// Scaled, negative offset of the current frame within the sheet.
    fn set_sprite_offset(&mut self, id: EntityId, offset: Vec2);
}

#[derive(Debug, Clone, PartialEq)]
pub enum VisualWrite {
    Create {
        id: EntityId,
        sprite_type: String,
        container: String,
    },
    Remove {
        id: EntityId,
    },
    Size {
        id: EntityId,
        size: Vec2,
        sheet_size: Vec2,
    },
    Position {
        id: EntityId,
        top_left: Vec2,
    },
    Rotation {
        id: EntityId,
        degrees: f32,
    },
    SpriteOffset {
        id: EntityId,
        offset: Vec2,
    },
}

impl VisualWrite {
    pub fn id(&self) -> EntityId {
        match self {
            Self::Create { id, .. }
            | Self::Remove { id }
            | Self::Size { id, .. }
            | Self::Position { id, .. }
            | Self::Rotation { id, .. }
            | Self::SpriteOffset { id, .. } => *id,
        }
    }
}

/// Sink that records every write. Clones share the same log, so a caller can
/// keep one handle while the scene owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    writes: Rc<RefCell<Vec<VisualWrite>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain everything recorded so far.
    pub fn take(&self) -> Vec<VisualWrite> {
        std::mem::take(&mut *self.writes.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.writes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.borrow().is_empty()
    }

    fn push(&self, write: VisualWrite) {
        self.writes.borrow_mut().push(write);
    }
}

impl VisualSink for RecordingSink {
    fn create_node(&mut self, id: EntityId, sprite_type: &str, container: &str) {
        self.push(VisualWrite::Create {
            id,
            sprite_type: sprite_type.to_string(),
            container: container.to_string(),
        });
    }

    fn remove_node(&mut self, id: EntityId) {
        self.push(VisualWrite::Remove { id });
    }

    fn set_size(&mut self, id: EntityId, size: Vec2, sheet_size: Vec2) {
        self.push(VisualWrite::Size {
            id,
            size,
            sheet_size,
        });
    }

    fn set_position(&mut self, id: EntityId, top_left: Vec2) {
        self.push(VisualWrite::Position { id, top_left });
    }

    fn set_rotation(&mut self, id: EntityId, degrees: f32) {
        self.push(VisualWrite::Rotation { id, degrees });
    }

    fn set_sprite_offset(&mut self, id: EntityId, offset: Vec2) {
        self.push(VisualWrite::SpriteOffset { id, offset });
    }
}
