//! Headless presentation sink: logs every node write at trace level and keeps
//! per-property write counts so the run summary shows how much dirty tracking
//! saved.

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;
use stage_scene::{EntityId, VisualSink};

#[derive(Debug, Clone, Copy, Default)]
pub struct WriteCounts {
    pub created: u64,
    pub removed: u64,
    pub size: u64,
    pub position: u64,
    pub rotation: u64,
    pub sprite: u64,
}

impl WriteCounts {
    pub fn property_writes(&self) -> u64 {
        self.size + self.position + self.rotation + self.sprite
    }
}

/// Clones share one set of counters.
#[derive(Debug, Clone, Default)]
pub struct LogSink {
    counts: Rc<Cell<WriteCounts>>,
}

impl LogSink {
    pub fn counts(&self) -> WriteCounts {
        self.counts.get()
    }

    fn bump(&self, f: impl FnOnce(&mut WriteCounts)) {
        let mut counts = self.counts.get();
        f(&mut counts);
        self.counts.set(counts);
    }
}

impl VisualSink for LogSink {
    fn create_node(&mut self, id: EntityId, sprite_type: &str, container: &str) {
        log::trace!("{id} create {sprite_type} in {container}");
        self.bump(|c| c.created += 1);
    }

    fn remove_node(&mut self, id: EntityId) {
        log::trace!("{id} remove");
        self.bump(|c| c.removed += 1);
    }

    fn set_size(&mut self, id: EntityId, size: Vec2, sheet_size: Vec2) {
        log::trace!(
            "{id} size {}x{} background {}x{}",
            size.x,
            size.y,
            sheet_size.x,
            sheet_size.y
        );
        self.bump(|c| c.size += 1);
    }

    fn set_position(&mut self, id: EntityId, top_left: Vec2) {
        log::trace!("{id} left {:.1} top {:.1}", top_left.x, top_left.y);
        self.bump(|c| c.position += 1);
    }

    fn set_rotation(&mut self, id: EntityId, degrees: f32) {
        log::trace!("{id} rotate {degrees}deg");
        self.bump(|c| c.rotation += 1);
    }

    fn set_sprite_offset(&mut self, id: EntityId, offset: Vec2) {
        log::trace!("{id} background-position {} {}", offset.x, offset.y);
        self.bump(|c| c.sprite += 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_counts() {
        let handle = LogSink::default();
        let mut owned = handle.clone();
        owned.create_node(EntityId(1), "coin", "stage");
        owned.set_position(EntityId(1), Vec2::ZERO);
        owned.set_sprite_offset(EntityId(1), Vec2::ZERO);

        let counts = handle.counts();
        assert_eq!(counts.created, 1);
        assert_eq!(counts.property_writes(), 2);
    }
}
