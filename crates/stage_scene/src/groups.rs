//! Named, ordered entity buckets.
//!
//! Two names are reserved and always mean the same thing:
//!  - [`ALL`]: every live entity, in spawn order. This is also the update and
//!    paint order, so later spawns draw on top.
//!  - [`KILL`]: entities queued for removal at the start of the next tick.
//!
//! Every other name is created lazily the first time an entity joins it.

use std::collections::HashMap;

use crate::entity::EntityId;

pub const ALL: &str = "all";
pub const KILL: &str = "kill";

pub fn is_reserved(name: &str) -> bool {
    name == ALL || name == KILL
}

#[derive(Debug, Clone)]
pub struct GroupTable {
    buckets: HashMap<String, Vec<EntityId>>,
}

impl GroupTable {
    pub fn new() -> Self {
        let mut buckets = HashMap::new();
        buckets.insert(ALL.to_string(), Vec::new());
        Self { buckets }
    }

    /// Members of `name` in insertion order. Unknown groups are empty.
    pub fn members(&self, name: &str) -> &[EntityId] {
        self.buckets.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self, name: &str) -> usize {
        self.members(name).len()
    }

    pub fn push(&mut self, name: &str, id: EntityId) {
        self.buckets.entry(name.to_string()).or_default().push(id);
    }

    /// Remove the first occurrence of `id`. Returns false if it was not there.
    pub fn remove(&mut self, name: &str, id: EntityId) -> bool {
        let Some(bucket) = self.buckets.get_mut(name) else {
            return false;
        };
        match bucket.iter().position(|member| *member == id) {
            Some(index) => {
                bucket.remove(index);
                true
            }
            None => false,
        }
    }

    /// Empty one bucket and hand back its former members.
    pub fn take(&mut self, name: &str) -> Vec<EntityId> {
        self.buckets
            .get_mut(name)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    pub fn has_group(&self, name: &str) -> bool {
        self.buckets.contains_key(name)
    }

    /// Empty every bucket. Bucket names stay known.
    pub fn clear(&mut self) {
        for bucket in self.buckets.values_mut() {
            bucket.clear();
        }
    }
}

impl Default for GroupTable {
    fn default() -> Self {
        Self::new()
    }
}
