//! The scene: owner of every entity, spritesheet and sound.
//!
//! Driving contract: the caller invokes [`Scene::update`] and then
//! [`Scene::draw`] once per frame, with a caller-measured delta in seconds.
//!
//! `update` runs in a fixed order:
//!   1. drain image-load completions from the loader channel
//!   2. fire the one-shot `on_load` hook if nothing is still loading
//!   3. queue kill requests and reap the kill queue
//!   4. apply group moves requested through `Entity::set_group`
//!   5. update every entity in "all", in spawn order
//!   6. queue kills requested during step 5
//!
//! Removal never happens while "all" is being iterated: kills are only ever
//! queued, and the queue is reaped at the start of the next `update`.
//! `clear` / `clear_group` are the exception; they remove synchronously and
//! are meant for teardown between rounds, not for use mid-tick.

use std::collections::HashMap;

use crossbeam_channel::{unbounded, Receiver, Sender};
use stage_core::{SpriteSheet, SpriteSheetDef};

use crate::audio::{AudioBackend, AudioRegistry};
use crate::entity::{Entity, EntityId, Liveness};
use crate::groups::{self, GroupTable, ALL, KILL};
use crate::loader::{ImageLoader, LoadEvent};
use crate::manifest::AssetManifest;
use crate::sink::VisualSink;

type LoadHook = Box<dyn FnOnce(&mut Scene)>;

pub struct Scene {
    root: String,
    groups: GroupTable,
    entities: HashMap<EntityId, Entity>,
    sheets: HashMap<String, SpriteSheet>,
    audio: AudioRegistry,
    sink: Box<dyn VisualSink>,
    loader: Box<dyn ImageLoader>,
    load_tx: Sender<LoadEvent>,
    load_rx: Receiver<LoadEvent>,
    loads_outstanding: usize,
    on_load: Option<LoadHook>,
    next_id: u64,
}

impl Scene {
    /// `root` is the container new entities are mounted in unless `spawn`
    /// names another.
    pub fn new(
        root: &str,
        sink: Box<dyn VisualSink>,
        loader: Box<dyn ImageLoader>,
        audio: Box<dyn AudioBackend>,
    ) -> Self {
        let (load_tx, load_rx) = unbounded();
        Self {
            root: root.to_string(),
            groups: GroupTable::new(),
            entities: HashMap::new(),
            sheets: HashMap::new(),
            audio: AudioRegistry::new(audio),
            sink,
            loader,
            load_tx,
            load_rx,
            loads_outstanding: 0,
            on_load: None,
            next_id: 1,
        }
    }

    /// Register every sprite and sound a manifest declares and adopt its
    /// audio defaults. The manifest's root container is not applied; pass it
    /// to [`Scene::new`].
    pub fn apply_manifest(&mut self, manifest: &AssetManifest) -> Result<(), String> {
        self.audio.volume = manifest.audio.volume;
        self.audio.speed = manifest.audio.speed;
        for def in &manifest.sprites {
            self.load_sprite(def.clone())?;
        }
        for sound in &manifest.sounds {
            self.audio.load_sound(&sound.name, &sound.source);
            if sound.volume.is_some() || sound.speed.is_some() {
                self.audio.set_sound_defaults(&sound.name, sound.volume, sound.speed);
            }
        }
        Ok(())
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    // --- Spritesheets --------------------------------------------------------

    /// Register a sprite type and start loading its image. Registering a type
    /// that already exists does nothing.
    pub fn load_sprite(&mut self, def: SpriteSheetDef) -> Result<(), String> {
        if self.sheets.contains_key(&def.sprite_type) {
            log::debug!("Sprite '{}' already registered", def.sprite_type);
            return Ok(());
        }
        let sheet = SpriteSheet::new(def)?;
        self.loads_outstanding += 1;
        self.loader
            .request(sheet.sprite_type(), sheet.image(), self.load_tx.clone());
        log::info!(
            "Loading sprite '{}' from '{}' ({} outstanding)",
            sheet.sprite_type(),
            sheet.image(),
            self.loads_outstanding
        );
        self.sheets.insert(sheet.sprite_type().to_string(), sheet);
        Ok(())
    }

    pub fn sprite(&self, sprite_type: &str) -> Option<&SpriteSheet> {
        self.sheets.get(sprite_type)
    }

    pub fn is_sprite_loaded(&self, sprite_type: &str) -> bool {
        self.sheets
            .get(sprite_type)
            .is_some_and(SpriteSheet::is_loaded)
    }

    pub fn outstanding_loads(&self) -> usize {
        self.loads_outstanding
    }

    /// Hook fired once, from inside `update`, the first time no sprite load is
    /// outstanding. Replaces any hook that has not fired yet.
    pub fn set_on_load<F>(&mut self, hook: F)
    where
        F: FnOnce(&mut Scene) + 'static,
    {
        self.on_load = Some(Box::new(hook));
    }

    /// Apply every load completion reported so far.
    pub fn poll_loads(&mut self) {
        let events: Vec<LoadEvent> = self.load_rx.try_iter().collect();
        for event in events {
            match event {
                LoadEvent::Loaded {
                    sprite_type,
                    width,
                    height,
                } => {
                    let Some(sheet) = self.sheets.get_mut(&sprite_type) else {
                        log::warn!("Load finished for unregistered sprite '{sprite_type}'");
                        continue;
                    };
                    match sheet.mark_loaded(width, height) {
                        Ok(true) => {
                            self.loads_outstanding = self.loads_outstanding.saturating_sub(1);
                            log::info!(
                                "Sprite '{sprite_type}' loaded ({width}x{height}), {} outstanding",
                                self.loads_outstanding
                            );
                        }
                        Ok(false) => {
                            log::debug!("Duplicate load completion for sprite '{sprite_type}'");
                        }
                        Err(err) => log::error!("{err}"),
                    }
                }
                LoadEvent::Failed { sprite_type, error } => {
                    log::error!("Sprite '{sprite_type}' will stay unloaded: {error}");
                }
            }
        }
    }

    // --- Entities ------------------------------------------------------------

    /// Create an entity of `sprite_type`, add it to "all" and to `group`, and
    /// mount it in `container` (the scene root by default). Unknown sprite
    /// types spawn nothing.
    pub fn spawn(
        &mut self,
        sprite_type: &str,
        group: Option<&str>,
        container: Option<&str>,
    ) -> Option<&mut Entity> {
        let Some(sheet) = self.sheets.get(sprite_type) else {
            log::warn!("Cannot spawn unregistered sprite '{sprite_type}'");
            return None;
        };

        let id = EntityId(self.next_id);
        self.next_id += 1;
        let container = container.unwrap_or(&self.root);
        let entity = Entity::new(id, sheet, container);
        self.sink.create_node(id, sprite_type, container);
        self.entities.insert(id, entity);
        self.groups.push(ALL, id);
        log::debug!("Spawned {sprite_type} {id}");

        if let Some(group) = group {
            self.set_group(id, group);
        }
        self.entities.get_mut(&id)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Members of `group` in insertion order. Unknown groups are empty.
    pub fn group_members(&self, group: &str) -> &[EntityId] {
        self.groups.members(group)
    }

    /// Move `id` into `group` now, leaving its previous group.
    pub fn set_group(&mut self, id: EntityId, group: &str) {
        if groups::is_reserved(group) {
            log::warn!("Group name '{group}' is reserved; {id} keeps its group");
            return;
        }
        let Some(entity) = self.entities.get_mut(&id) else {
            return;
        };
        if let Some(previous) = entity.group() {
            self.groups.remove(previous, id);
        }
        self.groups.push(group, id);
        entity.assign_group(Some(group.to_string()));
    }

    /// Switch the animation state of `id`.
    pub fn set_state(&mut self, id: EntityId, state: u32) {
        let Some(entity) = self.entities.get_mut(&id) else {
            return;
        };
        if let Some(sheet) = self.sheets.get(entity.sprite_type()) {
            entity.cursor_mut().set_state(state, sheet);
        }
    }

    /// Queue `id` for removal at the start of the next `update`.
    pub fn kill_object(&mut self, id: EntityId) {
        let Some(entity) = self.entities.get_mut(&id) else {
            return;
        };
        if entity.liveness() == Liveness::Queued {
            return;
        }
        entity.mark_queued();
        self.groups.push(KILL, id);
    }

    /// Remove every entity immediately.
    pub fn clear(&mut self) {
        let ids = self.groups.members(ALL).to_vec();
        for id in ids {
            self.remove_entity(id);
        }
        self.groups.clear();
    }

    /// Remove every member of `group` immediately.
    pub fn clear_group(&mut self, group: &str) {
        let ids = self.groups.members(group).to_vec();
        for id in ids {
            self.remove_entity(id);
        }
    }

    // --- Audio ---------------------------------------------------------------

    pub fn load_sound(&mut self, name: &str, source: &str) {
        self.audio.load_sound(name, source);
    }

    pub fn play_sound(&mut self, name: &str, volume: Option<f32>, speed: Option<f32>) {
        self.audio.play_sound(name, volume, speed);
    }

    pub fn sound_instance_count(&self, name: &str) -> usize {
        self.audio.instance_count(name)
    }

    pub fn audio(&self) -> &AudioRegistry {
        &self.audio
    }

    // --- Frame ---------------------------------------------------------------

    pub fn update(&mut self, dt: f32) {
        self.poll_loads();

        if self.loads_outstanding == 0 {
            if let Some(hook) = self.on_load.take() {
                log::info!("All sprites loaded");
                hook(self);
            }
        }

        self.queue_kill_requests();
        for id in self.groups.take(KILL) {
            self.remove_entity(id);
        }

        self.apply_group_moves();

        let Scene {
            groups,
            entities,
            sheets,
            ..
        } = self;
        for id in groups.members(ALL) {
            let Some(entity) = entities.get_mut(id) else {
                continue;
            };
            if let Some(sheet) = sheets.get(entity.sprite_type()) {
                entity.update(dt, sheet);
            }
        }

        self.queue_kill_requests();
    }

    /// Push dirty visual state for every entity, in spawn order.
    pub fn draw(&mut self) {
        let Scene {
            groups,
            entities,
            sheets,
            sink,
            ..
        } = self;
        for id in groups.members(ALL) {
            let Some(entity) = entities.get_mut(id) else {
                continue;
            };
            if let Some(sheet) = sheets.get(entity.sprite_type()) {
                entity.draw(sheet, &mut **sink);
            }
        }
    }

    fn queue_kill_requests(&mut self) {
        let requested: Vec<EntityId> = self
            .groups
            .members(ALL)
            .iter()
            .copied()
            .filter(|id| {
                self.entities
                    .get(id)
                    .is_some_and(|e| e.liveness() == Liveness::KillRequested)
            })
            .collect();
        for id in requested {
            self.kill_object(id);
        }
    }

    fn apply_group_moves(&mut self) {
        let moves: Vec<(EntityId, String)> = self
            .groups
            .members(ALL)
            .iter()
            .filter_map(|id| {
                let group = self.entities.get_mut(id)?.take_pending_group()?;
                Some((*id, group))
            })
            .collect();
        for (id, group) in moves {
            self.set_group(id, &group);
        }
    }

    fn remove_entity(&mut self, id: EntityId) {
        let Some(entity) = self.entities.remove(&id) else {
            return;
        };
        self.groups.remove(ALL, id);
        if let Some(group) = entity.group() {
            self.groups.remove(group, id);
        }
        self.groups.remove(KILL, id);
        self.sink.remove_node(id);
        log::debug!("Removed {} {id}", entity.sprite_type());
    }
}
