//! Sound registry with lazily grown instance pools.
//!
//! One logical sound can overlap itself. Instead of pre-allocating channels,
//! `play_sound` reuses any instance that has finished playing and only creates
//! a new one when every cached instance is still busy. The pool for a sound
//! therefore never grows past the peak overlap actually requested.
//!
//! Playback itself sits behind [`AudioBackend`] / [`AudioInstance`]; the
//! engine only decides which instance to start and with what settings.

use std::collections::HashMap;
use std::time::{Duration, Instant};

pub trait AudioInstance {
    fn set_volume(&mut self, volume: f32);
    fn set_speed(&mut self, speed: f32);
    /// Start from the beginning.
    fn play(&mut self);
    fn has_ended(&self) -> bool;
}

pub trait AudioBackend {
    /// Hint that `source` will be played soon. Must not block.
    fn preload(&mut self, _source: &str) {}

    fn create_instance(&mut self, source: &str) -> Box<dyn AudioInstance>;
}

struct SoundEntry {
    source: String,
    volume: Option<f32>,
    speed: Option<f32>,
    instances: Vec<Box<dyn AudioInstance>>,
}

pub struct AudioRegistry {
    /// Scene-wide fallback volume.
    pub volume: f32,
    /// Scene-wide fallback playback rate.
    pub speed: f32,
    backend: Box<dyn AudioBackend>,
    sounds: HashMap<String, SoundEntry>,
}

impl AudioRegistry {
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        Self {
            volume: 1.0,
            speed: 1.0,
            backend,
            sounds: HashMap::new(),
        }
    }

    /// Register `name`. Re-registering an existing name is ignored.
    pub fn load_sound(&mut self, name: &str, source: &str) {
        if self.sounds.contains_key(name) {
            return;
        }
        self.backend.preload(source);
        self.sounds.insert(
            name.to_string(),
            SoundEntry {
                source: source.to_string(),
                volume: None,
                speed: None,
                instances: Vec::new(),
            },
        );
    }

    /// Per-sound defaults used when `play_sound` gets no explicit value.
    pub fn set_sound_defaults(&mut self, name: &str, volume: Option<f32>, speed: Option<f32>) {
        match self.sounds.get_mut(name) {
            Some(entry) => {
                entry.volume = volume;
                entry.speed = speed;
            }
            None => log::warn!("Cannot set defaults for unknown sound '{name}'"),
        }
    }

    /// Play `name`. Volume and speed resolve as explicit argument, then the
    /// sound's default, then the registry-wide default.
    pub fn play_sound(&mut self, name: &str, volume: Option<f32>, speed: Option<f32>) {
        let Some(entry) = self.sounds.get_mut(name) else {
            log::warn!("Ignoring play of unknown sound '{name}'");
            return;
        };
        let volume = volume.or(entry.volume).unwrap_or(self.volume);
        let speed = speed.or(entry.speed).unwrap_or(self.speed);

        if let Some(instance) = entry
            .instances
            .iter_mut()
            .rev()
            .find(|instance| instance.has_ended())
        {
            instance.set_volume(volume);
            instance.set_speed(speed);
            instance.play();
            return;
        }

        let mut instance = self.backend.create_instance(&entry.source);
        instance.set_volume(volume);
        instance.set_speed(speed);
        instance.play();
        entry.instances.push(instance);
        log::debug!("Sound '{name}' grew to {} instances", entry.instances.len());
    }

    pub fn has_sound(&self, name: &str) -> bool {
        self.sounds.contains_key(name)
    }

    /// Number of cached playable instances for `name`.
    pub fn instance_count(&self, name: &str) -> usize {
        self.sounds.get(name).map_or(0, |entry| entry.instances.len())
    }
}

/// Headless backend: nothing is audible, but each instance reports itself
/// ended once its clip length (divided by speed) has elapsed on the wall clock.
pub struct SilentAudio {
    clip_length: Duration,
}

impl SilentAudio {
    pub fn new(clip_length: Duration) -> Self {
        Self { clip_length }
    }
}

impl Default for SilentAudio {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}

impl AudioBackend for SilentAudio {
    fn create_instance(&mut self, source: &str) -> Box<dyn AudioInstance> {
        Box::new(SilentInstance {
            source: source.to_string(),
            clip_length: self.clip_length,
            volume: 1.0,
            speed: 1.0,
            started: None,
        })
    }
}

struct SilentInstance {
    source: String,
    clip_length: Duration,
    volume: f32,
    speed: f32,
    started: Option<Instant>,
}

impl AudioInstance for SilentInstance {
    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    fn play(&mut self) {
        log::debug!(
            "play '{}' volume={:.2} speed={:.2}",
            self.source,
            self.volume,
            self.speed
        );
        self.started = Some(Instant::now());
    }

    fn has_ended(&self) -> bool {
        let Some(started) = self.started else {
            return false;
        };
        let speed = if self.speed > 0.0 { self.speed } else { 1.0 };
        started.elapsed().as_secs_f32() >= self.clip_length.as_secs_f32() / speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedAudio;

    fn registry() -> (AudioRegistry, ScriptedAudio) {
        let audio = ScriptedAudio::new();
        let mut registry = AudioRegistry::new(Box::new(audio.clone()));
        registry.load_sound("hit", "hit.wav");
        (registry, audio)
    }

    #[test]
    fn overlapping_plays_grow_the_pool() {
        let (mut registry, audio) = registry();
        for _ in 0..3 {
            registry.play_sound("hit", None, None);
        }
        assert_eq!(registry.instance_count("hit"), 3);

        registry.play_sound("hit", None, None);
        assert_eq!(registry.instance_count("hit"), 4);
        assert_eq!(audio.created(), 4);
    }

    #[test]
    fn finished_instance_is_reused() {
        let (mut registry, audio) = registry();
        registry.play_sound("hit", None, None);
        registry.play_sound("hit", None, None);
        audio.finish(0);

        registry.play_sound("hit", Some(0.3), Some(2.0));
        assert_eq!(registry.instance_count("hit"), 2);
        assert_eq!(audio.plays(0), 2);
        assert_eq!(audio.settings(0), (0.3, 2.0));
    }

    #[test]
    fn volume_and_speed_precedence() {
        let (mut registry, audio) = registry();
        registry.volume = 0.9;
        registry.speed = 1.5;

        registry.play_sound("hit", None, None);
        assert_eq!(audio.settings(0), (0.9, 1.5));

        registry.set_sound_defaults("hit", Some(0.4), None);
        audio.finish(0);
        registry.play_sound("hit", None, None);
        assert_eq!(audio.settings(0), (0.4, 1.5));

        audio.finish(0);
        registry.play_sound("hit", Some(0.0), Some(0.5));
        assert_eq!(audio.settings(0), (0.0, 0.5));
    }

    #[test]
    fn load_sound_is_idempotent_and_unknown_play_is_ignored() {
        let (mut registry, audio) = registry();
        registry.load_sound("hit", "other.wav");
        assert_eq!(audio.preloaded(), vec!["hit.wav".to_string()]);

        registry.play_sound("miss", None, None);
        assert_eq!(registry.instance_count("miss"), 0);
        assert!(!registry.has_sound("miss"));
        assert_eq!(audio.created(), 0);
    }

    #[test]
    fn silent_instance_ends_after_clip_length() {
        let mut backend = SilentAudio::new(Duration::ZERO);
        let mut instance = backend.create_instance("blip.wav");
        assert!(!instance.has_ended(), "never-played instance is not ended");
        instance.play();
        assert!(instance.has_ended());
    }
}
