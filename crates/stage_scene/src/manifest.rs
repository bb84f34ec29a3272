//! Asset manifest: the externally-resolved half of sprite and sound
//! registration.
//!
//! The engine's registration calls need an image locator and a tile size per
//! sprite type, and a source locator per sound. The manifest is where those
//! come from:
//!
//! ```json
//! {
//!   "version": "0.1",
//!   "root": "game_frame",
//!   "audio": { "volume": 0.8 },
//!   "sprites": [
//!     { "type": "coin", "image": "sprites/coin.png", "tile_width": 16,
//!       "tile_height": 16, "frames": 4, "fps": 8.0, "looping": false }
//!   ],
//!   "sounds": [ { "name": "hit", "source": "audio/hit.wav", "volume": 0.5 } ]
//! }
//! ```

use serde::Deserialize;
use stage_core::SpriteSheetDef;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct AssetManifest {
    pub version: String,
    #[serde(default = "default_root")]
    pub root: String,
    #[serde(default)]
    pub audio: AudioDefaults,
    #[serde(default)]
    pub sprites: Vec<SpriteSheetDef>,
    #[serde(default)]
    pub sounds: Vec<SoundDef>,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct AudioDefaults {
    #[serde(default = "default_level")]
    pub volume: f32,
    #[serde(default = "default_level")]
    pub speed: f32,
}

impl Default for AudioDefaults {
    fn default() -> Self {
        Self {
            volume: 1.0,
            speed: 1.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SoundDef {
    pub name: String,
    pub source: String,
    #[serde(default)]
    pub volume: Option<f32>,
    #[serde(default)]
    pub speed: Option<f32>,
}

pub fn load_manifest_from_path(path: &Path) -> Result<AssetManifest, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read manifest {}: {e}", path.display()))?;
    let manifest: AssetManifest = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse manifest JSON {}: {e}", path.display()))?;
    validate_manifest(&manifest)?;
    Ok(manifest)
}

fn validate_manifest(manifest: &AssetManifest) -> Result<(), String> {
    if manifest.version != "0.1" {
        return Err(format!(
            "Manifest validation failed: unsupported version '{}'",
            manifest.version
        ));
    }
    if manifest.root.is_empty() {
        return Err("Manifest validation failed: root container is empty".to_string());
    }

    let mut sprite_types = HashSet::new();
    for sprite in &manifest.sprites {
        if !sprite_types.insert(sprite.sprite_type.as_str()) {
            return Err(format!(
                "Manifest validation failed: duplicate sprite type '{}'",
                sprite.sprite_type
            ));
        }
        sprite.validate()?;
    }

    let mut sound_names = HashSet::new();
    for sound in &manifest.sounds {
        if sound.name.is_empty() {
            return Err("Manifest validation failed: sound name is empty".to_string());
        }
        if !sound_names.insert(sound.name.as_str()) {
            return Err(format!(
                "Manifest validation failed: duplicate sound name '{}'",
                sound.name
            ));
        }
    }

    if manifest.sprites.is_empty() {
        log::warn!("Manifest declares no sprites. This is allowed but often accidental.");
    }

    Ok(())
}

fn default_root() -> String {
    "stage".to_string()
}

const fn default_level() -> f32 {
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "stage_manifest_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn write_manifest(path: &Path, body: &str) {
        fs::write(path, body).expect("failed to write temp manifest");
    }

    #[test]
    fn load_manifest_parses_valid_file() {
        let path = temp_file_path("valid");
        write_manifest(
            &path,
            r#"
            {
              "version": "0.1",
              "root": "game_frame",
              "audio": { "volume": 0.8 },
              "sprites": [
                { "type": "coin", "image": "sprites/coin.png", "tile_width": 16, "tile_height": 16,
                  "frames": 4, "fps": 8.0 },
                { "type": "runner", "image": "sprites/runner.png", "tile_width": 24, "tile_height": 32,
                  "frames": 8, "fps": 12.0, "looping": true, "states": 2 }
              ],
              "sounds": [
                { "name": "hit", "source": "audio/hit.wav", "volume": 0.5 }
              ]
            }
            "#,
        );

        let manifest = load_manifest_from_path(&path).expect("manifest should load");
        assert_eq!(manifest.root, "game_frame");
        assert_eq!(manifest.audio.volume, 0.8);
        assert_eq!(manifest.audio.speed, 1.0);
        assert_eq!(manifest.sprites.len(), 2);
        assert!(!manifest.sprites[0].looping);
        assert_eq!(manifest.sprites[1].states, 2);
        assert_eq!(manifest.sounds[0].volume, Some(0.5));
        assert_eq!(manifest.sounds[0].speed, None);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn root_and_audio_default_when_missing() {
        let path = temp_file_path("defaults");
        write_manifest(&path, r#"{ "version": "0.1" }"#);

        let manifest = load_manifest_from_path(&path).expect("manifest should load");
        assert_eq!(manifest.root, "stage");
        assert_eq!(manifest.audio.volume, 1.0);
        assert!(manifest.sprites.is_empty());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_bad_version() {
        let path = temp_file_path("bad_version");
        write_manifest(&path, r#"{ "version": "2.0" }"#);
        let err = load_manifest_from_path(&path).expect_err("bad version should fail");
        assert!(err.contains("unsupported version"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_duplicate_sprite_types() {
        let path = temp_file_path("dup_sprite");
        write_manifest(
            &path,
            r#"
            {
              "version": "0.1",
              "sprites": [
                { "type": "coin", "image": "a.png", "tile_width": 8, "tile_height": 8, "frames": 1, "fps": 0.0 },
                { "type": "coin", "image": "b.png", "tile_width": 8, "tile_height": 8, "frames": 1, "fps": 0.0 }
              ]
            }
            "#,
        );
        let err = load_manifest_from_path(&path).expect_err("duplicate types should fail");
        assert!(err.contains("duplicate sprite type"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_invalid_sprite_definition() {
        let path = temp_file_path("uneven");
        write_manifest(
            &path,
            r#"
            {
              "version": "0.1",
              "sprites": [
                { "type": "odd", "image": "odd.png", "tile_width": 8, "tile_height": 8, "frames": 5, "fps": 4.0, "states": 2 }
              ]
            }
            "#,
        );
        let err = load_manifest_from_path(&path).expect_err("uneven states should fail");
        assert!(err.contains("do not split evenly"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_duplicate_sound_names() {
        let path = temp_file_path("dup_sound");
        write_manifest(
            &path,
            r#"
            {
              "version": "0.1",
              "sounds": [
                { "name": "hit", "source": "a.wav" },
                { "name": "hit", "source": "b.wav" }
              ]
            }
            "#,
        );
        let err = load_manifest_from_path(&path).expect_err("duplicate sounds should fail");
        assert!(err.contains("duplicate sound name"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn missing_file_is_reported() {
        let path = temp_file_path("missing");
        let err = load_manifest_from_path(&path).expect_err("missing file should fail");
        assert!(err.contains("Failed to read manifest"));
    }
}
