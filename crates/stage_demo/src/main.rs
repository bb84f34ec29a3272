//! Stage demo -- headless driver for the scene engine.
//!
//! Loads an asset manifest, registers its sprites and sounds, and runs a short
//! fixed-length session at roughly 60 frames per second:
//!
//!   1. `begin_frame()` -- measure wall-clock delta (clamped on hitches)
//!   2. `Scene::update` -- loads, kills, group moves, animation, motion
//!   3. `Director::tick` -- gameplay reacting to the new positions
//!   4. `Scene::draw` -- push dirty properties to the log sink
//!
//! Gameplay starts from the scene's `on_load` hook, once every image in the
//! manifest has reported its size. Run with `RUST_LOG=trace` to see each
//! individual node write.

mod demo;
mod present;

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use stage_core::FrameClock;
use stage_scene::{load_manifest_from_path, Scene, SilentAudio, ThreadedImageLoader};

use demo::Director;
use present::LogSink;

const MANIFEST_PATH: &str = "assets/manifest.json";
const RUN_SECONDS: f64 = 5.0;
const FRAME_SLEEP: Duration = Duration::from_millis(16);

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let manifest_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(MANIFEST_PATH));
    let manifest = match load_manifest_from_path(&manifest_path) {
        Ok(manifest) => manifest,
        Err(err) => panic!("Initial manifest load failed: {}", err),
    };
    let asset_dir = manifest_path.parent().unwrap_or(Path::new(".")).to_path_buf();
    log::info!(
        "Loaded manifest {}: {} sprites, {} sounds",
        manifest_path.display(),
        manifest.sprites.len(),
        manifest.sounds.len()
    );

    let sink = LogSink::default();
    let mut scene = Scene::new(
        &manifest.root,
        Box::new(sink.clone()),
        Box::new(ThreadedImageLoader::new(asset_dir)),
        Box::new(SilentAudio::default()),
    );
    if let Err(err) = scene.apply_manifest(&manifest) {
        panic!("Manifest registration failed: {}", err);
    }
    if !scene.audio().has_sound(demo::PICKUP_SOUND) {
        log::warn!(
            "Manifest has no '{}' sound; pickups will be silent",
            demo::PICKUP_SOUND
        );
    }

    let ready = Rc::new(Cell::new(false));
    let ready_flag = ready.clone();
    scene.set_on_load(move |scene| {
        log::info!("All sprites loaded into '{}'", scene.root());
        ready_flag.set(true);
    });

    let mut director = Director::new();
    let mut clock = FrameClock::new();
    while clock.total_time < RUN_SECONDS {
        let dt = clock.begin_frame();
        scene.update(dt);
        if ready.get() && !director.is_running() {
            director.setup(&mut scene);
        }
        director.tick(&mut scene);
        scene.draw();
        std::thread::sleep(FRAME_SLEEP);
    }

    if !director.is_running() {
        log::warn!(
            "Session ended with {} sprite loads still outstanding",
            scene.outstanding_loads()
        );
    }

    let counts = sink.counts();
    log::info!(
        "Ran {} frames ({:.1} fps): {} coins over {} rounds, {} live entities",
        clock.frame_count,
        clock.smoothed_fps,
        director.collected,
        director.rounds,
        scene.entity_count()
    );
    log::info!(
        "Nodes created {} removed {}, property writes {} (size {}, position {}, rotation {}, sprite {})",
        counts.created,
        counts.removed,
        counts.property_writes(),
        counts.size,
        counts.position,
        counts.rotation,
        counts.sprite
    );
    log::info!(
        "Pickup sound instances: {}",
        scene.sound_instance_count(demo::PICKUP_SOUND)
    );

    scene.clear();
}
