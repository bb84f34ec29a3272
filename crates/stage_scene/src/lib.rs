//! Scene management on top of `stage_core`: entities, named groups with
//! deferred lifecycle changes, load gating, dirty-tracked presentation and a
//! small audio channel registry.

pub mod audio;
pub mod entity;
pub mod groups;
pub mod loader;
pub mod manifest;
pub mod scene;
pub mod sink;
#[cfg(test)]
pub(crate) mod testing;

pub use audio::{AudioBackend, AudioInstance, AudioRegistry, SilentAudio};
pub use entity::{Entity, EntityId, Liveness};
pub use groups::GroupTable;
pub use loader::{ImageLoader, LoadEvent, ThreadedImageLoader};
pub use manifest::{load_manifest_from_path, AssetManifest};
pub use scene::Scene;
pub use sink::{RecordingSink, VisualSink, VisualWrite};
