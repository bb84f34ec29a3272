//! Asynchronous image loading.
//!
//! Loaders never touch scene state. They report completion by sending a
//! [`LoadEvent`] on the channel handed to them with each request; the scene
//! drains that channel at the start of `update`, so a sheet only ever flips to
//! loaded on a tick boundary.
//!
//! There is no timeout or retry. A request that never reports back keeps its
//! sheet unloaded and holds the scene's `on_load` hook forever.

use std::path::PathBuf;

use crossbeam_channel::Sender;

#[derive(Debug, Clone, PartialEq)]
pub enum LoadEvent {
    Loaded {
        sprite_type: String,
        width: u32,
        height: u32,
    },
    Failed {
        sprite_type: String,
        error: String,
    },
}

pub trait ImageLoader {
    /// Start loading `source` for `sprite_type` and report on `done`.
    fn request(&mut self, sprite_type: &str, source: &str, done: Sender<LoadEvent>);
}

/// Reads image headers on a short-lived worker thread per request. Only the
/// pixel dimensions are needed, so pixel data is never decoded.
pub struct ThreadedImageLoader {
    base_dir: PathBuf,
}

impl ThreadedImageLoader {
    /// Image sources are resolved relative to `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

impl ImageLoader for ThreadedImageLoader {
    fn request(&mut self, sprite_type: &str, source: &str, done: Sender<LoadEvent>) {
        let path = self.base_dir.join(source);
        let sprite_type = sprite_type.to_string();
        let thread_name = format!("image-load-{sprite_type}");

        let spawned = std::thread::Builder::new()
            .name(thread_name)
            .spawn(move || {
                let event = match image::image_dimensions(&path) {
                    Ok((width, height)) => LoadEvent::Loaded {
                        sprite_type,
                        width,
                        height,
                    },
                    Err(e) => LoadEvent::Failed {
                        sprite_type,
                        error: format!("Failed to read image {}: {e}", path.display()),
                    },
                };
                // The scene may already be gone; nothing to report to then.
                let _ = done.send(event);
            });

        if let Err(e) = spawned {
            log::error!("Failed to spawn image loader thread for '{source}': {e}");
        }
    }
}
