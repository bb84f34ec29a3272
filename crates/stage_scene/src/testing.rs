//! Test doubles shared by the module tests.

use std::cell::RefCell;
use std::rc::Rc;

use crossbeam_channel::Sender;

use crate::audio::{AudioBackend, AudioInstance};
use crate::loader::{ImageLoader, LoadEvent};

#[derive(Debug, Clone, Copy)]
struct ScriptedState {
    ended: bool,
    plays: u32,
    volume: f32,
    speed: f32,
}

/// Audio backend whose instances only end when the test says so.
#[derive(Clone, Default)]
pub struct ScriptedAudio {
    preloaded: Rc<RefCell<Vec<String>>>,
    instances: Rc<RefCell<Vec<Rc<RefCell<ScriptedState>>>>>,
}

impl ScriptedAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(&self) -> usize {
        self.instances.borrow().len()
    }

    pub fn preloaded(&self) -> Vec<String> {
        self.preloaded.borrow().clone()
    }

    pub fn finish(&self, index: usize) {
        self.instances.borrow()[index].borrow_mut().ended = true;
    }

    pub fn finish_all(&self) {
        for state in self.instances.borrow().iter() {
            state.borrow_mut().ended = true;
        }
    }

    pub fn plays(&self, index: usize) -> u32 {
        self.instances.borrow()[index].borrow().plays
    }

    pub fn settings(&self, index: usize) -> (f32, f32) {
        let state = *self.instances.borrow()[index].borrow();
        (state.volume, state.speed)
    }
}

impl AudioBackend for ScriptedAudio {
    fn preload(&mut self, source: &str) {
        self.preloaded.borrow_mut().push(source.to_string());
    }

    fn create_instance(&mut self, _source: &str) -> Box<dyn AudioInstance> {
        let state = Rc::new(RefCell::new(ScriptedState {
            ended: false,
            plays: 0,
            volume: 0.0,
            speed: 0.0,
        }));
        self.instances.borrow_mut().push(state.clone());
        Box::new(ScriptedInstance { state })
    }
}

struct ScriptedInstance {
    state: Rc<RefCell<ScriptedState>>,
}

impl AudioInstance for ScriptedInstance {
    fn set_volume(&mut self, volume: f32) {
        self.state.borrow_mut().volume = volume;
    }

    fn set_speed(&mut self, speed: f32) {
        self.state.borrow_mut().speed = speed;
    }

    fn play(&mut self) {
        let mut state = self.state.borrow_mut();
        state.ended = false;
        state.plays += 1;
    }

    fn has_ended(&self) -> bool {
        self.state.borrow().ended
    }
}

/// Image loader that holds requests until the test completes them.
#[derive(Clone, Default)]
pub struct ManualImageLoader {
    pending: Rc<RefCell<Vec<(String, String, Sender<LoadEvent>)>>>,
}

impl ManualImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requested(&self) -> Vec<(String, String)> {
        self.pending
            .borrow()
            .iter()
            .map(|(sprite_type, source, _)| (sprite_type.clone(), source.clone()))
            .collect()
    }

    pub fn complete(&self, sprite_type: &str, width: u32, height: u32) {
        self.send(
            sprite_type,
            LoadEvent::Loaded {
                sprite_type: sprite_type.to_string(),
                width,
                height,
            },
        );
    }

    pub fn fail(&self, sprite_type: &str) {
        self.send(
            sprite_type,
            LoadEvent::Failed {
                sprite_type: sprite_type.to_string(),
                error: "not found".to_string(),
            },
        );
    }

    fn send(&self, sprite_type: &str, event: LoadEvent) {
        let pending = self.pending.borrow();
        let (_, _, done) = pending
            .iter()
            .find(|(requested, _, _)| requested == sprite_type)
            .expect("sprite type was never requested");
        done.send(event).expect("scene dropped its receiver");
    }
}

impl ImageLoader for ManualImageLoader {
    fn request(&mut self, sprite_type: &str, source: &str, done: Sender<LoadEvent>) {
        self.pending
            .borrow_mut()
            .push((sprite_type.to_string(), source.to_string(), done));
    }
}
