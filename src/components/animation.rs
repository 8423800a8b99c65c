use bevy_ecs::prelude::Component;

/// Playback state of the clip an entity is currently showing.
///
/// `cursor` indexes into the clip's frame list, not into the sprite sheet.
/// `repeat` counts extra plays after the first; `None` loops forever.
#[derive(Debug, Clone, Component)]
pub struct Animation {
    pub animation_key: String,
    pub cursor: usize,
    pub elapsed_time: f32,
    pub repeat: Option<u32>,
    pub plays_done: u32,
    pub paused: bool,
    pub finished: bool,
}

impl Animation {
    pub fn new(animation_key: impl Into<String>) -> Self {
        Self {
            animation_key: animation_key.into(),
            cursor: 0,
            elapsed_time: 0.0,
            repeat: None,
            plays_done: 0,
            paused: false,
            finished: false,
        }
    }

    /// Entity with no clip assigned yet.
    pub fn empty() -> Self {
        Self::new("")
    }

    /// Restart playback with a new clip.
    pub fn play(&mut self, animation_key: impl Into<String>, repeat: Option<u32>) {
        self.animation_key = animation_key.into();
        self.cursor = 0;
        self.elapsed_time = 0.0;
        self.repeat = repeat;
        self.plays_done = 0;
        self.paused = false;
        self.finished = false;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// True while a clip is assigned, not paused and not finished.
    pub fn is_playing(&self) -> bool {
        !self.animation_key.is_empty() && !self.paused && !self.finished
    }
}
