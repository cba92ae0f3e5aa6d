//! Engine frame loop
//!
//! The engine owns the active [`Scene`] and steps it at the configured fixed
//! timestep. Rendering backends consume the draw commands handed to the
//! per-frame callback.

use thiserror::Error;

use crate::config::{ConfigError, EngineConfig};
use crate::scene::{DrawCommand, Scene};

/// Main engine struct
///
/// Drives one scene through its lifecycle: `start` and `activate` when the
/// loop begins, one `frame` per step, `deactivate` and `end` when it stops.
pub struct Engine {
    scene: Scene,
    config: EngineConfig,
    running: bool,
    frame_count: u64,
}

impl Engine {
    /// Create an engine with an empty scene called "main"
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        log::info!("Initializing engine...");
        let scene = Scene::with_config("main", config.clone());
        Ok(Self {
            scene,
            config,
            running: false,
            frame_count: 0,
        })
    }

    /// Create an engine around an existing scene, using its settings
    pub fn with_scene(scene: Scene) -> Result<Self, EngineError> {
        let config = scene.config().clone();
        config.validate()?;
        Ok(Self {
            scene,
            config,
            running: false,
            frame_count: 0,
        })
    }

    /// The active scene
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The active scene for mutation
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Engine settings
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Stop the loop after the current frame
    pub fn request_close(&mut self) {
        self.running = false;
    }

    /// Whether the loop is running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Frames stepped since creation
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Advance the scene by one fixed timestep
    pub fn step(&mut self) -> Option<Vec<DrawCommand>> {
        self.frame_count += 1;
        self.scene.frame(self.config.fixed_timestep)
    }

    /// Run the main loop until `request_close` is called or `max_frames`
    /// frames have been stepped
    ///
    /// Returns the number of frames stepped by this call.
    pub fn run(&mut self, max_frames: Option<u64>, mut on_frame: impl FnMut(&mut Self, &[DrawCommand])) -> u64 {
        log::info!("Starting main loop...");
        self.running = true;
        self.scene.start();
        self.scene.activate();

        let mut frames = 0;
        while self.running && !max_frames.is_some_and(|max| frames >= max) {
            let commands = self.step();
            frames += 1;
            on_frame(self, commands.as_deref().unwrap_or_default());
        }

        self.running = false;
        self.scene.deactivate();
        self.scene.end();
        log::info!("Main loop finished after {} frames", frames);
        frames
    }
}

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Engine could not be set up
    #[error("Engine initialization failed: {0}")]
    InitializationFailed(String),

    /// Settings are invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
