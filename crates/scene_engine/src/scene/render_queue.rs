//! Rendering context and draw queue
//!
//! Following Game Engine Architecture Chapter 11.3 - Render Queues: the scene
//! does not draw anything itself. Once per frame it builds a
//! [`RenderingContext`] from the active camera and the registered lights,
//! sends `render` through the tree and collects the [`DrawCommand`]s the
//! components submit.

use std::cell::RefCell;

use crate::foundation::collections::EntityId;
use crate::foundation::math::{Mat4, Vec3};
use crate::scene::LightData;

/// One model to draw
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    /// Entity the model belongs to
    pub entity: EntityId,
    /// Model resource name
    pub model: String,
    /// Shader resource name
    pub shader: String,
    /// Material resource name, if any
    pub material: Option<String>,
    /// World matrix of the entity
    pub world: Mat4,
    /// Inverse-transpose of the world matrix
    pub world_inverse_transpose: Mat4,
}

/// Per-frame rendering state shared with every render handler
#[derive(Debug)]
pub struct RenderingContext {
    view: Mat4,
    projection: Mat4,
    camera_position: Vec3,
    render_target: (u32, u32),
    lights: Vec<LightData>,
    queue: RefCell<Vec<DrawCommand>>,
}

impl RenderingContext {
    /// Create a context with an empty draw queue
    pub fn new(view: Mat4, projection: Mat4, camera_position: Vec3, render_target: (u32, u32), lights: Vec<LightData>) -> Self {
        Self {
            view,
            projection,
            camera_position,
            render_target,
            lights,
            queue: RefCell::new(Vec::new()),
        }
    }

    /// Camera view matrix
    pub fn view(&self) -> Mat4 {
        self.view
    }

    /// Camera projection matrix
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// `view * projection`
    pub fn view_projection(&self) -> Mat4 {
        self.view * self.projection
    }

    /// Camera position in world space
    pub fn camera_position(&self) -> Vec3 {
        self.camera_position
    }

    /// Render target size in pixels
    pub fn render_target(&self) -> (u32, u32) {
        self.render_target
    }

    /// Lights for this frame
    pub fn lights(&self) -> &[LightData] {
        &self.lights
    }

    /// Queue a draw
    pub fn submit(&self, command: DrawCommand) {
        self.queue.borrow_mut().push(command);
    }

    /// Number of queued draws
    pub fn queued(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Consume the context, returning the queued draws in submission order
    pub fn into_commands(self) -> Vec<DrawCommand> {
        self.queue.into_inner()
    }
}
