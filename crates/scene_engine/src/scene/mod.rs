//! Scene management
//!
//! Following Game Engine Architecture Chapter 11.2.7 - Scene Graphs. A
//! [`Scene`] owns one entity tree and drives its lifecycle:
//!
//! ```text
//! Scene::frame(dt)
//!      ├─ update(dt)         → dispatch Update, then the collision tick
//!      └─ render()           → build RenderingContext, dispatch Render
//!                               └─ DrawCommands collected from components
//! ```
//!
//! The renderer itself lives outside the engine; it only consumes the
//! returned [`DrawCommand`]s.

mod lights;
mod render_queue;
mod scene_manager;

#[cfg(test)]
mod tests;

pub use lights::{LightData, LightRegistry};
pub use render_queue::{DrawCommand, RenderingContext};
pub use scene_manager::Scene;
