//! # Scene Engine
//!
//! A scene-graph runtime: a tree of entities carrying transforms and
//! pluggable components, driven through a frame lifecycle, with trigger
//! collision reporting backed by `parry3d`.
//!
//! ## Features
//!
//! - **Entity tree**: named entities with cached transforms and ordered
//!   components
//! - **Lifecycle dispatch**: start, update, render and collision messages
//!   delivered depth-first with enabled/visible pruning
//! - **Trigger collisions**: per-tick contact detection with enter and exit
//!   events diffed between ticks
//! - **Declarative components**: components built by type name and
//!   configured from JSON data
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut scene = Scene::new("demo");
//!     let root = scene.world_mut().create_entity("root");
//!     scene.set_root(root)?;
//!     let camera = scene.spawn(root, "camera")?;
//!     scene.activate_camera(camera)?;
//!
//!     scene.start();
//!     let commands = scene.frame(1.0 / 60.0);
//!     println!("{} draw commands", commands.map_or(0, |c| c.len()));
//!     scene.end();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod assets;
pub mod config;
pub mod ecs;
pub mod foundation;
pub mod physics;
pub mod scene;

mod engine;

pub use engine::{Engine, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{Resource, ResourceKind, ResourceManager, ResourceTable},
        config::{Config, ConfigError, EngineConfig},
        ecs::{
            components::{
                CameraComponent, ColliderComponent, LightComponent, LightType, ModelRendererComponent,
                RigidBodyComponent, RotationComponent, Transform,
            },
            parse::ParseData,
            Behavior, BehaviorError, BehaviorResult, ComponentContext, ComponentFactory, DynamicComponent, Handlers,
            ScriptArgs, ScriptError, ScriptModule, SceneError, World,
        },
        foundation::{
            collections::{ComponentId, EntityId},
            math::{Mat4, Quat, Vec3},
        },
        physics::{CollisionEvent, CollisionReport, ContactPoint, PhysicsError, ShapeDesc, ShapeKind},
        scene::{DrawCommand, LightData, RenderingContext, Scene},
        Engine, EngineError,
    };
}
