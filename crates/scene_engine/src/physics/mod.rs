//! Physics module: collision geometry and trigger collision reporting
//!
//! Based on Game Engine Architecture 3rd Edition, Chapter 13: collision
//! detection runs a broad phase over bounding volumes followed by a narrow
//! phase on the surviving pairs. Geometry and contact generation are backed
//! by `parry3d`; the engine only cares about *trigger* contacts, which it
//! reports to components as lifecycle messages.

pub mod collision;
pub mod collision_state;
pub mod collision_system;
pub mod shape;
pub mod space;

pub use collision::{CollisionEvent, ContactPoint};
pub use collision_state::{CollisionPair, CollisionState, CollisionStateDiff, DiffEntry, DiffKind};
pub use collision_system::{handle_collisions, CollisionReport, MAX_CONTACTS};
pub use shape::{ShapeDesc, ShapeKind};
pub use space::PhysicsSpace;

use crate::foundation::collections::{BodyHandle, GeomHandle};

/// Physics errors
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// Shape name is not one of the supported kinds
    #[error("Unknown shape '{0}', expected one of SPHERE, CYLINDER, CAPSULE, BOX")]
    UnknownShape(String),

    /// Wrong number of shape arguments
    #[error("Shape {shape} takes {expected} arguments, got {got}")]
    MissingShapeArgument {
        /// Shape kind
        shape: ShapeKind,
        /// Required argument count
        expected: usize,
        /// Supplied argument count
        got: usize,
    },

    /// A dimension is zero, negative or not a number
    #[error("Shape {shape} argument {index} must be a positive finite number, got {value}")]
    InvalidShapeArgument {
        /// Shape kind
        shape: ShapeKind,
        /// Argument position
        index: usize,
        /// Offending value
        value: f32,
    },

    /// Geometry handle does not resolve
    #[error("Unknown geometry {0:?}")]
    UnknownGeom(GeomHandle),

    /// Body handle does not resolve
    #[error("Unknown body {0:?}")]
    UnknownBody(BodyHandle),
}
