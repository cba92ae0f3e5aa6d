//! Native components
//!
//! Every entity carries a [`Transform`]; everything else an entity does comes
//! from the components attached to it.

pub mod camera;
pub mod collision;
pub mod lighting;
pub mod model_renderer;
pub mod rotation;
pub mod transform;

pub use camera::CameraComponent;
pub use collision::{ColliderComponent, RigidBodyComponent};
pub use lighting::{LightComponent, LightType};
pub use model_renderer::ModelRendererComponent;
pub use rotation::RotationComponent;
pub use transform::{RecomputeCounts, Transform};
