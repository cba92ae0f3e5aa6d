//! Camera component
//!
//! Holds the projection parameters. The view comes from the owner's
//! transform, so a camera is positioned like any other entity.

use crate::assets::ResourceManager;
use crate::ecs::component::{Behavior, BehaviorResult, ComponentContext};
use crate::ecs::parse::{optional_f32, ParseData};
use crate::foundation::math::{utils, Mat4, Mat4Ext};

/// Perspective camera parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraComponent {
    /// Horizontal field of view in degrees
    pub fov_x_in_degrees: f32,
    /// Near clipping plane distance
    pub near_z: f32,
    /// Far clipping plane distance
    pub far_z: f32,
}

impl Default for CameraComponent {
    fn default() -> Self {
        Self {
            fov_x_in_degrees: 90.0,
            near_z: 0.1,
            far_z: 1000.0,
        }
    }
}

impl CameraComponent {
    /// Camera with default parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Left-handed perspective projection for the given aspect ratio
    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_fov_x_lh(utils::deg_to_rad(self.fov_x_in_degrees), aspect, self.near_z, self.far_z)
    }
}

impl Behavior for CameraComponent {
    fn type_name(&self) -> &'static str {
        "CameraComponent"
    }

    fn parse(&mut self, ctx: &mut ComponentContext<'_>, data: &ParseData, _resources: &dyn ResourceManager) -> BehaviorResult {
        let name = ctx.component_name();
        if let Some(fov) = optional_f32(data, "fov_x_in_degrees", name)? {
            self.fov_x_in_degrees = fov;
        }
        if let Some(near) = optional_f32(data, "near_z", name)? {
            self.near_z = near;
        }
        if let Some(far) = optional_f32(data, "far_z", name)? {
            self.far_z = far;
        }
        Ok(())
    }
}
