//! Constant rotation component

use crate::assets::ResourceManager;
use crate::ecs::component::{Behavior, BehaviorResult, ComponentContext};
use crate::ecs::parse::{require_f32, require_vec3, ParseData};
use crate::foundation::math::{utils, Quat, Unit, Vec3};

/// Spins the owner around a fixed axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationComponent {
    speed: f32,
    axis: Vec3,
}

impl Default for RotationComponent {
    fn default() -> Self {
        Self { speed: 0.0, axis: Vec3::y() }
    }
}

impl RotationComponent {
    /// Rotate at `speed` radians per second around `axis`
    pub fn new(speed: f32, axis: Vec3) -> Self {
        Self { speed, axis }
    }

    /// Speed in radians per second
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Rotation axis
    pub fn axis(&self) -> Vec3 {
        self.axis
    }
}

impl Behavior for RotationComponent {
    fn type_name(&self) -> &'static str {
        "RotationComponent"
    }

    fn parse(&mut self, ctx: &mut ComponentContext<'_>, data: &ParseData, _resources: &dyn ResourceManager) -> BehaviorResult {
        let name = ctx.component_name();
        // Scene files give the speed in degrees per second
        self.speed = utils::deg_to_rad(require_f32(data, "speed", name)?);
        self.axis = require_vec3(data, "axis", name)?;
        Ok(())
    }

    fn update(&mut self, ctx: &mut ComponentContext<'_>, dt: f32) -> BehaviorResult {
        let Some(axis) = Unit::try_new(self.axis, f32::EPSILON) else {
            return Ok(());
        };
        let step = Quat::from_axis_angle(&axis, self.speed * dt);
        if let Some(transform) = ctx.owner_transform_mut() {
            transform.rotate(step);
        }
        Ok(())
    }
}
