//! Light registry and per-frame light records

use crate::ecs::components::{LightComponent, LightType};
use crate::ecs::World;
use crate::foundation::collections::ComponentId;
use crate::foundation::math::Vec3;

/// Light as handed to the renderer for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightData {
    /// The type of light
    pub light_type: LightType,
    /// World position of the owning entity
    pub position: Vec3,
    /// Diffuse color
    pub diffuse: Vec3,
    /// Specular color
    pub specular: Vec3,
    /// Ambient color
    pub ambient: Vec3,
    /// Intensity multiplier
    pub intensity: f32,
    /// Constant, linear and quadratic attenuation
    pub attenuation: Vec3,
}

/// Light components that currently contribute to rendering, in
/// registration order
#[derive(Debug, Default)]
pub struct LightRegistry {
    lights: Vec<ComponentId>,
}

impl LightRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a light; returns false if it already was
    pub fn register(&mut self, light: ComponentId) -> bool {
        if self.lights.contains(&light) {
            return false;
        }
        self.lights.push(light);
        true
    }

    /// Unregister a light; returns false if it was not registered
    pub fn unregister(&mut self, light: ComponentId) -> bool {
        let before = self.lights.len();
        self.lights.retain(|&l| l != light);
        self.lights.len() != before
    }

    /// Whether a light is registered
    pub fn contains(&self, light: ComponentId) -> bool {
        self.lights.contains(&light)
    }

    /// Number of registered lights
    pub fn len(&self) -> usize {
        self.lights.len()
    }

    /// Whether no light is registered
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// Registered lights in order
    pub fn iter(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.lights.iter().copied()
    }

    /// Drop every registration
    pub fn clear(&mut self) {
        self.lights.clear();
    }

    /// Light records for the first `max` enabled lights whose owner is
    /// alive and enabled
    pub fn collect(&self, world: &World, max: usize) -> Vec<LightData> {
        self.lights
            .iter()
            .filter_map(|&id| {
                let slot = world.component(id)?;
                if !slot.is_enabled() {
                    return None;
                }
                let owner = slot.owner()?;
                if !world.entity(owner)?.is_enabled() {
                    return None;
                }
                let light = slot.downcast_ref::<LightComponent>()?;
                let position = world.transform(owner)?.position();
                Some(light.light_data(position))
            })
            .take(max)
            .collect()
    }
}
