//! Light component
//!
//! A light registers itself with the scene's
//! [`LightRegistry`](crate::scene::LightRegistry) while the scene is running;
//! the scene packs the registered lights into each frame's rendering context
//! using the owner's position.

use crate::assets::ResourceManager;
use crate::ecs::component::{Behavior, BehaviorError, BehaviorResult, ComponentContext, SceneServices};
use crate::ecs::parse::{require_f32, require_i64, require_vec3, ParseData};
use crate::foundation::collections::ComponentId;
use crate::foundation::math::Vec3;
use crate::scene::LightData;

/// Types of lights supported by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightType {
    /// Directional light with parallel rays
    Directional,
    /// Point light radiating from the owner's position
    #[default]
    Point,
    /// Cone of light from the owner's position
    Spot,
}

impl LightType {
    /// Integer code used in scene data
    pub fn code(self) -> i64 {
        match self {
            Self::Directional => 0,
            Self::Point => 1,
            Self::Spot => 2,
        }
    }

    /// Light type for an integer code
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Directional),
            1 => Some(Self::Point),
            2 => Some(Self::Spot),
            _ => None,
        }
    }
}

/// Light parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightComponent {
    /// The type of light
    pub light_type: LightType,
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

impl Default for LightComponent {
    fn default() -> Self {
        Self {
            light_type: LightType::Point,
            diffuse: Vec3::new(1.0, 1.0, 1.0),
            specular: Vec3::new(1.0, 1.0, 1.0),
            ambient: Vec3::zeros(),
            intensity: 1.0,
            attenuation: Vec3::new(1.0, 0.0, 0.0),
        }
    }
}

impl LightComponent {
    /// White point light
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-frame light record at `position`
    pub fn light_data(&self, position: Vec3) -> LightData {
        LightData {
            light_type: self.light_type,
            position,
            diffuse: self.diffuse,
            specular: self.specular,
            ambient: self.ambient,
            intensity: self.intensity,
            attenuation: self.attenuation,
        }
    }
}

impl Behavior for LightComponent {
    fn type_name(&self) -> &'static str {
        "LightComponent"
    }

    fn parse(&mut self, ctx: &mut ComponentContext<'_>, data: &ParseData, _resources: &dyn ResourceManager) -> BehaviorResult {
        let name = ctx.component_name();
        let code = require_i64(data, "lightType", name)?;
        self.light_type = LightType::from_code(code).ok_or_else(|| BehaviorError::Parse {
            component: name.to_string(),
            key: "lightType".to_string(),
            problem: format!("has unknown light type {code}"),
        })?;
        self.diffuse = require_vec3(data, "diffuse", name)?;
        self.specular = require_vec3(data, "specular", name)?;
        self.ambient = require_vec3(data, "ambient", name)?;
        self.intensity = require_f32(data, "intensity", name)?;
        self.attenuation = require_vec3(data, "attenuation", name)?;
        Ok(())
    }

    fn start(&mut self, ctx: &mut ComponentContext<'_>) -> BehaviorResult {
        let this = ctx.component_id();
        ctx.services.lights.register(this);
        Ok(())
    }

    fn activate(&mut self, ctx: &mut ComponentContext<'_>) -> BehaviorResult {
        let this = ctx.component_id();
        ctx.services.lights.register(this);
        Ok(())
    }

    fn deactivate(&mut self, ctx: &mut ComponentContext<'_>) -> BehaviorResult {
        let this = ctx.component_id();
        ctx.services.lights.unregister(this);
        Ok(())
    }

    fn end(&mut self, ctx: &mut ComponentContext<'_>) -> BehaviorResult {
        let this = ctx.component_id();
        ctx.services.lights.unregister(this);
        Ok(())
    }

    fn destroy(&mut self, services: &mut SceneServices, this: ComponentId) {
        services.lights.unregister(this);
    }
}
