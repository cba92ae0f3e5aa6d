//! Model renderer component
//!
//! Resolves a model, a shader and an optional material through the resource
//! manager at parse time and queues a draw of the owner every frame.

use crate::assets::{Resource, ResourceKind, ResourceManager};
use crate::ecs::component::{Behavior, BehaviorResult, ComponentContext};
use crate::ecs::parse::{optional_str, ParseData};
use crate::scene::{DrawCommand, RenderingContext};

/// Draws a model with a shader and a material
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelRendererComponent {
    model: Option<Resource>,
    shader: Option<Resource>,
    material: Option<Resource>,
}

impl ModelRendererComponent {
    /// Renderer with nothing assigned
    pub fn new() -> Self {
        Self::default()
    }

    /// Renderer with resources assigned directly
    pub fn with_resources(model: Resource, shader: Resource, material: Option<Resource>) -> Self {
        Self {
            model: Some(model),
            shader: Some(shader),
            material,
        }
    }

    /// Assigned model
    pub fn model(&self) -> Option<&Resource> {
        self.model.as_ref()
    }

    /// Assigned shader
    pub fn shader(&self) -> Option<&Resource> {
        self.shader.as_ref()
    }

    /// Assigned material
    pub fn material(&self) -> Option<&Resource> {
        self.material.as_ref()
    }
}

/// Look up `key` in the resource manager, warning when it cannot be used
fn resolve(
    data: &ParseData,
    key: &str,
    kind: ResourceKind,
    component: &str,
    resources: &dyn ResourceManager,
) -> Result<Option<Resource>, crate::ecs::BehaviorError> {
    let Some(name) = optional_str(data, key, component)? else {
        return Ok(None);
    };
    match resources.get_resource(name) {
        Some(resource) if resource.kind() == kind => Ok(Some(resource)),
        Some(resource) => {
            log::warn!(
                "[ModelRenderer]: '{}' of component '{}' is a {:?}, expected a {:?}",
                name,
                component,
                resource.kind(),
                kind
            );
            Ok(None)
        }
        None => {
            log::warn!("[ModelRenderer]: Resource '{}' of component '{}' was not found", name, component);
            Ok(None)
        }
    }
}

impl Behavior for ModelRendererComponent {
    fn type_name(&self) -> &'static str {
        "ModelRendererComponent"
    }

    fn parse(&mut self, ctx: &mut ComponentContext<'_>, data: &ParseData, resources: &dyn ResourceManager) -> BehaviorResult {
        let name = ctx.component_name();
        self.model = resolve(data, "model", ResourceKind::Model, name, resources)?;
        self.shader = resolve(data, "shader", ResourceKind::Shader, name, resources)?;
        self.material = resolve(data, "material", ResourceKind::Material, name, resources)?;
        Ok(())
    }

    fn render(&mut self, ctx: &mut ComponentContext<'_>, rendering: &RenderingContext) -> BehaviorResult {
        let (Some(model), Some(shader)) = (&self.model, &self.shader) else {
            return Ok(());
        };
        let Some(transform) = ctx.owner_transform() else {
            return Ok(());
        };
        rendering.submit(DrawCommand {
            entity: ctx.owner(),
            model: model.name().to_string(),
            shader: shader.name().to_string(),
            material: self.material.as_ref().map(|m| m.name().to_string()),
            world: transform.world_matrix(),
            world_inverse_transpose: transform.world_inverse_transpose_matrix(),
        });
        Ok(())
    }
}
