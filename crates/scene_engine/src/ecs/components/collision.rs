//! Collision components
//!
//! Based on Game Engine Architecture 3rd Edition, Section 13.3: a collidable
//! object owns one or more shapes placed in the collision world. Here each
//! component owns one geometry in the scene's [`PhysicsSpace`] and keeps it
//! in step with its owner's transform on every update.
//!
//! `RigidBodyComponent` places its geometry on a body, `ColliderComponent`
//! uses a free geometry. Only trigger colliders generate events.

use crate::assets::ResourceManager;
use crate::ecs::component::{Behavior, BehaviorResult, ComponentContext, SceneServices};
use crate::ecs::parse::{require_bool, require_f32_list, require_str, ParseData};
use crate::foundation::collections::{BodyHandle, ComponentId, GeomHandle};
use crate::foundation::math::{Quat, Vec3};
use crate::physics::{PhysicsError, PhysicsSpace, ShapeDesc};

/// `is_trigger`, `shape` and `args` keys shared by both collision components
fn parse_trigger_and_shape(data: &ParseData, component: &str) -> Result<(bool, ShapeDesc), crate::ecs::BehaviorError> {
    let is_trigger = require_bool(data, "is_trigger", component)?;
    let kind = require_str(data, "shape", component)?;
    let args = require_f32_list(data, "args", component)?;
    let shape = ShapeDesc::from_args(kind, &args)?;
    Ok((is_trigger, shape))
}

fn owner_pose(ctx: &ComponentContext<'_>) -> Option<(Vec3, Quat)> {
    ctx.owner_transform().map(|t| (t.position(), t.orientation()))
}

fn release_geom(physics: &mut PhysicsSpace, geom: GeomHandle) {
    if let Err(err) = physics.destroy_geom(geom) {
        log::warn!("[Physics]: Releasing collision geometry failed: {}", err);
    }
}

/// Collision geometry mounted on a body that follows the owner
#[derive(Debug, Default)]
pub struct RigidBodyComponent {
    body: Option<BodyHandle>,
    geom: Option<GeomHandle>,
    shape: Option<ShapeDesc>,
    is_trigger: bool,
}

impl RigidBodyComponent {
    /// Shapeless, non-trigger rigid body
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether contacts are reported as trigger events
    pub fn is_trigger(&self) -> bool {
        self.is_trigger
    }

    /// Turn trigger reporting on or off
    pub fn make_trigger(&mut self, is_trigger: bool) {
        self.is_trigger = is_trigger;
    }

    /// Current shape
    pub fn shape(&self) -> Option<ShapeDesc> {
        self.shape
    }

    /// Body handle, once a shape has been set
    pub fn body(&self) -> Option<BodyHandle> {
        self.body
    }

    /// Geometry handle, once a shape has been set
    pub fn geom(&self) -> Option<GeomHandle> {
        self.geom
    }

    /// Replace the collision shape
    ///
    /// The previous geometry is destroyed. The body is created on first use
    /// and placed at the owner's pose right away.
    pub fn set_shape(&mut self, ctx: &mut ComponentContext<'_>, shape: ShapeDesc) -> Result<(), PhysicsError> {
        let component = ctx.component_id();
        let physics = ctx.physics();
        if let Some(old) = self.geom.take() {
            release_geom(physics, old);
        }
        let body = *self.body.get_or_insert_with(|| physics.create_body());
        let geom = physics.create_geom(shape, Some(component));
        physics.set_geom_body(geom, Some(body))?;

        self.geom = Some(geom);
        self.shape = Some(shape);
        self.sync(ctx)
    }

    fn sync(&self, ctx: &mut ComponentContext<'_>) -> Result<(), PhysicsError> {
        let (Some(body), Some((position, orientation))) = (self.body, owner_pose(ctx)) else {
            return Ok(());
        };
        ctx.physics().set_body_pose(body, &position, &orientation)
    }
}

impl Behavior for RigidBodyComponent {
    fn type_name(&self) -> &'static str {
        "RigidBodyComponent"
    }

    fn parse(&mut self, ctx: &mut ComponentContext<'_>, data: &ParseData, _resources: &dyn ResourceManager) -> BehaviorResult {
        let (is_trigger, shape) = parse_trigger_and_shape(data, ctx.component_name())?;
        self.make_trigger(is_trigger);
        self.set_shape(ctx, shape)?;
        Ok(())
    }

    fn update(&mut self, ctx: &mut ComponentContext<'_>, _dt: f32) -> BehaviorResult {
        self.sync(ctx)?;
        Ok(())
    }

    fn destroy(&mut self, services: &mut SceneServices, _this: ComponentId) {
        if let Some(geom) = self.geom.take() {
            release_geom(&mut services.physics, geom);
        }
        if let Some(body) = self.body.take() {
            if let Err(err) = services.physics.destroy_body(body) {
                log::warn!("[Physics]: Releasing rigid body failed: {}", err);
            }
        }
    }
}

/// Free collision geometry that follows the owner
#[derive(Debug, Default)]
pub struct ColliderComponent {
    geom: Option<GeomHandle>,
    shape: Option<ShapeDesc>,
    is_trigger: bool,
}

impl ColliderComponent {
    /// Shapeless, non-trigger collider
    pub fn new() -> Self {
        Self::default()
    }

    /// Shapeless trigger collider
    pub fn trigger() -> Self {
        Self { is_trigger: true, ..Self::default() }
    }

    /// Whether contacts are reported as trigger events
    pub fn is_trigger(&self) -> bool {
        self.is_trigger
    }

    /// Turn trigger reporting on or off
    pub fn make_trigger(&mut self, is_trigger: bool) {
        self.is_trigger = is_trigger;
    }

    /// Current shape
    pub fn shape(&self) -> Option<ShapeDesc> {
        self.shape
    }

    /// Geometry handle, once a shape has been set
    pub fn geom(&self) -> Option<GeomHandle> {
        self.geom
    }

    /// Replace the collision shape, destroying the previous geometry
    pub fn set_shape(&mut self, ctx: &mut ComponentContext<'_>, shape: ShapeDesc) -> Result<(), PhysicsError> {
        let component = ctx.component_id();
        let physics = ctx.physics();
        if let Some(old) = self.geom.take() {
            release_geom(physics, old);
        }
        self.geom = Some(physics.create_geom(shape, Some(component)));
        self.shape = Some(shape);
        self.sync(ctx)
    }

    fn sync(&self, ctx: &mut ComponentContext<'_>) -> Result<(), PhysicsError> {
        let (Some(geom), Some((position, orientation))) = (self.geom, owner_pose(ctx)) else {
            return Ok(());
        };
        ctx.physics().set_geom_pose(geom, &position, &orientation)
    }
}

impl Behavior for ColliderComponent {
    fn type_name(&self) -> &'static str {
        "ColliderComponent"
    }

    fn parse(&mut self, ctx: &mut ComponentContext<'_>, data: &ParseData, _resources: &dyn ResourceManager) -> BehaviorResult {
        let (is_trigger, shape) = parse_trigger_and_shape(data, ctx.component_name())?;
        self.make_trigger(is_trigger);
        self.set_shape(ctx, shape)?;
        Ok(())
    }

    fn update(&mut self, ctx: &mut ComponentContext<'_>, _dt: f32) -> BehaviorResult {
        self.sync(ctx)?;
        Ok(())
    }

    fn destroy(&mut self, services: &mut SceneServices, _this: ComponentId) {
        if let Some(geom) = self.geom.take() {
            release_geom(&mut services.physics, geom);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ResourceTable;
    use crate::ecs::{dispatch, Message, World};
    use approx::assert_relative_eq;
    use serde_json::json;

    fn parse_data(value: serde_json::Value) -> ParseData {
        value.as_object().cloned().unwrap()
    }

    fn parse_into(world: &mut World, services: &mut SceneServices, component: ComponentId, data: &ParseData) -> BehaviorResult {
        let owner = world.require_owner(component).unwrap();
        let mut behavior = world.take_behavior(component).unwrap();
        let result = {
            let mut ctx = ComponentContext::new(world, services, component, owner);
            behavior.parse(&mut ctx, data, &ResourceTable::new())
        };
        world.restore_behavior(component, behavior);
        result
    }

    #[test]
    fn test_collider_parse_creates_geometry_at_owner() {
        let mut world = World::new();
        let mut services = SceneServices::new();
        let entity = world.create_entity("ball");
        world.transform_mut(entity).unwrap().set_position(Vec3::new(2.0, 0.0, 0.0));
        let component = world.add_component(entity, "collider", ColliderComponent::new()).unwrap();

        let data = parse_data(json!({"name": "collider", "is_trigger": true, "shape": "SPHERE", "args": [0.5]}));
        parse_into(&mut world, &mut services, component, &data).unwrap();

        let collider = world.behavior::<ColliderComponent>(component).unwrap();
        assert!(collider.is_trigger());
        let geom = collider.geom().unwrap();
        assert_eq!(services.physics.geom_owner(geom), Some(component));
        let pose = services.physics.geom_pose(geom).unwrap();
        assert_relative_eq!(pose.translation.vector, Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_parse_requires_is_trigger() {
        let mut world = World::new();
        let mut services = SceneServices::new();
        let entity = world.create_entity("ball");
        let component = world.add_component(entity, "body", RigidBodyComponent::new()).unwrap();

        let data = parse_data(json!({"name": "body", "shape": "BOX", "args": [1, 1, 1]}));
        let result = parse_into(&mut world, &mut services, component, &data);

        assert!(result.unwrap_err().to_string().contains("is_trigger"));
        assert_eq!(services.physics.geom_count(), 0);
    }

    #[test]
    fn test_rigid_body_follows_owner_on_update() {
        let mut world = World::new();
        let mut services = SceneServices::new();
        let entity = world.create_entity("crate");
        let component = world.add_component(entity, "body", RigidBodyComponent::new()).unwrap();
        let data = parse_data(json!({"name": "body", "is_trigger": false, "shape": "BOX", "args": [1, 2, 3]}));
        parse_into(&mut world, &mut services, component, &data).unwrap();

        world.transform_mut(entity).unwrap().set_position(Vec3::new(0.0, 5.0, 0.0));
        dispatch(&mut world, &mut services, entity, &Message::Update(0.016));

        let body = world.behavior::<RigidBodyComponent>(component).unwrap().body().unwrap();
        assert_relative_eq!(
            services.physics.body_pose(body).unwrap().translation.vector,
            Vec3::new(0.0, 5.0, 0.0)
        );
    }

    #[test]
    fn test_reshaping_replaces_geometry_and_destroy_releases_it() {
        let mut world = World::new();
        let mut services = SceneServices::new();
        let entity = world.create_entity("crate");
        let component = world.add_component(entity, "body", RigidBodyComponent::new()).unwrap();
        for radius in [1.0, 2.0] {
            let data = parse_data(json!({"name": "body", "is_trigger": true, "shape": "SPHERE", "args": [radius]}));
            parse_into(&mut world, &mut services, component, &data).unwrap();
        }
        assert_eq!(services.physics.geom_count(), 1);
        assert_eq!(services.physics.body_count(), 1);

        world.destroy_entity(entity, &mut services).unwrap();
        assert_eq!(services.physics.geom_count(), 0);
        assert_eq!(services.physics.body_count(), 0);
    }
}
