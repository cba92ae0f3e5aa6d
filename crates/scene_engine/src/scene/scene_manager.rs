//! Scene - root of the entity tree and driver of the frame lifecycle
//!
//! Following Game Engine Architecture Chapter 16.2 - Runtime Object Model
//! Architectures. A scene owns the world, the physics space, the light
//! registry and the collision state carried between ticks. Each frame runs
//! `update` (which ends with the collision tick) and then `render`.

use crate::assets::ResourceManager;
use crate::config::EngineConfig;
use crate::ecs::components::{CameraComponent, ColliderComponent, RigidBodyComponent};
use crate::ecs::parse::{optional_bool, require_str, ParseData};
use crate::ecs::{
    dispatch, Behavior, BehaviorError, ComponentContext, ComponentFactory, Message, SceneError, SceneServices, World,
};
use crate::foundation::collections::{ComponentId, EntityId};
use crate::physics::{collision_system, CollisionReport, CollisionState, PhysicsSpace, ShapeDesc};
use crate::scene::{DrawCommand, LightRegistry, RenderingContext};

/// A scene: one entity tree plus the services its components use
pub struct Scene {
    name: String,
    config: EngineConfig,
    world: World,
    services: SceneServices,
    factory: ComponentFactory,
    root: Option<EntityId>,
    active_camera: Option<EntityId>,
    collision_state: CollisionState,
    enabled: bool,
    visible: bool,
}

impl Scene {
    /// Empty scene with default settings and the native component types
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, EngineConfig::default())
    }

    /// Empty scene with the given settings
    pub fn with_config(name: impl Into<String>, config: EngineConfig) -> Self {
        Self {
            name: name.into(),
            world: World::with_max_depth(config.max_dispatch_depth),
            config,
            services: SceneServices::new(),
            factory: ComponentFactory::with_builtins(),
            root: None,
            active_camera: None,
            collision_state: CollisionState::new(),
            enabled: true,
            visible: true,
        }
    }

    /// Scene name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scene settings
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The entity tree
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The entity tree for mutation
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The physics space
    pub fn physics(&self) -> &PhysicsSpace {
        &self.services.physics
    }

    /// Registered lights
    pub fn lights(&self) -> &LightRegistry {
        &self.services.lights
    }

    /// Collision state of the last tick
    pub fn collision_state(&self) -> &CollisionState {
        &self.collision_state
    }

    /// Component types known to [`Scene::load_component`]
    pub fn factory_mut(&mut self) -> &mut ComponentFactory {
        &mut self.factory
    }

    /// Whether `update` runs
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or pause the scene
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether `render` runs
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show or hide the scene
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    // ---- tree -----------------------------------------------------------

    /// Root entity
    pub fn root(&self) -> Option<EntityId> {
        self.root
    }

    /// Replace the root entity
    ///
    /// The root must exist and have no parent. The active camera is cleared.
    pub fn set_root(&mut self, root: EntityId) -> Result<(), SceneError> {
        let node = self.world.entity(root).ok_or(SceneError::UnknownEntity(root))?;
        if node.parent().is_some() {
            return Err(SceneError::AlreadyParented { child: node.name().to_string() });
        }
        self.root = Some(root);
        self.active_camera = None;
        Ok(())
    }

    /// Create an entity under `parent`
    pub fn spawn(&mut self, parent: EntityId, name: impl Into<String>) -> Result<EntityId, SceneError> {
        if !self.world.contains_entity(parent) {
            return Err(SceneError::UnknownEntity(parent));
        }
        let entity = self.world.create_entity(name);
        if let Err(err) = self.world.attach_child(parent, entity) {
            self.world.destroy_entity(entity, &mut self.services)?;
            return Err(err);
        }
        Ok(entity)
    }

    /// Destroy an entity and its subtree
    ///
    /// Clears the root or the active camera if they were part of the subtree.
    pub fn destroy_entity(&mut self, entity: EntityId) -> Result<(), SceneError> {
        self.world.destroy_entity(entity, &mut self.services)?;
        if self.root.is_some_and(|root| !self.world.contains_entity(root)) {
            self.root = None;
        }
        if self.active_camera.is_some_and(|camera| !self.world.contains_entity(camera)) {
            self.active_camera = None;
        }
        Ok(())
    }

    /// Destroy a component
    pub fn destroy_component(&mut self, component: ComponentId) -> Result<(), SceneError> {
        self.world.destroy_component(component, &mut self.services)
    }

    /// Destroy every entity and component and empty the physics space
    pub fn clear(&mut self) {
        let entities: Vec<EntityId> = self
            .world
            .entities()
            .filter(|(_, node)| node.parent().is_none())
            .map(|(id, _)| id)
            .collect();
        for entity in entities {
            if let Err(err) = self.world.destroy_entity(entity, &mut self.services) {
                log::error!("[Scene]: Failed to destroy entity while clearing '{}': {}", self.name, err);
            }
        }
        let components: Vec<ComponentId> = self.world.components().map(|(id, _)| id).collect();
        for component in components {
            if let Err(err) = self.world.destroy_component(component, &mut self.services) {
                log::error!("[Scene]: Failed to destroy component while clearing '{}': {}", self.name, err);
            }
        }
        self.root = None;
        self.active_camera = None;
        self.collision_state.clear();
        self.services.lights.clear();
        self.services.physics.clear();
    }

    // ---- cameras --------------------------------------------------------

    /// Entity whose view is rendered
    pub fn active_camera(&self) -> Option<EntityId> {
        self.active_camera
    }

    /// Render from `camera`
    pub fn activate_camera(&mut self, camera: EntityId) -> Result<(), SceneError> {
        if !self.world.contains_entity(camera) {
            return Err(SceneError::UnknownEntity(camera));
        }
        self.active_camera = Some(camera);
        Ok(())
    }

    /// Render from the entity called `name`, searched depth-first from the
    /// root
    pub fn activate_camera_by_name(&mut self, name: &str) -> Result<(), SceneError> {
        let root = self.root.ok_or_else(|| SceneError::NoSuchEntity(name.to_string()))?;
        let camera = if self.world.name(root) == Some(name) {
            Some(root)
        } else {
            self.world.get_child_by_name(root, name)
        };
        let camera = camera.ok_or_else(|| SceneError::NoSuchEntity(name.to_string()))?;
        self.activate_camera(camera)
    }

    // ---- lifecycle ------------------------------------------------------

    fn broadcast(&mut self, message: &Message<'_>) {
        match self.root {
            Some(root) => dispatch(&mut self.world, &mut self.services, root, message),
            None => log::debug!("[Scene]: '{}' has no root, '{}' not sent", self.name, message.handler_name()),
        }
    }

    /// Send `start` through the tree
    pub fn start(&mut self) {
        log::info!("[Scene]: Starting '{}'", self.name);
        self.broadcast(&Message::Start);
    }

    /// Send `activate` through the tree
    pub fn activate(&mut self) {
        self.broadcast(&Message::Activate);
    }

    /// Send `deactivate` through the tree
    pub fn deactivate(&mut self) {
        self.broadcast(&Message::Deactivate);
    }

    /// Send `end` through the tree
    pub fn end(&mut self) {
        log::info!("[Scene]: Ending '{}'", self.name);
        self.broadcast(&Message::End);
    }

    /// Send `update` through the tree, then run the collision tick
    pub fn update(&mut self, dt: f32) -> CollisionReport {
        if !self.enabled {
            return CollisionReport::default();
        }
        self.broadcast(&Message::Update(dt));
        self.handle_collisions()
    }

    /// Run one collision tick and deliver its events
    pub fn handle_collisions(&mut self) -> CollisionReport {
        collision_system::handle_collisions(&mut self.world, &mut self.services, &mut self.collision_state)
    }

    /// Send `render` through the tree and return the queued draws
    ///
    /// Nothing is rendered without a visible root and an active camera.
    pub fn render(&mut self) -> Option<Vec<DrawCommand>> {
        if !self.visible {
            return None;
        }
        let root = self.root?;
        if !self.world.entity(root)?.is_visible() {
            return None;
        }
        let Some(camera) = self.active_camera else {
            log::warn!("[Scene]: '{}' has no active camera, nothing rendered", self.name);
            return None;
        };
        let Some(camera_transform) = self.world.transform(camera) else {
            log::warn!("[Scene]: Active camera of '{}' no longer exists", self.name);
            self.active_camera = None;
            return None;
        };
        let view = camera_transform.view_matrix();
        let camera_position = camera_transform.position();

        let projection = self
            .world
            .get_component_by_type::<CameraComponent>(camera)
            .and_then(|id| self.world.behavior::<CameraComponent>(id))
            .copied()
            .unwrap_or_default()
            .projection(self.config.aspect_ratio());
        let lights = self.services.lights.collect(&self.world, self.config.max_dynamic_lights);

        let rendering = RenderingContext::new(view, projection, camera_position, self.config.render_target, lights);
        dispatch(&mut self.world, &mut self.services, root, &Message::Render(&rendering));
        Some(rendering.into_commands())
    }

    /// One frame: `update` (with its collision tick) followed by `render`
    pub fn frame(&mut self, dt: f32) -> Option<Vec<DrawCommand>> {
        self.update(dt);
        self.render()
    }

    // ---- components -----------------------------------------------------

    /// Instantiate, attach and parse a component from declarative data
    ///
    /// `data` must contain `"name"` and may contain `"enabled"` and
    /// `"visible"`. A component whose parse fails is destroyed again; other
    /// components are unaffected.
    pub fn load_component(
        &mut self,
        entity: EntityId,
        type_name: &str,
        data: &ParseData,
        resources: &dyn ResourceManager,
    ) -> Result<ComponentId, BehaviorError> {
        let behavior = self.factory.create(type_name)?;
        let name = require_str(data, "name", type_name)?.to_string();
        let enabled = optional_bool(data, "enabled", &name)?;
        let visible = optional_bool(data, "visible", &name)?;

        let component = self.world.create_component(name, behavior);
        if let Err(err) = self.world.attach_component(entity, component) {
            self.discard(component);
            return Err(err.into());
        }
        if let Some(slot) = self.world.component_mut(component) {
            slot.set_enabled(enabled.unwrap_or(true));
            slot.set_visible(visible.unwrap_or(true));
        }

        match self.with_dyn_behavior(component, |behavior, ctx| behavior.parse(ctx, data, resources)) {
            Ok(Ok(())) => Ok(component),
            Ok(Err(err)) => {
                log::error!(
                    "[Scene]: Failed to load {} on '{}': {}",
                    type_name,
                    self.world.label(entity),
                    err
                );
                self.discard(component);
                Err(err)
            }
            Err(err) => {
                self.discard(component);
                Err(err.into())
            }
        }
    }

    fn discard(&mut self, component: ComponentId) {
        if let Err(err) = self.world.destroy_component(component, &mut self.services) {
            log::error!("[Scene]: Failed to discard component: {}", err);
        }
    }

    /// Run `f` against a component's behavior with a full handler context
    ///
    /// Fails if the component is detached, busy, or not a `T`.
    pub fn with_behavior<T: Behavior, R>(
        &mut self,
        component: ComponentId,
        f: impl FnOnce(&mut T, &mut ComponentContext<'_>) -> R,
    ) -> Result<R, SceneError> {
        let slot = self.world.component(component).ok_or(SceneError::UnknownComponent(component))?;
        let wrong_type = SceneError::WrongComponentType {
            component: slot.name().to_string(),
            expected: std::any::type_name::<T>(),
            actual: slot.type_name(),
        };
        self.with_dyn_behavior(component, |behavior, ctx| {
            behavior.as_any_mut().downcast_mut::<T>().map(|typed| f(typed, ctx))
        })?
        .ok_or(wrong_type)
    }

    fn with_dyn_behavior<R>(
        &mut self,
        component: ComponentId,
        f: impl FnOnce(&mut dyn Behavior, &mut ComponentContext<'_>) -> R,
    ) -> Result<R, SceneError> {
        let owner = self.world.require_owner(component)?;
        let mut behavior = self.world.take_behavior(component)?;
        let result = {
            let mut ctx = ComponentContext::new(&mut self.world, &mut self.services, component, owner);
            f(behavior.as_mut(), &mut ctx)
        };
        if let Some(mut orphan) = self.world.restore_behavior(component, behavior) {
            orphan.destroy(&mut self.services, component);
        }
        Ok(result)
    }

    /// Replace the shape of a collider or rigid body component
    pub fn set_shape(&mut self, component: ComponentId, shape: ShapeDesc) -> Result<(), BehaviorError> {
        let slot = self.world.component(component).ok_or(SceneError::UnknownComponent(component))?;
        if slot.is::<ColliderComponent>() {
            self.with_behavior::<ColliderComponent, _>(component, |collider, ctx| collider.set_shape(ctx, shape))??;
        } else {
            self.with_behavior::<RigidBodyComponent, _>(component, |body, ctx| body.set_shape(ctx, shape))??;
        }
        Ok(())
    }
}

impl Drop for Scene {
    fn drop(&mut self) {
        self.clear();
    }
}
