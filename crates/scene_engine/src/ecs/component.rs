//! Component trait and per-component storage
//!
//! A component is a named, owner-less-until-attached unit of behavior. The
//! world stores a [`ComponentSlot`] per component: the shared state every
//! component has (name, owner, enabled, visible) plus the boxed
//! [`Behavior`] that supplies the capabilities.

use std::any::Any;

use crate::assets::ResourceManager;
use crate::ecs::components::Transform;
use crate::ecs::parse::ParseData;
use crate::ecs::script::ScriptError;
use crate::ecs::{SceneError, World};
use crate::foundation::collections::{ComponentId, EntityId};
use crate::physics::{CollisionEvent, PhysicsError, PhysicsSpace};
use crate::scene::{LightRegistry, RenderingContext};

/// Errors a component handler may raise
///
/// Handler errors never abort dispatch. The dispatcher logs them with the
/// entity and component names and moves on to the next recipient.
#[derive(thiserror::Error, Debug)]
pub enum BehaviorError {
    /// Error raised by a script handler
    #[error("Script error: {0}")]
    Script(#[from] ScriptError),

    /// Missing or malformed parse data
    #[error("Parse error in component '{component}': key '{key}' {problem}")]
    Parse {
        /// Component being parsed
        component: String,
        /// Offending key
        key: String,
        /// What is wrong with the key
        problem: String,
    },

    /// Physics operation failed
    #[error("Physics error: {0}")]
    Physics(#[from] PhysicsError),

    /// Structural operation failed
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),
}

/// Result type returned by every handler
pub type BehaviorResult = Result<(), BehaviorError>;

/// Type-erased access used for typed component lookup
pub trait AsAny: Any {
    /// Borrow as `Any`
    fn as_any(&self) -> &dyn Any;
    /// Mutably borrow as `Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Services shared by every component of a scene besides the world itself
#[derive(Default)]
pub struct SceneServices {
    /// Collision geometry and bodies
    pub physics: PhysicsSpace,
    /// Lights that contribute to rendering
    pub lights: LightRegistry,
}

impl SceneServices {
    /// Create empty services
    pub fn new() -> Self {
        Self::default()
    }
}

/// What a handler gets to work with
///
/// The component's own behavior is taken out of the world while the handler
/// runs, so the world may be mutated freely through `world`, including
/// destroying the component that is currently running.
pub struct ComponentContext<'a> {
    /// The world the component lives in
    pub world: &'a mut World,
    /// Physics and lighting services
    pub services: &'a mut SceneServices,
    component: ComponentId,
    owner: EntityId,
}

impl<'a> ComponentContext<'a> {
    /// Create a context for `component` owned by `owner`
    pub fn new(
        world: &'a mut World,
        services: &'a mut SceneServices,
        component: ComponentId,
        owner: EntityId,
    ) -> Self {
        Self { world, services, component, owner }
    }

    /// Id of the component whose handler is running
    pub fn component_id(&self) -> ComponentId {
        self.component
    }

    /// Owner of the running component
    pub fn owner(&self) -> EntityId {
        self.owner
    }

    /// Name of the running component
    pub fn component_name(&self) -> &str {
        self.world.component(self.component).map_or("<destroyed>", |slot| slot.name())
    }

    /// Name of the owning entity
    pub fn owner_name(&self) -> &str {
        self.world.entity(self.owner).map_or("<destroyed>", |node| node.name())
    }

    /// Owner's transform, if the owner still exists
    pub fn owner_transform(&self) -> Option<&Transform> {
        self.world.entity(self.owner).map(|node| node.transform())
    }

    /// Owner's transform for mutation
    pub fn owner_transform_mut(&mut self) -> Option<&mut Transform> {
        self.world.entity_mut(self.owner).map(|node| node.transform_mut())
    }

    /// The scene's physics space
    pub fn physics(&mut self) -> &mut PhysicsSpace {
        &mut self.services.physics
    }
}

/// Capabilities of a component
///
/// Every handler has a no-op default, so a behavior only implements what it
/// reacts to. Collision handlers are only reached for enabled components,
/// render only for visible ones, update only for enabled ones.
#[allow(unused_variables)]
pub trait Behavior: AsAny {
    /// Type name used in logs and by the component factory
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Configure the component from declarative data
    ///
    /// Called after the component is attached, so the owner is available.
    fn parse(
        &mut self,
        ctx: &mut ComponentContext<'_>,
        data: &ParseData,
        resources: &dyn ResourceManager,
    ) -> BehaviorResult {
        Ok(())
    }

    /// Scene start
    fn start(&mut self, ctx: &mut ComponentContext<'_>) -> BehaviorResult {
        Ok(())
    }

    /// Scene became the active scene
    fn activate(&mut self, ctx: &mut ComponentContext<'_>) -> BehaviorResult {
        Ok(())
    }

    /// Per-frame simulation step
    fn update(&mut self, ctx: &mut ComponentContext<'_>, dt: f32) -> BehaviorResult {
        Ok(())
    }

    /// Per-frame rendering
    fn render(&mut self, ctx: &mut ComponentContext<'_>, rendering: &RenderingContext) -> BehaviorResult {
        Ok(())
    }

    /// Scene stopped being the active scene
    fn deactivate(&mut self, ctx: &mut ComponentContext<'_>) -> BehaviorResult {
        Ok(())
    }

    /// Scene end
    fn end(&mut self, ctx: &mut ComponentContext<'_>) -> BehaviorResult {
        Ok(())
    }

    /// Contact between two trigger colliders this tick
    fn collide(&mut self, ctx: &mut ComponentContext<'_>, event: &CollisionEvent) -> BehaviorResult {
        Ok(())
    }

    /// A collider pair started touching
    fn collider_enter(&mut self, ctx: &mut ComponentContext<'_>, event: &CollisionEvent) -> BehaviorResult {
        Ok(())
    }

    /// A collider pair stopped touching
    fn collider_exit(&mut self, ctx: &mut ComponentContext<'_>, event: &CollisionEvent) -> BehaviorResult {
        Ok(())
    }

    /// Release external resources (physics geometry, light registrations)
    ///
    /// Called exactly once, when the component is removed from the world.
    fn destroy(&mut self, services: &mut SceneServices, this: ComponentId) {}
}

/// World-side storage for one component
pub struct ComponentSlot {
    pub(crate) name: String,
    pub(crate) owner: Option<EntityId>,
    pub(crate) enabled: bool,
    pub(crate) visible: bool,
    pub(crate) type_name: &'static str,
    pub(crate) behavior: Option<Box<dyn Behavior>>,
}

impl ComponentSlot {
    pub(crate) fn new(name: String, behavior: Box<dyn Behavior>) -> Self {
        Self {
            name,
            owner: None,
            enabled: true,
            visible: true,
            type_name: behavior.type_name(),
            behavior: Some(behavior),
        }
    }

    /// Component name, unique among its owner's components
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning entity, `None` while detached
    pub fn owner(&self) -> Option<EntityId> {
        self.owner
    }

    /// Whether update and collision handlers run
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable the component
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether the render handler runs
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show or hide the component
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Type name of the behavior
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The behavior, `None` while one of its handlers is running
    pub fn behavior(&self) -> Option<&dyn Behavior> {
        self.behavior.as_deref()
    }

    /// Whether the behavior is a `T`
    pub fn is<T: Behavior>(&self) -> bool {
        self.behavior().is_some_and(|behavior| behavior.as_any().is::<T>())
    }

    /// Borrow the behavior as a `T`
    pub fn downcast_ref<T: Behavior>(&self) -> Option<&T> {
        self.behavior()?.as_any().downcast_ref::<T>()
    }

    /// Mutably borrow the behavior as a `T`
    pub fn downcast_mut<T: Behavior>(&mut self) -> Option<&mut T> {
        self.behavior.as_deref_mut()?.as_any_mut().downcast_mut::<T>()
    }
}

impl std::fmt::Debug for ComponentSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentSlot")
            .field("name", &self.name)
            .field("type", &self.type_name)
            .field("owner", &self.owner)
            .field("enabled", &self.enabled)
            .field("visible", &self.visible)
            .finish_non_exhaustive()
    }
}
