//! Scripting boundary
//!
//! Behavior written in a scripting language reaches the engine through a
//! [`ScriptModule`]: a named bag of optional handlers. [`DynamicComponent`]
//! adapts a module to [`Behavior`], converting each capability into a named
//! call. Which handlers exist is looked up once when the module is bound;
//! capabilities without a handler are skipped silently.

use crate::assets::ResourceManager;
use crate::ecs::component::{Behavior, BehaviorResult, ComponentContext};
use crate::ecs::parse::ParseData;
use crate::physics::CollisionEvent;
use crate::scene::RenderingContext;

/// Error raised inside a script handler
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{module}.{handler}: {message}")]
pub struct ScriptError {
    /// Module that raised
    pub module: String,
    /// Handler that raised
    pub handler: String,
    /// Error text
    pub message: String,
}

impl ScriptError {
    /// Build an error for `module.handler`
    pub fn new(module: impl Into<String>, handler: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            handler: handler.into(),
            message: message.into(),
        }
    }
}

bitflags::bitflags! {
    /// Handlers a script module provides
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Handlers: u16 {
        /// `parse(data, resources)`
        const PARSE = 1 << 0;
        /// `start()`
        const START = 1 << 1;
        /// `activate()`
        const ACTIVATE = 1 << 2;
        /// `update(dt)`
        const UPDATE = 1 << 3;
        /// `render(rendering)`
        const RENDER = 1 << 4;
        /// `deactivate()`
        const DEACTIVATE = 1 << 5;
        /// `end()`
        const END = 1 << 6;
        /// `collide(event)`
        const COLLIDE = 1 << 7;
        /// `collider_enter(event)`
        const COLLIDER_ENTER = 1 << 8;
        /// `collider_exit(event)`
        const COLLIDER_EXIT = 1 << 9;
    }
}

impl Handlers {
    /// Every handler with its script-side name
    pub const NAMED: [(Self, &'static str); 10] = [
        (Self::PARSE, "parse"),
        (Self::START, "start"),
        (Self::ACTIVATE, "activate"),
        (Self::UPDATE, "update"),
        (Self::RENDER, "render"),
        (Self::DEACTIVATE, "deactivate"),
        (Self::END, "end"),
        (Self::COLLIDE, "collide"),
        (Self::COLLIDER_ENTER, "collider_enter"),
        (Self::COLLIDER_EXIT, "collider_exit"),
    ];
}

/// Arguments converted for a script call
#[derive(Clone, Copy)]
pub enum ScriptArgs<'a> {
    /// No arguments
    None,
    /// Elapsed seconds
    Delta(f32),
    /// Current rendering context
    Render(&'a RenderingContext),
    /// Collision event
    Collision(&'a CollisionEvent),
    /// Declarative data and the resource manager used to resolve names
    Parse(&'a ParseData, &'a dyn ResourceManager),
}

/// A script-defined component type
pub trait ScriptModule {
    /// Module name, used in logs and errors
    fn name(&self) -> &str;

    /// Whether the module defines `handler`
    fn has_handler(&self, handler: &str) -> bool;

    /// Invoke `handler` with converted arguments
    fn call(
        &mut self,
        handler: &str,
        args: ScriptArgs<'_>,
        host: &mut ComponentContext<'_>,
    ) -> Result<(), ScriptError>;
}

/// Component backed by a [`ScriptModule`]
pub struct DynamicComponent {
    module: Box<dyn ScriptModule>,
    handlers: Handlers,
}

impl DynamicComponent {
    /// Bind a module, looking up its handlers once
    pub fn bind(module: Box<dyn ScriptModule>) -> Self {
        let handlers = Handlers::NAMED
            .iter()
            .filter(|(_, name)| module.has_handler(name))
            .fold(Handlers::empty(), |acc, (flag, _)| acc | *flag);
        log::debug!("[Script]: Bound module '{}' with handlers {:?}", module.name(), handlers);
        Self { module, handlers }
    }

    /// Handlers found at bind time
    pub fn handlers(&self) -> Handlers {
        self.handlers
    }

    /// Name of the bound module
    pub fn module_name(&self) -> &str {
        self.module.name()
    }

    /// The bound module
    pub fn module(&self) -> &dyn ScriptModule {
        self.module.as_ref()
    }

    fn forward(
        &mut self,
        flag: Handlers,
        handler: &str,
        args: ScriptArgs<'_>,
        ctx: &mut ComponentContext<'_>,
    ) -> BehaviorResult {
        if !self.handlers.contains(flag) {
            return Ok(());
        }
        self.module.call(handler, args, ctx)?;
        Ok(())
    }
}

impl Behavior for DynamicComponent {
    fn type_name(&self) -> &'static str {
        "DynamicComponent"
    }

    fn parse(&mut self, ctx: &mut ComponentContext<'_>, data: &ParseData, resources: &dyn ResourceManager) -> BehaviorResult {
        self.forward(Handlers::PARSE, "parse", ScriptArgs::Parse(data, resources), ctx)
    }

    fn start(&mut self, ctx: &mut ComponentContext<'_>) -> BehaviorResult {
        self.forward(Handlers::START, "start", ScriptArgs::None, ctx)
    }

    fn activate(&mut self, ctx: &mut ComponentContext<'_>) -> BehaviorResult {
        self.forward(Handlers::ACTIVATE, "activate", ScriptArgs::None, ctx)
    }

    fn update(&mut self, ctx: &mut ComponentContext<'_>, dt: f32) -> BehaviorResult {
        self.forward(Handlers::UPDATE, "update", ScriptArgs::Delta(dt), ctx)
    }

    fn render(&mut self, ctx: &mut ComponentContext<'_>, rendering: &RenderingContext) -> BehaviorResult {
        self.forward(Handlers::RENDER, "render", ScriptArgs::Render(rendering), ctx)
    }

    fn deactivate(&mut self, ctx: &mut ComponentContext<'_>) -> BehaviorResult {
        self.forward(Handlers::DEACTIVATE, "deactivate", ScriptArgs::None, ctx)
    }

    fn end(&mut self, ctx: &mut ComponentContext<'_>) -> BehaviorResult {
        self.forward(Handlers::END, "end", ScriptArgs::None, ctx)
    }

    fn collide(&mut self, ctx: &mut ComponentContext<'_>, event: &CollisionEvent) -> BehaviorResult {
        self.forward(Handlers::COLLIDE, "collide", ScriptArgs::Collision(event), ctx)
    }

    fn collider_enter(&mut self, ctx: &mut ComponentContext<'_>, event: &CollisionEvent) -> BehaviorResult {
        self.forward(Handlers::COLLIDER_ENTER, "collider_enter", ScriptArgs::Collision(event), ctx)
    }

    fn collider_exit(&mut self, ctx: &mut ComponentContext<'_>, event: &CollisionEvent) -> BehaviorResult {
        self.forward(Handlers::COLLIDER_EXIT, "collider_exit", ScriptArgs::Collision(event), ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{dispatch, Message, SceneServices, World};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Spinner {
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl ScriptModule for Spinner {
        fn name(&self) -> &str {
            "spinner"
        }

        fn has_handler(&self, handler: &str) -> bool {
            matches!(handler, "update" | "end")
        }

        fn call(&mut self, handler: &str, args: ScriptArgs<'_>, host: &mut ComponentContext<'_>) -> Result<(), ScriptError> {
            self.calls.borrow_mut().push(handler.to_string());
            match (handler, args) {
                ("update", ScriptArgs::Delta(dt)) => {
                    let transform = host
                        .owner_transform_mut()
                        .ok_or_else(|| ScriptError::new("spinner", handler, "owner is gone"))?;
                    transform.move_by(crate::foundation::math::Vec3::new(dt, 0.0, 0.0));
                    Ok(())
                }
                ("end", _) => Err(ScriptError::new("spinner", handler, "raised on purpose")),
                _ => Ok(()),
            }
        }
    }

    #[test]
    fn test_bind_records_present_handlers() {
        let component = DynamicComponent::bind(Box::new(Spinner { calls: Rc::default() }));

        assert_eq!(component.handlers(), Handlers::UPDATE | Handlers::END);
        assert_eq!(component.module_name(), "spinner");
    }

    #[test]
    fn test_only_bound_handlers_are_called() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut world = World::new();
        let mut services = SceneServices::new();
        let entity = world.create_entity("spinning");
        let module = Spinner { calls: Rc::clone(&calls) };
        world.add_component(entity, "script", DynamicComponent::bind(Box::new(module))).unwrap();

        dispatch(&mut world, &mut services, entity, &Message::Start);
        dispatch(&mut world, &mut services, entity, &Message::Update(0.5));
        dispatch(&mut world, &mut services, entity, &Message::End);

        assert_eq!(*calls.borrow(), vec!["update", "end"]);
        let position = world.transform(entity).unwrap().position();
        assert!((position.x - 0.5).abs() < 1e-6);
    }
}
