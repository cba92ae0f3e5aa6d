//! Lifecycle message dispatch
//!
//! A message sent to an entity is delivered to the entity's transform, then
//! to each attached component in attachment order, then recursively to each
//! child in attachment order. `Update` skips disabled subtrees and `Render`
//! skips invisible ones. The collision family always walks the whole subtree
//! but only reaches enabled components.
//!
//! Handler errors are logged and never stop delivery to the remaining
//! recipients.

use crate::ecs::component::{Behavior, BehaviorResult, ComponentContext, SceneServices};
use crate::ecs::World;
use crate::foundation::collections::{ComponentId, EntityId};
use crate::physics::CollisionEvent;
use crate::scene::RenderingContext;

/// Lifecycle message
#[derive(Debug, Clone, Copy)]
pub enum Message<'a> {
    /// Scene start
    Start,
    /// Scene became active
    Activate,
    /// Simulation step with the elapsed time in seconds
    Update(f32),
    /// Render pass
    Render(&'a RenderingContext),
    /// Scene stopped being active
    Deactivate,
    /// Scene end
    End,
    /// Trigger contact this tick
    Collide(&'a CollisionEvent),
    /// Trigger pair started touching
    ColliderEnter(&'a CollisionEvent),
    /// Trigger pair stopped touching
    ColliderExit(&'a CollisionEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    Always,
    Enabled,
    Visible,
}

impl Message<'_> {
    /// Handler name, as used in logs and by script modules
    pub fn handler_name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Activate => "activate",
            Self::Update(_) => "update",
            Self::Render(_) => "render",
            Self::Deactivate => "deactivate",
            Self::End => "end",
            Self::Collide(_) => "collide",
            Self::ColliderEnter(_) => "collider_enter",
            Self::ColliderExit(_) => "collider_exit",
        }
    }

    fn entity_gate(&self) -> Gate {
        match self {
            Self::Update(_) => Gate::Enabled,
            Self::Render(_) => Gate::Visible,
            _ => Gate::Always,
        }
    }

    fn component_gate(&self) -> Gate {
        match self {
            Self::Update(_) | Self::Collide(_) | Self::ColliderEnter(_) | Self::ColliderExit(_) => Gate::Enabled,
            Self::Render(_) => Gate::Visible,
            Self::Start | Self::Activate | Self::Deactivate | Self::End => Gate::Always,
        }
    }

    fn invoke(&self, behavior: &mut dyn Behavior, ctx: &mut ComponentContext<'_>) -> BehaviorResult {
        match *self {
            Self::Start => behavior.start(ctx),
            Self::Activate => behavior.activate(ctx),
            Self::Update(dt) => behavior.update(ctx, dt),
            Self::Render(rendering) => behavior.render(ctx, rendering),
            Self::Deactivate => behavior.deactivate(ctx),
            Self::End => behavior.end(ctx),
            Self::Collide(event) => behavior.collide(ctx, event),
            Self::ColliderEnter(event) => behavior.collider_enter(ctx, event),
            Self::ColliderExit(event) => behavior.collider_exit(ctx, event),
        }
    }
}

/// Deliver `message` to `entity` and its subtree
pub fn dispatch(world: &mut World, services: &mut SceneServices, entity: EntityId, message: &Message<'_>) {
    if !world.contains_entity(entity) {
        log::error!(
            "[Scene]: Cannot send '{}' to unknown entity {:?}",
            message.handler_name(),
            entity
        );
        return;
    }
    dispatch_at(world, services, entity, message, 0);
}

fn dispatch_at(
    world: &mut World,
    services: &mut SceneServices,
    entity: EntityId,
    message: &Message<'_>,
    depth: usize,
) {
    if depth >= world.max_depth() {
        log::error!(
            "[Scene]: Maximum dispatch depth {} reached at '{}' while sending '{}', skipping subtree",
            world.max_depth(),
            world.label(entity),
            message.handler_name()
        );
        return;
    }

    let Some(node) = world.entity(entity) else {
        log::error!("[Scene]: Entity {:?} vanished while sending '{}'", entity, message.handler_name());
        return;
    };
    let admitted = match message.entity_gate() {
        Gate::Always => true,
        Gate::Enabled => node.is_enabled(),
        Gate::Visible => node.is_visible(),
    };
    if !admitted {
        return;
    }

    node.transform().handle_message(message);

    // Snapshots: handlers may restructure the tree while we walk it
    let components = node.components().to_vec();
    let children = node.children().to_vec();

    for component in components {
        if !still_attached(world, entity, component) {
            continue;
        }
        deliver(world, services, entity, component, message);
    }

    for child in children {
        let still_child = world
            .entity(entity)
            .is_some_and(|node| node.children().contains(&child));
        if !still_child {
            continue;
        }
        if !world.contains_entity(child) {
            log::error!(
                "[Scene]: Child list of '{}' references a missing entity, skipping it",
                world.label(entity)
            );
            continue;
        }
        dispatch_at(world, services, child, message, depth + 1);
    }
}

fn still_attached(world: &World, entity: EntityId, component: ComponentId) -> bool {
    world
        .entity(entity)
        .is_some_and(|node| node.components().contains(&component))
}

fn deliver(
    world: &mut World,
    services: &mut SceneServices,
    entity: EntityId,
    component: ComponentId,
    message: &Message<'_>,
) {
    let Some(slot) = world.component(component) else {
        log::error!(
            "[Scene]: Component list of '{}' references a missing component, skipping it",
            world.label(entity)
        );
        return;
    };
    if slot.owner() != Some(entity) {
        log::error!(
            "[Scene]: Component '{}' is listed on '{}' but owned elsewhere, skipping it",
            slot.name(),
            world.label(entity)
        );
        return;
    }
    let admitted = match message.component_gate() {
        Gate::Always => true,
        Gate::Enabled => slot.is_enabled(),
        Gate::Visible => slot.is_visible(),
    };
    if !admitted {
        return;
    }
    let component_name = slot.name().to_string();

    // Re-entrant delivery to a component whose handler is on the stack is
    // dropped
    let Ok(mut behavior) = world.take_behavior(component) else {
        log::debug!(
            "[Scene]: Component '{}' is already handling a message, '{}' not delivered",
            component_name,
            message.handler_name()
        );
        return;
    };

    let result = {
        let mut ctx = ComponentContext::new(world, services, component, entity);
        message.invoke(behavior.as_mut(), &mut ctx)
    };

    if let Some(mut orphan) = world.restore_behavior(component, behavior) {
        orphan.destroy(services, component);
    }

    if let Err(err) = result {
        log::error!(
            "[{}]: Component '{}' failed while handling '{}': {}",
            world.label(entity),
            component_name,
            message.handler_name(),
            err
        );
    }
}
