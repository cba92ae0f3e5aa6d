//! Trigger collision pipeline
//!
//! Once per tick, after the update pass:
//! 1. the space's broad phase proposes geometry pairs,
//! 2. each pair is resolved to its collider components and filtered,
//! 3. the narrow phase produces contacts, surviving pairs enter the new
//!    collision state in both directions and `collide` is sent to both owners,
//! 4. the new state is compared against the previous tick's state and
//!    `collider_exit` / `collider_enter` are sent for each change,
//! 5. the new state replaces the previous one.
//!
//! Only pairs where both colliders are triggers are reported. Pairs from the
//! same collider or from two colliders on the same entity are dropped.

use std::rc::Rc;

use crate::ecs::components::{ColliderComponent, RigidBodyComponent};
use crate::ecs::{dispatch, Message, SceneServices, World};
use crate::foundation::collections::{ComponentId, EntityId, GeomHandle};
use crate::physics::{CollisionEvent, CollisionPair, CollisionState, CollisionStateDiff, ContactPoint, DiffKind};

/// Maximum number of contact points reported per pair
pub const MAX_CONTACTS: usize = 8;

/// What one collision tick did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionReport {
    /// Pairs that produced `collide` events
    pub collisions: usize,
    /// `collider_enter` events sent
    pub entered: usize,
    /// `collider_exit` events sent
    pub exited: usize,
}

/// A broad-phase pair that passed every filter
struct TriggerContact {
    first: ComponentId,
    first_owner: EntityId,
    second: ComponentId,
    second_owner: EntityId,
    contacts: Rc<[ContactPoint]>,
}

/// Whether a component is a collider and, if so, whether it is a trigger
fn trigger_flag(world: &World, component: ComponentId) -> Option<bool> {
    let slot = world.component(component)?;
    slot.downcast_ref::<ColliderComponent>()
        .map(ColliderComponent::is_trigger)
        .or_else(|| slot.downcast_ref::<RigidBodyComponent>().map(RigidBodyComponent::is_trigger))
}

/// Resolve a geometry to its collider component and that component's owner
fn resolve(world: &World, services: &SceneServices, geom: GeomHandle) -> Option<(ComponentId, EntityId, bool)> {
    let Some(component) = services.physics.geom_owner(geom) else {
        log::error!("[Collision]: Geometry {:?} has no owning component", geom);
        return None;
    };
    let Some(slot) = world.component(component) else {
        log::error!("[Collision]: Geometry {:?} is owned by a component that no longer exists", geom);
        return None;
    };
    let Some(is_trigger) = trigger_flag(world, component) else {
        log::error!(
            "[Collision]: Geometry {:?} is owned by '{}', which is not a collider",
            geom,
            slot.name()
        );
        return None;
    };
    let Some(owner) = slot.owner() else {
        log::warn!(
            "[Collision]: Collider '{}' is not attached to an entity, ignoring its contacts",
            slot.name()
        );
        return None;
    };
    if !world.contains_entity(owner) {
        log::error!("[Collision]: Collider '{}' is owned by a missing entity", slot.name());
        return None;
    }
    Some((component, owner, is_trigger))
}

fn trigger_contacts(world: &World, services: &SceneServices) -> Vec<TriggerContact> {
    let mut found = Vec::new();
    for (geom_a, geom_b) in services.physics.overlapping_pairs() {
        let Some((first, first_owner, first_trigger)) = resolve(world, services, geom_a) else {
            continue;
        };
        let Some((second, second_owner, second_trigger)) = resolve(world, services, geom_b) else {
            continue;
        };
        if first == second {
            log::warn!(
                "[Collision]: Component '{}' owns two colliding geometries, ignoring the pair",
                world.component(first).map_or("?", |slot| slot.name())
            );
            continue;
        }
        if first_owner == second_owner {
            continue;
        }
        if !(first_trigger && second_trigger) {
            continue;
        }

        let contacts = match services.physics.collide(geom_a, geom_b, MAX_CONTACTS) {
            Ok(contacts) => contacts,
            Err(err) => {
                log::error!("[Collision]: Narrow phase failed: {}", err);
                continue;
            }
        };
        if contacts.is_empty() {
            continue;
        }

        found.push(TriggerContact {
            first,
            first_owner,
            second,
            second_owner,
            contacts: Rc::from(contacts),
        });
    }
    found
}

/// Run one collision tick
///
/// `previous` holds the state of the last tick and is replaced with this
/// tick's state.
pub fn handle_collisions(world: &mut World, services: &mut SceneServices, previous: &mut CollisionState) -> CollisionReport {
    let mut report = CollisionReport::default();
    let mut current = CollisionState::new();

    for contact in trigger_contacts(world, services) {
        current.insert(CollisionPair::new(contact.first, contact.second));
        current.insert(CollisionPair::new(contact.second, contact.first));

        let event = CollisionEvent::new(contact.first, contact.second, contact.contacts);
        dispatch(world, services, contact.first_owner, &Message::Collide(&event));
        dispatch(world, services, contact.second_owner, &Message::Collide(&event.mirrored()));
        report.collisions += 1;
    }

    let diff = CollisionStateDiff::between(previous, &current);
    for entry in diff.entries() {
        let Some(owner) = world.get_owner(entry.pair.collider) else {
            log::warn!(
                "[Collision]: Collider {:?} lost its owner, dropping its {:?} event",
                entry.pair.collider,
                entry.kind
            );
            continue;
        };
        let event = CollisionEvent::without_contacts(entry.pair.collider, entry.pair.other);
        match entry.kind {
            DiffKind::Removal => {
                dispatch(world, services, owner, &Message::ColliderExit(&event));
                report.exited += 1;
            }
            DiffKind::Addition => {
                dispatch(world, services, owner, &Message::ColliderEnter(&event));
                report.entered += 1;
            }
        }
    }

    *previous = current;
    if report != CollisionReport::default() {
        log::trace!("[Collision]: {:?}", report);
    }
    report
}
