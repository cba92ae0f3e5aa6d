//! Contact and collision event types

use std::rc::Rc;

use crate::foundation::collections::ComponentId;
use crate::foundation::math::Vec3;

/// One point of contact between two geometries, in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPoint {
    /// Contact position on the first geometry
    pub position: Vec3,
    /// Contact normal pointing from the first geometry towards the second
    pub normal: Vec3,
    /// Penetration depth, zero for touching contact
    pub depth: f32,
}

/// Collision event delivered to a component handler
///
/// `collider` is the recipient's own collider component, `other` the collider
/// it touched. Both directions of a contact share the same contact list.
/// Enter and exit events carry no contacts.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionEvent {
    collider: ComponentId,
    other: ComponentId,
    contacts: Rc<[ContactPoint]>,
}

impl CollisionEvent {
    /// Event with contacts
    pub fn new(collider: ComponentId, other: ComponentId, contacts: Rc<[ContactPoint]>) -> Self {
        Self { collider, other, contacts }
    }

    /// Event without contacts, used for enter and exit
    pub fn without_contacts(collider: ComponentId, other: ComponentId) -> Self {
        Self::new(collider, other, Rc::from(Vec::new()))
    }

    /// The recipient's collider
    pub fn collider(&self) -> ComponentId {
        self.collider
    }

    /// The collider that was touched
    pub fn other(&self) -> ComponentId {
        self.other
    }

    /// Contact points, at most [`MAX_CONTACTS`](crate::physics::MAX_CONTACTS)
    pub fn contacts(&self) -> &[ContactPoint] {
        &self.contacts
    }

    /// The same contact seen from the other collider
    pub fn mirrored(&self) -> Self {
        Self {
            collider: self.other,
            other: self.collider,
            contacts: Rc::clone(&self.contacts),
        }
    }
}
