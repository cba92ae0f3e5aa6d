//! Arena handle types
//!
//! Entities, components, bodies and geometries are stored in `slotmap` arenas.
//! Cross references between them are always one of these keys, never an owning
//! pointer, so a stale reference simply fails to resolve.

pub use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Handle to an entity stored in a [`World`](crate::ecs::World)
    pub struct EntityId;

    /// Handle to a component stored in a [`World`](crate::ecs::World)
    pub struct ComponentId;

    /// Handle to a dynamics body stored in a
    /// [`PhysicsSpace`](crate::physics::PhysicsSpace)
    pub struct BodyHandle;

    /// Handle to a collision geometry stored in a
    /// [`PhysicsSpace`](crate::physics::PhysicsSpace)
    pub struct GeomHandle;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_key_does_not_resolve() {
        let mut arena: SlotMap<EntityId, &str> = SlotMap::with_key();
        let first = arena.insert("first");
        arena.remove(first);
        let second = arena.insert("second");

        assert!(arena.get(first).is_none());
        assert_eq!(arena.get(second), Some(&"second"));
        assert_ne!(first, second);
    }
}
