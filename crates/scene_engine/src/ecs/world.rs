//! World: arena storage for the entity tree and its components
//!
//! Entities and components live in `slotmap` arenas. The tree is expressed
//! with keys only: an entity lists its children and components, children and
//! components point back at their parent and owner. Every structural
//! operation validates first and mutates afterwards, so a failed call leaves
//! the world untouched.

use crate::ecs::component::{Behavior, ComponentSlot, SceneServices};
use crate::ecs::components::Transform;
use crate::ecs::entity::EntityNode;
use crate::foundation::collections::{ComponentId, EntityId, SlotMap};

/// Default limit for recursive walks over the tree
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Structural errors
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// Entity key does not resolve
    #[error("Unknown entity {0:?}")]
    UnknownEntity(EntityId),

    /// Component key does not resolve
    #[error("Unknown component {0:?}")]
    UnknownComponent(ComponentId),

    /// Child already has a parent
    #[error("Entity '{child}' already has a parent")]
    AlreadyParented {
        /// Child name
        child: String,
    },

    /// Parent already has a child with that name
    #[error("Entity '{parent}' already has a child named '{name}'")]
    DuplicateChildName {
        /// Parent name
        parent: String,
        /// Clashing name
        name: String,
    },

    /// Entity already has a component with that name
    #[error("Entity '{entity}' already has a component named '{name}'")]
    DuplicateComponentName {
        /// Entity name
        entity: String,
        /// Clashing name
        name: String,
    },

    /// Component is already attached somewhere
    #[error("Component '{component}' is already attached to an entity")]
    ComponentAlreadyOwned {
        /// Component name
        component: String,
    },

    /// Entity is not a child of the given parent
    #[error("Entity '{child}' is not a child of '{parent}'")]
    NotAChild {
        /// Parent name
        parent: String,
        /// Child name
        child: String,
    },

    /// Component is not attached to the given entity
    #[error("Component '{component}' is not attached to '{entity}'")]
    NotOwnedBy {
        /// Entity name
        entity: String,
        /// Component name
        component: String,
    },

    /// Attaching would make an entity its own ancestor
    #[error("Attaching '{child}' under '{parent}' would create a cycle")]
    CycleDetected {
        /// Parent name
        parent: String,
        /// Child name
        child: String,
    },

    /// Operation needs an owner but the component is detached
    #[error("Component '{component}' is not attached to an entity")]
    DetachedComponent {
        /// Component name
        component: String,
    },

    /// Operation needs the behavior but one of its handlers is running
    #[error("Component '{component}' is busy running a handler")]
    ComponentBusy {
        /// Component name
        component: String,
    },

    /// Component factory has no constructor for the type name
    #[error("Unknown component type '{0}'")]
    UnknownComponentType(String),

    /// Behavior is not of the requested type
    #[error("Component '{component}' is a {actual}, not a {expected}")]
    WrongComponentType {
        /// Component name
        component: String,
        /// Requested type
        expected: &'static str,
        /// Actual type
        actual: &'static str,
    },

    /// Name lookup failed
    #[error("No entity named '{0}'")]
    NoSuchEntity(String),
}

/// Arena of entities and components forming the scene tree
pub struct World {
    entities: SlotMap<EntityId, EntityNode>,
    components: SlotMap<ComponentId, ComponentSlot>,
    max_depth: usize,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Create an empty world
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    /// Create an empty world with a custom recursion limit
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            entities: SlotMap::with_key(),
            components: SlotMap::with_key(),
            max_depth: max_depth.max(1),
        }
    }

    /// Recursion limit for tree walks and message dispatch
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    // ---- entities -------------------------------------------------------

    /// Create a detached entity
    pub fn create_entity(&mut self, name: impl Into<String>) -> EntityId {
        self.entities.insert(EntityNode::new(name.into()))
    }

    /// Whether the key resolves
    pub fn contains_entity(&self, entity: EntityId) -> bool {
        self.entities.contains_key(entity)
    }

    /// Number of live entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Borrow an entity
    pub fn entity(&self, entity: EntityId) -> Option<&EntityNode> {
        self.entities.get(entity)
    }

    /// Mutably borrow an entity
    pub fn entity_mut(&mut self, entity: EntityId) -> Option<&mut EntityNode> {
        self.entities.get_mut(entity)
    }

    /// Iterate over every live entity
    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &EntityNode)> {
        self.entities.iter()
    }

    /// Iterate over every live component, attached or not
    pub fn components(&self) -> impl Iterator<Item = (ComponentId, &ComponentSlot)> {
        self.components.iter()
    }

    /// Entity name
    pub fn name(&self, entity: EntityId) -> Option<&str> {
        self.entities.get(entity).map(EntityNode::name)
    }

    /// Entity transform
    pub fn transform(&self, entity: EntityId) -> Option<&Transform> {
        self.entities.get(entity).map(EntityNode::transform)
    }

    /// Entity transform for mutation
    pub fn transform_mut(&mut self, entity: EntityId) -> Option<&mut Transform> {
        self.entities.get_mut(entity).map(EntityNode::transform_mut)
    }

    /// Rename an entity, keeping sibling names unique
    pub fn set_entity_name(&mut self, entity: EntityId, name: impl Into<String>) -> Result<(), SceneError> {
        let name = name.into();
        let node = self.node(entity)?;
        if let Some(parent) = node.parent {
            let clash = self.node(parent)?.children.iter().any(|&sibling| {
                sibling != entity && self.entities.get(sibling).is_some_and(|s| s.name == name)
            });
            if clash {
                return Err(SceneError::DuplicateChildName {
                    parent: self.label(parent),
                    name,
                });
            }
        }
        self.node_mut(entity)?.name = name;
        Ok(())
    }

    /// Parent of an entity
    pub fn parent(&self, entity: EntityId) -> Option<EntityId> {
        self.entities.get(entity)?.parent
    }

    /// Attach `child` as the last child of `parent`
    pub fn attach_child(&mut self, parent: EntityId, child: EntityId) -> Result<(), SceneError> {
        let parent_node = self.node(parent)?;
        let child_node = self.node(child)?;

        if child_node.parent.is_some() {
            return Err(SceneError::AlreadyParented { child: child_node.name.clone() });
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(SceneError::CycleDetected {
                parent: parent_node.name.clone(),
                child: child_node.name.clone(),
            });
        }
        let clash = parent_node
            .children
            .iter()
            .any(|&sibling| self.entities.get(sibling).is_some_and(|s| s.name == child_node.name));
        if clash {
            return Err(SceneError::DuplicateChildName {
                parent: parent_node.name.clone(),
                name: child_node.name.clone(),
            });
        }

        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Detach `child` from `parent`, leaving it as a root
    pub fn detach_child(&mut self, parent: EntityId, child: EntityId) -> Result<(), SceneError> {
        let parent_node = self.node(parent)?;
        let child_node = self.node(child)?;
        if child_node.parent != Some(parent) {
            return Err(SceneError::NotAChild {
                parent: parent_node.name.clone(),
                child: child_node.name.clone(),
            });
        }

        self.node_mut(parent)?.children.retain(|&c| c != child);
        self.node_mut(child)?.parent = None;
        Ok(())
    }

    /// Number of children
    pub fn child_count(&self, entity: EntityId) -> usize {
        self.entities.get(entity).map_or(0, |node| node.children.len())
    }

    /// Child at `index` in attachment order
    pub fn get_child_by_index(&self, entity: EntityId, index: usize) -> Option<EntityId> {
        self.entities.get(entity)?.children.get(index).copied()
    }

    /// Find a descendant by name
    ///
    /// Direct children are checked first, then each child's subtree in order.
    pub fn get_child_by_name(&self, entity: EntityId, name: &str) -> Option<EntityId> {
        self.find_descendant(entity, name, 0)
    }

    fn find_descendant(&self, entity: EntityId, name: &str, depth: usize) -> Option<EntityId> {
        if depth >= self.max_depth {
            log::error!(
                "[Scene]: Name lookup for '{}' hit the maximum depth of {}",
                name,
                self.max_depth
            );
            return None;
        }
        let node = self.entities.get(entity)?;
        let direct = node
            .children
            .iter()
            .copied()
            .find(|&child| self.entities.get(child).is_some_and(|c| c.name == name));
        if direct.is_some() {
            return direct;
        }
        node.children
            .iter()
            .find_map(|&child| self.find_descendant(child, name, depth + 1))
    }

    /// Whether `ancestor` is found walking up from `entity`
    pub fn is_ancestor(&self, ancestor: EntityId, entity: EntityId) -> bool {
        let mut current = self.parent(entity);
        let mut steps = 0;
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.entities.len() {
                log::error!("[Scene]: Parent chain does not terminate, the tree is corrupt");
                return false;
            }
            current = self.parent(parent);
        }
        false
    }

    /// Destroy an entity, its subtree and every attached component
    ///
    /// The entity is detached from its parent first. Each component's
    /// `destroy` hook runs so external resources are released.
    pub fn destroy_entity(&mut self, entity: EntityId, services: &mut SceneServices) -> Result<(), SceneError> {
        let node = self.node(entity)?;
        if let Some(parent) = node.parent {
            self.detach_child(parent, entity)?;
        }

        let mut pending = vec![entity];
        while let Some(current) = pending.pop() {
            let Some(node) = self.entities.remove(current) else {
                continue;
            };
            pending.extend(node.children.iter().copied());
            for component in node.components {
                self.release_component(component, services);
            }
        }
        Ok(())
    }

    // ---- components -----------------------------------------------------

    /// Store a detached component
    pub fn create_component(&mut self, name: impl Into<String>, behavior: Box<dyn Behavior>) -> ComponentId {
        self.components.insert(ComponentSlot::new(name.into(), behavior))
    }

    /// Store a component and attach it to `entity` in one step
    pub fn add_component<B: Behavior>(
        &mut self,
        entity: EntityId,
        name: impl Into<String>,
        behavior: B,
    ) -> Result<ComponentId, SceneError> {
        self.node(entity)?;
        let component = self.create_component(name, Box::new(behavior));
        if let Err(err) = self.attach_component(entity, component) {
            self.components.remove(component);
            return Err(err);
        }
        Ok(component)
    }

    /// Whether the key resolves
    pub fn contains_component(&self, component: ComponentId) -> bool {
        self.components.contains_key(component)
    }

    /// Borrow a component slot
    pub fn component(&self, component: ComponentId) -> Option<&ComponentSlot> {
        self.components.get(component)
    }

    /// Mutably borrow a component slot
    pub fn component_mut(&mut self, component: ComponentId) -> Option<&mut ComponentSlot> {
        self.components.get_mut(component)
    }

    /// Number of live components, attached or not
    pub fn total_component_count(&self) -> usize {
        self.components.len()
    }

    /// Attach a detached component as the last component of `entity`
    pub fn attach_component(&mut self, entity: EntityId, component: ComponentId) -> Result<(), SceneError> {
        let node = self.node(entity)?;
        let slot = self.slot(component)?;
        if slot.owner.is_some() {
            return Err(SceneError::ComponentAlreadyOwned { component: slot.name.clone() });
        }
        let clash = node
            .components
            .iter()
            .any(|&other| self.components.get(other).is_some_and(|o| o.name == slot.name));
        if clash {
            return Err(SceneError::DuplicateComponentName {
                entity: node.name.clone(),
                name: slot.name.clone(),
            });
        }

        self.node_mut(entity)?.components.push(component);
        self.slot_mut(component)?.owner = Some(entity);
        Ok(())
    }

    /// Detach a component from `entity`; it stays alive but owner-less
    pub fn detach_component(&mut self, entity: EntityId, component: ComponentId) -> Result<(), SceneError> {
        let node = self.node(entity)?;
        let slot = self.slot(component)?;
        if slot.owner != Some(entity) {
            return Err(SceneError::NotOwnedBy {
                entity: node.name.clone(),
                component: slot.name.clone(),
            });
        }

        self.node_mut(entity)?.components.retain(|&c| c != component);
        self.slot_mut(component)?.owner = None;
        Ok(())
    }

    /// Remove a component from the world, detaching it first
    pub fn destroy_component(&mut self, component: ComponentId, services: &mut SceneServices) -> Result<(), SceneError> {
        if let Some(owner) = self.slot(component)?.owner {
            self.detach_component(owner, component)?;
        }
        self.release_component(component, services);
        Ok(())
    }

    /// Number of components attached to `entity`
    pub fn component_count(&self, entity: EntityId) -> usize {
        self.entities.get(entity).map_or(0, |node| node.components.len())
    }

    /// Component at `index` in attachment order
    pub fn get_component_by_index(&self, entity: EntityId, index: usize) -> Option<ComponentId> {
        self.entities.get(entity)?.components.get(index).copied()
    }

    /// Component attached to `entity` by name
    pub fn get_component_by_name(&self, entity: EntityId, name: &str) -> Option<ComponentId> {
        self.entities
            .get(entity)?
            .components
            .iter()
            .copied()
            .find(|&c| self.components.get(c).is_some_and(|slot| slot.name == name))
    }

    /// First component of `entity` whose behavior is a `T`
    ///
    /// A component whose handler is currently running is not visible here.
    pub fn get_component_by_type<T: Behavior>(&self, entity: EntityId) -> Option<ComponentId> {
        self.entities
            .get(entity)?
            .components
            .iter()
            .copied()
            .find(|&c| self.components.get(c).is_some_and(ComponentSlot::is::<T>))
    }

    /// Borrow a component's behavior as a `T`
    pub fn behavior<T: Behavior>(&self, component: ComponentId) -> Option<&T> {
        self.components.get(component)?.downcast_ref::<T>()
    }

    /// Mutably borrow a component's behavior as a `T`
    pub fn behavior_mut<T: Behavior>(&mut self, component: ComponentId) -> Option<&mut T> {
        self.components.get_mut(component)?.downcast_mut::<T>()
    }

    /// Owner of a component, `None` when detached or unknown
    pub fn get_owner(&self, component: ComponentId) -> Option<EntityId> {
        self.components.get(component)?.owner
    }

    /// Owner of a component, failing when detached
    pub fn require_owner(&self, component: ComponentId) -> Result<EntityId, SceneError> {
        let slot = self.slot(component)?;
        slot.owner.ok_or_else(|| SceneError::DetachedComponent { component: slot.name.clone() })
    }

    /// Take the behavior out of its slot while a handler runs
    pub(crate) fn take_behavior(&mut self, component: ComponentId) -> Result<Box<dyn Behavior>, SceneError> {
        let slot = self.slot_mut(component)?;
        slot.behavior
            .take()
            .ok_or_else(|| SceneError::ComponentBusy { component: slot.name.clone() })
    }

    /// Put a behavior back after its handler ran
    ///
    /// If the component was destroyed meanwhile the behavior is handed back so
    /// the caller can release it.
    pub(crate) fn restore_behavior(
        &mut self,
        component: ComponentId,
        behavior: Box<dyn Behavior>,
    ) -> Option<Box<dyn Behavior>> {
        match self.components.get_mut(component) {
            Some(slot) => {
                slot.behavior = Some(behavior);
                None
            }
            None => Some(behavior),
        }
    }

    /// Human readable label for log messages
    pub(crate) fn label(&self, entity: EntityId) -> String {
        self.entities
            .get(entity)
            .map_or_else(|| format!("{entity:?}"), |node| node.name.clone())
    }

    fn release_component(&mut self, component: ComponentId, services: &mut SceneServices) {
        if let Some(slot) = self.components.remove(component) {
            if let Some(mut behavior) = slot.behavior {
                behavior.destroy(services, component);
            }
        }
    }

    fn node(&self, entity: EntityId) -> Result<&EntityNode, SceneError> {
        self.entities.get(entity).ok_or(SceneError::UnknownEntity(entity))
    }

    fn node_mut(&mut self, entity: EntityId) -> Result<&mut EntityNode, SceneError> {
        self.entities.get_mut(entity).ok_or(SceneError::UnknownEntity(entity))
    }

    fn slot(&self, component: ComponentId) -> Result<&ComponentSlot, SceneError> {
        self.components.get(component).ok_or(SceneError::UnknownComponent(component))
    }

    fn slot_mut(&mut self, component: ComponentId) -> Result<&mut ComponentSlot, SceneError> {
        self.components.get_mut(component).ok_or(SceneError::UnknownComponent(component))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;
    impl Behavior for Marker {}

    struct Other;
    impl Behavior for Other {}

    fn tree() -> (World, EntityId, EntityId, EntityId) {
        let mut world = World::new();
        let root = world.create_entity("root");
        let a = world.create_entity("a");
        let b = world.create_entity("b");
        world.attach_child(root, a).unwrap();
        world.attach_child(root, b).unwrap();
        (world, root, a, b)
    }

    #[test]
    fn test_attach_child_keeps_order_and_back_reference() {
        let (world, root, a, b) = tree();

        assert_eq!(world.child_count(root), 2);
        assert_eq!(world.get_child_by_index(root, 0), Some(a));
        assert_eq!(world.get_child_by_index(root, 1), Some(b));
        assert_eq!(world.get_child_by_index(root, 2), None);
        assert_eq!(world.parent(a), Some(root));
    }

    #[test]
    fn test_attach_child_rejects_second_parent() {
        let (mut world, _root, a, b) = tree();

        let result = world.attach_child(b, a);
        assert!(matches!(result, Err(SceneError::AlreadyParented { .. })));
        assert_eq!(world.child_count(b), 0);
    }

    #[test]
    fn test_attach_child_rejects_cycles() {
        let (mut world, root, a, _b) = tree();

        assert!(matches!(world.attach_child(a, root), Err(SceneError::CycleDetected { .. })));
        assert_eq!(world.parent(root), None);
    }

    #[test]
    fn test_attach_child_rejects_self_attachment() {
        let (mut world, _root, _a, _b) = tree();
        let lone = world.create_entity("lone");

        assert!(matches!(world.attach_child(lone, lone), Err(SceneError::CycleDetected { .. })));
        assert_eq!(world.parent(lone), None);
        assert_eq!(world.child_count(lone), 0);
    }

    #[test]
    fn test_attach_child_rejects_duplicate_sibling_name() {
        let (mut world, root, _a, _b) = tree();
        let another_a = world.create_entity("a");

        let result = world.attach_child(root, another_a);
        assert!(matches!(result, Err(SceneError::DuplicateChildName { .. })));
        assert_eq!(world.child_count(root), 2);
        assert_eq!(world.parent(another_a), None);
    }

    #[test]
    fn test_detach_child() {
        let (mut world, root, a, b) = tree();

        world.detach_child(root, a).unwrap();
        assert_eq!(world.parent(a), None);
        assert_eq!(world.child_count(root), 1);
        assert_eq!(world.get_child_by_index(root, 0), Some(b));

        let result = world.detach_child(root, a);
        assert!(matches!(result, Err(SceneError::NotAChild { .. })));
    }

    #[test]
    fn test_get_child_by_name_prefers_direct_children() {
        let (mut world, root, a, _b) = tree();
        // A grandchild named "b" under "a" must lose to the direct child "b"
        let deep_b = world.create_entity("b");
        world.attach_child(a, deep_b).unwrap();
        let leaf = world.create_entity("leaf");
        world.attach_child(deep_b, leaf).unwrap();

        let found = world.get_child_by_name(root, "b").unwrap();
        assert_eq!(world.parent(found), Some(root));
        assert_eq!(world.get_child_by_name(root, "leaf"), Some(leaf));
        assert_eq!(world.get_child_by_name(root, "missing"), None);
    }

    #[test]
    fn test_set_entity_name_respects_siblings() {
        let (mut world, _root, a, _b) = tree();

        assert!(matches!(
            world.set_entity_name(a, "b"),
            Err(SceneError::DuplicateChildName { .. })
        ));
        world.set_entity_name(a, "c").unwrap();
        assert_eq!(world.name(a), Some("c"));
    }

    #[test]
    fn test_component_attach_detach_and_owner() {
        let mut world = World::new();
        let entity = world.create_entity("entity");
        let component = world.create_component("marker", Box::new(Marker));

        assert_eq!(world.get_owner(component), None);
        assert!(matches!(
            world.require_owner(component),
            Err(SceneError::DetachedComponent { .. })
        ));

        world.attach_component(entity, component).unwrap();
        assert_eq!(world.get_owner(component), Some(entity));
        assert_eq!(world.component_count(entity), 1);

        let other = world.create_entity("other");
        assert!(matches!(
            world.attach_component(other, component),
            Err(SceneError::ComponentAlreadyOwned { .. })
        ));

        world.detach_component(entity, component).unwrap();
        assert_eq!(world.get_owner(component), None);
        assert_eq!(world.component_count(entity), 0);
        assert!(world.contains_component(component));
    }

    #[test]
    fn test_component_names_unique_per_entity() {
        let mut world = World::new();
        let entity = world.create_entity("entity");
        world.add_component(entity, "shared", Marker).unwrap();

        let result = world.add_component(entity, "shared", Other);
        assert!(matches!(result, Err(SceneError::DuplicateComponentName { .. })));
        assert_eq!(world.component_count(entity), 1);
        assert_eq!(world.total_component_count(), 1);
    }

    #[test]
    fn test_get_component_by_type() {
        let mut world = World::new();
        let entity = world.create_entity("entity");
        let marker = world.add_component(entity, "marker", Marker).unwrap();
        let other = world.add_component(entity, "other", Other).unwrap();

        assert_eq!(world.get_component_by_type::<Marker>(entity), Some(marker));
        assert_eq!(world.get_component_by_type::<Other>(entity), Some(other));
        assert_eq!(world.get_component_by_name(entity, "other"), Some(other));
        assert!(world.behavior::<Other>(marker).is_none());
        assert!(world.behavior::<Marker>(marker).is_some());
    }

    #[test]
    fn test_destroy_entity_removes_subtree_and_components() {
        let (mut world, root, a, b) = tree();
        let mut services = SceneServices::new();
        let leaf = world.create_entity("leaf");
        world.attach_child(a, leaf).unwrap();
        let component = world.add_component(leaf, "marker", Marker).unwrap();

        world.destroy_entity(a, &mut services).unwrap();

        assert!(!world.contains_entity(a));
        assert!(!world.contains_entity(leaf));
        assert!(!world.contains_component(component));
        assert_eq!(world.child_count(root), 1);
        assert_eq!(world.get_child_by_index(root, 0), Some(b));
    }
}
