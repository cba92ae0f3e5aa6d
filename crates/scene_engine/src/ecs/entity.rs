//! Entity node storage

use crate::ecs::components::Transform;
use crate::foundation::collections::{ComponentId, EntityId};

/// A named node of the scene tree
///
/// Structural fields (name, parent, children, components) are only changed
/// through [`World`](crate::ecs::World) so sibling-name uniqueness and the
/// parent/child back-references stay consistent.
#[derive(Debug)]
pub struct EntityNode {
    pub(crate) name: String,
    pub(crate) transform: Transform,
    pub(crate) components: Vec<ComponentId>,
    pub(crate) children: Vec<EntityId>,
    pub(crate) parent: Option<EntityId>,
    enabled: bool,
    visible: bool,
}

impl EntityNode {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            transform: Transform::new(),
            components: Vec::new(),
            children: Vec::new(),
            parent: None,
            enabled: true,
            visible: true,
        }
    }

    /// Entity name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The entity's transform
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// The entity's transform for mutation
    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    /// Attached components in attachment order
    pub fn components(&self) -> &[ComponentId] {
        &self.components
    }

    /// Children in attachment order
    pub fn children(&self) -> &[EntityId] {
        &self.children
    }

    /// Parent entity, `None` for a root
    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    /// Whether the subtree takes part in update
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable update for this subtree
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether the subtree takes part in render
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show or hide this subtree
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}
