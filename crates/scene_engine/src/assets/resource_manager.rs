//! Resource Manager - lookup of named assets
//!
//! **Implements**: Game Engine Architecture Chapter 7.2 (Resource Manager)
//!
//! Components never load assets themselves. At parse time they ask the
//! resource manager for a resource by name; a missing resource is a warning
//! and leaves the component partially configured.

use std::collections::HashMap;

/// Kind of asset a resource refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Mesh data
    Model,
    /// Shader program
    Shader,
    /// Material parameters
    Material,
    /// Texture image
    Texture,
    /// Script module
    Script,
}

/// Handle to a named asset
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Resource {
    name: String,
    kind: ResourceKind,
}

impl Resource {
    /// Create a resource handle
    pub fn new(name: impl Into<String>, kind: ResourceKind) -> Self {
        Self { name: name.into(), kind }
    }

    /// Resource name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resource kind
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }
}

/// Resolves resource names
pub trait ResourceManager {
    /// Look up a resource by name
    fn get_resource(&self, name: &str) -> Option<Resource>;
}

/// In-memory resource table
#[derive(Debug, Clone, Default)]
pub struct ResourceTable {
    resources: HashMap<String, Resource>,
}

impl ResourceTable {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource, replacing one with the same name
    pub fn insert(&mut self, name: impl Into<String>, kind: ResourceKind) -> Option<Resource> {
        let resource = Resource::new(name, kind);
        self.resources.insert(resource.name.clone(), resource)
    }

    /// Number of resources
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl ResourceManager for ResourceTable {
    fn get_resource(&self, name: &str) -> Option<Resource> {
        self.resources.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name() {
        let mut table = ResourceTable::new();
        table.insert("teapot", ResourceKind::Model);
        table.insert("phong", ResourceKind::Shader);

        assert_eq!(table.get_resource("teapot"), Some(Resource::new("teapot", ResourceKind::Model)));
        assert_eq!(table.get_resource("missing"), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_insert_replaces_same_name() {
        let mut table = ResourceTable::new();
        table.insert("thing", ResourceKind::Model);
        let previous = table.insert("thing", ResourceKind::Texture);

        assert_eq!(previous.map(|r| r.kind()), Some(ResourceKind::Model));
        assert_eq!(table.get_resource("thing").map(|r| r.kind()), Some(ResourceKind::Texture));
    }
}
