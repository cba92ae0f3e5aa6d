//! Asset lookup

pub mod resource_manager;

pub use resource_manager::{Resource, ResourceKind, ResourceManager, ResourceTable};
