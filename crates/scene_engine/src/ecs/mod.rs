//! Entity tree and component model
//!
//! Entities form a tree stored in a [`World`]. Each entity has a transform,
//! an ordered list of components and an ordered list of children. Lifecycle
//! messages travel down the tree through [`dispatch`].

pub mod component;
pub mod components;
pub mod dispatch;
pub mod entity;
pub mod factory;
pub mod parse;
pub mod script;
pub mod world;

pub use component::{AsAny, Behavior, BehaviorError, BehaviorResult, ComponentContext, ComponentSlot, SceneServices};
pub use dispatch::{dispatch, Message};
pub use entity::EntityNode;
pub use factory::ComponentFactory;
pub use parse::ParseData;
pub use script::{DynamicComponent, Handlers, ScriptArgs, ScriptError, ScriptModule};
pub use world::{SceneError, World, DEFAULT_MAX_DEPTH};
