//! Component factory
//!
//! Maps component type names used in scene data to constructors. Native
//! components are registered by [`ComponentFactory::with_builtins`]; script
//! modules are registered with [`ComponentFactory::register_script`] and are
//! wrapped in a [`DynamicComponent`] when instantiated.

use std::collections::HashMap;

use crate::ecs::component::Behavior;
use crate::ecs::components::{
    CameraComponent, ColliderComponent, LightComponent, ModelRendererComponent, RigidBodyComponent,
    RotationComponent,
};
use crate::ecs::script::{DynamicComponent, ScriptModule};
use crate::ecs::SceneError;

type Constructor = Box<dyn Fn() -> Box<dyn Behavior>>;

/// Registry of component constructors by type name
#[derive(Default)]
pub struct ComponentFactory {
    constructors: HashMap<String, Constructor>,
}

impl ComponentFactory {
    /// Factory without any registered type
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory with every native component registered
    pub fn with_builtins() -> Self {
        let mut factory = Self::new();
        factory.register("RigidBodyComponent", || Box::new(RigidBodyComponent::new()));
        factory.register("ColliderComponent", || Box::new(ColliderComponent::new()));
        factory.register("CameraComponent", || Box::new(CameraComponent::new()));
        factory.register("ModelRendererComponent", || Box::new(ModelRendererComponent::new()));
        factory.register("LightComponent", || Box::new(LightComponent::new()));
        factory.register("RotationComponent", || Box::new(RotationComponent::default()));
        factory
    }

    /// Register a constructor, replacing an existing one with the same name
    pub fn register<F>(&mut self, type_name: impl Into<String>, constructor: F)
    where
        F: Fn() -> Box<dyn Behavior> + 'static,
    {
        let type_name = type_name.into();
        if self.constructors.insert(type_name.clone(), Box::new(constructor)).is_some() {
            log::warn!("[Factory]: Component type '{}' was registered twice, keeping the latest", type_name);
        }
    }

    /// Register a script-defined component type
    pub fn register_script<F>(&mut self, type_name: impl Into<String>, module: F)
    where
        F: Fn() -> Box<dyn ScriptModule> + 'static,
    {
        self.register(type_name, move || Box::new(DynamicComponent::bind(module())));
    }

    /// Whether a type name is registered
    pub fn contains(&self, type_name: &str) -> bool {
        self.constructors.contains_key(type_name)
    }

    /// Instantiate a component by type name
    pub fn create(&self, type_name: &str) -> Result<Box<dyn Behavior>, SceneError> {
        self.constructors
            .get(type_name)
            .map(|constructor| constructor())
            .ok_or_else(|| SceneError::UnknownComponentType(type_name.to_string()))
    }
}
