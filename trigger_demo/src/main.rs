//! Trigger demo application
//!
//! A ship flies through a gate. Both carry trigger spheres; the gate logs
//! every enter, stay and exit reported by the collision tick.

use scene_engine::foundation::logging;
use scene_engine::prelude::*;

/// Moves its owner along +X at a constant speed
struct Thruster {
    speed: f32,
}

impl Behavior for Thruster {
    fn update(&mut self, ctx: &mut ComponentContext<'_>, dt: f32) -> BehaviorResult {
        if let Some(transform) = ctx.owner_transform_mut() {
            transform.move_by(Vec3::new(self.speed * dt, 0.0, 0.0));
        }
        Ok(())
    }
}

/// Logs the collision messages its owner receives
struct GateLog;

impl Behavior for GateLog {
    fn collider_enter(&mut self, ctx: &mut ComponentContext<'_>, event: &CollisionEvent) -> BehaviorResult {
        log::info!("'{}' entered by {:?}", ctx.owner_name(), event.other());
        Ok(())
    }

    fn collide(&mut self, ctx: &mut ComponentContext<'_>, event: &CollisionEvent) -> BehaviorResult {
        log::debug!("'{}' touching, {} contact(s)", ctx.owner_name(), event.contacts().len());
        Ok(())
    }

    fn collider_exit(&mut self, ctx: &mut ComponentContext<'_>, event: &CollisionEvent) -> BehaviorResult {
        log::info!("'{}' left by {:?}", ctx.owner_name(), event.other());
        Ok(())
    }
}

fn component_data(value: serde_json::Value) -> ParseData {
    match value {
        serde_json::Value::Object(map) => map,
        _ => ParseData::new(),
    }
}

fn build_scene(engine: &mut Engine) -> Result<(), Box<dyn std::error::Error>> {
    let mut resources = ResourceTable::new();
    resources.insert("ship", ResourceKind::Model);
    resources.insert("gate", ResourceKind::Model);
    resources.insert("unlit", ResourceKind::Shader);

    let scene = engine.scene_mut();
    let root = scene.world_mut().create_entity("root");
    scene.set_root(root)?;

    let camera = scene.spawn(root, "camera")?;
    if let Some(transform) = scene.world_mut().transform_mut(camera) {
        transform.set_position(Vec3::new(0.0, 2.0, -10.0));
    }
    scene.load_component(camera, "CameraComponent", &component_data(serde_json::json!({"name": "lens", "fov_x_in_degrees": 75.0})), &resources)?;
    scene.activate_camera_by_name("camera")?;

    let gate = scene.spawn(root, "gate")?;
    scene.load_component(
        gate,
        "ColliderComponent",
        &component_data(serde_json::json!({"name": "trigger", "is_trigger": true, "shape": "SPHERE", "args": [1.0]})),
        &resources,
    )?;
    scene.load_component(
        gate,
        "ModelRendererComponent",
        &component_data(serde_json::json!({"name": "mesh", "model": "gate", "shader": "unlit"})),
        &resources,
    )?;
    scene.world_mut().add_component(gate, "log", GateLog)?;

    let ship = scene.spawn(root, "ship")?;
    if let Some(transform) = scene.world_mut().transform_mut(ship) {
        transform.set_position(Vec3::new(-4.0, 0.0, 0.0));
    }
    scene.load_component(
        ship,
        "RigidBodyComponent",
        &component_data(serde_json::json!({"name": "hull", "is_trigger": true, "shape": "CAPSULE", "args": [0.5, 1.0]})),
        &resources,
    )?;
    scene.load_component(
        ship,
        "ModelRendererComponent",
        &component_data(serde_json::json!({"name": "mesh", "model": "ship", "shader": "unlit"})),
        &resources,
    )?;
    scene.world_mut().add_component(ship, "thruster", Thruster { speed: 3.0 })?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_with_default_filter("info");

    let mut engine = Engine::new(EngineConfig::default())?;
    build_scene(&mut engine)?;

    let frames = engine.run(Some(180), |engine, commands| {
        if engine.frame_count() % 60 == 0 {
            log::info!("Frame {}: {} draw command(s)", engine.frame_count(), commands.len());
        }
    });
    log::info!("Demo finished after {} frames", frames);
    Ok(())
}
