use std::cell::Cell;

use approx::assert_relative_eq;

use super::*;
use crate::assets::ResourceKind;
use crate::config::EngineConfig;
use crate::ecs::components::{CameraComponent, LightComponent, ModelRendererComponent};
use crate::foundation::math::{Mat4, Vec3};

/// Keeps the projection of the last render pass
struct ProjectionSpy {
    projection: Rc<Cell<Option<Mat4>>>,
}

impl Behavior for ProjectionSpy {
    fn render(&mut self, _ctx: &mut ComponentContext<'_>, rendering: &RenderingContext) -> BehaviorResult {
        self.projection.set(Some(rendering.projection()));
        Ok(())
    }
}

fn resources() -> ResourceTable {
    let mut table = ResourceTable::new();
    table.insert("ship", ResourceKind::Model);
    table.insert("lit", ResourceKind::Shader);
    table.insert("hull", ResourceKind::Material);
    table
}

/// Scene with a camera entity at the origin made the active camera
fn scene_with_camera() -> (Scene, EntityId, EntityId) {
    let (mut scene, root) = scene_with_root();
    let camera = scene.spawn(root, "camera").unwrap();
    scene.activate_camera(camera).unwrap();
    (scene, root, camera)
}

fn add_model(scene: &mut Scene, entity: EntityId) -> ComponentId {
    let data = parse_data(serde_json::json!({
        "name": "renderer",
        "model": "ship",
        "shader": "lit",
        "material": "hull",
    }));
    scene
        .load_component(entity, "ModelRendererComponent", &data, &resources())
        .unwrap()
}

#[test]
fn test_render_requires_an_active_camera() {
    let (mut scene, root) = scene_with_root();
    let journal = Journal::default();
    scene.world_mut().add_component(root, "probe", Probe::new("root", &journal)).unwrap();

    assert_eq!(scene.render(), None);
    assert!(take(&journal).is_empty());

    scene.activate_camera(root).unwrap();
    assert_eq!(scene.render(), Some(Vec::new()));
    assert_eq!(take(&journal), vec!["root:render(0 lights)"]);
}

#[test]
fn test_hidden_scene_or_root_renders_nothing() {
    let (mut scene, root, _camera) = scene_with_camera();

    scene.set_visible(false);
    assert_eq!(scene.render(), None);

    scene.set_visible(true);
    scene.world_mut().entity_mut(root).unwrap().set_visible(false);
    assert_eq!(scene.render(), None);
}

#[test]
fn test_model_renderer_submits_draw_commands() {
    let (mut scene, root, _camera) = scene_with_camera();
    let ship = scene.spawn(root, "ship").unwrap();
    scene.world_mut().transform_mut(ship).unwrap().set_position(Vec3::new(1.0, 2.0, 3.0));
    add_model(&mut scene, ship);

    let commands = scene.frame(0.016).unwrap();

    assert_eq!(commands.len(), 1);
    let command = &commands[0];
    assert_eq!(command.entity, ship);
    assert_eq!(command.model, "ship");
    assert_eq!(command.shader, "lit");
    assert_eq!(command.material.as_deref(), Some("hull"));
    assert_relative_eq!(command.world[(3, 0)], 1.0);
    assert_relative_eq!(command.world[(3, 1)], 2.0);
    assert_relative_eq!(command.world[(3, 2)], 3.0);
    assert_relative_eq!(command.world_inverse_transpose[(0, 3)], -1.0);
}

#[test]
fn test_invisible_entity_prunes_render_but_not_update() {
    let (mut scene, root, _camera) = scene_with_camera();
    let journal = Journal::default();
    let ship = scene.spawn(root, "ship").unwrap();
    add_model(&mut scene, ship);
    scene.world_mut().add_component(ship, "probe", Probe::new("ship", &journal)).unwrap();
    scene.world_mut().entity_mut(ship).unwrap().set_visible(false);

    let commands = scene.frame(0.016).unwrap();

    assert!(commands.is_empty());
    assert_eq!(take(&journal), vec!["ship:update"]);
}

#[test]
fn test_hidden_component_is_not_rendered() {
    let (mut scene, root, _camera) = scene_with_camera();
    let ship = scene.spawn(root, "ship").unwrap();
    let renderer = add_model(&mut scene, ship);
    scene.world_mut().component_mut(renderer).unwrap().set_visible(false);

    assert_eq!(scene.render(), Some(Vec::new()));
}

#[test]
fn test_missing_resources_leave_renderer_idle() {
    let (mut scene, root, _camera) = scene_with_camera();
    let ship = scene.spawn(root, "ship").unwrap();
    let data = parse_data(serde_json::json!({"name": "renderer", "model": "nope", "shader": "lit"}));
    let renderer = scene
        .load_component(ship, "ModelRendererComponent", &data, &resources())
        .unwrap();

    assert_eq!(scene.render(), Some(Vec::new()));
    let behavior = scene.world().behavior::<ModelRendererComponent>(renderer).unwrap();
    assert!(behavior.model().is_none());
    assert_eq!(behavior.shader().map(|s| s.name()), Some("lit"));
}

#[test]
fn test_lights_reach_the_rendering_context() {
    let config = EngineConfig::default().with_max_dynamic_lights(1);
    let mut scene = Scene::with_config("lit", config);
    let root = scene.world_mut().create_entity("root");
    scene.set_root(root).unwrap();
    scene.activate_camera(root).unwrap();
    let journal = Journal::default();
    scene.world_mut().add_component(root, "probe", Probe::new("root", &journal)).unwrap();
    for name in ["sun", "lamp"] {
        let lamp = scene.spawn(root, name).unwrap();
        scene.world_mut().add_component(lamp, "light", LightComponent::new()).unwrap();
    }

    scene.render();
    assert_eq!(take(&journal), vec!["root:render(0 lights)"]);

    scene.start();
    take(&journal);
    assert_eq!(scene.lights().len(), 2);
    scene.render();
    assert_eq!(take(&journal), vec!["root:render(1 lights)"]);

    scene.end();
    assert!(scene.lights().is_empty());
}

#[test]
fn test_camera_component_sets_projection() {
    let (mut scene, root, camera) = scene_with_camera();
    let lens = CameraComponent { fov_x_in_degrees: 60.0, ..CameraComponent::new() };
    scene.world_mut().add_component(camera, "lens", lens).unwrap();
    let projection = Rc::new(Cell::new(None));
    let spy = ProjectionSpy { projection: Rc::clone(&projection) };
    scene.world_mut().add_component(root, "spy", spy).unwrap();

    scene.render();

    let expected = lens.projection(scene.config().aspect_ratio());
    assert_relative_eq!(projection.get().unwrap(), expected);
}

#[test]
fn test_transform_caches_rebuild_only_after_changes() {
    let (mut scene, root, _camera) = scene_with_camera();
    let ship = scene.spawn(root, "ship").unwrap();
    add_model(&mut scene, ship);

    scene.frame(0.016);
    scene.frame(0.016);
    let counts = scene.world().transform(ship).unwrap().recompute_counts();
    assert_eq!((counts.world, counts.world_inverse_transpose, counts.view), (1, 1, 1));

    scene.world_mut().transform_mut(ship).unwrap().move_by(Vec3::new(0.0, 0.0, 1.0));
    scene.frame(0.016);
    let counts = scene.world().transform(ship).unwrap().recompute_counts();
    assert_eq!((counts.world, counts.world_inverse_transpose, counts.view), (2, 2, 2));
}
