//! Scene scenarios exercising dispatch, collisions and rendering together

mod rendering;

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use crate::assets::ResourceTable;
use crate::ecs::parse::ParseData;
use crate::ecs::{Behavior, BehaviorResult, ComponentContext};
use crate::foundation::collections::{ComponentId, EntityId};
use crate::physics::CollisionEvent;
use crate::scene::{RenderingContext, Scene};

type Journal = Rc<RefCell<Vec<String>>>;

/// Records every message it receives as `tag:handler`
struct Probe {
    tag: &'static str,
    journal: Journal,
}

impl Probe {
    fn new(tag: &'static str, journal: &Journal) -> Self {
        Self { tag, journal: Rc::clone(journal) }
    }

    fn record(&self, what: &str) -> BehaviorResult {
        self.journal.borrow_mut().push(format!("{}:{}", self.tag, what));
        Ok(())
    }
}

impl Behavior for Probe {
    fn start(&mut self, _ctx: &mut ComponentContext<'_>) -> BehaviorResult {
        self.record("start")
    }

    fn update(&mut self, _ctx: &mut ComponentContext<'_>, _dt: f32) -> BehaviorResult {
        self.record("update")
    }

    fn render(&mut self, _ctx: &mut ComponentContext<'_>, rendering: &RenderingContext) -> BehaviorResult {
        self.record(&format!("render({} lights)", rendering.lights().len()))
    }

    fn end(&mut self, _ctx: &mut ComponentContext<'_>) -> BehaviorResult {
        self.record("end")
    }

    fn collide(&mut self, _ctx: &mut ComponentContext<'_>, event: &CollisionEvent) -> BehaviorResult {
        assert!(!event.contacts().is_empty());
        self.record("collide")
    }

    fn collider_enter(&mut self, _ctx: &mut ComponentContext<'_>, event: &CollisionEvent) -> BehaviorResult {
        assert!(event.contacts().is_empty());
        self.record("enter")
    }

    fn collider_exit(&mut self, _ctx: &mut ComponentContext<'_>, _event: &CollisionEvent) -> BehaviorResult {
        self.record("exit")
    }
}

fn parse_data(value: Value) -> ParseData {
    value.as_object().cloned().unwrap()
}

/// Scene with an empty root entity called "root"
fn scene_with_root() -> (Scene, EntityId) {
    let mut scene = Scene::new("test");
    let root = scene.world_mut().create_entity("root");
    scene.set_root(root).unwrap();
    (scene, root)
}

fn add_sphere(scene: &mut Scene, entity: EntityId, name: &str, radius: f32, is_trigger: bool) -> ComponentId {
    let data = parse_data(serde_json::json!({
        "name": name,
        "is_trigger": is_trigger,
        "shape": "SPHERE",
        "args": [radius],
    }));
    scene
        .load_component(entity, "ColliderComponent", &data, &ResourceTable::new())
        .unwrap()
}

fn take(journal: &Journal) -> Vec<String> {
    std::mem::take(&mut *journal.borrow_mut())
}
