//! Physics space: bodies, collision geometry, broad and narrow phase
//!
//! A geometry may be attached to a body, in which case it takes the body's
//! pose; a free geometry keeps its own pose. Each geometry records the
//! component that owns it so collision reports can be routed back to the
//! scene.

use parry3d::bounding_volume::{Aabb, BoundingVolume};
use parry3d::query::{ContactManifold, DefaultQueryDispatcher, PersistentQueryDispatcher};
use parry3d::shape::SharedShape;

use crate::foundation::collections::{BodyHandle, ComponentId, GeomHandle, SlotMap};
use crate::foundation::math::{Isometry3, Quat, Vec3};
use crate::physics::{ContactPoint, PhysicsError, ShapeDesc};

/// Kinematic body driven by its owner's transform
#[derive(Debug, Clone)]
struct Body {
    pose: Isometry3,
}

/// Collision geometry
#[derive(Clone)]
struct Geom {
    desc: ShapeDesc,
    shape: SharedShape,
    body: Option<BodyHandle>,
    pose: Isometry3,
    owner: Option<ComponentId>,
}

/// Container for bodies and collision geometry
#[derive(Default)]
pub struct PhysicsSpace {
    bodies: SlotMap<BodyHandle, Body>,
    geoms: SlotMap<GeomHandle, Geom>,
}

fn pose_from(position: &Vec3, orientation: &Quat) -> Isometry3 {
    Isometry3::from_parts(nalgebra::Translation3::from(*position), *orientation)
}

impl PhysicsSpace {
    /// Create an empty space
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Number of geometries
    pub fn geom_count(&self) -> usize {
        self.geoms.len()
    }

    /// Create a body at the origin
    pub fn create_body(&mut self) -> BodyHandle {
        self.bodies.insert(Body { pose: Isometry3::identity() })
    }

    /// Destroy a body; geometries attached to it become free and keep its
    /// last pose
    pub fn destroy_body(&mut self, body: BodyHandle) -> Result<(), PhysicsError> {
        let removed = self.bodies.remove(body).ok_or(PhysicsError::UnknownBody(body))?;
        for geom in self.geoms.values_mut().filter(|g| g.body == Some(body)) {
            geom.body = None;
            geom.pose = removed.pose;
        }
        Ok(())
    }

    /// Move a body
    pub fn set_body_pose(&mut self, body: BodyHandle, position: &Vec3, orientation: &Quat) -> Result<(), PhysicsError> {
        let entry = self.bodies.get_mut(body).ok_or(PhysicsError::UnknownBody(body))?;
        entry.pose = pose_from(position, orientation);
        Ok(())
    }

    /// Pose of a body
    pub fn body_pose(&self, body: BodyHandle) -> Option<Isometry3> {
        self.bodies.get(body).map(|b| b.pose)
    }

    /// Create a free geometry at the origin
    pub fn create_geom(&mut self, desc: ShapeDesc, owner: Option<ComponentId>) -> GeomHandle {
        self.geoms.insert(Geom {
            desc,
            shape: desc.to_shared_shape(),
            body: None,
            pose: Isometry3::identity(),
            owner,
        })
    }

    /// Destroy a geometry
    pub fn destroy_geom(&mut self, geom: GeomHandle) -> Result<(), PhysicsError> {
        self.geoms.remove(geom).map(|_| ()).ok_or(PhysicsError::UnknownGeom(geom))
    }

    /// Attach a geometry to a body, or detach it with `None`
    pub fn set_geom_body(&mut self, geom: GeomHandle, body: Option<BodyHandle>) -> Result<(), PhysicsError> {
        if let Some(body) = body {
            if !self.bodies.contains_key(body) {
                return Err(PhysicsError::UnknownBody(body));
            }
        }
        let entry = self.geoms.get_mut(geom).ok_or(PhysicsError::UnknownGeom(geom))?;
        entry.body = body;
        Ok(())
    }

    /// Move a free geometry
    pub fn set_geom_pose(&mut self, geom: GeomHandle, position: &Vec3, orientation: &Quat) -> Result<(), PhysicsError> {
        let entry = self.geoms.get_mut(geom).ok_or(PhysicsError::UnknownGeom(geom))?;
        if entry.body.is_some() {
            log::debug!("[Physics]: Geometry {:?} follows its body, pose change ignored", geom);
        }
        entry.pose = pose_from(position, orientation);
        Ok(())
    }

    /// World pose of a geometry
    pub fn geom_pose(&self, geom: GeomHandle) -> Option<Isometry3> {
        self.geoms.get(geom).map(|g| self.world_pose(g))
    }

    /// Shape of a geometry
    pub fn geom_shape(&self, geom: GeomHandle) -> Option<ShapeDesc> {
        self.geoms.get(geom).map(|g| g.desc)
    }

    /// Component that owns a geometry
    pub fn geom_owner(&self, geom: GeomHandle) -> Option<ComponentId> {
        self.geoms.get(geom)?.owner
    }

    /// Body a geometry is attached to
    pub fn geom_body(&self, geom: GeomHandle) -> Option<BodyHandle> {
        self.geoms.get(geom)?.body
    }

    /// Remove everything
    pub fn clear(&mut self) {
        self.geoms.clear();
        self.bodies.clear();
    }

    fn world_pose(&self, geom: &Geom) -> Isometry3 {
        geom.body
            .and_then(|body| self.bodies.get(body))
            .map_or(geom.pose, |body| body.pose)
    }

    fn world_aabb(&self, geom: &Geom) -> Aabb {
        geom.shape.compute_aabb(&self.world_pose(geom))
    }

    /// Broad phase: pairs whose world bounding boxes overlap
    ///
    /// Sort-and-sweep along the X axis. Each unordered pair is reported once.
    pub fn overlapping_pairs(&self) -> Vec<(GeomHandle, GeomHandle)> {
        let mut boxes: Vec<(GeomHandle, Aabb)> = self
            .geoms
            .iter()
            .map(|(handle, geom)| (handle, self.world_aabb(geom)))
            .collect();
        boxes.sort_by(|a, b| a.1.mins.x.total_cmp(&b.1.mins.x));

        let mut pairs = Vec::new();
        for (i, (first, first_box)) in boxes.iter().enumerate() {
            for (second, second_box) in &boxes[i + 1..] {
                if second_box.mins.x > first_box.maxs.x {
                    break;
                }
                if first_box.intersects(second_box) {
                    pairs.push((*first, *second));
                }
            }
        }
        pairs
    }

    /// Narrow phase: up to `max_contacts` contact points between two
    /// geometries, empty when they do not touch
    pub fn collide(&self, a: GeomHandle, b: GeomHandle, max_contacts: usize) -> Result<Vec<ContactPoint>, PhysicsError> {
        let first = self.geoms.get(a).ok_or(PhysicsError::UnknownGeom(a))?;
        let second = self.geoms.get(b).ok_or(PhysicsError::UnknownGeom(b))?;
        if max_contacts == 0 {
            return Ok(Vec::new());
        }

        let pose_a = self.world_pose(first);
        let pose_b = self.world_pose(second);
        let pose_ab = pose_a.inv_mul(&pose_b);
        let mut manifolds: Vec<ContactManifold<(), ()>> = Vec::new();
        if DefaultQueryDispatcher
            .contact_manifolds(&pose_ab, &*first.shape, &*second.shape, 0.0, &mut manifolds, &mut None)
            .is_err()
        {
            log::warn!(
                "[Physics]: No contact algorithm for {} against {}",
                first.desc.kind(),
                second.desc.kind()
            );
            return Ok(Vec::new());
        }

        // Manifold data is local to the first geometry
        let contacts = manifolds
            .iter()
            .flat_map(|manifold| {
                let normal = pose_a * manifold.local_n1;
                manifold
                    .points
                    .iter()
                    .filter(|point| point.dist <= 0.0)
                    .map(move |point| ContactPoint {
                        position: (pose_a * point.local_p1).coords,
                        normal,
                        depth: -point.dist,
                    })
            })
            .take(max_contacts)
            .collect();
        Ok(contacts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sphere_at(space: &mut PhysicsSpace, x: f32) -> GeomHandle {
        let geom = space.create_geom(ShapeDesc::sphere(1.0).unwrap(), None);
        space.set_geom_pose(geom, &Vec3::new(x, 0.0, 0.0), &Quat::identity()).unwrap();
        geom
    }

    #[test]
    fn test_broad_phase_reports_overlapping_boxes_once() {
        let mut space = PhysicsSpace::new();
        let a = sphere_at(&mut space, 0.0);
        let b = sphere_at(&mut space, 1.5);
        let _far = sphere_at(&mut space, 10.0);

        let pairs = space.overlapping_pairs();
        assert_eq!(pairs.len(), 1);
        let (x, y) = pairs[0];
        assert!((x == a && y == b) || (x == b && y == a));
    }

    #[test]
    fn test_narrow_phase_contact_depth() {
        let mut space = PhysicsSpace::new();
        let a = sphere_at(&mut space, 0.0);
        let b = sphere_at(&mut space, 1.5);

        let contacts = space.collide(a, b, 8).unwrap();
        assert_eq!(contacts.len(), 1);
        assert_relative_eq!(contacts[0].depth, 0.5, epsilon = 1e-4);
        assert_relative_eq!(contacts[0].normal, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-4);
    }

    fn box_at(space: &mut PhysicsSpace, x: f32) -> GeomHandle {
        let geom = space.create_geom(ShapeDesc::cuboid(1.0, 1.0, 1.0).unwrap(), None);
        space.set_geom_pose(geom, &Vec3::new(x, 0.0, 0.0), &Quat::identity()).unwrap();
        geom
    }

    #[test]
    fn test_face_contact_reports_a_full_manifold() {
        let mut space = PhysicsSpace::new();
        let a = box_at(&mut space, 0.0);
        let b = box_at(&mut space, 0.9);

        let contacts = space.collide(a, b, 8).unwrap();
        assert!(contacts.len() > 1);
        assert!(contacts.len() <= 8);
        for contact in &contacts {
            assert_relative_eq!(contact.depth, 0.1, epsilon = 1e-4);
            assert_relative_eq!(contact.normal, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-4);
            assert_relative_eq!(contact.position.x, 0.5, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_contact_count_is_capped() {
        let mut space = PhysicsSpace::new();
        let a = box_at(&mut space, 0.0);
        let b = box_at(&mut space, 0.9);

        assert_eq!(space.collide(a, b, 2).unwrap().len(), 2);
        assert!(space.collide(a, b, 0).unwrap().is_empty());
    }

    #[test]
    fn test_boxes_overlapping_without_contact() {
        let mut space = PhysicsSpace::new();
        let a = sphere_at(&mut space, 0.0);
        let b = space.create_geom(ShapeDesc::sphere(1.0).unwrap(), None);
        // Bounding boxes overlap near the corner, the spheres do not
        space.set_geom_pose(b, &Vec3::new(1.8, 1.8, 0.0), &Quat::identity()).unwrap();

        assert_eq!(space.overlapping_pairs().len(), 1);
        assert!(space.collide(a, b, 8).unwrap().is_empty());
    }

    #[test]
    fn test_geom_follows_body() {
        let mut space = PhysicsSpace::new();
        let body = space.create_body();
        let geom = space.create_geom(ShapeDesc::cuboid(1.0, 1.0, 1.0).unwrap(), None);
        space.set_geom_body(geom, Some(body)).unwrap();
        space.set_body_pose(body, &Vec3::new(3.0, 0.0, 0.0), &Quat::identity()).unwrap();

        let pose = space.geom_pose(geom).unwrap();
        assert_relative_eq!(pose.translation.vector, Vec3::new(3.0, 0.0, 0.0));

        space.destroy_body(body).unwrap();
        assert_eq!(space.geom_body(geom), None);
        assert_relative_eq!(space.geom_pose(geom).unwrap().translation.vector, Vec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn test_unknown_handles() {
        let mut space = PhysicsSpace::new();
        let geom = space.create_geom(ShapeDesc::sphere(1.0).unwrap(), None);
        space.destroy_geom(geom).unwrap();

        assert_eq!(space.destroy_geom(geom), Err(PhysicsError::UnknownGeom(geom)));
        assert!(space.geom_owner(geom).is_none());
        assert_eq!(space.geom_count(), 0);
    }
}
