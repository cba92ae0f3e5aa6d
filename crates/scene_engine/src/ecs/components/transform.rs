//! Entity transform with cached derived matrices
//!
//! Every entity owns exactly one transform. Position, orientation and scale
//! are the source of truth; the world matrix, its inverse-transpose and the
//! view matrix are derived lazily and cached until the next mutation.

use std::cell::Cell;

use crate::ecs::Message;
use crate::foundation::math::{Mat4, Mat4Ext, Quat, Vec3};

/// Position, orientation and scale of an entity plus cached matrices
///
/// Reads go through `&self`; the caches use interior mutability so the render
/// pass can read transforms without exclusive access to the world.
#[derive(Debug, Clone)]
pub struct Transform {
    position: Vec3,
    orientation: Quat,
    scale: Vec3,

    world: Cell<Mat4>,
    world_inverse_transpose: Cell<Mat4>,
    view: Cell<Mat4>,

    world_dirty: Cell<bool>,
    world_inverse_transpose_dirty: Cell<bool>,
    view_dirty: Cell<bool>,

    recomputes: Cell<RecomputeCounts>,
}

/// How many times each cached matrix has been rebuilt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecomputeCounts {
    /// World matrix rebuilds
    pub world: u32,
    /// Inverse-transpose rebuilds
    pub world_inverse_transpose: u32,
    /// View matrix rebuilds
    pub view: u32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            orientation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            world: Cell::new(Mat4::identity()),
            world_inverse_transpose: Cell::new(Mat4::identity()),
            view: Cell::new(Mat4::identity()),
            world_dirty: Cell::new(true),
            world_inverse_transpose_dirty: Cell::new(true),
            view_dirty: Cell::new(true),
            recomputes: Cell::new(RecomputeCounts::default()),
        }
    }
}

impl Transform {
    /// Create an identity transform
    pub fn new() -> Self {
        Self::default()
    }

    /// Current position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Current orientation
    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    /// Current scale
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Replace the position
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.invalidate();
    }

    /// Offset the position
    pub fn move_by(&mut self, delta: Vec3) {
        self.position += delta;
        self.invalidate();
    }

    /// Replace the orientation
    pub fn set_orientation(&mut self, orientation: Quat) {
        self.orientation = orientation;
        self.invalidate();
    }

    /// Compose a rotation onto the current orientation
    pub fn rotate(&mut self, rotation: Quat) {
        self.orientation = self.orientation * rotation;
        self.orientation.renormalize_fast();
        self.invalidate();
    }

    /// Replace the scale
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.invalidate();
    }

    /// Multiply the scale component-wise
    pub fn stretch(&mut self, factor: Vec3) {
        self.scale.component_mul_assign(&factor);
        self.invalidate();
    }

    /// World matrix, `scale * rotation * translation`
    pub fn world_matrix(&self) -> Mat4 {
        if self.world_dirty.get() {
            let world = Mat4::scaling(&self.scale)
                * Mat4::rotation(&self.orientation)
                * Mat4::translation(&self.position);
            self.world.set(world);
            self.world_dirty.set(false);
            self.world_inverse_transpose_dirty.set(true);
            self.count(|counts| counts.world += 1);
        }
        self.world.get()
    }

    /// Transpose of the inverse world matrix, used for normals
    ///
    /// A singular world matrix (zero scale on some axis) keeps the previous
    /// value.
    pub fn world_inverse_transpose_matrix(&self) -> Mat4 {
        let world = self.world_matrix();
        if self.world_inverse_transpose_dirty.get() {
            match world.try_inverse().filter(Mat4Ext::is_finite) {
                Some(inverse) => self.world_inverse_transpose.set(inverse.transpose()),
                None => log::warn!("[Transform]: World matrix is not invertible, keeping previous inverse-transpose"),
            }
            self.world_inverse_transpose_dirty.set(false);
            self.count(|counts| counts.world_inverse_transpose += 1);
        }
        self.world_inverse_transpose.get()
    }

    /// Left-handed view matrix looking along the local +Z axis with local +Y
    /// as up
    pub fn view_matrix(&self) -> Mat4 {
        if self.view_dirty.get() {
            let forward = self.orientation * Vec3::z();
            let up = self.orientation * Vec3::y();
            let target = self.position + forward;
            self.view.set(Mat4::look_at_lh_row(&self.position, &target, &up));
            self.view_dirty.set(false);
            self.count(|counts| counts.view += 1);
        }
        self.view.get()
    }

    /// Rebuild any stale cache
    pub fn refresh(&self) {
        self.world_matrix();
        self.world_inverse_transpose_matrix();
        self.view_matrix();
    }

    /// Transforms take part in every lifecycle message before the owner's
    /// components. Only rendering has an effect: the caches are brought up to
    /// date so components read fresh matrices.
    pub fn handle_message(&self, message: &Message<'_>) {
        if let Message::Render(_) = message {
            self.refresh();
        }
    }

    /// Cache rebuild counters
    pub fn recompute_counts(&self) -> RecomputeCounts {
        self.recomputes.get()
    }

    fn invalidate(&mut self) {
        self.world_dirty.set(true);
        self.world_inverse_transpose_dirty.set(true);
        self.view_dirty.set(true);
    }

    fn count(&self, bump: impl FnOnce(&mut RecomputeCounts)) {
        let mut counts = self.recomputes.get();
        bump(&mut counts);
        self.recomputes.set(counts);
    }
}
