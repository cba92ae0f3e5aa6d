//! Math utilities and types
//!
//! Matrices follow the row-vector convention: a point is transformed as
//! `p' = p * M`, so translation lives in the fourth row and a world matrix is
//! composed as `scale * rotation * translation`. View and projection matrices
//! are left-handed.

pub use nalgebra::{
    Vector3,
    Matrix4,
    Quaternion,
    Unit,
};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Rigid pose (rotation followed by translation)
pub type Isometry3 = nalgebra::Isometry3<f32>;

/// Common math utilities
pub mod utils {
    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees.to_radians()
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians.to_degrees()
    }
}

/// Row-vector matrix constructors
pub trait Mat4Ext {
    /// Non-uniform scaling matrix
    fn scaling(scale: &Vec3) -> Mat4;

    /// Rotation matrix for `p' = p * M`
    fn rotation(orientation: &Quat) -> Mat4;

    /// Translation matrix with the offset stored in the fourth row
    fn translation(offset: &Vec3) -> Mat4;

    /// Left-handed look-at view matrix for `p' = p * M`
    fn look_at_lh_row(eye: &Vec3, target: &Vec3, up: &Vec3) -> Mat4;

    /// Left-handed perspective projection from a horizontal field of view
    fn perspective_fov_x_lh(fov_x: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Returns true when every element is a finite number
    fn is_finite(&self) -> bool;
}

impl Mat4Ext for Mat4 {
    fn scaling(scale: &Vec3) -> Mat4 {
        Mat4::new_nonuniform_scaling(scale)
    }

    fn rotation(orientation: &Quat) -> Mat4 {
        // nalgebra builds column-vector matrices, the transpose is the
        // row-vector equivalent
        orientation.to_homogeneous().transpose()
    }

    fn translation(offset: &Vec3) -> Mat4 {
        let mut m = Mat4::identity();
        m[(3, 0)] = offset.x;
        m[(3, 1)] = offset.y;
        m[(3, 2)] = offset.z;
        m
    }

    fn look_at_lh_row(eye: &Vec3, target: &Vec3, up: &Vec3) -> Mat4 {
        let z_axis = (target - eye).normalize();
        let x_axis = up.cross(&z_axis).normalize();
        let y_axis = z_axis.cross(&x_axis);

        Mat4::new(
            x_axis.x, y_axis.x, z_axis.x, 0.0,
            x_axis.y, y_axis.y, z_axis.y, 0.0,
            x_axis.z, y_axis.z, z_axis.z, 0.0,
            -x_axis.dot(eye), -y_axis.dot(eye), -z_axis.dot(eye), 1.0,
        )
    }

    fn perspective_fov_x_lh(fov_x: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let x_scale = 1.0 / (fov_x * 0.5).tan();
        let y_scale = x_scale * aspect;
        let depth = far / (far - near);

        Mat4::new(
            x_scale, 0.0, 0.0, 0.0,
            0.0, y_scale, 0.0, 0.0,
            0.0, 0.0, depth, 1.0,
            0.0, 0.0, -near * depth, 0.0,
        )
    }

    fn is_finite(&self) -> bool {
        self.iter().all(|value| value.is_finite())
    }
}

/// Transform a point by a row-vector matrix
pub fn transform_point(point: &Vec3, m: &Mat4) -> Vec3 {
    let row = nalgebra::RowVector4::new(point.x, point.y, point.z, 1.0) * m;
    Vec3::new(row[0] / row[3], row[1] / row[3], row[2] / row[3])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_translation_lives_in_fourth_row() {
        let m = Mat4::translation(&Vec3::new(1.0, 2.0, 3.0));

        assert_relative_eq!(m[(3, 0)], 1.0);
        assert_relative_eq!(m[(3, 1)], 2.0);
        assert_relative_eq!(m[(3, 2)], 3.0);
        assert_relative_eq!(
            transform_point(&Vec3::zeros(), &m),
            Vec3::new(1.0, 2.0, 3.0),
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_rotation_matches_quaternion_rotation() {
        let q = Quat::from_axis_angle(&Vec3::y_axis(), FRAC_PI_2);
        let p = Vec3::new(1.0, 0.0, 0.0);

        let via_matrix = transform_point(&p, &Mat4::rotation(&q));
        let via_quat = q * p;

        assert_relative_eq!(via_matrix, via_quat, epsilon = EPSILON);
    }

    #[test]
    fn test_scale_rotate_translate_order() {
        let scale = Mat4::scaling(&Vec3::new(2.0, 2.0, 2.0));
        let rotation = Mat4::rotation(&Quat::from_axis_angle(&Vec3::z_axis(), FRAC_PI_2));
        let translation = Mat4::translation(&Vec3::new(10.0, 0.0, 0.0));
        let world = scale * rotation * translation;

        // (1,0,0) scaled to (2,0,0), rotated to (0,2,0), moved to (10,2,0)
        let p = transform_point(&Vec3::new(1.0, 0.0, 0.0), &world);
        assert_relative_eq!(p, Vec3::new(10.0, 2.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_look_at_maps_target_onto_positive_z() {
        let eye = Vec3::new(0.0, 0.0, -5.0);
        let view = Mat4::look_at_lh_row(&eye, &Vec3::zeros(), &Vec3::y());

        let target_in_view = transform_point(&Vec3::zeros(), &view);
        assert_relative_eq!(target_in_view, Vec3::new(0.0, 0.0, 5.0), epsilon = EPSILON);
        assert_relative_eq!(transform_point(&eye, &view), Vec3::zeros(), epsilon = EPSILON);
    }

    #[test]
    fn test_look_at_keeps_translation_in_fourth_row() {
        let view = Mat4::look_at_lh_row(&Vec3::new(0.0, 0.0, -5.0), &Vec3::zeros(), &Vec3::y());

        assert_relative_eq!(view[(3, 2)], 5.0, epsilon = EPSILON);
        assert_relative_eq!(view[(2, 3)], 0.0, epsilon = EPSILON);
        assert_relative_eq!(view[(3, 3)], 1.0, epsilon = EPSILON);
    }

    #[test]
    fn test_perspective_maps_near_and_far_planes() {
        let proj = Mat4::perspective_fov_x_lh(FRAC_PI_2, 4.0 / 3.0, 1.0, 100.0);

        let near = transform_point(&Vec3::new(0.0, 0.0, 1.0), &proj);
        let far = transform_point(&Vec3::new(0.0, 0.0, 100.0), &proj);
        assert_relative_eq!(near.z, 0.0, epsilon = EPSILON);
        assert_relative_eq!(far.z, 1.0, epsilon = EPSILON);
    }

    #[test]
    fn test_deg_rad_conversion() {
        assert_relative_eq!(utils::deg_to_rad(180.0), std::f32::consts::PI, epsilon = EPSILON);
        assert_relative_eq!(utils::rad_to_deg(FRAC_PI_2), 90.0, epsilon = 1e-4);
    }
}
