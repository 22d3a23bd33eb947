//! Math utilities and types
//!
//! Thin aliases over nalgebra plus the tolerance used by every geometric
//! "on" / "parallel" test in the crate.

pub use nalgebra::{
    Matrix3, Matrix4,
    Quaternion,
    Unit,
    Vector3,
};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// A position in 3D space. Positions and directions share one representation.
pub type Point = Vec3;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Absolute/relative tolerance for approximate float comparisons
pub const EPSILON: f32 = 1.0e-5;

/// Compare two scalars with both an absolute and a relative tolerance.
///
/// Values near zero are compared absolutely, large values relatively, so the
/// same call works for plane distances of any magnitude.
#[inline]
pub fn nearly_equal(a: f32, b: f32) -> bool {
    approx::relative_eq!(a, b, epsilon = EPSILON, max_relative = EPSILON)
}

/// Returns true when `v` is too short to be used as a direction.
#[inline]
pub fn is_degenerate(v: &Vec3) -> bool {
    v.magnitude_squared() < EPSILON * EPSILON
}

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Rotation as an orthonormal 3x3 basis (columns are the local axes)
    pub fn rotation_matrix(&self) -> Mat3 {
        self.rotation.to_rotation_matrix().into_inner()
    }

    /// Convert to a transformation matrix
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Apply this transform to a point
    pub fn transform_point(&self, point: &Point) -> Point {
        self.position + self.rotation * self.scale.component_mul(point)
    }

    /// Apply this transform to a direction (no translation)
    pub fn transform_vector(&self, vector: &Vec3) -> Vec3 {
        self.rotation * self.scale.component_mul(vector)
    }

    /// Map a point from the space this transform produces back into its local space
    ///
    /// Exact for non-uniform scale, unlike going through [`Transform::inverse`].
    pub fn inverse_transform_point(&self, point: &Point) -> Point {
        self.inverse_transform_vector(&(point - self.position))
    }

    /// Map a direction back into local space (no translation)
    pub fn inverse_transform_vector(&self, vector: &Vec3) -> Vec3 {
        (self.rotation.inverse() * vector).component_div(&self.scale)
    }

    /// Combine this transform with a child transform (`self` is the parent)
    pub fn combine(&self, other: &Transform) -> Transform {
        Transform {
            position: self.position + self.rotation * (self.scale.component_mul(&other.position)),
            rotation: self.rotation * other.rotation,
            scale: self.scale.component_mul(&other.scale),
        }
    }

    /// Get the inverse transform
    ///
    /// Exact for uniform scale; a zero scale component yields infinities.
    pub fn inverse(&self) -> Transform {
        let inv_scale = Vec3::new(1.0 / self.scale.x, 1.0 / self.scale.y, 1.0 / self.scale.z);
        let inv_rotation = self.rotation.inverse();
        let inv_position = inv_scale.component_mul(&(inv_rotation * -self.position));

        Transform {
            position: inv_position,
            rotation: inv_rotation,
            scale: inv_scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_nearly_equal_scales_with_magnitude() {
        assert!(nearly_equal(0.0, 1.0e-6));
        assert!(!nearly_equal(0.0, 1.0e-3));
        assert!(nearly_equal(100_000.0, 100_000.5));
        assert!(!nearly_equal(1.0, 1.01));
    }

    #[test]
    fn test_transform_inverse_round_trip() {
        let transform = Transform {
            position: Vec3::new(3.0, -2.0, 5.0),
            rotation: Quat::from_axis_angle(&Vec3::y_axis(), 0.7),
            scale: Vec3::new(2.0, 2.0, 2.0),
        };
        let point = Vec3::new(1.0, 4.0, -3.0);

        let there = transform.transform_point(&point);
        let back = transform.inverse().transform_point(&there);

        assert_relative_eq!(back, point, epsilon = 1e-4);
    }

    #[test]
    fn test_transform_point_matches_matrix() {
        let transform = Transform {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quat::from_axis_angle(&Vec3::z_axis(), 1.2),
            scale: Vec3::new(1.0, 3.0, 0.5),
        };
        let point = Vec3::new(-1.0, 0.5, 2.0);

        let by_matrix = transform
            .to_matrix()
            .transform_point(&nalgebra::Point3::from(point))
            .coords;

        assert_relative_eq!(transform.transform_point(&point), by_matrix, epsilon = 1e-5);
    }

    #[test]
    fn test_inverse_transform_point_handles_non_uniform_scale() {
        let transform = Transform {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quat::from_axis_angle(&Vec3::x_axis(), 0.4),
            scale: Vec3::new(2.0, 0.5, 4.0),
        };
        let point = Vec3::new(0.3, -1.0, 2.5);

        let back = transform.inverse_transform_point(&transform.transform_point(&point));
        assert_relative_eq!(back, point, epsilon = 1e-4);
    }

    #[test]
    fn test_combine_applies_parent_after_child() {
        let parent = Transform::from_position(Vec3::new(10.0, 0.0, 0.0));
        let child = Transform::from_position(Vec3::new(0.0, 1.0, 0.0));

        let world = parent.combine(&child);
        assert_relative_eq!(world.position, Vec3::new(10.0, 1.0, 0.0));
    }
}
