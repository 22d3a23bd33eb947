//! View volumes for culling
//!
//! The octree and scene only depend on the [`CullVolume`] trait. [`Frustum`]
//! is the stock six-plane implementation.

use crate::foundation::math::{Mat4, Point, Vec3};
use super::primitives::{Aabb, Obb, Plane, Sphere};

/// A convex volume that can reject bounding boxes
pub trait CullVolume {
    /// Whether any part of the box may lie inside the volume
    fn intersects_aabb(&self, aabb: &Aabb) -> bool;

    /// Whether any part of the oriented box may lie inside the volume
    fn intersects_obb(&self, obb: &Obb) -> bool;
}

/// Frustum for visibility culling
///
/// Plane normals point into the frustum; a point is inside when it is on the
/// positive side of all six planes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    /// Six planes defining the frustum (left, right, bottom, top, near, far)
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Create a frustum from six inward-facing planes
    pub fn new(planes: [Plane; 6]) -> Self {
        Self { planes }
    }

    /// Extract frustum planes from a view-projection matrix
    ///
    /// Gribb-Hartmann extraction for column-vector matrices with clip-space
    /// depth in `[-w, w]` (the nalgebra / OpenGL convention).
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let row = |i: usize| vp.row(i).transpose();
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));

        let plane = |coefficients: nalgebra::Vector4<f32>| {
            Plane::new(coefficients.xyz(), -coefficients.w)
        };

        Self {
            planes: [
                plane(r3 + r0), // left
                plane(r3 - r0), // right
                plane(r3 + r1), // bottom
                plane(r3 - r1), // top
                plane(r3 + r2), // near
                plane(r3 - r2), // far
            ],
        }
    }

    /// Test if a point is inside the frustum
    pub fn contains_point(&self, point: &Point) -> bool {
        self.planes.iter().all(|plane| plane.equation(point) >= 0.0)
    }

    /// Test if a sphere intersects the frustum
    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.equation(&sphere.center) >= -sphere.radius)
    }

    /// A box is rejected only when it lies entirely behind one plane
    fn box_outside_any_plane(&self, center: &Point, projected_radius: impl Fn(&Vec3) -> f32) -> bool {
        self.planes
            .iter()
            .any(|plane| plane.equation(center) < -projected_radius(&plane.normal))
    }
}

impl CullVolume for Frustum {
    fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        let e = aabb.half_extents;
        !self.box_outside_any_plane(&aabb.center, |n| {
            e.x * n.x.abs() + e.y * n.y.abs() + e.z * n.z.abs()
        })
    }

    fn intersects_obb(&self, obb: &Obb) -> bool {
        !self.box_outside_any_plane(&obb.center, |n| {
            (0..3).map(|i| obb.half_extents[i] * n.dot(&obb.axis(i)).abs()).sum()
        })
    }
}
