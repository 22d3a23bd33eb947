//! Boolean intersection tests between primitive pairs
//!
//! Each pair has a named free function (`sphere_aabb`, `obb_obb`, ...) and an
//! [`Intersects`] impl in both argument orders, so callers never need to know
//! which direction a test was written in. Box/box pairs use the Separating
//! Axis Theorem over the 15 candidate axes; everything else reduces to a
//! closest-point or signed-distance check.

use crate::foundation::math::{is_degenerate, nearly_equal, Vec3, EPSILON};
use super::containment::PointQuery;
use super::primitives::{Aabb, Interval, Obb, Plane, Sphere, Triangle};

/// Symmetric overlap test between two shapes
pub trait Intersects<Rhs: ?Sized = Self> {
    /// Returns true when the shapes touch or overlap
    fn intersects(&self, other: &Rhs) -> bool;
}

/// Shapes that can be projected onto an axis for SAT
pub trait Project {
    /// Scalar range covered by the shape along `axis`
    fn interval(&self, axis: &Vec3) -> Interval;
}

impl Project for Aabb {
    fn interval(&self, axis: &Vec3) -> Interval {
        Obb::from(*self).interval(axis)
    }
}

impl Project for Obb {
    fn interval(&self, axis: &Vec3) -> Interval {
        Interval::from_projections(self.vertices().iter().map(|v| axis.dot(v)))
    }
}

impl Project for Triangle {
    fn interval(&self, axis: &Vec3) -> Interval {
        Interval::from_projections(self.points().iter().map(|v| axis.dot(v)))
    }
}

/// Run SAT over the face normals of both shapes plus every edge cross product.
///
/// Near-zero cross products come from (nearly) parallel edges; they carry no
/// separating information and are skipped instead of being tested.
fn separated_on_any_axis<A, B>(a: &A, b: &B, a_axes: &[Vec3], b_axes: &[Vec3], a_edges: &[Vec3], b_edges: &[Vec3]) -> bool
where
    A: Project,
    B: Project,
{
    let face_axes = a_axes.iter().chain(b_axes.iter()).copied();
    let edge_axes = a_edges
        .iter()
        .flat_map(|ea| b_edges.iter().map(move |eb| ea.cross(eb)));

    for axis in face_axes.chain(edge_axes) {
        if axis.magnitude_squared() < EPSILON {
            continue;
        }
        let axis = axis.normalize();
        if !a.interval(&axis).overlaps(&b.interval(&axis)) {
            return true;
        }
    }
    false
}

fn obb_axes(obb: &Obb) -> [Vec3; 3] {
    [obb.axis(0), obb.axis(1), obb.axis(2)]
}

fn world_axes() -> [Vec3; 3] {
    [Vec3::x(), Vec3::y(), Vec3::z()]
}

/// Sphere vs sphere: squared center distance against squared radius sum
pub fn sphere_sphere(a: &Sphere, b: &Sphere) -> bool {
    let radius_sum = a.radius + b.radius;
    (a.center - b.center).magnitude_squared() <= radius_sum * radius_sum
}

/// Sphere vs AABB via the box's closest point to the sphere center
pub fn sphere_aabb(sphere: &Sphere, aabb: &Aabb) -> bool {
    let closest = aabb.closest_point(&sphere.center);
    (closest - sphere.center).magnitude_squared() <= sphere.radius * sphere.radius
}

/// Sphere vs OBB via the box's closest point to the sphere center
pub fn sphere_obb(sphere: &Sphere, obb: &Obb) -> bool {
    let closest = obb.closest_point(&sphere.center);
    (closest - sphere.center).magnitude_squared() <= sphere.radius * sphere.radius
}

/// Sphere vs plane: signed distance of the center within the radius
pub fn sphere_plane(sphere: &Sphere, plane: &Plane) -> bool {
    plane.equation(&sphere.center).abs() <= sphere.radius
}

/// AABB vs AABB: per-axis interval overlap
pub fn aabb_aabb(a: &Aabb, b: &Aabb) -> bool {
    let (a_min, a_max) = (a.min(), a.max());
    let (b_min, b_max) = (b.min(), b.max());
    (0..3).all(|i| a_min[i] <= b_max[i] && b_min[i] <= a_max[i])
}

/// AABB vs OBB with the Separating Axis Theorem
pub fn aabb_obb(aabb: &Aabb, obb: &Obb) -> bool {
    let aabb_axes = world_axes();
    let obb_axes = obb_axes(obb);
    !separated_on_any_axis(aabb, obb, &aabb_axes, &obb_axes, &aabb_axes, &obb_axes)
}

/// AABB vs plane: box radius projected on the normal
pub fn aabb_plane(aabb: &Aabb, plane: &Plane) -> bool {
    let e = aabb.half_extents;
    let n = plane.normal;
    let projected_radius = e.x * n.x.abs() + e.y * n.y.abs() + e.z * n.z.abs();
    plane.equation(&aabb.center).abs() <= projected_radius
}

/// OBB vs OBB with the Separating Axis Theorem
pub fn obb_obb(a: &Obb, b: &Obb) -> bool {
    let a_axes = obb_axes(a);
    let b_axes = obb_axes(b);
    !separated_on_any_axis(a, b, &a_axes, &b_axes, &a_axes, &b_axes)
}

/// OBB vs plane: box radius projected on the normal through the local axes
pub fn obb_plane(obb: &Obb, plane: &Plane) -> bool {
    let projected_radius: f32 = (0..3)
        .map(|i| obb.half_extents[i] * plane.normal.dot(&obb.axis(i)).abs())
        .sum();
    plane.equation(&obb.center).abs() <= projected_radius
}

/// Plane vs plane: anything non-parallel meets; parallel planes only when coincident
pub fn plane_plane(a: &Plane, b: &Plane) -> bool {
    if !is_degenerate(&a.normal.cross(&b.normal)) {
        return true;
    }
    // parallel: compare offsets along the same orientation
    let b_distance = if a.normal.dot(&b.normal) < 0.0 { -b.distance } else { b.distance };
    nearly_equal(a.distance, b_distance)
}

/// Triangle vs sphere
///
/// Rejects on the supporting plane first, accepts when the center projects
/// inside the triangle, and otherwise measures against the nearest edge point.
pub fn triangle_sphere(triangle: &Triangle, sphere: &Sphere) -> bool {
    let plane = Plane::from_triangle(triangle);
    if !sphere_plane(sphere, &plane) {
        return false;
    }

    let projected = plane.closest_point(&sphere.center);
    if triangle.contains_point(&projected) {
        return true;
    }

    let radius_sq = sphere.radius * sphere.radius;
    triangle
        .edges()
        .iter()
        .any(|edge| (edge.closest_point(&sphere.center) - sphere.center).magnitude_squared() <= radius_sq)
}

/// Triangle vs plane: vertices strictly on one side means no contact
pub fn triangle_plane(triangle: &Triangle, plane: &Plane) -> bool {
    let sides = triangle.points().map(|p| plane.equation(&p));

    let all_front = sides.iter().all(|d| *d > EPSILON);
    let all_back = sides.iter().all(|d| *d < -EPSILON);
    !(all_front || all_back)
}

/// Triangle vs triangle with SAT over 2 face normals, 6 in-plane edge normals
/// and 9 edge pairs
pub fn triangle_triangle(a: &Triangle, b: &Triangle) -> bool {
    // unit length so the degenerate-axis cutoff does not depend on triangle size
    let unit = |v: Vec3| v.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::zeros);

    let a_edges = [a.b - a.a, a.c - a.b, a.a - a.c].map(unit);
    let b_edges = [b.b - b.a, b.c - b.b, b.a - b.c].map(unit);
    let a_normal = unit(a_edges[0].cross(&a_edges[1]));
    let b_normal = unit(b_edges[0].cross(&b_edges[1]));

    // in-plane edge normals separate coplanar pairs, where every edge cross
    // product collapses onto the shared face normal
    let a_axes = [
        a_normal,
        unit(a_normal.cross(&a_edges[0])),
        unit(a_normal.cross(&a_edges[1])),
        unit(a_normal.cross(&a_edges[2])),
    ];
    let b_axes = [
        b_normal,
        unit(b_normal.cross(&b_edges[0])),
        unit(b_normal.cross(&b_edges[1])),
        unit(b_normal.cross(&b_edges[2])),
    ];

    !separated_on_any_axis(a, b, &a_axes, &b_axes, &a_edges, &b_edges)
}

macro_rules! symmetric_intersects {
    ($lhs:ty, $rhs:ty, $test:ident) => {
        impl Intersects<$rhs> for $lhs {
            fn intersects(&self, other: &$rhs) -> bool {
                $test(self, other)
            }
        }

        impl Intersects<$lhs> for $rhs {
            fn intersects(&self, other: &$lhs) -> bool {
                $test(other, self)
            }
        }
    };
}

macro_rules! self_intersects {
    ($ty:ty, $test:ident) => {
        impl Intersects for $ty {
            fn intersects(&self, other: &$ty) -> bool {
                $test(self, other)
            }
        }
    };
}

self_intersects!(Sphere, sphere_sphere);
self_intersects!(Aabb, aabb_aabb);
self_intersects!(Obb, obb_obb);
self_intersects!(Plane, plane_plane);
self_intersects!(Triangle, triangle_triangle);

symmetric_intersects!(Sphere, Aabb, sphere_aabb);
symmetric_intersects!(Sphere, Obb, sphere_obb);
symmetric_intersects!(Sphere, Plane, sphere_plane);
symmetric_intersects!(Aabb, Obb, aabb_obb);
symmetric_intersects!(Aabb, Plane, aabb_plane);
symmetric_intersects!(Obb, Plane, obb_plane);
symmetric_intersects!(Triangle, Sphere, triangle_sphere);
symmetric_intersects!(Triangle, Plane, triangle_plane);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Point;
    use nalgebra::Rotation3;
    use std::f32::consts::FRAC_PI_4;

    fn rotated(center: Point, half_extents: Vec3, axis: Vec3, angle: f32) -> Obb {
        let rotation = Rotation3::from_axis_angle(&nalgebra::Unit::new_normalize(axis), angle);
        Obb::new(center, half_extents, rotation.into_inner())
    }

    #[test]
    fn test_sphere_sphere_tangency() {
        let a = Sphere::new(Point::zeros(), 1.0);
        let touching = Sphere::new(Point::new(3.0, 0.0, 0.0), 2.0);
        let apart = Sphere::new(Point::new(3.0 + 1.0e-4, 0.0, 0.0), 2.0);

        assert!(sphere_sphere(&a, &touching));
        assert!(!sphere_sphere(&a, &apart));
        assert_eq!(a.intersects(&touching), touching.intersects(&a));
    }

    #[test]
    fn test_sphere_aabb_gap_and_touch() {
        let sphere = Sphere::new(Point::zeros(), 1.0);
        let far = Aabb::new(Point::new(3.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        let near = Aabb::new(Point::new(1.5, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));

        assert!(!sphere_aabb(&sphere, &far));
        assert!(sphere_aabb(&sphere, &near));
        assert!(near.intersects(&sphere));
    }

    #[test]
    fn test_sphere_inside_box_intersects() {
        let sphere = Sphere::new(Point::new(0.1, 0.0, 0.0), 0.1);
        let obb = rotated(Point::zeros(), Vec3::new(2.0, 2.0, 2.0), Vec3::y(), 0.3);
        assert!(sphere_obb(&sphere, &obb));
    }

    #[test]
    fn test_sphere_obb_respects_rotation() {
        // a long thin box rotated 45 degrees around Z reaches the diagonal
        let obb = rotated(Point::zeros(), Vec3::new(4.0, 0.2, 0.2), Vec3::z(), FRAC_PI_4);
        let on_diagonal = Sphere::new(Point::new(2.5, 2.5, 0.0), 0.3);
        let on_axis = Sphere::new(Point::new(3.5, 0.0, 0.0), 0.3);

        assert!(sphere_obb(&on_diagonal, &obb));
        assert!(!sphere_obb(&on_axis, &obb));
    }

    #[test]
    fn test_sphere_plane() {
        let plane = Plane::new(Vec3::y(), 1.0);
        assert!(sphere_plane(&Sphere::new(Point::new(0.0, 2.0, 0.0), 1.0), &plane));
        assert!(sphere_plane(&Sphere::new(Point::new(0.0, -0.5, 0.0), 1.5), &plane));
        assert!(!sphere_plane(&Sphere::new(Point::new(0.0, 3.0, 0.0), 1.0), &plane));
    }

    #[test]
    fn test_aabb_aabb_is_symmetric() {
        let boxes = [
            Aabb::new(Point::zeros(), Vec3::new(1.0, 1.0, 1.0)),
            Aabb::new(Point::new(1.5, 0.0, 0.0), Vec3::new(0.5, 0.5, 0.5)),
            Aabb::new(Point::new(0.0, 2.5, 0.0), Vec3::new(1.0, 1.0, 1.0)),
            Aabb::new(Point::new(-4.0, 0.0, 1.0), Vec3::new(3.0, 0.1, 0.1)),
        ];
        for a in &boxes {
            for b in &boxes {
                assert_eq!(aabb_aabb(a, b), aabb_aabb(b, a));
            }
        }
        assert!(aabb_aabb(&boxes[0], &boxes[1]));
        assert!(!aabb_aabb(&boxes[0], &boxes[2]));
        assert!(aabb_aabb(&boxes[0], &boxes[3]));
    }

    #[test]
    fn test_aabb_obb_sat() {
        let aabb = Aabb::new(Point::zeros(), Vec3::new(1.0, 1.0, 1.0));
        // a cube rotated 45 degrees: its corner reaches sqrt(2) along X
        let near = rotated(Point::new(2.3, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0), Vec3::z(), FRAC_PI_4);
        let far = rotated(Point::new(2.5, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0), Vec3::z(), FRAC_PI_4);

        assert!(aabb_obb(&aabb, &near));
        assert!(!aabb_obb(&aabb, &far));
        assert!(far.intersects(&aabb) == aabb.intersects(&far));
    }

    #[test]
    fn test_aabb_obb_parallel_edges_are_not_separating() {
        // identity orientation: every edge cross product with a parallel edge is zero
        let aabb = Aabb::new(Point::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let obb = Obb::axis_aligned(Point::new(0.5, 0.5, 0.5), Vec3::new(1.0, 1.0, 1.0));
        assert!(aabb_obb(&aabb, &obb));
    }

    #[test]
    fn test_obb_obb_skewed_rotations() {
        let a = rotated(Point::zeros(), Vec3::new(1.0, 1.0, 1.0), Vec3::new(1.0, 1.0, 0.0), FRAC_PI_4);
        let b = rotated(Point::new(2.6, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0), Vec3::new(0.0, 1.0, 1.0), FRAC_PI_4);
        let c = rotated(Point::new(1.5, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0), Vec3::new(0.0, 1.0, 1.0), FRAC_PI_4);

        assert_eq!(obb_obb(&a, &b), obb_obb(&b, &a));
        assert!(obb_obb(&a, &c));
        assert!(!obb_obb(&a, &rotated(Point::new(5.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0), Vec3::x(), 0.4)));
    }

    #[test]
    fn test_box_plane() {
        let plane = Plane::new(Vec3::y(), 0.0);
        let straddling = Aabb::new(Point::new(0.0, 0.5, 0.0), Vec3::new(1.0, 1.0, 1.0));
        let above = Aabb::new(Point::new(0.0, 1.5, 0.0), Vec3::new(1.0, 1.0, 1.0));
        assert!(aabb_plane(&straddling, &plane));
        assert!(!aabb_plane(&above, &plane));

        // rotated cube reaches sqrt(2) below its center
        let tilted = rotated(Point::new(0.0, 1.3, 0.0), Vec3::new(1.0, 1.0, 1.0), Vec3::z(), FRAC_PI_4);
        assert!(obb_plane(&tilted, &plane));
        assert!(!obb_plane(&Obb::from(above), &plane));
    }

    #[test]
    fn test_plane_plane() {
        let floor = Plane::new(Vec3::y(), 0.0);
        let wall = Plane::new(Vec3::x(), 3.0);
        let raised = Plane::new(Vec3::y(), 2.0);
        let flipped = Plane::new(-Vec3::y(), -2.0);

        assert!(plane_plane(&floor, &wall));
        assert!(!plane_plane(&floor, &raised));
        assert!(plane_plane(&raised, &flipped));
        assert!(plane_plane(&floor, &floor));
    }

    #[test]
    fn test_triangle_sphere() {
        let tri = Triangle::new(
            Point::new(0.0, 0.0, 0.0),
            Point::new(4.0, 0.0, 0.0),
            Point::new(0.0, 4.0, 0.0),
        );
        // above the face
        assert!(triangle_sphere(&tri, &Sphere::new(Point::new(1.0, 1.0, 0.9), 1.0)));
        // close to the plane but beyond the hypotenuse: edge distance decides
        assert!(triangle_sphere(&tri, &Sphere::new(Point::new(2.5, 2.5, 0.0), 0.8)));
        assert!(!triangle_sphere(&tri, &Sphere::new(Point::new(3.0, 3.0, 0.0), 1.0)));
        // too far from the plane
        assert!(!triangle_sphere(&tri, &Sphere::new(Point::new(1.0, 1.0, 2.0), 1.0)));
    }

    #[test]
    fn test_triangle_plane_and_triangle() {
        let tri = Triangle::new(
            Point::new(-1.0, -1.0, 0.0),
            Point::new(1.0, -1.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        );
        assert!(triangle_plane(&tri, &Plane::new(Vec3::x(), 0.0)));
        assert!(!triangle_plane(&tri, &Plane::new(Vec3::z(), 1.0)));

        let crossing = Triangle::new(
            Point::new(0.0, 0.0, -1.0),
            Point::new(0.0, 0.0, 1.0),
            Point::new(0.0, 2.0, 0.0),
        );
        let distant = Triangle::new(
            Point::new(5.0, 0.0, -1.0),
            Point::new(5.0, 0.0, 1.0),
            Point::new(5.0, 2.0, 0.0),
        );
        assert!(triangle_triangle(&tri, &crossing));
        assert!(!triangle_triangle(&tri, &distant));
    }

    #[test]
    fn test_tiny_triangles_keep_their_separating_axes() {
        let small = Triangle::new(
            Point::new(0.0, 0.0, 0.0),
            Point::new(0.01, 0.0, 0.0),
            Point::new(0.0, 0.01, 0.0),
        );
        let shifted = |offset: Vec3| Triangle::new(small.a + offset, small.b + offset, small.c + offset);

        assert!(!triangle_triangle(&small, &shifted(Vec3::new(100.0, 0.0, 0.0))));
        assert!(!triangle_triangle(&small, &shifted(Vec3::new(0.0, 0.0, 0.02))));
        assert!(triangle_triangle(&small, &shifted(Vec3::new(0.002, 0.002, 0.0))));
    }
}
