//! Point classification and closest-point projection
//!
//! One [`PointQuery`] impl per primitive. For solids (sphere, boxes) the
//! closest point of the sphere is taken on its boundary, while the boxes clamp
//! into the solid; lower-dimensional shapes (plane, line, ray, triangle)
//! project onto the shape itself.

use crate::foundation::math::{is_degenerate, nearly_equal, Point, Vec3};
use super::primitives::{Aabb, Line, Obb, Plane, Ray, Sphere, Triangle};

/// Point-vs-shape queries
pub trait PointQuery {
    /// Whether `point` lies inside (solids) or on (planes, segments, rays,
    /// triangles) the shape. Boundaries count as inside.
    fn contains_point(&self, point: &Point) -> bool;

    /// The point of the shape nearest to `point`
    fn closest_point(&self, point: &Point) -> Point;
}

impl PointQuery for Sphere {
    fn contains_point(&self, point: &Point) -> bool {
        (point - self.center).magnitude_squared() <= self.radius * self.radius
    }

    /// Projects onto the surface, even when `point` is inside the sphere.
    /// At the exact center the direction is undefined; `+X` is used.
    fn closest_point(&self, point: &Point) -> Point {
        let offset = point - self.center;
        let direction = if is_degenerate(&offset) {
            Vec3::x()
        } else {
            offset.normalize()
        };
        self.center + direction * self.radius
    }
}

impl PointQuery for Aabb {
    fn contains_point(&self, point: &Point) -> bool {
        let min = self.min();
        let max = self.max();
        (0..3).all(|i| point[i] >= min[i] && point[i] <= max[i])
    }

    fn closest_point(&self, point: &Point) -> Point {
        point.sup(&self.min()).inf(&self.max())
    }
}

impl PointQuery for Obb {
    fn contains_point(&self, point: &Point) -> bool {
        let local = self.to_local(point);
        (0..3).all(|i| local[i].abs() <= self.half_extents[i])
    }

    fn closest_point(&self, point: &Point) -> Point {
        let local = self.to_local(point);
        let clamped = local.sup(&-self.half_extents).inf(&self.half_extents);
        self.to_world(&clamped)
    }
}

impl PointQuery for Plane {
    fn contains_point(&self, point: &Point) -> bool {
        nearly_equal(self.normal.dot(point), self.distance)
    }

    fn closest_point(&self, point: &Point) -> Point {
        point - self.normal * self.equation(point)
    }
}

impl PointQuery for Line {
    fn contains_point(&self, point: &Point) -> bool {
        let closest = self.closest_point(point);
        nearly_equal((closest - point).magnitude_squared(), 0.0)
    }

    fn closest_point(&self, point: &Point) -> Point {
        let segment = self.end - self.start;
        let t = (point - self.start).dot(&segment) / segment.magnitude_squared();
        self.start + segment * t.clamp(0.0, 1.0)
    }
}

impl PointQuery for Ray {
    fn contains_point(&self, point: &Point) -> bool {
        let closest = self.closest_point(point);
        nearly_equal((closest - point).magnitude_squared(), 0.0)
    }

    fn closest_point(&self, point: &Point) -> Point {
        let t = (point - self.origin).dot(&self.direction);
        self.point_at(t.max(0.0))
    }
}

impl PointQuery for Triangle {
    fn contains_point(&self, point: &Point) -> bool {
        if !Plane::from_triangle(self).contains_point(point) {
            return false;
        }
        within_edges(self, point)
    }

    /// Projects onto the supporting plane; when the projection falls outside
    /// the triangle, the nearest point on the three edges wins.
    fn closest_point(&self, point: &Point) -> Point {
        let projected = Plane::from_triangle(self).closest_point(point);
        if within_edges(self, &projected) {
            return projected;
        }

        self.edges()
            .iter()
            .map(|edge| edge.closest_point(point))
            .min_by(|lhs, rhs| {
                (lhs - point)
                    .magnitude_squared()
                    .total_cmp(&(rhs - point).magnitude_squared())
            })
            .unwrap_or(projected)
    }
}

/// Sub-triangle winding test for a point already on the triangle's plane.
///
/// The three triangles `(p, b, c)`, `(p, c, a)` and `(p, a, b)` must all wind
/// the same way relative to the triangle normal.
fn within_edges(triangle: &Triangle, point: &Point) -> bool {
    let normal = (triangle.b - triangle.a).cross(&(triangle.c - triangle.a));
    let a = triangle.a - point;
    let b = triangle.b - point;
    let c = triangle.c - point;

    let areas = [
        normal.dot(&b.cross(&c)),
        normal.dot(&c.cross(&a)),
        normal.dot(&a.cross(&b)),
    ];

    areas.iter().all(|area| *area >= 0.0) || areas.iter().all(|area| *area <= 0.0)
}
