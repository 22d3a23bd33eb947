//! Ray and segment casts against primitives
//!
//! A raycast reports the smallest non-negative distance along the ray at
//! which it enters the shape. A ray starting inside a solid enters at
//! `t = 0`. Misses are `None`.

use crate::foundation::math::{is_degenerate, Point, Vec3, EPSILON};
use super::primitives::{Aabb, Line, Obb, Plane, Ray, Sphere, Triangle};

/// Where a ray first meets a shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// Distance along the ray (the ray direction is unit length)
    pub t: f32,
    /// Hit point in world space
    pub point: Point,
    /// Surface normal at the hit point
    pub normal: Vec3,
}

/// Ray and segment intersection against a shape
pub trait Raycast {
    /// Entry hit along `ray`, or `None` when the ray misses
    fn raycast(&self, ray: &Ray) -> Option<RaycastHit>;

    /// Whether the segment touches the shape
    ///
    /// Casts the segment as a ray from `start` towards `end` and accepts hits
    /// no farther than the segment length.
    fn linecast(&self, line: &Line) -> bool {
        let ray = Ray::from_points(line.start, line.end);
        self.raycast(&ray)
            .is_some_and(|hit| hit.t <= line.length())
    }
}

impl Raycast for Sphere {
    fn raycast(&self, ray: &Ray) -> Option<RaycastHit> {
        let to_center = self.center - ray.origin;
        let radius_sq = self.radius * self.radius;
        let dist_sq = to_center.magnitude_squared();

        // distance along the ray to the point nearest the center
        let along = to_center.dot(&ray.direction);
        let miss_sq = dist_sq - along * along;
        let discriminant = radius_sq - miss_sq;
        if discriminant < 0.0 {
            return None;
        }

        let t = if dist_sq <= radius_sq {
            0.0
        } else {
            let t = along - discriminant.sqrt();
            if t < 0.0 {
                return None; // sphere is behind the origin
            }
            t
        };

        let point = ray.point_at(t);
        let offset = point - self.center;
        let normal = if is_degenerate(&offset) {
            -ray.direction
        } else {
            offset.normalize()
        };
        Some(RaycastHit { t, point, normal })
    }
}

/// Slab test against a box centered at the origin with the given half-extents.
///
/// Returns the entry distance and the outward normal of the entry face, both
/// in the box's frame.
fn slab(origin: &Vec3, direction: &Vec3, half_extents: &Vec3) -> Option<(f32, Vec3)> {
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;
    let mut entry_normal = -direction;

    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];
        let e = half_extents[axis];

        if d.abs() < EPSILON {
            // parallel to this slab: must already be between its faces
            if o < -e || o > e {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let mut t_near = (-e - o) * inv;
        let mut t_far = (e - o) * inv;
        if t_near > t_far {
            std::mem::swap(&mut t_near, &mut t_far);
        }

        if t_near > t_min {
            t_min = t_near;
            let mut face = Vec3::zeros();
            face[axis] = -d.signum();
            entry_normal = face;
        }
        t_max = t_max.min(t_far);

        if t_min > t_max {
            return None;
        }
    }

    if t_max < 0.0 {
        return None; // box is behind the origin
    }

    if t_min < 0.0 {
        // started inside the box
        Some((0.0, -direction))
    } else {
        Some((t_min, entry_normal))
    }
}

impl Raycast for Aabb {
    fn raycast(&self, ray: &Ray) -> Option<RaycastHit> {
        let origin = ray.origin - self.center;
        let (t, normal) = slab(&origin, &ray.direction, &self.half_extents)?;
        Some(RaycastHit { t, point: ray.point_at(t), normal })
    }
}

impl Raycast for Obb {
    fn raycast(&self, ray: &Ray) -> Option<RaycastHit> {
        let origin = self.to_local(&ray.origin);
        let direction = self.orientation.tr_mul(&ray.direction);
        let (t, local_normal) = slab(&origin, &direction, &self.half_extents)?;
        Some(RaycastHit {
            t,
            point: ray.point_at(t),
            normal: self.orientation * local_normal,
        })
    }
}

impl Raycast for Plane {
    fn raycast(&self, ray: &Ray) -> Option<RaycastHit> {
        let denominator = self.normal.dot(&ray.direction);
        if denominator.abs() < EPSILON {
            return None; // parallel
        }

        let t = (self.distance - self.normal.dot(&ray.origin)) / denominator;
        if t < 0.0 {
            return None;
        }

        Some(RaycastHit {
            t,
            point: ray.point_at(t),
            normal: self.normal,
        })
    }
}

impl Raycast for Triangle {
    /// Möller-Trumbore ray-triangle intersection.
    /// See: "Fast, Minimum Storage Ray/Triangle Intersection" by Möller & Trumbore
    fn raycast(&self, ray: &Ray) -> Option<RaycastHit> {
        let edge1 = self.b - self.a;
        let edge2 = self.c - self.a;

        let h = ray.direction.cross(&edge2);
        let det = edge1.dot(&h);

        // Ray parallel to triangle?
        if det.abs() < EPSILON * EPSILON {
            return None;
        }

        let f = 1.0 / det;
        let s = ray.origin - self.a;
        let u = f * s.dot(&h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = f * ray.direction.dot(&q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(&q);
        if t < 0.0 {
            return None; // behind ray origin
        }

        Some(RaycastHit {
            t,
            point: ray.point_at(t),
            normal: self.normal(),
        })
    }
}
