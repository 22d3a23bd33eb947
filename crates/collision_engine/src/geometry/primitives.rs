//! Primitive geometric value types
//!
//! Every shape here is a plain `Copy` value. Invariants (unit ray direction,
//! unit plane normal, orthonormal OBB basis, non-negative extents) are set up
//! by the constructors; code that mutates the public fields directly is
//! responsible for restoring them.

use crate::foundation::math::{Mat3, Point, Vec3};

/// A finite segment from `start` to `end`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    /// First endpoint
    pub start: Point,
    /// Second endpoint
    pub end: Point,
}

impl Line {
    /// Creates a segment between two points
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Length of the segment
    pub fn length(&self) -> f32 {
        (self.end - self.start).magnitude()
    }

    /// Squared length of the segment
    pub fn length_squared(&self) -> f32 {
        (self.end - self.start).magnitude_squared()
    }
}

/// A half-infinite ray for ray casting and picking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The origin point of the ray
    pub origin: Point,
    /// The direction of the ray (unit length)
    pub direction: Vec3,
}

impl Default for Ray {
    fn default() -> Self {
        Self {
            origin: Point::zeros(),
            direction: Vec3::z(),
        }
    }
}

impl Ray {
    /// Creates a new ray, normalizing the direction
    pub fn new(origin: Point, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Ray starting at `from` and pointing towards `to`
    pub fn from_points(from: Point, to: Point) -> Self {
        Self::new(from, to - from)
    }

    /// Restore the unit-length invariant after mutating `direction`
    pub fn normalize_direction(&mut self) {
        self.direction = self.direction.normalize();
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Point {
        self.origin + self.direction * t
    }
}

/// A sphere given by center and radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// The center position of the sphere
    pub center: Point,
    /// The radius of the sphere
    pub radius: f32,
}

impl Default for Sphere {
    fn default() -> Self {
        Self::new(Point::zeros(), 1.0)
    }
}

impl Sphere {
    /// Creates a new sphere with the given center and radius
    pub fn new(center: Point, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// Axis-aligned bounding box stored as center and half-extents
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Center of the box
    pub center: Point,
    /// Half-size along each world axis
    pub half_extents: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::new(Point::zeros(), Vec3::new(1.0, 1.0, 1.0))
    }
}

impl Aabb {
    /// Create an AABB centered at a point with given half-extents
    pub fn new(center: Point, half_extents: Vec3) -> Self {
        Self { center, half_extents }
    }

    /// Create an AABB from two opposite corners (in any order)
    pub fn from_min_max(a: Point, b: Point) -> Self {
        let min = a.inf(&b);
        let max = a.sup(&b);
        Self {
            center: (min + max) * 0.5,
            half_extents: (max - min) * 0.5,
        }
    }

    /// Create a cube centered at `center` with half-size `half_size` on every axis
    pub fn cube(center: Point, half_size: f32) -> Self {
        Self::new(center, Vec3::repeat(half_size))
    }

    /// Minimum corner
    pub fn min(&self) -> Point {
        let p1 = self.center + self.half_extents;
        let p2 = self.center - self.half_extents;
        p1.inf(&p2)
    }

    /// Maximum corner
    pub fn max(&self) -> Point {
        let p1 = self.center + self.half_extents;
        let p2 = self.center - self.half_extents;
        p1.sup(&p2)
    }
}

/// Oriented bounding box
///
/// The columns of `orientation` are the box's local X, Y and Z axes expressed
/// in world space; they must stay orthonormal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obb {
    /// Center of the box
    pub center: Point,
    /// Half-size along each local axis
    pub half_extents: Vec3,
    /// Orthonormal basis, one local axis per column
    pub orientation: Mat3,
}

impl Default for Obb {
    fn default() -> Self {
        Self::axis_aligned(Point::zeros(), Vec3::new(1.0, 1.0, 1.0))
    }
}

impl Obb {
    /// Creates an oriented box
    pub fn new(center: Point, half_extents: Vec3, orientation: Mat3) -> Self {
        Self { center, half_extents, orientation }
    }

    /// An OBB with identity orientation
    pub fn axis_aligned(center: Point, half_extents: Vec3) -> Self {
        Self::new(center, half_extents, Mat3::identity())
    }

    /// Local axis `i` (0 = X, 1 = Y, 2 = Z) in world space
    pub fn axis(&self, i: usize) -> Vec3 {
        self.orientation.column(i).into_owned()
    }

    /// Express a world-space point in the box's local frame
    pub fn to_local(&self, point: &Point) -> Vec3 {
        self.orientation.tr_mul(&(point - self.center))
    }

    /// Express a local-frame point in world space
    pub fn to_world(&self, local: &Vec3) -> Point {
        self.center + self.orientation * local
    }

    /// The eight corners in world space
    pub fn vertices(&self) -> [Point; 8] {
        let mut out = [Point::zeros(); 8];
        for (i, vertex) in out.iter_mut().enumerate() {
            let signs = Vec3::new(
                if i & 1 == 0 { -1.0 } else { 1.0 },
                if i & 2 == 0 { -1.0 } else { 1.0 },
                if i & 4 == 0 { -1.0 } else { 1.0 },
            );
            *vertex = self.to_world(&self.half_extents.component_mul(&signs));
        }
        out
    }
}

impl From<Aabb> for Obb {
    fn from(aabb: Aabb) -> Self {
        Obb::axis_aligned(aabb.center, aabb.half_extents)
    }
}

/// An infinite plane `normal · p = distance`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Normal vector (unit length)
    pub normal: Vec3,
    /// Signed distance from the origin along the normal
    pub distance: f32,
}

impl Default for Plane {
    fn default() -> Self {
        Self { normal: Vec3::x(), distance: 0.0 }
    }
}

impl Plane {
    /// Create a plane, normalizing the normal and rescaling the distance to match
    pub fn new(normal: Vec3, distance: f32) -> Self {
        let length = normal.magnitude();
        Self {
            normal: normal / length,
            distance: distance / length,
        }
    }

    /// Plane through `point` with the given normal
    pub fn from_point_normal(point: Point, normal: Vec3) -> Self {
        let normal = normal.normalize();
        Self { normal, distance: normal.dot(&point) }
    }

    /// Supporting plane of a triangle, normal `(b - a) x (c - a)`
    pub fn from_triangle(triangle: &Triangle) -> Self {
        Self::from_point_normal(triangle.a, triangle.normal())
    }

    /// Signed distance of `point` from the plane: positive on the normal side
    pub fn equation(&self, point: &Point) -> f32 {
        self.normal.dot(point) - self.distance
    }
}

/// A triangle with three ordered vertices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// First vertex
    pub a: Point,
    /// Second vertex
    pub b: Point,
    /// Third vertex
    pub c: Point,
}

impl Triangle {
    /// Creates a new triangle
    pub fn new(a: Point, b: Point, c: Point) -> Self {
        Self { a, b, c }
    }

    /// Vertices in order
    pub fn points(&self) -> [Point; 3] {
        [self.a, self.b, self.c]
    }

    /// Calculates the normal of the triangle (right-hand rule)
    pub fn normal(&self) -> Vec3 {
        (self.b - self.a).cross(&(self.c - self.a)).normalize()
    }

    /// Calculates the centroid (center point) of the triangle
    pub fn centroid(&self) -> Point {
        (self.a + self.b + self.c) / 3.0
    }

    /// The three edges as segments `ab`, `bc`, `ca`
    pub fn edges(&self) -> [Line; 3] {
        [
            Line::new(self.a, self.b),
            Line::new(self.b, self.c),
            Line::new(self.c, self.a),
        ]
    }
}

/// Closed scalar range produced by projecting a shape onto an axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    /// Smallest projection
    pub min: f32,
    /// Largest projection
    pub max: f32,
}

impl Interval {
    /// Smallest interval covering all the given projections
    pub fn from_projections<I>(values: I) -> Self
    where
        I: IntoIterator<Item = f32>,
    {
        values.into_iter().fold(
            Self { min: f32::INFINITY, max: f32::NEG_INFINITY },
            |acc, v| Self { min: acc.min.min(v), max: acc.max.max(v) },
        )
    }

    /// Closed-interval overlap (touching counts)
    pub fn overlaps(&self, other: &Interval) -> bool {
        other.min <= self.max && self.min <= other.max
    }
}
