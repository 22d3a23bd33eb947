//! Geometric primitives and the exact tests between them
//!
//! Primitive shapes, point classification, pairwise intersection, ray casts
//! and the culling volume used by the spatial index.

pub mod primitives;
pub mod containment;
pub mod intersection;
pub mod raycast;
pub mod frustum;

pub use primitives::{Aabb, Interval, Line, Obb, Plane, Ray, Sphere, Triangle};
pub use containment::PointQuery;
pub use intersection::{Intersects, Project};
pub use raycast::{Raycast, RaycastHit};
pub use frustum::{CullVolume, Frustum};
