//! # Collision Engine
//!
//! 3D collision detection and spatial queries.
//!
//! ## Features
//!
//! - **Primitives**: lines, rays, spheres, axis-aligned and oriented boxes,
//!   planes, triangles
//! - **Exact tests**: point classification, closest points, pairwise
//!   intersection (SAT for box/box), ray and segment casts
//! - **Octree**: insert / remove / update, nearest raycast, region queries and
//!   frustum culling
//! - **Scene**: one query API whether or not the octree has been built
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use collision_engine::prelude::*;
//!
//! let mut registry = ModelRegistry::new();
//! let crate_box = registry.insert(
//!     Model::new(Aabb::cube(Vec3::zeros(), 0.5))
//!         .with_transform(Transform::from_position(Vec3::new(0.0, 0.0, 5.0))),
//! );
//!
//! let mut scene = Scene::new();
//! scene.add_model(crate_box, &registry);
//! scene.accelerate(Vec3::zeros(), 10.0, 4, &registry);
//!
//! let ray = Ray::new(Vec3::zeros(), Vec3::z());
//! assert_eq!(scene.raycast(&ray, &registry), Some(crate_box));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod geometry;
pub mod spatial;
pub mod scene;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError},
        foundation::math::{Mat3, Mat4, Point, Quat, Transform, Vec3},
        geometry::{
            Aabb, CullVolume, Frustum, Intersects, Interval, Line, Obb, Plane, PointQuery, Ray,
            Raycast, RaycastHit, Sphere, Triangle,
        },
        scene::{Mesh, Model, ModelId, ModelRegistry, ModelSource, Scene},
        spatial::{Octree, OctreeConfig, OctreeNode},
    };
}
