//! Scene-level collision queries
//!
//! ## Architecture
//!
//! ```text
//! ModelRegistry (owns models)
//!      ↓  ModelSource: bounds / raycast / parent
//! Scene (membership, dispatch)
//!      ↓
//! Octree (optional acceleration)
//! ```
//!
//! The scene and the octree only hold [`ModelId`] handles. Every query takes
//! the [`ModelSource`] that resolves them, so bounds always reflect the
//! models' current transforms.

pub mod model;
mod collision_scene;

#[cfg(test)]
mod tests;

pub use model::{Mesh, Model, ModelId, ModelRegistry, ModelSource};
pub use collision_scene::Scene;
