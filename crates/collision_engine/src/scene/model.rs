//! Models and the registry that owns them
//!
//! The octree and the scene never own models. They hold [`ModelId`] handles
//! and ask a [`ModelSource`] for world-space bounds every time they need them,
//! so a moved model is seen as soon as its transform changes.

use slotmap::SlotMap;

use crate::foundation::logging::warn;
use crate::foundation::math::{Transform, Vec3};
use crate::geometry::{Aabb, Obb, Ray, Raycast, RaycastHit, Triangle};

slotmap::new_key_type! {
    /// Handle to a model stored in a [`ModelRegistry`]
    pub struct ModelId;
}

/// Lookup side of the model boundary
///
/// Implementations must be cheap and side-effect free; the spatial index
/// calls these repeatedly instead of caching results.
pub trait ModelSource {
    /// Current world-space bounds, or `None` if the id is unknown
    fn bounds(&self, id: ModelId) -> Option<Obb>;

    /// World-space distance along `ray` to the model, or `None` on a miss
    fn raycast(&self, id: ModelId, ray: &Ray) -> Option<f32>;

    /// Direct parent of the model
    fn parent(&self, id: ModelId) -> Option<ModelId>;
}

/// Triangle soup in model space
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Triangles in local coordinates
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    /// Create a mesh from triangles
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    /// Build a mesh from an indexed vertex list
    ///
    /// Trailing indices that do not form a whole triangle are ignored, as are
    /// triangles that reference a vertex past the end of `vertices`.
    pub fn from_vertices(vertices: &[Vec3], indices: &[u32]) -> Self {
        let vertex = |i: u32| vertices.get(i as usize).copied();
        let triangles = indices
            .chunks_exact(3)
            .filter_map(|chunk| {
                Some(Triangle::new(vertex(chunk[0])?, vertex(chunk[1])?, vertex(chunk[2])?))
            })
            .collect();

        Self { triangles }
    }

    /// Tight local-space box around every vertex; `None` for an empty mesh
    pub fn bounds(&self) -> Option<Aabb> {
        let mut points = self.triangles.iter().flat_map(Triangle::points);
        let first = points.next()?;
        let (min, max) = points.fold((first, first), |(min, max), p| (min.inf(&p), max.sup(&p)));
        Some(Aabb::from_min_max(min, max))
    }
}

impl Raycast for Mesh {
    /// Nearest triangle hit
    fn raycast(&self, ray: &Ray) -> Option<RaycastHit> {
        self.triangles
            .iter()
            .filter_map(|triangle| triangle.raycast(ray))
            .min_by(|a, b| a.t.total_cmp(&b.t))
    }
}

/// A placeable object with local bounds and an optional mesh
#[derive(Debug, Clone, Default)]
pub struct Model {
    /// Transform relative to the parent (or the world when there is none)
    pub transform: Transform,
    /// Parent model; its world transform is applied after this one
    pub parent: Option<ModelId>,
    /// Bounds in model space
    pub bounds: Aabb,
    /// Collision mesh in model space
    pub mesh: Option<Mesh>,
}

impl Model {
    /// A model with the given local bounds and an identity transform
    pub fn new(bounds: Aabb) -> Self {
        Self {
            bounds,
            ..Default::default()
        }
    }

    /// A model whose local bounds are taken from its mesh
    pub fn from_mesh(mesh: Mesh) -> Self {
        Self {
            bounds: mesh.bounds().unwrap_or_default(),
            mesh: Some(mesh),
            ..Default::default()
        }
    }

    /// Builder-style transform setter
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Builder-style parent setter
    pub fn with_parent(mut self, parent: ModelId) -> Self {
        self.parent = Some(parent);
        self
    }
}

/// Owner of every model, addressed by [`ModelId`]
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: SlotMap<ModelId, Model>,
}

impl ModelRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a model and return its handle
    pub fn insert(&mut self, model: Model) -> ModelId {
        self.models.insert(model)
    }

    /// Remove a model; handles to it become stale
    pub fn remove(&mut self, id: ModelId) -> Option<Model> {
        self.models.remove(id)
    }

    /// Borrow a model
    pub fn get(&self, id: ModelId) -> Option<&Model> {
        self.models.get(id)
    }

    /// Mutably borrow a model
    ///
    /// If the model is part of an accelerated scene, call
    /// `Scene::update_model` after changing its transform or bounds.
    pub fn get_mut(&mut self, id: ModelId) -> Option<&mut Model> {
        self.models.get_mut(id)
    }

    /// Whether the handle still refers to a model
    pub fn contains(&self, id: ModelId) -> bool {
        self.models.contains_key(id)
    }

    /// Number of stored models
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// True when no models are stored
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Handles of every stored model
    pub fn ids(&self) -> impl Iterator<Item = ModelId> + '_ {
        self.models.keys()
    }

    /// Iterate over models with their handles
    pub fn iter(&self) -> impl Iterator<Item = (ModelId, &Model)> {
        self.models.iter()
    }

    /// Local transform composed with every ancestor's transform
    ///
    /// A parent that has been removed ends the chain as if the model were a
    /// root. A parent cycle is cut after visiting every model once.
    pub fn world_transform(&self, id: ModelId) -> Option<Transform> {
        let model = self.models.get(id)?;
        let mut world = model.transform.clone();
        let mut next = model.parent;
        let mut hops = 0;

        while let Some(parent_id) = next {
            let Some(parent) = self.models.get(parent_id) else {
                warn!("Model {:?} refers to a parent that is no longer registered", id);
                break;
            };
            hops += 1;
            if hops > self.models.len() {
                warn!("Parent cycle while resolving the world transform of {:?}", id);
                break;
            }
            world = parent.transform.combine(&world);
            next = parent.parent;
        }

        Some(world)
    }

    /// World-space oriented bounds of a model
    ///
    /// The local box is scaled by the absolute world scale and rotated by the
    /// world rotation.
    pub fn world_obb(&self, id: ModelId) -> Option<Obb> {
        let model = self.models.get(id)?;
        let world = self.world_transform(id)?;

        Some(Obb::new(
            world.transform_point(&model.bounds.center),
            model.bounds.half_extents.component_mul(&world.scale.abs()),
            world.rotation_matrix(),
        ))
    }

    /// Cast a world-space ray against a model's mesh, or its local bounds
    /// when it has no mesh
    ///
    /// The ray is taken into model space for the test; the returned distance
    /// is measured back in world space.
    pub fn model_raycast(&self, id: ModelId, ray: &Ray) -> Option<f32> {
        let model = self.models.get(id)?;
        let world = self.world_transform(id)?;

        let local_ray = Ray::new(
            world.inverse_transform_point(&ray.origin),
            world.inverse_transform_vector(&ray.direction),
        );
        let hit = match &model.mesh {
            Some(mesh) => mesh.raycast(&local_ray),
            None => model.bounds.raycast(&local_ray),
        }?;

        Some((world.transform_point(&hit.point) - ray.origin).magnitude())
    }
}

impl ModelSource for ModelRegistry {
    fn bounds(&self, id: ModelId) -> Option<Obb> {
        self.world_obb(id)
    }

    fn raycast(&self, id: ModelId, ray: &Ray) -> Option<f32> {
        self.model_raycast(id, ray)
    }

    fn parent(&self, id: ModelId) -> Option<ModelId> {
        self.models.get(id).and_then(|model| model.parent)
    }
}
