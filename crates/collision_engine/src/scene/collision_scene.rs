//! Query façade over a set of models
//!
//! A [`Scene`] answers raycasts, region queries and culling either by a
//! linear scan over its members or, once [`Scene::accelerate`] has run,
//! through an [`Octree`]. Callers see the same results either way, except
//! that the octree only indexes models overlapping its root region and may
//! cull slightly more eagerly (see [`Scene::cull`]).

use std::collections::HashSet;

use crate::foundation::logging::{debug, trace, warn};
use crate::foundation::math::Vec3;
use crate::geometry::intersection::{aabb_obb, sphere_obb};
use crate::geometry::{Aabb, CullVolume, Obb, Ray, Sphere};
use crate::spatial::{nearer, Octree, OctreeConfig};
use super::model::{ModelId, ModelSource};

/// Set of models plus an optional acceleration structure
///
/// Models are referenced by id; their lifetime belongs to whatever
/// [`ModelSource`] the caller passes to each operation.
#[derive(Debug, Default)]
pub struct Scene {
    objects: Vec<ModelId>,
    octree: Option<Octree>,
}

impl Scene {
    /// Create an empty, unaccelerated scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Member models in insertion order
    pub fn models(&self) -> &[ModelId] {
        &self.objects
    }

    /// Whether `id` is a member
    pub fn contains(&self, id: ModelId) -> bool {
        self.objects.contains(&id)
    }

    /// Number of member models
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True when the scene has no members
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Whether queries go through an octree
    pub fn has_octree(&self) -> bool {
        self.octree.is_some()
    }

    /// The acceleration structure, if built
    pub fn octree(&self) -> Option<&Octree> {
        self.octree.as_ref()
    }

    /// Add a model; adding a member again is a no-op returning false
    ///
    /// With an octree present the model is inserted into it as well.
    pub fn add_model<S>(&mut self, id: ModelId, source: &S) -> bool
    where
        S: ModelSource + ?Sized,
    {
        if self.contains(id) {
            return false;
        }

        self.objects.push(id);
        if let Some(octree) = self.octree.as_mut() {
            octree.insert(id, source);
        }
        debug!("Added {:?} to scene ({} models)", id, self.objects.len());
        true
    }

    /// Remove a model; removing a non-member is a no-op returning false
    pub fn remove_model(&mut self, id: ModelId) -> bool {
        let Some(index) = self.objects.iter().position(|&member| member == id) else {
            return false;
        };

        self.objects.remove(index);
        if let Some(octree) = self.octree.as_mut() {
            octree.remove(id);
        }
        debug!("Removed {:?} from scene ({} models)", id, self.objects.len());
        true
    }

    /// Refresh the octree after a member's transform or bounds changed
    ///
    /// Returns false for non-members. Without an octree there is nothing to
    /// refresh and members report true.
    pub fn update_model<S>(&mut self, id: ModelId, source: &S) -> bool
    where
        S: ModelSource + ?Sized,
    {
        if !self.contains(id) {
            warn!("Cannot update {:?}: not part of the scene", id);
            return false;
        }

        if let Some(octree) = self.octree.as_mut() {
            octree.update(id, source);
        }
        true
    }

    /// Members that have `id` anywhere in their parent chain
    pub fn find_children<S>(&self, id: ModelId, source: &S) -> Vec<ModelId>
    where
        S: ModelSource + ?Sized,
    {
        self.objects
            .iter()
            .copied()
            .filter(|&candidate| candidate != id && has_ancestor(candidate, id, source))
            .collect()
    }

    /// Build an octree over the current members
    ///
    /// The root is a cube centered at `position` with half-extent `size`,
    /// split `depth` levels. A scene is accelerated at most once; later
    /// calls log a warning and return false.
    pub fn accelerate<S>(&mut self, position: Vec3, size: f32, depth: u32, source: &S) -> bool
    where
        S: ModelSource + ?Sized,
    {
        self.accelerate_with(
            OctreeConfig {
                center: position,
                half_size: size,
                max_depth: depth,
            },
            source,
        )
    }

    /// [`Scene::accelerate`] driven by a loaded configuration
    pub fn accelerate_with<S>(&mut self, config: OctreeConfig, source: &S) -> bool
    where
        S: ModelSource + ?Sized,
    {
        if self.octree.is_some() {
            warn!("Scene is already accelerated; keeping the existing octree");
            return false;
        }

        debug!(
            "Accelerating scene: {} models, half size {}, depth {}",
            self.objects.len(),
            config.half_size,
            config.max_depth
        );
        self.octree = Some(Octree::build(config, self.objects.iter().copied(), source));
        true
    }

    /// Nearest member hit by `ray`
    pub fn raycast<S>(&self, ray: &Ray, source: &S) -> Option<ModelId>
    where
        S: ModelSource + ?Sized,
    {
        let hit = match &self.octree {
            Some(octree) => octree.raycast(ray, source),
            None => self
                .objects
                .iter()
                .filter_map(|&id| source.raycast(id, ray).map(|t| (id, t)))
                .fold(None, nearer),
        };

        trace!("Scene raycast hit {:?}", hit);
        hit.map(|(id, _)| id)
    }

    /// Members whose bounds touch `sphere`, each reported once
    pub fn query_sphere<S>(&self, sphere: &Sphere, source: &S) -> Vec<ModelId>
    where
        S: ModelSource + ?Sized,
    {
        match &self.octree {
            Some(octree) => unique(octree.query_sphere(sphere, source)),
            None => self.scan(source, |bounds| sphere_obb(sphere, bounds)),
        }
    }

    /// Members whose bounds touch `aabb`, each reported once
    pub fn query_aabb<S>(&self, aabb: &Aabb, source: &S) -> Vec<ModelId>
    where
        S: ModelSource + ?Sized,
    {
        match &self.octree {
            Some(octree) => unique(octree.query_aabb(aabb, source)),
            None => self.scan(source, |bounds| aabb_obb(aabb, bounds)),
        }
    }

    /// Members inside a culling volume, each reported once
    ///
    /// Through the octree the result is a subset of the linear scan's. A box
    /// is rejected only when it lies entirely behind a single plane, so a
    /// model grazing a frustum corner can pass the scan while every leaf
    /// holding it is rejected. A model whose center is inside the volume is
    /// always reported on both paths.
    pub fn cull<V, S>(&self, volume: &V, source: &S) -> Vec<ModelId>
    where
        V: CullVolume + ?Sized,
        S: ModelSource + ?Sized,
    {
        match &self.octree {
            Some(octree) => unique(octree.cull(volume, source)),
            None => self.scan(source, |bounds| volume.intersects_obb(bounds)),
        }
    }

    fn scan<S, F>(&self, source: &S, mut keep: F) -> Vec<ModelId>
    where
        S: ModelSource + ?Sized,
        F: FnMut(&Obb) -> bool,
    {
        self.objects
            .iter()
            .copied()
            .filter(|&id| source.bounds(id).is_some_and(|bounds| keep(&bounds)))
            .collect()
    }
}

/// Walk the parent chain of `model` looking for `ancestor`
fn has_ancestor<S>(model: ModelId, ancestor: ModelId, source: &S) -> bool
where
    S: ModelSource + ?Sized,
{
    let mut visited = HashSet::new();
    let mut next = source.parent(model);

    while let Some(parent) = next {
        if parent == ancestor {
            return true;
        }
        if !visited.insert(parent) {
            return false;
        }
        next = source.parent(parent);
    }
    false
}

/// Drop repeated ids, keeping the first occurrence of each
fn unique(ids: Vec<ModelId>) -> Vec<ModelId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
