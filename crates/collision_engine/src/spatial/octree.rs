//! Octree spatial partitioning structure
//!
//! Divides a cubic region into eight octants per level down to a fixed
//! depth. Nodes store [`ModelId`] handles only and ask a [`ModelSource`] for
//! current bounds whenever a test needs them.
//!
//! A model whose bounds straddle a split plane is referenced from every
//! child it overlaps. Node-level queries therefore may report the same id
//! more than once; callers that want a set deduplicate.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::foundation::logging::{debug, trace, warn};
use crate::foundation::math::Vec3;
use crate::geometry::intersection::{aabb_aabb, aabb_obb, sphere_aabb, sphere_obb};
use crate::geometry::{Aabb, CullVolume, Obb, Ray, Raycast, Sphere};
use crate::scene::model::{ModelId, ModelSource};

/// Configuration for octree construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OctreeConfig {
    /// Center of the cubic root region
    pub center: Vec3,

    /// Half-extent of the root region on every axis
    pub half_size: f32,

    /// Number of split levels below the root
    pub max_depth: u32,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            center: Vec3::zeros(),
            half_size: 50.0,
            max_depth: 5,
        }
    }
}

impl Config for OctreeConfig {}

impl OctreeConfig {
    /// Deepest split worth configuring; node count grows as 8^depth
    pub const RECOMMENDED_MAX_DEPTH: u32 = 8;

    /// Region covered by the root node
    pub fn root_bounds(&self) -> Aabb {
        Aabb::cube(self.center, self.half_size)
    }

    /// Whether `max_depth` stays within [`Self::RECOMMENDED_MAX_DEPTH`]
    pub fn has_recommended_depth(&self) -> bool {
        self.max_depth <= Self::RECOMMENDED_MAX_DEPTH
    }
}

/// Single node in the octree hierarchy
#[derive(Debug, Clone)]
pub struct OctreeNode {
    /// World-space region of this node
    pub bounds: Aabb,

    /// Models overlapping this node (leaves only; empty once split)
    pub models: Vec<ModelId>,

    /// Child nodes (8 octants), None if this is a leaf
    pub children: Option<Box<[OctreeNode; 8]>>,

    /// Depth in the tree (0 = root)
    pub depth: u32,
}

impl OctreeNode {
    /// Create a new empty leaf
    pub fn new(bounds: Aabb, depth: u32) -> Self {
        Self {
            bounds,
            models: Vec::new(),
            children: None,
            depth,
        }
    }

    /// Check if this node is a leaf (has no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Region of child `octant`
    ///
    /// Octant layout (bit 0 = X, bit 1 = Y, bit 2 = Z; set bit = positive side):
    /// 0: -X -Y -Z, 1: +X -Y -Z, 2: -X +Y -Z, 3: +X +Y -Z,
    /// 4: -X -Y +Z, 5: +X -Y +Z, 6: -X +Y +Z, 7: +X +Y +Z
    fn child_bounds(&self, octant: usize) -> Aabb {
        let quarter_extents = self.bounds.half_extents * 0.5;
        let sign = |bit: usize| if octant & bit != 0 { 1.0 } else { -1.0 };
        let offset = Vec3::new(sign(1), sign(2), sign(4)).component_mul(&quarter_extents);

        Aabb::new(self.bounds.center + offset, quarter_extents)
    }

    /// Subdivide `depth` more levels, pushing this node's models into every
    /// child they overlap
    pub fn split<S>(&mut self, depth: u32, source: &S)
    where
        S: ModelSource + ?Sized,
    {
        if depth == 0 {
            return;
        }

        if self.children.is_none() {
            let children = std::array::from_fn(|octant| {
                OctreeNode::new(self.child_bounds(octant), self.depth + 1)
            });
            self.children = Some(Box::new(children));
        }

        let models = std::mem::take(&mut self.models);
        let Some(children) = self.children.as_deref_mut() else {
            return;
        };

        for id in models {
            let Some(bounds) = source.bounds(id) else {
                warn!("Dropping unknown model {:?} while splitting octree node", id);
                continue;
            };
            for child in children.iter_mut() {
                if aabb_obb(&child.bounds, &bounds) {
                    child.models.push(id);
                }
            }
        }

        for child in children.iter_mut() {
            child.split(depth - 1, source);
        }
    }

    /// Reference `id` from every leaf its bounds overlap
    ///
    /// Returns true if at least one leaf now references the model.
    pub fn insert(&mut self, id: ModelId, bounds: &Obb) -> bool {
        if !aabb_obb(&self.bounds, bounds) {
            return false;
        }

        match self.children.as_deref_mut() {
            None => {
                if !self.models.contains(&id) {
                    self.models.push(id);
                }
                true
            }
            Some(children) => children
                .iter_mut()
                .fold(false, |inserted, child| child.insert(id, bounds) | inserted),
        }
    }

    /// Drop every reference to `id` in this subtree
    ///
    /// Visits all children regardless of bounds, since the model may have
    /// moved since it was inserted. Returns true if anything was removed.
    pub fn remove(&mut self, id: ModelId) -> bool {
        match self.children.as_deref_mut() {
            None => {
                let before = self.models.len();
                self.models.retain(|model| *model != id);
                self.models.len() != before
            }
            Some(children) => children
                .iter_mut()
                .fold(false, |removed, child| child.remove(id) | removed),
        }
    }

    /// Nearest model hit by `ray` in this subtree, with its distance
    ///
    /// Ties keep the first model encountered.
    pub fn raycast<S>(&self, ray: &Ray, source: &S) -> Option<(ModelId, f32)>
    where
        S: ModelSource + ?Sized,
    {
        self.bounds.raycast(ray)?;

        match self.children.as_deref() {
            None => self
                .models
                .iter()
                .filter_map(|&id| source.raycast(id, ray).map(|t| (id, t)))
                .fold(None, nearer),
            Some(children) => children
                .iter()
                .filter_map(|child| child.raycast(ray, source))
                .fold(None, nearer),
        }
    }

    /// Models whose bounds touch `sphere`, duplicates included
    pub fn query_sphere<S>(&self, sphere: &Sphere, source: &S, results: &mut Vec<ModelId>)
    where
        S: ModelSource + ?Sized,
    {
        if !sphere_aabb(sphere, &self.bounds) {
            return;
        }

        match self.children.as_deref() {
            None => results.extend(self.models.iter().copied().filter(|&id| {
                source.bounds(id).is_some_and(|bounds| sphere_obb(sphere, &bounds))
            })),
            Some(children) => {
                for child in children.iter() {
                    child.query_sphere(sphere, source, results);
                }
            }
        }
    }

    /// Models whose bounds touch `aabb`, duplicates included
    pub fn query_aabb<S>(&self, aabb: &Aabb, source: &S, results: &mut Vec<ModelId>)
    where
        S: ModelSource + ?Sized,
    {
        if !aabb_aabb(aabb, &self.bounds) {
            return;
        }

        match self.children.as_deref() {
            None => results.extend(self.models.iter().copied().filter(|&id| {
                source.bounds(id).is_some_and(|bounds| aabb_obb(aabb, &bounds))
            })),
            Some(children) => {
                for child in children.iter() {
                    child.query_aabb(aabb, source, results);
                }
            }
        }
    }

    /// Get all leaf nodes
    pub fn get_all_leaves<'a>(&'a self, leaves: &mut Vec<&'a OctreeNode>) {
        match self.children.as_deref() {
            None => leaves.push(self),
            Some(children) => {
                for child in children.iter() {
                    child.get_all_leaves(leaves);
                }
            }
        }
    }

    /// Count this node and every descendant
    pub fn count_nodes(&self) -> usize {
        1 + self
            .children
            .as_deref()
            .map_or(0, |children| children.iter().map(OctreeNode::count_nodes).sum())
    }
}

/// Keep the closer of two hits, preferring the one found first on a tie
pub(crate) fn nearer(best: Option<(ModelId, f32)>, hit: (ModelId, f32)) -> Option<(ModelId, f32)> {
    match best {
        Some(current) if current.1 <= hit.1 => Some(current),
        _ => Some(hit),
    }
}

/// Octree spatial partitioning structure
#[derive(Debug, Clone)]
pub struct Octree {
    /// Root node covering the configured region
    pub root: OctreeNode,

    /// Configuration
    config: OctreeConfig,
}

impl Octree {
    /// Create an empty, unsplit octree over the configured region
    pub fn new(config: OctreeConfig) -> Self {
        if !config.has_recommended_depth() {
            warn!(
                "Octree depth {} exceeds the recommended {}; node count grows as 8^depth",
                config.max_depth,
                OctreeConfig::RECOMMENDED_MAX_DEPTH
            );
        }
        Self {
            root: OctreeNode::new(config.root_bounds(), 0),
            config,
        }
    }

    /// Seed the root with `models` and split to the configured depth
    pub fn build<S, I>(config: OctreeConfig, models: I, source: &S) -> Self
    where
        S: ModelSource + ?Sized,
        I: IntoIterator<Item = ModelId>,
    {
        let mut octree = Self::new(config);
        for id in models {
            octree.insert(id, source);
        }

        let depth = octree.config.max_depth;
        octree.root.split(depth, source);

        debug!(
            "Built octree: depth {}, {} nodes, {} leaf references",
            depth,
            octree.node_count(),
            octree.reference_count()
        );
        octree
    }

    /// Configuration the tree was created with
    pub fn config(&self) -> &OctreeConfig {
        &self.config
    }

    /// Region covered by the root
    pub fn bounds(&self) -> &Aabb {
        &self.root.bounds
    }

    /// Subdivide every leaf `depth` more levels
    pub fn split<S>(&mut self, depth: u32, source: &S)
    where
        S: ModelSource + ?Sized,
    {
        let mut leaves = Vec::new();
        collect_leaves_mut(&mut self.root, &mut leaves);
        for leaf in leaves {
            leaf.split(depth, source);
        }
    }

    /// Insert a model using its current bounds
    ///
    /// Returns false when the model is unknown to `source` or lies entirely
    /// outside the root region.
    pub fn insert<S>(&mut self, id: ModelId, source: &S) -> bool
    where
        S: ModelSource + ?Sized,
    {
        let Some(bounds) = source.bounds(id) else {
            warn!("Cannot insert unknown model {:?} into octree", id);
            return false;
        };

        let inserted = self.root.insert(id, &bounds);
        if !inserted {
            debug!("Model {:?} lies outside the octree region", id);
        }
        inserted
    }

    /// Remove every reference to a model; a no-op if it is not present
    pub fn remove(&mut self, id: ModelId) -> bool {
        let removed = self.root.remove(id);
        trace!("Removed {:?} from octree: {}", id, removed);
        removed
    }

    /// Re-insert a model after its bounds changed
    pub fn update<S>(&mut self, id: ModelId, source: &S) -> bool
    where
        S: ModelSource + ?Sized,
    {
        self.remove(id);
        self.insert(id, source)
    }

    /// Nearest model along `ray`, with the hit distance
    pub fn raycast<S>(&self, ray: &Ray, source: &S) -> Option<(ModelId, f32)>
    where
        S: ModelSource + ?Sized,
    {
        self.root.raycast(ray, source)
    }

    /// Models touching `sphere`; a model may appear more than once
    pub fn query_sphere<S>(&self, sphere: &Sphere, source: &S) -> Vec<ModelId>
    where
        S: ModelSource + ?Sized,
    {
        let mut results = Vec::new();
        self.root.query_sphere(sphere, source, &mut results);
        results
    }

    /// Models touching `aabb`; a model may appear more than once
    pub fn query_aabb<S>(&self, aabb: &Aabb, source: &S) -> Vec<ModelId>
    where
        S: ModelSource + ?Sized,
    {
        let mut results = Vec::new();
        self.root.query_aabb(aabb, source, &mut results);
        results
    }

    /// Models inside a culling volume, found breadth first
    ///
    /// The root is always expanded. Internal nodes queue only the children
    /// the volume touches; leaves report models whose own bounds touch it.
    pub fn cull<V, S>(&self, volume: &V, source: &S) -> Vec<ModelId>
    where
        V: CullVolume + ?Sized,
        S: ModelSource + ?Sized,
    {
        let mut results = Vec::new();
        let mut queue = VecDeque::from([&self.root]);

        while let Some(node) = queue.pop_front() {
            match node.children.as_deref() {
                Some(children) => {
                    queue.extend(children.iter().filter(|child| volume.intersects_aabb(&child.bounds)));
                }
                None => {
                    results.extend(node.models.iter().copied().filter(|&id| {
                        source.bounds(id).is_some_and(|bounds| volume.intersects_obb(&bounds))
                    }));
                }
            }
        }

        trace!("Frustum cull kept {} references", results.len());
        results
    }

    /// Get all leaf nodes
    pub fn leaves(&self) -> Vec<&OctreeNode> {
        let mut leaves = Vec::new();
        self.root.get_all_leaves(&mut leaves);
        leaves
    }

    /// Total number of nodes, root included
    pub fn node_count(&self) -> usize {
        self.root.count_nodes()
    }

    /// Number of leaf nodes
    pub fn leaf_count(&self) -> usize {
        self.leaves().len()
    }

    /// Number of model references held by leaves, duplicates included
    pub fn reference_count(&self) -> usize {
        self.leaves().iter().map(|leaf| leaf.models.len()).sum()
    }
}

fn collect_leaves_mut<'a>(node: &'a mut OctreeNode, leaves: &mut Vec<&'a mut OctreeNode>) {
    if node.children.is_none() {
        leaves.push(node);
        return;
    }
    if let Some(children) = node.children.as_deref_mut() {
        for child in children.iter_mut() {
            collect_leaves_mut(child, leaves);
        }
    }
}
