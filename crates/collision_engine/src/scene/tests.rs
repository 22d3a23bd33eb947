//! Scene integration tests
//!
//! Exercise the scene end to end against a populated registry, comparing the
//! accelerated path with the linear scan.

use std::collections::HashSet;

use crate::foundation::math::{Mat4, Point, Transform, Vec3};
use crate::geometry::{Aabb, Frustum, Ray, Sphere};
use super::{Model, ModelId, ModelRegistry, Scene};

/// 100 small cubes in a 10x10x10 region, each in its own (x, y) column
fn scattered_scene() -> (ModelRegistry, Vec<ModelId>) {
    let mut registry = ModelRegistry::new();
    let ids = (0..100)
        .map(|i: u16| {
            let position = Point::new(
                f32::from(i % 10) - 4.5,
                f32::from(i / 10) - 4.5,
                f32::from((i * 7) % 10) - 4.5,
            );
            registry.insert(
                Model::new(Aabb::cube(Point::zeros(), 0.2))
                    .with_transform(Transform::from_position(position)),
            )
        })
        .collect();
    (registry, ids)
}

fn scene_with(ids: &[ModelId], registry: &ModelRegistry) -> Scene {
    let mut scene = Scene::new();
    for &id in ids {
        scene.add_model(id, registry);
    }
    scene
}

fn as_set(ids: &[ModelId]) -> HashSet<ModelId> {
    ids.iter().copied().collect()
}

#[test]
fn test_accelerated_raycast_matches_flat_scan() {
    let (registry, ids) = scattered_scene();
    let flat = scene_with(&ids, &registry);
    let mut accelerated = scene_with(&ids, &registry);
    assert!(accelerated.accelerate(Point::zeros(), 5.0, 4, &registry));

    for &target in &[0_usize, 37, 58, 99] {
        let position = registry.world_transform(ids[target]).unwrap().position;
        let ray = Ray::new(Point::new(position.x, position.y, -10.0), Vec3::z());

        assert_eq!(accelerated.raycast(&ray, &registry), Some(ids[target]));
        assert_eq!(flat.raycast(&ray, &registry), Some(ids[target]));
    }
}

#[test]
fn test_raycast_between_columns_misses() {
    let (registry, ids) = scattered_scene();
    let mut scene = scene_with(&ids, &registry);
    scene.accelerate(Point::zeros(), 5.0, 4, &registry);

    let ray = Ray::new(Point::new(0.0, 0.0, -10.0), Vec3::z());
    assert_eq!(scene.raycast(&ray, &registry), None);
}

#[test]
fn test_accelerated_queries_match_flat_scan() {
    let (registry, ids) = scattered_scene();
    let flat = scene_with(&ids, &registry);
    let mut accelerated = scene_with(&ids, &registry);
    accelerated.accelerate(Point::zeros(), 5.0, 4, &registry);

    let region = Aabb::new(Point::new(1.0, -1.0, 0.5), Vec3::new(2.0, 3.0, 1.5));
    let sphere = Sphere::new(Point::new(-2.0, 1.5, 0.0), 2.2);

    let flat_region = flat.query_aabb(&region, &registry);
    let tree_region = accelerated.query_aabb(&region, &registry);
    assert!(!flat_region.is_empty());
    assert_eq!(as_set(&flat_region), as_set(&tree_region));
    assert_eq!(tree_region.len(), as_set(&tree_region).len());

    let flat_sphere = flat.query_sphere(&sphere, &registry);
    let tree_sphere = accelerated.query_sphere(&sphere, &registry);
    assert!(!flat_sphere.is_empty());
    assert_eq!(as_set(&flat_sphere), as_set(&tree_sphere));
    assert_eq!(tree_sphere.len(), as_set(&tree_sphere).len());
}

#[test]
fn test_accelerated_cull_matches_flat_scan() {
    let (registry, ids) = scattered_scene();
    let flat = scene_with(&ids, &registry);
    let mut accelerated = scene_with(&ids, &registry);
    accelerated.accelerate(Point::zeros(), 5.0, 3, &registry);

    // camera at z = 8 looking down -Z with a narrow field of view
    let view = Mat4::new_translation(&Vec3::new(0.0, 0.0, -8.0));
    let projection = Mat4::new_perspective(1.0, 0.4, 0.1, 50.0);
    let frustum = Frustum::from_view_projection(&(projection * view));

    let visible = flat.cull(&frustum, &registry);
    assert!(!visible.is_empty());
    assert!(visible.len() < ids.len());

    // node rejection is plane-by-plane, so the tree may drop a model that
    // only grazes a frustum corner, but never one whose center is in view
    let by_tree = as_set(&accelerated.cull(&frustum, &registry));
    assert!(by_tree.is_subset(&as_set(&visible)));
    for &id in &ids {
        let center = registry.world_obb(id).unwrap().center;
        if frustum.contains_point(&center) {
            assert!(by_tree.contains(&id));
        }
    }
}

#[test]
fn test_straddling_model_reported_once() {
    let mut registry = ModelRegistry::new();
    let id = registry.insert(Model::new(Aabb::cube(Point::zeros(), 1.0)));
    let mut scene = scene_with(&[id], &registry);
    scene.accelerate(Point::zeros(), 4.0, 2, &registry);

    assert_eq!(scene.octree().unwrap().reference_count(), 8);
    assert_eq!(scene.query_aabb(&Aabb::cube(Point::zeros(), 2.0), &registry), vec![id]);
    assert_eq!(scene.query_sphere(&Sphere::new(Point::zeros(), 2.0), &registry), vec![id]);
}

#[test]
fn test_membership_is_idempotent() {
    let (registry, ids) = scattered_scene();
    let mut scene = Scene::new();

    assert!(scene.add_model(ids[3], &registry));
    assert!(!scene.add_model(ids[3], &registry));
    assert_eq!(scene.len(), 1);

    assert!(scene.remove_model(ids[3]));
    assert!(!scene.remove_model(ids[3]));
    assert!(scene.is_empty());
}

#[test]
fn test_accelerate_only_once() {
    let (registry, ids) = scattered_scene();
    let mut scene = scene_with(&ids, &registry);

    assert!(!scene.has_octree());
    assert!(scene.accelerate(Point::zeros(), 5.0, 2, &registry));
    let nodes = scene.octree().unwrap().node_count();

    assert!(!scene.accelerate(Point::zeros(), 5.0, 4, &registry));
    assert_eq!(scene.octree().unwrap().node_count(), nodes);
}

#[test]
fn test_membership_changes_reach_octree() {
    let (mut registry, ids) = scattered_scene();
    let mut scene = scene_with(&ids, &registry);
    scene.accelerate(Point::zeros(), 5.0, 3, &registry);

    let late = registry.insert(
        Model::new(Aabb::cube(Point::zeros(), 0.1))
            .with_transform(Transform::from_position(Point::new(0.0, 0.0, 4.8))),
    );
    let probe = Aabb::cube(Point::new(0.0, 0.0, 4.8), 0.15);
    assert!(scene.query_aabb(&probe, &registry).is_empty());

    scene.add_model(late, &registry);
    assert_eq!(scene.query_aabb(&probe, &registry), vec![late]);

    scene.remove_model(late);
    assert!(scene.query_aabb(&probe, &registry).is_empty());
}

#[test]
fn test_update_model_follows_transform() {
    let (mut registry, ids) = scattered_scene();
    let mut scene = scene_with(&ids, &registry);
    scene.accelerate(Point::zeros(), 5.0, 3, &registry);

    let moved = ids[0];
    let destination = Point::new(0.0, 0.0, 0.0);
    registry.get_mut(moved).unwrap().transform.position = destination;
    assert!(scene.update_model(moved, &registry));

    let ray = Ray::new(Point::new(0.0, 0.0, -10.0), Vec3::z());
    assert_eq!(scene.raycast(&ray, &registry), Some(moved));

    let stranger = registry.insert(Model::default());
    assert!(!scene.update_model(stranger, &registry));
}

#[test]
fn test_find_children_walks_every_ancestor() {
    let mut registry = ModelRegistry::new();
    let unit = Aabb::cube(Point::zeros(), 0.5);
    let root = registry.insert(Model::new(unit));
    let child = registry.insert(Model::new(unit).with_parent(root));
    let grandchild = registry.insert(Model::new(unit).with_parent(child));
    let unrelated = registry.insert(Model::new(unit));

    let scene = scene_with(&[root, child, grandchild, unrelated], &registry);

    assert_eq!(scene.find_children(root, &registry), vec![child, grandchild]);
    assert_eq!(scene.find_children(child, &registry), vec![grandchild]);
    assert!(scene.find_children(unrelated, &registry).is_empty());
}

#[test]
fn test_raycast_tie_keeps_first_member_on_both_paths() {
    let mut registry = ModelRegistry::new();
    let placed = || {
        Model::new(Aabb::cube(Point::zeros(), 0.5))
            .with_transform(Transform::from_position(Point::new(1.0, 1.0, 1.0)))
    };
    let first = registry.insert(placed());
    let twin = registry.insert(placed());

    let flat = scene_with(&[first, twin], &registry);
    let mut accelerated = scene_with(&[first, twin], &registry);
    accelerated.accelerate(Point::zeros(), 4.0, 2, &registry);

    let ray = Ray::new(Point::new(1.0, 1.0, -10.0), Vec3::z());
    assert_eq!(flat.raycast(&ray, &registry), Some(first));
    assert_eq!(accelerated.raycast(&ray, &registry), Some(first));
}
