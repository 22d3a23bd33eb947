//! Collision Scene Demo
//!
//! Scatters models through a cubic region, answers the same queries by linear
//! scan and through the octree, then moves some models and queries again.
//! Results of both paths are logged side by side.
//!
//! Usage: `scene_demo [settings.toml | settings.ron]`
//! (defaults to `scene_demo.toml`, or built-in defaults if that is missing)

use std::collections::HashSet;
use std::f32::consts::TAU;
use std::time::Instant;

use collision_engine::foundation::logging;
use collision_engine::prelude::*;
use nalgebra::Point3;
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG_PATH: &str = "scene_demo.toml";

/// Camera used for the culling query
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct CameraConfig {
    eye: Vec3,
    target: Vec3,
    fov_y: f32,
    near: f32,
    far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 20.0, 90.0),
            target: Vec3::zeros(),
            fov_y: 0.9,
            near: 0.1,
            far: 200.0,
        }
    }
}

/// Demo settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct SceneDemoConfig {
    /// Number of models to scatter
    model_count: usize,
    /// Models are placed in a cube of this half-size around the origin
    region_half_size: f32,
    min_half_size: f32,
    max_half_size: f32,
    /// Every n-th model gets a pyramid mesh instead of plain box bounds (0 = never)
    mesh_every: usize,
    /// Fixed seed for reproducible runs
    seed: Option<u64>,
    /// How many models to move before the final round of queries
    moved_models: usize,
    camera: CameraConfig,
    octree: OctreeConfig,
}

impl Default for SceneDemoConfig {
    fn default() -> Self {
        Self {
            model_count: 400,
            region_half_size: 45.0,
            min_half_size: 0.5,
            max_half_size: 2.5,
            mesh_every: 4,
            seed: None,
            moved_models: 25,
            camera: CameraConfig::default(),
            octree: OctreeConfig::default(),
        }
    }
}

impl Config for SceneDemoConfig {}

#[derive(thiserror::Error, Debug)]
enum DemoError {
    #[error("invalid demo configuration: {0}")]
    InvalidConfig(String),
}

impl SceneDemoConfig {
    fn validate(&self) -> Result<(), DemoError> {
        if self.region_half_size <= 0.0 {
            return Err(DemoError::InvalidConfig("region_half_size must be positive".into()));
        }
        if self.min_half_size <= 0.0 || self.min_half_size > self.max_half_size {
            return Err(DemoError::InvalidConfig(format!(
                "model half sizes must satisfy 0 < min ({}) <= max ({})",
                self.min_half_size, self.max_half_size
            )));
        }
        if !self.octree.has_recommended_depth() {
            return Err(DemoError::InvalidConfig(format!(
                "octree max_depth {} exceeds the supported {}",
                self.octree.max_depth,
                OctreeConfig::RECOMMENDED_MAX_DEPTH
            )));
        }
        if self.camera.near <= 0.0 || self.camera.far <= self.camera.near {
            return Err(DemoError::InvalidConfig("camera planes must satisfy 0 < near < far".into()));
        }
        Ok(())
    }
}

/// The shapes every query round uses
struct Probes {
    ray: Ray,
    sphere: Sphere,
    region: Aabb,
    frustum: Frustum,
}

impl Probes {
    fn new(config: &SceneDemoConfig, rng: &mut impl Rng) -> Self {
        let camera = &config.camera;
        let extent = config.region_half_size;

        let view = Mat4::look_at_rh(&Point3::from(camera.eye), &Point3::from(camera.target), &Vec3::y());
        let projection = Mat4::new_perspective(16.0 / 9.0, camera.fov_y, camera.near, camera.far);

        Self {
            ray: Ray::from_points(camera.eye, camera.target),
            sphere: Sphere::new(random_point(rng, extent * 0.5), extent * 0.25),
            region: Aabb::new(random_point(rng, extent * 0.5), Vec3::repeat(extent * 0.2)),
            frustum: Frustum::from_view_projection(&(projection * view)),
        }
    }
}

/// Answers to one round of queries
struct QueryResults {
    nearest: Option<ModelId>,
    in_sphere: Vec<ModelId>,
    in_region: Vec<ModelId>,
    visible: Vec<ModelId>,
}

fn random_point(rng: &mut impl Rng, extent: f32) -> Vec3 {
    Vec3::new(
        rng.gen_range(-extent..=extent),
        rng.gen_range(-extent..=extent),
        rng.gen_range(-extent..=extent),
    )
}

fn pyramid_mesh() -> Mesh {
    let vertices = [
        Vec3::new(-1.0, -1.0, -1.0),
        Vec3::new(1.0, -1.0, -1.0),
        Vec3::new(0.0, -1.0, 1.0),
        Vec3::new(0.0, 1.0, 0.0),
    ];
    let indices = [0, 1, 3, 1, 2, 3, 2, 0, 3, 0, 2, 1];
    Mesh::from_vertices(&vertices, &indices)
}

fn scatter(config: &SceneDemoConfig, rng: &mut impl Rng, registry: &mut ModelRegistry) -> Vec<ModelId> {
    let pyramid = pyramid_mesh();

    (0..config.model_count)
        .map(|i| {
            let half_size = rng.gen_range(config.min_half_size..=config.max_half_size);
            let rotation = Quat::from_euler_angles(
                rng.gen_range(0.0..TAU),
                rng.gen_range(0.0..TAU),
                rng.gen_range(0.0..TAU),
            );
            let position = random_point(rng, config.region_half_size);

            let (model, scale) = if config.mesh_every > 0 && i % config.mesh_every == 0 {
                (Model::from_mesh(pyramid.clone()), Vec3::repeat(half_size))
            } else {
                (Model::new(Aabb::cube(Vec3::zeros(), half_size)), Vec3::repeat(1.0))
            };

            registry.insert(model.with_transform(Transform { position, rotation, scale }))
        })
        .collect()
}

fn run_queries(label: &str, scene: &Scene, registry: &ModelRegistry, probes: &Probes) -> QueryResults {
    let started = Instant::now();
    let results = QueryResults {
        nearest: scene.raycast(&probes.ray, registry),
        in_sphere: scene.query_sphere(&probes.sphere, registry),
        in_region: scene.query_aabb(&probes.region, registry),
        visible: scene.cull(&probes.frustum, registry),
    };

    log::info!(
        "[{}] nearest {:?}, {} in sphere, {} in box, {} visible ({:?})",
        label,
        results.nearest,
        results.in_sphere.len(),
        results.in_region.len(),
        results.visible.len(),
        started.elapsed()
    );
    results
}

fn compare(flat: &QueryResults, accelerated: &QueryResults) {
    let as_set = |ids: &[ModelId]| ids.iter().copied().collect::<HashSet<_>>();

    if flat.nearest != accelerated.nearest {
        log::warn!("Raycast mismatch: scan {:?}, octree {:?}", flat.nearest, accelerated.nearest);
    }
    if as_set(&flat.in_sphere) != as_set(&accelerated.in_sphere) {
        log::warn!("Sphere query mismatch between scan and octree");
    }
    if as_set(&flat.in_region) != as_set(&accelerated.in_region) {
        log::warn!("Box query mismatch between scan and octree");
    }

    let culled_by_nodes = flat.visible.len().saturating_sub(accelerated.visible.len());
    if culled_by_nodes > 0 {
        log::info!("{} models grazing the frustum were rejected at node level", culled_by_nodes);
    }
}

fn run(config: &SceneDemoConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut registry = ModelRegistry::new();
    let ids = scatter(config, &mut rng, &mut registry);

    let mut scene = Scene::new();
    for &id in &ids {
        scene.add_model(id, &registry);
    }
    log::info!("Scattered {} models", scene.len());

    let probes = Probes::new(config, &mut rng);
    let flat = run_queries("scan", &scene, &registry, &probes);

    let started = Instant::now();
    if !scene.accelerate_with(config.octree.clone(), &registry) {
        return Err("scene was already accelerated".into());
    }
    if let Some(octree) = scene.octree() {
        log::info!(
            "Built octree in {:?}: {} nodes, {} leaves, {} references",
            started.elapsed(),
            octree.node_count(),
            octree.leaf_count(),
            octree.reference_count()
        );
    }

    let accelerated = run_queries("octree", &scene, &registry, &probes);
    compare(&flat, &accelerated);

    let moved: Vec<ModelId> = ids
        .choose_multiple(&mut rng, config.moved_models)
        .copied()
        .collect();
    for &id in &moved {
        if let Some(model) = registry.get_mut(id) {
            model.transform.position = random_point(&mut rng, config.region_half_size);
        }
        scene.update_model(id, &registry);
    }
    log::info!("Moved {} models", moved.len());

    run_queries("octree after moves", &scene, &registry, &probes);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init(logging::LevelFilter::Info);

    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = SceneDemoConfig::load_or_default(&path)?;
    config.validate()?;

    log::info!("Starting collision scene demo ({})", path);
    run(&config)
}
