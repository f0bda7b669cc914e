//! Synthetic scene: a device walking straight toward a flat wall
//!
//! World frame: start-of-service origin, z forward. The wall is a square grid
//! of points at `z = start_distance_m`. The device starts at the origin, walks
//! along +z at a constant speed and stops `min_distance_m` short of the wall,
//! swaying slightly from side to side on the way.

use contracts::{Point3, PointCloudFrame, PoseStatus, RigidTransform, SceneConfig};
use nalgebra::{Isometry3, Point3 as NPoint3, Translation3, UnitQuaternion, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Lateral sway amplitude (meters)
const SWAY_AMPLITUDE_M: f64 = 0.03;
/// Heading wobble amplitude (radians)
const YAW_AMPLITUDE_RAD: f64 = 0.02;
/// Sway frequency (rad/s)
const SWAY_RATE: f64 = 2.0;

#[derive(Debug, Clone)]
pub struct Scene {
    config: SceneConfig,
    wall: Vec<NPoint3<f64>>,
}

impl Scene {
    pub fn new(config: SceneConfig) -> Self {
        let wall = wall_grid(&config);
        Self { config, wall }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Number of sample points on the wall
    pub fn wall_len(&self) -> usize {
        self.wall.len()
    }

    /// Distance from the device to the wall at `t` seconds
    pub fn distance_at(&self, t: f64) -> f64 {
        let walked = self.config.approach_speed_mps * t.max(0.0);
        (self.config.start_distance_m - walked).max(self.config.min_distance_m)
    }

    /// Device pose in the world frame at `t` seconds
    pub fn device_pose(&self, t: f64) -> Isometry3<f64> {
        let z = self.config.start_distance_m - self.distance_at(t);
        let phase = SWAY_RATE * t;
        Isometry3::from_parts(
            Translation3::new(SWAY_AMPLITUDE_M * phase.sin(), 0.0, z),
            UnitQuaternion::from_axis_angle(&Vector3::y_axis(), YAW_AMPLITUDE_RAD * phase.cos()),
        )
    }

    pub fn device_transform(&self, t: f64) -> RigidTransform {
        RigidTransform::from_isometry(&self.device_pose(t))
    }

    /// Depth frame captured at `t`, points in the device frame
    ///
    /// Points behind the camera are dropped; noise perturbs depth only.
    pub fn capture(&self, t: f64, rng: &mut StdRng) -> PointCloudFrame {
        let world_to_device = self.device_pose(t).inverse();
        let noise = self.config.noise_m;

        let points: Vec<Point3> = self
            .wall
            .iter()
            .map(|p| world_to_device * p)
            .filter(|p| p.z > 0.0)
            .map(|p| {
                let dz = if noise > 0.0 && noise.is_finite() {
                    rng.random_range(-noise..=noise)
                } else {
                    0.0
                };
                Point3::new(p.x as f32, p.y as f32, (p.z + dz) as f32)
            })
            .collect();

        PointCloudFrame::from_points(t, &points)
    }

    /// Seeded RNG, or OS-seeded when no seed is configured
    pub fn rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

/// Tracking status reported at `t` seconds after connect
pub fn tracking_status(t: f64, warmup_s: f64) -> PoseStatus {
    if t < warmup_s {
        PoseStatus::Initializing
    } else {
        PoseStatus::Valid
    }
}

fn wall_grid(config: &SceneConfig) -> Vec<NPoint3<f64>> {
    let extent = config.wall_half_extent_m;
    let step = config.grid_step_m.max(f64::EPSILON);
    let per_axis = (2.0 * extent / step).floor() as usize + 1;

    let mut points = Vec::with_capacity(per_axis * per_axis);
    for iy in 0..per_axis {
        let y = -extent + iy as f64 * step;
        for ix in 0..per_axis {
            let x = -extent + ix as f64 * step;
            points.push(NPoint3::new(x, y, config.start_distance_m));
        }
    }
    points
}
