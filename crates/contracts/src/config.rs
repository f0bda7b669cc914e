//! FollowMeConfig - Config Loader output
//!
//! Runtime configuration: simulated session, synthetic scene, tone output and
//! metrics. Alert bands and the forward gate are fixed constants of the core.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct FollowMeConfig {
    #[serde(default)]
    pub version: ConfigVersion,

    /// Sensor session settings
    #[serde(default)]
    #[validate(nested)]
    pub session: SessionConfig,

    /// Synthetic scene (mock session only)
    #[serde(default)]
    #[validate(nested)]
    pub scene: SceneConfig,

    /// Tone synthesis and output
    #[serde(default)]
    #[validate(nested)]
    pub tone: ToneConfig,

    /// Metrics exporter
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Sensor session configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SessionConfig {
    /// Pose callback rate (Hz)
    #[serde(default = "default_pose_rate")]
    #[validate(range(min = 1.0, max = 1000.0))]
    pub pose_rate_hz: f64,

    /// Depth callback rate (Hz)
    #[serde(default = "default_depth_rate")]
    #[validate(range(min = 0.5, max = 60.0))]
    pub depth_rate_hz: f64,

    /// Pose samples retained for lookup-by-time
    #[serde(default = "default_pose_history")]
    #[validate(range(min = 2, max = 100_000))]
    pub pose_history: usize,

    /// Seconds the tracker reports `initializing` after connect
    #[serde(default = "default_warmup")]
    #[validate(range(min = 0.0))]
    pub tracking_warmup_s: f64,

    /// Fail every Nth pose lookup (fault injection)
    #[serde(default)]
    #[validate(range(min = 1))]
    pub fail_lookup_every: Option<u32>,
}

fn default_pose_rate() -> f64 {
    100.0
}

fn default_depth_rate() -> f64 {
    5.0
}

fn default_pose_history() -> usize {
    256
}

fn default_warmup() -> f64 {
    0.5
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            pose_rate_hz: default_pose_rate(),
            depth_rate_hz: default_depth_rate(),
            pose_history: default_pose_history(),
            tracking_warmup_s: default_warmup(),
            fail_lookup_every: None,
        }
    }
}

/// Synthetic scene: a wall ahead of a device walking toward it
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SceneConfig {
    /// Wall distance at t=0 (meters)
    #[serde(default = "default_start_distance")]
    #[validate(range(min = 0.1, max = 100.0))]
    pub start_distance_m: f64,

    /// Closest approach before the walker stops (meters)
    #[serde(default = "default_min_distance")]
    #[validate(range(min = 0.0))]
    pub min_distance_m: f64,

    /// Walking speed (m/s)
    #[serde(default = "default_speed")]
    #[validate(range(min = 0.0, max = 10.0))]
    pub approach_speed_mps: f64,

    /// Half width/height of the wall (meters)
    #[serde(default = "default_wall_extent")]
    #[validate(range(min = 0.05, max = 10.0))]
    pub wall_half_extent_m: f64,

    /// Spacing of wall sample points (meters)
    #[serde(default = "default_grid_step")]
    #[validate(range(min = 0.005))]
    pub grid_step_m: f64,

    /// Uniform depth noise amplitude (meters)
    #[serde(default = "default_noise")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub noise_m: f64,

    /// RNG seed; random when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_start_distance() -> f64 {
    3.5
}

fn default_min_distance() -> f64 {
    0.5
}

fn default_speed() -> f64 {
    0.4
}

fn default_wall_extent() -> f64 {
    1.0
}

fn default_grid_step() -> f64 {
    0.05
}

fn default_noise() -> f64 {
    0.01
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            start_distance_m: default_start_distance(),
            min_distance_m: default_min_distance(),
            approach_speed_mps: default_speed(),
            wall_half_extent_m: default_wall_extent(),
            grid_step_m: default_grid_step(),
            noise_m: default_noise(),
            seed: None,
        }
    }
}

/// Tone output kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToneOutputKind {
    /// Log each tone via tracing
    #[default]
    Log,
    /// Append raw 16-bit PCM to a file
    File,
}

/// Tone synthesis configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ToneConfig {
    /// PCM sample rate (Hz)
    #[serde(default = "default_sample_rate")]
    #[validate(range(min = 1000, max = 192000))]
    pub sample_rate_hz: u32,

    /// Peak amplitude (0-1)
    #[serde(default = "default_amplitude")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub amplitude: f32,

    /// Output kind
    #[serde(default)]
    pub output: ToneOutputKind,

    /// File path (file output only)
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_sample_rate() -> u32 {
    8000
}

fn default_amplitude() -> f32 {
    0.8
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: default_sample_rate(),
            amplitude: default_amplitude(),
            output: ToneOutputKind::default(),
            path: None,
        }
    }
}

/// Metrics exporter configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Prometheus port (None = disabled)
    #[serde(default)]
    pub port: Option<u16>,
}
