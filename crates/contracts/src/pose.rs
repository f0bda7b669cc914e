//! PoseSample - pose stream payload
//!
//! 6-DOF device pose as delivered by the sensor session.

use nalgebra::{Isometry3, Matrix4, Quaternion, Translation3, UnitQuaternion};
use serde::{Deserialize, Serialize};

use crate::FramePair;

/// Tracking status reported with every pose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoseStatus {
    Initializing,
    Valid,
    Invalid,
    Unknown,
}

impl PoseStatus {
    /// Map a raw device status code; unrecognised codes become `Unknown`
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Initializing,
            1 => Self::Valid,
            2 => Self::Invalid,
            _ => Self::Unknown,
        }
    }

    /// Label used in logs and metric tags
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Valid => "valid",
            Self::Invalid => "invalid",
            Self::Unknown => "unknown",
        }
    }
}

/// Rigid transform: translation (meters) + unit quaternion (x, y, z, w)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidTransform {
    pub translation: [f64; 3],
    pub rotation: [f64; 4],
}

impl RigidTransform {
    pub fn identity() -> Self {
        Self {
            translation: [0.0; 3],
            rotation: [0.0, 0.0, 0.0, 1.0],
        }
    }

    pub fn from_isometry(iso: &Isometry3<f64>) -> Self {
        let t = iso.translation.vector;
        let q = iso.rotation.quaternion();
        Self {
            translation: [t.x, t.y, t.z],
            rotation: [q.i, q.j, q.k, q.w],
        }
    }

    /// Convert to an isometry; a degenerate (zero-norm) rotation maps to identity
    pub fn to_isometry(&self) -> Isometry3<f64> {
        let [x, y, z] = self.translation;
        let [qx, qy, qz, qw] = self.rotation;
        let q = Quaternion::new(qw, qx, qy, qz);
        let rotation = if q.norm() > f64::EPSILON {
            UnitQuaternion::from_quaternion(q)
        } else {
            UnitQuaternion::identity()
        };
        Isometry3::from_parts(Translation3::new(x, y, z), rotation)
    }

    /// Column-major 4x4 model matrix for the renderer
    pub fn model_matrix(&self) -> Matrix4<f32> {
        self.to_isometry().to_homogeneous().cast::<f32>()
    }
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Pose sample
///
/// Immutable once constructed; each new sample supersedes the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseSample {
    /// Device timestamp (seconds)
    pub timestamp: f64,

    /// Base/target frames the transform relates
    pub frame_pair: FramePair,

    /// Pose of target frame in base frame
    pub transform: RigidTransform,

    /// Tracking status
    pub status: PoseStatus,
}

impl PoseSample {
    pub fn new(
        timestamp: f64,
        frame_pair: FramePair,
        transform: RigidTransform,
        status: PoseStatus,
    ) -> Self {
        Self {
            timestamp,
            frame_pair,
            transform,
            status,
        }
    }

    pub fn translation(&self) -> [f64; 3] {
        self.transform.translation
    }

    pub fn rotation(&self) -> [f64; 4] {
        self.transform.rotation
    }

    pub fn is_valid(&self) -> bool {
        self.status == PoseStatus::Valid
    }
}
