//! SensorSession traits - sensor session abstraction
//!
//! Defines the observer interface the session delivers pose, depth and event
//! callbacks through, and the pose-lookup-by-time service it exposes.
//! Real devices and the mock session implement the same API.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{ContractError, PointCloudFrame, PoseSample};

/// Named reference frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateFrame {
    /// World origin fixed when the service started
    StartOfService,
    Device,
    Imu,
    CameraColor,
    CameraDepth,
}

impl CoordinateFrame {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StartOfService => "start_of_service",
            Self::Device => "device",
            Self::Imu => "imu",
            Self::CameraColor => "camera_color",
            Self::CameraDepth => "camera_depth",
        }
    }
}

/// (base, target) pair a pose transform is requested for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FramePair {
    pub base: CoordinateFrame,
    pub target: CoordinateFrame,
}

impl FramePair {
    pub const fn new(base: CoordinateFrame, target: CoordinateFrame) -> Self {
        Self { base, target }
    }

    /// Device pose relative to the start-of-service origin
    pub const fn device_in_world() -> Self {
        Self::new(CoordinateFrame::StartOfService, CoordinateFrame::Device)
    }
}

impl Default for FramePair {
    fn default() -> Self {
        Self::device_in_world()
    }
}

impl fmt::Display for FramePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.base.as_str(), self.target.as_str())
    }
}

/// Free-form session event (key/value as reported by the device service)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEvent {
    pub timestamp: f64,
    pub key: String,
    pub value: String,
}

impl SessionEvent {
    pub fn new(timestamp: f64, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            timestamp,
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Session callback observer
///
/// Each stream calls its handler from its own thread. Calls within a stream are
/// strictly ordered; calls across streams may race.
pub trait SessionListener: Send + Sync {
    /// New pose sample
    fn on_pose(&self, sample: PoseSample);

    /// New point cloud frame
    fn on_point_cloud(&self, frame: PointCloudFrame);

    /// Session event (status changes, warnings)
    fn on_event(&self, _event: SessionEvent) {}
}

/// Pose lookup by time
pub trait PoseLookup: Send + Sync {
    /// Resolve the pose of `pair.target` in `pair.base` at `timestamp`
    ///
    /// # Errors
    /// Service-level failure; callers discard the dependent work and move on.
    fn pose_at_time(&self, timestamp: f64, pair: FramePair) -> Result<PoseSample, ContractError>;
}

/// Sensor session
///
/// # Example
///
/// ```ignore
/// let session: Arc<dyn SensorSession> = Arc::new(MockSession::new(config));
/// session.connect(coordinator.listener())?;
/// // ... callbacks flow ...
/// session.disconnect();
/// ```
pub trait SensorSession: PoseLookup {
    /// Register the listener and start emitting callbacks
    ///
    /// Connecting an already-connected session is a no-op.
    fn connect(&self, listener: Arc<dyn SessionListener>) -> Result<(), ContractError>;

    /// Stop emitting callbacks
    ///
    /// Returns once in-flight callbacks have finished.
    fn disconnect(&self);

    /// Check if callbacks are currently being emitted
    fn is_connected(&self) -> bool;
}
