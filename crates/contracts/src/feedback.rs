//! Feedback collaborators: renderer, tone service, error channel, diagnostics.
//!
//! The core calls these from the pose/depth callback threads; implementations
//! must be cheap and must not call back into the core.

use crate::{PointCloudFrame, PoseStatus, RigidTransform, SessionEvent, ToneRequest};

/// Renderer consuming the published pose and point cloud
pub trait Renderer: Send + Sync {
    /// Whether the renderer finished initialising
    fn is_ready(&self) -> bool;

    /// Latest device pose
    fn publish_pose(&self, transform: &RigidTransform);

    /// Latest point cloud and the pose it was captured at
    fn publish_point_cloud(&self, frame: &PointCloudFrame, transform: &RigidTransform);
}

/// Tone playback service
pub trait ToneService: Send + Sync {
    /// Start playing a tone
    ///
    /// Returns once playback has been initiated, not once it finished.
    /// Overlapping calls may overlap audibly.
    fn play(&self, request: ToneRequest);
}

/// User-facing error notices
pub trait ErrorChannel: Send + Sync {
    /// Show a short human-readable message
    fn notify(&self, message: &str);
}

/// UX diagnostics side channel
///
/// All methods default to no-ops.
pub trait Diagnostics: Send + Sync {
    fn pose_status(&self, _status: PoseStatus) {}

    fn point_count(&self, _count: usize) {}

    fn session_event(&self, _event: &SessionEvent) {}
}

/// Diagnostics sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDiagnostics;

impl Diagnostics for NoDiagnostics {}
