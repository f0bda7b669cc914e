//! Headless collaborators: the renderer, error channel and diagnostics log
//! instead of drawing.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use contracts::{
    Diagnostics, ErrorChannel, PointCloudFrame, PoseStatus, Renderer, RigidTransform, SessionEvent,
};
use tracing::{debug, info, trace, warn};

/// Renderer that counts and traces what it is handed
///
/// Starts not ready, like a GL surface that has not been created yet.
#[derive(Debug, Default)]
pub struct LogRenderer {
    ready: AtomicBool,
    poses: AtomicU64,
    point_clouds: AtomicU64,
}

impl LogRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_ready(&self) {
        if !self.ready.swap(true, Ordering::SeqCst) {
            debug!("renderer ready");
        }
    }

    pub fn poses(&self) -> u64 {
        self.poses.load(Ordering::Relaxed)
    }

    pub fn point_clouds(&self) -> u64 {
        self.point_clouds.load(Ordering::Relaxed)
    }
}

impl Renderer for LogRenderer {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn publish_pose(&self, transform: &RigidTransform) {
        self.poses.fetch_add(1, Ordering::Relaxed);
        trace!(translation = ?transform.translation, "pose published");
    }

    fn publish_point_cloud(&self, frame: &PointCloudFrame, transform: &RigidTransform) {
        self.point_clouds.fetch_add(1, Ordering::Relaxed);
        trace!(
            timestamp = frame.timestamp,
            points = frame.point_count(),
            translation = ?transform.translation,
            "point cloud published"
        );
    }
}

/// Error channel that logs notices
#[derive(Debug, Default)]
pub struct LogErrorChannel {
    notices: AtomicU64,
}

impl LogErrorChannel {
    pub fn notices(&self) -> u64 {
        self.notices.load(Ordering::Relaxed)
    }
}

impl ErrorChannel for LogErrorChannel {
    fn notify(&self, message: &str) {
        self.notices.fetch_add(1, Ordering::Relaxed);
        warn!(notice = message, "user notice");
    }
}

/// Diagnostics that keep the latest values for the status line
#[derive(Debug, Default)]
pub struct LogDiagnostics {
    last_point_count: AtomicUsize,
    events: AtomicU64,
}

impl LogDiagnostics {
    pub fn last_point_count(&self) -> usize {
        self.last_point_count.load(Ordering::Relaxed)
    }

    pub fn events(&self) -> u64 {
        self.events.load(Ordering::Relaxed)
    }
}

impl Diagnostics for LogDiagnostics {
    fn pose_status(&self, status: PoseStatus) {
        trace!(status = status.as_str(), "pose status");
    }

    fn point_count(&self, count: usize) {
        self.last_point_count.store(count, Ordering::Relaxed);
    }

    fn session_event(&self, event: &SessionEvent) {
        self.events.fetch_add(1, Ordering::Relaxed);
        info!(key = %event.key, value = %event.value, "diagnostics event");
    }
}
