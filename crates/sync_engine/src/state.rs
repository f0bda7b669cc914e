//! Shared stream state
//!
//! Two independent locks: one for the pose stream, one for the depth stream.
//! The synchronizers write under them; the render view reads consistent
//! snapshots under the same locks.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use contracts::{
    AlertBand, AlertDecision, DistanceEstimate, PointCloudFrame, PoseSample, PoseStatus,
    RigidTransform,
};
use observability::{RunningStats, StatsSummary};

/// Lock a mutex, recovering the guard if a holder panicked
///
/// Stream state is plain data; a panic mid-update leaves at worst one stale
/// field, which the next callback overwrites.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Per-stream timestamp bookkeeping
///
/// The previous timestamp starts at 0.0, so the first delta equals the first
/// timestamp in milliseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamClock {
    previous_timestamp: f64,
    ticks: u64,
}

impl StreamClock {
    /// Record a new timestamp and return the delta to the previous one (ms)
    pub fn advance(&mut self, timestamp: f64) -> f64 {
        let delta_ms = (timestamp - self.previous_timestamp) * 1000.0;
        self.previous_timestamp = timestamp;
        self.ticks += 1;
        delta_ms
    }

    pub fn previous_timestamp(&self) -> f64 {
        self.previous_timestamp
    }

    /// Whether the last delta was measured against a real sample
    pub fn has_interval(&self) -> bool {
        self.ticks > 1
    }
}

/// Consecutive samples sharing the same tracking status
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackingRun {
    previous_status: Option<PoseStatus>,
    consecutive: u64,
}

impl TrackingRun {
    /// Observe a status and return the run length including it
    pub fn observe(&mut self, status: PoseStatus) -> u64 {
        if self.previous_status != Some(status) {
            self.consecutive = 0;
        }
        self.consecutive += 1;
        self.previous_status = Some(status);
        self.consecutive
    }

    pub fn status(&self) -> Option<PoseStatus> {
        self.previous_status
    }

    pub fn consecutive(&self) -> u64 {
        self.consecutive
    }
}

/// Pose stream state (guarded by the pose lock)
#[derive(Debug, Default)]
pub struct PoseState {
    pub(crate) current: Option<PoseSample>,
    pub(crate) delta_ms: f64,
    pub(crate) clock: StreamClock,
    pub(crate) run: TrackingRun,
    pub(crate) samples: u64,
    pub(crate) published: u64,
    pub(crate) status_changes: u64,
    pub(crate) delta_stats: RunningStats,
}

impl PoseState {
    fn snapshot(&self) -> PoseSnapshot {
        PoseSnapshot {
            pose: self.current,
            delta_ms: self.delta_ms,
            status: self.run.status(),
            consecutive: self.run.consecutive(),
            samples: self.samples,
            published: self.published,
            status_changes: self.status_changes,
            delta_stats: self.delta_stats.summary(),
        }
    }
}

/// Depth stream state (guarded by the depth lock)
///
/// `frame` and `transform` are always replaced together.
#[derive(Debug, Default)]
pub struct DepthState {
    pub(crate) frame: Option<PointCloudFrame>,
    pub(crate) transform: Option<RigidTransform>,
    pub(crate) frame_delta_ms: f64,
    pub(crate) clock: StreamClock,
    pub(crate) distance: DistanceEstimate,
    pub(crate) decision: Option<AlertDecision>,
    pub(crate) frames: u64,
    pub(crate) published: u64,
    pub(crate) lookup_failures: u64,
    pub(crate) close_alerts: u64,
    pub(crate) far_alerts: u64,
    pub(crate) delta_stats: RunningStats,
    pub(crate) distance_stats: RunningStats,
}

impl DepthState {
    pub(crate) fn count_alert(&mut self, decision: &AlertDecision) {
        match decision.band() {
            Some(AlertBand::Close) => self.close_alerts += 1,
            Some(AlertBand::Far) => self.far_alerts += 1,
            None => {}
        }
    }

    fn snapshot(&self) -> DepthSnapshot {
        DepthSnapshot {
            frame: self.frame.clone(),
            transform: self.transform,
            frame_delta_ms: self.frame_delta_ms,
            distance: self.distance,
            decision: self.decision,
            frames: self.frames,
            published: self.published,
            lookup_failures: self.lookup_failures,
            close_alerts: self.close_alerts,
            far_alerts: self.far_alerts,
            delta_stats: self.delta_stats.summary(),
            distance_stats: self.distance_stats.summary(),
        }
    }
}

/// Point-in-time copy of the pose stream
#[derive(Debug, Clone, Default)]
pub struct PoseSnapshot {
    pub pose: Option<PoseSample>,
    pub delta_ms: f64,
    pub status: Option<PoseStatus>,
    pub consecutive: u64,
    pub samples: u64,
    pub published: u64,
    pub status_changes: u64,
    pub delta_stats: StatsSummary,
}

impl PoseSnapshot {
    /// Instantaneous rate from the last delta
    pub fn rate_hz(&self) -> Option<f64> {
        rate_from_delta(self.delta_ms)
    }
}

/// Point-in-time copy of the depth stream
#[derive(Debug, Clone, Default)]
pub struct DepthSnapshot {
    /// Last published frame (shares the packed buffer)
    pub frame: Option<PointCloudFrame>,
    /// Pose the frame was captured at
    pub transform: Option<RigidTransform>,
    pub frame_delta_ms: f64,
    pub distance: DistanceEstimate,
    pub decision: Option<AlertDecision>,
    pub frames: u64,
    pub published: u64,
    pub lookup_failures: u64,
    pub close_alerts: u64,
    pub far_alerts: u64,
    pub delta_stats: StatsSummary,
    pub distance_stats: StatsSummary,
}

impl DepthSnapshot {
    pub fn rate_hz(&self) -> Option<f64> {
        rate_from_delta(self.frame_delta_ms)
    }

    pub fn point_count(&self) -> usize {
        self.frame.as_ref().map_or(0, PointCloudFrame::point_count)
    }
}

fn rate_from_delta(delta_ms: f64) -> Option<f64> {
    (delta_ms > 0.0 && delta_ms.is_finite()).then(|| 1000.0 / delta_ms)
}

/// The two stream locks
#[derive(Debug, Clone, Default)]
pub struct StreamLocks {
    pose: Arc<Mutex<PoseState>>,
    depth: Arc<Mutex<DepthState>>,
}

impl StreamLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn pose(&self) -> MutexGuard<'_, PoseState> {
        lock(&self.pose)
    }

    pub(crate) fn depth(&self) -> MutexGuard<'_, DepthState> {
        lock(&self.depth)
    }

    /// Read-only handle for renderers
    pub fn render_view(&self) -> RenderView {
        RenderView {
            locks: self.clone(),
        }
    }
}

/// Read side of the stream state
///
/// Each accessor takes exactly one lock, so a reader never observes a point
/// cloud paired with a transform from a different frame.
#[derive(Debug, Clone)]
pub struct RenderView {
    locks: StreamLocks,
}

impl RenderView {
    pub fn pose(&self) -> PoseSnapshot {
        self.locks.pose().snapshot()
    }

    pub fn depth(&self) -> DepthSnapshot {
        self.locks.depth().snapshot()
    }

    /// Latest point cloud with its capture pose
    pub fn point_cloud(&self) -> Option<(PointCloudFrame, RigidTransform)> {
        let state = self.locks.depth();
        state.frame.clone().zip(state.transform)
    }

    /// Latest device pose
    pub fn device_pose(&self) -> Option<PoseSample> {
        self.locks.pose().current
    }
}
