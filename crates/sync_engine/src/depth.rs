//! Depth stream synchronizer
//!
//! For every point cloud: update the frame bookkeeping, look up the device
//! pose at the frame's timestamp, run proximity detection and the alert
//! policy, then publish the frame together with its pose. The whole step runs
//! under the depth lock, so readers never see a frame paired with another
//! frame's pose.

use std::sync::Arc;

use contracts::{
    AlertDecision, Diagnostics, DistanceEstimate, ErrorChannel, FramePair, PointCloudFrame,
    PoseLookup, Renderer,
};
use observability::{record_depth_frame, record_distance, record_pose_lookup_failure};
use tracing::{instrument, trace, warn};

use crate::alert::AlertPolicy;
use crate::proximity;
use crate::state::StreamLocks;

/// Notice shown when a frame has to be dropped for lack of a pose
pub const LOOKUP_FAILED_NOTICE: &str = "Tracking error: pose unavailable for depth frame";

/// What happened to one depth frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DepthOutcome {
    /// Processed and handed to the renderer
    Published {
        distance: DistanceEstimate,
        decision: AlertDecision,
    },
    /// Processed; renderer not ready yet
    Processed {
        distance: DistanceEstimate,
        decision: AlertDecision,
    },
    /// Pose lookup failed; no detection, no alert, previous frame kept
    Discarded,
}

impl DepthOutcome {
    pub fn decision(&self) -> Option<AlertDecision> {
        match self {
            Self::Published { decision, .. } | Self::Processed { decision, .. } => Some(*decision),
            Self::Discarded => None,
        }
    }

    pub fn distance(&self) -> Option<DistanceEstimate> {
        match self {
            Self::Published { distance, .. } | Self::Processed { distance, .. } => Some(*distance),
            Self::Discarded => None,
        }
    }
}

/// Serializes depth frames into the shared depth state
pub struct DepthSynchronizer {
    locks: StreamLocks,
    lookup: Arc<dyn PoseLookup>,
    renderer: Arc<dyn Renderer>,
    alerts: AlertPolicy,
    errors: Arc<dyn ErrorChannel>,
    diagnostics: Arc<dyn Diagnostics>,
    frame_pair: FramePair,
}

impl DepthSynchronizer {
    pub fn new(
        locks: StreamLocks,
        lookup: Arc<dyn PoseLookup>,
        renderer: Arc<dyn Renderer>,
        alerts: AlertPolicy,
        errors: Arc<dyn ErrorChannel>,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        Self {
            locks,
            lookup,
            renderer,
            alerts,
            errors,
            diagnostics,
            frame_pair: FramePair::device_in_world(),
        }
    }

    /// Frame pair used for the per-frame pose lookup
    pub fn with_frame_pair(mut self, frame_pair: FramePair) -> Self {
        self.frame_pair = frame_pair;
        self
    }

    /// Handle one point cloud frame
    #[instrument(
        level = "trace",
        name = "depth_sync_on_point_cloud",
        skip(self, frame),
        fields(timestamp = frame.timestamp, points = frame.point_count())
    )]
    pub fn on_point_cloud(&self, frame: PointCloudFrame) -> DepthOutcome {
        let point_count = frame.point_count();
        self.diagnostics.point_count(point_count);

        let mut state = self.locks.depth();

        // Frame bookkeeping advances even if the lookup below fails.
        let frame_delta_ms = state.clock.advance(frame.timestamp);
        if state.clock.has_interval() {
            state.delta_stats.push(frame_delta_ms);
        }
        state.frame_delta_ms = frame_delta_ms;
        state.frames += 1;
        record_depth_frame(frame_delta_ms, point_count);

        let pose = match self.lookup.pose_at_time(frame.timestamp, self.frame_pair) {
            Ok(pose) => pose,
            Err(e) => {
                state.lookup_failures += 1;
                drop(state);

                record_pose_lookup_failure();
                warn!(
                    timestamp = frame.timestamp,
                    error = %e,
                    "pose lookup failed, depth frame discarded"
                );
                self.errors.notify(LOOKUP_FAILED_NOTICE);
                return DepthOutcome::Discarded;
            }
        };

        let distance = proximity::detect(&frame);
        record_distance(distance);
        let decision = self.alerts.apply(distance);

        state.distance = distance;
        state.decision = Some(decision);
        if let Some(d) = distance.value() {
            state.distance_stats.push(d);
        }
        state.count_alert(&decision);

        trace!(distance_m = ?distance.value(), "depth frame processed");

        if !self.renderer.is_ready() {
            return DepthOutcome::Processed { distance, decision };
        }

        self.renderer.publish_point_cloud(&frame, &pose.transform);
        state.frame = Some(frame);
        state.transform = Some(pose.transform);
        state.published += 1;

        DepthOutcome::Published { distance, decision }
    }
}
