//! Pose stream synchronizer

use std::sync::Arc;

use contracts::{Diagnostics, PoseSample, Renderer};
use observability::record_pose_sample;
use tracing::{debug, instrument};

use crate::state::StreamLocks;

/// Result of processing one pose sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseUpdate {
    /// Milliseconds since the previous sample (first sample: since t = 0)
    pub delta_ms: f64,
    /// Consecutive samples with this sample's status, including it
    pub run_length: u64,
    /// Whether the renderer received the pose
    pub published: bool,
}

/// Serializes pose samples into the shared pose state
pub struct PoseSynchronizer {
    locks: StreamLocks,
    renderer: Arc<dyn Renderer>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl PoseSynchronizer {
    pub fn new(
        locks: StreamLocks,
        renderer: Arc<dyn Renderer>,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        Self {
            locks,
            renderer,
            diagnostics,
        }
    }

    /// Handle one pose sample
    ///
    /// Bookkeeping and publication happen under the pose lock. The renderer is
    /// skipped while it is not ready; the bookkeeping is not.
    #[instrument(
        level = "trace",
        name = "pose_sync_on_pose",
        skip(self, sample),
        fields(timestamp = sample.timestamp, status = sample.status.as_str())
    )]
    pub fn on_pose(&self, sample: PoseSample) -> PoseUpdate {
        self.diagnostics.pose_status(sample.status);

        let mut state = self.locks.pose();

        let delta_ms = state.clock.advance(sample.timestamp);
        if state.clock.has_interval() {
            state.delta_stats.push(delta_ms);
        }

        let previous = state.run.status();
        let run_length = state.run.observe(sample.status);
        if previous.is_some_and(|p| p != sample.status) {
            state.status_changes += 1;
            debug!(
                from = ?previous,
                to = sample.status.as_str(),
                "tracking status changed"
            );
        }

        state.current = Some(sample);
        state.delta_ms = delta_ms;
        state.samples += 1;

        record_pose_sample(sample.status, delta_ms, run_length);

        let published = self.renderer.is_ready();
        if published {
            self.renderer.publish_pose(&sample.transform);
            state.published += 1;
        }

        PoseUpdate {
            delta_ms,
            run_length,
            published,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{pose, RecordingRenderer};
    use contracts::{NoDiagnostics, PoseStatus::*};

    fn synchronizer(ready: bool) -> (PoseSynchronizer, StreamLocks, Arc<RecordingRenderer>) {
        let locks = StreamLocks::new();
        let renderer = Arc::new(RecordingRenderer::new(ready));
        let sync = PoseSynchronizer::new(locks.clone(), renderer.clone(), Arc::new(NoDiagnostics));
        (sync, locks, renderer)
    }

    #[test]
    fn test_delta_and_run_length() {
        let (sync, locks, _) = synchronizer(true);

        let first = sync.on_pose(pose(0.5, Valid));
        assert!((first.delta_ms - 500.0).abs() < 1e-9);
        assert_eq!(first.run_length, 1);

        let second = sync.on_pose(pose(0.51, Valid));
        assert!((second.delta_ms - 10.0).abs() < 1e-6);
        assert_eq!(second.run_length, 2);

        let third = sync.on_pose(pose(0.52, Invalid));
        assert_eq!(third.run_length, 1);

        let snapshot = locks.render_view().pose();
        assert_eq!(snapshot.samples, 3);
        assert_eq!(snapshot.status, Some(Invalid));
        assert_eq!(snapshot.status_changes, 1);
        assert_eq!(snapshot.pose.map(|p| p.timestamp), Some(0.52));
        assert_eq!(snapshot.delta_stats.count, 2);
    }

    #[test]
    fn test_not_ready_renderer_skips_publication_only() {
        let (sync, locks, renderer) = synchronizer(false);

        let update = sync.on_pose(pose(1.0, Valid));
        assert!(!update.published);
        assert_eq!(renderer.poses(), 0);

        let snapshot = locks.render_view().pose();
        assert_eq!(snapshot.samples, 1);
        assert_eq!(snapshot.published, 0);
        assert_eq!(snapshot.consecutive, 1);

        renderer.set_ready(true);
        assert!(sync.on_pose(pose(1.01, Valid)).published);
        assert_eq!(renderer.poses(), 1);
        assert_eq!(locks.render_view().pose().consecutive, 2);
    }

    #[test]
    fn test_out_of_order_timestamp_yields_negative_delta() {
        let (sync, _, _) = synchronizer(true);
        sync.on_pose(pose(2.0, Valid));
        assert!(sync.on_pose(pose(1.9, Valid)).delta_ms < 0.0);
    }
}
