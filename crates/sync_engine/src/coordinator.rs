//! Stream coordinator
//!
//! Owns the two stream locks, wires the synchronizers to the collaborators
//! and registers itself with the sensor session.
//!
//! Lock order: the depth lock may be held while the session's pose lookup
//! takes the session's own history lock. The session must never hold that
//! history lock while invoking a callback.

use std::sync::Arc;

use contracts::{
    ContractError, Diagnostics, ErrorChannel, PointCloudFrame, PoseLookup, PoseSample, Renderer,
    SensorSession, SessionEvent, SessionListener, ToneService,
};
use tracing::{info, instrument};

use crate::alert::AlertPolicy;
use crate::depth::DepthSynchronizer;
use crate::pose::PoseSynchronizer;
use crate::state::{DepthSnapshot, PoseSnapshot, RenderView, StreamLocks};

/// Collaborators the core reports to
#[derive(Clone)]
pub struct Collaborators {
    pub renderer: Arc<dyn Renderer>,
    pub tone: Arc<dyn ToneService>,
    pub errors: Arc<dyn ErrorChannel>,
    pub diagnostics: Arc<dyn Diagnostics>,
}

/// Session listener dispatching each stream to its synchronizer
pub struct StreamListener {
    pose: PoseSynchronizer,
    depth: DepthSynchronizer,
    diagnostics: Arc<dyn Diagnostics>,
}

impl StreamListener {
    pub fn new(locks: &StreamLocks, lookup: Arc<dyn PoseLookup>, collab: Collaborators) -> Self {
        let pose = PoseSynchronizer::new(
            locks.clone(),
            collab.renderer.clone(),
            collab.diagnostics.clone(),
        );
        let depth = DepthSynchronizer::new(
            locks.clone(),
            lookup,
            collab.renderer,
            AlertPolicy::new(collab.tone),
            collab.errors,
            collab.diagnostics.clone(),
        );
        Self {
            pose,
            depth,
            diagnostics: collab.diagnostics,
        }
    }

    pub fn pose(&self) -> &PoseSynchronizer {
        &self.pose
    }

    pub fn depth(&self) -> &DepthSynchronizer {
        &self.depth
    }
}

impl SessionListener for StreamListener {
    fn on_pose(&self, sample: PoseSample) {
        self.pose.on_pose(sample);
    }

    fn on_point_cloud(&self, frame: PointCloudFrame) {
        self.depth.on_point_cloud(frame);
    }

    fn on_event(&self, event: SessionEvent) {
        info!(
            timestamp = event.timestamp,
            key = %event.key,
            value = %event.value,
            "session event"
        );
        self.diagnostics.session_event(&event);
    }
}

/// Stream coordinator
///
/// # Example
///
/// ```ignore
/// let coordinator = StreamCoordinator::new(session, collaborators);
/// coordinator.start()?;
/// let view = coordinator.render_view();
/// // ... render loop reads view.depth() / view.pose() ...
/// coordinator.stop();
/// ```
pub struct StreamCoordinator {
    locks: StreamLocks,
    listener: Arc<StreamListener>,
    session: Arc<dyn SensorSession>,
}

impl StreamCoordinator {
    /// Build the pipeline on top of a session (not connected yet)
    pub fn new<S>(session: Arc<S>, collab: Collaborators) -> Self
    where
        S: SensorSession + 'static,
    {
        let locks = StreamLocks::new();
        let lookup: Arc<dyn PoseLookup> = session.clone();
        let listener = Arc::new(StreamListener::new(&locks, lookup, collab));
        Self {
            locks,
            listener,
            session,
        }
    }

    /// Register with the session; callbacks start flowing
    #[instrument(name = "stream_coordinator_start", skip(self))]
    pub fn start(&self) -> Result<(), ContractError> {
        if self.session.is_connected() {
            return Ok(());
        }
        self.session.connect(self.listener.clone())?;
        info!("stream coordinator started");
        Ok(())
    }

    /// Disconnect from the session
    ///
    /// Blocks until in-flight callbacks finish; must not be called from a
    /// session callback.
    #[instrument(name = "stream_coordinator_stop", skip(self))]
    pub fn stop(&self) {
        if !self.session.is_connected() {
            return;
        }
        self.session.disconnect();
        info!("stream coordinator stopped");
    }

    pub fn is_running(&self) -> bool {
        self.session.is_connected()
    }

    /// Listener handed to the session
    pub fn listener(&self) -> Arc<StreamListener> {
        self.listener.clone()
    }

    pub fn render_view(&self) -> RenderView {
        self.locks.render_view()
    }

    pub fn pose_snapshot(&self) -> PoseSnapshot {
        self.locks.render_view().pose()
    }

    pub fn depth_snapshot(&self) -> DepthSnapshot {
        self.locks.render_view().depth()
    }
}

impl Drop for StreamCoordinator {
    fn drop(&mut self) {
        self.stop();
    }
}
