//! Recording collaborators for unit tests

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use contracts::{
    ContractError, ErrorChannel, FramePair, PointCloudFrame, PoseLookup, PoseSample, PoseStatus,
    RigidTransform, Renderer, ToneRequest, ToneService,
};

pub fn pose(timestamp: f64, status: PoseStatus) -> PoseSample {
    PoseSample::new(
        timestamp,
        FramePair::device_in_world(),
        RigidTransform::identity(),
        status,
    )
}

pub struct RecordingRenderer {
    ready: AtomicBool,
    poses: AtomicUsize,
    point_clouds: AtomicUsize,
}

impl RecordingRenderer {
    pub fn new(ready: bool) -> Self {
        Self {
            ready: AtomicBool::new(ready),
            poses: AtomicUsize::new(0),
            point_clouds: AtomicUsize::new(0),
        }
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    pub fn poses(&self) -> usize {
        self.poses.load(Ordering::SeqCst)
    }

    pub fn point_clouds(&self) -> usize {
        self.point_clouds.load(Ordering::SeqCst)
    }
}

impl Renderer for RecordingRenderer {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn publish_pose(&self, _transform: &RigidTransform) {
        self.poses.fetch_add(1, Ordering::SeqCst);
    }

    fn publish_point_cloud(&self, _frame: &PointCloudFrame, _transform: &RigidTransform) {
        self.point_clouds.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct RecordingTone(Mutex<Vec<ToneRequest>>);

impl RecordingTone {
    pub fn played(&self) -> Vec<ToneRequest> {
        self.0.lock().unwrap().clone()
    }
}

impl ToneService for RecordingTone {
    fn play(&self, request: ToneRequest) {
        self.0.lock().unwrap().push(request);
    }
}

#[derive(Default)]
pub struct RecordingErrors(Mutex<Vec<String>>);

impl RecordingErrors {
    pub fn messages(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl ErrorChannel for RecordingErrors {
    fn notify(&self, message: &str) {
        self.0.lock().unwrap().push(message.to_string());
    }
}

/// Pose lookup returning a fixed transform, with one-shot failures
#[derive(Default)]
pub struct ScriptedLookup {
    transform: Mutex<Option<RigidTransform>>,
    fail_next: AtomicBool,
    requested: Mutex<Vec<f64>>,
}

impl ScriptedLookup {
    pub fn set_transform(&self, transform: RigidTransform) {
        *self.transform.lock().unwrap() = Some(transform);
    }

    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn requested(&self) -> Vec<f64> {
        self.requested.lock().unwrap().clone()
    }
}

impl PoseLookup for ScriptedLookup {
    fn pose_at_time(&self, timestamp: f64, pair: FramePair) -> Result<PoseSample, ContractError> {
        self.requested.lock().unwrap().push(timestamp);
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(ContractError::pose_lookup(timestamp, pair, "scripted failure"));
        }
        let transform = self
            .transform
            .lock()
            .unwrap()
            .unwrap_or_else(RigidTransform::identity);
        Ok(PoseSample::new(timestamp, pair, transform, PoseStatus::Valid))
    }
}
