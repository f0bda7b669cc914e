//! Mock sensor session
//!
//! Emits pose and depth callbacks from two background threads, one per
//! stream, at the configured rates. Consistent with a real device service:
//! each stream is strictly ordered on its own thread, the two streams race,
//! and pose lookup-by-time is served from the retained pose history.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use contracts::{
    ContractError, FollowMeConfig, FramePair, PoseLookup, PoseSample, PoseStatus, SceneConfig,
    SensorSession, SessionConfig, SessionEvent, SessionListener,
};
use tracing::{debug, trace, warn};

use crate::history::PoseHistory;
use crate::scene::{tracking_status, Scene};

/// Longest uninterrupted sleep, so disconnect is noticed quickly
const MAX_SLEEP_SLICE: Duration = Duration::from_millis(20);

/// Depth frames are stamped this many pose periods before delivery
const CAPTURE_LAG_POSE_PERIODS: f64 = 2.0;

/// Lower bound on the capture-to-delivery lag (seconds)
const MIN_CAPTURE_LAG_S: f64 = 0.03;

/// Event key reported on tracking status changes
pub const TRACKING_STATUS_EVENT: &str = "TrackingStatus";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Simulated depth-sensing device
pub struct MockSession {
    config: SessionConfig,
    scene: Arc<Scene>,
    history: Arc<Mutex<PoseHistory>>,
    lookups: AtomicU64,
    listening: Arc<AtomicBool>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl MockSession {
    pub fn new(config: SessionConfig, scene: SceneConfig) -> Self {
        let history = PoseHistory::new(config.pose_history);
        Self {
            config,
            scene: Arc::new(Scene::new(scene)),
            history: Arc::new(Mutex::new(history)),
            lookups: AtomicU64::new(0),
            listening: Arc::new(AtomicBool::new(false)),
            workers: Mutex::new(Vec::new()),
        }
    }

    pub fn from_config(config: &FollowMeConfig) -> Self {
        Self::new(config.session.clone(), config.scene.clone())
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Pose samples currently retained for lookup
    pub fn history_len(&self) -> usize {
        lock(&self.history).len()
    }

    /// Lookups served so far (including failed ones)
    pub fn lookup_count(&self) -> u64 {
        self.lookups.load(Ordering::Relaxed)
    }

    fn spawn_pose_stream(
        &self,
        listener: Arc<dyn SessionListener>,
        epoch: Instant,
    ) -> Result<JoinHandle<()>, ContractError> {
        let listening = self.listening.clone();
        let history = self.history.clone();
        let scene = self.scene.clone();
        let interval = stream_interval("pose", self.config.pose_rate_hz)?;
        let warmup_s = self.config.tracking_warmup_s;

        spawn_worker("followme-pose", move || {
            debug!(rate_hz = 1.0 / interval.as_secs_f64(), "pose stream started");

            let mut previous_status: Option<PoseStatus> = None;
            let mut deadline = epoch;

            while listening.load(Ordering::Relaxed) {
                let t = epoch.elapsed().as_secs_f64();
                let status = tracking_status(t, warmup_s);
                let sample = PoseSample::new(
                    t,
                    FramePair::device_in_world(),
                    scene.device_transform(t),
                    status,
                );

                // History lock is released before the callback runs.
                lock(&history).push(sample);

                if previous_status != Some(status) {
                    listener.on_event(SessionEvent::new(t, TRACKING_STATUS_EVENT, status.as_str()));
                    previous_status = Some(status);
                }
                listener.on_pose(sample);
                trace!(timestamp = t, status = status.as_str(), "mock pose sent");

                deadline += interval;
                sleep_until(deadline, &listening);
            }

            debug!("pose stream stopped");
        })
    }

    fn spawn_depth_stream(
        &self,
        listener: Arc<dyn SessionListener>,
        epoch: Instant,
    ) -> Result<JoinHandle<()>, ContractError> {
        let listening = self.listening.clone();
        let scene = self.scene.clone();
        let interval = stream_interval("depth", self.config.depth_rate_hz)?;
        let capture_lag =
            (CAPTURE_LAG_POSE_PERIODS / self.config.pose_rate_hz).max(MIN_CAPTURE_LAG_S);

        spawn_worker("followme-depth", move || {
            debug!(rate_hz = 1.0 / interval.as_secs_f64(), "depth stream started");

            let mut rng = scene.rng();
            let mut deadline = epoch + interval;
            sleep_until(deadline, &listening);

            while listening.load(Ordering::Relaxed) {
                let captured_at = (epoch.elapsed().as_secs_f64() - capture_lag).max(0.0);
                let frame = scene.capture(captured_at, &mut rng);
                trace!(
                    timestamp = captured_at,
                    points = frame.point_count(),
                    "mock point cloud sent"
                );
                listener.on_point_cloud(frame);

                deadline += interval;
                sleep_until(deadline, &listening);
            }

            debug!("depth stream stopped");
        })
    }
}

impl PoseLookup for MockSession {
    fn pose_at_time(&self, timestamp: f64, pair: FramePair) -> Result<PoseSample, ContractError> {
        let n = self.lookups.fetch_add(1, Ordering::Relaxed) + 1;

        if pair != FramePair::device_in_world() {
            return Err(ContractError::pose_lookup(
                timestamp,
                pair,
                "unsupported frame pair",
            ));
        }

        if let Some(every) = self.config.fail_lookup_every {
            if n % u64::from(every.max(1)) == 0 {
                return Err(ContractError::pose_lookup(
                    timestamp,
                    pair,
                    "injected lookup failure",
                ));
            }
        }

        lock(&self.history).lookup(timestamp, pair)
    }
}

impl SensorSession for MockSession {
    fn connect(&self, listener: Arc<dyn SessionListener>) -> Result<(), ContractError> {
        // Idempotent: already connected means nothing to do
        if self.listening.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        lock(&self.history).clear();
        self.lookups.store(0, Ordering::Relaxed);

        let epoch = Instant::now();
        let mut workers = lock(&self.workers);

        let started = self
            .spawn_pose_stream(listener.clone(), epoch)
            .and_then(|pose| {
                workers.push(pose);
                self.spawn_depth_stream(listener, epoch)
            });

        match started {
            Ok(depth) => {
                workers.push(depth);
                debug!(
                    pose_rate_hz = self.config.pose_rate_hz,
                    depth_rate_hz = self.config.depth_rate_hz,
                    "mock session connected"
                );
                Ok(())
            }
            Err(e) => {
                self.listening.store(false, Ordering::SeqCst);
                for handle in workers.drain(..) {
                    let _ = handle.join();
                }
                Err(e)
            }
        }
    }

    fn disconnect(&self) {
        self.listening.store(false, Ordering::SeqCst);

        let handles: Vec<JoinHandle<()>> = lock(&self.workers).drain(..).collect();
        let current = thread::current().id();

        for handle in handles {
            if handle.thread().id() == current {
                warn!("disconnect called from a session callback; not joining own thread");
                continue;
            }
            if handle.join().is_err() {
                warn!("session stream thread panicked");
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }
}

impl Drop for MockSession {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Callback period for a stream rate; rejects non-positive or non-finite rates
fn stream_interval(stream: &str, rate_hz: f64) -> Result<Duration, ContractError> {
    if rate_hz.is_nan() || rate_hz <= 0.0 {
        return Err(ContractError::session(format!(
            "invalid {stream} rate: {rate_hz} Hz"
        )));
    }
    Duration::try_from_secs_f64(1.0 / rate_hz)
        .map_err(|e| ContractError::session(format!("invalid {stream} rate {rate_hz} Hz: {e}")))
}

fn spawn_worker<F>(name: &str, f: F) -> Result<JoinHandle<()>, ContractError>
where
    F: FnOnce() + Send + 'static,
{
    thread::Builder::new()
        .name(name.to_string())
        .spawn(f)
        .map_err(|e| ContractError::session(format!("failed to spawn {name} thread: {e}")))
}

/// Sleep until `deadline` in short slices, returning early once stopped
fn sleep_until(deadline: Instant, listening: &AtomicBool) {
    while listening.load(Ordering::Relaxed) {
        let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
            return;
        };
        if remaining.is_zero() {
            return;
        }
        thread::sleep(remaining.min(MAX_SLEEP_SLICE));
    }
}
