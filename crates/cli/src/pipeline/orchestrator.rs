//! Pipeline orchestrator - wires the simulated device, the proximity core and
//! the headless collaborators, then drives a render loop until a stop
//! condition is met.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use contracts::FollowMeConfig;
use sensor_session::MockSession;
use sync_engine::{Collaborators, RenderView, StreamCoordinator};
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tone::SynthToneService;
use tracing::{debug, info, warn};

use super::{LogDiagnostics, LogErrorChannel, LogRenderer, PipelineStats};

/// Interval between status lines
const STATUS_INTERVAL: Duration = Duration::from_secs(1);

/// Time allowed for in-flight tones after the session stops
const TONE_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Validated FollowMe configuration
    pub config: FollowMeConfig,

    /// Stop after this many depth frames (None = unlimited)
    pub max_frames: Option<u64>,

    /// Run time (None = until shutdown)
    pub duration: Option<Duration>,

    /// Render loop period
    pub render_interval: Duration,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run until the duration, frame limit or shutdown signal
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let config = &self.config.config;

        if let Some(port) = config.metrics.port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let session = Arc::new(MockSession::from_config(config));
        let tone = Arc::new(
            SynthToneService::from_config(&config.tone).context("Failed to open tone output")?,
        );
        let renderer = Arc::new(LogRenderer::new());
        let errors = Arc::new(LogErrorChannel::default());
        let diagnostics = Arc::new(LogDiagnostics::default());

        let coordinator = StreamCoordinator::new(
            session.clone(),
            Collaborators {
                renderer: renderer.clone(),
                tone: tone.clone(),
                errors: errors.clone(),
                diagnostics: diagnostics.clone(),
            },
        );

        coordinator
            .start()
            .context("Failed to start sensor session")?;

        info!(
            wall_points = session.scene().wall_len(),
            tone_output = tone.output_name(),
            max_frames = ?self.config.max_frames,
            duration = ?self.config.duration,
            "Pipeline running (mock session)"
        );

        let view = coordinator.render_view();
        let frames_rendered = self
            .render_loop(&view, &renderer, &diagnostics, &mut shutdown)
            .await;

        info!("Shutting down pipeline...");
        if !shut_down(coordinator, tone.clone()).await? {
            warn!("Tone playback still running at shutdown");
        }

        let stats = PipelineStats {
            duration: start_time.elapsed(),
            pose: view.pose(),
            depth: view.depth(),
            tone: tone.stats(),
            notices: errors.notices(),
            events: diagnostics.events(),
            frames_rendered,
        };

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            depth_fps = format!("{:.2}", stats.depth_fps()),
            poses_published = renderer.poses(),
            clouds_published = renderer.point_clouds(),
            "Pipeline shutdown complete"
        );

        Ok(stats)
    }

    /// Render loop: reads consistent snapshots at the render rate
    async fn render_loop(
        &self,
        view: &RenderView,
        renderer: &LogRenderer,
        diagnostics: &LogDiagnostics,
        shutdown: &mut watch::Receiver<bool>,
    ) -> u64 {
        let mut ticker = tokio::time::interval(self.config.render_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let deadline = self.config.duration.map(|d| Instant::now() + d);
        let mut next_status = Instant::now() + STATUS_INTERVAL;
        let mut last_drawn: Option<f64> = None;
        let mut frames_rendered = 0u64;

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
                _ = wait_deadline(deadline) => {
                    info!("Run duration reached");
                    break;
                }
            }

            // Surface exists from the first tick on.
            renderer.mark_ready();

            if let Some((cloud, pose)) = view.point_cloud() {
                if last_drawn != Some(cloud.timestamp) {
                    last_drawn = Some(cloud.timestamp);
                    frames_rendered += 1;
                    debug!(
                        timestamp = cloud.timestamp,
                        points = cloud.point_count(),
                        device_z = pose.translation[2],
                        "frame drawn"
                    );
                }
            }

            let depth = view.depth();
            if let Some(max) = self.config.max_frames {
                if depth.frames >= max {
                    info!(frames = depth.frames, "Reached max frames limit");
                    break;
                }
            }

            if Instant::now() >= next_status {
                next_status += STATUS_INTERVAL;
                let pose = view.pose();
                info!(
                    distance_m = ?depth.distance.value(),
                    decision = ?depth.decision,
                    depth_hz = ?depth.rate_hz(),
                    pose_hz = ?pose.rate_hz(),
                    tracking = ?pose.status,
                    points = diagnostics.last_point_count(),
                    lookup_failures = depth.lookup_failures,
                    "status"
                );
            }
        }

        frames_rendered
    }
}

/// Stop the session and drain in-flight tones on the blocking pool
///
/// Both steps block (thread joins, playback wait). Returns false if tones
/// were still playing when the drain timeout expired.
async fn shut_down(coordinator: StreamCoordinator, tone: Arc<SynthToneService>) -> Result<bool> {
    tokio::task::spawn_blocking(move || {
        coordinator.stop();
        tone.wait_idle(TONE_DRAIN_TIMEOUT)
    })
    .await
    .context("Pipeline shutdown task failed")
}

async fn wait_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}
