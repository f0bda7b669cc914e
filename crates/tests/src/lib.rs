//! # Integration Tests
//!
//! End-to-end and cross-crate tests.
//!
//! Covers:
//! - Config file to running pipeline
//! - Mock session e2e runs through the coordinator
//! - Frame/pose consistency under concurrent readers
//! - Lookup failures isolated from the pose stream

#[cfg(test)]
mod support {
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::Mutex;

    use contracts::{
        ErrorChannel, NoDiagnostics, PointCloudFrame, Renderer, RigidTransform, ToneRequest,
        ToneService,
    };
    use std::sync::Arc;
    use sync_engine::Collaborators;

    #[derive(Default)]
    pub struct CountingRenderer {
        pub poses: AtomicU64,
        pub clouds: AtomicU64,
        pub not_ready: AtomicBool,
    }

    impl Renderer for CountingRenderer {
        fn is_ready(&self) -> bool {
            !self.not_ready.load(Ordering::SeqCst)
        }

        fn publish_pose(&self, _transform: &RigidTransform) {
            self.poses.fetch_add(1, Ordering::SeqCst);
        }

        fn publish_point_cloud(&self, _frame: &PointCloudFrame, _transform: &RigidTransform) {
            self.clouds.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    pub struct RecordingTone(pub Mutex<Vec<ToneRequest>>);

    impl ToneService for RecordingTone {
        fn play(&self, request: ToneRequest) {
            self.0.lock().unwrap().push(request);
        }
    }

    #[derive(Default)]
    pub struct CountingErrors(pub AtomicU64);

    impl ErrorChannel for CountingErrors {
        fn notify(&self, _message: &str) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn collaborators(
        renderer: Arc<CountingRenderer>,
        tone: Arc<dyn ToneService>,
        errors: Arc<CountingErrors>,
    ) -> Collaborators {
        Collaborators {
            renderer,
            tone,
            errors,
            diagnostics: Arc::new(NoDiagnostics),
        }
    }
}

#[cfg(test)]
mod config_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{FollowMeConfig, ToneOutputKind};

    #[test]
    fn test_default_config_validates() {
        assert!(ConfigLoader::validate(&FollowMeConfig::default()).is_ok());
    }

    #[test]
    fn test_json_and_toml_agree() {
        let config = FollowMeConfig::default();
        let toml = ConfigLoader::to_toml(&config).unwrap();
        let json = ConfigLoader::to_json(&config).unwrap();

        let from_toml = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();
        let from_json = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(from_toml.session.pose_history, from_json.session.pose_history);
        assert_eq!(from_toml.tone.output, ToneOutputKind::Log);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;

    use contracts::{FollowMeConfig, SceneConfig, SessionConfig, ToneConfig, ToneOutputKind};
    use sensor_session::MockSession;
    use sync_engine::{StreamCoordinator, CLOSE_TONE, FAR_TONE};
    use tone::SynthToneService;

    use crate::support::*;

    fn approaching_config() -> FollowMeConfig {
        FollowMeConfig {
            session: SessionConfig {
                pose_rate_hz: 200.0,
                depth_rate_hz: 20.0,
                tracking_warmup_s: 0.05,
                ..SessionConfig::default()
            },
            scene: SceneConfig {
                start_distance_m: 2.6,
                min_distance_m: 1.0,
                approach_speed_mps: 1.5,
                grid_step_m: 0.05,
                noise_m: 0.0,
                seed: Some(11),
                ..SceneConfig::default()
            },
            ..FollowMeConfig::default()
        }
    }

    /// Mock session -> coordinator -> recording collaborators
    #[tokio::test]
    async fn test_e2e_walker_triggers_far_then_close_tones() {
        let session = Arc::new(MockSession::from_config(&approaching_config()));
        let renderer = Arc::new(CountingRenderer::default());
        let tone = Arc::new(RecordingTone::default());
        let errors = Arc::new(CountingErrors::default());

        let coordinator = StreamCoordinator::new(
            session.clone(),
            collaborators(renderer.clone(), tone.clone(), errors.clone()),
        );
        coordinator.start().unwrap();
        tokio::time::sleep(Duration::from_millis(1200)).await;
        coordinator.stop();

        let pose = coordinator.pose_snapshot();
        let depth = coordinator.depth_snapshot();

        assert!(pose.samples > 50, "pose samples = {}", pose.samples);
        assert_eq!(pose.published, pose.samples);
        assert!(depth.frames > 5, "depth frames = {}", depth.frames);
        assert_eq!(depth.lookup_failures, 0);
        assert_eq!(errors.0.load(Ordering::SeqCst), 0);
        assert_eq!(renderer.clouds.load(Ordering::SeqCst), depth.published);

        // Walker starts at 2.6 m and ends near 1.0 m: far first, then close.
        let played = tone.0.lock().unwrap().clone();
        let first_close = played.iter().position(|t| *t == CLOSE_TONE);
        let last_far = played.iter().rposition(|t| *t == FAR_TONE);
        assert!(first_close.is_some(), "played = {played:?}");
        assert!(last_far.is_some(), "played = {played:?}");
        assert!(last_far < first_close, "played = {played:?}");
        assert_eq!(
            played.len() as u64,
            depth.close_alerts + depth.far_alerts
        );
    }

    #[tokio::test]
    async fn test_e2e_injected_lookup_failures_leave_pose_stream_intact() {
        let mut config = approaching_config();
        config.session.fail_lookup_every = Some(2);

        let session = Arc::new(MockSession::from_config(&config));
        let renderer = Arc::new(CountingRenderer::default());
        let errors = Arc::new(CountingErrors::default());
        let coordinator = StreamCoordinator::new(
            session.clone(),
            collaborators(
                renderer.clone(),
                Arc::new(RecordingTone::default()),
                errors.clone(),
            ),
        );

        coordinator.start().unwrap();
        tokio::time::sleep(Duration::from_millis(800)).await;
        coordinator.stop();

        let depth = coordinator.depth_snapshot();
        let pose = coordinator.pose_snapshot();

        assert!(depth.lookup_failures >= depth.frames / 2, "{depth:?}");
        assert_eq!(errors.0.load(Ordering::SeqCst), depth.lookup_failures);
        assert_eq!(depth.published + depth.lookup_failures, depth.frames);
        assert_eq!(pose.published, pose.samples);
    }

    #[tokio::test]
    async fn test_e2e_synth_tones_written_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tones.pcm");
        let tone = Arc::new(
            SynthToneService::from_config(&ToneConfig {
                output: ToneOutputKind::File,
                path: Some(path.clone()),
                ..ToneConfig::default()
            })
            .unwrap(),
        );

        let session = Arc::new(MockSession::from_config(&approaching_config()));
        let coordinator = StreamCoordinator::new(
            session,
            collaborators(
                Arc::new(CountingRenderer::default()),
                tone.clone(),
                Arc::new(CountingErrors::default()),
            ),
        );
        coordinator.start().unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        coordinator.stop();
        assert!(tone.wait_idle(Duration::from_secs(2)));

        let stats = tone.stats();
        assert!(stats.played > 0, "{stats:?}");
        let bytes = std::fs::metadata(&path).unwrap().len();
        // 250 ms at 8 kHz, 16-bit
        assert_eq!(bytes, stats.played * 4000);
    }

    #[tokio::test]
    async fn test_renderer_not_ready_skips_publication_only() {
        let session = Arc::new(MockSession::from_config(&approaching_config()));
        let renderer = Arc::new(CountingRenderer::default());
        renderer.not_ready.store(true, Ordering::SeqCst);
        let tone = Arc::new(RecordingTone::default());

        let coordinator = StreamCoordinator::new(
            session,
            collaborators(
                renderer.clone(),
                tone.clone(),
                Arc::new(CountingErrors::default()),
            ),
        );
        coordinator.start().unwrap();
        tokio::time::sleep(Duration::from_millis(400)).await;
        coordinator.stop();

        let depth = coordinator.depth_snapshot();
        assert!(depth.frames > 0);
        assert_eq!(depth.published, 0);
        assert_eq!(renderer.clouds.load(Ordering::SeqCst), 0);
        assert_eq!(renderer.poses.load(Ordering::SeqCst), 0);
        assert!(!tone.0.lock().unwrap().is_empty());
    }
}

#[cfg(test)]
mod consistency_tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    use contracts::{
        ContractError, FramePair, Point3, PointCloudFrame, PoseLookup, PoseSample, PoseStatus,
        RigidTransform,
    };
    use sync_engine::{StreamListener, StreamLocks};

    use crate::support::*;

    /// Lookup whose transform encodes the requested timestamp in x
    struct StampedLookup;

    impl PoseLookup for StampedLookup {
        fn pose_at_time(
            &self,
            timestamp: f64,
            pair: FramePair,
        ) -> Result<PoseSample, ContractError> {
            let transform = RigidTransform {
                translation: [timestamp, 0.0, 0.0],
                rotation: [0.0, 0.0, 0.0, 1.0],
            };
            Ok(PoseSample::new(timestamp, pair, transform, PoseStatus::Valid))
        }
    }

    fn pose(timestamp: f64) -> PoseSample {
        pose_with_status(timestamp, PoseStatus::Valid)
    }

    fn pose_with_status(timestamp: f64, status: PoseStatus) -> PoseSample {
        PoseSample::new(
            timestamp,
            FramePair::device_in_world(),
            RigidTransform::identity(),
            status,
        )
    }

    /// Samples per status run in the scripted pose stream
    const RUN: u64 = 7;

    /// Status of sample `i`: runs of `RUN` samples, alternating valid/invalid
    fn scripted_status(i: u64) -> PoseStatus {
        if (i / RUN) % 2 == 0 {
            PoseStatus::Valid
        } else {
            PoseStatus::Invalid
        }
    }

    fn listener() -> (Arc<StreamListener>, StreamLocks) {
        let locks = StreamLocks::new();
        let listener = Arc::new(StreamListener::new(
            &locks,
            Arc::new(StampedLookup),
            collaborators(
                Arc::new(CountingRenderer::default()),
                Arc::new(RecordingTone::default()),
                Arc::new(CountingErrors::default()),
            ),
        ));
        (listener, locks)
    }

    #[test]
    fn test_pose_readers_see_single_update_snapshots() {
        use contracts::SessionListener;

        const SAMPLES: u64 = 20_000;

        let (listener, locks) = listener();
        let view = locks.render_view();
        let done = Arc::new(AtomicBool::new(false));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let view = view.clone();
                let done = done.clone();
                thread::spawn(move || {
                    let mut checked = 0u64;
                    while !done.load(Ordering::SeqCst) {
                        let snapshot = view.pose();
                        let Some(sample) = snapshot.pose else {
                            continue;
                        };
                        let i = (sample.timestamp * 1000.0).round() as u64;

                        assert_eq!(snapshot.samples, i + 1);
                        assert_eq!(snapshot.published, i + 1);
                        assert_eq!(sample.status, scripted_status(i));
                        assert_eq!(snapshot.status, Some(sample.status));
                        assert_eq!(snapshot.consecutive, i % RUN + 1, "sample {i}");
                        if i == 0 {
                            assert_eq!(snapshot.delta_ms, 0.0);
                        } else {
                            assert!((snapshot.delta_ms - 1.0).abs() < 1e-6, "sample {i}");
                        }
                        checked += 1;
                    }
                    checked
                })
            })
            .collect();

        for i in 0..SAMPLES {
            listener.on_pose(pose_with_status(i as f64 * 0.001, scripted_status(i)));
        }

        done.store(true, Ordering::SeqCst);
        let checked: u64 = readers.into_iter().map(|r| r.join().unwrap()).sum();
        assert!(checked > 0);

        let snapshot = view.pose();
        assert_eq!(snapshot.samples, SAMPLES);
        assert_eq!(snapshot.status_changes, (SAMPLES - 1) / RUN);
    }

    #[test]
    fn test_readers_never_see_mismatched_frame_and_pose() {
        use contracts::SessionListener;

        let (listener, locks) = listener();
        let view = locks.render_view();
        let done = Arc::new(AtomicBool::new(false));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let view = view.clone();
                let done = done.clone();
                thread::spawn(move || {
                    let mut checked = 0u64;
                    while !done.load(Ordering::SeqCst) {
                        if let Some((frame, transform)) = view.point_cloud() {
                            assert_eq!(transform.translation[0], frame.timestamp);
                            checked += 1;
                        }
                        let depth = view.depth();
                        if let (Some(frame), Some(transform)) = (depth.frame, depth.transform) {
                            assert_eq!(transform.translation[0], frame.timestamp);
                        }
                    }
                    checked
                })
            })
            .collect();

        let pose_listener = listener.clone();
        let pose_writer = thread::spawn(move || {
            for i in 0..5000 {
                pose_listener.on_pose(pose(i as f64 * 0.001));
            }
        });

        let points = [Point3::new(0.0, 0.0, 1.5), Point3::new(0.05, 0.05, 2.5)];
        for i in 1..=2000 {
            listener.on_point_cloud(PointCloudFrame::from_points(i as f64 * 0.01, &points));
        }

        pose_writer.join().unwrap();
        done.store(true, Ordering::SeqCst);
        let checked: u64 = readers.into_iter().map(|r| r.join().unwrap()).sum();
        assert!(checked > 0);

        let depth = view.depth();
        assert_eq!(depth.frames, 2000);
        assert_eq!(depth.published, 2000);
        assert_eq!(view.pose().samples, 5000);
    }
}
