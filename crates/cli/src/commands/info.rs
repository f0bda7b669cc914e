//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::FollowMeConfig;
use serde::Serialize;
use sync_engine::alert::{CLOSE_BAND_MAX_M, CLOSE_TONE, FAR_BAND_MAX_M, FAR_TONE};
use sync_engine::GATE_HALF_WIDTH_M;
use tracing::info;

use super::load_config;
use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo<'a> {
    config: &'a FollowMeConfig,
    detection: DetectionInfo,
}

/// Fixed detection constants
#[derive(Serialize)]
struct DetectionInfo {
    gate_half_width_m: f32,
    close_band_m: (f64, f64),
    close_tone_hz: u32,
    far_band_m: (f64, f64),
    far_tone_hz: u32,
    tone_duration_ms: u32,
}

impl DetectionInfo {
    fn current() -> Self {
        Self {
            gate_half_width_m: GATE_HALF_WIDTH_M,
            close_band_m: (0.0, CLOSE_BAND_MAX_M),
            close_tone_hz: CLOSE_TONE.frequency_hz,
            far_band_m: (CLOSE_BAND_MAX_M, FAR_BAND_MAX_M),
            far_tone_hz: FAR_TONE.frequency_hz,
            tone_duration_ms: CLOSE_TONE.duration_ms,
        }
    }
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = ?args.config, "Loading configuration info");

    let config = load_config(args.config.as_deref())?;
    let detection = DetectionInfo::current();

    if args.json {
        let info = ConfigInfo {
            config: &config,
            detection,
        };
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{json}");
    } else {
        print_config_info(&config, &detection);
    }

    Ok(())
}

fn print_config_info(config: &FollowMeConfig, detection: &DetectionInfo) {
    println!("\n=== FollowMe Configuration ===\n");

    let session = &config.session;
    println!("Session:");
    println!("  Pose rate: {} Hz", session.pose_rate_hz);
    println!("  Depth rate: {} Hz", session.depth_rate_hz);
    println!(
        "  Pose history: {} samples ({:.2}s)",
        session.pose_history,
        session.pose_history as f64 / session.pose_rate_hz
    );
    println!("  Tracking warm-up: {}s", session.tracking_warmup_s);
    if let Some(every) = session.fail_lookup_every {
        println!("  Injected lookup failures: every {every}");
    }

    let scene = &config.scene;
    println!("\nScene:");
    println!(
        "  Wall: {} m ahead, closest approach {} m",
        scene.start_distance_m, scene.min_distance_m
    );
    println!("  Approach speed: {} m/s", scene.approach_speed_mps);
    println!(
        "  Wall size: {0:.2} x {0:.2} m, grid step {1} m",
        scene.wall_half_extent_m * 2.0,
        scene.grid_step_m
    );
    println!("  Depth noise: ±{} m", scene.noise_m);
    match scene.seed {
        Some(seed) => println!("  Seed: {seed}"),
        None => println!("  Seed: random"),
    }

    let tone = &config.tone;
    println!("\nTone:");
    println!("  Sample rate: {} Hz", tone.sample_rate_hz);
    println!("  Amplitude: {}", tone.amplitude);
    println!("  Output: {:?}", tone.output);
    if let Some(ref path) = tone.path {
        println!("  Path: {}", path.display());
    }

    println!("\nDetection:");
    println!("  Gate: |x|, |y| < {} m", detection.gate_half_width_m);
    println!(
        "  Close: {} < d < {} m -> {} Hz",
        detection.close_band_m.0, detection.close_band_m.1, detection.close_tone_hz
    );
    println!(
        "  Far: {} < d < {} m -> {} Hz",
        detection.far_band_m.0, detection.far_band_m.1, detection.far_tone_hz
    );
    println!("  Tone duration: {} ms", detection.tone_duration_ms);

    match config.metrics.port {
        Some(port) => println!("\nMetrics: http://0.0.0.0:{port}/metrics"),
        None => println!("\nMetrics: disabled"),
    }

    println!();
}
