//! `run` command implementation.

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::{FollowMeConfig, ToneOutputKind};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

use super::load_config;
use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, args)?;
    ConfigLoader::validate(&config).context("Configuration rejected after CLI overrides")?;

    info!(
        pose_rate_hz = config.session.pose_rate_hz,
        depth_rate_hz = config.session.depth_rate_hz,
        start_distance_m = config.scene.start_distance_m,
        tone_output = ?config.tone.output,
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        return Ok(());
    }

    if !(args.render_hz > 0.0 && args.render_hz.is_finite()) {
        return Err(CliError::invalid_override("render-hz", "must be a positive rate").into());
    }

    let pipeline_config = PipelineConfig {
        config,
        max_frames: (args.max_frames > 0).then_some(args.max_frames),
        duration: (args.duration > 0).then(|| Duration::from_secs(args.duration)),
        render_interval: Duration::from_secs_f64(1.0 / args.render_hz),
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Received shutdown signal, stopping pipeline...");
        let _ = shutdown_tx.send(true);
    });

    info!("Starting pipeline...");
    let stats = Pipeline::new(pipeline_config)
        .run(shutdown_rx)
        .await
        .context("Pipeline execution failed")?;

    info!(
        depth_frames = stats.depth.frames,
        pose_samples = stats.pose.samples,
        tones = stats.tone.played,
        duration_secs = stats.duration.as_secs_f64(),
        "Pipeline completed"
    );
    stats.print_summary();

    info!("FollowMe finished");
    Ok(())
}

fn apply_overrides(config: &mut FollowMeConfig, args: &RunArgs) -> Result<()> {
    if let Some(port) = args.metrics_port {
        info!(port, "Overriding metrics port from CLI");
        config.metrics.port = (port != 0).then_some(port);
    }

    if let Some(output) = args.tone_output {
        config.tone.output = output.into();
    }
    if let Some(ref path) = args.tone_path {
        config.tone.path = Some(path.clone());
    }
    if args.tone_path.is_some() && config.tone.output != ToneOutputKind::File {
        warn!("--tone-path given but tone output is not 'file'; ignoring path");
    }

    if let Some(seed) = args.seed {
        config.scene.seed = Some(seed);
    }

    if let Some(every) = args.fail_lookup_every {
        if every == 0 {
            return Err(CliError::invalid_override("fail-lookup-every", "must be at least 1").into());
        }
        info!(every, "Injecting pose lookup failures");
        config.session.fail_lookup_every = Some(every);
    }

    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
