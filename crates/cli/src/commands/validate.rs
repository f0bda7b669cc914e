//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::FollowMeConfig;
use serde::Serialize;
use sync_engine::alert::FAR_BAND_MAX_M;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    pose_rate_hz: f64,
    depth_rate_hz: f64,
    start_distance_m: f64,
    tone_output: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{json}");
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(ConfigSummary {
                    version: format!("{:?}", config.version),
                    pose_rate_hz: config.session.pose_rate_hz,
                    depth_rate_hz: config.session.depth_rate_hz,
                    start_distance_m: config.scene.start_distance_m,
                    tone_output: format!("{:?}", config.tone.output).to_lowercase(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &FollowMeConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.scene.approach_speed_mps == 0.0 && config.scene.start_distance_m >= FAR_BAND_MAX_M {
        warnings.push(format!(
            "walker never moves and starts beyond {FAR_BAND_MAX_M} m - no tone will play"
        ));
    }

    if config.session.fail_lookup_every.is_some() {
        warnings.push("session.fail_lookup_every is set - depth frames will be dropped".to_string());
    }

    let history_s = config.session.pose_history as f64 / config.session.pose_rate_hz;
    if history_s < 2.0 / config.session.depth_rate_hz {
        warnings.push(format!(
            "pose history covers only {history_s:.3}s - lookups may fall outside it"
        ));
    }

    if config.scene.noise_m > 0.2 {
        warnings.push("scene.noise_m above 0.2 m makes distance bands unreliable".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Pose rate: {} Hz", summary.pose_rate_hz);
            println!("  Depth rate: {} Hz", summary.depth_rate_hz);
            println!("  Start distance: {} m", summary.start_distance_m);
            println!("  Tone output: {}", summary.tone_output);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {warning}");
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {error}");
        }
    }
}
