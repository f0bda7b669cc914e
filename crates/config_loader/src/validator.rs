//! Config validation
//!
//! Rules:
//! - every float field finite (range rules alone let NaN through)
//! - field ranges declared on the contract structs (`validator` derive)
//! - scene closest approach below the start distance
//! - wall sampled by at least one grid step, within the point budget
//! - file tone output has a path

use contracts::{ContractError, FollowMeConfig, ToneOutputKind};
use ::validator::{Validate, ValidationErrors};

/// Upper bound on synthetic wall sample points
pub const MAX_WALL_POINTS: usize = 250_000;

/// Validate a config
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &FollowMeConfig) -> Result<(), ContractError> {
    validate_finite(config)?;
    config.validate().map_err(|e| from_validation_errors(&e))?;
    validate_scene(config)?;
    validate_tone_output(config)?;
    Ok(())
}

/// Flatten derive errors into a single field/message pair
fn from_validation_errors(errors: &ValidationErrors) -> ContractError {
    let message = errors.to_string();
    let field = message
        .split(':')
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("config")
        .to_string();
    ContractError::config_validation(field, message)
}

fn validate_finite(config: &FollowMeConfig) -> Result<(), ContractError> {
    let session = &config.session;
    let scene = &config.scene;
    let fields = [
        ("session.pose_rate_hz", session.pose_rate_hz),
        ("session.depth_rate_hz", session.depth_rate_hz),
        ("session.tracking_warmup_s", session.tracking_warmup_s),
        ("scene.start_distance_m", scene.start_distance_m),
        ("scene.min_distance_m", scene.min_distance_m),
        ("scene.approach_speed_mps", scene.approach_speed_mps),
        ("scene.wall_half_extent_m", scene.wall_half_extent_m),
        ("scene.grid_step_m", scene.grid_step_m),
        ("scene.noise_m", scene.noise_m),
        ("tone.amplitude", f64::from(config.tone.amplitude)),
    ];

    match fields.iter().find(|(_, value)| !value.is_finite()) {
        Some((field, value)) => Err(ContractError::config_validation(
            *field,
            format!("must be a finite number, got {value}"),
        )),
        None => Ok(()),
    }
}

/// Sample points of the wall grid (points per axis squared)
pub fn wall_point_count(half_extent_m: f64, grid_step_m: f64) -> usize {
    let per_axis = (2.0 * half_extent_m / grid_step_m).floor() as usize + 1;
    per_axis.saturating_mul(per_axis)
}

fn validate_scene(config: &FollowMeConfig) -> Result<(), ContractError> {
    let scene = &config.scene;

    if scene.min_distance_m >= scene.start_distance_m {
        return Err(ContractError::config_validation(
            "scene.min_distance_m / scene.start_distance_m",
            format!(
                "min_distance_m ({}) must be < start_distance_m ({})",
                scene.min_distance_m, scene.start_distance_m
            ),
        ));
    }

    if scene.grid_step_m > scene.wall_half_extent_m * 2.0 {
        return Err(ContractError::config_validation(
            "scene.grid_step_m",
            format!(
                "grid_step_m ({}) exceeds wall width ({})",
                scene.grid_step_m,
                scene.wall_half_extent_m * 2.0
            ),
        ));
    }

    let points = wall_point_count(scene.wall_half_extent_m, scene.grid_step_m);
    if points > MAX_WALL_POINTS {
        return Err(ContractError::config_validation(
            "scene.grid_step_m / scene.wall_half_extent_m",
            format!("wall grid has {points} points, limit is {MAX_WALL_POINTS}"),
        ));
    }

    Ok(())
}

fn validate_tone_output(config: &FollowMeConfig) -> Result<(), ContractError> {
    let tone = &config.tone;
    if tone.output == ToneOutputKind::File && tone.path.is_none() {
        return Err(ContractError::config_validation(
            "tone.path",
            "file output requires a path",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_valid_default_config() {
        assert!(validate(&FollowMeConfig::default()).is_ok());
    }

    #[test]
    fn test_range_error_surfaces_as_validation() {
        let mut config = FollowMeConfig::default();
        config.tone.sample_rate_hz = 10;
        let err = validate(&config).unwrap_err();
        assert!(matches!(err, ContractError::ConfigValidation { .. }));
        assert!(err.to_string().contains("sample_rate_hz"), "got: {err}");
    }

    #[test]
    fn test_min_distance_must_be_below_start() {
        let mut config = FollowMeConfig::default();
        config.scene.min_distance_m = 4.0;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("min_distance_m"), "got: {err}");
    }

    #[test]
    fn test_grid_step_wider_than_wall() {
        let mut config = FollowMeConfig::default();
        config.scene.wall_half_extent_m = 0.1;
        config.scene.grid_step_m = 0.5;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("grid_step_m"), "got: {err}");
    }

    #[test]
    fn test_nan_rate_rejected() {
        let mut config = FollowMeConfig::default();
        config.session.pose_rate_hz = f64::NAN;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("session.pose_rate_hz"), "got: {err}");
        assert!(err.contains("finite"), "got: {err}");
    }

    #[test]
    fn test_non_finite_scene_and_tone_values_rejected() {
        let mut config = FollowMeConfig::default();
        config.scene.noise_m = f64::NAN;
        assert!(validate(&config).unwrap_err().to_string().contains("scene.noise_m"));

        let mut config = FollowMeConfig::default();
        config.scene.start_distance_m = f64::INFINITY;
        assert!(validate(&config).is_err());

        let mut config = FollowMeConfig::default();
        config.tone.amplitude = f32::NAN;
        assert!(validate(&config).unwrap_err().to_string().contains("tone.amplitude"));
    }

    #[test]
    fn test_oversized_wall_rejected() {
        let mut config = FollowMeConfig::default();
        config.scene.wall_half_extent_m = 1.0e9;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("wall_half_extent_m"), "got: {err}");

        let mut config = FollowMeConfig::default();
        config.scene.wall_half_extent_m = 10.0;
        config.scene.grid_step_m = 0.005;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("limit is 250000"), "got: {err}");
    }

    #[test]
    fn test_default_wall_point_count() {
        assert_eq!(wall_point_count(1.0, 0.05), 41 * 41);
        assert!(wall_point_count(1.0, 0.05) <= MAX_WALL_POINTS);
    }

    #[test]
    fn test_file_output_requires_path() {
        let mut config = FollowMeConfig::default();
        config.tone.output = ToneOutputKind::File;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("requires a path"), "got: {err}");

        config.tone.path = Some(PathBuf::from("out.pcm"));
        assert!(validate(&config).is_ok());
    }
}
