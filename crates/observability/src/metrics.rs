//! Stream metrics
//!
//! Thin wrappers over the `metrics` facade for the pose and depth streams, plus
//! Welford running statistics used for in-process health summaries.

use contracts::{AlertDecision, DistanceEstimate, PoseStatus};
use metrics::{counter, gauge, histogram};

/// Record one pose sample
///
/// `run_length` is the consecutive-sample count of the current tracking status.
pub fn record_pose_sample(status: PoseStatus, delta_ms: f64, run_length: u64) {
    counter!("followme_pose_samples_total", "status" => status.as_str()).increment(1);
    histogram!("followme_pose_delta_ms").record(delta_ms);
    gauge!("followme_tracking_run_length").set(run_length as f64);
}

/// Record one depth frame that entered the depth synchronizer
pub fn record_depth_frame(frame_delta_ms: f64, point_count: usize) {
    counter!("followme_depth_frames_total").increment(1);
    histogram!("followme_depth_frame_delta_ms").record(frame_delta_ms);
    gauge!("followme_point_count").set(point_count as f64);
}

/// Record a failed pose lookup (frame discarded)
pub fn record_pose_lookup_failure() {
    counter!("followme_pose_lookup_failures_total").increment(1);
}

/// Record the distance estimate of one frame
pub fn record_distance(estimate: DistanceEstimate) {
    match estimate.value() {
        Some(distance) => {
            histogram!("followme_distance_m").record(distance);
            gauge!("followme_last_distance_m").set(distance);
        }
        None => counter!("followme_distance_absent_total").increment(1),
    }
}

/// Record an alert decision
pub fn record_alert(decision: &AlertDecision) {
    let band = decision.band().map(|b| b.as_str()).unwrap_or("silent");
    counter!("followme_alerts_total", "band" => band).increment(1);
}

/// Record a tone handed to an audio output
pub fn record_tone_played(output: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "followme_tones_played_total",
        "output" => output.to_string(),
        "status" => status
    )
    .increment(1);
}

/// Statistics summary
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a value; non-finite values are ignored
    pub fn push(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }

        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn summary(&self) -> StatsSummary {
        StatsSummary::from(self)
    }
}
