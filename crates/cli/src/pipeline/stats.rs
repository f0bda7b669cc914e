//! Pipeline statistics.

use std::time::Duration;

use sync_engine::{DepthSnapshot, PoseSnapshot};
use tone::ToneStats;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Total duration of the run
    pub duration: Duration,

    /// Final pose stream snapshot
    pub pose: PoseSnapshot,

    /// Final depth stream snapshot
    pub depth: DepthSnapshot,

    /// Tone playback counters
    pub tone: ToneStats,

    /// User notices raised
    pub notices: u64,

    /// Session events received
    pub events: u64,

    /// Frames the render loop drew
    pub frames_rendered: u64,
}

impl PipelineStats {
    /// Depth frames per second over the whole run
    pub fn depth_fps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.depth.frames as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Share of depth frames discarded for lack of a pose (percent)
    pub fn lookup_failure_rate(&self) -> f64 {
        if self.depth.frames > 0 {
            self.depth.lookup_failures as f64 / self.depth.frames as f64 * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Pipeline Statistics ===\n");

        println!("Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Depth FPS: {:.2}", self.depth_fps());
        println!("   ├─ Frames rendered: {}", self.frames_rendered);
        println!("   └─ Session events: {}", self.events);

        println!("\nPose stream");
        println!("   ├─ Samples: {}", self.pose.samples);
        println!("   ├─ Published: {}", self.pose.published);
        match self.pose.status {
            Some(status) => println!(
                "   ├─ Status: {} (x{})",
                status.as_str(),
                self.pose.consecutive
            ),
            None => println!("   ├─ Status: N/A"),
        }
        println!("   ├─ Status changes: {}", self.pose.status_changes);
        println!("   └─ Delta (ms): {}", self.pose.delta_stats);

        println!("\nDepth stream");
        println!("   ├─ Frames: {}", self.depth.frames);
        println!("   ├─ Published: {}", self.depth.published);
        println!(
            "   ├─ Lookup failures: {} ({:.2}%)",
            self.depth.lookup_failures,
            self.lookup_failure_rate()
        );
        println!("   ├─ Points (last): {}", self.depth.point_count());
        println!("   ├─ Delta (ms): {}", self.depth.delta_stats);
        println!("   └─ Distance (m): {}", self.depth.distance_stats);

        println!("\nAlerts");
        println!("   ├─ Close: {}", self.depth.close_alerts);
        println!("   ├─ Far: {}", self.depth.far_alerts);
        println!(
            "   ├─ Tones played: {} / requested {}",
            self.tone.played, self.tone.requested
        );
        println!("   ├─ Tone failures: {}", self.tone.failed);
        println!("   └─ User notices: {}", self.notices);

        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates_on_empty_run() {
        let stats = PipelineStats::default();
        assert_eq!(stats.depth_fps(), 0.0);
        assert_eq!(stats.lookup_failure_rate(), 0.0);
    }

    #[test]
    fn test_lookup_failure_rate() {
        let stats = PipelineStats {
            duration: Duration::from_secs(2),
            depth: DepthSnapshot {
                frames: 10,
                lookup_failures: 2,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(stats.depth_fps(), 5.0);
        assert_eq!(stats.lookup_failure_rate(), 20.0);
    }
}
