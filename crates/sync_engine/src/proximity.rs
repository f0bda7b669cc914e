//! Proximity detection
//!
//! Estimates the distance to whatever sits straight ahead of the device by
//! averaging the forward component of the points inside a narrow square gate
//! around the optical axis.

use contracts::{DistanceEstimate, Point3, PointCloudFrame};

/// Half width of the forward gate (meters)
///
/// A point qualifies when both `|x|` and `|y|` are strictly below this value.
pub const GATE_HALF_WIDTH_M: f32 = 0.200;

/// Estimate the forward distance of one frame
///
/// Absent when the frame is empty or no point falls inside the gate.
pub fn detect(frame: &PointCloudFrame) -> DistanceEstimate {
    detect_points(frame.points())
}

/// Same as [`detect`] over an arbitrary point sequence
pub fn detect_points<I>(points: I) -> DistanceEstimate
where
    I: IntoIterator<Item = Point3>,
{
    let (sum_z, count) = points
        .into_iter()
        .filter(in_gate)
        .fold((0.0f64, 0u64), |(sum, n), p| (sum + f64::from(p.z), n + 1));

    if count == 0 {
        DistanceEstimate::absent()
    } else {
        DistanceEstimate::meters(sum_z / count as f64)
    }
}

/// Whether a point lies inside the forward gate (strict on both axes)
#[inline]
pub fn in_gate(point: &Point3) -> bool {
    point.x.abs() < GATE_HALF_WIDTH_M && point.y.abs() < GATE_HALF_WIDTH_M
}
