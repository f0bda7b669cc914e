//! Bounded pose history with lookup-by-time
//!
//! Samples are kept in a fixed-capacity ring (oldest evicted first) in arrival
//! order. A lookup between two retained samples interpolates the translation
//! linearly and the rotation spherically.

use std::fmt;

use contracts::{ContractError, FramePair, PoseSample, RigidTransform};
use nalgebra::{Isometry3, Translation3};
use ringbuf::{traits::*, HeapRb};

/// Quaternions closer than this to antipodal fall back to the nearest sample
const SLERP_EPSILON: f64 = 1e-9;

pub struct PoseHistory {
    samples: HeapRb<PoseSample>,
    capacity: usize,
    evicted: u64,
}

impl fmt::Debug for PoseHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoseHistory")
            .field("len", &self.samples.occupied_len())
            .field("capacity", &self.capacity)
            .field("evicted", &self.evicted)
            .finish()
    }
}

impl PoseHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(2);
        Self {
            samples: HeapRb::new(capacity),
            capacity,
            evicted: 0,
        }
    }

    /// Append a sample, evicting the oldest when full
    pub fn push(&mut self, sample: PoseSample) {
        if self.samples.is_full() {
            let _ = self.samples.try_pop();
            self.evicted += 1;
        }
        let _ = self.samples.try_push(sample);
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.occupied_len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Time span covered by the retained samples
    pub fn span(&self) -> Option<(f64, f64)> {
        let first = self.samples.iter().next()?;
        let last = self.samples.iter().last()?;
        Some((first.timestamp, last.timestamp))
    }

    /// Pose at `timestamp`, interpolated between the bracketing samples
    pub fn lookup(&self, timestamp: f64, pair: FramePair) -> Result<PoseSample, ContractError> {
        let (oldest, newest) = self
            .span()
            .ok_or_else(|| ContractError::pose_lookup(timestamp, pair, "pose history is empty"))?;

        if !(oldest..=newest).contains(&timestamp) {
            return Err(ContractError::pose_lookup(
                timestamp,
                pair,
                format!("outside pose history [{oldest:.6}, {newest:.6}]"),
            ));
        }

        let mut previous: Option<&PoseSample> = None;
        for sample in self.samples.iter() {
            if sample.timestamp == timestamp {
                return Ok(PoseSample { frame_pair: pair, ..*sample });
            }
            if sample.timestamp > timestamp {
                if let Some(before) = previous {
                    return Ok(interpolate(before, sample, timestamp, pair));
                }
            }
            previous = Some(sample);
        }

        Err(ContractError::pose_lookup(
            timestamp,
            pair,
            "no bracketing samples in pose history",
        ))
    }
}

fn interpolate(
    before: &PoseSample,
    after: &PoseSample,
    timestamp: f64,
    pair: FramePair,
) -> PoseSample {
    let span = after.timestamp - before.timestamp;
    let t = if span > 0.0 {
        (timestamp - before.timestamp) / span
    } else {
        0.0
    };
    let nearest = if t < 0.5 { before } else { after };

    let a = before.transform.to_isometry();
    let b = after.transform.to_isometry();

    let translation = a.translation.vector.lerp(&b.translation.vector, t);
    let rotation = a
        .rotation
        .try_slerp(&b.rotation, t, SLERP_EPSILON)
        .unwrap_or(nearest.transform.to_isometry().rotation);

    let iso = Isometry3::from_parts(Translation3::from(translation), rotation);
    PoseSample::new(
        timestamp,
        pair,
        RigidTransform::from_isometry(&iso),
        nearest.status,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ContractError, PoseStatus};
    use nalgebra::{UnitQuaternion, Vector3};

    fn sample(timestamp: f64, z: f64, yaw: f64) -> PoseSample {
        let iso = Isometry3::from_parts(
            Translation3::new(0.0, 0.0, z),
            UnitQuaternion::from_axis_angle(&Vector3::y_axis(), yaw),
        );
        PoseSample::new(
            timestamp,
            FramePair::device_in_world(),
            RigidTransform::from_isometry(&iso),
            PoseStatus::Valid,
        )
    }

    #[test]
    fn test_empty_history_fails() {
        let history = PoseHistory::new(4);
        let err = history.lookup(1.0, FramePair::device_in_world()).unwrap_err();
        assert!(matches!(err, ContractError::PoseLookup { .. }));
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_exact_and_interpolated_lookup() {
        let mut history = PoseHistory::new(8);
        history.push(sample(1.0, 0.0, 0.0));
        history.push(sample(2.0, 1.0, 0.4));

        let exact = history.lookup(2.0, FramePair::device_in_world()).unwrap();
        assert_eq!(exact.translation()[2], 1.0);

        let mid = history.lookup(1.25, FramePair::device_in_world()).unwrap();
        assert!((mid.translation()[2] - 0.25).abs() < 1e-9);
        let yaw = mid.transform.to_isometry().rotation.angle();
        assert!((yaw - 0.1).abs() < 1e-9, "yaw={yaw}");
        assert_eq!(mid.timestamp, 1.25);
    }

    #[test]
    fn test_outside_history_fails() {
        let mut history = PoseHistory::new(8);
        history.push(sample(1.0, 0.0, 0.0));
        history.push(sample(2.0, 1.0, 0.0));

        assert!(history.lookup(0.5, FramePair::device_in_world()).is_err());
        assert!(history.lookup(2.01, FramePair::device_in_world()).is_err());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = PoseHistory::new(3);
        for i in 0..5 {
            history.push(sample(i as f64, 0.0, 0.0));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.span(), Some((2.0, 4.0)));
        assert!(history.lookup(1.5, FramePair::device_in_world()).is_err());
    }
}
