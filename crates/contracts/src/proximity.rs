//! Proximity results: distance estimate and alert decision.

use serde::{Deserialize, Serialize};

/// Mean forward distance of the gated points of one frame
///
/// Absent when no point fell inside the gate. Never carried across frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DistanceEstimate(Option<f64>);

impl DistanceEstimate {
    pub const fn absent() -> Self {
        Self(None)
    }

    pub const fn meters(distance: f64) -> Self {
        Self(Some(distance))
    }

    /// Distance in meters, if any point qualified
    pub fn value(&self) -> Option<f64> {
        self.0
    }

    pub fn is_absent(&self) -> bool {
        self.0.is_none()
    }
}

impl From<Option<f64>> for DistanceEstimate {
    fn from(value: Option<f64>) -> Self {
        Self(value)
    }
}

/// Tone playback request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToneRequest {
    pub frequency_hz: u32,
    pub duration_ms: u32,
}

impl ToneRequest {
    pub const fn new(frequency_hz: u32, duration_ms: u32) -> Self {
        Self {
            frequency_hz,
            duration_ms,
        }
    }
}

/// Distance band an alert belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertBand {
    /// 0 m < d < 2 m
    Close,
    /// 2 m < d < 3 m
    Far,
}

impl AlertBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Close => "close",
            Self::Far => "far",
        }
    }
}

/// Outcome of the alert policy for one distance estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertDecision {
    Silent,
    Tone { band: AlertBand, request: ToneRequest },
}

impl AlertDecision {
    /// Tone to play, if any
    pub fn request(&self) -> Option<ToneRequest> {
        match self {
            Self::Silent => None,
            Self::Tone { request, .. } => Some(*request),
        }
    }

    pub fn band(&self) -> Option<AlertBand> {
        match self {
            Self::Silent => None,
            Self::Tone { band, .. } => Some(*band),
        }
    }

    pub fn is_silent(&self) -> bool {
        matches!(self, Self::Silent)
    }
}
