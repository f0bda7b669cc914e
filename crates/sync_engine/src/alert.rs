//! Alert policy
//!
//! Maps a distance estimate to at most one tone. The band boundaries are
//! exclusive: exactly 2 m, 3 m or more, and 0 m or less stay silent.

use std::sync::Arc;

use contracts::{AlertBand, AlertDecision, DistanceEstimate, ToneRequest, ToneService};
use observability::record_alert;
use tracing::debug;

/// Upper bound of the close band (exclusive)
pub const CLOSE_BAND_MAX_M: f64 = 2.0;

/// Upper bound of the far band (exclusive)
pub const FAR_BAND_MAX_M: f64 = 3.0;

/// High pitch for obstacles closer than 2 m
pub const CLOSE_TONE: ToneRequest = ToneRequest::new(440, 250);

/// Low pitch for obstacles between 2 m and 3 m
pub const FAR_TONE: ToneRequest = ToneRequest::new(250, 250);

/// Pure decision for one estimate
pub fn decide(estimate: DistanceEstimate) -> AlertDecision {
    let Some(d) = estimate.value() else {
        return AlertDecision::Silent;
    };

    // NaN fails every comparison and falls through to silent.
    if d > 0.0 && d < CLOSE_BAND_MAX_M {
        AlertDecision::Tone {
            band: AlertBand::Close,
            request: CLOSE_TONE,
        }
    } else if d > CLOSE_BAND_MAX_M && d < FAR_BAND_MAX_M {
        AlertDecision::Tone {
            band: AlertBand::Far,
            request: FAR_TONE,
        }
    } else {
        AlertDecision::Silent
    }
}

/// Alert policy bound to a tone service
pub struct AlertPolicy {
    tone: Arc<dyn ToneService>,
}

impl AlertPolicy {
    pub fn new(tone: Arc<dyn ToneService>) -> Self {
        Self { tone }
    }

    /// Decide and, for a non-silent decision, request exactly one tone
    pub fn apply(&self, estimate: DistanceEstimate) -> AlertDecision {
        let decision = decide(estimate);
        record_alert(&decision);

        if let AlertDecision::Tone { band, request } = decision {
            debug!(
                band = band.as_str(),
                distance_m = ?estimate.value(),
                frequency_hz = request.frequency_hz,
                "proximity alert"
            );
            self.tone.play(request);
        }

        decision
    }
}

impl std::fmt::Debug for AlertPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertPolicy").finish_non_exhaustive()
    }
}
