//! Sine tone synthesis (16-bit mono PCM)

use std::f64::consts::TAU;
use std::time::Duration;

use contracts::{ContractError, ToneConfig, ToneRequest};

/// Length of the linear fade in and out
const FADE_MS: u64 = 5;

/// Rendered tone
#[derive(Debug, Clone, PartialEq)]
pub struct ToneBuffer {
    pub request: ToneRequest,
    pub sample_rate_hz: u32,
    samples: Vec<i16>,
}

impl ToneBuffer {
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Playback duration at the buffer's sample rate
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.samples.len() as f64 / f64::from(self.sample_rate_hz))
    }

    /// Little-endian PCM bytes
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }
}

/// Sine synthesizer
#[derive(Debug, Clone, Copy)]
pub struct Synthesizer {
    sample_rate_hz: u32,
    amplitude: f32,
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self::from_config(&ToneConfig::default())
    }
}

impl Synthesizer {
    pub fn new(sample_rate_hz: u32, amplitude: f32) -> Self {
        Self {
            sample_rate_hz: sample_rate_hz.max(1),
            amplitude: amplitude.clamp(0.0, 1.0),
        }
    }

    pub fn from_config(config: &ToneConfig) -> Self {
        Self::new(config.sample_rate_hz, config.amplitude)
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    /// Render a request into PCM
    ///
    /// Rejects zero frequency, zero duration and frequencies at or above
    /// Nyquist.
    pub fn render(&self, request: ToneRequest) -> Result<ToneBuffer, ContractError> {
        let ToneRequest {
            frequency_hz,
            duration_ms,
        } = request;

        let rate = u64::from(self.sample_rate_hz);
        if frequency_hz == 0 || duration_ms == 0 || u64::from(frequency_hz) * 2 >= rate {
            return Err(ContractError::InvalidTone {
                frequency_hz,
                duration_ms,
            });
        }

        let count = (rate * u64::from(duration_ms) / 1000) as usize;
        let fade = ((rate * FADE_MS / 1000) as usize).min(count / 2).max(1);
        let peak = f64::from(self.amplitude) * f64::from(i16::MAX);
        let step = TAU * f64::from(frequency_hz) / rate as f64;

        let samples = (0..count)
            .map(|i| {
                let envelope = (i.min(count - 1 - i) as f64 / fade as f64).min(1.0);
                let value = (step * i as f64).sin() * peak * envelope;
                value.round() as i16
            })
            .collect();

        Ok(ToneBuffer {
            request,
            sample_rate_hz: self.sample_rate_hz,
            samples,
        })
    }
}
