//! Tone service
//!
//! Renders the PCM buffer on the caller's thread, then hands playback to a
//! detached thread so the depth callback never waits for audio. Tones
//! requested while another is still playing overlap; there is no queue.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use contracts::{ContractError, ToneConfig, ToneRequest, ToneService};
use observability::record_tone_played;
use tracing::{debug, trace, warn};

use crate::output::{build_output, AudioOutput};
use crate::synth::Synthesizer;

/// Playback counters
///
/// `in_flight` is guarded by a mutex so playback threads can signal `idle`
/// when the last one finishes.
#[derive(Debug, Default)]
struct ToneCounters {
    requested: AtomicU64,
    played: AtomicU64,
    failed: AtomicU64,
    in_flight: Mutex<usize>,
    idle: Condvar,
}

impl ToneCounters {
    fn in_flight(&self) -> MutexGuard<'_, usize> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) {
        *self.in_flight() += 1;
    }

    fn finish(&self) {
        let mut in_flight = self.in_flight();
        *in_flight = in_flight.saturating_sub(1);
        if *in_flight == 0 {
            self.idle.notify_all();
        }
    }
}

/// Point-in-time copy of the playback counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToneStats {
    pub requested: u64,
    pub played: u64,
    pub failed: u64,
    pub in_flight: usize,
}

/// `ToneService` backed by the sine synthesizer and an audio output
pub struct SynthToneService {
    synth: Synthesizer,
    output: Arc<dyn AudioOutput>,
    counters: Arc<ToneCounters>,
}

impl SynthToneService {
    pub fn new(synth: Synthesizer, output: Arc<dyn AudioOutput>) -> Self {
        Self {
            synth,
            output,
            counters: Arc::new(ToneCounters::default()),
        }
    }

    pub fn from_config(config: &ToneConfig) -> Result<Self, ContractError> {
        Ok(Self::new(Synthesizer::from_config(config), build_output(config)?))
    }

    pub fn output_name(&self) -> &str {
        self.output.name()
    }

    pub fn stats(&self) -> ToneStats {
        ToneStats {
            requested: self.counters.requested.load(Ordering::Relaxed),
            played: self.counters.played.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            in_flight: *self.counters.in_flight(),
        }
    }

    /// Wait until no playback thread is running
    ///
    /// Returns false on timeout.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let in_flight = self.counters.in_flight();
        let (_guard, result) = self
            .counters
            .idle
            .wait_timeout_while(in_flight, timeout, |n| *n > 0)
            .unwrap_or_else(PoisonError::into_inner);
        !result.timed_out()
    }

    fn fail(&self, error: &ContractError) {
        self.counters.failed.fetch_add(1, Ordering::Relaxed);
        record_tone_played(self.output.name(), false);
        warn!(output = self.output.name(), error = %error, "tone playback failed");
    }
}

impl ToneService for SynthToneService {
    fn play(&self, request: ToneRequest) {
        self.counters.requested.fetch_add(1, Ordering::Relaxed);

        let buffer = match self.synth.render(request) {
            Ok(buffer) => buffer,
            Err(e) => return self.fail(&e),
        };

        debug!(
            frequency_hz = request.frequency_hz,
            duration_ms = request.duration_ms,
            output = self.output.name(),
            "tone playback started"
        );

        let output = self.output.clone();
        let counters = self.counters.clone();
        counters.begin();

        let spawned = thread::Builder::new()
            .name("followme-tone".to_string())
            .spawn(move || {
                match output.play(&buffer) {
                    Ok(()) => {
                        counters.played.fetch_add(1, Ordering::Relaxed);
                        record_tone_played(output.name(), true);
                        trace!(frequency_hz = buffer.request.frequency_hz, "tone played");
                    }
                    Err(e) => {
                        counters.failed.fetch_add(1, Ordering::Relaxed);
                        record_tone_played(output.name(), false);
                        warn!(output = output.name(), error = %e, "tone playback failed");
                    }
                }
                counters.finish();
            });

        if let Err(e) = spawned {
            self.counters.finish();
            self.fail(&ContractError::audio_output(
                self.output.name(),
                format!("failed to spawn playback thread: {e}"),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::ToneBuffer;
    use std::time::Instant;

    /// Output that blocks for the tone's duration and records what it played
    #[derive(Default)]
    struct SlowOutput(Mutex<Vec<ToneRequest>>);

    impl AudioOutput for SlowOutput {
        fn name(&self) -> &str {
            "slow"
        }

        fn play(&self, tone: &ToneBuffer) -> Result<(), ContractError> {
            thread::sleep(tone.duration());
            self.0.lock().unwrap().push(tone.request);
            Ok(())
        }
    }

    struct BrokenOutput;

    impl AudioOutput for BrokenOutput {
        fn name(&self) -> &str {
            "broken"
        }

        fn play(&self, _tone: &ToneBuffer) -> Result<(), ContractError> {
            Err(ContractError::audio_output("broken", "device unplugged"))
        }
    }

    #[test]
    fn test_play_returns_before_playback_ends() {
        let output = Arc::new(SlowOutput::default());
        let service = SynthToneService::new(Synthesizer::new(8000, 0.8), output.clone());

        let start = Instant::now();
        service.play(ToneRequest::new(440, 250));
        service.play(ToneRequest::new(250, 250));
        assert!(start.elapsed() < Duration::from_millis(200));

        assert!(service.wait_idle(Duration::from_secs(2)));
        let stats = service.stats();
        assert_eq!(stats.requested, 2);
        assert_eq!(stats.played, 2);
        assert_eq!(stats.in_flight, 0);
        assert_eq!(output.0.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_wait_idle_blocks_until_playback_finishes() {
        let output = Arc::new(SlowOutput::default());
        let service = SynthToneService::new(Synthesizer::new(8000, 0.8), output.clone());

        service.play(ToneRequest::new(440, 250));
        assert!(!service.wait_idle(Duration::from_millis(20)));
        assert_eq!(service.stats().in_flight, 1);

        let start = Instant::now();
        assert!(service.wait_idle(Duration::from_secs(2)));
        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(service.stats().in_flight, 0);
        assert_eq!(output.0.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_wait_idle_returns_immediately_when_idle() {
        let service =
            SynthToneService::new(Synthesizer::new(8000, 0.8), Arc::new(SlowOutput::default()));
        assert!(service.wait_idle(Duration::ZERO));
    }

    #[test]
    fn test_invalid_request_is_counted_not_played() {
        let output = Arc::new(SlowOutput::default());
        let service = SynthToneService::new(Synthesizer::new(8000, 0.8), output.clone());

        service.play(ToneRequest::new(0, 250));
        assert!(service.wait_idle(Duration::from_secs(1)));
        assert_eq!(service.stats().failed, 1);
        assert!(output.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_output_failure_is_counted() {
        let service = SynthToneService::new(Synthesizer::new(8000, 0.8), Arc::new(BrokenOutput));
        service.play(ToneRequest::new(440, 250));
        assert!(service.wait_idle(Duration::from_secs(1)));
        assert_eq!(service.stats().failed, 1);
        assert_eq!(service.stats().played, 0);
    }

    #[test]
    fn test_from_config_defaults_to_log_output() {
        let service = SynthToneService::from_config(&ToneConfig::default()).unwrap();
        assert_eq!(service.output_name(), "log");
    }
}
