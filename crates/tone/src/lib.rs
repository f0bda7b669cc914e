//! # Tone
//!
//! Proximity tone playback.
//!
//! - `Synthesizer`: sine tone to 16-bit PCM with a short fade
//! - `AudioOutput`: log and raw-PCM file outputs
//! - `SynthToneService`: fire-and-forget `ToneService` implementation

mod output;
mod service;
mod synth;

pub use output::{build_output, AudioOutput, FileOutput, LogOutput};
pub use service::{SynthToneService, ToneStats};
pub use synth::{Synthesizer, ToneBuffer};
