//! Audio outputs
//!
//! Where rendered tones end up. `LogOutput` traces each tone; `FileOutput`
//! appends raw little-endian PCM to a file (play back with e.g.
//! `aplay -f S16_LE -r 8000`).

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use contracts::{ContractError, ToneConfig, ToneOutputKind};
use tracing::{debug, info, instrument};

use crate::synth::ToneBuffer;

/// Audio output device
pub trait AudioOutput: Send + Sync {
    /// Name used in logs and metric tags
    fn name(&self) -> &str;

    /// Play a rendered tone; blocks for as long as playback takes
    fn play(&self, tone: &ToneBuffer) -> Result<(), ContractError>;
}

/// Output that only logs tones
#[derive(Debug, Default)]
pub struct LogOutput;

impl AudioOutput for LogOutput {
    fn name(&self) -> &str {
        "log"
    }

    #[instrument(
        name = "log_output_play",
        skip(self, tone),
        fields(frequency_hz = tone.request.frequency_hz)
    )]
    fn play(&self, tone: &ToneBuffer) -> Result<(), ContractError> {
        info!(
            frequency_hz = tone.request.frequency_hz,
            duration_ms = tone.request.duration_ms,
            samples = tone.len(),
            "tone"
        );
        Ok(())
    }
}

/// Output appending raw PCM to a file
#[derive(Debug)]
pub struct FileOutput {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileOutput {
    /// Open (or create) the file in append mode
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ContractError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        debug!(path = %path.display(), "tone file output opened");
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AudioOutput for FileOutput {
    fn name(&self) -> &str {
        "file"
    }

    #[instrument(
        name = "file_output_play",
        skip(self, tone),
        fields(path = %self.path.display(), frequency_hz = tone.request.frequency_hz)
    )]
    fn play(&self, tone: &ToneBuffer) -> Result<(), ContractError> {
        let bytes = tone.to_le_bytes();
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        file.write_all(&bytes)
            .and_then(|()| file.flush())
            .map_err(|e| ContractError::audio_output(self.name(), e.to_string()))
    }
}

/// Build the output selected by the config
pub fn build_output(config: &ToneConfig) -> Result<Arc<dyn AudioOutput>, ContractError> {
    match config.output {
        ToneOutputKind::Log => Ok(Arc::new(LogOutput)),
        ToneOutputKind::File => {
            let path = config.path.as_ref().ok_or_else(|| {
                ContractError::config_validation("tone.path", "file output requires a path")
            })?;
            Ok(Arc::new(FileOutput::open(path)?))
        }
    }
}
