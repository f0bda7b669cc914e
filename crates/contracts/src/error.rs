//! Layered error definitions
//!
//! Categorized by source: config / session / payload / feedback

use thiserror::Error;

use crate::FramePair;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Session Errors =====
    /// Session is not connected
    #[error("sensor session is not connected")]
    NotConnected,

    /// Session-level failure (connect, listener registration)
    #[error("sensor session error: {message}")]
    Session { message: String },

    /// Pose could not be resolved at the requested time
    #[error("pose lookup failed at t={timestamp:.6}s for {pair}: {message}")]
    PoseLookup {
        timestamp: f64,
        pair: FramePair,
        message: String,
    },

    // ===== Payload Errors =====
    /// Point cloud buffer is not a whole number of xyz triples
    #[error("invalid point cloud buffer: {len} bytes is not a multiple of {stride}")]
    InvalidPointCloud { len: usize, stride: usize },

    // ===== Feedback Errors =====
    /// Tone request rejected (zero frequency or duration, or above Nyquist)
    #[error("invalid tone request: {frequency_hz} Hz for {duration_ms} ms")]
    InvalidTone { frequency_hz: u32, duration_ms: u32 },

    /// Audio output failure
    #[error("audio output '{output}' error: {message}")]
    AudioOutput { output: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create session error
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session {
            message: message.into(),
        }
    }

    /// Create pose lookup error
    pub fn pose_lookup(timestamp: f64, pair: FramePair, message: impl Into<String>) -> Self {
        Self::PoseLookup {
            timestamp,
            pair,
            message: message.into(),
        }
    }

    /// Create audio output error
    pub fn audio_output(output: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AudioOutput {
            output: output.into(),
            message: message.into(),
        }
    }

    /// Whether the error is a recoverable stream-health condition
    ///
    /// Stream-health errors discard the current frame only; the stream keeps running.
    pub fn is_stream_health(&self) -> bool {
        matches!(self, Self::PoseLookup { .. } | Self::NotConnected)
    }
}
