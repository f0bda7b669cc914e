//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// FollowMe - proximity alerts from a depth-sensing device
#[derive(Parser, Debug)]
#[command(
    name = "followme",
    author,
    version,
    about = "Depth-based proximity alerts with audible tones",
    long_about = "Runs the FollowMe proximity pipeline against a simulated depth device.\n\n\
                  Pairs every depth frame with the device pose at its timestamp, measures\n\
                  the distance straight ahead and plays a tone when something is close."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "FOLLOWME_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "FOLLOWME_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Default log level from -q / -v
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the proximity pipeline against the simulated device
    Run(RunArgs),

    /// Validate a configuration file without running
    Validate(ValidateArgs),

    /// Display the effective configuration
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON); built-in defaults when absent
    #[arg(short, long, env = "FOLLOWME_CONFIG")]
    pub config: Option<PathBuf>,

    /// Run time in seconds (0 = until Ctrl-C)
    #[arg(long, default_value = "10", env = "FOLLOWME_DURATION")]
    pub duration: u64,

    /// Stop after this many depth frames (0 = unlimited)
    #[arg(long, default_value = "0", env = "FOLLOWME_MAX_FRAMES")]
    pub max_frames: u64,

    /// Render loop rate (Hz)
    #[arg(long, default_value = "30", env = "FOLLOWME_RENDER_HZ")]
    pub render_hz: f64,

    /// Override the metrics port from configuration (0 = disabled)
    #[arg(long, env = "FOLLOWME_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    /// Override the tone output from configuration
    #[arg(long, value_enum, env = "FOLLOWME_TONE_OUTPUT")]
    pub tone_output: Option<ToneOutput>,

    /// PCM file for `--tone-output file`
    #[arg(long, env = "FOLLOWME_TONE_PATH")]
    pub tone_path: Option<PathBuf>,

    /// Override the scene RNG seed
    #[arg(long, env = "FOLLOWME_SEED")]
    pub seed: Option<u64>,

    /// Fail every Nth pose lookup
    #[arg(long, env = "FOLLOWME_FAIL_LOOKUP_EVERY")]
    pub fail_lookup_every: Option<u32>,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "followme.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file; built-in defaults when absent
    #[arg(short, long, env = "FOLLOWME_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

/// Tone output selectable from the command line
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ToneOutput {
    /// Log each tone
    Log,
    /// Append raw PCM to `--tone-path`
    File,
}

impl From<ToneOutput> for contracts::ToneOutputKind {
    fn from(output: ToneOutput) -> Self {
        match output {
            ToneOutput::Log => Self::Log,
            ToneOutput::File => Self::File,
        }
    }
}
