//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Stereo Relay - paced stereo video and pose telemetry relay
#[derive(Parser, Debug)]
#[command(
    name = "stereo-relay",
    author,
    version,
    about = "Stereo camera relay with synchronized left/right pacing",
    long_about = "Serves a stereo camera to a remote viewer.\n\n\
                  Keeps the left and right tracks on the same captured pair at a fixed \n\
                  cadence, exposes the camera calibration over HTTP and forwards pose \n\
                  telemetry to an actuator controller."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "STEREO_RELAY_VERBOSE")]
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
        env = "STEREO_RELAY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the relay server
    Run(RunArgs),

    /// Run one local viewer session and print pacing statistics
    Preview(PreviewArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON); defaults are used when absent
    #[arg(short, long, env = "STEREO_RELAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override HTTP bind address
    #[arg(long, env = "STEREO_RELAY_BIND")]
    pub bind: Option<String>,

    /// Serve static files from this directory at `/`
    #[arg(long, env = "STEREO_RELAY_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// Override camera source
    #[arg(long, value_enum)]
    pub camera: Option<CameraArg>,

    /// Override output frame rate
    #[arg(long, env = "STEREO_RELAY_FPS")]
    pub fps: Option<u32>,

    /// Override telemetry sink host
    #[arg(long, env = "TELEMETRY_HOST")]
    pub telemetry_host: Option<String>,

    /// Override telemetry sink port
    #[arg(long, env = "TELEMETRY_PORT")]
    pub telemetry_port: Option<u16>,

    /// Do not connect to the telemetry sink
    #[arg(long)]
    pub no_telemetry: bool,

    /// Validate configuration and exit without serving
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9100", env = "STEREO_RELAY_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `preview` command
#[derive(Parser, Debug, Clone)]
pub struct PreviewArgs {
    /// Path to configuration file (TOML or JSON); defaults are used when absent
    #[arg(short, long, env = "STEREO_RELAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of frames to pull per eye
    #[arg(short = 'n', long, default_value = "90")]
    pub frames: u64,

    /// Override output frame rate
    #[arg(long)]
    pub fps: Option<u32>,

    /// Output summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "relay.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "relay.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show calibration matrices
    #[arg(long)]
    pub calibration: bool,
}

/// Camera source selection
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum CameraArg {
    /// Built-in moving-bar test pattern
    Synthetic,
    /// No video; server runs in degraded mode
    Disabled,
}

impl From<CameraArg> for contracts::CameraKind {
    fn from(arg: CameraArg) -> Self {
        match arg {
            CameraArg::Synthetic => Self::Synthetic,
            CameraArg::Disabled => Self::Disabled,
        }
    }
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_overrides() {
        let cli = Cli::try_parse_from([
            "stereo-relay",
            "run",
            "--bind",
            "127.0.0.1:9000",
            "--camera",
            "disabled",
            "--no-telemetry",
        ])
        .unwrap();

        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.bind.as_deref(), Some("127.0.0.1:9000"));
                assert!(matches!(args.camera, Some(CameraArg::Disabled)));
                assert!(args.no_telemetry);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["stereo-relay", "-q", "-v", "info"]).is_err());
    }

    #[test]
    fn test_preview_defaults() {
        let cli = Cli::try_parse_from(["stereo-relay", "preview"]).unwrap();
        match cli.command {
            Commands::Preview(args) => {
                assert_eq!(args.frames, 90);
                assert!(!args.json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
