//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{Calibration, RelayConfig};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    server: ServerInfo,
    camera: CameraInfo,
    stream: StreamInfo,
    telemetry: TelemetryInfo,
}

#[derive(Serialize)]
struct ServerInfo {
    bind: String,
    cors: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    static_dir: Option<String>,
}

#[derive(Serialize)]
struct CameraInfo {
    kind: String,
    width: u32,
    height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    calibration: Option<Calibration>,
}

#[derive(Serialize)]
struct StreamInfo {
    fps: u32,
    frame_interval_ms: f64,
    time_base: String,
    pts_step: u64,
}

#[derive(Serialize)]
struct TelemetryInfo {
    enabled: bool,
    address: String,
    connect_timeout_ms: u64,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&config, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config, args);
    }

    Ok(())
}

fn build_config_info(config: &RelayConfig, args: &InfoArgs) -> ConfigInfo {
    ConfigInfo {
        version: format!("{:?}", config.version),
        server: ServerInfo {
            bind: config.server.bind.clone(),
            cors: config.server.cors,
            static_dir: config
                .server
                .static_dir
                .as_ref()
                .map(|d| d.display().to_string()),
        },
        camera: CameraInfo {
            kind: format!("{:?}", config.camera.kind),
            width: config.camera.width,
            height: config.camera.height,
            calibration: if args.calibration {
                config.camera.calibration.clone()
            } else {
                None
            },
        },
        stream: StreamInfo {
            fps: config.stream.fps,
            frame_interval_ms: config.stream.frame_interval().as_secs_f64() * 1000.0,
            time_base: config.stream.time_base().to_string(),
            pts_step: config.stream.pts_step(),
        },
        telemetry: TelemetryInfo {
            enabled: config.telemetry.enabled,
            address: config.telemetry.address(),
            connect_timeout_ms: config.telemetry.connect_timeout_ms,
        },
    }
}

fn print_config_info(config: &RelayConfig, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Stereo Relay Configuration                     ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("🌐 Server");
    println!("   ├─ Version: {:?}", config.version);
    println!("   ├─ Bind: {}", config.server.bind);
    println!("   ├─ CORS: {}", config.server.cors);
    match &config.server.static_dir {
        Some(dir) => println!("   └─ Static: {}", dir.display()),
        None => println!("   └─ Static: (none)"),
    }

    println!("\n📷 Camera");
    println!("   ├─ Source: {:?}", config.camera.kind);
    println!(
        "   └─ Output: {}x{}",
        config.camera.width, config.camera.height
    );
    if args.calibration {
        match &config.camera.calibration {
            Some(calibration) => {
                println!("      📐 Calibration:");
                println!("         ├─ K left:  {:?}", calibration.k_left);
                println!("         ├─ K right: {:?}", calibration.k_right);
                println!("         └─ Baseline: {} m", calibration.baseline_m);
            }
            None => println!("      📐 Calibration: (device default)"),
        }
    }

    println!("\n🎞  Stream");
    println!("   ├─ FPS: {}", config.stream.fps);
    println!("   ├─ Time base: {}", config.stream.time_base());
    println!("   └─ PTS step: {}", config.stream.pts_step());

    println!("\n📡 Telemetry");
    if config.telemetry.enabled {
        println!("   └─ Sink: {}", config.telemetry.address());
    } else {
        println!("   └─ Disabled");
    }

    println!();
}
